use std::io::{self, Write};

use miette::{IntoDiagnostic, Result};

use crate::error;
use crate::instruction::Instruction;
use crate::program::Program;
use crate::registers::RegisterFile;

/// Drives the fetch-execute loop over a translated program.
///
/// Output and diagnostics go to caller-supplied sinks so that hosting code
/// (and tests) can capture both streams. Nothing is shared between machines:
/// concurrent runs each own their program, registers and counter.
pub struct Machine<O = io::Stdout, D = io::Stderr> {
    program: Program,
    registers: RegisterFile,
    pc: usize,
    out: O,
    diag: D,
}

impl Machine {
    /// A machine wired to the process stdout and stderr.
    pub fn new(program: Program) -> Self {
        Machine::with_io(program, RegisterFile::default(), io::stdout(), io::stderr())
    }
}

impl<O: Write, D: Write> Machine<O, D> {
    pub fn with_io(program: Program, registers: RegisterFile, out: O, diag: D) -> Self {
        Machine {
            program,
            registers,
            pc: 0,
            out,
            diag,
        }
    }

    /// Run from the first statement until the counter falls off the end.
    ///
    /// Soft faults (bad register numbers, unresolved branch targets) are
    /// reported to the diagnostic sink and execution continues; division by
    /// zero stops the run.
    pub fn execute(&mut self) -> Result<()> {
        self.pc = 0;
        while self.pc < self.program.len() {
            let ins = &self.program[self.pc];
            // The counter moves first; a taken branch overwrites it, so jump
            // targets land exactly.
            self.pc += 1;
            match ins {
                Instruction::Lin { dest, value, .. } => {
                    self.registers.set(*dest, *value, &mut self.diag);
                }
                Instruction::Add { dest, lhs, rhs, .. } => {
                    let a = self.registers.get(*lhs, &mut self.diag);
                    let b = self.registers.get(*rhs, &mut self.diag);
                    self.registers.set(*dest, a.wrapping_add(b), &mut self.diag);
                }
                Instruction::Sub { dest, lhs, rhs, .. } => {
                    let a = self.registers.get(*lhs, &mut self.diag);
                    let b = self.registers.get(*rhs, &mut self.diag);
                    self.registers.set(*dest, a.wrapping_sub(b), &mut self.diag);
                }
                Instruction::Mul { dest, lhs, rhs, .. } => {
                    let a = self.registers.get(*lhs, &mut self.diag);
                    let b = self.registers.get(*rhs, &mut self.diag);
                    self.registers.set(*dest, a.wrapping_mul(b), &mut self.diag);
                }
                Instruction::Div {
                    label,
                    dest,
                    lhs,
                    rhs,
                } => {
                    let a = self.registers.get(*lhs, &mut self.diag);
                    let b = self.registers.get(*rhs, &mut self.diag);
                    if b == 0 {
                        return Err(error::division_by_zero(label, *lhs, *rhs));
                    }
                    self.registers.set(*dest, a.wrapping_div(b), &mut self.diag);
                }
                Instruction::Out { src, .. } => {
                    let value = self.registers.get(*src, &mut self.diag);
                    writeln!(self.out, "{value}").into_diagnostic()?;
                }
                Instruction::Bnz {
                    label,
                    test,
                    target,
                } => {
                    if self.registers.get(*test, &mut self.diag) != 0 {
                        match self.program.labels().index_of(target) {
                            Some(index) => self.pc = index,
                            None => {
                                let _ = writeln!(
                                    self.diag,
                                    "invalid branch label '{target}' at '{label}': falling through"
                                );
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn output(&self) -> &O {
        &self.out
    }

    pub fn diagnostics(&self) -> &D {
        &self.diag
    }
}
