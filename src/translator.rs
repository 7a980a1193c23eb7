use miette::Result;

use crate::error;
use crate::instruction::Instruction;
use crate::program::Program;
use crate::span::Span;

/// A whitespace-delimited token and where it sits in the source.
#[derive(Clone, Copy, Debug)]
struct Tok<'a> {
    text: &'a str,
    span: Span,
}

/// Split a line into tokens, keeping absolute source offsets.
fn split_line<'a>(line: &'a str, base: usize) -> impl Iterator<Item = Tok<'a>> + 'a {
    line.split_whitespace().map(move |text| {
        let offs = base + (text.as_ptr() as usize - line.as_ptr() as usize);
        Tok {
            text,
            span: Span::new(offs, text.len()),
        }
    })
}

/// Turns SML source text into a validated program.
///
/// Translation is all-or-nothing: the first faulty line aborts the call and
/// no partial program escapes. Every call builds a fresh program, so a
/// translator value can be reused after a failure.
pub struct Translator<'a> {
    src: &'a str,
}

impl<'a> Translator<'a> {
    pub fn new(src: &'a str) -> Self {
        Translator { src }
    }

    pub fn translate(&self) -> Result<Program> {
        let mut program = Program::new();
        let mut line_start = 0;
        let mut line_no = 0;

        for raw in self.src.split_inclusive('\n') {
            line_no += 1;
            let base = line_start;
            line_start += raw.len();
            let line = raw.trim_end_matches(['\r', '\n']);
            let mut toks = split_line(line, base);

            let Some(label) = toks.next() else {
                return Err(error::missing_label(line_no, base, self.src));
            };

            if let Some(first) = program.labels().index_of(label.text) {
                // Label i always sits on line i + 1.
                return Err(error::duplicate_label(
                    label.text,
                    first + 1,
                    line_no,
                    label.span,
                    self.src,
                ));
            }

            let Some(opcode) = toks.next() else {
                return Err(error::missing_opcode(
                    label.text, line_no, label.span, self.src,
                ));
            };

            let operands: Vec<Tok> = toks.collect();
            let instruction = self.decode(label.text, opcode, &operands)?;
            program.append(instruction);
        }

        Ok(program)
    }

    /// Resolve an opcode mnemonic and decode its operands.
    fn decode(&self, label: &str, opcode: Tok<'_>, operands: &[Tok<'_>]) -> Result<Instruction> {
        let ins = match opcode.text {
            "add" => {
                self.arity(label, opcode, operands, 3)?;
                Instruction::Add {
                    label: label.to_string(),
                    dest: self.int(label, opcode, operands[0])?,
                    lhs: self.int(label, opcode, operands[1])?,
                    rhs: self.int(label, opcode, operands[2])?,
                }
            }
            "sub" => {
                self.arity(label, opcode, operands, 3)?;
                Instruction::Sub {
                    label: label.to_string(),
                    dest: self.int(label, opcode, operands[0])?,
                    lhs: self.int(label, opcode, operands[1])?,
                    rhs: self.int(label, opcode, operands[2])?,
                }
            }
            "mul" => {
                self.arity(label, opcode, operands, 3)?;
                Instruction::Mul {
                    label: label.to_string(),
                    dest: self.int(label, opcode, operands[0])?,
                    lhs: self.int(label, opcode, operands[1])?,
                    rhs: self.int(label, opcode, operands[2])?,
                }
            }
            "div" => {
                self.arity(label, opcode, operands, 3)?;
                Instruction::Div {
                    label: label.to_string(),
                    dest: self.int(label, opcode, operands[0])?,
                    lhs: self.int(label, opcode, operands[1])?,
                    rhs: self.int(label, opcode, operands[2])?,
                }
            }
            "lin" => {
                self.arity(label, opcode, operands, 2)?;
                Instruction::Lin {
                    label: label.to_string(),
                    dest: self.int(label, opcode, operands[0])?,
                    value: self.int(label, opcode, operands[1])?,
                }
            }
            "out" => {
                self.arity(label, opcode, operands, 1)?;
                Instruction::Out {
                    label: label.to_string(),
                    src: self.int(label, opcode, operands[0])?,
                }
            }
            "bnz" => {
                self.arity(label, opcode, operands, 2)?;
                Instruction::Bnz {
                    label: label.to_string(),
                    test: self.int(label, opcode, operands[0])?,
                    target: operands[1].text.to_string(),
                }
            }
            _ => return Err(error::unknown_opcode(opcode.text, label, opcode.span, self.src)),
        };
        Ok(ins)
    }

    fn arity(&self, label: &str, opcode: Tok<'_>, operands: &[Tok<'_>], want: usize) -> Result<()> {
        if operands.len() == want {
            Ok(())
        } else {
            Err(error::wrong_arity(
                opcode.text,
                label,
                want,
                operands.len(),
                opcode.span,
                self.src,
            ))
        }
    }

    fn int(&self, label: &str, opcode: Tok<'_>, tok: Tok<'_>) -> Result<i64> {
        tok.text.parse().map_err(|e| {
            error::invalid_operand(tok.text, opcode.text, label, tok.span, self.src, e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Translator;
    use crate::instruction::Instruction;
    use crate::program::Program;

    const FACTORIAL: &str = "\
f0 lin 20 6
f1 lin 21 1
f2 lin 22 1
f3 mul 21 21 20
f4 sub 20 20 22
f5 bnz 20 f3
f6 out 21
";

    fn translate(src: &str) -> miette::Result<Program> {
        Translator::new(src).translate()
    }

    #[test]
    fn translate_add() {
        let program = translate("f0 add 1 2 3").unwrap();
        assert_eq!(program.len(), 1);
        assert_eq!(
            program.get(0),
            &Instruction::Add {
                label: "f0".to_string(),
                dest: 1,
                lhs: 2,
                rhs: 3,
            }
        );
        assert_eq!(program.labels().index_of("f0"), Some(0));
    }

    #[test]
    fn translate_empty_source() {
        let program = translate("").unwrap();
        assert!(program.is_empty());
        assert!(program.labels().is_empty());
    }

    #[test]
    fn translate_factorial() {
        let program = translate(FACTORIAL).unwrap();
        assert_eq!(program.len(), 7);
        assert_eq!(program.labels().index_of("f3"), Some(3));
        assert_eq!(
            program.get(6),
            &Instruction::Out {
                label: "f6".to_string(),
                src: 21,
            }
        );
    }

    #[test]
    fn translate_ignores_extra_whitespace() {
        let program = translate("  f0\t lin   1  5 ").unwrap();
        assert_eq!(
            program.get(0),
            &Instruction::Lin {
                label: "f0".to_string(),
                dest: 1,
                value: 5,
            }
        );
    }

    #[test]
    fn negative_immediates_are_fine() {
        let program = translate("f0 lin 1 -42").unwrap();
        assert_eq!(
            program.get(0),
            &Instruction::Lin {
                label: "f0".to_string(),
                dest: 1,
                value: -42,
            }
        );
    }

    #[test]
    fn reject_blank_line() {
        let err = translate("f0 lin 1 5\n\nf1 out 1").unwrap_err();
        assert_eq!(err.code().unwrap().to_string(), "translate::missing_label");
    }

    #[test]
    fn reject_duplicate_label() {
        let err = translate("f0 lin 1 5\nf0 out 1").unwrap_err();
        assert_eq!(err.code().unwrap().to_string(), "translate::duplicate_label");
        assert!(err.to_string().contains("lines 1 and 2"));
    }

    #[test]
    fn reject_missing_opcode() {
        let err = translate("f0").unwrap_err();
        assert_eq!(err.code().unwrap().to_string(), "translate::missing_opcode");
    }

    #[test]
    fn reject_unknown_opcode() {
        let err = translate("f0 mod 1 2 3").unwrap_err();
        assert_eq!(err.code().unwrap().to_string(), "translate::unknown_opcode");
    }

    #[test]
    fn reject_wrong_arity() {
        let err = translate("f0 add 1 2").unwrap_err();
        assert_eq!(err.code().unwrap().to_string(), "translate::wrong_arity");
        assert!(translate("f0 out").is_err());
        assert!(translate("f0 lin 1 2 3").is_err());
    }

    #[test]
    fn reject_bad_operand() {
        let err = translate("f0 lin one 5").unwrap_err();
        assert_eq!(err.code().unwrap().to_string(), "translate::invalid_operand");
        assert!(err.to_string().contains("one"));
    }

    #[test]
    fn failed_translation_leaves_no_trace() {
        assert!(translate("f0 lin 1 5\nf0 out 1").is_err());
        let program = translate("g0 lin 1 5").unwrap();
        assert_eq!(program.len(), 1);
        assert_eq!(program.labels().index_of("f0"), None);
        assert_eq!(program.labels().index_of("g0"), Some(0));
    }
}
