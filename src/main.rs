use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::{miette, Result};

use smalt::{Machine, Program, RegisterFile, Translator};

/// Smalt is a translator and virtual machine for the SML register language.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Quickly provide a `.sml` file to run
    path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Translate a `.sml` file and execute it
    Run {
        /// `.sml` file to run
        name: PathBuf,
        /// Number of machine registers
        #[arg(short, long, default_value_t = RegisterFile::DEFAULT_CAPACITY)]
        registers: usize,
        /// Produce minimal output, suited for blackbox tests
        #[arg(short, long)]
        minimal: bool,
    },
    /// Translate a `.sml` file without running it
    Check {
        /// File to check
        name: PathBuf,
    },
    /// Print the decoded statements of a `.sml` file
    Dump {
        /// File to decode
        name: PathBuf,
    },
}

fn main() -> Result<()> {
    use MsgColor::*;
    let args = Args::parse();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .context_lines(smalt::DIAGNOSTIC_CONTEXT_LINES)
                .build(),
        )
    }))?;

    match args.command {
        Some(Command::Run {
            name,
            registers,
            minimal,
        }) => run(&name, registers, minimal),
        Some(Command::Check { name }) => {
            file_message(Green, "Checking", &name);
            let _ = translate(&name)?;
            message(Green, "Success", "no errors found!");
            Ok(())
        }
        Some(Command::Dump { name }) => {
            let program = translate(&name)?;
            for statement in &program {
                println!("{statement}");
            }
            Ok(())
        }
        None => match args.path {
            Some(path) => run(&path, RegisterFile::DEFAULT_CAPACITY, false),
            None => {
                println!("\n~ smalt v{VERSION} ~");
                println!("{SHORT_INFO}");
                Ok(())
            }
        },
    }
}

fn run(name: &Path, registers: usize, minimal: bool) -> Result<()> {
    if !minimal {
        file_message(MsgColor::Green, "Translating", name);
    }
    let program = translate(name)?;
    let mut machine = Machine::with_io(
        program,
        RegisterFile::new(registers),
        std::io::stdout(),
        std::io::stderr(),
    );
    if !minimal {
        message(MsgColor::Green, "Running", "translated program");
    }
    machine.execute()?;
    if !minimal {
        file_message(MsgColor::Green, "Completed", name);
    }
    Ok(())
}

fn translate(name: &Path) -> Result<Program> {
    let src = fs::read_to_string(name).map_err(|e| {
        miette!(
            code = "translate::source_unavailable",
            "cannot read {}: {e}",
            name.display(),
        )
    })?;
    Translator::new(&src).translate()
}

#[allow(unused)]
enum MsgColor {
    Green,
    Cyan,
    Red,
}

fn file_message(color: MsgColor, left: &str, right: &Path) {
    message(color, left, &format!("target {}", right.display()));
}

fn message(color: MsgColor, left: &str, right: &str) {
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Cyan => left.cyan(),
        MsgColor::Red => left.red(),
    };
    println!("{left:>12} {right}");
}

const SHORT_INFO: &str = r"
Welcome to smalt, a translator and virtual machine for SML,
the small register machine language.
Please use `-h` or `--help` to access the usage instructions.
";

const VERSION: &str = env!("CARGO_PKG_VERSION");
