use clap::Parser;
use mscript::prelude::*;
use owo_colors::OwoColorize;
use std::fmt;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Evaluate an arithmetic script, printing `<line>: <value>` per statement.
///
/// Without a file, starts an interactive prompt where every line is a script.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Script to run.
    file: Option<PathBuf>,

    /// Print the statement tree before evaluating.
    #[arg(short, long)]
    dump: bool,

    /// Print every reduction step to stderr.
    #[arg(short, long)]
    trace: bool,

    /// Never color diagnostics.
    #[arg(long)]
    no_color: bool,
}

///
/// Statement output goes straight to stdout.
///
struct Console(io::Stdout);

impl fmt::Write for Console {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_all(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let color = !args.no_color && io::stderr().is_terminal();

    match &args.file {
        Some(path) => run_file(path.clone(), &args, color),
        None => match repl(&args, color) {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        },
    }
}

fn run_file(path: PathBuf, args: &Args, color: bool) -> ExitCode {
    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(e) => {
            if color {
                eprint!("{}", "error".red().bold());
            } else {
                eprint!("error");
            }
            eprintln!(": failed to read `{}`: {e}", path.display());
            return ExitCode::from(2);
        }
    };

    match execute(&source, &path.display().to_string(), args, color) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprint!("{}", Report::new(&e, &source).colored(color));
            ExitCode::FAILURE
        }
    }
}

fn execute(source: &str, file: &str, args: &Args, color: bool) -> Result<(), Error> {
    let tokens = Lexer::with_file(source, file).collect::<Result<Vec<_>, _>>()?;

    let mut reducer = Reducer::new(tokens);
    if args.trace {
        reducer = reducer.on_reduce(|rule, tokens| trace(rule, tokens, color));
    }
    let statements = reducer.into_statements()?;

    if args.dump {
        print!("{statements}");
    }

    statements.eval(&mut Context::new(Console(io::stdout())))
}

fn trace(rule: Rule, tokens: &[Token], color: bool) {
    let rule = format!("{:>13}", rule.to_string());
    let line = tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");

    if color {
        eprintln!("{}  {}", rule.dimmed(), line.dimmed());
    } else {
        eprintln!("{rule}  {line}");
    }
}

fn repl(args: &Args, color: bool) -> Result<(), io::Error> {
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "{} ", ">".green())?;
        stdout.flush()?;

        let Some(Ok(input)) = io::stdin().lines().next() else {
            writeln!(stdout, "{}", "exiting...".yellow())?;
            return Ok(());
        };

        if let Err(e) = execute(&input, "<repl>", args, color) {
            eprint!("{}", Report::new(&e, &input).colored(color));
        }
    }
}
