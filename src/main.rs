mod cli;
mod config;
mod editor;
mod error;
mod import_block;
mod import_statement;
mod importer;
mod js_module;
mod linter;
mod name_formatter;
mod resolver;

use clap::Parser;

use cli::{Cli, Commands};
use editor::{BufferEditor, TerminalUi};
use error::Outcome;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::One { path, line, col, verbose } => run_one(path, line, col, verbose),
        Commands::Goto { path, line, col, verbose } => run_goto(path, line, col, verbose),
        Commands::Fix { path, verbose } => run_fix(path, verbose),
    };

    if let Err(err) = result {
        eprintln!("ImportJS: {err}");
        std::process::exit(1);
    }
}

fn run_one(path: std::path::PathBuf, line: usize, col: usize, verbose: bool) -> anyhow::Result<()> {
    let mut editor = BufferEditor::open(path, (line, col), TerminalUi)?;
    let outcome = importer::import_one(&mut editor, verbose)?;
    print_outcome(&outcome);
    editor.save()?;
    Ok(())
}

fn run_goto(path: std::path::PathBuf, line: usize, col: usize, verbose: bool) -> anyhow::Result<()> {
    let mut editor = BufferEditor::open(path, (line, col), TerminalUi)?;
    let outcome = importer::goto(&mut editor, verbose)?;
    print_outcome(&outcome);
    Ok(())
}

fn run_fix(path: std::path::PathBuf, verbose: bool) -> anyhow::Result<()> {
    let mut editor = BufferEditor::open(path, (1, 1), TerminalUi)?;
    let outcome = importer::fix_imports(&mut editor, verbose)?;
    print_outcome(&outcome);
    editor.save()?;
    Ok(())
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Imported { variable, module, named: true } => {
            println!("ImportJS: Imported `{variable}` from `{module}`");
        }
        Outcome::Imported { module, .. } => {
            println!("ImportJS: Imported `{module}`");
        }
        Outcome::Message(text) => println!("ImportJS: {text}"),
        Outcome::NoOp => {}
    }
}
