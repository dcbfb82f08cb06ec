use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// An import management engine for JavaScript: resolves the variable under
/// the cursor to a module and rewrites the file's import block.
#[derive(Parser, Debug)]
#[command(
    name = "import-js",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import the variable under the cursor, injecting or merging the
    /// resolved module into the file's import block.
    One {
        /// Path to the JavaScript file to operate on.
        path: PathBuf,

        /// 1-based line number of the cursor.
        #[arg(long)]
        line: usize,

        /// 1-based column number of the cursor.
        #[arg(long)]
        col: usize,

        /// Print resolver candidate counts, the discovered config file, and
        /// the linter invocation command line to stderr.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Open the file that defines the variable under the cursor.
    Goto {
        /// Path to the JavaScript file to operate on.
        path: PathBuf,

        /// 1-based line number of the cursor.
        #[arg(long)]
        line: usize,

        /// 1-based column number of the cursor.
        #[arg(long)]
        col: usize,

        /// Print resolver candidate counts, the discovered config file, and
        /// the linter invocation command line to stderr.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run the linter over the whole buffer and fix unused/undefined imports.
    Fix {
        /// Path to the JavaScript file to operate on.
        path: PathBuf,

        /// Print resolver candidate counts, the discovered config file, and
        /// the linter invocation command line to stderr.
        #[arg(short, long)]
        verbose: bool,
    },
}
