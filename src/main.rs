//! pattern-implement
//!
//! Generates decorator implementations of Go interfaces and function types.

mod backend;
mod feedback;
mod frontend;
mod generator;
mod implementations;
mod signature;
mod template;
mod types;
mod utils;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};

use backend::printer::print_decls;
use generator::Generator;
use utils::Error;

/// Go decorator generator
#[derive(Parser, Debug)]
#[command(name = "pattern-implement")]
#[command(version)]
#[command(about = "Generate decorator implementations for Go interfaces")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Read the input from this file instead of stdin
    #[arg(short, long, global = true, value_name = "FILE")]
    file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an implementation of the input
    Implement {
        /// Implementation to generate (see `list`)
        implementation: String,

        /// Package the input types live in
        #[arg(short, long)]
        package: String,
    },
    /// List implementations
    List {
        /// Only those that accept the input
        #[arg(short, long)]
        available: bool,

        /// Package the input types live in
        #[arg(short, long, default_value = "pkg")]
        package: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("Error: {:#}", err);
        let code = match err.downcast_ref::<Error>() {
            Some(err) => err.exit_code(),
            None => Error::Io(String::new()).exit_code(),
        };
        process::exit(code);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Implement { implementation, package } => {
            let source = read_input(cli.file.as_ref())?;
            let decls = Generator::new(package).implement(&source, implementation)?;
            println!("{}", print_decls(&decls));
        }
        Commands::List { available, package, json } => {
            let generator = Generator::new(package);
            let summaries = if *available {
                let source = read_input(cli.file.as_ref())?;
                generator.list_available(&source)?
            } else {
                generator.list_all()
            };

            if *json {
                println!("{}", feedback::to_json(&summaries).context("encoding implementation list")?);
            } else if !summaries.is_empty() {
                println!("{}", feedback::render_list(&summaries));
            }
        }
    }
    Ok(())
}

/// Whole input from `file`, or stdin when absent
fn read_input(file: Option<&PathBuf>) -> anyhow::Result<String> {
    let source = match file {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            buf
        }
    };

    if source.trim().is_empty() {
        return Err(Error::Io("input is empty".to_string()).into());
    }
    Ok(source)
}
