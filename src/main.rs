use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use lox::ast_printer::AstPrinter;
use lox::scanner::Scanner;
use lox::{Lox, Status};

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log (level from RUST_LOG, default debug)
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes a file, printing each token
    Tokenize { filename: PathBuf },

    /// Parses a file and prints its AST
    Parse {
        filename: PathBuf,

        /// Dump the AST as JSON instead of S-expressions
        #[arg(long)]
        json: bool,
    },

    /// Evaluates a file holding a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs a Lox program; without a file, starts the prompt
    Run { filename: Option<PathBuf> },

    /// Interactive prompt; globals persist between lines
    Repl,
}

/// Memory-map `filename`.  The map is validated as UTF-8 by the caller.
fn map_file(filename: &Path) -> Result<Mmap> {
    info!("Mapping file: {:?}", filename);
    let file = File::open(filename).with_context(|| format!("Failed to open file {:?}", filename))?;

    // SAFETY: the file is opened read-only and not modified while mapped.
    let map = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to map file {:?}", filename))?;

    info!("Mapped {} bytes from {:?}", map.len(), filename);
    Ok(map)
}

fn source_text<'m>(map: &'m Mmap, filename: &Path) -> Result<&'m str> {
    std::str::from_utf8(map).with_context(|| format!("{:?} is not valid UTF-8", filename))
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'lox::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("lox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn exit_with(status: Status) {
    if status != Status::Ok {
        debug!("Exiting with status {:?}", status);
        std::process::exit(status.exit_code());
    }
}

fn tokenize(filename: &Path) -> Result<()> {
    let map = map_file(filename)?;
    let mut tokenized = true;

    for token in Scanner::new(source_text(&map, filename)?) {
        match token {
            Ok(token) => println!("{}", token),
            Err(e) => {
                tokenized = false;
                eprintln!("{}", e);
            }
        }
    }

    if !tokenized {
        exit_with(Status::StaticError);
    }
    Ok(())
}

fn parse(filename: &Path, json: bool) -> Result<()> {
    let map = map_file(filename)?;
    let mut lox = Lox::default();

    let Some(statements) = lox.parse_program(source_text(&map, filename)?) else {
        exit_with(Status::StaticError);
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&statements)?);
    } else {
        let printer = AstPrinter;
        for stmt in &statements {
            println!("{}", printer.print_stmt(stmt));
        }
    }
    Ok(())
}

fn evaluate(filename: &Path) -> Result<()> {
    let map = map_file(filename)?;
    let mut lox = Lox::default();

    match lox.evaluate_source(source_text(&map, filename)?) {
        Ok(value) => println!("{}", value),
        Err(status) => exit_with(status),
    }
    Ok(())
}

fn run_file(filename: &Path) -> Result<()> {
    let map = map_file(filename)?;
    let source = source_text(&map, filename)?;
    info!("Provided input:\n {}", source);

    let status = Lox::default().run_source(source);
    exit_with(status);
    Ok(())
}

fn repl() -> Result<()> {
    let mut lox = Lox::default();
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        // Errors are reported by the session; the prompt keeps going.
        let status = lox.run_source(&line);
        debug!("REPL line finished with {:?}", status);
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename } => tokenize(&filename),
        Commands::Parse { filename, json } => parse(&filename, json),
        Commands::Evaluate { filename } => evaluate(&filename),
        Commands::Run {
            filename: Some(filename),
        } => run_file(&filename),
        Commands::Run { filename: None } | Commands::Repl => repl(),
    }
}
