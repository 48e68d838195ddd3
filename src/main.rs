// lrdom: parse a C or C++ file and report the tree the reductions built

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lrdom::action::CompletionNode;
use lrdom::visit::{count_ambiguities, count_problems};
use lrdom::{Dialect, Parser, ParserOptions};

#[derive(ClapParser, Debug)]
#[command(name = "lrdom")]
#[command(about = "Build a C/C++ syntax tree and report ambiguities, problems and completions")]
struct Cli {
    /// Source file to parse
    file: PathBuf,

    /// Parse as C++ instead of C
    #[arg(long)]
    cpp: bool,

    /// Accept GNU keyword spellings such as `__const__`
    #[arg(long)]
    gnu: bool,

    /// Byte offset of the code-completion caret
    #[arg(long, value_name = "OFFSET")]
    complete_at: Option<usize>,

    /// Parse the whole file as a single expression
    #[arg(long)]
    expression: bool,

    /// Drop initializer-list elements that cannot contain a name
    #[arg(long)]
    skip_trivial_initializers: bool,

    /// Print the tree
    #[arg(long)]
    dump: bool,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn options(&self) -> ParserOptions {
        let dialect = if self.cpp { Dialect::Cpp } else { Dialect::C };
        let mut options = ParserOptions::new(dialect)
            .with_gnu_extensions(self.gnu)
            .with_skip_trivial_initializers(self.skip_trivial_initializers);
        if let Some(offset) = self.complete_at {
            options = options.with_completion_offset(offset);
        }
        options
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_completion(completion: Option<&CompletionNode>) {
    let Some(completion) = completion else {
        println!("completion: none");
        return;
    };

    println!("completion prefix: {:?}", completion.prefix().unwrap_or(""));
    for entry in completion.entries() {
        match entry.context {
            Some(context) => println!("  {} ({context:?}) at {}", entry.name.text, entry.name.span),
            None => println!("  {} (unclaimed) at {}", entry.name.text, entry.name.span),
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let source = fs::read_to_string(&cli.file)?;
    info!("Parsing {}", cli.file.display());

    let parser = Parser::with_options(&source, cli.options())?;

    if cli.expression {
        let outcome = parser.parse_expression()?;
        println!(
            "expression {} at {}",
            if outcome.expression.is_problem() { "with problem" } else { "parsed" },
            outcome.expression.span
        );
        if cli.complete_at.is_some() {
            print_completion(outcome.completion.as_ref());
        }
        if cli.dump {
            println!("{:#?}", outcome.expression);
        }
        return Ok(());
    }

    let outcome = parser.parse_translation_unit()?;
    println!(
        "{} declarations, {} ambiguities, {} problems",
        outcome.unit.declarations().len(),
        count_ambiguities(&outcome.unit),
        count_problems(&outcome.unit)
    );
    if cli.complete_at.is_some() {
        print_completion(outcome.completion.as_ref());
    }
    if cli.dump {
        println!("{:#?}", outcome.unit);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
