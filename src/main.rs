use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
    process::ExitCode,
};

use clap::{ArgAction, Parser, ValueEnum};
use ll1_analyzer::{
    error::{Error, Result},
    grammar::{ll1_parse::ParseStatus, pretty_print::conflicts_to_plaintext},
    Analyzer,
};
use log::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// Symbols, rules, FIRST and FOLLOW sets
    Info,
    /// LL(1) parsing table
    Table,
    /// Panic-mode error recovery table
    Recovery,
    /// LL(1) conflicts
    Conflicts,
    /// Parse trace of --input
    Trace,
    /// Derivation tree of --input (JSON only)
    Tree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Plain,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "ll1-analyzer",
    version,
    about = "FIRST/FOLLOW sets, LL(1) tables and parse traces for a grammar"
)]
struct Cli {
    /// What to print, in order
    #[arg(value_enum, required = true)]
    outputs: Vec<Output>,

    /// Grammar file, one rule per line (reads stdin when absent)
    #[arg(short, long)]
    grammar: Option<PathBuf>,

    /// Space-separated tokens to parse
    #[arg(short, long, default_value = "")]
    input: String,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
    format: OutputFormat,

    /// Give up parsing after this many steps
    #[arg(long)]
    max_steps: Option<usize>,

    /// More logging (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn read_grammar(path: Option<&PathBuf>) -> Result<String> {
    Ok(match path {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut input = String::new();
            io::stdin().lock().read_to_string(&mut input)?;
            input
        }
    })
}

fn render<T: serde::Serialize>(
    format: OutputFormat,
    value: &T,
    plain: impl FnOnce(&T) -> String,
) -> Result<String> {
    Ok(match format {
        OutputFormat::Plain => plain(value),
        OutputFormat::Json => serde_json::to_string(value)?,
    })
}

fn run(cli: &Cli) -> Result<()> {
    let analyzer = Analyzer::load(&read_grammar(cli.grammar.as_ref())?);
    let grammar = analyzer.grammar();

    let needs_trace = cli
        .outputs
        .iter()
        .any(|o| matches!(o, Output::Trace | Output::Tree));
    let trace = needs_trace.then(|| analyzer.analyze_string_with_limit(&cli.input, cli.max_steps));

    for output in &cli.outputs {
        let text = match output {
            Output::Info => render(cli.format, &analyzer.grammar_info(), |t| t.to_plaintext())?,
            Output::Table => {
                render(cli.format, &analyzer.parsing_table_output(), |t| t.to_plaintext())?
            }
            Output::Recovery => render(cli.format, &analyzer.error_recovery_table_output(), |t| {
                t.to_plaintext()
            })?,
            Output::Conflicts => {
                render(cli.format, &analyzer.conflicts(), |c| conflicts_to_plaintext(c))?
            }
            Output::Trace => match &trace {
                Some(trace) => render(cli.format, &trace.to_output(grammar), |t| t.to_plaintext())?,
                None => continue,
            },
            Output::Tree => {
                let tree = trace.as_ref().and_then(|t| analyzer.derivation_tree(t));
                serde_json::to_string(&tree)?
            }
        };
        println!("{}", text);
    }

    match trace.map(|t| t.status) {
        Some(ParseStatus::StepLimitExceeded(limit)) => Err(Error::StepLimitExceeded(limit)),
        _ => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
