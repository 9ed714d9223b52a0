//! # cxx-dump CLI

use clap::Parser;
use cxx_dump::collectors::{collect_sources, CollectOptions};
use cxx_dump::{create_preprocessor, dump_file, DumpOptions, Mode, OutputFormat};
use cxx_frontend::config::runtime::{LogLevel as RuntimeLevel, LoggingPreferences};
use cxx_frontend::logging::{self, codes, FacadeLogger, LoggingService};
use cxx_frontend::preprocessor::FilterDefinitions;
use cxx_frontend::{log_error, log_info, log_success};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(name = "cxx-dump", version, about = "Dump rewritten C++ token streams and declaration outlines")]
struct Cli {
    /// Source files or directories
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Replace every NAME token (NAME or NAME=VALUE)
    #[arg(short = 'D', long = "define", value_name = "NAME[=VALUE]")]
    defines: Vec<String>,

    /// Replace NAME(...) calls, dropping the arguments (NAME or NAME=VALUE)
    #[arg(short = 'M', long = "macro", value_name = "NAME[=VALUE]")]
    macros: Vec<String>,

    /// TOML file with [defines] and [macros] tables
    #[arg(long, value_name = "FILE")]
    definitions: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Mode::Tokens)]
    mode: Mode,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print comments and directives attached to tokens
    #[arg(long)]
    trivia: bool,

    /// Only take sources directly inside the given directories
    #[arg(long)]
    no_recursive: bool,

    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(long, value_enum, default_value_t = LogOutput::Facade)]
    log_output: LogOutput,
}

/// Where library log events go
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum LogOutput {
    /// Through the `log` facade to env_logger (honours RUST_LOG)
    Facade,
    /// Human readable lines on stderr
    Console,
    /// JSON lines on stderr
    Json,
}

fn init_logging(verbose: u8, output: LogOutput) -> Result<(), String> {
    let (filter, level) = match verbose {
        0 => ("warn", RuntimeLevel::Warning),
        1 => ("info", RuntimeLevel::Info),
        _ => ("debug", RuntimeLevel::Debug),
    };

    let preferences = LoggingPreferences {
        min_log_level: level,
        use_structured_logging: output == LogOutput::Json,
        ..LoggingPreferences::default()
    };
    logging::config::init_runtime_preferences(preferences)?;

    match output {
        LogOutput::Facade => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
                .init();
            let service = LoggingService::new(Arc::new(FacadeLogger), level.to_events_log_level());
            logging::init_global_logging_with_service(Arc::new(service))
        }
        LogOutput::Console | LogOutput::Json => logging::init_global_logging(),
    }
}

fn load_definitions(cli: &Cli) -> Result<FilterDefinitions, Box<dyn std::error::Error>> {
    let mut definitions = match &cli.definitions {
        Some(path) => FilterDefinitions::from_file(path)?,
        None => FilterDefinitions::new(),
    };

    let mut overrides = FilterDefinitions::new();
    for define in &cli.defines {
        overrides.add_define(define)?;
    }
    for macro_definition in &cli.macros {
        overrides.add_macro(macro_definition)?;
    }
    definitions.merge(overrides);

    Ok(definitions)
}

fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let start = Instant::now();

    let definitions = load_definitions(&cli)?;
    let mut engine = create_preprocessor(&definitions)?;
    log_info!("Filters registered", "count" => definitions.len());

    let sources = collect_sources(
        &cli.paths,
        CollectOptions {
            recursive: !cli.no_recursive,
        },
    );
    if sources.is_empty() {
        eprintln!("No C/C++ sources found");
        return Ok(false);
    }

    let options = DumpOptions {
        mode: cli.mode,
        format: cli.format,
        with_trivia: cli.trivia,
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut failed = 0usize;
    let multiple = sources.len() > 1;

    for path in &sources {
        if multiple && options.format == OutputFormat::Text {
            writeln!(out, "==> {} <==", path.display())?;
        }

        let result = logging::with_file_context(path.clone(), || {
            dump_file(&mut engine, path, options, &mut out)
        });

        if let Err(error) = result {
            failed += 1;
            out.flush()?;
            eprintln!("{}: {}", path.display(), error);
            log_error!(error.error_code(), "File skipped",
                "file" => path.display(),
                "error" => error
            );
        }
    }
    out.flush()?;

    log_success!(codes::success::PREPROCESSING_COMPLETE, "Dump completed",
        "files" => sources.len(),
        "failed" => failed,
        "duration_ms" => start.elapsed().as_millis()
    );

    Ok(failed == 0)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(message) = init_logging(cli.verbose, cli.log_output) {
        logging::safe_log_error(
            codes::system::INITIALIZATION_FAILURE,
            &format!("Logging setup failed: {}", message),
        );
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("Error: {}", error);
            ExitCode::FAILURE
        }
    }
}
