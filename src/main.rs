//! Luming CLI
//!
//! Usage:
//!   luming preview [FILE] [-o OUT] [-c CONFIG]
//!   luming generate [FILE] [-o DIR] [-f html|vue|react] [-c CONFIG]
//!   luming check [FILE] [--json]
//!
//! Global options:
//!   --root <NAME>   Root template when the source has no structure lines (repeatable)
//!   -v              Increase log verbosity (repeatable)

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};

use luming::{
    compile, generate_files, render_preview_html, write_files, CompileMode, CompileOptions,
    CompileResult, Config, Framework, LumingError,
};

#[derive(Parser)]
#[command(name = "luming")]
#[command(about = "Line-oriented layout notation for UI structure")]
struct Cli {
    /// Root template to expand when the source has no structure lines
    #[arg(long = "root", value_name = "NAME", global = true)]
    roots: Vec<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render an HTML preview of every scene
    Preview {
        /// Input file (reads from stdin if not provided)
        input: Option<PathBuf>,

        /// Output HTML file
        #[arg(short, long, default_value = "luming.preview.html")]
        output: PathBuf,

        /// Project config file (TOML format)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate one component file per template
    Generate {
        /// Input file (reads from stdin if not provided)
        input: Option<PathBuf>,

        /// Output directory (defaults to the config value, else `generated`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Component flavour (defaults to the config value, else `html`)
        #[arg(short, long, value_enum)]
        framework: Option<Framework>,

        /// Project config file (TOML format)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Report diagnostics; exits with status 1 when any is an error
    Check {
        /// Input file (reads from stdin if not provided)
        input: Option<PathBuf>,

        /// Print the whole compile result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// `RUST_LOG` wins; otherwise `-v` flags pick the level
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("luming={}", level).into()),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<i32, LumingError> {
    let options = CompileOptions::new().with_root_names(cli.roots);

    match cli.command {
        Command::Preview {
            input,
            output,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let (source, name) = read_source(input.as_deref())?;
            let result = compile(&source, &options.with_mode(CompileMode::Preview));
            report(&result, &source, &name);

            let html = render_preview_html(&result, &config.preview);
            fs::write(&output, html).map_err(|source| LumingError::Write {
                path: output.clone(),
                source,
            })?;
            println!("Wrote {}", output.display());
            Ok(0)
        }
        Command::Generate {
            input,
            output,
            framework,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let (source, name) = read_source(input.as_deref())?;
            let result = compile(&source, &options.with_mode(CompileMode::Generate));
            report(&result, &source, &name);

            let framework = framework.unwrap_or(config.generate.framework);
            let out_dir = output.unwrap_or(config.generate.out_dir);
            let files = generate_files(&result, framework);
            write_files(&out_dir, &files).map_err(|source| LumingError::Write {
                path: out_dir.clone(),
                source,
            })?;
            println!(
                "Wrote {} {} file(s) to {}",
                files.len(),
                framework,
                out_dir.display()
            );
            Ok(0)
        }
        Command::Check { input, json } => {
            let (source, name) = read_source(input.as_deref())?;
            let result = compile(&source, &options);

            if json {
                match serde_json::to_string_pretty(&result) {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        eprintln!("Error: failed to serialize result: {}", e);
                        return Ok(1);
                    }
                }
            } else {
                report(&result, &source, &name);
                if result.diagnostics.is_empty() {
                    println!("{}: ok", name);
                }
            }

            Ok(if result.has_errors() { 1 } else { 0 })
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config, LumingError> {
    match path {
        Some(path) => Ok(Config::from_file(path)?),
        None => Ok(Config::default()),
    }
}

/// Read the input file, or stdin when none is given. Returns the source and
/// a display name for diagnostics.
fn read_source(path: Option<&Path>) -> Result<(String, String), LumingError> {
    match path {
        Some(path) => {
            let source = fs::read_to_string(path).map_err(|source| LumingError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            Ok((source, path.display().to_string()))
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(LumingError::Stdin)?;
            Ok((buffer, "<stdin>".to_string()))
        }
    }
}

/// Print every diagnostic with source context
fn report(result: &CompileResult, source: &str, name: &str) {
    for diagnostic in &result.diagnostics {
        eprint!("{}", diagnostic.format(source, name));
    }
}
