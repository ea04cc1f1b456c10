//! Playground CLI - run a source file through an external interpreter
//!
//! Provides subcommands for initializing configuration and running programs
//! with captured output and classified diagnostics.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use playground::external::{CommandInterpreter, CommandSpec};
use playground::harness::sink::StdoutChannel;
use playground::harness::storage;
use playground::harness::{HarnessConfig, Playground, RunOutcome, Tab};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "playground")]
#[command(about = "Run programs through an external interpreter and observe output and diagnostics", long_about = None)]
struct Cli {
    /// Root directory holding the configuration
    #[arg(short, long, default_value = ".playground", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration
    Init {
        /// Interpreter executable to record in the configuration
        #[arg(long)]
        interpreter: Option<String>,

        /// Arguments for the interpreter executable
        #[arg(long = "arg")]
        args: Vec<String>,

        /// Decode stdout lines that are JSON instead of printing them verbatim
        #[arg(long)]
        json_lines: bool,
    },

    /// Run a source file once
    Run {
        /// Source file to run
        file: PathBuf,

        /// Interpreter executable (overrides the configuration)
        #[arg(long)]
        interpreter: Option<String>,

        /// Arguments for the interpreter executable
        #[arg(long = "arg")]
        args: Vec<String>,

        /// Decode stdout lines that are JSON instead of printing them verbatim
        #[arg(long)]
        json_lines: bool,

        /// Print the session snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = storage::load_or_default(&cli.root)?;

    let level = if config.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init {
            interpreter,
            args,
            json_lines,
        } => {
            let config = HarnessConfig {
                root: cli.root.clone(),
                interpreter: interpreter
                    .map(|program| CommandSpec::new(program).args(args).json_lines(json_lines)),
                ..HarnessConfig::default()
            };

            storage::init_storage(&config.root)?;
            storage::write_config(&config)?;
            println!("Initialized playground at {:?}", cli.root);
        }

        Commands::Run {
            file,
            interpreter,
            args,
            json_lines,
            json,
        } => {
            let spec = match interpreter {
                Some(program) => CommandSpec::new(program).args(args).json_lines(json_lines),
                None => match config.interpreter.clone() {
                    Some(spec) if json_lines => spec.json_lines(true),
                    Some(spec) => spec,
                    None => bail!("no interpreter configured; pass --interpreter or run `playground init --interpreter <program>`"),
                },
            };
            let code = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read source file: {:?}", file))?;

            let mut playground =
                Playground::with_config(CommandInterpreter::new(spec), code, &config)?;
            if !json {
                // Console lines are printed as the program emits them.
                println!("== {}", playground.tab_label(Tab::Console));
                playground
                    .controller_mut()
                    .set_channel(Box::new(StdoutChannel));
            }
            let outcome = playground.run()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&playground.snapshot())?);
            } else {
                if !playground.diagnostics().is_empty() {
                    println!("== {}", playground.tab_label(Tab::Problems));
                    for line in playground.diagnostics() {
                        println!("{}", line);
                    }
                }
                if let Some(summary) = playground.session().last_run() {
                    println!("Elapsed: {:.3}s", summary.elapsed.as_secs_f64());
                }
            }

            if outcome == RunOutcome::Failure {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}
