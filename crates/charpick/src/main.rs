//! charpick - Reveal or copy chosen characters of a secret.
//!
//! Sites that ask for "the 2nd, 4th and 7th character of your password"
//! only need those characters. charpick lets you pick them without the
//! whole value ever being shown or copied.
//!
//! # Usage
//!
//! ```bash
//! # Interactive session over a password
//! charpick reveal
//!
//! # Several fields; --plain values are not protected
//! charpick reveal --field Password --field "memorable word" --plain UserName
//!
//! # One-shot: characters 2, 4 and 7, shown in clear and copied
//! charpick pick --positions 2,4,7 --show --copy
//!
//! # Machine-readable view
//! charpick pick --positions 1,3 --json
//! ```

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tokio::runtime::{Handle, Runtime};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use charpick::session::{render, Session};
use charpick::sink::{ArboardBackend, ArboardSink, ClearPolicy};
use charpick::{FieldSpec, PromptedFields};
use charpick_core::config::MAX_ROWS;
use charpick_core::fields::PASSWORD_KEY;
use charpick_core::{ClipboardExporter, Config, FieldSet, RevealController};

/// Reveal or copy chosen characters of a secret without exposing the rest.
#[derive(Parser)]
#[command(name = "charpick")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file [default: ~/.config/charpick/config.toml]
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only show errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enter field values and choose characters interactively
    Reveal {
        /// Protected field to enter (repeatable) [default: Password]
        #[arg(long = "field", value_name = "NAME")]
        fields: Vec<String>,

        /// Unprotected field to enter (repeatable)
        #[arg(long = "plain", value_name = "NAME")]
        plain: Vec<String>,

        /// Number of selector rows
        #[arg(long, value_name = "N")]
        rows: Option<usize>,
    },

    /// Pick characters at fixed positions from one value
    Pick {
        /// 1-based character positions, ascending (e.g. 2,4,7)
        #[arg(long, short = 'p', value_delimiter = ',', required = true)]
        positions: Vec<usize>,

        /// Name of the field to enter
        #[arg(long, default_value = PASSWORD_KEY)]
        field: String,

        /// The value is not protected (read with echo)
        #[arg(long)]
        plain: bool,

        /// Show the characters in clear
        #[arg(long)]
        show: bool,

        /// Copy the characters to the clipboard
        #[arg(long)]
        copy: bool,

        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },
}

fn setup_logging(level: &str) {
    // RUST_LOG takes precedence over the CLI flags
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Load configuration from `--config` or the default location.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration from specified path");
            Config::load_from(path).context("Failed to load configuration")
        }
        None => {
            let config = Config::load().context("Failed to load configuration")?;
            match Config::default_path() {
                Some(path) if path.exists() => info!(path = %path.display(), "Loaded configuration"),
                _ => debug!("No config file found, using defaults"),
            }
            Ok(config)
        }
    }
}

/// Row count from `--rows` or the configuration.
fn resolve_rows(config: &Config, requested: Option<usize>) -> Result<usize> {
    let rows = requested.unwrap_or(config.selection.rows);
    if rows == 0 || rows > MAX_ROWS {
        bail!("Row count must be between 1 and {}, got {}", MAX_ROWS, rows);
    }
    Ok(rows)
}

fn clipboard_sink(config: &Config, handle: Handle) -> ArboardSink {
    ArboardSink::new(
        ArboardBackend::default(),
        handle,
        ClearPolicy::from_config(config),
    )
}

/// Handle the reveal command.
fn cmd_reveal(
    config: &Config,
    handle: Handle,
    fields: Vec<String>,
    plain: Vec<String>,
    rows: Option<usize>,
) -> Result<ExitCode> {
    let rows = resolve_rows(config, rows)?;

    let mut specs: Vec<FieldSpec> = fields.into_iter().map(FieldSpec::protected).collect();
    specs.extend(plain.into_iter().map(FieldSpec::plain));
    if specs.is_empty() {
        specs.push(FieldSpec::protected(PASSWORD_KEY));
    }

    let mut input = io::stdin().lock();
    let prompted =
        PromptedFields::prompt(&specs, &mut input).context("Failed to read field values")?;
    let field_set = FieldSet::collect(
        &prompted,
        |key| !config.is_excluded(key),
        config.security.seal_fields,
    );
    drop(prompted);

    if field_set.is_empty() {
        eprintln!("Nothing to reveal: every field is empty or excluded.");
        return Ok(ExitCode::FAILURE);
    }

    let mut session = Session::new(&field_set, rows, clipboard_sink(config, handle));
    let mut stdout = io::stdout().lock();
    session
        .run(input, &mut stdout)
        .context("Terminal I/O failed")?;

    Ok(ExitCode::SUCCESS)
}

/// Options of the pick command.
struct PickArgs {
    positions: Vec<usize>,
    field: String,
    plain: bool,
    show: bool,
    copy: bool,
    json: bool,
}

/// Handle the pick command.
fn cmd_pick(config: &Config, runtime: &Runtime, args: PickArgs) -> Result<ExitCode> {
    let rows = resolve_rows(config, Some(config.selection.rows.max(args.positions.len())))?;

    let spec = if args.plain {
        FieldSpec::plain(args.field)
    } else {
        FieldSpec::protected(args.field)
    };
    let mut input = io::stdin().lock();
    let prompted = PromptedFields::prompt(std::slice::from_ref(&spec), &mut input)
        .context("Failed to read field value")?;
    // The field was named explicitly, so the exclusion list does not apply
    let field_set = FieldSet::collect(&prompted, |_| true, config.security.seal_fields);
    drop(prompted);

    let Some(field) = field_set.get(0) else {
        bail!("No value entered for '{}'", spec.key);
    };

    let mut controller = RevealController::new(rows);
    controller.select_field(field);
    for (row, &position) in args.positions.iter().enumerate() {
        controller.set_row_index(row, position).with_context(|| {
            format!("Cannot use position {} for character {}", position, row + 1)
        })?;
    }
    if args.show && controller.is_masked() {
        controller.toggle_mask()?;
    }

    let view = controller.view();
    if args.json {
        let json = serde_json::to_string_pretty(&view).context("Failed to serialize view")?;
        println!("{}", json);
    } else {
        render(&view, &mut io::stdout().lock()).context("Failed to write output")?;
    }
    drop(view);

    if args.copy {
        let sink = clipboard_sink(config, runtime.handle().clone());
        let count = ClipboardExporter::new(&sink).export(&controller)?;

        // The clipboard only holds the text while this process runs
        match sink.policy().delay_for(field.is_masked()) {
            Some(delay) => {
                eprintln!(
                    "Copied {} character(s); the clipboard is cleared in {} seconds.",
                    count,
                    delay.as_secs()
                );
                runtime.block_on(tokio::time::sleep(delay));
            }
            None => {
                eprint!("Copied {} character(s); press Enter to exit.", count);
                io::stderr().flush().ok();
                let mut line = String::new();
                input.read_line(&mut line).context("Failed to read input")?;
            }
        }
    }

    controller.close();
    Ok(ExitCode::SUCCESS)
}

fn run(cli: Cli, runtime: &Runtime) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Reveal {
            fields,
            plain,
            rows,
        } => cmd_reveal(&config, runtime.handle().clone(), fields, plain, rows),
        Commands::Pick {
            positions,
            field,
            plain,
            show,
            copy,
            json,
        } => cmd_pick(
            &config,
            runtime,
            PickArgs {
                positions,
                field,
                plain,
                show,
                copy,
                json,
            },
        ),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Determine log level from CLI flags
    let log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    setup_logging(log_level);

    debug!(version = env!("CARGO_PKG_VERSION"), "Starting charpick");

    // Timers for clearing the clipboard run on the runtime; the terminal
    // session itself stays on this thread.
    let runtime = match Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli, &runtime) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
