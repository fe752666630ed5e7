// ParcelGrid CLI - parcel area reconciliation
// `pgrid reconcile` for one-shot runs, `pgrid shell` for the interactive form

mod exit_codes;
mod reconcile;
mod shell;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use parcelgrid_config::{OutputFormat, Settings};
use parcelgrid_core::FormError;
use parcelgrid_io::IoError;
use parcelgrid_recon::{DomainError, JobError};

use exit_codes::{
    io_exit_code, EXIT_ERROR, EXIT_INVALID_INPUT, EXIT_IO, EXIT_SUCCESS, EXIT_TOLERANCE_EXCEEDED,
    EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "pgrid")]
#[command(about = "Reconcile sub-parcel areas against a registered total area")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Log filter for diagnostics on stderr (e.g. "debug", "parcelgrid_io=debug")
    #[arg(long, global = true, env = "PGRID_LOG", default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rescale parcel areas so they sum to the registered area
    #[command(after_help = "\
Examples:
  pgrid reconcile -r 1000 -c 998 -p 1=500 -p 2=498
  pgrid reconcile -r 1000 -c 998 --input parcels.csv --format tsv
  pgrid reconcile --job lot12.toml --format json -o lot12.json
  cat parcels.csv | pgrid reconcile -r 1000 -c 998 --input -

Exit codes:
  0  within permissible error
  3  difference exceeds permissible error (areas left unscaled)
  4  invalid input")]
    Reconcile(reconcile::ReconcileArgs),

    /// Show the permissible error for a registered area
    #[command(after_help = "\
Examples:
  pgrid tolerance -r 1000
  pgrid tolerance -r 1000 -c 998")]
    Tolerance {
        /// Registered area (m²)
        #[arg(long, short = 'r', allow_negative_numbers = true)]
        registered: f64,

        /// Calculated area (m²); also prints the difference and verdict
        #[arg(long, short = 'c', allow_negative_numbers = true)]
        calculated: Option<f64>,

        /// Decimal places
        #[arg(long)]
        decimals: Option<usize>,
    },

    /// Write a blank parcel list with labels 1..N
    #[command(after_help = "\
Examples:
  pgrid template --count 5 > parcels.csv
  pgrid template --count 12 -o lot12.csv")]
    Template {
        /// Number of parcels
        #[arg(long, short = 'n')]
        count: usize,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Interactive parcel form with undo/redo
    Shell,

    /// Show or initialize the settings file
    #[command(subcommand)]
    Settings(SettingsCommands),
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Print the settings file path
    Path,
    /// Print the effective settings as JSON
    Show,
    /// Write a commented default settings file
    Init,
    /// Change one setting and save the file
    #[command(after_help = "\
Examples:
  pgrid settings set output.format tsv
  pgrid settings set output.decimals 3")]
    Set {
        /// Dotted key, e.g. output.format
        key: String,
        value: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Fixed-width table with calculation summary
    Table,
    /// Tab-separated table
    Tsv,
    Csv,
    Json,
}

impl From<OutputFormat> for Format {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Table => Format::Table,
            OutputFormat::Tsv => Format::Tsv,
            OutputFormat::Csv => Format::Csv,
            OutputFormat::Json => Format::Json,
        }
    }
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nengine:  parcelgrid-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nengine:  parcelgrid-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
        )
    }
}

fn init_logging(filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_new(filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    // The fmt subscriber also installs the `log` bridge, so library
    // `log::debug!` records land here.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log);

    let settings = Settings::load();
    log::debug!("settings from {}: {settings:?}", Settings::config_path_display());

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: pgrid <command> [options]");
            eprintln!("       pgrid --help for more information");
            Ok(())
        }
        Some(Commands::Reconcile(args)) => reconcile::cmd_reconcile(args, &settings),
        Some(Commands::Tolerance { registered, calculated, decimals }) => {
            cmd_tolerance(registered, calculated, decimals.unwrap_or(settings.decimals))
        }
        Some(Commands::Template { count, output }) => cmd_template(count, output),
        Some(Commands::Shell) => shell::cmd_shell(&settings),
        Some(Commands::Settings(cmd)) => cmd_settings(cmd, &settings),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INVALID_INPUT, message: msg.into(), hint: None }
    }

    pub fn exceeded(msg: impl Into<String>) -> Self {
        Self { code: EXIT_TOLERANCE_EXCEEDED, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<DomainError> for CliError {
    fn from(err: DomainError) -> Self {
        let hint = match err {
            DomainError::InvalidRegisteredArea(_) | DomainError::InvalidCalculatedArea(_) => {
                "both areas must be greater than zero"
            }
            DomainError::AreaOutOfRange { .. } | DomainError::TotalOutOfRange => {
                "parcel areas are too large to round to whole square metres"
            }
        };
        CliError::input(err.to_string()).with_hint(hint)
    }
}

impl From<JobError> for CliError {
    fn from(err: JobError) -> Self {
        CliError::input(err.to_string())
    }
}

impl From<FormError> for CliError {
    fn from(err: FormError) -> Self {
        CliError::input(err.to_string())
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        Self { code: io_exit_code(&err), message: err.to_string(), hint: None }
    }
}

// ============================================================================
// tolerance
// ============================================================================

fn cmd_tolerance(registered: f64, calculated: Option<f64>, decimals: usize) -> Result<(), CliError> {
    use parcelgrid_io::text::format_area;

    // An empty reconciliation validates the areas and yields the verdict.
    let result = parcelgrid_recon::reconcile(registered, calculated.unwrap_or(registered), &[])?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let write_err = |e: io::Error| CliError::io(e.to_string());

    writeln!(out, "Permissible Error:   {}", format_area(result.permissible_error, decimals))
        .map_err(write_err)?;

    if calculated.is_some() {
        writeln!(out, "Absolute Difference: {}", format_area(result.absolute_difference, decimals))
            .map_err(write_err)?;
        writeln!(out, "{}", parcelgrid_io::text::status_line(&result)).map_err(write_err)?;
        if result.exceeds_limit {
            return Err(CliError::exceeded("difference exceeds permissible error"));
        }
    }
    Ok(())
}

// ============================================================================
// template
// ============================================================================

fn cmd_template(count: usize, output: Option<PathBuf>) -> Result<(), CliError> {
    if count == 0 {
        return Err(CliError::args("Please enter a valid number of parcels.")
            .with_hint("--count must be at least 1"));
    }

    let mut buf = Vec::new();
    parcelgrid_io::csv::write_template(count, &mut buf)?;

    match output {
        Some(path) => {
            std::fs::write(&path, &buf)
                .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
            eprintln!("wrote {} ({count} parcel rows)", path.display());
        }
        None => {
            io::stdout().write_all(&buf).map_err(|e| CliError::io(e.to_string()))?;
        }
    }
    Ok(())
}

// ============================================================================
// settings
// ============================================================================

fn cmd_settings(cmd: SettingsCommands, settings: &Settings) -> Result<(), CliError> {
    match cmd {
        SettingsCommands::Path => {
            println!("{}", Settings::config_path_display());
            Ok(())
        }
        SettingsCommands::Show => {
            parcelgrid_io::json::write_json(settings, io::stdout().lock())?;
            Ok(())
        }
        SettingsCommands::Init => {
            let path = Settings::config_path();
            Settings::create_default_file(&path).map_err(|e| {
                if path.exists() {
                    CliError { code: EXIT_ERROR, message: e, hint: None }
                        .with_hint("edit the existing file or delete it first")
                } else {
                    CliError::io(e)
                }
            })?;
            eprintln!("wrote {}", path.display());
            Ok(())
        }
        SettingsCommands::Set { key, value } => {
            let mut updated = settings.clone();
            updated.set(&key, &value).map_err(|e| {
                CliError::args(e).with_hint("run `pgrid settings show` for the known keys")
            })?;
            updated.save().map_err(CliError::io)?;
            eprintln!("{key} updated in {}", Settings::config_path_display());
            Ok(())
        }
    }
}
