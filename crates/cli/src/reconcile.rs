//! `pgrid reconcile`: rescale parcel areas to the registered total.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use parcelgrid_config::settings::MAX_DECIMALS;
use parcelgrid_config::Settings;
use parcelgrid_io::text::{self, TextOptions};
use parcelgrid_recon::{reconcile, ParcelInput, ReconJob, ReconciliationResult};

use crate::{CliError, Format};

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Legally registered total area (m²); overrides the job file
    #[arg(long, short = 'r', allow_negative_numbers = true)]
    registered: Option<f64>,

    /// Field-measured total area (m²); overrides the job file
    #[arg(long, short = 'c', allow_negative_numbers = true)]
    calculated: Option<f64>,

    /// Parcel as LABEL=AREA. Repeatable; appended after file parcels.
    #[arg(long = "parcel", short = 'p', value_name = "LABEL=AREA")]
    parcels: Vec<String>,

    /// Parcel list (CSV/TSV with label and area columns). Use - for stdin.
    #[arg(long, short = 'i')]
    input: Option<PathBuf>,

    /// TOML job file with areas and parcels
    #[arg(long, short = 'j')]
    job: Option<PathBuf>,

    /// Output format (default from settings: output.format)
    #[arg(long, short = 'f')]
    format: Option<Format>,

    /// Output file (omit for stdout)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Decimal places for unrounded areas (default from settings: output.decimals)
    #[arg(long)]
    decimals: Option<usize>,

    /// Suppress the summary line on stderr
    #[arg(long, short = 'q')]
    quiet: bool,
}

#[derive(Serialize)]
struct ReconcileReport<'a> {
    meta: ReportMeta,
    result: &'a ReconciliationResult,
}

#[derive(Serialize)]
struct ReportMeta {
    engine_version: &'static str,
    run_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    job: Option<String>,
}

pub fn cmd_reconcile(args: ReconcileArgs, settings: &Settings) -> Result<(), CliError> {
    let job = match args.job {
        Some(ref path) => Some(load_job(path)?),
        None => None,
    };

    let registered = args
        .registered
        .or(job.as_ref().map(|(j, _)| j.registered_area))
        .ok_or_else(|| CliError::args("missing --registered").with_hint("pass --registered or a --job file"))?;
    let calculated = args
        .calculated
        .or(job.as_ref().map(|(j, _)| j.calculated_area))
        .ok_or_else(|| CliError::args("missing --calculated").with_hint("pass --calculated or a --job file"))?;

    let mut parcels: Vec<ParcelInput> = Vec::new();
    if let Some((ref job, ref job_parcels)) = job {
        parcels.extend(job.inline_parcels());
        parcels.extend(job_parcels.iter().cloned());
    }
    if let Some(ref input) = args.input {
        parcels.extend(read_input(input)?);
    }
    for arg in &args.parcels {
        parcels.push(parse_parcel_arg(arg)?);
    }

    log::debug!("reconciling {} parcel(s): registered={registered} calculated={calculated}", parcels.len());
    let result = reconcile(registered, calculated, &parcels)?;

    let decimals = args.decimals.unwrap_or(settings.decimals).min(MAX_DECIMALS);
    let format = args.format.unwrap_or_else(|| settings.output_format.into());
    let job_name = job.as_ref().map(|(j, _)| j.display_name().to_string());
    let rendered = render(&result, format, decimals, settings, job_name)?;

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &rendered)
                .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
            if !args.quiet {
                eprintln!("wrote {}", path.display());
            }
        }
        None => {
            io::stdout()
                .write_all(rendered.as_bytes())
                .map_err(|e| CliError::io(e.to_string()))?;
        }
    }

    if !args.quiet {
        eprintln!("{}", text::summary_line(&result, decimals));
    }

    if result.exceeds_limit {
        return Err(CliError::exceeded(format!(
            "difference {} exceeds permissible error {}",
            text::format_area(result.absolute_difference, decimals),
            text::format_area(result.permissible_error, decimals),
        ))
        .with_hint("parcel areas were left unscaled; check the field measurement"));
    }
    Ok(())
}

/// Render the result in the requested format.
pub fn render(
    result: &ReconciliationResult,
    format: Format,
    decimals: usize,
    settings: &Settings,
    job_name: Option<String>,
) -> Result<String, CliError> {
    let rendered = match format {
        Format::Table => text::to_fixed_width(result, &text_options(settings, decimals)),
        Format::Tsv => text::to_tsv(result, decimals),
        Format::Csv => {
            let mut buf = Vec::new();
            parcelgrid_io::csv::write_result(result, decimals, &mut buf)?;
            String::from_utf8(buf).map_err(|e| CliError::io(e.to_string()))?
        }
        Format::Json => {
            let report = ReconcileReport {
                meta: ReportMeta {
                    engine_version: env!("CARGO_PKG_VERSION"),
                    run_at: chrono::Utc::now().to_rfc3339(),
                    job: job_name,
                },
                result,
            };
            let mut json = parcelgrid_io::json::to_json(&report)?;
            json.push('\n');
            json
        }
    };
    Ok(rendered)
}

pub fn text_options(settings: &Settings, decimals: usize) -> TextOptions {
    TextOptions {
        decimals,
        title: settings.title.clone(),
        footer: settings.footer.clone(),
    }
}

/// Parse the job and load its parcel file, resolved relative to the job's directory.
fn load_job(path: &Path) -> Result<(ReconJob, Vec<ParcelInput>), CliError> {
    let job_str = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read job: {e}")))?;
    let job = ReconJob::from_toml(&job_str)?;

    let file_parcels = match job.parcels_file {
        Some(ref file) => {
            let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
            parcelgrid_io::csv::read_parcels(&base_dir.join(file))?
        }
        None => Vec::new(),
    };
    Ok((job, file_parcels))
}

fn read_input(path: &Path) -> Result<Vec<ParcelInput>, CliError> {
    if path == Path::new("-") {
        let mut bytes = Vec::new();
        io::stdin()
            .read_to_end(&mut bytes)
            .map_err(|e| CliError::io(format!("cannot read stdin: {e}")))?;
        let content = parcelgrid_io::csv::decode(bytes);
        return Ok(parcelgrid_io::csv::parse_parcels(&content)?);
    }
    Ok(parcelgrid_io::csv::read_parcels(path)?)
}

/// `LABEL=AREA`; the last `=` separates, so labels may contain `=`.
fn parse_parcel_arg(arg: &str) -> Result<ParcelInput, CliError> {
    match arg.rsplit_once('=') {
        Some((label, area)) => Ok(ParcelInput::from_text(label, area)),
        None => Err(CliError::args(format!("invalid --parcel '{arg}'"))
            .with_hint("use LABEL=AREA, e.g. --parcel 3=412.5")),
    }
}
