use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use hemrisk::{Config, PredictRequest, PredictResponse, RiskError, RiskService};
use hemrisk_core::{BandStyle, Feature, RawPatientFeatures, SessionId, ValidationError};
use hemrisk_model::ModelArtifact;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "hemrisk",
    version,
    about = "Intra-abdominal hemorrhage risk prediction for infected pancreatic necrosis",
    long_about = "hemrisk estimates the risk of clinically significant intra-abdominal\n\
        hemorrhage in patients with infected pancreatic necrosis (IPN) using a\n\
        pre-trained stacking ensemble.\n\n\
        EXAMPLES:\n\
        \n  hemrisk predict --organ-failure 2 --age 67 --of-duration 5\n\
        \n  hemrisk predict --input patient.json --pdf report.pdf\n\
        \n  hemrisk predict --age 54 --high-threshold 30 --json\n\
        \n  hemrisk assets                      Check SHAP explanation images"
)]
struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ./hemrisk.toml when present)
    #[arg(short, long, env = "HEMRISK_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Predict hemorrhage risk for one patient
    Predict(PredictArgs),

    /// Check that the SHAP explanation images are present
    Assets,

    /// Load the model artifact and describe it
    Model {
        /// Model artifact to inspect instead of the configured one
        #[arg(long)]
        model: Option<PathBuf>,
    },

    /// Print a fresh session identifier
    Session,
}

#[derive(Debug, Args)]
struct PredictArgs {
    /// Organ failure (0 = none, 1 = single, 2 = multiple)
    #[arg(long, value_name = "0|1|2")]
    organ_failure: Option<String>,

    /// Pancreatic fistula (0 = no, 1 = yes)
    #[arg(long, value_name = "0|1")]
    pancreatic_fistula: Option<String>,

    /// Pus MDRO infection (0 = no, 1 = yes)
    #[arg(long, value_name = "0|1")]
    mdro_infection: Option<String>,

    /// Bloodstream infection (0 = no, 1 = yes)
    #[arg(long, value_name = "0|1")]
    bloodstream_infection: Option<String>,

    /// Age in years (0-120)
    #[arg(long, value_name = "YEARS")]
    age: Option<String>,

    /// Duration of organ failure in days (0-365)
    #[arg(long, value_name = "DAYS")]
    of_duration: Option<String>,

    /// Onset-to-intervention interval in days (0-365)
    #[arg(long, value_name = "DAYS")]
    onset_to_intervention: Option<String>,

    /// Read features from a JSON file; flags given alongside override it
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Lower band threshold in percent
    #[arg(long, value_name = "PERCENT")]
    low_threshold: Option<f64>,

    /// Upper band threshold in percent
    #[arg(long, value_name = "PERCENT")]
    high_threshold: Option<f64>,

    /// Model artifact to use instead of the configured one
    #[arg(long, value_name = "FILE")]
    model: Option<PathBuf>,

    /// Session label for exports (generated when omitted)
    #[arg(long, value_name = "ID")]
    session: Option<String>,

    /// Write the CSV export to this path
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Write the PDF report to this path
    #[arg(long, value_name = "FILE")]
    pdf: Option<PathBuf>,

    /// Write both exports into this directory under their default names
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl PredictArgs {
    fn flag(&self, feature: Feature) -> Option<&str> {
        match feature {
            Feature::OrganFailure => self.organ_failure.as_deref(),
            Feature::PancreaticFistula => self.pancreatic_fistula.as_deref(),
            Feature::MdroInfection => self.mdro_infection.as_deref(),
            Feature::BloodstreamInfection => self.bloodstream_infection.as_deref(),
            Feature::Age => self.age.as_deref(),
            Feature::OfDurationDays => self.of_duration.as_deref(),
            Feature::OnsetToInterventionDays => self.onset_to_intervention.as_deref(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] hemrisk::ConfigError),
    #[error(transparent)]
    Risk(#[from] RiskError),
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid input file {}: {source}", path.display())]
    Input {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid session identifier '{0}'")]
    Session(String),
    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),
}

impl CliError {
    /// 2 for rejected patient input, 1 for everything else.
    fn exit_status(&self) -> u8 {
        match self {
            CliError::Risk(RiskError::Validation(_)) | CliError::Input { .. } => 2,
            _ => 1,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn gather_features(args: &PredictArgs) -> Result<RawPatientFeatures, CliError> {
    let mut raw = match &args.input {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|source| CliError::Read {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&text).map_err(|source| CliError::Input {
                path: path.clone(),
                source,
            })?
        }
        None => RawPatientFeatures::form_defaults(),
    };
    for feature in Feature::ALL {
        if let Some(text) = args.flag(feature) {
            let value = feature
                .parse(text)
                .map_err(|e: ValidationError| CliError::Risk(e.into()))?;
            raw.set(feature, value as f64);
        }
    }
    Ok(raw)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    fs::write(path, bytes).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("wrote {}", path.display());
    Ok(())
}

fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn write_card(
    out: &mut dyn Write,
    service: &RiskService,
    response: &PredictResponse,
) -> io::Result<()> {
    let a = &response.assessment;
    let category = a.category();
    writeln!(
        out,
        "Predicted hemorrhage risk: {:.1}%  [{} risk]",
        a.percent(),
        category
    )?;
    writeln!(out, "{}", category.message())?;
    writeln!(out, "{} {:.1}%", progress_bar(a.probability(), 40), a.percent())?;
    writeln!(
        out,
        "Session {}  ·  thresholds {:.1}% / {:.1}%",
        response.session_id,
        a.low_threshold(),
        a.high_threshold()
    )?;
    writeln!(out)?;
    let labels = &service.config().report.labels;
    let width = Feature::ALL
        .iter()
        .map(|&f| labels.label(f).chars().count())
        .max()
        .unwrap_or(0);
    for (feature, value) in response.features.iter() {
        writeln!(out, "  {:<width$} {}", labels.label(feature), value)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    #[serde(flatten)]
    response: &'a PredictResponse,
    message: &'static str,
    style: BandStyle,
    exports: Vec<String>,
}

fn run_predict(
    mut config: Config,
    args: &PredictArgs,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    if let Some(model) = &args.model {
        config.model.path = model.clone();
    }
    let service = RiskService::new(config)?;

    let session_id = match &args.session {
        Some(s) => s
            .parse::<SessionId>()
            .map_err(|_| CliError::Session(s.clone()))?,
        None => SessionId::generate(),
    };
    let mut request = PredictRequest::new(session_id, gather_features(args)?);
    request.thresholds.low = args.low_threshold;
    request.thresholds.high = args.high_threshold;

    let response = service.handle_predict_request(&request)?;
    let timestamp = chrono::Local::now().naive_local();

    let mut exports = Vec::new();
    let report_settings = &service.config().report;
    let mut csv_targets: Vec<PathBuf> = args.csv.iter().cloned().collect();
    let mut pdf_targets: Vec<PathBuf> = args.pdf.iter().cloned().collect();
    if let Some(dir) = &args.out_dir {
        let record = service.report(&response, timestamp);
        csv_targets.push(dir.join(record.file_name(report_settings, "csv")));
        pdf_targets.push(dir.join(record.file_name(report_settings, "pdf")));
    }
    if !csv_targets.is_empty() {
        let bytes = service.export_csv(&response, timestamp)?;
        for path in &csv_targets {
            write_file(path, &bytes)?;
            exports.push(path.display().to_string());
        }
    }
    if !pdf_targets.is_empty() {
        let bytes = service.export_pdf(&response, timestamp);
        for path in &pdf_targets {
            write_file(path, &bytes)?;
            exports.push(path.display().to_string());
        }
    }

    let mode = if args.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };
    match mode {
        OutputMode::Json => {
            let category = response.assessment.category();
            let json = JsonOutput {
                response: &response,
                message: category.message(),
                style: category.style(),
                exports,
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?;
        }
        OutputMode::Text => {
            write_card(out, &service, &response)?;
            for path in exports {
                writeln!(out, "Saved {path}")?;
            }
        }
    }
    Ok(())
}

fn run_assets(config: Config, out: &mut dyn Write) -> Result<(), CliError> {
    let service = RiskService::new(config)?;
    let statuses = service.explanation_assets();
    for status in &statuses {
        let state = if status.present { "ok" } else { "missing" };
        writeln!(
            out,
            "{:<8} {:<30} {}",
            state,
            status.caption,
            status.path.display()
        )?;
    }
    for warning in statuses.iter().filter_map(|s| s.warning()) {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

fn run_model(config: &Config, model: Option<&Path>, out: &mut dyn Write) -> Result<(), CliError> {
    let path = model.unwrap_or(&config.model.path);
    let artifact = ModelArtifact::load(path).map_err(RiskError::from)?;
    writeln!(out, "name:      {}", artifact.name)?;
    writeln!(out, "version:   {}", artifact.version)?;
    if let Some(description) = &artifact.description {
        writeln!(out, "about:     {description}")?;
    }
    let columns = artifact
        .feature_names
        .as_ref()
        .map(|names| names.join(", "))
        .unwrap_or_else(|| format!("{} (assumed)", ModelArtifact::expected_columns().join(", ")));
    writeln!(out, "columns:   {columns}")?;
    writeln!(out, "estimator: {}", artifact.estimator.summary())?;
    Ok(())
}

fn run(cli: Cli, out: &mut dyn Write) -> Result<(), CliError> {
    let config = Config::discover(cli.config.as_deref())?;
    match cli.command {
        Command::Predict(args) => run_predict(config, &args, out),
        Command::Assets => run_assets(config, out),
        Command::Model { model } => run_model(&config, model.as_deref(), out),
        Command::Session => {
            writeln!(out, "{}", SessionId::generate())?;
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let stdout = io::stdout();
    match run(cli, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_status())
        }
    }
}
