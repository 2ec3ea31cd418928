//! Retain CLI binary.
//!
//! Provides command-line interface for churn scoring, explanations and
//! retention campaign valuation.

mod integration;

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use integration::input::read_text;
use integration::model_store::{open_service, resolve_model_path};
use retain::features::registry::{FeatureStage, features_by_stage};
use retain::features::{FeatureKind, FeatureSchema, PipelineVersion};
use retain::output::{ExportFormat, Exporter, Report, ReportKind, RetentionSummary};
use retain::{BatchPredictionReport, ChurnService, RetentionConfig};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "retain")]
#[command(about = "Retain: churn scoring and retention economics", long_about = None)]
#[command(version)]
struct Cli {
    /// Model artifact (defaults to the platform data directory)
    #[arg(long, global = true, env = "RETAIN_MODEL")]
    model: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score and explain one customer
    Predict {
        /// JSON request body, `-` for stdin
        request: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Also export the report (format from the extension: .csv or .json)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Score a CSV file of customers
    Batch {
        /// Customer CSV
        input: PathBuf,

        /// Only show customers at or above this probability
        #[arg(long, default_value = "0.5")]
        threshold: f64,

        /// Only show customers whose id or surname contains this text
        #[arg(long, default_value = "")]
        search: String,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Export every scored customer (format from the extension: .csv or .json)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Value a retention campaign over a CSV file of customers
    Roi {
        /// Customer CSV
        input: PathBuf,

        /// Cost of one retention offer
        #[arg(long, default_value = "500")]
        cost: f64,

        /// Probability that an offer retains the customer
        #[arg(long, default_value = "0.2")]
        rate: f64,

        /// Number of candidates to show
        #[arg(long, default_value = "20")]
        top: usize,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Export all candidates (format from the extension: .csv or .json)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List the engineered features
    Features {
        /// Pipeline version whose layout to show
        #[arg(long, value_enum, default_value = "v2")]
        pipeline: Pipeline,

        /// Include the customer identifier column
        #[arg(long)]
        with_identifier: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Clone, Copy, ValueEnum)]
enum Pipeline {
    V1,
    V2,
}

impl From<Pipeline> for PipelineVersion {
    fn from(pipeline: Pipeline) -> Self {
        match pipeline {
            Pipeline::V1 => Self::V1,
            Pipeline::V2 => Self::V2,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let model_path = resolve_model_path(cli.model.as_deref());

    match cli.command {
        Commands::Predict {
            request,
            format,
            output,
        } => {
            let service = open_service(&model_path)?;
            predict_customer(&service, &request, format, output.as_deref())?;
        }
        Commands::Batch {
            input,
            threshold,
            search,
            format,
            output,
        } => {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(format!("threshold must be in [0, 1], got {}", threshold).into());
            }
            let service = open_service(&model_path)?;
            score_batch(&service, &input, threshold, &search, format, output.as_deref())?;
        }
        Commands::Roi {
            input,
            cost,
            rate,
            top,
            format,
            output,
        } => {
            let config = RetentionConfig {
                retention_cost: cost,
                expected_success_rate: rate,
            };
            config.validate()?;
            let service = open_service(&model_path)?;
            value_campaign(&service, &input, config, top, format, output.as_deref())?;
        }
        Commands::Features {
            pipeline,
            with_identifier,
        } => {
            list_features(pipeline.into(), with_identifier);
        }
    }

    Ok(())
}

fn progress_bar(steps: u64) -> ProgressBar {
    let pb = ProgressBar::new(steps);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn banner(title: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", title);
    println!("╚══════════════════════════════════════════════════════════════╝\n");
}

fn export<T: Exporter>(report: &T, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let format = ExportFormat::from_path(path)?;
    report.export_to_file(path, format)?;
    eprintln!("Exported to {}", path.display());
    Ok(())
}

fn predict_customer(
    service: &ChurnService,
    request: &Path,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let body = read_text(request)?;
    let report = service.predict_request(&body)?;

    match format {
        OutputFormat::Text => {
            banner("CHURN PREDICTION");
            print!("{}", report.to_ascii_table());
        }
        OutputFormat::Markdown => print!("{}", report.to_markdown()),
        OutputFormat::Json => {
            let envelope = Report::from_result(ReportKind::Prediction, &report.model, &report)?;
            println!("{}", envelope.to_json()?);
        }
    }

    if let Some(path) = output {
        export(&report, path)?;
    }
    Ok(())
}

fn score_batch(
    service: &ChurnService,
    input: &Path,
    threshold: f64,
    search: &str,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = progress_bar(2);
    pb.set_message("Reading customers...");
    let batch = retain::data::read_records_from_path(input)?;
    pb.inc(1);

    pb.set_message(format!("Scoring {} customers...", batch.len()));
    let report = match service.predict_batch(&batch) {
        Ok(report) => {
            pb.inc(1);
            pb.finish_with_message(format!(
                "Scored {} customers ({} rejected)",
                report.predictions.len(),
                report.errors.len()
            ));
            report
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(e.into());
        }
    };

    let selected = report.filter(threshold, search);
    match format {
        OutputFormat::Text => {
            banner(&format!("BATCH SCORING: {}", report.model));
            print_batch_overview(&report);
            println!(
                "\nShowing {} customers with probability >= {:.0}%\n",
                selected.len(),
                threshold * 100.0
            );
            print!("{}", BatchPredictionReport::to_ascii_table(&selected));
            print_row_errors(&report.errors);
        }
        OutputFormat::Markdown => print!("{}", BatchPredictionReport::to_markdown(&selected)),
        OutputFormat::Json => {
            let filtered = BatchPredictionReport::new(
                report.model.as_str(),
                selected.into_iter().cloned().collect(),
                report.errors.clone(),
            );
            let envelope =
                Report::from_result(ReportKind::BatchPrediction, &report.model, &filtered)?;
            println!("{}", envelope.to_json()?);
        }
    }

    if let Some(path) = output {
        export(&report, path)?;
    }
    Ok(())
}

fn print_batch_overview(report: &BatchPredictionReport) {
    println!("Customers scored:   {}", report.predictions.len());
    println!("High risk:          {}", report.high_risk_count());
    if let Some(mean) = report.mean_probability() {
        println!("Mean probability:   {:.1}%", mean * 100.0);
    }
}

fn print_row_errors(errors: &[retain::data::RowError]) {
    if errors.is_empty() {
        return;
    }
    println!("\n{} rows skipped:", errors.len());
    for error in errors {
        println!("  row {}: {}", error.row, error.message);
    }
}

fn value_campaign(
    service: &ChurnService,
    input: &Path,
    config: RetentionConfig,
    top: usize,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = progress_bar(2);
    pb.set_message("Reading customers...");
    let batch = retain::data::read_records_from_path(input)?;
    pb.inc(1);

    pb.set_message(format!("Valuing {} customers...", batch.len()));
    let report = match service.value_retention(&batch, config) {
        Ok(report) => {
            pb.inc(1);
            pb.finish_with_message(format!(
                "Valued {} customers ({} actionable)",
                report.evaluated,
                report.candidates.len()
            ));
            report
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(e.into());
        }
    };

    match format {
        OutputFormat::Text => {
            banner("RETENTION CAMPAIGN");
            print_candidates(&report.candidates, top);
            print!("{}", report.summary.to_ascii_table());
            print_return_on_cost(&report.summary);
            print_row_errors(&report.errors);
        }
        OutputFormat::Markdown => print!("{}", report.summary.to_markdown()),
        OutputFormat::Json => {
            let model = service.handle().snapshot()?.config().name.clone();
            let envelope = Report::from_result(ReportKind::Retention, &model, &report)?;
            println!("{}", envelope.to_json()?);
        }
    }

    if let Some(path) = output {
        export(&report, path)?;
    }
    Ok(())
}

fn print_candidates(candidates: &[retain::output::RetentionCandidate], top: usize) {
    println!(
        "{:<4} {:<28} {:>12} {:>16} {:>16}",
        "#", "Customer", "Probability", "Lifetime value", "Net return"
    );
    println!("{}", "-".repeat(80));
    for (i, candidate) in candidates.iter().take(top).enumerate() {
        println!(
            "{:<4} {:<28} {:>11.1}% {:>16.2} {:>16.2}",
            i + 1,
            candidate.customer.to_string(),
            candidate.probability * 100.0,
            candidate.lifetime_value,
            candidate.expected_net_return
        );
    }
    if candidates.len() > top {
        println!("... {} more", candidates.len() - top);
    }
}

fn print_return_on_cost(summary: &RetentionSummary) {
    match summary.return_on_cost() {
        Some(roc) => println!("Return on cost: {:.1}x", roc),
        None => println!("No customer is worth an offer at this cost."),
    }
}

fn list_features(version: PipelineVersion, with_identifier: bool) {
    let schema = FeatureSchema::new(version, with_identifier);

    println!(
        "\nPipeline {} ({} features{})\n",
        version,
        schema.len(),
        if with_identifier { ", with identifier" } else { "" }
    );
    for (i, spec) in schema.features().iter().enumerate() {
        println!("{:>3}. {:<28} {}", i + 1, spec.name, kind_label(spec.kind));
    }

    for (stage, title) in [
        (FeatureStage::Passthrough, "Raw columns"),
        (FeatureStage::V1, "V1 derived"),
        (FeatureStage::V2, "V2 derived"),
    ] {
        let features: Vec<_> = features_by_stage(stage)
            .into_iter()
            .filter(|f| schema.position(f.name).is_some())
            .collect();
        if features.is_empty() {
            continue;
        }
        println!("\n{}:", title);
        for feature in features {
            println!(
                "  {:<28} {} (from {})",
                feature.name,
                feature.description,
                feature.source_columns.join(", ")
            );
        }
    }
}

fn kind_label(kind: FeatureKind) -> String {
    match kind {
        FeatureKind::Integer => "integer".to_string(),
        FeatureKind::Float => "float".to_string(),
        FeatureKind::Flag => "flag".to_string(),
        FeatureKind::Categorical(levels) => format!("category [{}]", levels.join(", ")),
    }
}
