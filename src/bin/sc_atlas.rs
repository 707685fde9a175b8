use std::collections::HashSet;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use sc_atlas_catalog::admin::{AdminClient, AdminHttpClient};
use sc_atlas_catalog::config::{ConfigLoader, ResolvedConfig};
use sc_atlas_catalog::domain::{Accession, IdentifierSet};
use sc_atlas_catalog::error::AtlasError;
use sc_atlas_catalog::harness::{BatchIngestionHarness, parse_accession_list};
use sc_atlas_catalog::index::IndexHttpClient;
use sc_atlas_catalog::output::JsonOutput;
use sc_atlas_catalog::pipeline::{SearchAggregationPipeline, SearchAttribute};

#[derive(Parser)]
#[command(name = "sc-atlas")]
#[command(about = "Single-cell experiment catalog: batch ingestion and search aggregation")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Manage catalog experiments")]
    Experiments(ExperimentsArgs),
    #[command(about = "Search derived attribute values for a gene id set")]
    Search(SearchArgs),
}

#[derive(Args)]
struct ExperimentsArgs {
    #[command(subcommand)]
    command: ExperimentsCommand,
}

#[derive(Subcommand)]
enum ExperimentsCommand {
    #[command(about = "Create experiments for the given accessions")]
    Create(CreateArgs),
    #[command(about = "Reload experiment designs for the given accessions")]
    UpdateDesigns(UpdateDesignsArgs),
}

#[derive(Args, Clone)]
struct CreateArgs {
    #[arg(long, required = true, help = "Accessions, repeatable or comma-separated")]
    accessions: Vec<String>,

    #[arg(long, help = "Accessions to load as private")]
    private_accessions: Vec<String>,

    #[arg(long, help = "Where to write the failed-accession retry list")]
    failed_output: Option<Utf8PathBuf>,
}

#[derive(Args, Clone)]
struct UpdateDesignsArgs {
    #[arg(long, required = true, help = "Accessions, repeatable or comma-separated")]
    accessions: Vec<String>,

    #[arg(long, help = "Where to write the failed-accession retry list")]
    failed_output: Option<Utf8PathBuf>,
}

#[derive(Args, Clone)]
struct SearchArgs {
    #[arg(long, required = true, help = "Gene ids, repeatable or comma-separated")]
    genes: Vec<String>,

    #[arg(long, help = "Restrict to one attribute (default: both)")]
    attribute: Option<SearchAttribute>,

    #[arg(long, help = "Number of values to sample from each result list")]
    sample_size: Option<usize>,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{report:?}");
            if let Some(atlas) = report.downcast_ref::<AtlasError>() {
                return ExitCode::from(map_exit_code(atlas));
            }
            ExitCode::from(1)
        }
    }
}

fn map_exit_code(error: &AtlasError) -> u8 {
    match error {
        AtlasError::ExperimentNotFound(_) => 2,
        AtlasError::ConfigRead(_) => 2,
        AtlasError::IndexHttp(_)
        | AtlasError::IndexStatus { .. }
        | AtlasError::AdminHttp(_)
        | AtlasError::AdminStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::resolve(cli.config.as_deref()).into_diagnostic()?;

    match cli.command {
        Commands::Experiments(args) => run_experiments(args.command, &config),
        Commands::Search(args) => run_search(args, &config),
    }
}

fn run_experiments(
    command: ExperimentsCommand,
    config: &ResolvedConfig,
) -> miette::Result<ExitCode> {
    let admin = AdminHttpClient::new(&config.admin_url).into_diagnostic()?;
    match command {
        ExperimentsCommand::Create(args) => {
            let accessions = parse_flag_values(&args.accessions).into_diagnostic()?;
            let private: HashSet<Accession> = parse_flag_values(&args.private_accessions)
                .into_diagnostic()?
                .into_iter()
                .collect();
            let harness = make_harness(args.failed_output, config);
            let outcome = harness
                .run(&accessions, |accession| {
                    admin.create_experiment(accession, private.contains(accession))
                })
                .into_diagnostic()?;
            JsonOutput::print_batch(&outcome).into_diagnostic()?;
            Ok(ExitCode::from(outcome.exit_code()))
        }
        ExperimentsCommand::UpdateDesigns(args) => {
            let accessions = parse_flag_values(&args.accessions).into_diagnostic()?;
            let harness = make_harness(args.failed_output, config);
            let outcome = harness
                .run(&accessions, |accession| {
                    admin.update_experiment_design(accession)
                })
                .into_diagnostic()?;
            JsonOutput::print_batch(&outcome).into_diagnostic()?;
            Ok(ExitCode::from(outcome.exit_code()))
        }
    }
}

fn run_search(args: SearchArgs, config: &ResolvedConfig) -> miette::Result<ExitCode> {
    let index = IndexHttpClient::new(&config.index_url).into_diagnostic()?;
    let gene_ids: IdentifierSet = args
        .genes
        .iter()
        .flat_map(|value| value.split(','))
        .filter(|token| !token.trim().is_empty())
        .map(|token| token.trim().to_string())
        .collect();
    let sample_size = args.sample_size.unwrap_or(config.sample_size);
    let pipeline = SearchAggregationPipeline::new(&index, sample_size);

    match args.attribute {
        Some(attribute) => {
            let values = pipeline.search(&gene_ids, attribute).into_diagnostic()?;
            JsonOutput::print_value_set(&values).into_diagnostic()?;
        }
        None => {
            let sets = pipeline.search_attributes(&gene_ids).into_diagnostic()?;
            JsonOutput::print_search(&sets).into_diagnostic()?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn make_harness(
    failed_output: Option<Utf8PathBuf>,
    config: &ResolvedConfig,
) -> BatchIngestionHarness {
    let path = failed_output.or_else(|| config.failed_output.clone().map(Utf8PathBuf::from));
    match path {
        Some(path) => BatchIngestionHarness::with_retry_file(path),
        None => BatchIngestionHarness::new(),
    }
}

fn parse_flag_values(values: &[String]) -> Result<Vec<Accession>, AtlasError> {
    let mut accessions = Vec::new();
    for value in values {
        accessions.extend(parse_accession_list(value)?);
    }
    Ok(accessions)
}
