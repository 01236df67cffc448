//! ontopub - Ontology Publisher CLI
//!
//! Command-line interface for publishing ontology files into a
//! Fuseki-compatible triplestore. Connection settings come from the
//! FUSEKI_* environment variables, overridden by the global flags.

use anyhow::{bail, Context};
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use ontopub_core::{
    BatchMode, BatchReport, GraphTarget, HttpTransport, OntologyArtifact, OntologyPublisher, PublishError,
    PublishManifest, PublisherConfig, StorageKind,
};

#[derive(Parser)]
#[command(name = "ontopub")]
#[command(version)]
#[command(about = "Publish ontology graphs into a SPARQL triplestore and verify they loaded", long_about = None)]
struct Cli {
    /// Triplestore base URL [env: FUSEKI_URL]
    #[arg(long, global = true)]
    url: Option<String>,

    /// Dataset name [env: FUSEKI_DATASET]
    #[arg(long, short = 'd', global = true)]
    dataset: Option<String>,

    /// Basic auth user [env: FUSEKI_USER]
    #[arg(long, global = true)]
    user: Option<String>,

    /// Basic auth password [env: FUSEKI_PASSWORD]
    #[arg(long, global = true)]
    password: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait until the triplestore answers its health check
    Ping,
    /// Create the dataset if it does not exist yet
    Ensure {
        /// Storage kind (persistent or in-memory)
        #[arg(long, default_value = "persistent")]
        storage: StorageKind,
    },
    /// Upload ontology files and verify each one produced triples
    Publish(PublishArgs),
    /// Remove every triple from a graph (irreversible)
    Clear {
        /// Named graph IRI; the default graph when omitted
        #[arg(long)]
        graph: Option<String>,
        /// Confirm the clear
        #[arg(long)]
        yes: bool,
    },
    /// Show triple, subject and predicate totals for the dataset
    Stats,
    /// List datasets on the server
    Datasets,
    /// Check that classes from each namespace are present
    Check {
        /// Namespace to check, as LABEL=IRI (repeatable)
        #[arg(long = "namespace", short = 'n', value_name = "LABEL=IRI", required_unless_present = "extends")]
        namespaces: Vec<String>,
        /// Subclass links that must exist, as SUB_NS=SUPER_NS (repeatable)
        #[arg(long = "extends", short = 'e', value_name = "SUB_NS=SUPER_NS")]
        extends: Vec<String>,
    },
}

#[derive(Args)]
struct PublishArgs {
    /// Artifacts as PATH or PATH=GRAPH_URI, published in order
    #[arg(value_name = "PATH[=GRAPH_URI]")]
    artifacts: Vec<OntologyArtifact>,
    /// YAML publish manifest (artifacts listed there run first)
    #[arg(long, short = 'm')]
    manifest: Option<PathBuf>,
    /// Skip the readiness wait and dataset creation (the dataset must already exist)
    #[arg(long)]
    no_ensure: bool,
    /// Storage kind used when the dataset is created
    #[arg(long)]
    storage: Option<StorageKind>,
    /// Keep going after a failed artifact
    #[arg(long)]
    continue_on_error: bool,
    /// Print results and failures as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            match err.downcast_ref::<PublishError>() {
                Some(publish_err) => eprintln!(
                    "{} {} [{}] {}",
                    "✗".red(),
                    publish_err.kind().red().bold(),
                    publish_err.phase(),
                    publish_err
                ),
                None => eprintln!("{} {:#}", "✗".red(), err),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ontopub={0},ontopub_core={0}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Environment first, then command-line overrides
fn load_config(cli: &Cli) -> anyhow::Result<PublisherConfig> {
    let mut config = PublisherConfig::from_env()?;
    if let Some(url) = &cli.url {
        config = config.with_base_url(url.clone());
    }
    if let Some(dataset) = &cli.dataset {
        config = config.with_dataset(dataset.clone());
    }
    match (&cli.user, &cli.password) {
        (None, None) => {}
        (user, password) => {
            let current = config.credentials.clone();
            let username = user
                .clone()
                .or_else(|| current.as_ref().map(|c| c.username.clone()))
                .unwrap_or_else(|| "admin".to_string());
            let password = password
                .clone()
                .or_else(|| current.map(|c| c.password))
                .unwrap_or_default();
            config = config.with_credentials(username, password);
        }
    }
    config.validate()?;
    Ok(config)
}

/// Returns whether the command fully succeeded
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = load_config(&cli)?;
    let dataset = config.dataset.clone();
    let publisher = OntologyPublisher::connect(config)?;

    match cli.command {
        Commands::Ping => {
            let attempts = publisher.wait_until_ready().await?;
            println!(
                "{} {} is ready (after {} attempt{})",
                "✓".green(),
                publisher.config().base_url,
                attempts,
                if attempts == 1 { "" } else { "s" }
            );
            Ok(true)
        }

        Commands::Ensure { storage } => {
            let state = publisher.ensure_dataset(&dataset, storage).await?;
            let verb = if state.was_created() { "created" } else { "already exists" };
            println!("{} Dataset '{}' {}", "✓".green(), dataset.bold(), verb);
            Ok(true)
        }

        Commands::Publish(args) => handle_publish(&publisher, dataset, args).await,

        Commands::Clear { graph, yes } => {
            let target = match graph {
                Some(iri) => GraphTarget::named(iri)?,
                None => GraphTarget::Default,
            };
            if !yes {
                bail!("Refusing to clear {} in '{}' without --yes", target, dataset);
            }
            publisher.clear_graph(&dataset, &target).await?;
            println!("{} Cleared {} in '{}'", "✓".green(), target, dataset);
            Ok(true)
        }

        Commands::Stats => {
            let stats = publisher.dataset_stats(&dataset).await?;
            println!("{}", format!("Dataset '{}'", stats.dataset).bold());
            println!("  Total triples:     {}", show_count(stats.total_triples));
            println!("  Unique subjects:   {}", show_count(stats.unique_subjects));
            println!("  Unique predicates: {}", show_count(stats.unique_predicates));
            Ok(stats.total_triples.is_some())
        }

        Commands::Datasets => {
            let datasets = publisher.list_datasets().await?;
            if datasets.is_empty() {
                println!("No datasets found.");
            }
            for ds in datasets {
                let state = if ds.active { "active".green() } else { "offline".yellow() };
                println!("  {:<30} {}", ds.name, state);
            }
            Ok(true)
        }

        Commands::Check { namespaces, extends } => {
            let pairs = namespaces
                .iter()
                .map(|spec| split_pair(spec, "LABEL=IRI"))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let links = extends
                .iter()
                .map(|spec| split_pair(spec, "SUB_NS=SUPER_NS"))
                .collect::<anyhow::Result<Vec<_>>>()?;

            let checks = publisher.check_namespaces(&dataset, &pairs).await?;
            let mut all_passed = true;
            for check in &checks {
                if check.passed() {
                    println!("{} {:<20} {} classes", "✓".green(), check.label, show_count(check.class_count));
                } else {
                    all_passed = false;
                    println!(
                        "{} {:<20} {} classes ({})",
                        "✗".red(),
                        check.label,
                        show_count(check.class_count),
                        check.namespace
                    );
                }
            }

            for (sub, sup) in &links {
                let check = publisher.check_inheritance(&dataset, sub, sup).await?;
                let mark = if check.passed() { "✓".green() } else { "✗".red() };
                all_passed &= check.passed();
                println!(
                    "{} {} subclass links {} -> {}",
                    mark,
                    show_count(check.link_count),
                    check.sub_namespace,
                    check.super_namespace
                );
            }
            Ok(all_passed)
        }
    }
}

async fn handle_publish(
    publisher: &OntologyPublisher<HttpTransport>,
    mut dataset: String,
    args: PublishArgs,
) -> anyhow::Result<bool> {
    let mut artifacts = Vec::new();
    let mut storage_kind = args.storage.unwrap_or_default();
    let mut mode = if args.continue_on_error {
        BatchMode::ContinueOnError
    } else {
        BatchMode::FailFast
    };

    if let Some(path) = &args.manifest {
        let manifest = PublishManifest::load(path)?;
        if let Some(ds) = &manifest.spec.dataset {
            dataset = ds.clone();
        }
        if args.storage.is_none() {
            storage_kind = manifest.spec.storage;
        }
        if manifest.spec.continue_on_error {
            mode = BatchMode::ContinueOnError;
        }
        artifacts.extend(manifest.artifacts()?);
    }
    artifacts.extend(args.artifacts);

    if artifacts.is_empty() {
        bail!("Nothing to publish: pass artifact paths or --manifest");
    }

    if !args.no_ensure {
        let state = publisher.ensure_dataset(&dataset, storage_kind).await?;
        let verb = if state.was_created() { "created" } else { "already exists" };
        eprintln!("{} Dataset '{}' {} ({})", "✓".green(), dataset.bold(), verb, storage_kind);
    }

    let report = publisher.publish_all_with_mode(&dataset, &artifacts, mode).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report_json(&report))?);
    } else {
        print_report(&report);
    }

    for failed in report.failures() {
        if let Some(err) = failed.error() {
            eprintln!(
                "{} {} failed: {} [{}] {}",
                "✗".red(),
                failed.artifact.path().display(),
                err.kind().red().bold(),
                err.phase(),
                err
            );
        }
    }

    Ok(report.is_success())
}

fn report_json(report: &BatchReport) -> serde_json::Value {
    let failures: Vec<_> = report
        .failures()
        .filter_map(|outcome| {
            outcome.error().map(|err| {
                json!({
                    "artifact": outcome.artifact.path().display().to_string(),
                    "graph": outcome.artifact.graph().iri(),
                    "kind": err.kind(),
                    "phase": err.phase(),
                    "error": err.to_string(),
                })
            })
        })
        .collect();

    json!({
        "dataset": report.dataset,
        "requested": report.requested,
        "skipped": report.skipped(),
        "published": report.results().collect::<Vec<_>>(),
        "failures": failures,
    })
}

/// Split `LEFT=RIGHT`, both sides non-empty
fn split_pair(spec: &str, shape: &str) -> anyhow::Result<(String, String)> {
    spec.split_once('=')
        .map(|(left, right)| (left.trim().to_string(), right.trim().to_string()))
        .filter(|(left, right)| !left.is_empty() && !right.is_empty())
        .with_context(|| format!("Invalid value '{}', expected {}", spec, shape))
}

fn print_report(report: &BatchReport) {
    println!("Publishing to dataset '{}'", report.dataset.bold());

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(result) => println!(
                "{} {:<32} {} triples, {} classes, {} object properties -> {}",
                "✓".green(),
                outcome.artifact.label(),
                result.triple_count,
                show_count(result.class_count),
                show_count(result.object_property_count),
                outcome.artifact.graph()
            ),
            Err(err) => println!("{} {:<32} {}", "✗".red(), outcome.artifact.label(), err.kind().red()),
        }
    }

    let skipped = report.skipped();
    if skipped > 0 {
        println!("  {} artifact(s) not attempted", skipped.to_string().yellow());
    }
    println!(
        "\n{} of {} published, {} triples total",
        report.results().count(),
        report.requested,
        report.total_triples()
    );
}

fn show_count(count: Option<u64>) -> String {
    count.map(|n| n.to_string()).unwrap_or_else(|| "?".to_string())
}
