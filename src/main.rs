//! src/main.rs
use anyhow::Context;
use clap::Parser;
use keyword_index::configuration::get_configuration;
use keyword_index::job::run_inverted_index;
use keyword_index::keywords::KeywordSet;
use keyword_index::telemetry::init_tracing;
use std::path::PathBuf;
use std::time::Instant;

/// Builds a keyword-restricted inverted index: for every keyword, the
/// documents it occurs in, ranked by occurrence count.
#[derive(Parser, Debug)]
#[command(name = "keyword-index", version, about)]
struct Cli {
    /// Input document, or a directory of documents
    input: PathBuf,

    /// Output directory; must not exist yet
    output: PathBuf,

    /// Keywords to index, matched exactly and case-sensitively
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
    keywords: Vec<String>,

    /// Number of reduce tasks (output partitions)
    #[arg(long)]
    reduce_tasks: Option<u32>,

    /// Number of concurrent workers
    #[arg(long)]
    workers: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let started = Instant::now();
    let cli = Cli::parse();

    let mut configuration = get_configuration().context("Failed to read configuration")?;
    if let Some(reduce_tasks) = cli.reduce_tasks {
        configuration.job.reduce_tasks = reduce_tasks;
    }
    if let Some(workers) = cli.workers {
        configuration.cluster.workers = workers;
    }
    let tracer_provider = init_tracing("keyword-index", &configuration.telemetry)?;

    let keywords = KeywordSet::new(&cli.keywords);
    let result = run_inverted_index(&configuration, &cli.input, &cli.output, &keywords).await;

    if let Some(provider) = tracer_provider {
        if let Err(e) = provider.shutdown() {
            eprintln!("Failed to flush spans: {e}");
        }
    }
    let report = result?;
    tracing::info!(
        job_id = %report.job_id,
        "Indexed {} keywords into {} terms across {} parts",
        keywords.len(),
        report.output_records,
        report.parts.len()
    );
    println!("Elapsed time = {} ms", started.elapsed().as_millis());
    Ok(())
}
