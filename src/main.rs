use anyhow::Result;
use clap::Parser;
use proxy_ranker::{
    logging,
    proxy::{
        checker::{
            DEFAULT_CONCURRENCY, DEFAULT_EXPECTED_STATUS, DEFAULT_TEST_URL, DEFAULT_TIMEOUT_SECS,
        },
        CheckerConfig, EndpointParser, ProxyPool,
    },
};
use std::path::PathBuf;
use std::time::Duration;

/// Check HTTP proxies and keep the working ones, fastest first
#[derive(Parser)]
#[command(name = "proxy-ranker")]
#[command(about = "HTTP proxy checker that ranks working proxies by response time")]
struct Cli {
    /// Input file with proxies, one per line
    #[arg(short, long, default_value = "proxies.txt")]
    input: PathBuf,

    /// Output file for working proxies
    #[arg(short, long, default_value = "checked.txt")]
    output: PathBuf,

    /// Number of concurrent workers
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
    threads: usize,

    /// Timeout in seconds for each check
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// URL to test proxies against
    #[arg(long, default_value = DEFAULT_TEST_URL)]
    test_url: String,

    /// Status code that marks a proxy as working
    #[arg(long, default_value_t = DEFAULT_EXPECTED_STATUS)]
    expect_status: u16,

    /// Also write a JSON report with response times
    #[arg(long)]
    json: Option<PathBuf>,

    /// Show per-proxy debug output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let proxies = match EndpointParser::load_file(&cli.input)? {
        Some(proxies) => proxies,
        None => {
            eprintln!("Error: file {:?} not found!", cli.input);
            Vec::new()
        }
    };
    if proxies.is_empty() {
        println!("Proxy list is empty!");
        return Ok(());
    }

    println!("Loaded {} proxies from {:?}", proxies.len(), cli.input);

    let config = CheckerConfig::new()
        .with_concurrency(cli.threads)
        .with_timeout(Duration::from_secs(cli.timeout))
        .with_test_url(cli.test_url)
        .with_expected_status(cli.expect_status);

    let pool = ProxyPool::http(config)?;
    println!(
        "Using {} workers, timeout: {}s",
        pool.workers(),
        pool.timeout().as_secs()
    );

    let report = pool.run_report(proxies).await;

    EndpointParser::save_results(&report.results, &cli.output)?;
    if let Some(json_path) = &cli.json {
        EndpointParser::save_report(&report, json_path)?;
        println!("Saved JSON report to {:?}", json_path);
    }

    println!("Check finished in {:.1} seconds", report.elapsed.as_secs_f64());
    println!("Found {} working proxies", report.working);
    println!("Results saved to {:?}", cli.output);
    if let Some(best) = report.best() {
        println!("Best proxy: {} ({:.1}s)", best.endpoint, best.elapsed_secs());
    }

    Ok(())
}
