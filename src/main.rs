mod extract;
mod fetch;
mod input;
mod normalize;
mod output;
mod pipeline;

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

#[derive(Parser)]
#[command(name = "appstore_scraper", about = "App Store storefront metadata scraper")]
struct Cli {
    /// Input CSV with "App Name" and "App Store URL" columns
    csv: PathBuf,
    /// Max concurrent fetches (default: 2x available cores)
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,
    /// Log and skip per-record failures instead of aborting on the first
    #[arg(long)]
    keep_going: bool,
    /// Where to write the full result set
    #[arg(long, default_value = "apps.json")]
    apps_out: PathBuf,
    /// Where to write the filtered identifier indexes
    #[arg(long, default_value = "filtered_apps.json")]
    filtered_out: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = parse_cli();

    let records = input::read_records(&cli.csv)?;
    input::ensure_us_storefront(&records)?;
    if records.is_empty() {
        println!("No crawl targets in {}.", cli.csv.display());
        return Ok(());
    }

    let config = pipeline::PipelineConfig {
        concurrency: cli.concurrency.unwrap_or_else(default_concurrency).max(1),
        keep_going: cli.keep_going,
    };

    println!(
        "Scraping {} pages ({} workers)...",
        records.len(),
        config.concurrency
    );
    let outcome = pipeline::run(records, &config).await?;

    output::write_json(&cli.apps_out, &outcome.apps);
    output::write_json(&cli.filtered_out, &outcome.filtered);

    let stats = &outcome.stats;
    println!(
        "Done: {} scraped ({} ok, {} errors).",
        stats.total, stats.ok, stats.errors
    );

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    Ok(())
}

/// Parse arguments, exiting 1 on a usage error (0 for --help/--version).
fn parse_cli() -> Cli {
    Cli::try_parse().unwrap_or_else(|e| {
        let _ = e.print();
        std::process::exit(if e.use_stderr() { 1 } else { 0 });
    })
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() * 2)
        .unwrap_or(8)
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
