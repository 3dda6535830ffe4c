mod db;
mod error;
mod fetch;
mod flatten;
mod index;
mod model;
mod parser;
mod store;
mod validate;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use crate::store::Store;

#[derive(Parser)]
#[command(name = "booknotes_scraper", about = "C-SPAN Booknotes episode archive scraper")]
struct Cli {
    /// Directory for the HTML cache, record artifacts, and sqlite database
    #[arg(short = 'd', long, default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the author index and populate the page queue
    Init,
    /// Fetch, cache, and parse queued pages (pages with artifacts are skipped)
    Scrape {
        /// Max pages to handle (default: whole queue)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Rebuild the flattened tables from the record artifacts on disk
    Flatten,
    /// Scrape + flatten in one pipeline
    Run {
        /// Max pages to scrape before flattening
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Flattened programs table
    Overview {
        /// Filter by air-date year (e.g. 1994)
        #[arg(short, long)]
        year: Option<i32>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Show pipeline statistics
    Stats,
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
    let cli = Cli::parse();

    let store = Store::new(&cli.data_dir);
    let db_path = cli.data_dir.join("booknotes.sqlite");

    let result = match cli.command {
        Commands::Init => {
            let conn = db::connect(&db_path)?;
            db::init_schema(&conn)?;
            let entries = index::fetch_author_index().await?;
            let inserted = db::insert_pages(&conn, &entries)?;
            println!("Inserted {} new program URLs ({} total found)", inserted, entries.len());
            Ok(())
        }
        Commands::Scrape { limit } => {
            let conn = db::connect(&db_path)?;
            db::init_schema(&conn)?;
            store.ensure_dirs()?;
            let pages = db::fetch_pages(&conn, limit)?;
            if pages.is_empty() {
                println!("Queue is empty. Run 'init' first.");
                return Ok(());
            }
            println!("Scraping {} pages (streaming to disk)...", pages.len());
            let stats = fetch::scrape_pages_streaming(&conn, &store, pages).await?;
            print_scrape_stats(&stats);
            Ok(())
        }
        Commands::Flatten => {
            let conn = db::connect(&db_path)?;
            db::init_schema(&conn)?;
            store.ensure_dirs()?;
            let counts = flatten::flatten_all(&conn, &store)?;
            counts.print();
            Ok(())
        }
        Commands::Run { limit } => {
            let conn = db::connect(&db_path)?;
            db::init_schema(&conn)?;
            store.ensure_dirs()?;
            let pages = db::fetch_pages(&conn, limit)?;
            if pages.is_empty() {
                println!("Queue is empty. Run 'init' first.");
                return Ok(());
            }

            // Phase 1: scrape (page-local failures do not stop the run)
            let t_scrape = Instant::now();
            println!("Pipeline: scraping {} pages...", pages.len());
            let stats = fetch::scrape_pages_streaming(&conn, &store, pages).await?;
            print_scrape_stats(&stats);
            println!("Scrape phase took {:.1}s", t_scrape.elapsed().as_secs_f64());

            // Phase 2: flatten whatever artifacts exist now
            let t_flatten = Instant::now();
            let counts = flatten::flatten_all(&conn, &store)?;
            println!("Flattened in {:.1}s", t_flatten.elapsed().as_secs_f64());
            counts.print();
            Ok(())
        }
        Commands::Overview { year, limit } => {
            let conn = db::connect(&db_path)?;
            db::init_schema(&conn)?;
            let rows = db::fetch_overview(&conn, year, limit)?;
            if rows.is_empty() {
                println!("No flattened programs found. Run 'flatten' first.");
                return Ok(());
            }

            println!(
                "{:>3} | {:<9} | {:<34} | {:<24} | {:<10} | {:>5} | {:>7}",
                "#", "Id", "Title", "Guest", "Air date", "Turns", "Related"
            );
            println!("{}", "-".repeat(108));
            for (i, r) in rows.iter().enumerate() {
                println!(
                    "{:>3} | {:<9} | {:<34} | {:<24} | {:<10} | {:>5} | {:>7}",
                    i + 1,
                    r.program_id,
                    truncate(&r.title, 34),
                    truncate(&r.guest, 24),
                    r.air_date,
                    r.turns,
                    r.related
                );
            }
            println!("\n{} programs", rows.len());
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&db_path)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Queued:      {}", s.queued);
            println!("Attempted:   {}", s.attempted);
            println!("Page errors: {}", s.page_errors);
            println!("HTML cached: {}", store.count_html());
            println!("Parsed:      {}", store.count_programs());
            println!("Flattened:   {} programs, {} transcript rows, {} related rows",
                s.flattened_programs, s.transcript_rows, s.related_rows);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn print_scrape_stats(stats: &fetch::ScrapeStats) {
    println!(
        "Done: {} attempted ({} parsed, {} already on disk, {} errors).",
        stats.total, stats.parsed, stats.skipped, stats.errors
    );
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max - 3).collect();
        format!("{}...", truncated)
    }
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
