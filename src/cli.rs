use crate::api;
use crate::engine::Engine;
use crate::error::Result;
use crate::services::fetch::ReqwestFetcher;
use crate::services::store::CsvStore;
use crate::types::ApiResponse;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tabscrape", version, about = "Debate tab scraping + statistics (JSON status out)")]
pub struct Cli {
    /// Directory scraped CSVs are written to and read from
    #[arg(long, default_value = "scraped_data")]
    data_dir: PathBuf,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape every artifact (motions, speakers, teams, results) for one tournament
    Scrape(ScrapeArgs),
    /// Scrape every tournament listed in a manifest CSV
    Batch(BatchArgs),
    #[command(subcommand)]
    Stats(StatsCmd),
}

#[derive(Args)]
struct ScrapeArgs {
    /// Tournament name used in output file names
    name: String,
    /// Tournament landing page URL
    url: String,
}

#[derive(Args)]
struct BatchArgs {
    /// CSV with Date, Tournament and Event_Link columns
    manifest: PathBuf,
}

#[derive(Subcommand)]
enum StatsCmd {
    /// Normalized score per speaking position across all scraped results
    Positions,
    /// Motion word frequencies, stopwords removed
    Words {
        #[arg(long, default_value_t = 50)]
        top: usize,
    },
    /// Write the derived motions tab for one tournament
    MotionsTab { name: String },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let store = CsvStore::new(&cli.data_dir)?;

    match cli.cmd {
        Command::Scrape(args) => {
            let fetcher = ReqwestFetcher::new()?;
            let engine = Engine::new(&fetcher, &store);
            finish(api::scrape_tournament(&engine, &args.name, &args.url));
        }
        Command::Batch(args) => {
            let fetcher = ReqwestFetcher::new()?;
            let engine = Engine::new(&fetcher, &store);
            finish(api::run_manifest(&engine, &args.manifest));
        }
        Command::Stats(StatsCmd::Positions) => finish(api::position_stats(&store)),
        Command::Stats(StatsCmd::Words { top }) => finish(api::word_stats(&store, top)),
        Command::Stats(StatsCmd::MotionsTab { name }) => finish(api::motions_tab(&store, &name)),
    }
    Ok(())
}

fn finish<T: serde::Serialize>(res: Result<T>) {
    match res {
        Ok(v) => print_json(ApiResponse::ok(v)),
        Err(e) => print_json(ApiResponse::<()>::err(e.to_string())),
    }
}

fn print_json<T: serde::Serialize>(val: T) {
    // pretty JSON output
    println!("{}", serde_json::to_string_pretty(&val).unwrap());
}
