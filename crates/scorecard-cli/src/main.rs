//! `scorecard` command-line front end.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use scorecard::{
    DocumentStore, InMemoryStore, Pipeline, Resolver, ScoreCard, ScreenerSource, SectionKind,
    SqliteStore,
};
use tracing::{info, warn};

mod cli;
mod input;
mod logging;

use cli::{Cli, Commands};

fn open_store(cli: &Cli) -> Result<Arc<dyn DocumentStore>> {
    Ok(match &cli.db {
        Some(path) => {
            info!(path = %path.display(), "Opening SQLite store");
            Arc::new(SqliteStore::new(path)?)
        }
        None => {
            warn!("SCORECARD_DB not set, records are kept in memory for this run only");
            Arc::new(InMemoryStore::new())
        }
    })
}

fn build_resolver(cli: &Cli) -> Result<Resolver> {
    let store = open_store(cli)?;
    let resolver = if cli.offline {
        Resolver::cache_only(store)
    } else {
        Resolver::new(store, Arc::new(ScreenerSource::new(cli.company_url.as_str())))
    };
    Ok(resolver.with_threshold(cli.threshold))
}

async fn run(cli: &Cli, files: &[std::path::PathBuf]) -> Result<()> {
    let sheets = files
        .iter()
        .map(|path| input::read_sheet(path))
        .collect::<Result<Vec<_>>>()?;

    let pipeline = Pipeline::new(build_resolver(cli)?);
    let mut stdout = tokio::io::stdout();
    let summary = pipeline.run(&sheets, &mut stdout).await?;

    info!(
        sheets = sheets.len(),
        seen = summary.rows_seen,
        emitted = summary.rows_emitted,
        skipped = summary.rows_skipped,
        "Done"
    );
    Ok(())
}

async fn show(cli: &Cli, name: &str, section: SectionKind) -> Result<()> {
    let resolution = build_resolver(cli)?.resolve(name).await?;
    let record = &resolution.record;
    let scores = ScoreCard::compute(record);

    println!("{} ({})", record.name, record.url.as_deref().unwrap_or("-"));
    println!(
        "market cap {} [{}], relevance {:.2}, source {}",
        record.market_cap, resolution.category, resolution.relevance, resolution.origin
    );
    println!(
        "peer {:.2}, trend {:.2}, rating {:.2}, f-score {}/{} (profitability {}, leverage {}, efficiency {})",
        scores.peer,
        scores.trend,
        scores.rating,
        scores.f_score.total(),
        scorecard::FScore::MAX,
        scores.f_score.profitability,
        scores.f_score.leverage,
        scores.f_score.efficiency,
    );
    println!();
    println!("{section}");
    println!("{}", record.section(section).to_frame()?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_format);

    match &cli.command {
        Commands::Run { files } => run(&cli, files).await,
        Commands::Show { name, section } => show(&cli, name, (*section).into()).await,
    }
}
