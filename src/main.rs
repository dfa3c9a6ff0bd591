//! stockbrief CLI entry point

use clap::{Parser, Subcommand};
use sqlx::PgPool;
use std::path::PathBuf;
use std::sync::Arc;
use stockbrief::{
    config::Config,
    context::ContextTools,
    embed::create_embedder,
    error::Result,
    ingest::{collect_news, ArticleSink, IngestPipeline, JsonFileFetcher},
    llm::create_generator,
    models::{Article, PriceBar},
    report::ReportService,
    store::{self, DocumentIngestor, NewsStore, PgReportCache, PriceStore},
};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "stockbrief")]
#[command(version, about = "Stock news retrieval and daily report pipeline", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest news articles from a JSON file
    Ingest {
        /// Path to a JSON array of articles
        file: PathBuf,
    },

    /// Run the batched news collection job for a set of tickers
    Collect {
        /// Path to a JSON array of articles serving as the feed
        file: PathBuf,

        /// Tickers to collect news for
        #[arg(required = true)]
        tickers: Vec<String>,
    },

    /// Load daily OHLCV bars from a JSON file
    Prices {
        /// Path to a JSON array of bars
        file: PathBuf,
    },

    /// Search a ticker's news semantically
    Search {
        /// Ticker to search within
        ticker: String,

        /// The search query
        query: String,

        /// Maximum number of documents returned
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,

        /// Candidate chunks retrieved before parent aggregation
        #[arg(long, default_value = "20")]
        candidate_pool: usize,
    },

    /// Get today's report for a ticker, generating it if needed
    Report {
        /// Ticker to report on
        ticker: String,

        /// Only read the cache; never trigger generation
        #[arg(long)]
        cached_only: bool,

        /// List all cached reports for the ticker instead
        #[arg(long)]
        history: bool,
    },

    /// Remove a news document (and its chunks) by URL
    Remove {
        /// Source URL of the document
        url: String,
    },

    /// Show row counts across the stores
    Status,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = Config::from_env()?;
    let pool = store::connect(&config.database_url).await?;
    store::ensure_schema(&pool, config.embedding.dimension).await?;

    match cli.command {
        Commands::Ingest { file } => cmd_ingest(&config, pool, &file).await,
        Commands::Collect { file, tickers } => cmd_collect(&config, pool, &file, &tickers).await,
        Commands::Prices { file } => cmd_prices(pool, &file, cli.json).await,
        Commands::Search {
            ticker,
            query,
            top_k,
            candidate_pool,
        } => cmd_search(&config, pool, &ticker, &query, top_k, candidate_pool, cli.json).await,
        Commands::Report {
            ticker,
            cached_only,
            history,
        } => cmd_report(&config, pool, &ticker, cached_only, history, cli.json).await,
        Commands::Remove { url } => cmd_remove(&config, pool, &url).await,
        Commands::Status => cmd_status(pool, cli.json).await,
    }
}

fn news_store(config: &Config, pool: PgPool) -> Result<Arc<NewsStore>> {
    let embedder = create_embedder(&config.embedding)?;
    Ok(Arc::new(NewsStore::new(pool, embedder)))
}

fn ingest_pipeline(config: &Config, pool: PgPool) -> Result<IngestPipeline> {
    let embedder = create_embedder(&config.embedding)?;
    let store = Arc::new(NewsStore::new(pool, embedder.clone()));
    let ingestor = DocumentIngestor::new(embedder, store, config.embedding.batch_size);
    Ok(IngestPipeline::new(ingestor, config.chunk.clone()))
}

async fn cmd_ingest(config: &Config, pool: PgPool, file: &PathBuf) -> Result<()> {
    let raw = std::fs::read_to_string(file)?;
    let articles: Vec<Article> = serde_json::from_str(&raw)?;

    let pipeline = ingest_pipeline(config, pool)?;
    let outcome = pipeline.ingest(articles).await?;

    println!(
        "Ingested {} documents ({} chunks), {} duplicates skipped, {} failed",
        outcome.documents, outcome.chunks, outcome.skipped, outcome.failed
    );
    Ok(())
}

async fn cmd_collect(
    config: &Config,
    pool: PgPool,
    file: &PathBuf,
    tickers: &[String],
) -> Result<()> {
    let fetcher = JsonFileFetcher::from_path(file)?;
    let pipeline = ingest_pipeline(config, pool)?;

    let stats = collect_news(&fetcher, &pipeline, tickers, &config.collect).await;

    println!(
        "Collected {} documents ({} chunks) across {} batches; {} duplicates, {} failed batches",
        stats.documents, stats.chunks, stats.batches, stats.skipped, stats.failed_batches
    );
    Ok(())
}

async fn cmd_prices(pool: PgPool, file: &PathBuf, json: bool) -> Result<()> {
    let raw = std::fs::read_to_string(file)?;
    let bars: Vec<PriceBar> = serde_json::from_str(&raw)?;

    let prices = PriceStore::new(pool);
    let written = prices.insert_bars(&bars).await?;

    if json {
        println!("{}", serde_json::json!({ "written": written }));
    } else {
        println!("Loaded {} price bars ({} new)", bars.len(), written);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn cmd_search(
    config: &Config,
    pool: PgPool,
    ticker: &str,
    query: &str,
    top_k: usize,
    candidate_pool: usize,
    json: bool,
) -> Result<()> {
    let store = news_store(config, pool)?;
    let results = store.search(ticker, query, top_k, candidate_pool).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results for '{query}' in {ticker} news");
        return Ok(());
    }
    for (i, scored) in results.iter().enumerate() {
        println!(
            "{}. [{:.3}] {} ({})",
            i + 1,
            scored.score,
            scored.document.title,
            scored.document.url
        );
    }
    Ok(())
}

async fn cmd_report(
    config: &Config,
    pool: PgPool,
    ticker: &str,
    cached_only: bool,
    history: bool,
    json: bool,
) -> Result<()> {
    let cache = Arc::new(PgReportCache::new(pool.clone()));

    if history {
        let reports = cache.history(ticker).await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        } else if reports.is_empty() {
            println!("No cached reports for {ticker}");
        } else {
            for report in &reports {
                println!("=== {} ({}) ===\n{}\n", report.ticker, report.created_at, report.report);
            }
        }
        return Ok(());
    }

    let news = news_store(config, pool.clone())?;
    let prices = Arc::new(PriceStore::new(pool));
    let context = Arc::new(ContextTools::new(news, prices));
    let generator = create_generator(&config.llm, context)?;
    let service = ReportService::new(
        cache,
        generator,
        config.business_timezone,
        config.llm.timeout_secs,
    );

    let body = if cached_only {
        match service.cached_report(ticker).await? {
            Some(body) => body,
            None => {
                println!("No cached report for {ticker} today");
                return Ok(());
            }
        }
    } else {
        service.generate_report(ticker).await?
    };

    if json {
        println!("{}", serde_json::json!({ "ticker": ticker, "report": body }));
    } else {
        println!("{body}");
    }
    Ok(())
}

async fn cmd_remove(config: &Config, pool: PgPool, url: &str) -> Result<()> {
    let store = news_store(config, pool)?;
    if store.delete_document(url).await? {
        println!("Removed document {url}");
    } else {
        println!("No document found for {url}");
    }
    Ok(())
}

async fn cmd_status(pool: PgPool, json: bool) -> Result<()> {
    let stats = store::stats(&pool).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Documents:  {}", stats.documents);
        println!("Chunks:     {}", stats.chunks);
        println!("Reports:    {}", stats.reports);
        println!("Price bars: {}", stats.price_bars);
    }
    Ok(())
}
