use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use listing_scout::db::SqliteStore;
use listing_scout::pipeline::check_completeness;
use listing_scout::{
    AnalysisPipeline, AnalysisResult, Config, ErrorEnvelope, PropertyData, ScoringEngine,
    UrlIdentifier,
};

#[derive(Parser)]
#[command(name = "listing_scout", about = "Scrape and score real-estate listings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which portal and listing id a URL points to
    Identify { url: String },
    /// Scrape a listing and print the extracted record as JSON
    Scrape { url: String },
    /// Score a previously saved PropertyData JSON file
    Analyze {
        file: PathBuf,
        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Scrape + analyze one listing
    Run {
        url: String,
        /// Save property and analysis to the local database
        #[arg(long)]
        store: bool,
        /// Refuse listings with no price, area or location
        #[arg(long)]
        strict: bool,
        /// Print the full output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Re-score stored listings without scraping again
    Reanalyze {
        /// Max listings to re-score (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show database statistics
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
    let cfg = Config::from_env()?;

    let result = match cli.command {
        Commands::Identify { url } => {
            let id = UrlIdentifier::new();
            let r = id.identify(&url).map_err(report)?;
            println!("Site:        {}", r.site);
            println!("Property id: {}", r.property_id);
            println!("Supported:   {}", if id.is_supported(&url) { "yes" } else { "no" });
            Ok(())
        }
        Commands::Scrape { url } => {
            let pipeline = AnalysisPipeline::from_config(&cfg);
            let data = pipeline.scrape(&url).await.map_err(report)?;
            println!("{}", serde_json::to_string_pretty(&data)?);
            Ok(())
        }
        Commands::Analyze { file, json } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let data: PropertyData = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a PropertyData record", file.display()))?;
            let analysis = ScoringEngine::new(cfg.scoring.clone()).analyze(&data);
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print_analysis(&data, &analysis);
            }
            Ok(())
        }
        Commands::Run {
            url,
            store,
            strict,
            json,
        } => {
            let mut pipeline = AnalysisPipeline::from_config(&cfg);
            if store {
                let db = SqliteStore::open(&cfg.db_path)?;
                pipeline = pipeline.with_store(Box::new(db));
            }
            let out = if strict {
                let data = pipeline.scrape(&url).await.map_err(report)?;
                check_completeness(&data).map_err(report)?;
                pipeline.complete(data).await
            } else {
                pipeline.scrape_and_analyze(&url).await.map_err(report)?
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print_analysis(&out.property_data, &out.analysis);
            }
            Ok(())
        }
        Commands::Reanalyze { limit } => {
            let db = SqliteStore::open(&cfg.db_path)?;
            let props = db.fetch_properties(limit)?;
            if props.is_empty() {
                println!("No stored listings. Run 'run <url> --store' first.");
                return Ok(());
            }
            println!("Re-scoring {} listings...", props.len());
            let engine = ScoringEngine::new(cfg.scoring.clone());
            let saved = reanalyze(&db, &engine, props)?;
            println!("Saved {} analyses.", saved);
            Ok(())
        }
        Commands::Stats => {
            let db = SqliteStore::open(&cfg.db_path)?;
            let s = db.get_stats()?;
            println!("Listings:  {}", s.properties);
            println!("Analyses:  {}", s.analyses);
            println!("Critical:  {}", s.critical);
            match s.avg_score {
                Some(avg) => println!("Avg score: {:.1}", avg),
                None => println!("Avg score: -"),
            }
            for (site, n) in &s.by_site {
                println!("  {:<12} {}", site, n);
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Print the envelope's guidance and hand it back as the command error.
fn report(env: ErrorEnvelope) -> anyhow::Error {
    eprintln!("{}", env.message);
    eprintln!("  {}", env.explanation);
    for s in &env.suggestions {
        eprintln!("  - {}", s);
    }
    if env.recoverable {
        eprintln!("  Retry in about {}s.", env.retry_delay_ms / 1000);
    }
    anyhow::Error::new(env)
}

fn reanalyze(
    db: &SqliteStore,
    engine: &ScoringEngine,
    props: Vec<PropertyData>,
) -> anyhow::Result<usize> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(props.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut saved = 0;
    for chunk in props.chunks(500) {
        let rows: Vec<(PropertyData, AnalysisResult)> = chunk
            .par_iter()
            .map(|p| (p.clone(), engine.analyze(p)))
            .collect();
        saved += db.save_analyses(&rows)?;
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(saved)
}

fn print_analysis(data: &PropertyData, a: &AnalysisResult) {
    println!("{}", data.title);
    println!("{} ({})", data.url, data.site);
    println!();
    println!("Overall score:     {:>3}/100", a.overall_score.score);
    println!("  Listing quality: {:>3} ({:?})", a.listing_quality.score, a.listing_quality.level);
    println!("  Space:           {:>3}", a.space_efficiency.score);
    println!("  Completeness:    {:>3}", a.data_completeness.score);
    println!(
        "  Location:        {:>3} ({})",
        a.location_context.score, a.location_context.neighborhood
    );
    println!("{}", a.overall_score.explanation);

    let sections = [
        ("Issues", &a.data_quality.issues),
        ("Warnings", &a.data_quality.warnings),
        ("Recommendations", &a.recommendations),
        ("Risks", &a.risks),
        ("Opportunities", &a.opportunities),
    ];
    for (title, items) in sections {
        if items.is_empty() {
            continue;
        }
        println!("\n--- {} ---", title);
        for item in items {
            println!("  - {}", item);
        }
    }
    println!("\n{}", a.disclaimer);
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
