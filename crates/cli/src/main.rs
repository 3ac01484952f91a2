use anyhow::{Context, Result, anyhow, bail};
use catalog::{CatalogIndex, FilmMark, Genre, UserId};
use clap::{Parser, Subcommand};
use colored::Colorize;
use server::{FilmRecommendation, RecommendationService};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// film-recs - Film recommendations from peers with overlapping taste
#[derive(Parser)]
#[command(name = "film-recs")]
#[command(about = "Film recommendation engine using collaborative filtering", long_about = None)]
struct Cli {
    /// Directory holding users.dat, films.dat and marks.dat
    #[arg(short, long, env = "FILM_RECS_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get film recommendations for a user
    Recommend {
        /// User ID to get recommendations for
        #[arg(long)]
        user_id: UserId,

        /// Number of recommendations to return
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Print recommendations as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show user profile and marks
    User {
        /// User ID to display
        #[arg(long)]
        user_id: UserId,
    },

    /// Search for films by title
    Search {
        /// Film title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let start = Instant::now();
    let index = Arc::new(
        CatalogIndex::load_from_dir(&cli.data_dir).context("Failed to load film catalog")?,
    );
    let (users, films, marks) = index.counts();
    tracing::info!(
        "Loaded {} users, {} films, {} marks in {:?}",
        users,
        films,
        marks,
        start.elapsed()
    );

    match cli.command {
        Commands::Recommend {
            user_id,
            limit,
            json,
        } => handle_recommend(index, user_id, limit, json).await?,
        Commands::User { user_id } => handle_user(&index, user_id)?,
        Commands::Search { title } => handle_search(&index, &title),
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(index, requests, concurrent).await?,
    }

    Ok(())
}

fn build_service(index: Arc<CatalogIndex>) -> RecommendationService {
    RecommendationService::new(index.clone(), index)
}

/// Handle the 'recommend' command
async fn handle_recommend(
    index: Arc<CatalogIndex>,
    user_id: UserId,
    limit: usize,
    json: bool,
) -> Result<()> {
    index
        .get_user(user_id)
        .ok_or_else(|| anyhow!("User {} not found", user_id))?;

    let service = build_service(index);
    let recommendations = service.get_recommendations(user_id, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
    } else {
        print_recommendations(user_id, &recommendations);
    }
    Ok(())
}

/// Handle the 'user' command
fn handle_user(index: &CatalogIndex, user_id: UserId) -> Result<()> {
    let user = index
        .get_user(user_id)
        .ok_or_else(|| anyhow!("User {} not found", user_id))?;
    let marks = index.get_user_marks(user_id);

    println!("{}", format!("User {} ({})", user.name, user.login).bold().blue());

    let mean = if marks.is_empty() {
        0.0
    } else {
        marks.iter().map(|m| m.score as f64).sum::<f64>() / marks.len() as f64
    };
    println!("{}Marks: {}", "• ".cyan(), marks.len());
    println!("{}Mean score: {:.2}", "• ".cyan(), mean);

    let mut top: Vec<&FilmMark> = marks.iter().collect();
    top.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.film_id.cmp(&b.film_id)));
    println!("Top marked films:");
    for mark in top.iter().take(5) {
        if let Some(film) = index.get_film(mark.film_id) {
            println!("  - {} (score: {})", film.title, mark.score);
        }
    }

    let mut genre_counts: BTreeMap<Genre, usize> = BTreeMap::new();
    for mark in marks {
        if let Some(film) = index.get_film(mark.film_id) {
            for genre in &film.genres {
                *genre_counts.entry(*genre).or_insert(0) += 1;
            }
        }
    }
    println!("Genres marked:");
    for (genre, count) in genre_counts {
        println!("  - {}: {} films", genre, count);
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(index: &CatalogIndex, title: &str) {
    println!("{}", format!("Search results for '{}':", title).bold().blue());
    for film in index.search_films(title).into_iter().take(20) {
        let genres = film
            .genres
            .iter()
            .map(|g| g.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{}: {} [{}] {} avg {:.2} ({} marks)",
            film.id, film.title, genres, film.mpa, film.rating, film.mark_count
        );
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    index: Arc<CatalogIndex>,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 || concurrent == 0 {
        bail!("--requests and --concurrent must both be positive");
    }
    let user_ids = index.all_user_ids();
    if user_ids.is_empty() {
        bail!("Catalog has no users to benchmark with");
    }

    let service = build_service(index);
    let permits = Arc::new(Semaphore::new(concurrent));
    let wall_clock = Instant::now();

    let mut handles = Vec::with_capacity(requests);
    for _ in 0..requests {
        let user_id = user_ids[rand::random_range(0..user_ids.len())];
        let service = service.clone();
        let permits = Arc::clone(&permits);
        handles.push(tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let start = Instant::now();
            service.get_recommendations(user_id, 20).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    for handle in handles {
        timings.push(handle.await??);
    }
    let total_time = wall_clock.elapsed();

    timings.sort();
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!(
        "Throughput: {:.2} requests/second",
        requests as f64 / total_time.as_secs_f64()
    );

    Ok(())
}

/// Format and print recommendations
fn print_recommendations(user_id: UserId, recommendations: &[FilmRecommendation]) {
    println!(
        "{}",
        format!("Film recommendations for user {}:", user_id).bold().blue()
    );
    if recommendations.is_empty() {
        println!("  No peer shares a marked film with this user yet.");
        return;
    }
    for rec in recommendations {
        println!(
            "{}. {} ({}) [{}] {} - Rating: {:.2}",
            rec.rank.to_string().green(),
            rec.title,
            rec.year.map(|y| y.to_string()).unwrap_or_else(|| "????".to_string()),
            rec.genres.join(", "),
            rec.mpa,
            rec.rating
        );
    }
}
