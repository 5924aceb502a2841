use anyhow::{Context, Result};
use brandfit_playlist::cache::CatalogCache;
use brandfit_playlist::client::load_reference_chart;
use brandfit_playlist::config::load_config;
use brandfit_playlist::playlist::{MatchQualityScorer, SearchConfig, TrackSelector};
use brandfit_playlist::profile::report::{calculate_roi, generate_implementation_plan};
use brandfit_playlist::profile::{
    BrandAnswers, ExcludedGenre, ExternalSignals, MusicProfile, compute_music_profile,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "brandfit-playlist")]
#[command(about = "Brand-fit background music profiles and catalog playlists")]
#[command(version)]
struct Args {
    /// Path to the search configuration JSON file
    #[arg(short = 'c', long = "config", default_value = "search.json")]
    config_file: String,

    /// Name of the search configuration to use (defaults to the first one in the file)
    #[arg(short = 'n', long = "name")]
    config_name: Option<String>,

    /// Quiet mode - reduce output verbosity
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the music profile for a questionnaire
    Profile {
        /// Questionnaire answers JSON file
        answers: PathBuf,

        /// External analysis signals JSON file
        #[arg(short = 's', long = "signals")]
        signals: Option<PathBuf>,

        /// Print the profile as JSON
        #[arg(long = "json")]
        json: bool,
    },
    /// Compute the profile and select tracks from the catalog
    Playlist {
        /// Questionnaire answers JSON file
        answers: PathBuf,

        /// External analysis signals JSON file
        #[arg(short = 's', long = "signals")]
        signals: Option<PathBuf>,

        /// Number of tracks to print
        #[arg(long = "show", default_value_t = 20)]
        show: usize,
    },
    /// List catalog tracks tagged with any of the given genres
    Genres {
        /// Genres to look for
        #[arg(required = true)]
        genres: Vec<String>,

        /// Excluded genre families (e.g. electronic_dance, rap_hip_hop)
        #[arg(short = 'x', long = "exclude")]
        exclude: Vec<String>,

        /// Maximum number of tracks
        #[arg(short = 'l', long = "limit", default_value_t = 50)]
        limit: usize,
    },
    /// Print catalog statistics
    Stats,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn load_inputs(answers: &Path, signals: Option<&Path>) -> Result<(BrandAnswers, ExternalSignals)> {
    let answers: BrandAnswers = read_json(answers)?;
    let signals = match signals {
        Some(path) => read_json(path)?,
        None => ExternalSignals::default(),
    };
    Ok((answers, signals))
}

fn parse_excluded(ids: &[String]) -> Result<Vec<ExcludedGenre>> {
    ids.iter()
        .map(|id| {
            serde_json::from_value(serde_json::Value::String(id.clone()))
                .with_context(|| format!("Unknown excluded genre '{id}'"))
        })
        .collect()
}

fn load_search_config(args: &Args) -> Result<SearchConfig> {
    if !Path::new(&args.config_file).exists() {
        if !args.quiet {
            println!(
                "Search configuration '{}' not found, using defaults.",
                args.config_file
            );
        }
        return Ok(SearchConfig::default());
    }

    let configs = SearchConfig::load_all_from_file(&args.config_file)?;
    let config = SearchConfig::select(&configs, args.config_name.as_deref());
    if !args.quiet {
        println!(
            "Loaded {} search configurations, using '{}'",
            configs.len(),
            config.name
        );
    }
    Ok(config)
}

fn print_profile(profile: &MusicProfile, quiet: bool) {
    let f = &profile.features;
    println!("\n=== MUSIC PROFILE ===");
    println!("Goal: {}", profile.operational_goal.id());
    println!(
        "Tempo: {} BPM | Energy: {:.2} | Acousticness: {:.2} | Danceability: {:.2}",
        f.tempo, f.energy, f.acousticness, f.danceability
    );
    println!(
        "Valence: {:.2} | Instrumentalness: {:.2} | Speechiness: {:.2}",
        f.valence, f.instrumentalness, f.speechiness
    );

    if let Some(context) = &profile.cultural_context {
        println!(
            "Culture: {} (score {:.2}, {} confidence)",
            context.culture.id(),
            context.score,
            context.confidence.as_str()
        );
    }

    let genres: Vec<String> = profile
        .secondary_genres
        .iter()
        .map(|g| format!("{} ({:.2})", g.genre, g.weight))
        .collect();
    println!("Genres: {}", genres.join(", "));
    println!(
        "Years: {}+ (preferred {}-{}, recency {:+})",
        profile.year_preferences.min_year,
        profile.year_preferences.preferred_years.0,
        profile.year_preferences.preferred_years.1,
        profile.year_preferences.recency_weight
    );

    if quiet {
        return;
    }

    println!("\nReasoning:");
    for line in &profile.reasoning {
        println!("   - {line}");
    }

    println!("\nPredicted impact:");
    for (key, value) in &profile.predicted_impact {
        println!("   {key}: {value}");
    }

    let roi = calculate_roi(profile);
    println!(
        "\nROI: revenue {} | dwell time {} | monthly {} | rollout {}",
        roi.revenue_increase, roi.dwell_time_increase, roi.monthly_impact, roi.implementation_time
    );

    let plan = generate_implementation_plan(profile);
    for (title, items) in [
        ("Immediate", &plan.immediate),
        ("Weekly", &plan.weekly),
        ("Monthly", &plan.monthly),
    ] {
        println!("\n{title}:");
        for item in items {
            println!("   - {item}");
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.quiet { "warn" } else { "info" }),
    )
    .init();

    match &args.command {
        Command::Profile {
            answers,
            signals,
            json,
        } => {
            let (answers, signals) = load_inputs(answers, signals.as_deref())?;
            let profile = compute_music_profile(&answers, &signals);
            if *json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                print_profile(&profile, args.quiet);
            }
        }
        Command::Playlist {
            answers,
            signals,
            show,
        } => {
            let (answers, signals) = load_inputs(answers, signals.as_deref())?;
            let profile = compute_music_profile(&answers, &signals);
            print_profile(&profile, true);

            let config = load_config()?;
            let search_config = load_search_config(&args)?;
            let chart = match &config.reference_chart_path {
                Some(path) => load_reference_chart(path)?,
                None => Vec::new(),
            };

            let cache = CatalogCache::new(config.catalog_source(), config.cache_ttl_secs);
            let selector = TrackSelector::new(cache, search_config);
            let outcome = selector.select_for_profile(&profile);

            if let Some(error) = &outcome.diagnostics.error {
                eprintln!("Track selection failed: {error}");
                return Err(anyhow::anyhow!("Track selection failed: {}", error));
            }

            let quality = MatchQualityScorer::new(chart).score(
                &outcome.tracks,
                &profile.features,
                Some(&profile.year_preferences),
            );

            println!("\n=== PLAYLIST ===");
            println!(
                "Selected {} tracks | Match quality: {}/100",
                outcome.tracks.len(),
                quality
            );
            if let Some(strategy) = outcome.diagnostics.success_strategy {
                println!("Strategy: {}", strategy.label());
            }
            if let Some(stats) = &outcome.diagnostics.final_stats {
                println!(
                    "Cultural matches: {} | From 2020s: {} | Avg match: {}%",
                    stats.cultural_matches, stats.recent_2020s, stats.average_match_score
                );
            }
            if !args.quiet {
                for step in &outcome.diagnostics.steps {
                    println!(
                        "   {} -> {} tracks{}",
                        step.strategy.label(),
                        step.tracks_found,
                        if step.accepted { " (accepted)" } else { "" }
                    );
                }
            }

            println!();
            for (i, track) in outcome.tracks.iter().take(*show).enumerate() {
                println!(
                    "{:>3}. {} - {} [{}] | {} BPM | score {:.2} | pop {}{}",
                    i + 1,
                    track.artist,
                    track.title,
                    track.release_year,
                    track.features.tempo.round(),
                    track.match_score,
                    track.popularity,
                    if track.cultural_match { " | cultural" } else { "" }
                );
            }
        }
        Command::Genres {
            genres,
            exclude,
            limit,
        } => {
            let excluded = parse_excluded(exclude)?;
            let config = load_config()?;
            let search_config = load_search_config(&args)?;
            let cache = CatalogCache::new(config.catalog_source(), config.cache_ttl_secs);
            let tracks = TrackSelector::new(cache, search_config).genre_search(genres, &excluded, *limit)?;

            println!("\n=== GENRE SEARCH: {} ===", genres.join(", "));
            println!("Found {} tracks", tracks.len());
            for (i, track) in tracks.iter().enumerate() {
                println!(
                    "{:>3}. {} - {} [{}] | {}",
                    i + 1,
                    track.artist,
                    track.title,
                    track.release_year,
                    track.genre_text()
                );
            }
        }
        Command::Stats => {
            let config = load_config()?;
            let search_config = load_search_config(&args)?;
            let cache = CatalogCache::new(config.catalog_source(), config.cache_ttl_secs);
            let stats = TrackSelector::new(cache, search_config).catalog_stats()?;

            println!("\n=== CATALOG ===");
            println!(
                "Tracks: {} | Enriched: {} ({}%) | Genres: {}",
                stats.total_tracks,
                stats.with_enrichment_data,
                stats.coverage_percentage,
                stats.distinct_genres
            );
            if let Some(avg) = &stats.average_features {
                println!(
                    "Average: {:.1} BPM | Energy {:.2} | Acousticness {:.2} | Valence {:.2} | Popularity {:.1}",
                    avg.tempo, avg.energy, avg.acousticness, avg.valence, avg.popularity
                );
            }
            println!("\nTempo distribution:");
            for (bucket, count) in &stats.tempo_distribution {
                println!("   {bucket}: {count}");
            }
            println!("\nTop genres:");
            for genre in &stats.top_genres {
                println!("   {} ({})", genre.genre, genre.count);
            }
        }
    }

    Ok(())
}
