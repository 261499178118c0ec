/// Drill CLI - run practice sessions without a UI
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use drill_core::{Catalog, CategorySelection, ExerciseId, FilterCriteria};
use drill_playback::{
    parse_bound, parse_reps, ManualClock, PracticeSession, RandomizeSettings, StepSettings,
};
use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod runner;
mod simulator;

use config::DrillConfig;
use runner::{RunSummary, Runner};
use simulator::SimulatedPlayer;

#[derive(Parser)]
#[command(name = "drill-cli")]
#[command(about = "Drill Player practice engine driver", long_about = None)]
struct Cli {
    /// Catalog JSON file
    #[arg(long, env = "DRILL_CATALOG", default_value = "catalog.json")]
    catalog: PathBuf,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print session events as JSON lines
    #[arg(long)]
    json_events: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List exercises, optionally filtered by category
    List {
        /// Category name ("all" for every exercise)
        #[arg(short = 'C', long, default_value = "all")]
        category: String,
    },
    /// List category names
    Categories,
    /// List playlists
    Playlists,
    /// Practice a single exercise
    Exercise {
        /// Exercise id
        id: String,
        /// Starting tempo in BPM (clamped to half/double the original)
        #[arg(short, long)]
        tempo: Option<u32>,
        /// Auto-advance mode
        #[arg(short, long, value_enum, default_value_t = AutoMode::Off)]
        auto: AutoMode,
        /// Repetitions before each tempo change
        #[arg(short, long, default_value = "1", allow_hyphen_values = true)]
        reps: String,
        /// Lower bound for randomized tempos
        #[arg(long, default_value = "")]
        min: String,
        /// Upper bound for randomized tempos
        #[arg(long, default_value = "")]
        max: String,
        /// Signed BPM change per step
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        step: String,
        /// Number of plays to simulate
        #[arg(short, long, default_value_t = 4)]
        plays: u32,
    },
    /// Play a playlist to the end
    Playlist {
        /// Playlist name
        name: String,
    },
    /// Print the effective configuration
    ShowConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AutoMode {
    Off,
    Randomize,
    Step,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drill_cli=info,drill_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = DrillConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::ShowConfig => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Commands::List { category } => {
            let catalog = load_catalog(&cli.catalog)?;
            let selection = CategorySelection::parse(&category);
            for exercise in catalog.filter_exercises(&FilterCriteria::Category(&selection)) {
                println!(
                    "{:<20} {:<30} {:>4} BPM",
                    exercise.id, exercise.name, exercise.original_tempo_bpm
                );
            }
        }
        Commands::Categories => {
            let catalog = load_catalog(&cli.catalog)?;
            for category in catalog.categories() {
                println!("{}", category);
            }
        }
        Commands::Playlists => {
            let catalog = load_catalog(&cli.catalog)?;
            for playlist in catalog.playlists() {
                println!("{:<30} {:>4} plays", playlist.name, playlist.total_plays());
            }
        }
        Commands::Exercise {
            id,
            tempo,
            auto,
            reps,
            min,
            max,
            step,
            plays,
        } => {
            let catalog = load_catalog(&cli.catalog)?;
            let mut runner = build_runner(catalog, &config, cli.json_events);
            let session = runner.session_mut();

            session.select_exercise(&ExerciseId::new(id))?;
            if let Some(bpm) = tempo {
                session.set_tempo(bpm)?;
            }
            match auto {
                AutoMode::Off => {}
                AutoMode::Randomize => {
                    session.set_randomize_settings(RandomizeSettings {
                        reps_before_change: parse_reps(&reps),
                        min_bpm: parse_bound(&min),
                        max_bpm: parse_bound(&max),
                    });
                    session.toggle_randomize_auto(true);
                }
                AutoMode::Step => {
                    session.set_step_settings(StepSettings::from_inputs(&reps, &step));
                    session.toggle_tempo_step_auto(true);
                }
            }
            session.play()?;

            let summary = runner.run(plays)?;
            report(&summary);
        }
        Commands::Playlist { name } => {
            let catalog = load_catalog(&cli.catalog)?;
            let total = catalog
                .playlist(&name)
                .map_or(0, |playlist| playlist.total_plays());
            let mut runner = build_runner(catalog, &config, cli.json_events);

            runner.session_mut().start_playlist_by_name(&name)?;

            let summary = runner.run(u32::try_from(total).unwrap_or(u32::MAX))?;
            report(&summary);
        }
    }

    Ok(())
}

fn load_catalog(path: &Path) -> anyhow::Result<Arc<Catalog>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open catalog {}", path.display()))?;
    let catalog = Catalog::from_json_reader(BufReader::new(file))
        .with_context(|| format!("Invalid catalog {}", path.display()))?;
    tracing::info!(
        "Loaded {} exercises and {} playlists",
        catalog.exercises().len(),
        catalog.playlists().len()
    );
    Ok(Arc::new(catalog))
}

fn build_runner(catalog: Arc<Catalog>, config: &DrillConfig, json_events: bool) -> Runner {
    let simulation = &config.simulation;
    let lengths: HashMap<String, Duration> = simulation
        .track_lengths
        .iter()
        .map(|(audio, secs)| (audio.clone(), Duration::from_secs(*secs)))
        .collect();
    let player = SimulatedPlayer::new(Duration::from_secs(simulation.track_secs), lengths);
    let clock = ManualClock::new();

    let mut session = PracticeSession::with_clock(
        catalog,
        player.clone(),
        config.practice.clone(),
        Box::new(clock.clone()),
    );
    if let Some(seed) = simulation.seed {
        session = session.with_seed(seed);
    }

    Runner::new(session, player, clock, Duration::from_millis(simulation.tick_ms))
        .with_json_events(json_events)
}

fn report(summary: &RunSummary) {
    tracing::info!(
        "Finished after {} plays at {} BPM (mode {:?})",
        summary.plays,
        summary.final_bpm,
        summary.final_mode
    );
    if let Some(playlist) = summary.last_progress.and_then(|progress| progress.playlist) {
        tracing::info!(
            "Playlist time {:.1}s of {:.1}s",
            playlist.elapsed.as_secs_f64(),
            playlist.total.as_secs_f64()
        );
    }
}
