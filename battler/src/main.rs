use std::path::PathBuf;

use battler::{
    RESULTS_DIRECTORY,
    config::{DEFAULT_CONFIG_PATH, TestConfig, config_path_for, read_config, write_config},
    records::{read_results_from_csv, write_results_to_csv},
    report::{print_report, summary_json},
    simulate::{SimulatedMatch, SimulationSettings, run_simulation},
    timestamp_string,
    tracker::MatchTracker,
};
use clap::{Parser, Subcommand};
use log::info;
use tourney_core::{Grade, Komi, parse_grade, parse_komi};

const DEFAULT_MAX_GAMES: u64 = 20_000;
const DEFAULT_DRAW_RATE: f64 = 0.3;

#[derive(Parser, Debug)]
struct Args {
    /// YAML test config. Defaults to data/sprt.yaml when it exists.
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play simulated games until the SPRT decides
    Simulate {
        #[arg(short = 'g', long, default_value_t = DEFAULT_MAX_GAMES)]
        games: u64,
        /// Defaults to one less than the number of cpus
        #[arg(short = 'w', long)]
        workers: Option<usize>,
        #[arg(short = 'e', long, default_value_t = 0.0, allow_negative_numbers = true)]
        elo_diff: f64,
        #[arg(short = 'd', long, default_value_t = DEFAULT_DRAW_RATE)]
        draw_rate: f64,
        #[arg(short = 'o', long)]
        out: Option<PathBuf>,
        #[arg(long)]
        histogram: bool,
    },
    /// Rebuild the statistics of a results file, using the config written
    /// next to it unless --config is given
    Replay {
        path: PathBuf,
        #[arg(long)]
        histogram: bool,
        /// Print a JSON summary instead of the tables
        #[arg(long)]
        json: bool,
    },
    /// Show how a grade string is read
    Grade { text: String },
    /// Show how a komi string is read
    Komi { text: String },
}

fn load_config(path: Option<PathBuf>) -> Result<TestConfig, Box<dyn std::error::Error>> {
    let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let config = match path {
        Some(path) => read_config(&path)?,
        None if default_path.exists() => read_config(&default_path)?,
        None => TestConfig::default(),
    };
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.command {
        Command::Simulate {
            games,
            workers,
            elo_diff,
            draw_rate,
            out,
            histogram,
        } => {
            let config = load_config(args.config)?;
            let workers = workers.unwrap_or_else(|| num_cpus::get().saturating_sub(1).max(1));
            let settings = SimulationSettings {
                max_games: games,
                workers,
                model: SimulatedMatch {
                    elo_diff,
                    draw_rate,
                },
            };
            info!(
                "Testing {} against {} with a simulated difference of {} elo",
                config.candidate, config.baseline, elo_diff
            );

            let summary = run_simulation(&config, &settings);

            let out = out.unwrap_or_else(|| {
                PathBuf::from(RESULTS_DIRECTORY).join(format!("sprt-{}.csv", timestamp_string()))
            });
            write_results_to_csv(&summary.results, &out)?;
            let config_out = config_path_for(&out);
            write_config(&config, &config_out)?;
            eprintln!(
                "wrote {} results to {} and the test config to {}",
                summary.results.len(),
                out.display(),
                config_out.display()
            );

            print_report(&summary.tracker, histogram);
        }
        Command::Replay {
            path,
            histogram,
            json,
        } => {
            // A config stored next to the results file wins over the default one
            let stored = config_path_for(&path);
            let config_path = args.config.or_else(|| stored.exists().then_some(stored));
            let config = load_config(config_path)?;
            let results = read_results_from_csv(&path)?;
            let mut tracker = MatchTracker::new(&config);
            for result in &results {
                tracker.record(result);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&summary_json(&tracker))?);
            } else {
                print_report(&tracker, histogram);
            }
        }
        Command::Grade { text } => {
            let grade: Grade = parse_grade(&text);
            println!(
                "{} -> {} (value {}, owner {})",
                text,
                grade,
                grade.value(),
                grade.owner()
            );
        }
        Command::Komi { text } => {
            let komi: Komi = parse_komi(&text);
            println!(
                "{} -> {} (value {}, owner {})",
                text,
                komi,
                komi.value(),
                komi.owner()
            );
        }
    }

    Ok(())
}

// cargo run -p battler -r -- simulate --elo-diff 15 --games 20000
// cargo run -p battler -r -- replay tmp/sprt-2025-01-01_00-00-00.csv --json
