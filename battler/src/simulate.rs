use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
        mpsc,
    },
    time::Duration,
};

use log::info;
use rand::Rng;
use tourney_core::{Grade, Outcome, OutcomeKind, Side, SprtResult, grade::MAX_GRADE};

use crate::{
    config::TestConfig,
    records::BattleResult,
    timestamp_string,
    tracker::{MatchTracker, SharedTracker},
};

/// Largest margin a simulated near-draw is given.
const MAX_SIMULATED_MARGIN: u16 = 60;

const DECISIVE_KINDS: [OutcomeKind; 4] = [
    OutcomeKind::Win,
    OutcomeKind::Resignation,
    OutcomeKind::Adjudication,
    OutcomeKind::Timeout,
];

/// Synthetic stand-in for a real pair of engines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulatedMatch {
    /// Logistic Elo advantage of the candidate over the baseline
    pub elo_diff: f64,
    /// Share of games without an outright winner
    pub draw_rate: f64,
}

impl SimulatedMatch {
    pub fn expected_score(&self) -> f64 {
        1.0 / (1.0 + 10.0_f64.powf(-self.elo_diff / 400.0))
    }

    pub fn play<R: Rng>(&self, rng: &mut R, candidate_side: Side) -> Outcome {
        let expected = self.expected_score();
        let draw_rate = self.draw_rate.clamp(0.0, 1.0);
        let p_win = (expected - draw_rate / 2.0).clamp(0.0, 1.0 - draw_rate);

        let roll: f64 = rng.random();
        if roll < 1.0 - draw_rate {
            let winner = if roll < p_win {
                candidate_side
            } else {
                !candidate_side
            };
            let kind = DECISIVE_KINDS[rng.random_range(0..DECISIVE_KINDS.len())];
            return Outcome::with_grade(kind, Some(winner), Grade::decisive(winner), "");
        }

        let owner = if rng.random_bool(expected.clamp(0.0, 1.0)) {
            candidate_side
        } else {
            !candidate_side
        };
        let value = rng.random_range(1..=MAX_SIMULATED_MARGIN.min(MAX_GRADE));
        match Grade::new(value, owner) {
            Some(grade) => Outcome::from_grade(grade, ""),
            None => Outcome::new(OutcomeKind::Draw, None, ""),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SimulationSettings {
    pub max_games: u64,
    pub workers: usize,
    pub model: SimulatedMatch,
}

pub enum WorkerMessage {
    BattleResult(BattleResult),
    Done,
}

pub struct SimulationSummary {
    pub tracker: MatchTracker,
    pub results: Vec<BattleResult>,
}

fn battling_worker(
    worker_idx: usize,
    config: &TestConfig,
    settings: &SimulationSettings,
    next_game: &AtomicU64,
    stop: &AtomicBool,
    tracker: &SharedTracker,
    result_channel: &mpsc::Sender<WorkerMessage>,
) {
    let mut rng = rand::rng();

    loop {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        let game_id = next_game.fetch_add(1, Ordering::Relaxed);
        if game_id >= settings.max_games {
            break;
        }

        // Colours alternate so each player gets both sides equally often
        let candidate_side = if game_id % 2 == 0 {
            Side::First
        } else {
            Side::Second
        };
        let outcome = settings.model.play(&mut rng, candidate_side);
        let (first, second) = match candidate_side {
            Side::First => (&config.candidate, &config.baseline),
            Side::Second => (&config.baseline, &config.candidate),
        };
        let result = BattleResult::new(game_id, first, second, &outcome);

        let status = tracker.record(&result);
        if status.result != SprtResult::Continue && !stop.swap(true, Ordering::Relaxed) {
            info!(
                "Worker {worker_idx} reached {:?} after game {game_id}",
                status.result
            );
        }

        if result_channel
            .send(WorkerMessage::BattleResult(result))
            .is_err()
        {
            break;
        }
    }
}

/// Plays simulated games on a pool of worker threads until the SPRT reaches
/// a verdict or `max_games` have been played.
pub fn run_simulation(config: &TestConfig, settings: &SimulationSettings) -> SimulationSummary {
    let tracker = SharedTracker::new(MatchTracker::new(config));
    let next_game = Arc::new(AtomicU64::new(0));
    let stop = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel::<WorkerMessage>();

    let num_workers = settings.workers.max(1);
    eprintln!("Starting {} workers", num_workers);

    let mut handles = Vec::with_capacity(num_workers);
    for worker_idx in 0..num_workers {
        let tx = tx.clone();
        let config = config.clone();
        let settings = settings.clone();
        let next_game = Arc::clone(&next_game);
        let stop = Arc::clone(&stop);
        let tracker = tracker.clone();
        handles.push(std::thread::spawn(move || {
            battling_worker(
                worker_idx,
                &config,
                &settings,
                &next_game,
                &stop,
                &tracker,
                &tx,
            );
            let _ = tx.send(WorkerMessage::Done);
        }));
    }
    drop(tx);

    eprintln!("starting {}", timestamp_string());

    let mut results = Vec::<BattleResult>::new();
    let mut done_workers_count = 0;
    while done_workers_count < num_workers {
        match rx.recv_timeout(Duration::from_secs(60)) {
            Ok(WorkerMessage::BattleResult(result)) => {
                log::debug!("{}", result.get_pretty_description());
                results.push(result);
                if results.len() % 100 == 0 {
                    eprintln!(
                        "{} reported: {}/{} {}",
                        timestamp_string(),
                        results.len(),
                        settings.max_games,
                        tracker.snapshot().sprt()
                    );
                }
            }
            Ok(WorkerMessage::Done) => {
                done_workers_count += 1;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                eprintln!("still waiting on {} workers", num_workers - done_workers_count);
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    for handle in handles {
        if handle.join().is_err() {
            log::error!("A simulation worker panicked");
        }
    }

    results.sort_by_key(|r| r.game_id);
    SimulationSummary {
        tracker: tracker.snapshot(),
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use tourney_core::{ScoringStrategy, Slice};

    #[test]
    fn test_all_draws_without_decisive_rate() {
        let model = SimulatedMatch {
            elo_diff: 0.0,
            draw_rate: 1.0,
        };
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let outcome = model.play(&mut rng, Side::First);
            assert!(outcome.is_draw());
            let grade = outcome.grade().unwrap();
            assert!((1..=MAX_SIMULATED_MARGIN).contains(&grade.value()));
        }
    }

    #[test]
    fn test_strong_candidate_mostly_wins() {
        let model = SimulatedMatch {
            elo_diff: 800.0,
            draw_rate: 0.0,
        };
        let mut rng = StdRng::seed_from_u64(2);
        let wins = (0..500)
            .filter(|_| model.play(&mut rng, Side::Second).winner() == Some(Side::Second))
            .count();
        assert!(wins > 450, "{wins}");
    }

    #[test]
    fn test_run_simulation_records_every_result() {
        let config = TestConfig::default();
        let settings = SimulationSettings {
            max_games: 60,
            workers: 3,
            model: SimulatedMatch {
                elo_diff: 0.0,
                draw_rate: 0.4,
            },
        };
        let summary = run_simulation(&config, &settings);

        let games = summary.tracker.candidate().games_finished();
        assert!(games <= 60);
        assert_eq!(summary.results.len() as u32, games);
        assert_eq!(summary.tracker.baseline().games_finished(), games);
        assert_eq!(
            summary.tracker.candidate().games(Slice::First),
            summary.tracker.baseline().games(Slice::Second)
        );
        assert_eq!(
            summary
                .tracker
                .candidate()
                .wins(ScoringStrategy::Classical, Slice::All),
            summary
                .tracker
                .baseline()
                .losses(ScoringStrategy::Classical, Slice::All)
        );
    }
}
