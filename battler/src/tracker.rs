use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, warn};
use tourney_core::{
    Outcome, PlayerAccumulator, Scorer, ScoringStrategy, Side, SprtCalculator, SprtStatus,
    scoring::Decision,
};

use crate::{config::TestConfig, records::BattleResult};

/// Statistics of a candidate against a baseline: one accumulator per player
/// and one SPRT from the candidate's point of view.
#[derive(Clone, Debug)]
pub struct MatchTracker {
    scorer: Scorer,
    candidate: PlayerAccumulator,
    baseline: PlayerAccumulator,
    sprt: SprtCalculator,
    skipped: u32,
}

impl MatchTracker {
    pub fn new(config: &TestConfig) -> Self {
        Self {
            scorer: config.scorer(),
            candidate: PlayerAccumulator::new(config.candidate.clone()),
            baseline: PlayerAccumulator::new(config.baseline.clone()),
            sprt: config.sprt(),
            skipped: 0,
        }
    }

    /// Records a stored game. Games that don't involve the candidate, or that
    /// never finished, are skipped.
    pub fn record(&mut self, result: &BattleResult) -> bool {
        let candidate = self.candidate.name();
        let candidate_side = if result.first == candidate {
            Side::First
        } else if result.second == candidate {
            Side::Second
        } else {
            warn!(
                "Skipping game {}: {} vs {} doesn't involve {}",
                result.game_id, result.first, result.second, candidate
            );
            self.skipped += 1;
            return false;
        };

        self.record_outcome(candidate_side, &result.outcome())
    }

    pub fn record_outcome(&mut self, candidate_side: Side, outcome: &Outcome) -> bool {
        let Some(grade) = outcome.scoring_grade() else {
            warn!("Skipping unfinished game: {}", outcome.describe());
            self.skipped += 1;
            return false;
        };

        self.candidate.update(candidate_side, grade, &self.scorer);
        self.baseline.update(!candidate_side, grade, &self.scorer);

        let owner_decision = self.scorer.decision(ScoringStrategy::Classical, grade);
        let candidate_decision = if grade.owner() == candidate_side {
            owner_decision
        } else {
            owner_decision.flip()
        };
        match candidate_decision {
            Decision::Win => self.sprt.add_win(),
            Decision::Loss => self.sprt.add_loss(),
            Decision::Undecided => self.sprt.add_draw(),
        }

        debug!(
            "{} as {}: {} is a {:?}",
            self.candidate.name(),
            candidate_side,
            grade,
            candidate_decision
        );
        true
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn candidate(&self) -> &PlayerAccumulator {
        &self.candidate
    }

    pub fn baseline(&self) -> &PlayerAccumulator {
        &self.baseline
    }

    pub fn sprt(&self) -> &SprtCalculator {
        &self.sprt
    }

    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    pub fn status(&self) -> SprtStatus {
        self.sprt.status()
    }
}

/// A tracker shared between worker threads. Every write and every snapshot
/// happens under one lock.
#[derive(Clone, Debug)]
pub struct SharedTracker {
    inner: Arc<Mutex<MatchTracker>>,
}

impl SharedTracker {
    pub fn new(tracker: MatchTracker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MatchTracker> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Records a game and returns the test status right after it.
    pub fn record(&self, result: &BattleResult) -> SprtStatus {
        let mut tracker = self.lock();
        tracker.record(result);
        tracker.status()
    }

    pub fn snapshot(&self) -> MatchTracker {
        self.lock().clone()
    }
}
