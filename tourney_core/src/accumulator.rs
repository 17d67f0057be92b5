use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
    grade::{Grade, HISTOGRAM_SLOTS},
    scoring::{Decision, Scorer, ScoringStrategy},
    side::Side,
};

/// Which of a player's games a query looks at.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Slice {
    #[default]
    All,
    /// Games played as the first side.
    First,
    /// Games played as the second side.
    Second,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
struct WinLoss {
    wins: u32,
    losses: u32,
}

impl WinLoss {
    fn record(&mut self, decision: Decision) {
        match decision {
            Decision::Win => self.wins += 1,
            Decision::Loss => self.losses += 1,
            Decision::Undecided => {}
        }
    }
}

impl Add for WinLoss {
    type Output = WinLoss;

    fn add(self, rhs: Self) -> Self::Output {
        WinLoss {
            wins: self.wins + rhs.wins,
            losses: self.losses + rhs.losses,
        }
    }
}

impl Sub for WinLoss {
    type Output = WinLoss;

    fn sub(self, rhs: Self) -> Self::Output {
        WinLoss {
            wins: self.wins - rhs.wins,
            losses: self.losses - rhs.losses,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug, Default)]
struct PointSums {
    points: f64,
    square_points: f64,
}

impl PointSums {
    fn record(&mut self, points: f64) {
        self.points += points;
        self.square_points += points * points;
    }
}

impl Add for PointSums {
    type Output = PointSums;

    fn add(self, rhs: Self) -> Self::Output {
        PointSums {
            points: self.points + rhs.points,
            square_points: self.square_points + rhs.square_points,
        }
    }
}

impl Sub for PointSums {
    type Output = PointSums;

    fn sub(self, rhs: Self) -> Self::Output {
        PointSums {
            points: self.points - rhs.points,
            square_points: self.square_points - rhs.square_points,
        }
    }
}

/// A running total over every game, plus the same total restricted to the
/// games played as the first side. Second side values are the difference.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
struct Sliced<T> {
    all: T,
    first: T,
}

impl<T: Copy + Add<Output = T> + Sub<Output = T>> Sliced<T> {
    fn update(&mut self, as_first: bool, f: impl Fn(&mut T)) {
        f(&mut self.all);
        if as_first {
            f(&mut self.first);
        }
    }

    fn get(&self, slice: Slice) -> T {
        match slice {
            Slice::All => self.all,
            Slice::First => self.first,
            Slice::Second => self.all - self.first,
        }
    }

    fn merge(&mut self, other: &Self) {
        self.all = self.all + other.all;
        self.first = self.first + other.first;
    }
}

/// Counts of achieved grades. Slot `g` counts grades `g` achieved by the
/// player, slot `HISTOGRAM_SLOTS - 1 - g` counts grades `g` conceded.
#[derive(Clone, PartialEq, Eq, Debug)]
struct Histogram {
    all: Box<[u32; HISTOGRAM_SLOTS]>,
    first: Box<[u32; HISTOGRAM_SLOTS]>,
}

impl Default for Histogram {
    fn default() -> Self {
        Histogram {
            all: Box::new([0; HISTOGRAM_SLOTS]),
            first: Box::new([0; HISTOGRAM_SLOTS]),
        }
    }
}

/// A consistent view of one strategy's totals.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct StrategyStats {
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub points: f64,
    pub square_points: f64,
}

impl StrategyStats {
    pub fn score_fraction(&self) -> Option<f64> {
        if self.games == 0 {
            None
        } else {
            Some(self.points / self.games as f64)
        }
    }
}

/// Running statistics of one player over a test, for every scoring strategy
/// at once. Owned by a single writer.
#[derive(Clone, Debug, Default)]
pub struct PlayerAccumulator {
    name: String,
    games: Sliced<u32>,
    classical: Sliced<WinLoss>,
    winner_take_all: Sliced<WinLoss>,
    komi: Sliced<WinLoss>,
    exponential: Sliced<PointSums>,
    harmonic: Sliced<PointSums>,
    objectives: Histogram,
}

impl PlayerAccumulator {
    pub fn new(name: impl Into<String>) -> Self {
        PlayerAccumulator {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Records one finished game played by this player as `side`.
    pub fn update(&mut self, side: Side, grade: Grade, scorer: &Scorer) {
        let as_first = side.is_first();
        let achieved = side == grade.owner();

        let orient = |decision: Decision| {
            if achieved {
                decision
            } else {
                decision.flip()
            }
        };
        let orient_points = |points: f64| if achieved { points } else { 1.0 - points };

        let slot = if achieved {
            grade.index()
        } else {
            HISTOGRAM_SLOTS - 1 - grade.index()
        };

        let classical = orient(scorer.decision(ScoringStrategy::Classical, grade));
        let winner_take_all = orient(scorer.decision(ScoringStrategy::WinnerTakeAll, grade));
        let komi = orient(scorer.komi_decision(grade));
        let exponential = orient_points(scorer.exponential.value(grade));
        let harmonic = orient_points(scorer.harmonic.value(grade));

        self.games.update(as_first, |g| *g += 1);
        self.classical.update(as_first, |c| c.record(classical));
        self.winner_take_all
            .update(as_first, |c| c.record(winner_take_all));
        self.komi.update(as_first, |c| c.record(komi));
        self.exponential.update(as_first, |p| p.record(exponential));
        self.harmonic.update(as_first, |p| p.record(harmonic));

        self.objectives.all[slot] += 1;
        if as_first {
            self.objectives.first[slot] += 1;
        }
    }

    /// Folds in the games of another accumulator fed with the same scorer.
    pub fn merge(&mut self, other: &PlayerAccumulator) {
        self.games.merge(&other.games);
        self.classical.merge(&other.classical);
        self.winner_take_all.merge(&other.winner_take_all);
        self.komi.merge(&other.komi);
        self.exponential.merge(&other.exponential);
        self.harmonic.merge(&other.harmonic);
        for (a, b) in self.objectives.all.iter_mut().zip(other.objectives.all.iter()) {
            *a += b;
        }
        for (a, b) in self
            .objectives
            .first
            .iter_mut()
            .zip(other.objectives.first.iter())
        {
            *a += b;
        }
    }

    fn win_loss(&self, strategy: ScoringStrategy) -> &Sliced<WinLoss> {
        match strategy {
            ScoringStrategy::Classical => &self.classical,
            ScoringStrategy::Komi => &self.komi,
            ScoringStrategy::Exponential
            | ScoringStrategy::Harmonic
            | ScoringStrategy::WinnerTakeAll => &self.winner_take_all,
        }
    }

    fn point_sums(&self, strategy: ScoringStrategy) -> Option<&Sliced<PointSums>> {
        match strategy {
            ScoringStrategy::Exponential => Some(&self.exponential),
            ScoringStrategy::Harmonic => Some(&self.harmonic),
            _ => None,
        }
    }

    pub fn games(&self, slice: Slice) -> u32 {
        self.games.get(slice)
    }

    pub fn games_finished(&self) -> u32 {
        self.games(Slice::All)
    }

    pub fn wins(&self, strategy: ScoringStrategy, slice: Slice) -> u32 {
        self.win_loss(strategy).get(slice).wins
    }

    pub fn losses(&self, strategy: ScoringStrategy, slice: Slice) -> u32 {
        self.win_loss(strategy).get(slice).losses
    }

    /// Games that were neither won nor lost, including undecided komi games.
    pub fn draws(&self, strategy: ScoringStrategy, slice: Slice) -> u32 {
        let record = self.win_loss(strategy).get(slice);
        self.games(slice) - record.wins - record.losses
    }

    pub fn points(&self, strategy: ScoringStrategy, slice: Slice) -> f64 {
        match self.point_sums(strategy) {
            Some(sums) => sums.get(slice).points,
            None => {
                self.wins(strategy, slice) as f64 + 0.5 * self.draws(strategy, slice) as f64
            }
        }
    }

    /// Sum of squared per-game points. Binary strategies use the closed form
    /// for win = 1 and draw = 0.5.
    pub fn square_points(&self, strategy: ScoringStrategy, slice: Slice) -> f64 {
        match self.point_sums(strategy) {
            Some(sums) => sums.get(slice).square_points,
            None => {
                self.wins(strategy, slice) as f64 + 0.25 * self.draws(strategy, slice) as f64
            }
        }
    }

    pub fn stats(&self, strategy: ScoringStrategy, slice: Slice) -> StrategyStats {
        StrategyStats {
            games: self.games(slice),
            wins: self.wins(strategy, slice),
            losses: self.losses(strategy, slice),
            draws: self.draws(strategy, slice),
            points: self.points(strategy, slice),
            square_points: self.square_points(strategy, slice),
        }
    }

    /// Histogram count at `index`, see `HISTOGRAM_SLOTS`.
    pub fn objectives(&self, index: usize, slice: Slice) -> u32 {
        let all = self.objectives.all[index];
        let first = self.objectives.first[index];
        match slice {
            Slice::All => all,
            Slice::First => first,
            Slice::Second => all - first,
        }
    }
}
