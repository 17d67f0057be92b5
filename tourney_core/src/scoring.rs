use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::grade::{DEFAULT_CUTOFF, DEFAULT_KOMI, GRADE_SLOTS, Grade, Komi};

/// Policies turning a graded outcome into points.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    /// Only outright wins and losses count, everything else is a draw.
    Classical,
    Exponential,
    Harmonic,
    /// Grades better than the cutoff count as wins.
    #[strum(
        to_string = "RMobility Winner",
        serialize = "winner_take_all",
        serialize = "all_or_none"
    )]
    WinnerTakeAll,
    /// Capped grades are compared against a komi.
    Komi,
}

impl ScoringStrategy {
    /// Strategies that score with a continuous table rather than win/loss counts.
    pub const fn is_decaying(self) -> bool {
        matches!(self, ScoringStrategy::Exponential | ScoringStrategy::Harmonic)
    }
}

/// Points credited to a grade's owner, indexed by grade value.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoringTable {
    values: [f64; GRADE_SLOTS],
}

static EXPONENTIAL_TABLE: LazyLock<ScoringTable> = LazyLock::new(|| {
    let mut values = [0.0; GRADE_SLOTS];
    let mut add_on = 0.5;
    for v in values.iter_mut() {
        *v = 0.5 + add_on;
        add_on *= 0.5;
    }
    ScoringTable { values }
});

static HARMONIC_TABLE: LazyLock<ScoringTable> = LazyLock::new(|| {
    let mut values = [0.0; GRADE_SLOTS];
    for (i, v) in values.iter_mut().enumerate() {
        *v = 0.5 + 0.5 / (1.0 + i as f64);
    }
    ScoringTable { values }
});

impl ScoringTable {
    /// 0.5 + 0.5^(i+1)
    pub fn exponential() -> &'static ScoringTable {
        &EXPONENTIAL_TABLE
    }

    /// 0.5 + 0.5/(1+i)
    pub fn harmonic() -> &'static ScoringTable {
        &HARMONIC_TABLE
    }

    pub fn for_strategy(strategy: ScoringStrategy) -> Option<&'static ScoringTable> {
        match strategy {
            ScoringStrategy::Exponential => Some(Self::exponential()),
            ScoringStrategy::Harmonic => Some(Self::harmonic()),
            _ => None,
        }
    }

    pub fn value(&self, grade: Grade) -> f64 {
        self.values[grade.index()]
    }

    pub fn values(&self) -> &[f64; GRADE_SLOTS] {
        &self.values
    }
}

/// Binary verdict of a strategy, from the grade owner's point of view.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Decision {
    Win,
    Loss,
    Undecided,
}

impl Decision {
    pub const fn flip(self) -> Decision {
        match self {
            Decision::Win => Decision::Loss,
            Decision::Loss => Decision::Win,
            Decision::Undecided => Decision::Undecided,
        }
    }

    pub const fn points(self) -> f64 {
        match self {
            Decision::Win => 1.0,
            Decision::Loss => 0.0,
            Decision::Undecided => 0.5,
        }
    }
}

/// Per-test scoring parameters shared by every accumulator of a match.
#[derive(Clone, Copy, Debug)]
pub struct Scorer {
    pub cutoff: u16,
    pub komi: Komi,
    pub exponential: &'static ScoringTable,
    pub harmonic: &'static ScoringTable,
}

impl Default for Scorer {
    fn default() -> Self {
        Scorer::new(DEFAULT_CUTOFF, DEFAULT_KOMI)
    }
}

impl Scorer {
    pub fn new(cutoff: u16, komi: Komi) -> Self {
        Scorer {
            cutoff,
            komi,
            exponential: ScoringTable::exponential(),
            harmonic: ScoringTable::harmonic(),
        }
    }

    pub fn decision(&self, strategy: ScoringStrategy, grade: Grade) -> Decision {
        match strategy {
            ScoringStrategy::Classical => {
                if grade.value() == 0 {
                    Decision::Win
                } else {
                    Decision::Undecided
                }
            }
            ScoringStrategy::Exponential
            | ScoringStrategy::Harmonic
            | ScoringStrategy::WinnerTakeAll => {
                if grade.value() < self.cutoff {
                    Decision::Win
                } else {
                    Decision::Undecided
                }
            }
            ScoringStrategy::Komi => self.komi_decision(grade),
        }
    }

    /// The grade is capped at the cutoff and compared against the komi when
    /// both favour the same side. Otherwise the komi only matters relative
    /// to the cutoff itself.
    pub fn komi_decision(&self, grade: Grade) -> Decision {
        let cutoff = u32::from(self.cutoff);
        let komi = u32::from(self.komi.value());
        let beats_cutoff = u32::from(grade.value()) < cutoff;

        if grade.owner() == self.komi.owner() {
            let capped = 2 * u32::from(grade.value()).min(cutoff);
            if capped < komi {
                Decision::Win
            } else if capped > komi {
                Decision::Loss
            } else {
                Decision::Undecided
            }
        } else if komi < 2 * cutoff || beats_cutoff {
            Decision::Win
        } else if komi == 2 * cutoff {
            Decision::Undecided
        } else {
            Decision::Loss
        }
    }

    /// Points in [0, 1] credited to the grade's owner.
    pub fn score(&self, strategy: ScoringStrategy, grade: Grade) -> f64 {
        match strategy {
            ScoringStrategy::Exponential => self.exponential.value(grade),
            ScoringStrategy::Harmonic => self.harmonic.value(grade),
            _ => self.decision(strategy, grade).points(),
        }
    }
}
