pub mod accumulator;
pub mod elo;
pub mod grade;
pub mod outcome;
pub mod scoring;
pub mod side;
pub mod sprt;

pub use accumulator::{PlayerAccumulator, Slice, StrategyStats};
pub use grade::{
    DEFAULT_CUTOFF, DEFAULT_KOMI, Grade, INITIAL_RESULT, Komi, parse_cutoff, parse_grade,
    parse_komi,
};
pub use outcome::{Outcome, OutcomeKind};
pub use scoring::{Scorer, ScoringStrategy, ScoringTable};
pub use side::Side;
pub use sprt::{SprtCalculator, SprtResult, SprtStatus};
