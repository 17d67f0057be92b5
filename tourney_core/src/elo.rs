use serde::{Deserialize, Serialize};

use crate::accumulator::StrategyStats;

/// Two sided 95% quantile of the standard normal distribution.
const Z_95: f64 = 1.959_963_984_540_054;

/// Logistic Elo difference implied by a mean score, with a 95% margin.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct EloEstimate {
    pub elo: f64,
    /// Half width of the confidence interval, if both ends are finite
    pub margin: Option<f64>,
    pub score: f64,
}

pub fn score_to_elo(score: f64) -> f64 {
    -400.0 * (1.0 / score - 1.0).log10()
}

impl EloEstimate {
    /// Needs at least one game and a score strictly between 0 and 1.
    pub fn from_points(games: u32, points: f64, square_points: f64) -> Option<Self> {
        if games == 0 {
            return None;
        }

        let n = games as f64;
        let mean = points / n;
        if mean <= 0.0 || mean >= 1.0 {
            return None;
        }

        let variance = (square_points / n - mean * mean).max(0.0);
        let stdev = (variance / n).sqrt();
        let low = mean - Z_95 * stdev;
        let high = mean + Z_95 * stdev;
        let margin = (low > 0.0 && high < 1.0)
            .then(|| (score_to_elo(high) - score_to_elo(low)) / 2.0);

        Some(EloEstimate {
            elo: score_to_elo(mean),
            margin,
            score: mean,
        })
    }

    pub fn from_stats(stats: &StrategyStats) -> Option<Self> {
        Self::from_points(stats.games, stats.points, stats.square_points)
    }
}
