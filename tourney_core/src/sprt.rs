use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SprtResult {
    /// Not enough data to make a conclusion
    Continue,
    /// H0 (null hypothesis) is accepted - no improvement detected
    AcceptH0,
    /// H1 (alternative hypothesis) is accepted - improvement detected
    AcceptH1,
}

/// Snapshot of the test: the verdict, the log-likelihood ratio and the
/// decision bounds it is compared against.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprtStatus {
    pub result: SprtResult,
    pub llr: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl SprtStatus {
    const fn insufficient_data() -> Self {
        SprtStatus {
            result: SprtResult::Continue,
            llr: 0.0,
            lower_bound: 0.0,
            upper_bound: 0.0,
        }
    }
}

/// Win/loss/draw probabilities.
#[derive(Debug, Copy, Clone, PartialEq)]
struct SprtProbability {
    p_win: f64,
    p_loss: f64,
    p_draw: f64,
}

impl SprtProbability {
    fn from_counts(wins: f64, losses: f64, draws: f64) -> Self {
        let count = wins + losses + draws;
        SprtProbability {
            p_win: wins / count,
            p_loss: losses / count,
            p_draw: draws / count,
        }
    }

    fn from_bayes_elo(b: &BayesElo) -> Self {
        let p_win = 1.0 / (1.0 + 10.0_f64.powf((b.draw_elo - b.bayes_elo) / 400.0));
        let p_loss = 1.0 / (1.0 + 10.0_f64.powf((b.draw_elo + b.bayes_elo) / 400.0));
        SprtProbability {
            p_win,
            p_loss,
            p_draw: 1.0 - p_win - p_loss,
        }
    }

    fn is_valid(&self) -> bool {
        0.0 < self.p_win
            && self.p_win < 1.0
            && 0.0 < self.p_loss
            && self.p_loss < 1.0
            && (0.0..=1.0).contains(&self.p_draw)
    }
}

/// Strength difference and draw tendency of the BayesElo model.
#[derive(Debug, Copy, Clone, PartialEq)]
struct BayesElo {
    bayes_elo: f64,
    draw_elo: f64,
}

impl BayesElo {
    fn new(bayes_elo: f64, draw_elo: f64) -> Self {
        BayesElo {
            bayes_elo,
            draw_elo,
        }
    }

    /// Panics on degenerate probabilities: the log-odds are undefined there and
    /// callers are expected to have checked for enough wins and losses.
    fn from_probability(p: &SprtProbability) -> Self {
        assert!(p.is_valid(), "Invalid probability triple for BayesElo: {p:?}");

        BayesElo {
            bayes_elo: 200.0
                * (p.p_win / p.p_loss * (1.0 - p.p_loss) / (1.0 - p.p_win)).log10(),
            draw_elo: 200.0
                * ((1.0 - p.p_loss) / p.p_loss * (1.0 - p.p_win) / p.p_win).log10(),
        }
    }

    /// Converts a logistic Elo difference into BayesElo at this draw Elo.
    fn scale(&self) -> f64 {
        let x = 10.0_f64.powf(-self.draw_elo / 400.0);
        4.0 * x / ((1.0 + x) * (1.0 + x))
    }
}

/// Performs Sequential Probability Ratio Test (SPRT) for comparing two actors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SprtCalculator {
    // Game results, fractional so that non binary scores can be fed in
    wins: f64,
    losses: f64,
    draws: f64,

    // SPRT parameters
    elo0: f64,  // H0: Elo difference is elo0 or less
    elo1: f64,  // H1: Elo difference is elo1 or more
    alpha: f64, // Type I error (false positive) probability
    beta: f64,  // Type II error (false negative) probability
}

impl SprtCalculator {
    /// Creates a new SPRT calculator with specified parameters
    pub fn new(elo0: f64, elo1: f64, alpha: f64, beta: f64) -> Self {
        let mut sprt = Self::default();
        sprt.initialize(elo0, elo1, alpha, beta);
        sprt
    }

    /// Creates a new SPRT calculator with default parameters
    pub fn default_test() -> Self {
        // Common default values for Elo testing
        Self::new(0.0, 10.0, 0.05, 0.05)
    }

    pub fn initialize(&mut self, elo0: f64, elo1: f64, alpha: f64, beta: f64) {
        self.elo0 = elo0;
        self.elo1 = elo1;
        self.alpha = alpha;
        self.beta = beta;
    }

    /// True until the hypotheses have been set
    pub fn is_null(&self) -> bool {
        self.elo0 == 0.0 && self.elo1 == 0.0 && self.alpha == 0.0 && self.beta == 0.0
    }

    pub fn elo0(&self) -> f64 {
        self.elo0
    }

    pub fn elo1(&self) -> f64 {
        self.elo1
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Adds a win for the first player
    pub fn add_win(&mut self) {
        self.wins += 1.0;
    }

    /// Adds a loss for the first player (win for second player)
    pub fn add_loss(&mut self) {
        self.losses += 1.0;
    }

    /// Adds a draw
    pub fn add_draw(&mut self) {
        self.draws += 1.0;
    }

    /// Updates results from the first player's points for one game, in [0, 1].
    /// Points between the ternary values are split between the two nearest
    /// of win, draw and loss.
    pub fn add_result(&mut self, points: f64) {
        if points >= 0.5 {
            self.wins += (points - 0.5) / 0.5;
            self.draws += (1.0 - points) / 0.5;
        } else {
            self.losses += (0.5 - points) / 0.5;
            self.draws += points / 0.5;
        }
    }

    pub fn wins(&self) -> f64 {
        self.wins
    }

    pub fn losses(&self) -> f64 {
        self.losses
    }

    pub fn draws(&self) -> f64 {
        self.draws
    }

    /// Gets total number of games
    pub fn total_games(&self) -> f64 {
        self.wins + self.losses + self.draws
    }

    /// Runs the SPRT test and returns the current status
    pub fn status(&self) -> SprtStatus {
        if self.wins < 1.0 || self.losses < 1.0 || self.draws < 0.0 {
            return SprtStatus::insufficient_data();
        }

        // Estimate draw_elo out of sample
        let p = SprtProbability::from_counts(self.wins, self.losses, self.draws);
        let b = BayesElo::from_probability(&p);

        // Probability laws under H0 and H1
        let s = b.scale();
        let p0 = SprtProbability::from_bayes_elo(&BayesElo::new(self.elo0 / s, b.draw_elo));
        let p1 = SprtProbability::from_bayes_elo(&BayesElo::new(self.elo1 / s, b.draw_elo));

        let mut llr = self.wins * (p1.p_win / p0.p_win).ln()
            + self.losses * (p1.p_loss / p0.p_loss).ln();
        if self.draws > 0.0 {
            llr += self.draws * (p1.p_draw / p0.p_draw).ln();
        }

        // Decision boundaries
        let lower_bound = (self.beta / (1.0 - self.alpha)).ln();
        let upper_bound = ((1.0 - self.beta) / self.alpha).ln();

        let result = if llr > upper_bound {
            SprtResult::AcceptH1 // Improvement detected
        } else if llr < lower_bound {
            SprtResult::AcceptH0 // No improvement detected
        } else {
            SprtResult::Continue // Need more data
        };

        SprtStatus {
            result,
            llr,
            lower_bound,
            upper_bound,
        }
    }

    /// Gets current statistics as a string
    pub fn stats_string(&self) -> String {
        format!(
            "W: {:.1}, L: {:.1}, D: {:.1}, Total: {:.1}",
            self.wins,
            self.losses,
            self.draws,
            self.total_games()
        )
    }
}

impl fmt::Display for SprtCalculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.total_games();
        if total == 0.0 {
            return write!(f, "No games recorded");
        }

        let status = self.status();
        write!(
            f,
            "Games: {:.1} ({}), LLR: {:.2} ({:.2}, {:.2}), Status: {:?}",
            total,
            self.stats_string(),
            status.llr,
            status.lower_bound,
            status.upper_bound,
            status.result
        )
    }
}
