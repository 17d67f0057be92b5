use std::fmt::Write;

use colored::Colorize;
use serde_json::{Map, Value, json};
use strum::IntoEnumIterator;
use tourney_core::{
    PlayerAccumulator, ScoringStrategy, Slice, SprtResult, SprtStatus,
    elo::EloEstimate,
    grade::{GRADE_SLOTS, HISTOGRAM_SLOTS, format_grade_value},
};

use crate::tracker::MatchTracker;

fn format_elo(estimate: Option<EloEstimate>) -> String {
    match estimate {
        Some(EloEstimate {
            elo,
            margin: Some(margin),
            ..
        }) => format!("{elo:+.1} +/- {margin:.1}"),
        Some(EloEstimate { elo, margin: None, .. }) => format!("{elo:+.1} +/- inf"),
        None => "-".to_owned(),
    }
}

fn verdict_string(status: &SprtStatus) -> String {
    match status.result {
        SprtResult::Continue => "continue".yellow().to_string(),
        SprtResult::AcceptH0 => "H0 accepted".red().bold().to_string(),
        SprtResult::AcceptH1 => "H1 accepted".green().bold().to_string(),
    }
}

/// One row per scoring strategy for the given slice of a player's games.
pub fn strategy_table(player: &PlayerAccumulator, slice: Slice) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<18} {:>6} {:>6} {:>6} {:>6} {:>9} {:>7}  {}",
        "Strategy", "Games", "W", "L", "D", "Points", "Score", "Elo"
    );
    for strategy in ScoringStrategy::iter() {
        let stats = player.stats(strategy, slice);
        let score = stats
            .score_fraction()
            .map_or("-".to_owned(), |s| format!("{:.1}%", 100.0 * s));
        let _ = writeln!(
            out,
            "{:<18} {:>6} {:>6} {:>6} {:>6} {:>9.2} {:>7}  {}",
            strategy.to_string(),
            stats.games,
            stats.wins,
            stats.losses,
            stats.draws,
            stats.points,
            score,
            format_elo(EloEstimate::from_stats(&stats))
        );
    }
    out
}

/// Non-empty histogram slots. Conceded grades are labelled from the
/// opponent's point of view.
pub fn histogram_lines(player: &PlayerAccumulator, slice: Slice) -> Vec<String> {
    (0..HISTOGRAM_SLOTS)
        .filter_map(|index| {
            let count = player.objectives(index, slice);
            if count == 0 {
                return None;
            }
            let label = if index < GRADE_SLOTS {
                format!("achieved {}", format_grade_value(index as u16))
            } else {
                let value = (HISTOGRAM_SLOTS - 1 - index) as u16;
                format!("conceded {}", format_grade_value(value))
            };
            Some(format!("{label:<18} {count}"))
        })
        .collect()
}

pub fn format_report(tracker: &MatchTracker, with_histogram: bool) -> String {
    let candidate = tracker.candidate();
    let baseline = tracker.baseline();
    let scorer = tracker.scorer();
    let sprt = tracker.sprt();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} vs {} (cutoff {}, komi {})",
        candidate.name().bold(),
        baseline.name().bold(),
        format_grade_value(scorer.cutoff),
        scorer.komi
    );
    if tracker.skipped() > 0 {
        let _ = writeln!(out, "{} games skipped", tracker.skipped());
    }

    for (label, slice) in [
        ("All games", Slice::All),
        ("As first", Slice::First),
        ("As second", Slice::Second),
    ] {
        let _ = writeln!(out, "\n{} ({})", label.underline(), candidate.games(slice));
        out += &strategy_table(candidate, slice);
    }

    if with_histogram {
        let _ = writeln!(out, "\n{}", "Grades".underline());
        for line in histogram_lines(candidate, Slice::All) {
            let _ = writeln!(out, "{line}");
        }
    }

    let status = sprt.status();
    let _ = writeln!(
        out,
        "\nSPRT: elo0 {:.1}, elo1 {:.1}, alpha {:.3}, beta {:.3}",
        sprt.elo0(),
        sprt.elo1(),
        sprt.alpha(),
        sprt.beta()
    );
    let _ = writeln!(
        out,
        "{}, LLR {:.3} ({:.3}, {:.3}): {}",
        sprt.stats_string(),
        status.llr,
        status.lower_bound,
        status.upper_bound,
        verdict_string(&status)
    );
    out
}

pub fn print_report(tracker: &MatchTracker, with_histogram: bool) {
    println!("{}", format_report(tracker, with_histogram));
}

/// Machine readable version of the report, all games only.
pub fn summary_json(tracker: &MatchTracker) -> Value {
    let player_json = |player: &PlayerAccumulator| {
        let strategies: Map<String, Value> = ScoringStrategy::iter()
            .filter_map(|strategy| match json!(strategy) {
                Value::String(key) => Some((key, json!(player.stats(strategy, Slice::All)))),
                _ => None,
            })
            .collect();
        json!({
            "name": player.name(),
            "games": player.games(Slice::All),
            "strategies": strategies,
        })
    };

    json!({
        "candidate": player_json(tracker.candidate()),
        "baseline": player_json(tracker.baseline()),
        "skipped": tracker.skipped(),
        "sprt": tracker.status(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TestConfig;
    use tourney_core::{Grade, Outcome, Side};

    fn tracker_with_games() -> MatchTracker {
        let mut tracker = MatchTracker::new(&TestConfig::default());
        let games = [
            (Side::First, Grade::new(0, Side::First)),
            (Side::Second, Grade::new(0, Side::First)),
            (Side::First, Grade::new(9, Side::First)),
        ];
        for (side, grade) in games {
            tracker.record_outcome(side, &Outcome::from_grade(grade.unwrap(), ""));
        }
        tracker
    }

    #[test]
    fn test_strategy_table_lists_every_strategy() {
        let tracker = tracker_with_games();
        let table = strategy_table(tracker.candidate(), Slice::All);
        assert_eq!(table.lines().count(), 1 + ScoringStrategy::iter().count());
        assert!(table.contains("RMobility Winner"));
        assert!(table.contains("Komi"));
    }

    #[test]
    fn test_histogram_lines() {
        let tracker = tracker_with_games();
        let lines = histogram_lines(tracker.candidate(), Slice::All);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("achieved G0.0"));
        assert!(lines[1].starts_with("achieved G4.5"));
        assert!(lines[2].starts_with("conceded G0.0"));
    }

    #[test]
    fn test_report_mentions_sprt() {
        let tracker = tracker_with_games();
        let report = format_report(&tracker, true);
        assert!(report.contains("cutoff G6.0, komi G5.75"));
        assert!(report.contains("SPRT: elo0 0.0, elo1 10.0"));
        assert!(report.contains(", LLR "));
    }

    #[test]
    fn test_summary_json() {
        let tracker = tracker_with_games();
        let summary = summary_json(&tracker);
        assert_eq!(summary["candidate"]["name"], "candidate");
        assert_eq!(summary["candidate"]["games"], 3);
        assert_eq!(summary["baseline"]["strategies"]["classical"]["losses"], 1);
        assert_eq!(summary["sprt"]["result"], "Continue");
    }
}
