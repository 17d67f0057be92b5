use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{
    grade::{Grade, INITIAL_RESULT},
    side::Side,
};

/// How a contest ended.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Win by any means.
    Win,
    /// Draw by any means.
    Draw,
    /// Loser resigns.
    Resignation,
    /// A player's time flag falls.
    Timeout,
    /// Adjudication by the runner.
    Adjudication,
    /// Loser tries to make an illegal move.
    IllegalMove,
    /// Loser disconnects, or its process terminates.
    Disconnection,
    /// Loser's connection stalls (doesn't respond to ping).
    StalledConnection,
    /// Both players agree to a result.
    Agreement,
    /// No result. The contest may continue.
    NoResult,
    /// Caused by an invalid result string.
    ResultError,
}

/// The result of one finished contest. Never mutated after construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Outcome {
    kind: OutcomeKind,
    winner: Option<Side>,
    grade: Option<Grade>,
    description: String,
}

impl Default for Outcome {
    fn default() -> Self {
        Outcome::new(OutcomeKind::NoResult, None, "")
    }
}

impl PartialEq for Outcome {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.winner == other.winner
            && self.description == other.description
    }
}

impl Eq for Outcome {}

impl Outcome {
    /// Winner-only result. A winning side is credited with an outright grade.
    pub fn new(kind: OutcomeKind, winner: Option<Side>, description: impl Into<String>) -> Self {
        Outcome {
            kind,
            winner,
            grade: winner.map(Grade::decisive),
            description: description.into(),
        }
    }

    pub fn with_grade(
        kind: OutcomeKind,
        winner: Option<Side>,
        grade: Grade,
        description: impl Into<String>,
    ) -> Self {
        Outcome {
            kind,
            winner,
            grade: Some(grade),
            description: description.into(),
        }
    }

    /// Grade 0 is a win for the grade's owner, anything else is a draw.
    pub fn from_grade(grade: Grade, description: impl Into<String>) -> Self {
        let (kind, winner) = if grade.value() == 0 {
            (OutcomeKind::Win, Some(grade.owner()))
        } else {
            (OutcomeKind::Draw, None)
        };

        Outcome {
            kind,
            winner,
            grade: Some(grade),
            description: description.into(),
        }
    }

    /// Reads `1-0`, `0-1`, `1/2-1/2`, `*` or a graded short form such as
    /// `-G3.5`, optionally followed by a `{description}` block.
    pub fn from_text(s: &str) -> Self {
        let description = braced_description(s).unwrap_or_default();

        if s.starts_with("1-0") {
            Outcome::new(OutcomeKind::Win, Some(Side::First), description)
        } else if s.starts_with("0-1") {
            Outcome::new(OutcomeKind::Win, Some(Side::Second), description)
        } else if s.starts_with("1/2-1/2") {
            Outcome::new(OutcomeKind::Draw, None, description)
        } else if s.starts_with('*') {
            Outcome::new(OutcomeKind::NoResult, None, description)
        } else {
            let head = s.split_whitespace().next().unwrap_or_default();
            match Grade::try_parse_strict(head) {
                Some(grade) => Outcome::from_grade(grade, description),
                None => Outcome::new(OutcomeKind::ResultError, None, description),
            }
        }
    }

    pub fn is_none(&self) -> bool {
        self.kind == OutcomeKind::NoResult
    }

    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
            && self.kind != OutcomeKind::NoResult
            && self.kind != OutcomeKind::ResultError
    }

    fn is_unfinished(&self) -> bool {
        matches!(self.kind, OutcomeKind::NoResult | OutcomeKind::ResultError)
    }

    pub fn kind(&self) -> OutcomeKind {
        self.kind
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn loser(&self) -> Option<Side> {
        self.winner.map(Side::opposite)
    }

    pub fn grade(&self) -> Option<Grade> {
        self.grade
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The grade an accumulator should be fed with. Ungraded draws count as
    /// the least decisive default grade.
    pub fn scoring_grade(&self) -> Option<Grade> {
        if self.is_unfinished() {
            return None;
        }
        self.grade
            .or_else(|| self.is_draw().then_some(INITIAL_RESULT))
    }

    /// Human readable sentence, e.g. "Second loses on time: flag fell".
    pub fn describe(&self) -> String {
        let w = side_name(self.winner());
        let l = side_name(self.loser());

        let mut s = match self.kind {
            OutcomeKind::Resignation => format!("{l} resigns"),
            OutcomeKind::Timeout if l.is_empty() => "Draw by timeout".to_owned(),
            OutcomeKind::Timeout => format!("{l} loses on time"),
            OutcomeKind::Adjudication if w.is_empty() => "Draw by adjudication".to_owned(),
            OutcomeKind::Adjudication => format!("{w} wins by adjudication"),
            OutcomeKind::IllegalMove => format!("{l} makes an illegal move"),
            OutcomeKind::Disconnection if l.is_empty() => "Draw by disconnection".to_owned(),
            OutcomeKind::Disconnection => format!("{l} disconnects"),
            OutcomeKind::StalledConnection if l.is_empty() => {
                "Draw by stalled connection".to_owned()
            }
            OutcomeKind::StalledConnection => format!("{l}'s connection stalls"),
            OutcomeKind::Agreement if w.is_empty() => "Draw by agreement".to_owned(),
            OutcomeKind::Agreement => format!("{w} wins by agreement"),
            OutcomeKind::NoResult => "No result".to_owned(),
            OutcomeKind::ResultError => "Result error".to_owned(),
            OutcomeKind::Win | OutcomeKind::Draw => String::new(),
        };

        if self.description.is_empty() {
            match self.kind {
                OutcomeKind::Win => s = format!("{w} wins"),
                OutcomeKind::Draw => s = "Drawn game".to_owned(),
                _ => {}
            }
        } else {
            if !s.is_empty() {
                s += ": ";
            }
            s += &self.description;
        }

        sentence_case(s.trim_start())
    }

    /// "1-0", "0-1", "1/2-1/2" or "*".
    pub fn to_legacy_text(&self) -> String {
        if self.is_unfinished() {
            return "*".to_owned();
        }

        match (self.kind, self.winner) {
            (OutcomeKind::Win, Some(Side::First)) => "1-0".to_owned(),
            (OutcomeKind::Win, Some(Side::Second)) => "0-1".to_owned(),
            _ => "1/2-1/2".to_owned(),
        }
    }

    /// The graded form, e.g. "G3.5" or "-G0.0", or "*" if there is none.
    pub fn to_short_text(&self) -> String {
        if self.is_unfinished() {
            return "*".to_owned();
        }

        match self.grade {
            Some(grade) => grade.to_string(),
            None => "*".to_owned(),
        }
    }

    /// Uses the format "result {description}", e.g. "G0.0 {First wins}".
    pub fn to_verbose_text(&self) -> String {
        format!("{} {{{}}}", self.to_short_text(), self.describe())
    }
}

fn side_name(side: Option<Side>) -> &'static str {
    side.map_or("", |s| s.into())
}

fn braced_description(s: &str) -> Option<String> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    if end <= start {
        return Some(String::new());
    }
    Some(s[start + 1..end].to_owned())
}

fn sentence_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_text() {
        let win = Outcome::from_text("1-0");
        assert_eq!(win.kind(), OutcomeKind::Win);
        assert_eq!(win.winner(), Some(Side::First));
        assert_eq!(win.to_legacy_text(), "1-0");
        assert_eq!(win.to_short_text(), "G0.0");

        let loss = Outcome::from_text("0-1 {First resigns}");
        assert_eq!(loss.winner(), Some(Side::Second));
        assert_eq!(loss.description(), "First resigns");
        assert_eq!(loss.to_legacy_text(), "0-1");
        assert_eq!(loss.to_short_text(), "-G0.0");

        let draw = Outcome::from_text("1/2-1/2");
        assert!(draw.is_draw());
        assert_eq!(draw.to_legacy_text(), "1/2-1/2");
        assert_eq!(draw.to_short_text(), "*");
    }

    #[test]
    fn test_no_result_text() {
        let none = Outcome::from_text("*");
        assert_eq!(none.kind(), OutcomeKind::NoResult);
        assert!(none.is_none());
        assert!(!none.is_draw());
        assert_eq!(none.to_legacy_text(), "*");
        assert_eq!(none.to_short_text(), "*");
        assert_eq!(none.scoring_grade(), None);
    }

    #[test]
    fn test_unparsable_text_is_result_error() {
        let error = Outcome::from_text("2-0 {what}");
        assert_eq!(error.kind(), OutcomeKind::ResultError);
        assert!(!error.is_draw());
        assert_eq!(error.to_legacy_text(), "*");
        assert_eq!(error.describe(), "Result error: what");
    }

    #[test]
    fn test_words_are_not_graded_results() {
        for text in ["game abandoned {engine crashed}", "-garbage", "Gx", "g", "mGood"] {
            let outcome = Outcome::from_text(text);
            assert_eq!(outcome.kind(), OutcomeKind::ResultError, "{text}");
            assert_eq!(outcome.winner(), None);
            assert_eq!(outcome.scoring_grade(), None);
        }
        assert_eq!(
            Outcome::from_text("game abandoned {engine crashed}").describe(),
            "Result error: engine crashed"
        );
        assert_eq!(
            Outcome::from_text("-G0.0 {Second wins}").winner(),
            Some(Side::Second)
        );
    }

    #[test]
    fn test_from_grade() {
        let g = Grade::new(0, Side::Second).unwrap();
        let win = Outcome::from_grade(g, "");
        assert_eq!(win.kind(), OutcomeKind::Win);
        assert_eq!(win.winner(), Some(Side::Second));
        assert_eq!(win.to_legacy_text(), "0-1");

        let g = Grade::new(7, Side::Second).unwrap();
        let draw = Outcome::from_grade(g, "");
        assert_eq!(draw.kind(), OutcomeKind::Draw);
        assert!(draw.is_draw());
        assert_eq!(draw.to_short_text(), "-G3.5");
        assert_eq!(draw.to_legacy_text(), "1/2-1/2");
        assert_eq!(draw.scoring_grade(), Some(g));
    }

    #[test]
    fn test_verbose_text_round_trip() {
        let g = Grade::new(11, Side::First).unwrap();
        let outcome = Outcome::from_grade(g, "adjudicated by margin");
        let text = outcome.to_verbose_text();
        assert_eq!(text, "G5.5 {Adjudicated by margin}");

        let parsed = Outcome::from_text(&text);
        assert_eq!(parsed.grade(), Some(g));
        assert_eq!(parsed.kind(), OutcomeKind::Draw);
    }

    #[test]
    fn test_describe() {
        let cases = [
            (OutcomeKind::Resignation, Some(Side::First), "", "Second resigns"),
            (OutcomeKind::Timeout, Some(Side::Second), "", "First loses on time"),
            (OutcomeKind::Timeout, None, "", "Draw by timeout"),
            (OutcomeKind::Adjudication, None, "", "Draw by adjudication"),
            (OutcomeKind::Adjudication, Some(Side::First), "", "First wins by adjudication"),
            (OutcomeKind::IllegalMove, Some(Side::First), "", "Second makes an illegal move"),
            (OutcomeKind::Disconnection, Some(Side::Second), "", "First disconnects"),
            (OutcomeKind::Disconnection, None, "", "Draw by disconnection"),
            (OutcomeKind::StalledConnection, Some(Side::First), "", "Second's connection stalls"),
            (OutcomeKind::StalledConnection, None, "", "Draw by stalled connection"),
            (OutcomeKind::Agreement, Some(Side::Second), "", "Second wins by agreement"),
            (OutcomeKind::Agreement, None, "", "Draw by agreement"),
            (OutcomeKind::NoResult, None, "", "No result"),
            (OutcomeKind::ResultError, None, "", "Result error"),
            (OutcomeKind::Win, Some(Side::First), "", "First wins"),
            (OutcomeKind::Draw, None, "", "Drawn game"),
            (OutcomeKind::Win, Some(Side::First), "mate in 3", "Mate in 3"),
            (OutcomeKind::Timeout, Some(Side::First), "flag", "Second loses on time: flag"),
        ];

        for (kind, winner, description, expected) in cases {
            let outcome = Outcome::new(kind, winner, description);
            assert_eq!(outcome.describe(), expected, "{kind:?} {winner:?}");
        }
    }

    #[test]
    fn test_equality_ignores_grade() {
        let a = Outcome::from_grade(Grade::new(4, Side::First).unwrap(), "");
        let b = Outcome::from_grade(Grade::new(9, Side::Second).unwrap(), "");
        assert_eq!(a, b);
        assert_ne!(a, Outcome::from_text("1/2-1/2 {agreed}"));
    }

    #[test]
    fn test_ungraded_draw_scores_as_initial_result() {
        let draw = Outcome::new(OutcomeKind::Agreement, None, "");
        assert_eq!(draw.scoring_grade(), Some(INITIAL_RESULT));
        let win = Outcome::new(OutcomeKind::Timeout, Some(Side::Second), "");
        assert_eq!(win.scoring_grade(), Some(Grade::decisive(Side::Second)));
    }
}
