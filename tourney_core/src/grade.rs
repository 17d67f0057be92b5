use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::side::Side;

/// Least decisive grade. Grade 0 is an outright win for the owning side.
pub const MAX_GRADE: u16 = 437;
pub const GRADE_SLOTS: usize = MAX_GRADE as usize + 1;
/// Achieved grades fill the low half, grades conceded to the opponent are
/// mirrored into the high half.
pub const HISTOGRAM_SLOTS: usize = 2 * MAX_GRADE as usize + 2;
pub const MAX_KOMI: u16 = 2 * MAX_GRADE;

pub const DEFAULT_CUTOFF: u16 = 12;
pub const DEFAULT_KOMI: Komi = Komi {
    value: 23,
    owner: Side::First,
};
pub const INITIAL_RESULT: Grade = Grade {
    value: 436,
    owner: Side::First,
};

/// Margin of a finished contest on the half-point scale, credited to `owner`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Grade {
    value: u16,
    owner: Side,
}

impl Grade {
    pub const fn new(value: u16, owner: Side) -> Option<Self> {
        if value > MAX_GRADE {
            None
        } else {
            Some(Grade { value, owner })
        }
    }

    /// An outright win for `owner`.
    pub const fn decisive(owner: Side) -> Self {
        Grade { value: 0, owner }
    }

    pub const fn value(&self) -> u16 {
        self.value
    }

    pub const fn owner(&self) -> Side {
        self.owner
    }

    pub const fn index(&self) -> usize {
        self.value as usize
    }

    pub fn try_parse(s: &str) -> Option<Self> {
        Self::from_graded(GradedText::split(s, Numerals::Lenient)?)
    }

    /// Like `try_parse`, but only digits may follow the prefix, so words that
    /// happen to start with "g" are rejected.
    pub fn try_parse_strict(s: &str) -> Option<Self> {
        Self::from_graded(GradedText::split(s, Numerals::Strict)?)
    }

    fn from_graded(text: GradedText) -> Option<Self> {
        let value = text.whole.checked_mul(2)? + text.fraction_digit / 5;
        let value = u16::try_from(value).ok()?;
        Grade::new(value, text.owner)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}.{}",
            owner_prefix(self.owner),
            self.value / 2,
            (self.value % 2) * 5
        )
    }
}

impl TryFrom<String> for Grade {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Grade::try_parse(&value).ok_or_else(|| format!("Invalid grade: {value}"))
    }
}

impl From<Grade> for String {
    fn from(grade: Grade) -> Self {
        grade.to_string()
    }
}

/// Handicap compared against a capped grade by the komi strategy. Quarter
/// point granular, so the stored value is four times the displayed one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Komi {
    value: u16,
    owner: Side,
}

impl Komi {
    pub const fn new(value: u16, owner: Side) -> Option<Self> {
        if value > MAX_KOMI {
            None
        } else {
            Some(Komi { value, owner })
        }
    }

    pub const fn value(&self) -> u16 {
        self.value
    }

    pub const fn owner(&self) -> Side {
        self.owner
    }

    pub fn try_parse(s: &str) -> Option<Self> {
        let text = GradedText::split(s, Numerals::Lenient)?;
        let quarters = match text.fraction_digit {
            2 => 1,
            5 => 2,
            7 => 3,
            _ => 0,
        };
        let value = text.whole.checked_mul(4)? + quarters;
        let value = u16::try_from(value).ok()?;
        Komi::new(value, text.owner)
    }
}

impl Default for Komi {
    fn default() -> Self {
        DEFAULT_KOMI
    }
}

impl fmt::Display for Komi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fraction = match self.value % 4 {
            0 => "0",
            1 => "25",
            2 => "5",
            _ => "75",
        };
        write!(f, "{}{}.{}", owner_prefix(self.owner), self.value / 4, fraction)
    }
}

impl TryFrom<String> for Komi {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Komi::try_parse(&value).ok_or_else(|| format!("Invalid komi: {value}"))
    }
}

impl From<Komi> for String {
    fn from(komi: Komi) -> Self {
        komi.to_string()
    }
}

fn owner_prefix(owner: Side) -> &'static str {
    match owner {
        Side::First => "G",
        Side::Second => "-G",
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Numerals {
    Lenient,
    Strict,
}

/// Shared lexical layer of the grade and komi text forms:
/// `G<whole>[.<fraction>]`, `-G<whole>...` or `mG<whole>...`.
struct GradedText {
    owner: Side,
    whole: i64,
    fraction_digit: i64,
}

impl GradedText {
    fn split(s: &str, numerals: Numerals) -> Option<Self> {
        let mut parts = s.split('.');
        let head = parts.next().unwrap_or_default();
        let fraction = parts.next();

        let (owner, numeral) = if (head.starts_with('G') || head.starts_with('g')) && head.len() >= 2
        {
            (Side::First, &head[1..])
        } else if ["-G", "-g", "mG", "mg"].iter().any(|p| head.starts_with(p)) && head.len() >= 3 {
            (Side::Second, &head[2..])
        } else {
            return None;
        };

        if numerals == Numerals::Strict {
            let all_digits = |t: &str| t.chars().all(|c| c.is_ascii_digit());
            if numeral.is_empty()
                || !all_digits(numeral)
                || parts.next().is_some()
                || !fraction.is_none_or(all_digits)
            {
                return None;
            }
        }

        let whole = match numerals {
            Numerals::Lenient => lenient_int(numeral),
            Numerals::Strict => numeral.parse().ok()?,
        };
        if whole < 0 {
            return None;
        }

        let fraction_digit = fraction
            .and_then(|fraction| fraction.chars().next())
            .and_then(|c| c.to_digit(10))
            .map_or(0, i64::from);

        Some(GradedText {
            owner,
            whole,
            fraction_digit,
        })
    }
}

/// Unreadable numerals count as zero, so "Gx" is an outright first side win.
fn lenient_int(s: &str) -> i64 {
    s.trim().parse().unwrap_or(0)
}

pub fn parse_grade(s: &str) -> Grade {
    Grade::try_parse(s).unwrap_or_else(|| {
        warn!("Could not parse grade {s:?}; defaulting to {INITIAL_RESULT}");
        INITIAL_RESULT
    })
}

pub fn parse_komi(s: &str) -> Komi {
    Komi::try_parse(s).unwrap_or_else(|| {
        warn!("Could not parse komi {s:?}; defaulting to {DEFAULT_KOMI}");
        DEFAULT_KOMI
    })
}

pub fn parse_cutoff(s: &str) -> u16 {
    parse_grade(s).value()
}

pub fn format_grade(grade: Grade) -> String {
    grade.to_string()
}

pub fn format_komi(komi: Komi) -> String {
    komi.to_string()
}

/// Label of a grade value as seen from the first side.
pub fn format_grade_value(value: u16) -> String {
    format!("G{}.{}", value / 2, (value % 2) * 5)
}
