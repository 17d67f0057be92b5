use std::ops::Not;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// The two seats of a contest. The first side moves first.
#[repr(u8)]
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    PartialOrd,
    Ord,
    Default,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    First,
    Second,
}

impl Side {
    pub const fn opposite(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    pub const fn is_first(self) -> bool {
        matches!(self, Side::First)
    }
}

impl Not for Side {
    type Output = Side;

    fn not(self) -> Self {
        self.opposite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_negation() {
        let side = Side::First;
        assert_eq!(!side, Side::Second);
        assert_eq!(!!side, Side::First);
        assert_eq!(Side::default(), Side::First);
    }

    #[test]
    fn test_missing_side_stays_missing() {
        let winner: Option<Side> = None;
        assert_eq!(winner.map(Side::opposite), None);
        assert_eq!(Some(Side::Second).map(Side::opposite), Some(Side::First));
    }

    #[test]
    fn test_side_names() {
        assert_eq!(Side::First.to_string(), "First");
        assert_eq!("second".parse::<Side>().unwrap(), Side::Second);
        assert_eq!(serde_json::to_string(&Side::First).unwrap(), "\"first\"");
    }
}
