use std::{
    io::{Read, Write},
    path::Path,
};

use chrono::Utc;
use csv::{Reader, Writer};
use serde::{Deserialize, Serialize};
use tourney_core::Outcome;

use crate::error::BattlerResult;

/// One finished game as stored in a results file. `first` played the first side.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BattleResult {
    pub game_id: u64,
    pub first: String,
    pub second: String,
    /// Verbose outcome text, e.g. "-G3.5 {Drawn game}"
    pub result: String,
    pub finished_at: String,
}

impl BattleResult {
    pub fn new(game_id: u64, first: &str, second: &str, outcome: &Outcome) -> Self {
        Self {
            game_id,
            first: first.to_owned(),
            second: second.to_owned(),
            result: outcome.to_verbose_text(),
            finished_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::from_text(&self.result)
    }

    pub fn get_pretty_description(&self) -> String {
        let outcome = self.outcome();
        format!(
            "#{} {} vs {}: {} ({})",
            self.game_id,
            self.first,
            self.second,
            outcome.to_short_text(),
            outcome.describe()
        )
    }
}

pub fn write_results<W: Write>(results: &[BattleResult], writer: W) -> BattlerResult<()> {
    let mut wtr = Writer::from_writer(writer);
    for result in results {
        wtr.serialize(result)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_results_to_csv(results: &[BattleResult], path: &Path) -> BattlerResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut wtr = Writer::from_path(path)?;
    for result in results {
        wtr.serialize(result)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_results<R: Read>(reader: R) -> BattlerResult<Vec<BattleResult>> {
    let mut rdr = Reader::from_reader(reader);
    let mut results = Vec::new();
    for record in rdr.deserialize() {
        results.push(record?);
    }
    Ok(results)
}

pub fn read_results_from_csv(path: &Path) -> BattlerResult<Vec<BattleResult>> {
    let file = std::fs::File::open(path)?;
    read_results(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourney_core::{Grade, OutcomeKind, Side};

    #[test]
    fn test_csv_round_trip() {
        let results = vec![
            BattleResult::new(
                1,
                "new",
                "old",
                &Outcome::from_grade(Grade::new(7, Side::Second).unwrap(), ""),
            ),
            BattleResult::new(
                2,
                "old",
                "new",
                &Outcome::new(OutcomeKind::Timeout, Some(Side::First), "flag fell, 3s"),
            ),
        ];

        let mut buffer = Vec::new();
        write_results(&results, &mut buffer).unwrap();
        let parsed = read_results(buffer.as_slice()).unwrap();
        assert_eq!(parsed, results);

        assert_eq!(parsed[0].outcome().grade(), Grade::new(7, Side::Second));
        assert_eq!(parsed[1].outcome().winner(), Some(Side::First));
        assert_eq!(
            parsed[1].outcome().description(),
            "Second loses on time: flag fell, 3s"
        );
    }

    #[test]
    fn test_pretty_description() {
        let mut result = BattleResult::new(
            3,
            "a",
            "b",
            &Outcome::new(OutcomeKind::Win, Some(Side::Second), ""),
        );
        result.finished_at = String::new();
        assert_eq!(
            result.get_pretty_description(),
            "#3 a vs b: -G0.0 (Second wins)"
        );
    }
}
