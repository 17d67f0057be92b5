use chrono::Utc;

pub mod config;
pub mod error;
pub mod records;
pub mod report;
pub mod simulate;
pub mod tracker;

pub const RESULTS_DIRECTORY: &str = "tmp";

pub fn timestamp_string() -> String {
    Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string()
}
