use thiserror::Error;

#[derive(Error, Debug)]
pub enum BattlerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type BattlerResult<T> = Result<T, BattlerError>;
