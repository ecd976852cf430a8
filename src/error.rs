use thiserror::Error;

#[derive(Debug, Error)]
pub enum BattleError {
    #[error("creature id {id} is not in the roster")]
    UnknownId { id: u32 },

    #[error("no creature named {name:?} in the roster")]
    UnknownName { name: String },

    #[error("creature id {id} appears more than once in the roster")]
    DuplicateId { id: u32 },

    #[error("match row {row} has no recorded winner")]
    MissingWinner { row: usize },

    #[error("invalid custom creature: {0}")]
    InvalidCustom(String),

    #[error("scoring request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("scoring service returned http {status}: {body}")]
    Service { status: u16, body: String },

    #[error("unreadable scoring response: {0}")]
    MalformedResponse(String),

    #[error("scoring config: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl BattleError {
    /// True for errors caused by bad reference data or a bad request, as
    /// opposed to the scoring service or the filesystem.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownId { .. }
                | Self::UnknownName { .. }
                | Self::DuplicateId { .. }
                | Self::MissingWinner { .. }
                | Self::InvalidCustom(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BattleError>;
