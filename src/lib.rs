pub mod battle;
pub mod dataset;
pub mod error;
pub mod features;
pub mod http_client;
pub mod match_log;
pub mod roster;
pub mod scoring;
pub mod type_advantage;
pub mod win_rates;

pub use error::{BattleError, Result};
