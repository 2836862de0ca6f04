pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::Cli;
pub use config::AppConfig;

pub use core::{
    engine::{TokenStatus, TransferEngine},
    mapper::{map_client, map_clients},
    reconcile::reconcile,
    transfer::TransferPipeline,
};
pub use utils::error::{Result, TransferError, UpsertPhase};
