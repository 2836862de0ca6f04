pub mod engine;
pub mod mapper;
pub mod reconcile;
pub mod transfer;

pub use crate::domain::model::{
    CompanyRecord, Directory, ReconciliationResult, SourceClient, TransferReport, TransferState,
};
pub use crate::domain::ports::{
    BatchUpsertClient, ClientSource, CrmConnector, DirectorySource, TokenExchanger,
};
pub use crate::utils::error::Result;
