use crate::domain::model::{
    AccountingCredentials, CompanyRecord, Directory, SourceClient, TokenGrant, TokenSet,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 會計系統客戶來源，分頁由實作自行處理
#[async_trait]
pub trait ClientSource: Send + Sync {
    async fn fetch_clients(&self, credentials: &AccountingCredentials) -> Result<Vec<SourceClient>>;
}

#[async_trait]
pub trait DirectorySource: Send + Sync {
    async fn fetch_directory(&self) -> Result<Directory>;
}

/// CRM 批次寫入。兩個呼叫彼此獨立，沒有交易語意
#[async_trait]
pub trait BatchUpsertClient: Send + Sync {
    async fn batch_create(&self, records: &[CompanyRecord]) -> Result<()>;
    async fn batch_update(&self, records: &[CompanyRecord]) -> Result<()>;
}

/// 以 access token 建立已授權的 CRM client
pub trait CrmConnector: Send + Sync {
    type Client: DirectorySource + BatchUpsertClient;

    fn connect(&self, access_token: &str) -> Self::Client;
}

#[async_trait]
pub trait TokenExchanger: Send + Sync {
    async fn exchange(&self, grant: TokenGrant) -> Result<TokenSet>;
}
