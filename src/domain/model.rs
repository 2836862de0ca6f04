use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 會計系統的客戶地址
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceAddress {
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "zip-code")]
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

/// 會計系統的客戶記錄，未知欄位在反序列化時直接略過
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceClient {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<SourceAddress>,
}

impl SourceClient {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// CRM 公司欄位。缺少的欄位不會被序列化
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owneremail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<CrmId>,
    pub properties: CompanyProperties,
}

impl CompanyRecord {
    pub fn name(&self) -> Option<&str> {
        self.properties.name.as_deref()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCrmId {
    Text(String),
    Number(i64),
}

impl From<RawCrmId> for CrmId {
    fn from(raw: RawCrmId) -> Self {
        match raw {
            RawCrmId::Text(s) => CrmId(s),
            RawCrmId::Number(n) => CrmId(n.to_string()),
        }
    }
}

/// CRM 端的不透明識別碼，數字 id 一律轉為字串
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawCrmId", into = "String")]
pub struct CrmId(String);

impl CrmId {
    pub fn new(id: impl Into<String>) -> Self {
        CrmId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<CrmId> for String {
    fn from(id: CrmId) -> Self {
        id.0
    }
}

impl From<String> for CrmId {
    fn from(s: String) -> Self {
        CrmId(s)
    }
}

impl From<&str> for CrmId {
    fn from(s: &str) -> Self {
        CrmId(s.to_string())
    }
}

impl From<i64> for CrmId {
    fn from(n: i64) -> Self {
        CrmId(n.to_string())
    }
}

impl fmt::Display for CrmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 取得時點的 CRM 公司快照：名稱 -> id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    entries: HashMap<String, CrmId>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, id: impl Into<CrmId>) {
        self.entries.insert(name.into(), id.into());
    }

    pub fn get(&self, name: &str) -> Option<&CrmId> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, I: Into<CrmId>> FromIterator<(N, I)> for Directory {
    fn from_iter<T: IntoIterator<Item = (N, I)>>(iter: T) -> Self {
        let mut directory = Directory::new();
        for (name, id) in iter {
            directory.insert(name, id);
        }
        directory
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationResult {
    pub new_companies: Vec<CompanyRecord>,
    pub existing_companies: Vec<CompanyRecord>,
}

impl ReconciliationResult {
    pub fn total(&self) -> usize {
        self.new_companies.len() + self.existing_companies.len()
    }
}

/// 使用者手動指定的網域：公司名稱 -> domain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainOverrides {
    entries: HashMap<String, String>,
}

impl DomainOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, domain: impl Into<String>) {
        self.entries.insert(name.into(), domain.into());
    }

    /// 空白值視為未指定
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(name)
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 解析 `NAME=DOMAIN`，以最後一個 `=` 分隔
    pub fn parse_entry(entry: &str) -> Option<(String, String)> {
        let (name, domain) = entry.rsplit_once('=')?;
        if name.is_empty() {
            return None;
        }
        Some((name.to_string(), domain.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferState {
    #[default]
    Idle,
    Mapping,
    Reconciling,
    Upserting,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    pub mapped: usize,
    pub created: usize,
    pub updated: usize,
    pub state: TransferState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountingCredentials {
    pub company_id: String,
    pub api_key: String,
}

/// OAuth token 交換結果
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenGrant {
    AuthorizationCode(String),
    RefreshToken(String),
}
