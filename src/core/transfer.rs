use crate::core::mapper::map_clients;
use crate::core::reconcile::reconcile;
use crate::domain::model::{
    CompanyRecord, Directory, DomainOverrides, ReconciliationResult, SourceClient, TransferReport,
    TransferState,
};
use crate::domain::ports::BatchUpsertClient;
use crate::utils::error::{Result, TransferError, UpsertPhase};

/// 單次轉移：映射 -> 比對 -> 批次建立 -> 批次更新。
///
/// 不重試、不回滾：更新失敗時已建立的公司會保留。失敗後須以新的輸入重新執行。
pub struct TransferPipeline<U: BatchUpsertClient> {
    upsert: U,
    overrides: DomainOverrides,
    state: TransferState,
}

impl<U: BatchUpsertClient> TransferPipeline<U> {
    pub fn new(upsert: U) -> Self {
        Self {
            upsert,
            overrides: DomainOverrides::default(),
            state: TransferState::Idle,
        }
    }

    pub fn with_domain_overrides(mut self, overrides: DomainOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn upsert_client(&self) -> &U {
        &self.upsert
    }

    fn transition(&mut self, next: TransferState) {
        tracing::info!("🔀 Transfer state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn fail(&mut self, error: TransferError) -> TransferError {
        tracing::error!("❌ Transfer failed in {:?}: {}", self.state, error);
        self.transition(TransferState::Failed);
        error
    }

    /// 只做映射與比對，不寫入 CRM
    pub fn preview(
        &mut self,
        clients: &[SourceClient],
        directory: &Directory,
    ) -> Result<ReconciliationResult> {
        self.transition(TransferState::Mapping);
        let records = match map_clients(clients) {
            Ok(records) => records,
            Err(e) => return Err(self.fail(e)),
        };
        let records = self.apply_overrides(records);

        self.transition(TransferState::Reconciling);
        Ok(reconcile(records, directory))
    }

    pub async fn run(
        &mut self,
        clients: &[SourceClient],
        directory: &Directory,
    ) -> Result<TransferReport> {
        tracing::info!(
            "🚚 Transferring {} clients against {} known companies",
            clients.len(),
            directory.len()
        );

        let partition = self.preview(clients, directory)?;
        let mapped = partition.total();

        self.transition(TransferState::Upserting);
        let ReconciliationResult {
            new_companies,
            existing_companies,
        } = partition;

        let created = self.write(UpsertPhase::Create, &new_companies).await;
        if let Err(e) = created {
            return Err(self.fail(e));
        }
        tracing::info!("🆕 Created {} companies", new_companies.len());

        let updated = self.write(UpsertPhase::Update, &existing_companies).await;
        if let Err(e) = updated {
            return Err(self.fail(e));
        }
        tracing::info!("🔄 Updated {} companies", existing_companies.len());

        self.transition(TransferState::Done);
        Ok(TransferReport {
            mapped,
            created: new_companies.len(),
            updated: existing_companies.len(),
            state: self.state,
        })
    }

    async fn write(&self, phase: UpsertPhase, records: &[CompanyRecord]) -> Result<()> {
        let outcome = match phase {
            UpsertPhase::Create => self.upsert.batch_create(records).await,
            UpsertPhase::Update => self.upsert.batch_update(records).await,
        };

        outcome.map_err(|e| match e {
            TransferError::UpsertError { .. } => e,
            other => TransferError::UpsertError {
                phase,
                message: other.to_string(),
            },
        })
    }

    fn apply_overrides(&self, mut records: Vec<CompanyRecord>) -> Vec<CompanyRecord> {
        if self.overrides.is_empty() {
            return records;
        }

        for record in &mut records {
            let domain = record.name().and_then(|name| self.overrides.get(name));
            if let Some(domain) = domain {
                record.properties.domain = Some(domain.to_string());
            }
        }
        records
    }
}
