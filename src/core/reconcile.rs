use crate::domain::model::{CompanyRecord, Directory, ReconciliationResult};

/// 依名稱把記錄分成新公司與既有公司。
///
/// 比對為大小寫敏感的完全相等；判斷依據是目錄中是否存在該名稱，
/// 不看 id 的值，所以 `"0"` 也算既有公司。兩個分區都維持輸入順序。
pub fn reconcile<I>(records: I, directory: &Directory) -> ReconciliationResult
where
    I: IntoIterator<Item = CompanyRecord>,
{
    let mut result = ReconciliationResult::default();

    for record in records {
        let matched = record.name().and_then(|name| directory.get(name)).cloned();

        match matched {
            Some(id) => result.existing_companies.push(CompanyRecord {
                id: Some(id),
                ..record
            }),
            None => result.new_companies.push(record),
        }
    }

    tracing::debug!(
        "Reconciled {} records: {} new, {} existing",
        result.total(),
        result.new_companies.len(),
        result.existing_companies.len()
    );

    result
}
