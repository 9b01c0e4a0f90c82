use async_trait::async_trait;
use interfaces_supabase_rest::index::{insert_rows, SupabaseRestResult};
use reqwest::Client;
use tracing::warn;

use super::{InsertPredictionError, InsertedRecord, NewPrediction, RecordStore};

pub struct SupabaseStore {
    client: Client,
    project_url: String,
    key: String,
    table: String,
}

impl SupabaseStore {
    pub fn new(client: Client, project_url: &str, key: &str, table: &str) -> Self {
        Self {
            client,
            project_url: project_url.to_string(),
            key: key.to_string(),
            table: table.to_string(),
        }
    }
}

#[async_trait]
impl RecordStore for SupabaseStore {
    async fn insert(&self, record: &NewPrediction) -> Result<InsertedRecord, InsertPredictionError> {
        let result = insert_rows(
            &self.client,
            &self.project_url,
            &self.key,
            &self.table,
            std::slice::from_ref(record),
        )
        .await?;

        inserted_from_result(record, result)
    }
}

/// A non-empty echoed array means the row was written.
fn inserted_from_result(
    submitted: &NewPrediction,
    result: SupabaseRestResult,
) -> Result<InsertedRecord, InsertPredictionError> {
    let Some(row) = result.rows().into_iter().next() else {
        return Err(InsertPredictionError::Rejected {
            status: result.status.as_u16(),
            body: result.body,
        });
    };

    match serde_json::from_value::<NewPrediction>(row) {
        Ok(stored) => Ok(stored.into()),
        Err(err) => {
            warn!(error = %err, "Stored row did not match the submitted shape; echoing submission");
            Ok(submitted.clone().into())
        }
    }
}
