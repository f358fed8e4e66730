use crate::errors::{COUNTER_SETUP_HINT, ServiceError};
use crate::models::CounterRecord;
use crate::pocketbase::{ClientError, PocketBase};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::info;

pub const COLLECTION: &str = "counters";
pub const COUNTER_ID: &str = "main";

/// The shared dashboard counter, stored as a single PocketBase record.
///
/// Every read-modify-write runs under `record_id`, so overlapping requests
/// from different visitors are applied one after another.
pub struct CounterService {
    record_id: Mutex<String>,
}

impl Default for CounterService {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetches the counter record, creating it with value 0 when absent.
async fn get_or_create(client: &PocketBase, record_id: &mut String) -> Result<CounterRecord, ClientError> {
    let record = match client.get_one::<CounterRecord>(COLLECTION, record_id).await {
        Ok(record) => record,
        Err(err) if err.is_not_found() => {
            info!(id = COUNTER_ID, "creating counter record");
            client
                .create(COLLECTION, &json!({ "id": COUNTER_ID, "value": 0 }))
                .await?
        }
        Err(err) => return Err(err),
    };
    record_id.clone_from(&record.id);
    Ok(record)
}

impl CounterService {
    pub fn new() -> Self {
        Self {
            record_id: Mutex::new(COUNTER_ID.to_string()),
        }
    }

    pub async fn get_value(&self, client: &PocketBase) -> Result<i64, ServiceError> {
        let mut record_id = self.record_id.lock().await;
        let record = get_or_create(client, &mut record_id)
            .await
            .map_err(|err| ServiceError::from_client(err, "get counter value", COUNTER_SETUP_HINT))?;
        Ok(record.value)
    }

    pub async fn increment(&self, client: &PocketBase) -> Result<i64, ServiceError> {
        self.add(client, 1, "increment counter").await
    }

    pub async fn decrement(&self, client: &PocketBase) -> Result<i64, ServiceError> {
        self.add(client, -1, "decrement counter").await
    }

    async fn add(&self, client: &PocketBase, delta: i64, action: &'static str) -> Result<i64, ServiceError> {
        let mut record_id = self.record_id.lock().await;
        let result = async {
            let record = get_or_create(client, &mut record_id).await?;
            client
                .update::<CounterRecord, _>(COLLECTION, &record.id, &json!({ "value": record.value + delta }))
                .await
        }
        .await;
        drop(record_id);

        let updated = result.map_err(|err| ServiceError::from_client(err, action, COUNTER_SETUP_HINT))?;
        info!(value = updated.value, action, "counter updated");
        Ok(updated.value)
    }
}
