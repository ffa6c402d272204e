//! `SQLite` implementation of [`ProvisionedRepository`].

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use powerscout_app::ports::ProvisionedRepository;
use powerscout_domain::discovery::DedupKey;
use powerscout_domain::error::PowerScoutError;
use powerscout_domain::id::{AreaId, DeviceId, EntityId, RecordId};
use powerscout_domain::provisioned::{
    EnergySensorSettings, IntegrationMethod, ProvisionedRecord, RecordOrigin,
};

use crate::error::StorageError;

struct Wrapper(ProvisionedRecord);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<ProvisionedRecord> {
        value.map(|w| w.0)
    }
}

fn decode<E>(err: E) -> sqlx::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    sqlx::Error::Decode(err.into())
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let dedup_key: String = row.try_get("dedup_key")?;
        let title: String = row.try_get("title")?;
        let display_name: String = row.try_get("display_name")?;
        let power_entity_ids_json: String = row.try_get("power_entity_ids")?;
        let device_id: Option<String> = row.try_get("device_id")?;
        let area_id: Option<String> = row.try_get("area_id")?;
        let manufacturer: Option<String> = row.try_get("manufacturer")?;
        let model: Option<String> = row.try_get("model")?;
        let origin: String = row.try_get("origin")?;
        let integration_method: String = row.try_get("integration_method")?;
        let round_digits: i64 = row.try_get("round_digits")?;
        let unit_prefix: String = row.try_get("unit_prefix")?;
        let max_sub_interval_minutes: i64 = row.try_get("max_sub_interval_minutes")?;
        let created_at: String = row.try_get("created_at")?;

        let id = RecordId::from_str(&id).map_err(decode)?;
        let power_entity_ids: Vec<EntityId> =
            serde_json::from_str(&power_entity_ids_json).map_err(decode)?;
        let origin = RecordOrigin::from_str(&origin).map_err(decode)?;
        let settings = EnergySensorSettings {
            integration_method: IntegrationMethod::from_str(&integration_method)
                .map_err(decode)?,
            round_digits: u8::try_from(round_digits).map_err(decode)?,
            unit_prefix,
            max_sub_interval_minutes: u32::try_from(max_sub_interval_minutes).map_err(decode)?,
        };
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.to_utc())
            .map_err(decode)?;

        Ok(Self(ProvisionedRecord {
            id,
            dedup_key: DedupKey::from_stored(dedup_key),
            title,
            display_name,
            power_entity_ids,
            device_id: device_id.map(DeviceId::new),
            area_id: area_id.map(AreaId::new),
            manufacturer,
            model,
            origin,
            settings,
            created_at,
        }))
    }
}

const INSERT: &str = "INSERT INTO provisioned_records \
    (id, dedup_key, title, display_name, power_entity_ids, device_id, area_id, manufacturer, \
    model, origin, integration_method, round_digits, unit_prefix, max_sub_interval_minutes, \
    created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM provisioned_records WHERE id = ?";
const SELECT_BY_DEDUP_KEY: &str = "SELECT * FROM provisioned_records WHERE dedup_key = ?";
const SELECT_ALL: &str = "SELECT * FROM provisioned_records ORDER BY created_at, rowid";
const DELETE_BY_ID: &str = "DELETE FROM provisioned_records WHERE id = ?";

/// `SQLite`-backed provisioned record repository.
///
/// The `dedup_key` column is unique, so two concurrent inserts for the same
/// group end with one [`PowerScoutError::Rejected`].
pub struct SqliteProvisionedRepository {
    pool: SqlitePool,
}

impl SqliteProvisionedRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ProvisionedRepository for SqliteProvisionedRepository {
    fn create(
        &self,
        record: ProvisionedRecord,
    ) -> impl Future<Output = Result<ProvisionedRecord, PowerScoutError>> + Send {
        let pool = self.pool.clone();
        async move {
            let power_entity_ids =
                serde_json::to_string(&record.power_entity_ids).map_err(StorageError::from)?;

            sqlx::query(INSERT)
                .bind(record.id.to_string())
                .bind(record.dedup_key.as_str())
                .bind(&record.title)
                .bind(&record.display_name)
                .bind(power_entity_ids)
                .bind(record.device_id.as_ref().map(DeviceId::as_str))
                .bind(record.area_id.as_ref().map(AreaId::as_str))
                .bind(&record.manufacturer)
                .bind(&record.model)
                .bind(record.origin.as_str())
                .bind(record.settings.integration_method.as_str())
                .bind(i64::from(record.settings.round_digits))
                .bind(&record.settings.unit_prefix)
                .bind(i64::from(record.settings.max_sub_interval_minutes))
                .bind(record.created_at.to_rfc3339())
                .execute(&pool)
                .await
                .map_err(|err| StorageError::on_insert(err, &record.dedup_key))?;

            Ok(record)
        }
    }

    fn get_by_id(
        &self,
        id: RecordId,
    ) -> impl Future<Output = Result<Option<ProvisionedRecord>, PowerScoutError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn get_all(
        &self,
    ) -> impl Future<Output = Result<Vec<ProvisionedRecord>, PowerScoutError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn find_by_dedup_key(
        &self,
        key: &DedupKey,
    ) -> impl Future<Output = Result<Option<ProvisionedRecord>, PowerScoutError>> + Send {
        let pool = self.pool.clone();
        let key = key.as_str().to_string();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_DEDUP_KEY)
                .bind(key)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn delete(&self, id: RecordId) -> impl Future<Output = Result<(), PowerScoutError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(DELETE_BY_ID)
                .bind(id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use powerscout_domain::discovery::Plan;

    async fn setup() -> SqliteProvisionedRepository {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteProvisionedRepository::new(db.pool().clone())
    }

    fn test_record(device: &str) -> ProvisionedRecord {
        let device_id = DeviceId::new(device);
        ProvisionedRecord::from_plan(Plan {
            dedup_key: DedupKey::for_device(&device_id),
            target_device_id: Some(device_id),
            area_id: Some(AreaId::new("office")),
            power_entity_ids: vec![
                "sensor.outlet_1_power".parse().unwrap(),
                "sensor.outlet_2_power".parse().unwrap(),
            ],
            display_name: "PDU Pro".to_string(),
            manufacturer: Some("Ubiquiti".to_string()),
            model: None,
        })
    }

    #[tokio::test]
    async fn should_create_and_retrieve_record() {
        let repo = setup().await;
        let record = test_record("pdu");
        let id = record.id;

        repo.create(record.clone()).await.unwrap();

        let fetched = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched.dedup_key, record.dedup_key);
        assert_eq!(fetched.power_entity_ids, record.power_entity_ids);
        assert_eq!(fetched.settings, record.settings);
        assert_eq!(fetched.area_id, Some(AreaId::new("office")));
        assert_eq!(fetched.origin, RecordOrigin::Discovery);
        assert_eq!(fetched.created_at.timestamp(), record.created_at.timestamp());
    }

    #[tokio::test]
    async fn should_return_none_when_record_not_found() {
        let repo = setup().await;
        let result = repo.get_by_id(RecordId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn should_reject_duplicate_dedup_key() {
        let repo = setup().await;
        repo.create(test_record("pdu")).await.unwrap();

        let result = repo.create(test_record("pdu")).await;

        assert!(matches!(result, Err(PowerScoutError::Rejected(_))));
        assert_eq!(repo.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_find_record_by_dedup_key() {
        let repo = setup().await;
        repo.create(test_record("pdu")).await.unwrap();
        repo.create(test_record("plug")).await.unwrap();

        let found = repo
            .find_by_dedup_key(&DedupKey::from_stored("powerscout_device_plug"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.device_id, Some(DeviceId::new("plug")));

        let missing = repo
            .find_by_dedup_key(&DedupKey::from_stored("powerscout_device_other"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn should_list_records_in_creation_order() {
        let repo = setup().await;
        repo.create(test_record("first")).await.unwrap();
        repo.create(test_record("second")).await.unwrap();

        let all = repo.get_all().await.unwrap();

        let devices: Vec<_> = all.iter().filter_map(|r| r.device_id.clone()).collect();
        assert_eq!(devices, vec![DeviceId::new("first"), DeviceId::new("second")]);
    }

    #[tokio::test]
    async fn should_delete_record() {
        let repo = setup().await;
        let record = test_record("pdu");
        let id = record.id;
        repo.create(record).await.unwrap();

        repo.delete(id).await.unwrap();

        assert!(repo.get_by_id(id).await.unwrap().is_none());
        assert!(
            repo.find_by_dedup_key(&DedupKey::for_device(&DeviceId::new("pdu")))
                .await
                .unwrap()
                .is_none()
        );
    }
}
