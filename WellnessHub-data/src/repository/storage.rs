use std::collections::BTreeMap;

use rusqlite::{named_params, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::wearable::{ProfileUpdateRecord, WearableProfileRecord};
use super::errors::RepositoryError;

const SELECT_PROFILE: &str =
    "SELECT user_id, last_event, last_updated, updated_at,
            steps, heart_rate, sleep_hours,
            blood_pressure_systolic, blood_pressure_diastolic,
            glucose, body_temperature, calories, stress_level,
            workout_duration, basal_body_temperature, body_mass_index
     FROM wearables WHERE user_id = ?1";

// A NULL in `excluded` means the update did not carry the field, so the
// stored value is kept. This is what lets blood pressure fall back to the
// previous reading without a separate read.
const UPSERT_PROFILE: &str =
    "INSERT INTO wearables
        (user_id, last_event, last_updated, updated_at,
         steps, heart_rate, sleep_hours,
         blood_pressure_systolic, blood_pressure_diastolic,
         glucose, body_temperature, calories, stress_level,
         workout_duration, basal_body_temperature, body_mass_index)
     VALUES
        (:user_id, :last_event, :last_updated, :updated_at,
         :steps, :heart_rate, :sleep_hours,
         :blood_pressure_systolic, :blood_pressure_diastolic,
         :glucose, :body_temperature, :calories, :stress_level,
         :workout_duration, :basal_body_temperature, :body_mass_index)
     ON CONFLICT(user_id) DO UPDATE SET
        last_event = excluded.last_event,
        last_updated = excluded.last_updated,
        updated_at = excluded.updated_at,
        steps = COALESCE(excluded.steps, wearables.steps),
        heart_rate = COALESCE(excluded.heart_rate, wearables.heart_rate),
        sleep_hours = COALESCE(excluded.sleep_hours, wearables.sleep_hours),
        blood_pressure_systolic = COALESCE(excluded.blood_pressure_systolic, wearables.blood_pressure_systolic),
        blood_pressure_diastolic = COALESCE(excluded.blood_pressure_diastolic, wearables.blood_pressure_diastolic),
        glucose = COALESCE(excluded.glucose, wearables.glucose),
        body_temperature = COALESCE(excluded.body_temperature, wearables.body_temperature),
        calories = COALESCE(excluded.calories, wearables.calories),
        stress_level = COALESCE(excluded.stress_level, wearables.stress_level),
        workout_duration = COALESCE(excluded.workout_duration, wearables.workout_duration),
        basal_body_temperature = COALESCE(excluded.basal_body_temperature, wearables.basal_body_temperature),
        body_mass_index = COALESCE(excluded.body_mass_index, wearables.body_mass_index)";

const UPSERT_UNPARSED: &str =
    "INSERT INTO wearable_unparsed (user_id, category, payload, updated_at)
     VALUES (?1, ?2, ?3, ?4)
     ON CONFLICT(user_id, category) DO UPDATE SET
        payload = excluded.payload,
        updated_at = excluded.updated_at";

/// Database storage operations for wearable profiles
pub struct DatabaseStorage;

impl DatabaseStorage {
    /// Get a profile, including its unparsed payloads
    pub fn get(pool: &DatabasePool, user_id: &str) -> Result<Option<WearableProfileRecord>, RepositoryError> {
        debug!("Getting wearable profile from database: user_id={}", user_id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                read_profile(&conn, user_id)
            }
        }
    }

    /// Merge an update into the stored row in one immediate transaction and
    /// return the merged profile
    pub fn upsert(pool: &DatabasePool, update: &ProfileUpdateRecord) -> Result<WearableProfileRecord, RepositoryError> {
        debug!("Upserting wearable profile in database: user_id={}", update.user_id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let mut conn = pool.get()?;
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

                tx.execute(
                    UPSERT_PROFILE,
                    named_params! {
                        ":user_id": &update.user_id,
                        ":last_event": &update.last_event,
                        ":last_updated": &update.last_updated,
                        ":updated_at": &update.updated_at,
                        ":steps": update.steps,
                        ":heart_rate": update.heart_rate,
                        ":sleep_hours": update.sleep_hours,
                        ":blood_pressure_systolic": update.blood_pressure_systolic,
                        ":blood_pressure_diastolic": update.blood_pressure_diastolic,
                        ":glucose": update.glucose,
                        ":body_temperature": update.body_temperature,
                        ":calories": update.calories,
                        ":stress_level": update.stress_level,
                        ":workout_duration": update.workout_duration,
                        ":basal_body_temperature": update.basal_body_temperature,
                        ":body_mass_index": update.body_mass_index,
                    },
                )?;

                if let Some(unparsed) = &update.unparsed {
                    let payload = serde_json::to_string(&unparsed.payload)?;
                    tx.execute(
                        UPSERT_UNPARSED,
                        (&update.user_id, &unparsed.category, &payload, &update.updated_at),
                    )?;
                }

                let merged = read_profile(&tx, &update.user_id)?.ok_or_else(|| {
                    RepositoryError::NotFound(format!("{} vanished during upsert", update.user_id))
                })?;

                tx.commit()?;
                Ok(merged)
            }
        }
    }

    /// All user ids with a stored profile, sorted
    pub fn list_user_ids(pool: &DatabasePool) -> Result<Vec<String>, RepositoryError> {
        debug!("Listing wearable profile ids from database");

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let mut stmt = conn.prepare("SELECT user_id FROM wearables ORDER BY user_id")?;
                let ids = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ids)
            }
        }
    }
}

fn read_profile(conn: &Connection, user_id: &str) -> Result<Option<WearableProfileRecord>, RepositoryError> {
    let profile = conn
        .query_row(SELECT_PROFILE, [user_id], map_profile_row)
        .optional()?;

    let Some(mut profile) = profile else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT category, payload FROM wearable_unparsed WHERE user_id = ?1 ORDER BY category",
    )?;
    let rows = stmt.query_map([user_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut unparsed = BTreeMap::new();
    for row in rows {
        let (category, payload) = row?;
        unparsed.insert(category, serde_json::from_str(&payload)?);
    }
    profile.unparsed = unparsed;

    Ok(Some(profile))
}

fn map_profile_row(row: &Row<'_>) -> rusqlite::Result<WearableProfileRecord> {
    Ok(WearableProfileRecord {
        user_id: row.get(0)?,
        last_event: row.get(1)?,
        last_updated: row.get(2)?,
        updated_at: row.get(3)?,
        steps: row.get(4)?,
        heart_rate: row.get(5)?,
        sleep_hours: row.get(6)?,
        blood_pressure_systolic: row.get(7)?,
        blood_pressure_diastolic: row.get(8)?,
        glucose: row.get(9)?,
        body_temperature: row.get(10)?,
        calories: row.get(11)?,
        stress_level: row.get(12)?,
        workout_duration: row.get(13)?,
        basal_body_temperature: row.get(14)?,
        body_mass_index: row.get(15)?,
        unparsed: BTreeMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseConfig;
    use crate::models::wearable::UnparsedPayload;
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn file_pool(name: &str) -> (DatabasePool, PathBuf) {
        let dir = std::env::temp_dir().join(format!(
            "wellness_hub_{}_{}_{}",
            name,
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let config = DatabaseConfig {
            sqlite_path: Some(dir.join("profiles.db").to_string_lossy().to_string()),
            max_connections: 8,
            ..DatabaseConfig::default()
        };
        (DatabasePool::connect(&config).unwrap(), dir)
    }

    fn base_update(user_id: &str, at: &str) -> ProfileUpdateRecord {
        ProfileUpdateRecord {
            user_id: user_id.to_string(),
            last_event: "daily.data.blood_pressure.created".to_string(),
            last_updated: at.to_string(),
            updated_at: at.to_string(),
            ..ProfileUpdateRecord::default()
        }
    }

    #[test]
    fn test_get_missing_profile_is_none() {
        let pool = DatabasePool::in_memory().unwrap();
        assert!(DatabaseStorage::get(&pool, "nobody").unwrap().is_none());
    }

    #[test]
    fn test_upsert_keeps_stored_value_for_missing_field() {
        let pool = DatabasePool::in_memory().unwrap();

        let mut first = base_update("user-1", "2024-03-01T10:00:00+00:00");
        first.blood_pressure_systolic = Some(120.0);
        first.blood_pressure_diastolic = Some(80.0);
        first.steps = Some(4000.0);
        DatabaseStorage::upsert(&pool, &first).unwrap();

        let mut second = base_update("user-1", "2024-03-01T11:00:00+00:00");
        second.blood_pressure_diastolic = Some(75.0);
        let merged = DatabaseStorage::upsert(&pool, &second).unwrap();

        assert_eq!(merged.blood_pressure_systolic, Some(120.0));
        assert_eq!(merged.blood_pressure_diastolic, Some(75.0));
        assert_eq!(merged.steps, Some(4000.0));
        assert_eq!(merged.updated_at.as_deref(), Some("2024-03-01T11:00:00+00:00"));
        assert_eq!(DatabaseStorage::get(&pool, "user-1").unwrap(), Some(merged));
    }

    #[test]
    fn test_upsert_stores_unparsed_payload_per_category() {
        let pool = DatabasePool::in_memory().unwrap();

        let mut update = base_update("user-1", "2024-03-01T10:00:00+00:00");
        update.unparsed = Some(UnparsedPayload {
            category: "custom".to_string(),
            payload: json!({"foo": 1}),
        });
        DatabaseStorage::upsert(&pool, &update).unwrap();

        update.unparsed = Some(UnparsedPayload {
            category: "vo2_max".to_string(),
            payload: json!({"data": [{"value": 41}]}),
        });
        let merged = DatabaseStorage::upsert(&pool, &update).unwrap();

        assert_eq!(merged.unparsed.len(), 2);
        assert_eq!(merged.unparsed["custom"], json!({"foo": 1}));
        assert_eq!(merged.unparsed["vo2_max"], json!({"data": [{"value": 41}]}));
        assert!(merged.steps.is_none());
    }

    #[test]
    fn test_one_row_per_user() {
        let pool = DatabasePool::in_memory().unwrap();

        for user in ["b-user", "a-user", "b-user"] {
            let mut update = base_update(user, "2024-03-01T10:00:00+00:00");
            update.steps = Some(1.0);
            DatabaseStorage::upsert(&pool, &update).unwrap();
        }

        assert_eq!(
            DatabaseStorage::list_user_ids(&pool).unwrap(),
            vec!["a-user".to_string(), "b-user".to_string()]
        );
    }

    #[test]
    fn test_concurrent_upserts_keep_both_blood_pressure_sides() {
        let (pool, dir) = file_pool("concurrent");
        const WRITERS: usize = 8;
        const ROUNDS: usize = 20;

        for round in 0..ROUNDS {
            let user_id = format!("user-{}", round);
            let barrier = Arc::new(Barrier::new(WRITERS));

            let handles: Vec<_> = (0..WRITERS)
                .map(|writer| {
                    let pool = pool.clone();
                    let barrier = Arc::clone(&barrier);
                    let user_id = user_id.clone();
                    thread::spawn(move || {
                        let mut update = base_update(&user_id, "2024-03-01T10:00:00+00:00");
                        if writer % 2 == 0 {
                            update.blood_pressure_systolic = Some(120.0 + writer as f64);
                        } else {
                            update.blood_pressure_diastolic = Some(80.0 + writer as f64);
                        }
                        barrier.wait();
                        DatabaseStorage::upsert(&pool, &update)
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap().unwrap();
            }

            let profile = DatabaseStorage::get(&pool, &user_id).unwrap().unwrap();
            assert!(profile.blood_pressure_systolic.is_some(), "round {}", round);
            assert!(profile.blood_pressure_diastolic.is_some(), "round {}", round);
        }

        assert_eq!(DatabaseStorage::list_user_ids(&pool).unwrap().len(), ROUNDS);

        drop(pool);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
