use async_trait::async_trait;
use tracing::{debug, error};

use crate::database::DatabasePool;
use crate::models::wearable::{ProfileUpdateRecord, WearableProfileRecord};
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;

/// Repository trait for wearable profiles
#[async_trait]
pub trait ProfileRepositoryTrait {
    /// Get the stored profile of a user, `None` if the user has no row yet
    async fn get(&self, user_id: &str) -> Result<Option<WearableProfileRecord>, RepositoryError>;

    /// Atomically merge an update into the user's row and return the result
    async fn upsert(&self, update: ProfileUpdateRecord) -> Result<WearableProfileRecord, RepositoryError>;

    /// User ids that have a profile, sorted
    async fn list_user_ids(&self) -> Result<Vec<String>, RepositoryError>;
}

#[derive(Debug, Clone)]
enum Backend {
    Database(DatabasePool),
    Memory(InMemoryStorage),
}

/// Repository for wearable profiles backed by SQLite or by process memory
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    backend: Backend,
}

impl ProfileRepository {
    /// Repository persisting to the given database pool
    pub fn with_pool(pool: DatabasePool) -> Self {
        Self {
            backend: Backend::Database(pool),
        }
    }

    /// Repository keeping profiles in memory only
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(InMemoryStorage::new()),
        }
    }

    /// Whether profiles survive a restart
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, Backend::Database(_))
    }
}

#[async_trait]
impl ProfileRepositoryTrait for ProfileRepository {
    async fn get(&self, user_id: &str) -> Result<Option<WearableProfileRecord>, RepositoryError> {
        match &self.backend {
            Backend::Database(pool) => {
                let pool = pool.clone();
                let id = user_id.to_string();
                run_blocking(move || DatabaseStorage::get(&pool, &id))
                    .await
                    .map_err(|e| {
                        error!("Failed to read wearable profile {}: {}", user_id, e);
                        e
                    })
            }
            Backend::Memory(storage) => {
                debug!("Reading wearable profile {} from in-memory storage", user_id);
                storage.get(user_id)
            }
        }
    }

    async fn upsert(&self, update: ProfileUpdateRecord) -> Result<WearableProfileRecord, RepositoryError> {
        if update.user_id.is_empty() {
            return Err(RepositoryError::Validation("user_id must not be empty".to_string()));
        }

        match &self.backend {
            Backend::Database(pool) => {
                let pool = pool.clone();
                let user_id = update.user_id.clone();
                run_blocking(move || DatabaseStorage::upsert(&pool, &update))
                    .await
                    .map_err(|e| {
                        error!("Failed to upsert wearable profile {}: {}", user_id, e);
                        e
                    })
            }
            Backend::Memory(storage) => {
                debug!("Upserting wearable profile {} in in-memory storage", update.user_id);
                storage.upsert(&update)
            }
        }
    }

    async fn list_user_ids(&self) -> Result<Vec<String>, RepositoryError> {
        match &self.backend {
            Backend::Database(pool) => {
                let pool = pool.clone();
                run_blocking(move || DatabaseStorage::list_user_ids(&pool)).await
            }
            Backend::Memory(storage) => storage.list_user_ids(),
        }
    }
}

/// Run a synchronous SQLite operation on the blocking thread pool, since an
/// immediate transaction may wait on `busy_timeout`.
async fn run_blocking<T, F>(operation: F) -> Result<T, RepositoryError>
where
    F: FnOnce() -> Result<T, RepositoryError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(operation)
        .await
        .map_err(|e| RepositoryError::Task(e.to_string()))?
}

/// Mock profile repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;

    /// In-memory repository that can be told to fail on writes
    #[derive(Debug, Clone, Default)]
    pub struct MockProfileRepository {
        storage: InMemoryStorage,
        fail_writes: bool,
    }

    impl MockProfileRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository whose upserts always fail
        pub fn failing() -> Self {
            Self {
                storage: InMemoryStorage::new(),
                fail_writes: true,
            }
        }

        /// Create a mock repository with predefined profiles
        pub fn with_profiles(profiles: Vec<WearableProfileRecord>) -> Self {
            let storage = InMemoryStorage::new();
            for profile in profiles {
                let update = ProfileUpdateRecord {
                    user_id: profile.user_id.clone(),
                    last_event: profile.last_event.clone().unwrap_or_default(),
                    last_updated: profile.last_updated.clone().unwrap_or_default(),
                    updated_at: profile.updated_at.clone().unwrap_or_default(),
                    steps: profile.steps,
                    heart_rate: profile.heart_rate,
                    sleep_hours: profile.sleep_hours,
                    blood_pressure_systolic: profile.blood_pressure_systolic,
                    blood_pressure_diastolic: profile.blood_pressure_diastolic,
                    glucose: profile.glucose,
                    body_temperature: profile.body_temperature,
                    calories: profile.calories,
                    stress_level: profile.stress_level,
                    workout_duration: profile.workout_duration,
                    basal_body_temperature: profile.basal_body_temperature,
                    body_mass_index: profile.body_mass_index,
                    unparsed: None,
                };
                // The map is fresh and the lock cannot be poisoned here
                let _ = storage.upsert(&update);
            }
            Self {
                storage,
                fail_writes: false,
            }
        }
    }

    #[async_trait]
    impl ProfileRepositoryTrait for MockProfileRepository {
        async fn get(&self, user_id: &str) -> Result<Option<WearableProfileRecord>, RepositoryError> {
            self.storage.get(user_id)
        }

        async fn upsert(&self, update: ProfileUpdateRecord) -> Result<WearableProfileRecord, RepositoryError> {
            if self.fail_writes {
                return Err(RepositoryError::Lock(
                    "mock is configured to fail writes".to_string(),
                ));
            }
            self.storage.upsert(&update)
        }

        async fn list_user_ids(&self) -> Result<Vec<String>, RepositoryError> {
            self.storage.list_user_ids()
        }
    }

    #[cfg(test)]
    mod behaviour {
        use super::*;

        fn update(user_id: &str) -> ProfileUpdateRecord {
            ProfileUpdateRecord {
                user_id: user_id.to_string(),
                last_event: "daily.data.glucose.created".to_string(),
                last_updated: "2024-03-01T10:00:00+00:00".to_string(),
                updated_at: "2024-03-01T10:00:00+00:00".to_string(),
                glucose: Some(5.1),
                ..ProfileUpdateRecord::default()
            }
        }

        #[tokio::test]
        async fn test_in_memory_repository_round_trip() {
            let repo = ProfileRepository::in_memory();
            assert!(!repo.is_persistent());
            assert!(repo.get("user-1").await.unwrap().is_none());

            let merged = repo.upsert(update("user-1")).await.unwrap();
            assert_eq!(merged.glucose, Some(5.1));
            assert_eq!(repo.get("user-1").await.unwrap(), Some(merged));
        }

        #[tokio::test]
        async fn test_database_repository_round_trip() {
            let repo = ProfileRepository::with_pool(DatabasePool::in_memory().unwrap());
            assert!(repo.is_persistent());

            repo.upsert(update("user-2")).await.unwrap();
            repo.upsert(update("user-1")).await.unwrap();

            assert_eq!(repo.list_user_ids().await.unwrap(), vec!["user-1", "user-2"]);
        }

        #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
        async fn test_database_repository_handles_concurrent_writers() {
            let dir = std::env::temp_dir().join(format!(
                "wellness_hub_repo_{}_{}",
                std::process::id(),
                chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
            ));
            let config = crate::database::DatabaseConfig {
                sqlite_path: Some(dir.join("profiles.db").to_string_lossy().to_string()),
                max_connections: 4,
                ..crate::database::DatabaseConfig::default()
            };
            let repo = ProfileRepository::with_pool(DatabasePool::connect(&config).unwrap());

            let tasks: Vec<_> = (0..8)
                .map(|writer| {
                    let repo = repo.clone();
                    tokio::spawn(async move {
                        let mut update = update("user-1");
                        update.glucose = None;
                        if writer % 2 == 0 {
                            update.blood_pressure_systolic = Some(118.0);
                        } else {
                            update.blood_pressure_diastolic = Some(76.0);
                        }
                        repo.upsert(update).await
                    })
                })
                .collect();

            for task in tasks {
                task.await.unwrap().unwrap();
            }

            let profile = repo.get("user-1").await.unwrap().unwrap();
            assert_eq!(profile.blood_pressure_systolic, Some(118.0));
            assert_eq!(profile.blood_pressure_diastolic, Some(76.0));
            assert_eq!(profile.glucose, None);
            assert_eq!(repo.list_user_ids().await.unwrap(), vec!["user-1"]);

            drop(repo);
            let _ = std::fs::remove_dir_all(&dir);
        }

        #[tokio::test]
        async fn test_empty_user_id_is_rejected() {
            let repo = ProfileRepository::in_memory();
            let result = repo.upsert(update("")).await;
            assert!(matches!(result, Err(RepositoryError::Validation(_))));
        }

        #[tokio::test]
        async fn test_failing_mock_reports_error() {
            let repo = MockProfileRepository::failing();
            assert!(repo.upsert(update("user-1")).await.is_err());
            assert!(repo.get("user-1").await.unwrap().is_none());
        }
    }
}
