//! File-based Store Adapters
//!
//! The local fallback store. Preparations and session records are kept as
//! YAML documents under a base directory:
//!
//! ```text
//! <base>/preparations/<pairing-uuid>/employee.yaml
//! <base>/preparations/<pairing-uuid>/manager.yaml
//! <base>/sessions/<record-id>.yaml
//! ```
//!
//! One file per `(pairing, role)` keeps upserts independent: an employee and
//! a manager saving at the same time never overwrite each other. Files are
//! written to a temporary sibling and renamed into place.
//!
//! Pairing directories are named by a v5 UUID of the pairing key, so the
//! directory name has a fixed length however long the names are.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;
use uuid::Uuid;

use crate::domain::foundation::PartyRole;
use crate::domain::preparation::{PairingKey, PartySubmission, PreparationPair};
use crate::domain::session::SessionRecord;
use crate::ports::{sort_newest_first, PreparationStore, SessionStore, StoreError};

const PREPARATIONS_DIR: &str = "preparations";
const SESSIONS_DIR: &str = "sessions";

/// Namespace for pairing directory names. Changing it orphans existing data.
const PAIRING_NAMESPACE: Uuid = Uuid::from_u128(0x6c1f_2a4e_93b7_4d0a_8e55_b2d4_71c3_9f08);

/// File-based storage for preparation submissions.
#[derive(Debug, Clone)]
pub struct FilePreparationStore {
    base_path: PathBuf,
}

impl FilePreparationStore {
    /// Create a store rooted at `base_path`. Directories are created lazily.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().join(PREPARATIONS_DIR),
        }
    }

    fn pairing_dir(&self, key: &PairingKey) -> PathBuf {
        self.base_path.join(pairing_dir_name(key).to_string())
    }

    fn role_file(&self, key: &PairingKey, role: PartyRole) -> PathBuf {
        self.pairing_dir(key).join(format!("{}.yaml", role.as_str()))
    }
}

#[async_trait]
impl PreparationStore for FilePreparationStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn save(
        &self,
        key: &PairingKey,
        role: PartyRole,
        submission: &PartySubmission,
    ) -> Result<(), StoreError> {
        fs::create_dir_all(self.pairing_dir(key)).await?;
        let yaml = serde_yaml::to_string(submission)?;
        write_atomic(&self.role_file(key, role), yaml).await
    }

    async fn load(&self, key: &PairingKey) -> Result<PreparationPair, StoreError> {
        let mut pair = PreparationPair::empty();
        for role in PartyRole::ALL {
            let path = self.role_file(key, role);
            if !fs::try_exists(&path).await? {
                continue;
            }
            let yaml = fs::read_to_string(&path).await?;
            let submission: PartySubmission = serde_yaml::from_str(&yaml)?;
            pair.set(role, submission);
        }
        Ok(pair)
    }
}

/// File-based storage for completed session records.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    base_path: PathBuf,
}

impl FileSessionStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().join(SESSIONS_DIR),
        }
    }

    fn record_file(&self, record: &SessionRecord) -> PathBuf {
        self.base_path.join(format!("{}.yaml", record.id()))
    }

    async fn read_all(&self) -> Result<Vec<SessionRecord>, StoreError> {
        if !fs::try_exists(&self.base_path).await? {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let mut entries = fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            // A single corrupt file must not hide the rest of history.
            let bytes = match fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable session file");
                    continue;
                }
            };
            match serde_yaml::from_slice::<SessionRecord>(&bytes) {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping corrupt session file"),
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn save(&self, record: &SessionRecord) -> Result<(), StoreError> {
        fs::create_dir_all(&self.base_path).await?;
        let yaml = serde_yaml::to_string(record)?;
        write_atomic(&self.record_file(record), yaml).await
    }

    async fn list_all(&self) -> Result<Vec<SessionRecord>, StoreError> {
        let mut records = self.read_all().await?;
        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn list_by_pair(&self, a: &str, b: &str) -> Result<Vec<SessionRecord>, StoreError> {
        let mut records: Vec<_> = self
            .read_all()
            .await?
            .into_iter()
            .filter(|r| r.involves(a, b))
            .collect();
        sort_newest_first(&mut records);
        Ok(records)
    }
}

async fn write_atomic(path: &Path, contents: String) -> Result<(), StoreError> {
    let tmp = path.with_extension(format!("yaml.{}.tmp", uuid::Uuid::new_v4()));
    fs::write(&tmp, contents).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

fn pairing_dir_name(key: &PairingKey) -> Uuid {
    Uuid::new_v5(&PAIRING_NAMESPACE, key.as_str().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::Category;
    use crate::domain::foundation::{Rating, Timestamp};
    use crate::domain::preparation::MAX_NAME_LENGTH;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn submission(name: &str, partner: &str) -> PartySubmission {
        let mut ratings = BTreeMap::new();
        ratings.insert("A".to_string(), Rating::Neutral);
        let mut comments = BTreeMap::new();
        comments.insert("A".to_string(), String::new());
        PartySubmission::new(name, partner, ratings, comments).unwrap()
    }

    fn record(secs: i64) -> SessionRecord {
        SessionRecord::new(
            "Max",
            "Eve",
            Timestamp::from_unix_secs(secs),
            submission("Eve", "Max"),
            submission("Max", "Eve"),
            vec![Category::new("A", "a")],
        )
    }

    #[tokio::test]
    async fn test_file_store_save_and_load_preparations() {
        let temp_dir = TempDir::new().unwrap();
        let store = FilePreparationStore::new(temp_dir.path());
        let employee = submission("Eve", "Max");

        store
            .save(&employee.pairing_key(), PartyRole::Employee, &employee)
            .await
            .unwrap();

        let pair = store.load(&PairingKey::new("max", "EVE")).await.unwrap();
        assert_eq!(pair.employee.as_ref(), Some(&employee));
        assert!(pair.manager.is_none());
        // Empty comments survive the round trip.
        assert_eq!(pair.employee.unwrap().comments.get("A"), Some(&String::new()));
    }

    #[tokio::test]
    async fn test_file_store_load_missing_pairing_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FilePreparationStore::new(temp_dir.path());
        let pair = store.load(&PairingKey::new("a", "b")).await.unwrap();
        assert!(pair.is_empty());
    }

    #[tokio::test]
    async fn test_file_store_lists_sessions_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());
        let older = record(1_000);
        let newer = record(2_000);
        store.save(&older).await.unwrap();
        store.save(&newer).await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all, vec![newer.clone(), older]);

        let by_pair = store.list_by_pair("Eve", "Max").await.unwrap();
        assert_eq!(by_pair.len(), 2);
        assert!(store.list_by_pair("Eve", "Bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_store_skips_corrupt_session_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());
        store.save(&record(1_000)).await.unwrap();
        fs::write(temp_dir.path().join(SESSIONS_DIR).join("broken.yaml"), "::: not yaml")
            .await
            .unwrap();

        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_file_store_skips_non_utf8_session_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());
        store.save(&record(1_000)).await.unwrap();
        fs::write(temp_dir.path().join(SESSIONS_DIR).join("bad.yaml"), [0xff, 0xfe, 0x00])
            .await
            .unwrap();

        assert_eq!(store.list_all().await.unwrap().len(), 1);
        assert_eq!(store.list_by_pair("Max", "Eve").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_file_store_saves_longest_allowed_names() {
        let temp_dir = TempDir::new().unwrap();
        let store = FilePreparationStore::new(temp_dir.path());
        let employee_name = "A".repeat(MAX_NAME_LENGTH);
        let manager_name = "B".repeat(MAX_NAME_LENGTH);
        let employee = submission(&employee_name, &manager_name);
        let manager = submission(&manager_name, &employee_name);

        let key = employee.pairing_key();
        store.save(&key, PartyRole::Employee, &employee).await.unwrap();
        store.save(&key, PartyRole::Manager, &manager).await.unwrap();

        let pair = store
            .load(&PairingKey::new(&manager_name, &employee_name))
            .await
            .unwrap();
        assert!(pair.is_complete());
    }

    #[tokio::test]
    async fn test_file_store_empty_directory_lists_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path().join("nowhere"));
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[test]
    fn pairing_dir_name_is_stable_and_distinct() {
        let key = PairingKey::new("Eve", "Max");
        assert_eq!(pairing_dir_name(&key), pairing_dir_name(&PairingKey::new("max", "eve")));
        assert_ne!(pairing_dir_name(&key), pairing_dir_name(&PairingKey::new("Eve", "Bob")));
        assert_eq!(pairing_dir_name(&key).get_version_num(), 5);
    }
}
