use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::dao::{
    kv_store::KeyValueStore,
    models::{ChallengePosting, GameRecord, User},
    storage::{StorageError, StorageResult},
};

/// Key holding the username → user mapping.
pub const USERS_KEY: &str = "users";
/// Prefix of the per-user record list keys (`records:<username>`).
pub const RECORDS_KEY_PREFIX: &str = "records:";
/// Key holding the list of active challenge postings.
pub const ACTIVE_CHALLENGES_KEY: &str = "active_challenges";

/// Data Access Object over the key-value store for users, records and challenges.
///
/// No operation fails towards the caller: decode failures read as an empty
/// collection, encode or write failures become no-ops, and both are logged.
/// Writes are read-modify-write without locking; concurrent writers sharing
/// one store can drop each other's updates.
#[derive(Clone)]
pub struct QuizRepository {
    store: Arc<dyn KeyValueStore>,
}

impl QuizRepository {
    /// Repository over `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load every registered user keyed by username.
    ///
    /// Stored as an array of `[username, user]` pairs.
    pub fn load_users(&self) -> IndexMap<String, User> {
        self.read::<Vec<(String, User)>>(USERS_KEY)
            .into_iter()
            .collect()
    }

    /// Overwrite the full user collection.
    pub fn save_users(&self, users: &IndexMap<String, User>) {
        let pairs: Vec<(&String, &User)> = users.iter().collect();
        self.write(USERS_KEY, &pairs);
    }

    /// Look up a single user.
    pub fn find_user(&self, username: &str) -> Option<User> {
        self.load_users().shift_remove(username)
    }

    /// Records of `username` in the order they were appended.
    pub fn load_records(&self, username: &str) -> Vec<GameRecord> {
        self.read(&records_key(username))
    }

    /// Append a record to the end of the user's list.
    ///
    /// Returns whether the record was written; a failed write is logged and
    /// leaves the stored list unchanged.
    pub fn append_record(&self, username: &str, record: GameRecord) -> bool {
        let key = records_key(username);
        let mut records: Vec<GameRecord> = self.read(&key);
        records.push(record);
        self.write(&key, &records)
    }

    /// Concatenation of [`Self::load_records`] for every user, in user order.
    pub fn load_all_records(&self, users: &IndexMap<String, User>) -> Vec<GameRecord> {
        users
            .keys()
            .flat_map(|username| self.load_records(username))
            .collect()
    }

    /// All currently posted challenges.
    pub fn load_active_challenges(&self) -> Vec<ChallengePosting> {
        self.read(ACTIVE_CHALLENGES_KEY)
    }

    /// Overwrite the full list of active challenges.
    pub fn save_active_challenges(&self, challenges: &[ChallengePosting]) {
        self.write(ACTIVE_CHALLENGES_KEY, challenges);
    }

    fn read<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        match self.try_read(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "failed to load collection; treating it as empty");
                T::default()
            }
        }
    }

    fn try_read<T>(&self, key: &str) -> StorageResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let Some(raw) = self.store.get(key)? else {
            return Ok(T::default());
        };
        serde_json::from_str(&raw).map_err(|source| StorageError::Decode {
            key: key.to_string(),
            source,
        })
    }

    fn write<T>(&self, key: &str, value: &T) -> bool
    where
        T: Serialize + ?Sized,
    {
        let outcome = serde_json::to_string(value)
            .map_err(|source| StorageError::Encode {
                key: key.to_string(),
                source,
            })
            .and_then(|encoded| self.store.set(key, encoded));

        match outcome {
            Ok(()) => {
                debug!(key, "collection saved");
                true
            }
            Err(err) => {
                warn!(key, error = %err, "failed to save collection; write dropped");
                false
            }
        }
    }
}

fn records_key(username: &str) -> String {
    format!("{RECORDS_KEY_PREFIX}{username}")
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io;

    use super::*;
    use crate::dao::kv_store::MemoryStore;

    /// Store whose writes always fail, reads return whatever was seeded.
    pub(crate) struct ReadOnlyStore(pub MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, _key: &str, _value: String) -> StorageResult<()> {
            Err(StorageError::unavailable(
                "quota exceeded".into(),
                io::Error::other("disk full"),
            ))
        }

        fn remove(&self, _key: &str) -> StorageResult<()> {
            Ok(())
        }
    }

    fn repository() -> QuizRepository {
        QuizRepository::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn users_round_trip() {
        let repo = repository();
        let mut users = IndexMap::new();
        let mut ada = User::new("ada", "hash-a");
        ada.email = Some("ada@example.com".into());
        users.insert("ada".to_string(), ada);
        users.insert("bob".to_string(), User::new("bob", "hash-b"));

        repo.save_users(&users);

        assert_eq!(repo.load_users(), users);
        assert_eq!(repo.find_user("bob"), users.get("bob").cloned());
        assert!(repo.find_user("carol").is_none());
    }

    #[test]
    fn users_are_stored_as_username_user_pairs() {
        let store = Arc::new(MemoryStore::new());
        let repo = QuizRepository::new(store.clone());
        let mut users = IndexMap::new();
        users.insert("bob".to_string(), User::new("bob", "hash-b"));
        users.insert("ada".to_string(), User::new("ada", "hash-a"));
        repo.save_users(&users);

        let raw = store.get(USERS_KEY).unwrap().unwrap();
        let encoded: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(encoded[0][0], "bob");
        assert_eq!(encoded[1][0], "ada");
        assert_eq!(encoded[1][1]["passwordHash"], "hash-a");

        let seeded = MemoryStore::new().with_entry(
            USERS_KEY,
            r#"[["carol", {"username": "carol", "passwordHash": "hash-c"}]]"#,
        );
        let loaded = QuizRepository::new(Arc::new(seeded)).load_users();
        assert_eq!(loaded.get("carol"), Some(&User::new("carol", "hash-c")));
    }

    #[test]
    fn records_keep_append_order_per_user() {
        let repo = repository();
        let first = GameRecord::new("ada", 3, 15);
        let second = GameRecord::new("ada", 12, 15);
        let other = GameRecord::new("bob", 7, 15);

        repo.append_record("ada", first.clone());
        repo.append_record("bob", other.clone());
        repo.append_record("ada", second.clone());

        assert_eq!(repo.load_records("ada"), vec![first.clone(), second.clone()]);
        assert_eq!(repo.load_records("bob"), vec![other.clone()]);
        assert!(repo.load_records("carol").is_empty());

        let mut users = IndexMap::new();
        users.insert("bob".to_string(), User::new("bob", "x"));
        users.insert("ada".to_string(), User::new("ada", "y"));
        assert_eq!(repo.load_all_records(&users), vec![other, first, second]);
    }

    #[test]
    fn challenges_overwrite_whole_collection() {
        let repo = repository();
        let record = GameRecord::new("ada", 8, 10);
        let posting = ChallengePosting::from_record(&record);

        repo.save_active_challenges(std::slice::from_ref(&posting));
        assert_eq!(repo.load_active_challenges(), vec![posting]);

        repo.save_active_challenges(&[]);
        assert!(repo.load_active_challenges().is_empty());
    }

    #[test]
    fn corrupt_values_read_as_empty() {
        let store = MemoryStore::new()
            .with_entry(USERS_KEY, "{not json")
            .with_entry("records:ada", "42")
            .with_entry(ACTIVE_CHALLENGES_KEY, "[{\"id\":1}]");
        let repo = QuizRepository::new(Arc::new(store));

        assert!(repo.load_users().is_empty());
        assert!(repo.load_records("ada").is_empty());
        assert!(repo.load_active_challenges().is_empty());
    }

    #[test]
    fn failed_writes_are_dropped_silently() {
        let repo = QuizRepository::new(Arc::new(ReadOnlyStore(MemoryStore::new())));

        assert!(!repo.append_record("ada", GameRecord::new("ada", 1, 3)));
        repo.save_users(&IndexMap::new());

        assert!(repo.load_records("ada").is_empty());
        assert!(repository().append_record("ada", GameRecord::new("ada", 1, 3)));
    }
}
