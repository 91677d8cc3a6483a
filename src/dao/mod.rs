/// Key-value backends the repository persists through.
pub mod kv_store;
/// Persisted entity definitions.
pub mod models;
/// Collection-level access over fixed storage keys.
pub mod repository;
/// Storage error types shared by every backend.
pub mod storage;
