//! Shared primitive type aliases.

/// Identifier for catalog records (UUID v7, assigned by the store).
pub type DbId = uuid::Uuid;

/// UTC timestamp used for all persisted times.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
