use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Logical collections the booking engine persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    UniversalTimeslots,
    Therapists,
    Bookings,
}

impl Collection {
    pub fn table(&self) -> &'static str {
        match self {
            Collection::UniversalTimeslots => "universal_timeslots",
            Collection::Therapists => "therapists",
            Collection::Bookings => "bookings",
        }
    }

    /// Column holding the unique document key.
    pub fn key_field(&self) -> &'static str {
        match self {
            Collection::UniversalTimeslots => "date",
            Collection::Therapists | Collection::Bookings => "id",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Document store handle shared by the cells.
///
/// Only point lookup, full scan and whole-document upsert are required.
/// There are no transactions: a `save` replaces the document stored under
/// `key` in a single call.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_one(&self, collection: Collection, key: &str) -> Result<Option<Value>>;

    async fn find(&self, collection: Collection) -> Result<Vec<Value>>;

    async fn save(&self, collection: Collection, key: &str, document: Value) -> Result<()>;

    /// Releases the handle. Later calls fail.
    async fn close(&self) -> Result<()>;
}
