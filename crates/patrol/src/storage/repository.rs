//! Patrol log persistence.
//!
//! The whole collection is serialized as one JSON array and written to a
//! single slot on every change. There is no versioning field and no partial
//! update.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::patrol_log::PatrolLog;

use super::SlotStore;

/// The slot that holds the serialized patrol log.
pub const LOGS_SLOT_KEY: &str = "patrol-logs";

/// Loads and saves the patrol log collection as a whole.
pub trait LogRepository {
    /// Load the persisted collection, newest first.
    ///
    /// An absent slot is an empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSlot`] if the stored value is not a JSON list
    /// of patrol logs, or a storage error if the read fails.
    fn load(&self) -> Result<Vec<PatrolLog>>;

    /// Replace the persisted collection with `logs`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    fn save(&mut self, logs: &[PatrolLog]) -> Result<()>;
}

/// Parse a stored slot value into a patrol log collection.
fn decode_logs(raw: &str) -> Result<Vec<PatrolLog>> {
    let malformed = |message: String| Error::MalformedSlot {
        key: LOGS_SLOT_KEY.to_string(),
        message,
    };

    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| malformed(e.to_string()))?;
    if !value.is_array() {
        return Err(malformed("expected a list".to_string()));
    }
    serde_json::from_value(value).map_err(|e| malformed(e.to_string()))
}

/// Repository that keeps the collection in a [`SlotStore`].
#[derive(Debug)]
pub struct SlotRepository {
    store: SlotStore,
}

impl SlotRepository {
    /// Wrap an opened slot store.
    #[must_use]
    pub fn new(store: SlotStore) -> Self {
        Self { store }
    }

    /// The underlying slot store.
    #[must_use]
    pub fn store(&self) -> &SlotStore {
        &self.store
    }
}

impl LogRepository for SlotRepository {
    fn load(&self) -> Result<Vec<PatrolLog>> {
        match self.store.get(LOGS_SLOT_KEY)? {
            Some(raw) => {
                let logs = decode_logs(&raw)?;
                debug!(count = logs.len(), "Loaded patrol logs");
                Ok(logs)
            }
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, logs: &[PatrolLog]) -> Result<()> {
        let raw = serde_json::to_string(logs)?;
        self.store.set(LOGS_SLOT_KEY, &raw)?;
        info!(count = logs.len(), "Saved patrol logs");
        Ok(())
    }
}

/// Repository that keeps the serialized collection in memory.
///
/// Stores the raw JSON string rather than the values so that loading goes
/// through the same parsing path as the on-disk store.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    slot: Option<String>,
    saves: usize,
}

impl MemoryRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository whose slot already holds `raw`.
    #[must_use]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Some(raw.into()),
            saves: 0,
        }
    }

    /// The raw stored value, if any.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.slot.as_deref()
    }

    /// Number of times [`LogRepository::save`] has been called.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl LogRepository for MemoryRepository {
    fn load(&self) -> Result<Vec<PatrolLog>> {
        self.slot.as_deref().map_or_else(|| Ok(Vec::new()), decode_logs)
    }

    fn save(&mut self, logs: &[PatrolLog]) -> Result<()> {
        self.slot = Some(serde_json::to_string(logs)?);
        self.saves += 1;
        Ok(())
    }
}
