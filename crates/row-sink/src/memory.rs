//! In-memory row sink.

use relay_types::{ColumnFamily, FormattedFamily};
use std::sync::{Mutex, MutexGuard};

use crate::formatter::format_family;
use crate::traits::RowSink;

/// A row as the in-memory sink recorded it, already byte-encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub row_key: String,
    pub meta: FormattedFamily,
    pub data: FormattedFamily,
}

/// Sink that keeps formatted rows in memory.
///
/// Used for `--dry-run` and as the store double in tests; `failing()` builds
/// one whose writes report failure, for the "write failed, publish anyway" path.
#[derive(Debug, Default)]
pub struct MemoryRowSink {
    rows: Mutex<Vec<StoredRow>>,
    fail_writes: bool,
}

impl MemoryRowSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose writes always report failure.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Snapshot of every row written so far.
    pub fn rows(&self) -> Vec<StoredRow> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StoredRow>> {
        // A panic while holding the lock cannot leave a half-pushed row behind
        self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl RowSink for MemoryRowSink {
    async fn insert_event(&self, row_key: &str, data: &ColumnFamily, meta: &ColumnFamily) -> bool {
        if self.fail_writes {
            tracing::error!("Error saving event to memory sink: writes are disabled");
            return false;
        }

        let row = StoredRow {
            row_key: row_key.to_string(),
            meta: format_family(meta),
            data: format_family(data),
        };
        self.lock().push(row);

        tracing::info!("Event kept in memory with row key: {row_key}");
        true
    }
}
