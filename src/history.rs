//! Recent calculation history: newest first, bounded, persisted in the background.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::db::{Database, DebouncedWriter, PersistenceError, HISTORY_KEY};
use crate::models::HistoryEntry;

/// Hard cap on stored calculations; larger configured limits are clamped.
pub const MAX_HISTORY: usize = 10;

/// Bounded most-recent-first list of past calculations.
#[derive(Debug)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    limit: usize,
    writer: DebouncedWriter,
}

impl HistoryStore {
    /// Load persisted history. Unreadable or malformed data yields an empty list.
    pub async fn load(db: &Database, limit: usize, debounce: Duration) -> Self {
        let limit = limit.min(MAX_HISTORY);
        let entries = match read_history(db).await {
            Ok(mut entries) => {
                entries.truncate(limit);
                entries
            }
            Err(e) => {
                warn!(error = %e, "Could not load calculation history, starting empty");
                Vec::new()
            }
        };
        info!(entries = entries.len(), "Loaded calculation history");

        Self {
            entries,
            limit,
            writer: DebouncedWriter::spawn(db.clone(), HISTORY_KEY, debounce),
        }
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    #[cfg(test)]
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Add an entry at the front, evicting the oldest beyond the limit.
    pub fn record(&mut self, entry: HistoryEntry) {
        debug!(id = %entry.id, symbol = %entry.symbol, "Recording calculation");
        self.entries.insert(0, entry);
        self.entries.truncate(self.limit);
        self.persist();
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    /// Wait for any pending write to reach storage.
    pub async fn flush(&self) -> Result<(), PersistenceError> {
        self.writer.flush().await?;
        debug!(writes = self.writer.writes_committed(), "History flushed");
        Ok(())
    }

    fn persist(&self) {
        match serde_json::to_string(&self.entries) {
            Ok(json) => self.writer.schedule(json),
            Err(e) => warn!(error = %e, "Failed to serialize calculation history"),
        }
    }
}

async fn read_history(db: &Database) -> Result<Vec<HistoryEntry>, PersistenceError> {
    let Some(raw) = db.get(HISTORY_KEY).await? else {
        return Ok(Vec::new());
    };
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CalculationInput, CalculationResult, Instrument, RiskMode};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    const DEBOUNCE: Duration = Duration::from_millis(20);

    fn entry(balance: i64) -> HistoryEntry {
        let input = CalculationInput::new(
            Instrument::EurUsd,
            Decimal::from(balance),
            RiskMode::Percent,
            dec!(1),
            dec!(20),
        );
        let result = CalculationResult {
            lots: dec!(0.05),
            micro_lots: 5,
            risk_usd: dec!(10),
        };
        HistoryEntry::new(&input, result)
    }

    async fn memory_db() -> Database {
        Database::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_newest_first_and_bounded() {
        let db = memory_db().await;
        let mut history = HistoryStore::load(&db, 10, DEBOUNCE).await;
        assert!(history.is_empty());

        for balance in 1..=15 {
            history.record(entry(balance * 1000));
            assert!(history.len() <= 10);
            assert_eq!(history.entries()[0].balance, Decimal::from(balance * 1000));
        }

        assert_eq!(history.len(), 10);
        assert_eq!(history.latest().unwrap().balance, dec!(15000));
        assert_eq!(history.entries()[9].balance, dec!(6000));
    }

    #[tokio::test]
    async fn test_persists_and_reloads() {
        let db = memory_db().await;
        let mut history = HistoryStore::load(&db, 10, DEBOUNCE).await;
        history.record(entry(1000));
        history.record(entry(2000));
        history.flush().await.unwrap();

        let reloaded = HistoryStore::load(&db, 10, DEBOUNCE).await;
        assert_eq!(reloaded.entries(), history.entries());
        assert_eq!(reloaded.latest().unwrap().balance, dec!(2000));
    }

    #[tokio::test]
    async fn test_rapid_records_write_once() {
        let db = memory_db().await;
        let mut history = HistoryStore::load(&db, 10, Duration::from_secs(5)).await;
        for balance in 1..=4 {
            history.record(entry(balance));
        }
        history.flush().await.unwrap();

        assert_eq!(history.writer.writes_committed(), 1);
        let stored: Vec<HistoryEntry> =
            serde_json::from_str(&db.get(HISTORY_KEY).await.unwrap().unwrap()).unwrap();
        assert_eq!(stored.len(), 4);
    }

    #[tokio::test]
    async fn test_malformed_history_loads_empty() {
        let db = memory_db().await;
        db.set(HISTORY_KEY, "{not json").await.unwrap();

        let history = HistoryStore::load(&db, 10, DEBOUNCE).await;
        assert!(history.is_empty());

        db.set(HISTORY_KEY, r#"[{"id": 3}]"#).await.unwrap();
        let history = HistoryStore::load(&db, 10, DEBOUNCE).await;
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_storage_loads_empty() {
        let db = memory_db().await;
        db.close().await;

        let mut history = HistoryStore::load(&db, 10, DEBOUNCE).await;
        assert!(history.is_empty());

        // Writes fail quietly; the in-memory list still works.
        history.record(entry(500));
        tokio_test::assert_ok!(history.flush().await);
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_oversized_stored_history_is_truncated() {
        let db = memory_db().await;
        let entries: Vec<HistoryEntry> = (1..=12).map(entry).collect();
        db.set(HISTORY_KEY, &serde_json::to_string(&entries).unwrap())
            .await
            .unwrap();

        let history = HistoryStore::load(&db, 10, DEBOUNCE).await;
        assert_eq!(history.len(), 10);
        assert_eq!(history.entries()[0].balance, dec!(1));
    }

    #[tokio::test]
    async fn test_limit_above_cap_is_clamped() {
        let db = memory_db().await;
        let mut history = HistoryStore::load(&db, 25, DEBOUNCE).await;
        assert_eq!(history.limit(), MAX_HISTORY);

        for balance in 1..=15 {
            history.record(entry(balance));
        }
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history.latest().unwrap().balance, dec!(15));

        let entries: Vec<HistoryEntry> = (1..=12).map(entry).collect();
        db.set(HISTORY_KEY, &serde_json::to_string(&entries).unwrap())
            .await
            .unwrap();
        let reloaded = HistoryStore::load(&db, 25, DEBOUNCE).await;
        assert_eq!(reloaded.len(), MAX_HISTORY);
    }

    #[tokio::test]
    async fn test_clear_persists_empty_list() {
        let db = memory_db().await;
        let mut history = HistoryStore::load(&db, 10, DEBOUNCE).await;
        history.record(entry(1000));
        history.clear();
        history.flush().await.unwrap();

        assert!(history.is_empty());
        assert_eq!(db.get(HISTORY_KEY).await.unwrap().as_deref(), Some("[]"));
    }
}
