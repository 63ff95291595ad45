//! Scan records keyed `scan_<hostname>`.

use anyhow::{Context, Result};
use sqlx::Row;

use super::db::{unix_timestamp, ResultStore};
use crate::model::{AnalysisRecord, ScanResult, StoredScan};

const KEY_PREFIX: &str = "scan_";

/// Storage key for `hostname`.
pub fn storage_key(hostname: &str) -> String {
    format!("{KEY_PREFIX}{hostname}")
}

impl ResultStore {
    /// Latest scan of `hostname` with its analyses, if any.
    pub async fn get_scan(&self, hostname: &str) -> Result<Option<StoredScan>> {
        let row = sqlx::query("SELECT value FROM kv WHERE key = ?1")
            .bind(storage_key(hostname))
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let value: String = row.get("value");
        let stored = serde_json::from_str(&value)
            .with_context(|| format!("corrupt stored scan for {hostname}"))?;
        Ok(Some(stored))
    }

    /// Replace the stored scan of its hostname. Previous analyses are dropped:
    /// their link indices refer to the old link list.
    pub async fn save_scan(&self, scan: &ScanResult) -> Result<()> {
        let stored = StoredScan::new(scan.clone());
        self.put(&scan.page.hostname, &stored).await
    }

    /// Record the analysis of link `index`, replacing any earlier one.
    /// Returns false (and stores nothing) when no scan exists for `hostname`.
    pub async fn save_analysis(
        &self,
        hostname: &str,
        index: usize,
        record: &AnalysisRecord,
    ) -> Result<bool> {
        let key = storage_key(hostname);
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query("SELECT value FROM kv WHERE key = ?1")
            .bind(&key)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            tx.commit().await?;
            return Ok(false);
        };
        let value: String = row.get("value");
        let mut stored: StoredScan = serde_json::from_str(&value)
            .with_context(|| format!("corrupt stored scan for {hostname}"))?;
        stored.analysis_results.insert(index, record.clone());

        sqlx::query("UPDATE kv SET value = ?1, updated_at = ?2 WHERE key = ?3")
            .bind(serde_json::to_string(&stored)?)
            .bind(unix_timestamp())
            .bind(&key)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }

    pub async fn get_analysis(
        &self,
        hostname: &str,
        index: usize,
    ) -> Result<Option<AnalysisRecord>> {
        Ok(self
            .get_scan(hostname)
            .await?
            .and_then(|mut s| s.analysis_results.remove(&index)))
    }

    /// Delete everything stored for `hostname`. Returns true if a scan existed.
    pub async fn clear(&self, hostname: &str) -> Result<bool> {
        let done = sqlx::query("DELETE FROM kv WHERE key = ?1")
            .bind(storage_key(hostname))
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    /// Drop cached analyses of `hostname`, keeping the scan itself.
    /// Returns the number of analyses removed.
    pub async fn clear_analyses(&self, hostname: &str) -> Result<usize> {
        let Some(mut stored) = self.get_scan(hostname).await? else {
            return Ok(0);
        };
        let removed = stored.analysis_results.len();
        if removed > 0 {
            stored.analysis_results.clear();
            self.put(hostname, &stored).await?;
        }
        Ok(removed)
    }

    /// Hostnames with a stored scan, sorted.
    pub async fn list_hosts(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM kv WHERE key LIKE 'scan\\_%' ESCAPE '\\' ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let key: String = row.get("key");
                key.strip_prefix(KEY_PREFIX).map(str::to_string)
            })
            .collect())
    }

    async fn put(&self, hostname: &str, stored: &StoredScan) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(storage_key(hostname))
        .bind(serde_json::to_string(stored)?)
        .bind(unix_timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
