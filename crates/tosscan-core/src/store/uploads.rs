//! Queue of scan-result telemetry awaiting delivery.

use anyhow::{Context, Result};
use sqlx::Row;

use super::db::{unix_timestamp, ResultStore};
use crate::backend::ScanUpload;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub id: i64,
    pub upload: ScanUpload,
    pub created_at: i64,
}

impl ResultStore {
    pub async fn enqueue_upload(&self, upload: &ScanUpload) -> Result<i64> {
        let id = sqlx::query("INSERT INTO pending_uploads (payload, created_at) VALUES (?1, ?2)")
            .bind(serde_json::to_string(upload)?)
            .bind(unix_timestamp())
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        Ok(id)
    }

    /// Queued uploads, oldest first.
    pub async fn pending_uploads(&self) -> Result<Vec<PendingUpload>> {
        let rows = sqlx::query("SELECT id, payload, created_at FROM pending_uploads ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| {
                let id: i64 = row.get("id");
                let payload: String = row.get("payload");
                let upload = serde_json::from_str(&payload)
                    .with_context(|| format!("corrupt pending upload {id}"))?;
                Ok(PendingUpload {
                    id,
                    upload,
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }

    /// Remove delivered uploads. Returns how many rows went away.
    pub async fn delete_uploads(&self, ids: &[i64]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut removed = 0;
        for id in ids {
            removed += sqlx::query("DELETE FROM pending_uploads WHERE id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;
        Ok(removed)
    }
}
