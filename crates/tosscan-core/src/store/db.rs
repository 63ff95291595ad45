//! SQLite connection, migrations and timestamp helper.

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Characters that would end or confuse the path part of a `sqlite://` URI.
const URI_ESCAPES: &[(char, &str)] = &[
    ('%', "%25"),
    (' ', "%20"),
    ('#', "%23"),
    ('?', "%3F"),
    ('&', "%26"),
];

/// `sqlite://` URI for `path`, opened read-write and created if missing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let encoded: String = path
        .to_string_lossy()
        .chars()
        .map(|c| match URI_ESCAPES.iter().find(|(raw, _)| *raw == c) {
            Some((_, escaped)) => (*escaped).to_string(),
            None => c.to_string(),
        })
        .collect();
    format!("sqlite://{encoded}?mode=rwc")
}

/// Handle to the result database.
///
/// Default location: `~/.local/state/tosscan/results.db`.
#[derive(Clone)]
pub struct ResultStore {
    pub(super) pool: Pool<Sqlite>,
}

impl ResultStore {
    pub fn default_path() -> Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("tosscan")?;
        Ok(xdg_dirs.get_state_home().join("tosscan").join("results.db"))
    }

    /// Open (or create) the default database and run migrations.
    pub async fn open_default() -> Result<Self> {
        Self::open_at(Self::default_path()?).await
    }

    /// Open (or create) the database at `path`, creating parent dirs.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&path_to_sqlite_uri(path))
            .await?;
        let store = ResultStore { pool };
        store.migrate().await?;
        tracing::debug!("result store open at {}", path.display());
        Ok(store)
    }

    /// Private in-memory database. One connection, so every query sees the
    /// same data.
    pub async fn open_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let store = ResultStore { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pending_uploads (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                payload TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Current time as Unix seconds (row timestamps).
pub(super) fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_escapes_special_characters() {
        let uri = path_to_sqlite_uri(Path::new("/tmp/my dir/#1/results.db"));
        assert_eq!(uri, "sqlite:///tmp/my%20dir/%231/results.db?mode=rwc");
    }
}
