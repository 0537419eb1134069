use crate::error::{Result, UpliftError};
use crate::model::{CommitDetail, SCHEMA_VERSION};
use rusqlite::{params, Connection};
use std::path::Path;

/// Commit details keyed by (repository, sha). Details never change once a
/// commit exists, so entries are never invalidated.
pub struct Cache {
    conn: Connection,
}

impl Cache {
    pub fn new<P: AsRef<Path>>(cache_dir: P) -> Result<Self> {
        std::fs::create_dir_all(cache_dir.as_ref())?;
        let conn = Connection::open(cache_dir.as_ref().join("details.db"))?;
        let mut cache = Self { conn };
        cache.initialize()?;
        Ok(cache)
    }

    fn initialize(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS commit_details (
                repository TEXT NOT NULL,
                sha TEXT NOT NULL,
                additions INTEGER NOT NULL,
                deletions INTEGER NOT NULL,
                total_changes INTEGER NOT NULL,
                files_changed INTEGER NOT NULL,
                PRIMARY KEY (repository, sha)
            );
            ",
        )?;
        self.check_schema_version()?;
        Ok(())
    }

    fn check_schema_version(&mut self) -> Result<()> {
        let user_version: i64 = self
            .conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))?;

        if user_version == 0 {
            let set_stmt = format!("PRAGMA user_version = {SCHEMA_VERSION};");
            self.conn.execute_batch(&set_stmt)?;
        } else if user_version != SCHEMA_VERSION as i64 {
            return Err(UpliftError::Cache(format!(
                "Schema version mismatch: expected {}, found {}",
                SCHEMA_VERSION, user_version
            )));
        }

        Ok(())
    }

    pub fn get_detail(&self, repository: &str, sha: &str) -> Result<Option<CommitDetail>> {
        let result = self.conn.query_row(
            "SELECT sha, additions, deletions, total_changes, files_changed
             FROM commit_details WHERE repository = ? AND sha = ?",
            params![repository, sha],
            |row| {
                Ok(CommitDetail {
                    sha: row.get(0)?,
                    additions: row.get::<_, i64>(1)? as u64,
                    deletions: row.get::<_, i64>(2)? as u64,
                    total_changes: row.get::<_, i64>(3)? as u64,
                    files_changed: row.get::<_, i64>(4)? as u64,
                })
            },
        );
        match result {
            Ok(detail) => Ok(Some(detail)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn store_detail(&mut self, repository: &str, detail: &CommitDetail) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO commit_details
             (repository, sha, additions, deletions, total_changes, files_changed)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                repository,
                detail.sha,
                detail.additions as i64,
                detail.deletions as i64,
                detail.total_changes as i64,
                detail.files_changed as i64
            ],
        )?;
        Ok(())
    }

}

#[cfg(test)]
impl Cache {
    fn in_memory() -> Result<Self> {
        let mut cache = Self { conn: Connection::open_in_memory()? };
        cache.initialize()?;
        Ok(cache)
    }

    fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM commit_details", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(sha: &str, total: u64) -> CommitDetail {
        CommitDetail { sha: sha.into(), additions: total, deletions: 0, total_changes: total, files_changed: 1 }
    }

    #[test]
    fn round_trips_per_repository() {
        let mut cache = Cache::in_memory().unwrap();
        assert!(cache.is_empty().unwrap());
        cache.store_detail("api", &detail("abc", 12)).unwrap();

        assert_eq!(cache.get_detail("api", "abc").unwrap(), Some(detail("abc", 12)));
        assert_eq!(cache.get_detail("web", "abc").unwrap(), None);
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn reopening_a_directory_keeps_entries() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut cache = Cache::new(dir.path()).unwrap();
            cache.store_detail("api", &detail("abc", 3)).unwrap();
            cache.store_detail("api", &detail("abc", 4)).unwrap();
        }
        let cache = Cache::new(dir.path()).unwrap();
        assert_eq!(cache.get_detail("api", "abc").unwrap(), Some(detail("abc", 4)));
    }
}
