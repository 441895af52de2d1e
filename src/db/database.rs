use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use eyre::WrapErr;
use tokio::sync::RwLock;

use super::{claim::ClaimRecord, store::ClaimsStore};

const CLAIMS_FILE_PATH: &str = "data/claims.json";

/// Claim log kept in memory and, when backed by a file, mirrored to JSON on
/// every append.
pub struct ClaimsDatabase {
    path: Option<PathBuf>,
    records: RwLock<Vec<ClaimRecord>>,
}

impl ClaimsDatabase {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            records: RwLock::new(Vec::new()),
        }
    }

    pub async fn open(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref().to_path_buf();

        let records = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => serde_json::from_str::<Vec<ClaimRecord>>(&content)
                .wrap_err_with(|| format!("Claims file `{}` is corrupted", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(e).wrap_err_with(|| format!("Failed to read `{}`", path.display()))
            }
        };

        tracing::info!("Loaded {} claim records from `{}`", records.len(), path.display());

        Ok(Self {
            path: Some(path),
            records: RwLock::new(records),
        })
    }

    pub async fn read() -> eyre::Result<Self> {
        Self::open(CLAIMS_FILE_PATH).await
    }

    pub async fn latest_record(&self, fid: u64) -> Option<ClaimRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|record| record.get_fid() == fid)
            .max_by_key(|record| record.get_claimed_at())
            .cloned()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    async fn persist(&self, records: &[ClaimRecord]) -> eyre::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let serialized = serde_json::to_string_pretty(records)?;
        let tmp_path = path.with_extension("json.tmp");

        tokio::fs::write(&tmp_path, serialized)
            .await
            .wrap_err_with(|| format!("Failed to write `{}`", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .wrap_err_with(|| format!("Failed to replace `{}`", path.display()))?;

        Ok(())
    }
}

impl ClaimsStore for ClaimsDatabase {
    async fn most_recent_claim(&self, fid: u64) -> eyre::Result<Option<DateTime<Utc>>> {
        Ok(self
            .latest_record(fid)
            .await
            .map(|record| record.get_claimed_at()))
    }

    async fn append(&self, record: ClaimRecord) -> eyre::Result<()> {
        let mut records = self.records.write().await;
        records.push(record);

        if let Err(e) = self.persist(&records).await {
            records.pop();
            return Err(e);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};
    use solana_sdk::{pubkey::Pubkey, signature::Signature};

    use super::*;

    fn record(fid: u64, claimed_at: DateTime<Utc>) -> ClaimRecord {
        ClaimRecord::new(
            fid,
            claimed_at,
            &Pubkey::new_unique(),
            Some("0xabc".to_string()),
            &Signature::default(),
        )
    }

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!(
            "frame-faucet-claims-{}-{}.json",
            std::process::id(),
            rand::random::<u64>()
        ))
    }

    #[tokio::test]
    async fn most_recent_is_latest_per_fid() {
        let db = ClaimsDatabase::in_memory();
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        db.append(record(1, base + TimeDelta::hours(30))).await.unwrap();
        db.append(record(1, base)).await.unwrap();
        db.append(record(2, base + TimeDelta::hours(50))).await.unwrap();

        assert_eq!(
            db.most_recent_claim(1).await.unwrap(),
            Some(base + TimeDelta::hours(30))
        );
        assert_eq!(db.most_recent_claim(3).await.unwrap(), None);
        assert_eq!(db.len().await, 3);
    }

    #[tokio::test]
    async fn file_backed_log_survives_reopen() {
        let path = temp_path();
        let claimed_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let written = record(7, claimed_at);

        {
            let db = ClaimsDatabase::open(&path).await.unwrap();
            assert_eq!(db.len().await, 0);
            db.append(written.clone()).await.unwrap();
        }

        let reopened = ClaimsDatabase::open(&path).await.unwrap();
        assert_eq!(reopened.latest_record(7).await, Some(written));

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn corrupted_file_is_an_error() {
        let path = temp_path();
        std::fs::write(&path, "{not json").unwrap();

        assert!(ClaimsDatabase::open(&path).await.is_err());

        let _ = std::fs::remove_file(&path);
    }
}
