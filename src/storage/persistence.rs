//! JSON snapshot persistence
//!
//! Writes go to a temporary file first and are renamed into place, keeping
//! the previous snapshots as rotating backups.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub snapshot_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".multisig_data"),
            snapshot_file: "wallet.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// Snapshot storage rooted at one data directory
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    pub fn with_defaults() -> Result<Self, StorageError> {
        Self::new(StorageConfig::default())
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    fn snapshot_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.snapshot_file)
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.snapshot_file, index))
    }

    /// Persist `value`, backing up the snapshot it replaces
    pub fn save<T: Serialize>(&self, value: &T) -> Result<(), StorageError> {
        let path = self.snapshot_path();

        if self.config.backup_enabled && self.config.max_backups > 0 && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        let temp_path = path.with_extension("tmp");
        let writer = BufWriter::new(fs::File::create(&temp_path)?);
        serde_json::to_writer_pretty(writer, value)?;
        fs::rename(&temp_path, &path)?;

        log::debug!("Snapshot written to {}", path.display());
        Ok(())
    }

    pub fn load<T: DeserializeOwned>(&self) -> Result<T, StorageError> {
        let path = self.snapshot_path();
        if !path.exists() {
            return Err(StorageError::InvalidData(format!(
                "No snapshot at {}",
                path.display()
            )));
        }
        load_from_file(&path)
    }

    pub fn exists(&self) -> bool {
        self.snapshot_path().exists()
    }

    pub fn delete(&self) -> Result<(), StorageError> {
        let path = self.snapshot_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn rotate_backups(&self) -> Result<(), StorageError> {
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                fs::rename(&current, self.backup_path(i + 1))?;
            }
        }

        Ok(())
    }

    /// Load backup `index` (0 is the most recent)
    pub fn restore_backup<T: DeserializeOwned>(&self, index: usize) -> Result<T, StorageError> {
        let path = self.backup_path(index);
        if !path.exists() {
            return Err(StorageError::InvalidData(format!("Backup {} not found", index)));
        }
        load_from_file(&path)
    }

    pub fn list_backups(&self) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|&i| self.backup_path(i).exists())
            .collect()
    }

    pub fn stats(&self) -> Result<StorageStats, StorageError> {
        let path = self.snapshot_path();
        let file_size = if path.exists() {
            fs::metadata(&path)?.len()
        } else {
            0
        };

        Ok(StorageStats {
            file_size,
            backup_count: self.list_backups().len(),
            data_dir: self.config.data_dir.clone(),
        })
    }
}

/// Storage statistics
#[derive(Debug)]
pub struct StorageStats {
    pub file_size: u64,
    pub backup_count: usize,
    pub data_dir: PathBuf,
}

/// Write `value` to an explicit path
pub fn save_to_file<T: Serialize>(value: &T, path: &Path) -> Result<(), StorageError> {
    let writer = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

/// Read a value from an explicit path
pub fn load_from_file<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let reader = BufReader::new(fs::File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Address;
    use crate::ledger::LedgerHost;
    use crate::multisig::{MultisigWallet, WalletConfig, WalletState};

    fn temp_storage(max_backups: usize) -> (tempfile::TempDir, Storage) {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
            max_backups,
            ..Default::default()
        };
        let storage = Storage::new(config).unwrap();
        (temp_dir, storage)
    }

    fn sample_wallet() -> MultisigWallet<LedgerHost> {
        let signers = vec![Address::from("owner"), Address::from("admin")];
        let config = WalletConfig::new(signers, 2, Address::from("0xcoin")).unwrap();
        MultisigWallet::new(Address::from("owner"), config, LedgerHost::default()).unwrap()
    }

    #[test]
    fn test_save_load_wallet_state() {
        let (_dir, storage) = temp_storage(5);
        let mut wallet = sample_wallet();
        wallet
            .request_tx(&Address::from("admin"), vec![1, 2, 3], "raw call")
            .unwrap();

        storage.save(wallet.state()).unwrap();
        assert!(storage.exists());

        let loaded: WalletState = storage.load().unwrap();
        assert_eq!(&loaded, wallet.state());
        assert_eq!(loaded.store().get(0).unwrap().call_data, vec![1, 2, 3]);
    }

    #[test]
    fn test_missing_snapshot() {
        let (_dir, storage) = temp_storage(5);
        assert!(!storage.exists());
        assert!(matches!(
            storage.load::<WalletState>(),
            Err(StorageError::InvalidData(_))
        ));
    }

    #[test]
    fn test_backup_rotation() {
        let (_dir, storage) = temp_storage(3);

        for round in 0..5u32 {
            storage.save(&round).unwrap();
        }

        assert_eq!(storage.list_backups(), vec![0, 1, 2]);
        assert_eq!(storage.load::<u32>().unwrap(), 4);
        assert_eq!(storage.restore_backup::<u32>(0).unwrap(), 3);
        assert_eq!(storage.restore_backup::<u32>(2).unwrap(), 1);
        assert_eq!(storage.stats().unwrap().backup_count, 3);
    }

    #[test]
    fn test_delete() {
        let (_dir, storage) = temp_storage(0);
        storage.save(&"snapshot").unwrap();
        storage.delete().unwrap();
        assert!(!storage.exists());
        assert!(storage.list_backups().is_empty());
    }
}
