//! File-backed record persistence.
//!
//! Layout inside the store directory:
//! ```text
//! store.meta.json            - metadata and schema version
//! records/
//!   <name>.<hash>.cbor.zst   - CBOR+zstd compressed records
//! integrity/
//!   manifest.json            - file name and SHA-256 of every record
//! ```
//!
//! Every file is written to a `.tmp` sibling and renamed into place. A record
//! file is named after a prefix of its own hash, so a save never overwrites
//! the file the current manifest points at. Renaming the manifest is the
//! commit point: until it succeeds the previous record stays readable, both
//! in memory and after reopening.

use fluxcell_common::Record;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::codec::{self, RecordFormat};
use crate::error::PersistError;

/// Current on-disk schema version.
pub const STORE_SCHEMA_VERSION: u32 = 1;

const META_FILE: &str = "store.meta.json";
const RECORD_EXT: &str = "cbor.zst";
/// Hex digits of the record hash that go into its file name.
const FILENAME_HASH_LEN: usize = 16;

/// Metadata stored in store.meta.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMeta {
    pub schema_version: u32,
    /// Derived from the manifest; recomputed on open.
    pub record_count: usize,
}

/// Manifest entry for one record file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub filename: String,
    pub sha256: String,
}

/// Integrity manifest keyed by record name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct IntegrityManifest {
    entries: BTreeMap<String, ManifestEntry>,
}

/// Directory of named records with schema versioning and integrity checking.
pub struct RecordStore {
    root: PathBuf,
    meta: StoreMeta,
    manifest: IntegrityManifest,
}

impl RecordStore {
    /// Open or create a record store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(root.join("records"))?;
        std::fs::create_dir_all(root.join("integrity"))?;

        let meta_path = root.join(META_FILE);
        let manifest_path = manifest_path(&root);

        let (meta, manifest) = if meta_path.exists() {
            let mut meta: StoreMeta = serde_json::from_reader(std::fs::File::open(&meta_path)?)?;
            if meta.schema_version != STORE_SCHEMA_VERSION {
                return Err(PersistError::SchemaMismatch {
                    file_version: meta.schema_version,
                    expected_version: STORE_SCHEMA_VERSION,
                });
            }
            let manifest: IntegrityManifest = if manifest_path.exists() {
                serde_json::from_reader(std::fs::File::open(&manifest_path)?)?
            } else {
                IntegrityManifest::default()
            };
            meta.record_count = manifest.entries.len();
            (meta, manifest)
        } else {
            let meta = StoreMeta {
                schema_version: STORE_SCHEMA_VERSION,
                record_count: 0,
            };
            let manifest = IntegrityManifest::default();
            write_atomic(&meta_path, &serde_json::to_vec_pretty(&meta)?)?;
            write_atomic(&manifest_path, &serde_json::to_vec_pretty(&manifest)?)?;
            tracing::debug!(root = %root.display(), "created record store");
            (meta, manifest)
        };

        Ok(Self {
            root,
            meta,
            manifest,
        })
    }

    /// Write `record` under `name`, replacing any previous record of that name.
    ///
    /// On error the store still serves the previous record. An error from
    /// the final metadata write means the record itself was committed.
    pub fn save(&mut self, name: &str, record: &Record) -> Result<(), PersistError> {
        let _span = tracing::info_span!("record_store_save", name).entered();
        validate_name(name)?;

        let cbor_bytes = codec::encode(record, RecordFormat::Cbor)?;
        let compressed = zstd_compress(&cbor_bytes)?;
        let sha256 = sha256_hex(&compressed);
        let filename = record_filename(name, &sha256);
        let path = self.record_path(&filename);

        write_atomic(&path, &compressed)?;
        tracing::debug!(bytes = compressed.len(), file = %filename, "record written");

        let mut manifest = self.manifest.clone();
        let previous = manifest.entries.insert(
            name.to_string(),
            ManifestEntry {
                filename: filename.clone(),
                sha256,
            },
        );
        let replaced = previous.filter(|entry| entry.filename != filename);

        if let Err(e) = self.write_manifest(&manifest) {
            // Same content under the same name shares the file; keep it.
            if replaced.is_some() || !self.contains(name) {
                remove_stale(&path);
            }
            tracing::warn!(error = %e, "manifest write failed, record not committed");
            return Err(e);
        }
        self.manifest = manifest;

        if let Some(old) = replaced {
            remove_stale(&self.record_path(&old.filename));
        }
        self.sync_meta()
    }

    /// Read the record stored under `name`, verifying its hash first.
    pub fn load(&self, name: &str) -> Result<Record, PersistError> {
        let _span = tracing::info_span!("record_store_load", name).entered();
        let entry = self
            .manifest
            .entries
            .get(name)
            .ok_or_else(|| PersistError::NotFound(name.to_string()))?;
        let compressed = std::fs::read(self.record_path(&entry.filename))?;

        let actual = sha256_hex(&compressed);
        if actual != entry.sha256 {
            return Err(PersistError::IntegrityMismatch {
                name: name.to_string(),
                expected: entry.sha256.clone(),
                actual,
            });
        }

        let cbor_bytes = zstd_decompress(&compressed)?;
        codec::decode(&cbor_bytes, RecordFormat::Cbor)
    }

    /// Delete the record stored under `name`. Returns whether it existed.
    pub fn remove(&mut self, name: &str) -> Result<bool, PersistError> {
        let _span = tracing::info_span!("record_store_remove", name).entered();
        let mut manifest = self.manifest.clone();
        let Some(entry) = manifest.entries.remove(name) else {
            return Ok(false);
        };

        self.write_manifest(&manifest)?;
        self.manifest = manifest;

        remove_stale(&self.record_path(&entry.filename));
        self.sync_meta()?;
        Ok(true)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.manifest.entries.contains_key(name)
    }

    /// Names of all stored records, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.manifest.entries.keys().map(String::as_str)
    }

    /// Manifest entry for `name`, if stored.
    pub fn entry(&self, name: &str) -> Option<&ManifestEntry> {
        self.manifest.entries.get(name)
    }

    /// Verify every record file against the manifest.
    pub fn verify_integrity(&self) -> Result<(), PersistError> {
        for (name, entry) in &self.manifest.entries {
            let data = std::fs::read(self.record_path(&entry.filename))?;
            let actual = sha256_hex(&data);
            if actual != entry.sha256 {
                return Err(PersistError::IntegrityMismatch {
                    name: name.clone(),
                    expected: entry.sha256.clone(),
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Get the path to the store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the metadata.
    pub fn meta(&self) -> &StoreMeta {
        &self.meta
    }

    fn record_path(&self, filename: &str) -> PathBuf {
        self.root.join("records").join(filename)
    }

    fn write_manifest(&self, manifest: &IntegrityManifest) -> Result<(), PersistError> {
        write_atomic(
            &manifest_path(&self.root),
            &serde_json::to_vec_pretty(manifest)?,
        )
    }

    fn sync_meta(&mut self) -> Result<(), PersistError> {
        self.meta.record_count = self.manifest.entries.len();
        write_atomic(
            &self.root.join(META_FILE),
            &serde_json::to_vec_pretty(&self.meta)?,
        )
    }
}

fn manifest_path(root: &Path) -> PathBuf {
    root.join("integrity").join("manifest.json")
}

fn record_filename(name: &str, sha256: &str) -> String {
    let prefix = sha256.get(..FILENAME_HASH_LEN).unwrap_or(sha256);
    format!("{name}.{prefix}.{RECORD_EXT}")
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Write `bytes` to a sibling temp file, then rename it over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
    let tmp = tmp_path(path);
    let result = std::fs::write(&tmp, bytes).and_then(|()| std::fs::rename(&tmp, path));
    if result.is_err() && tmp.is_file() {
        remove_stale(&tmp);
    }
    Ok(result?)
}

/// Best-effort delete of a file the manifest no longer references.
fn remove_stale(path: &Path) {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), error = %e, "could not remove stale file");
        }
        _ => {}
    }
}

/// Names become file stems, so only a conservative character set is allowed.
fn validate_name(name: &str) -> Result<(), PersistError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(PersistError::InvalidName(name.to_string()))
    }
}

fn zstd_compress(data: &[u8]) -> Result<Vec<u8>, PersistError> {
    let mut encoder = zstd::Encoder::new(Vec::new(), 3)?;
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn zstd_decompress(data: &[u8]) -> Result<Vec<u8>, PersistError> {
    let mut decoder = zstd::Decoder::new(data)?;
    let mut buf = Vec::new();
    decoder.read_to_end(&mut buf)?;
    Ok(buf)
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
