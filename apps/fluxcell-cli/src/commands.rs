//! Store-backed command bodies, kept apart from argument parsing and printing.

use std::fmt;
use std::path::Path;

use anyhow::Context;
use fluxcell_common::Record;
use fluxcell_persist::{RecordFormat, RecordStore};
use fluxcell_storage::{EnergyPool, STORAGE_KEY};

use crate::script::PoolSpec;

fn open_store(store: &Path) -> anyhow::Result<RecordStore> {
    RecordStore::open(store).with_context(|| format!("opening store {}", store.display()))
}

/// Embed `pool` in a fresh owner record and save it as `name`.
pub fn save_pool(store: &Path, name: &str, pool: &EnergyPool) -> anyhow::Result<()> {
    let mut record_store = open_store(store)?;
    let mut owner = Record::new();
    pool.save_into(&mut owner);
    record_store
        .save(name, &owner)
        .with_context(|| format!("saving {name}"))?;
    tracing::info!(name = %name, "saved pool");
    Ok(())
}

/// Restore `pool` from the owner record `name`.
///
/// Returns `false` and leaves `pool` as configured when the record carries no
/// embedded pool.
pub fn load_pool(store: &Path, name: &str, pool: &mut EnergyPool) -> anyhow::Result<bool> {
    let record_store = open_store(store)?;
    let owner = record_store
        .load(name)
        .with_context(|| format!("loading {name}"))?;
    let found = pool.load_from(&owner);
    if !found {
        tracing::warn!(name = %name, key = STORAGE_KEY, "record has no embedded pool");
    }
    Ok(found)
}

/// Merge `b` into `a` and return the result.
pub fn merge_pools(a: PoolSpec, b: PoolSpec) -> EnergyPool {
    let mut merged = a.build();
    merged.merge(&b.build());
    merged
}

/// Result of `inspect`.
#[derive(Debug, PartialEq, Eq)]
pub enum Inspection {
    /// Every record verified; names in sorted order.
    Listing { count: usize, names: Vec<String> },
    /// One record rendered as JSON.
    Record(String),
}

impl fmt::Display for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inspection::Listing { count, names } => {
                write!(f, "{count} record(s), integrity OK")?;
                for name in names {
                    write!(f, "\n  {name}")?;
                }
                Ok(())
            }
            Inspection::Record(json) => f.write_str(json),
        }
    }
}

/// List and verify the store, or render the record `name` as JSON.
pub fn inspect(store: &Path, name: Option<&str>) -> anyhow::Result<Inspection> {
    let record_store = open_store(store)?;
    match name {
        Some(name) => {
            let record = record_store.load(name)?;
            let json = fluxcell_persist::encode(&record, RecordFormat::Json)?;
            Ok(Inspection::Record(String::from_utf8_lossy(&json).into_owned()))
        }
        None => {
            record_store.verify_integrity()?;
            Ok(Inspection::Listing {
                count: record_store.meta().record_count,
                names: record_store.names().map(str::to_owned).collect(),
            })
        }
    }
}
