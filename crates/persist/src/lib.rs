//! Persistence: record codecs and a file-backed record store.
//!
//! # Invariants
//! - Stored records are verified against the integrity manifest before decoding.
//! - A store written under another schema version is never opened.
//! - Overwriting a named record replaces its manifest entry; nothing else moves.

mod codec;
mod error;
mod store;

pub use codec::{RecordFormat, decode, encode};
pub use error::PersistError;
pub use store::{ManifestEntry, RecordStore, STORE_SCHEMA_VERSION, StoreMeta};
