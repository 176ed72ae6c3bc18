use fluxcell_common::Record;

use crate::error::PersistError;

/// Byte encodings a [`Record`] can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// Compact binary form used on disk.
    Cbor,
    /// Human-readable form for inspection and fixtures.
    Json,
}

impl RecordFormat {
    /// Guess a format from a file extension (`cbor` or `json`).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "cbor" => Some(Self::Cbor),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn encode(record: &Record, format: RecordFormat) -> Result<Vec<u8>, PersistError> {
    match format {
        RecordFormat::Cbor => {
            let mut buf = Vec::new();
            ciborium::into_writer(record, &mut buf)
                .map_err(|e| PersistError::CborEncode(e.to_string()))?;
            Ok(buf)
        }
        RecordFormat::Json => Ok(serde_json::to_vec_pretty(record)?),
    }
}

pub fn decode(data: &[u8], format: RecordFormat) -> Result<Record, PersistError> {
    match format {
        RecordFormat::Cbor => {
            ciborium::from_reader(data).map_err(|e| PersistError::CborDecode(e.to_string()))
        }
        RecordFormat::Json => Ok(serde_json::from_slice(data)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxcell_storage::{EnergyPool, STORAGE_KEY};

    fn owner_record() -> Record {
        let mut pool = EnergyPool::new(i64::from(i32::MAX) * 2);
        pool.set_stored(i64::from(i32::MAX) + 5);
        let mut owner = Record::new();
        owner.set_str("kind", "battery");
        owner.set_int("facing", 3);
        pool.save_into(&mut owner);
        owner
    }

    #[test]
    fn cbor_preserves_nested_pool() {
        let owner = owner_record();
        let bytes = encode(&owner, RecordFormat::Cbor).unwrap();
        let decoded = decode(&bytes, RecordFormat::Cbor).unwrap();
        assert_eq!(decoded, owner);

        let mut pool = EnergyPool::new(i64::from(i32::MAX) * 2);
        assert!(pool.load_from(&decoded));
        assert_eq!(pool.stored(), i64::from(i32::MAX) + 5);
    }

    #[test]
    fn json_is_readable() {
        let owner = owner_record();
        let bytes = encode(&owner, RecordFormat::Json).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains(STORAGE_KEY));
        assert_eq!(decode(&bytes, RecordFormat::Json).unwrap(), owner);
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(
            decode(&[0xff, 0x00, 0x13], RecordFormat::Cbor),
            Err(PersistError::CborDecode(_))
        ));
        assert!(matches!(
            decode(b"{not json", RecordFormat::Json),
            Err(PersistError::Json(_))
        ));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(RecordFormat::from_extension("CBOR"), Some(RecordFormat::Cbor));
        assert_eq!(RecordFormat::from_extension("json"), Some(RecordFormat::Json));
        assert_eq!(RecordFormat::from_extension("nbt"), None);
    }
}
