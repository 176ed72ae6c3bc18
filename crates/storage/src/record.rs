use fluxcell_common::Record;

use crate::pool::EnergyPool;

/// Field holding the stored quantity inside a pool record.
pub const ENERGY_KEY: &str = "Energy";
/// Key under which an owner embeds the pool record in its own record.
pub const STORAGE_KEY: &str = "energyStorage";

/// A component that can be embedded into, and restored from, an owner's
/// persisted record.
pub trait RecordSerializable {
    fn serialize_record(&self) -> Record;
    fn deserialize_record(&mut self, record: &Record);
}

impl EnergyPool {
    /// Flat pool record: `{ "Energy": Long(stored) }`.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        self.write_record(&mut record);
        record
    }

    /// Write the stored quantity into `record`, floored at zero.
    pub fn write_record(&self, record: &mut Record) {
        record.set_long(ENERGY_KEY, self.stored().max(0));
    }

    /// Restore the stored quantity from a flat pool record. The value is
    /// clamped into `[0, capacity]`; capacity and rates are untouched.
    pub fn read_record(&mut self, record: &Record) -> &mut Self {
        self.set_stored(record.get_long(ENERGY_KEY));
        self
    }

    /// A copy of `template` carrying the stored quantity from `record`.
    pub fn from_record(record: &Record, template: &EnergyPool) -> EnergyPool {
        let mut pool = template.clone();
        pool.read_record(record);
        pool
    }

    /// Embed this pool under [`STORAGE_KEY`] in an owner's record.
    pub fn save_into(&self, owner: &mut Record) {
        owner.set_compound(STORAGE_KEY, self.to_record());
    }

    /// Restore from an owner's record. Returns `false` and leaves the pool
    /// unchanged when the owner has no embedded pool.
    pub fn load_from(&mut self, owner: &Record) -> bool {
        match owner.get_compound(STORAGE_KEY) {
            Some(record) => {
                self.read_record(record);
                true
            }
            None => {
                tracing::debug!(key = STORAGE_KEY, "no embedded pool, left unchanged");
                false
            }
        }
    }
}

impl RecordSerializable for EnergyPool {
    fn serialize_record(&self) -> Record {
        let mut owner = Record::new();
        self.save_into(&mut owner);
        owner
    }

    fn deserialize_record(&mut self, record: &Record) {
        self.load_from(record);
    }
}
