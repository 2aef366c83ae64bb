//! Embedded sample dataset standing in for the external loader.
//!
//! A deployment replaces this with a fetch from the metrics store; the
//! dashboard only needs a populated registry.

use ui::core::record::{DatasetRegistry, PubRecord, RawRecord, Snapshot};

const SAMPLE: &str = include_str!("../assets/publications.sample.json");

/// Observations this old predate the extraction tooling and only add noise.
const YEAR_FLOOR: i32 = 2000;

pub fn load_registry() -> DatasetRegistry {
    let mut registry = DatasetRegistry::new();

    match serde_json::from_str::<Vec<RawRecord>>(SAMPLE) {
        Ok(rows) => {
            let records: Vec<PubRecord> = rows
                .into_iter()
                .map(PubRecord::from)
                .filter(|record| record.year >= YEAR_FLOOR)
                .collect();
            log::info!("loaded {} sample publications", records.len());
            registry.insert("RTransparent", Snapshot::new(records));
        }
        Err(err) => log::error!("sample dataset failed to parse: {err}"),
    }

    registry
}
