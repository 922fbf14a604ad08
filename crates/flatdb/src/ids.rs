//! Identifier generation.

use flatdb_api::prelude::{FlatDbError, FlatDbResult, IdStrategy, Record, RecordId};
use uuid::Uuid;

/// How many random identifiers are drawn before giving up on finding a free one.
const MAX_RANDOM_DRAWS: usize = 1024;

/// Computes the identifier of a record about to be inserted among `records`.
///
/// The returned identifier never collides with the identifier of an existing record.
pub fn next_id(strategy: &IdStrategy, records: &[Record]) -> FlatDbResult<RecordId> {
    match strategy {
        IdStrategy::Sequential => {
            let max = records
                .iter()
                .filter_map(|record| RecordId::of(record).and_then(|id| id.as_int()))
                .max()
                .unwrap_or(0)
                .max(0);
            max.checked_add(1)
                .map(RecordId::Int)
                .ok_or_else(|| FlatDbError::InvalidRecord("sequential id space exhausted".to_string()))
        }
        IdStrategy::Random { prefix, len } => {
            for _ in 0..MAX_RANDOM_DRAWS {
                let candidate = RecordId::Text(format!("{prefix}{}", random_hex(*len)));
                if !records.iter().any(|record| candidate.is_id_of(record)) {
                    return Ok(candidate);
                }
            }
            Err(FlatDbError::InvalidRecord(format!(
                "could not find a free id with prefix '{prefix}'"
            )))
        }
    }
}

/// Returns `len` random lowercase hex characters.
///
/// Entropy comes from v4 UUIDs, skipping the version and variant nibbles.
pub fn random_hex(len: usize) -> String {
    let mut out = String::with_capacity(len);
    while out.len() < len {
        let uuid = Uuid::new_v4();
        let hex = uuid.simple().to_string();
        for (index, c) in hex.chars().enumerate() {
            if index == 12 || index == 16 {
                continue;
            }
            if out.len() == len {
                break;
            }
            out.push(c);
        }
    }
    out
}
