use snowflake::SnowflakeIdBucket;
use std::sync::Mutex;

/// Largest machine or node id a snowflake can encode (5 bits each).
pub const MAX_WORKER_ID: i32 = 31;

static ID_GENERATOR: Mutex<Option<SnowflakeIdBucket>> = Mutex::new(None);

/// Rejected generator settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("Id: {field} must be between 0 and {MAX_WORKER_ID}, got {value}")]
    WorkerIdOutOfRange { field: &'static str, value: i32 },
}

fn check_worker_id(field: &'static str, value: i32) -> Result<(), IdError> {
    if (0..=MAX_WORKER_ID).contains(&value) {
        Ok(())
    } else {
        Err(IdError::WorkerIdOutOfRange { field, value })
    }
}

/// Set the machine/node pair used for every id this process hands out.
///
/// Without a call, ids are generated as machine 1, node 1. A rejected
/// pair leaves the current generator in place.
///
/// # Errors
///
/// Returns [`IdError::WorkerIdOutOfRange`] if either id is outside
/// `0..=MAX_WORKER_ID`.
pub fn init(machine_id: i32, node_id: i32) -> Result<(), IdError> {
    check_worker_id("machine_id", machine_id)?;
    check_worker_id("node_id", node_id)?;

    let mut gen = ID_GENERATOR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *gen = Some(SnowflakeIdBucket::new(machine_id, node_id));
    Ok(())
}

/// Generate a new rule or record id (decimal snowflake).
pub fn next_id() -> String {
    let mut gen = ID_GENERATOR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    gen.get_or_insert_with(|| SnowflakeIdBucket::new(1, 1))
        .get_id()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique_decimal_numbers() {
        let mut ids = HashSet::new();
        for _ in 0..1000 {
            let id = next_id();
            assert!(id.parse::<i64>().is_ok(), "not a decimal id: {id}");
            assert!(ids.insert(id), "duplicate id");
        }
    }

    #[test]
    fn init_rejects_ids_outside_five_bits() {
        assert_eq!(
            init(32, 1),
            Err(IdError::WorkerIdOutOfRange {
                field: "machine_id",
                value: 32
            })
        );
        assert_eq!(
            init(1, -1),
            Err(IdError::WorkerIdOutOfRange {
                field: "node_id",
                value: -1
            })
        );
        assert!(next_id().parse::<i64>().is_ok());
    }

    #[test]
    fn worker_ids_cover_five_bits() {
        assert!(check_worker_id("machine_id", 0).is_ok());
        assert!(check_worker_id("machine_id", MAX_WORKER_ID).is_ok());
        assert!(check_worker_id("node_id", MAX_WORKER_ID + 1).is_err());
    }
}
