// Persisted client device id, sent with every backend request

use super::backend::{StorageBackend, StoreError};

pub const DEVICE_ID_KEY: &[u8] = b"device_id";

/// Return the stored device id, creating and persisting a UUID v4 on first use.
pub fn load_or_create_device_id(storage: &dyn StorageBackend) -> Result<String, StoreError> {
    if let Some(bytes) = storage.get(DEVICE_ID_KEY)? {
        let id = String::from_utf8(bytes).map_err(|_| StoreError::Corrupt)?;
        if !id.is_empty() {
            return Ok(id);
        }
    }

    let id = uuid::Uuid::new_v4().to_string();
    storage.put(DEVICE_ID_KEY, id.as_bytes())?;
    storage.flush()?;
    tracing::debug!("Created device id {}", id);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;

    #[test]
    fn test_created_once() {
        let storage = MemoryStorage::new();
        let first = load_or_create_device_id(&storage).unwrap();
        let second = load_or_create_device_id(&storage).unwrap();
        assert_eq!(first, second);
        assert!(uuid::Uuid::parse_str(&first).is_ok());
    }

    #[test]
    fn test_existing_id_kept() {
        let storage = MemoryStorage::new();
        storage.put(DEVICE_ID_KEY, b"legacy-id").unwrap();
        assert_eq!(load_or_create_device_id(&storage).unwrap(), "legacy-id");
    }

    #[test]
    fn test_corrupt_id_rejected() {
        let storage = MemoryStorage::new();
        storage.put(DEVICE_ID_KEY, &[0xff, 0xfe]).unwrap();
        assert!(matches!(
            load_or_create_device_id(&storage),
            Err(StoreError::Corrupt)
        ));
    }
}
