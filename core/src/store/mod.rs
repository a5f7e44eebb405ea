// Store module: small key/value persistence for client state

pub mod backend;
pub mod device_id;

pub use backend::{MemoryStorage, StorageBackend, StoreError};
pub use device_id::{load_or_create_device_id, DEVICE_ID_KEY};

#[cfg(not(target_arch = "wasm32"))]
pub use backend::SledStorage;
