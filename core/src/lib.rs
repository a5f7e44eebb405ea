// BetaDrop Core: client toolkit for beta app distribution
//
// Everything the web front end needs to decide how a build reaches a device:
// who is asking (device), how an iOS device installs over the air (ota),
// what may be uploaded (validation), how share links are named (token),
// and how the dashboard talks to the backend (client, store).

pub mod client;
pub mod device;
pub mod ota;
pub mod store;
pub mod token;
pub mod validation;

pub use device::{detect_device, DeviceInfo, DeviceType, NavigatorHint};
pub use ota::{generate_ios_install_url, generate_manifest_plist, ManifestDescriptor};
pub use token::{generate_short_token, is_valid_short_token, DEFAULT_TOKEN_LENGTH};
pub use validation::{
    validate_file, validate_file_extension, validate_file_size, validate_file_with_limits,
    FileValidationResult, Platform, SizeLimits, ValidationError,
};

pub use client::{ApiContext, ApiEnvelope, ClientConfig, ClientError, SessionBus, SessionEvent};
pub use store::{MemoryStorage, StorageBackend, StoreError};

#[cfg(not(target_arch = "wasm32"))]
pub use client::UreqTransport;
#[cfg(not(target_arch = "wasm32"))]
pub use store::SledStorage;
