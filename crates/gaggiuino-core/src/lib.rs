// gaggiuino-core: device-state coordinator between gaggiuino-api and consumers.

pub mod command;
pub mod config;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod registry;
pub mod snapshot;
pub mod store;
pub mod stream;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{SettingsUpdate, WriteOutcome};
pub use config::{CoordinatorConfig, DEFAULT_POLL_INTERVAL, ProfileNaming, WriteTimeoutPolicy};
pub use coordinator::{Coordinator, CoordinatorState};
pub use error::CoreError;
pub use registry::{Entry, IntegrationRegistry, entry_title};
pub use snapshot::DeviceSnapshot;
pub use store::{ListenerId, SnapshotStore};
pub use stream::{SnapshotStream, SnapshotWatchStream};
pub use validate::{ValidatedHost, ValidationError, validate_host};

// Device types consumers need alongside the snapshot.
pub use gaggiuino_api::{
    BoilerSettings, FirmwareProgress, FirmwareUpdateStatus, FirmwareUpdateType, LedColor,
    LedSettings, Profile, ScalesSettings, SettingsGroup, Status, SystemSettings, TlsMode,
    TransportConfig, Versions,
};
