//! Async client for the Gaggiuino espresso machine controller.
//!
//! The controller serves a small JSON API from its web interface. This
//! crate wraps it in [`GaggiuinoClient`], one inherent-method file per
//! endpoint family (status, profiles, settings, firmware), and returns
//! typed [`models`] with lenient decoding for the string-encoded numbers
//! and booleans the firmware emits.
//!
//! Errors separate transient connectivity failures ([`Error::Timeout`],
//! [`Error::Connection`]) from everything else so callers can decide
//! whether cached data is still trustworthy.

pub mod client;
pub mod error;
mod firmware;
mod lenient;
pub mod models;
mod profiles;
mod settings;
mod status;
pub mod transport;

pub use client::{DEFAULT_BASE_URL, GaggiuinoClient, normalize_base_url};
pub use error::Error;
pub use models::{
    BoilerSettings, FirmwareProgress, FirmwareUpdateStatus, FirmwareUpdateType, LedColor,
    LedSettings, Profile, ScalesSettings, Settings, SettingsGroup, Status, SystemSettings,
    Versions,
};
pub use transport::{TlsMode, TransportConfig};
