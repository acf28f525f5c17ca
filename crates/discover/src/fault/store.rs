//! Session-scoped storage for the fault configuration.
//!
//! The configuration is written by an external debug surface and read
//! once per outbound request — never cached across requests — so a
//! flipped setting takes effect on the very next call.

use parking_lot::RwLock;

use super::config::FaultConfig;

/// Read side of the fault-config storage. Implementations must never
/// fail; an unreadable value is reported as `None` and degrades to the
/// off configuration.
pub trait FaultConfigSource: Send + Sync {
    /// The raw stored JSON string, if any.
    fn load_raw(&self) -> Option<String>;

    /// Parsed view of the stored value.
    fn load(&self) -> FaultConfig {
        FaultConfig::from_raw(self.load_raw().as_deref())
    }
}

/// Always-off source for production builds.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFaults;

impl FaultConfigSource for NoFaults {
    fn load_raw(&self) -> Option<String> {
        None
    }
}

/// In-memory stand-in for session storage. Writers serialize the config
/// (or store an arbitrary raw string, which lets tests exercise the
/// corrupted-storage path); readers re-parse on every load.
#[derive(Debug, Default)]
pub struct SessionFaultStore {
    raw: RwLock<Option<String>>,
}

impl SessionFaultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&self, config: &FaultConfig) {
        let raw = serde_json::to_string(config).unwrap_or_default();
        *self.raw.write() = Some(raw);
    }

    pub fn write_raw(&self, raw: impl Into<String>) {
        *self.raw.write() = Some(raw.into());
    }

    pub fn clear(&self) {
        *self.raw.write() = None;
    }
}

impl FaultConfigSource for SessionFaultStore {
    fn load_raw(&self) -> Option<String> {
        self.raw.read().clone()
    }
}
