//! Civic Accessibility
//!
//! Screen-reader support for the civic feedback portal.
//!
//! Features:
//! - Announcement coordinator (cooldown, font-size suppression, enable/disable lifecycle)
//! - Live region sink (assertive, atomic) with DOM, in-memory and null backends
//! - Speech output seam with delayed re-delivery after cancellation
//! - Focus and content-insertion observation with an explicit listener registry
//! - Accessibility preferences persisted in a key-value store
//! - Preferences panel applying settings to the document root

pub mod clock;
pub mod config;
pub mod coordinator;
pub mod describe;
pub mod live_region;
pub mod observation;
pub mod panel;
pub mod preferences;
pub mod scheduler;
pub mod speech;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CoordinatorConfig;
pub use coordinator::{
    AnnounceOutcome, AnnouncementCoordinator, AnnouncementRequest, CoordinatorState,
    ScreenReaderState, FONT_SIZE_ANNOUNCEMENT_PREFIX, SCREEN_READER_ACTIVATED,
};
pub use describe::{describe_focus, is_interactive};
pub use live_region::{DomLiveRegion, LiveRegionSink, MemoryLiveRegion, NullLiveRegion};
pub use observation::Observation;
pub use panel::PreferencesPanel;
pub use preferences::{ColorTheme, FontSizePreset, PreferenceRecord, FONT_SIZE_PRESETS};
pub use scheduler::{PendingUtterance, SpeechScheduler};
pub use speech::{NullSpeech, RecordingSpeech, SpeechError, SpeechEvent, SpeechOutput, TracingSpeech};
pub use storage::{SharedStorage, Storage};

/// Accessibility error
#[derive(Debug, thiserror::Error)]
pub enum A11yError {
    #[error("environment unavailable: {0}")]
    EnvironmentUnavailable(String),

    #[error("speech output failed: {0}")]
    SpeechOutput(#[from] SpeechError),

    #[error("cannot attach listeners: {0}")]
    ListenerAttachment(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("storage entry {key:?} contains a tab or line break")]
    InvalidStorageEntry { key: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("DOM error: {0}")]
    Dom(#[from] civic_dom::DomError),
}
