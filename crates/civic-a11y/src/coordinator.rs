//! Announcement Coordinator
//!
//! Decides whether, when and what to announce. Every announcement goes
//! through one gate:
//!
//! 1. the caller says the feature is active
//! 2. the coordinator is enabled
//! 3. font-size messages are not suppressed
//! 4. the cooldown since the last *accepted* announcement has elapsed
//!
//! Accepted messages replace the live region content, cancel in-flight
//! speech, and are spoken again after a short re-delivery delay.

use civic_dom::{NodeId, SharedDocument};

use crate::clock::{Clock, SystemClock};
use crate::config::CoordinatorConfig;
use crate::live_region::{DomLiveRegion, LiveRegionSink, NullLiveRegion};
use crate::observation::Observation;
use crate::preferences::{save_bool, PreferenceRecord, FONT_SIZE_DEFAULT, KEY_SCREEN_READER};
use crate::scheduler::SpeechScheduler;
use crate::speech::{NullSpeech, SpeechOutput};
use crate::storage::SharedStorage;

/// Messages starting with this are subject to font-size suppression
pub const FONT_SIZE_ANNOUNCEMENT_PREFIX: &str = "Font size changed to";

/// Spoken when the screen reader is switched on
pub const SCREEN_READER_ACTIVATED: &str = "Screen reader activated";

/// Screen reader lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenReaderState {
    Enabled,
    Disabled,
}

/// Result of an announcement attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnounceOutcome {
    /// Written to the live region and scheduled for speech
    Delivered,
    /// Accepted, but there is no environment to write into
    Inert,
    /// Caller reported the feature inactive
    Inactive,
    /// Coordinator is disabled
    Disabled,
    /// Font-size message while font-size announcements are suppressed
    Suppressed,
    /// Inside the cooldown window of the previous accepted announcement
    Debounced,
}

impl AnnounceOutcome {
    /// Whether the announcement was accepted (and reset the cooldown)
    pub fn accepted(self) -> bool {
        matches!(self, Self::Delivered | Self::Inert)
    }
}

/// One announcement attempt
#[derive(Debug, Clone, Copy)]
pub struct AnnouncementRequest<'a> {
    pub message: &'a str,
    pub is_active: bool,
    pub timestamp_ms: u64,
}

/// Coordinator state, owned by a single coordinator instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorState {
    pub lifecycle: ScreenReaderState,
    /// Time of the last accepted announcement (None = nothing to wait for)
    pub last_announcement_ms: Option<u64>,
    pub last_font_size: Option<u32>,
    pub suppress_font_size: bool,
    pub is_initial_mount: bool,
}

impl CoordinatorState {
    fn new(enabled: bool) -> Self {
        Self {
            lifecycle: if enabled { ScreenReaderState::Enabled } else { ScreenReaderState::Disabled },
            last_announcement_ms: None,
            last_font_size: None,
            suppress_font_size: false,
            is_initial_mount: true,
        }
    }

    pub fn enabled(&self) -> bool {
        self.lifecycle == ScreenReaderState::Enabled
    }
}

/// Screen-reader announcement coordinator
pub struct AnnouncementCoordinator<S: LiveRegionSink, V: SpeechOutput> {
    config: CoordinatorConfig,
    state: CoordinatorState,
    sink: S,
    speech: V,
    scheduler: SpeechScheduler,
    clock: Box<dyn Clock>,
    storage: SharedStorage,
    observation: Observation,
}

impl<V: SpeechOutput> AnnouncementCoordinator<DomLiveRegion, V> {
    /// Coordinator writing into `document`'s live region and observing it
    pub fn for_document(
        config: CoordinatorConfig,
        document: SharedDocument,
        speech: V,
        storage: SharedStorage,
    ) -> Self {
        let sink = DomLiveRegion::new(document.clone(), config.announcer_id.clone());
        Self::new(config, sink, speech, storage).with_document(document)
    }
}

impl AnnouncementCoordinator<NullLiveRegion, NullSpeech> {
    /// Coordinator for environments without a document or speech engine.
    /// State is tracked, nothing is written.
    pub fn inert(config: CoordinatorConfig, storage: SharedStorage) -> Self {
        tracing::warn!("no document or speech engine; screen reader support is inert");
        Self::new(config, NullLiveRegion, NullSpeech, storage)
    }
}

impl<S: LiveRegionSink, V: SpeechOutput> AnnouncementCoordinator<S, V> {
    /// Create a coordinator. The initial lifecycle state comes from the
    /// persisted screen reader preference.
    pub fn new(config: CoordinatorConfig, sink: S, speech: V, storage: SharedStorage) -> Self {
        let enabled = PreferenceRecord::load(&storage.borrow()).screen_reader_enabled;
        let observation = Observation::new(None, &config);
        Self {
            config,
            state: CoordinatorState::new(enabled),
            sink,
            speech,
            scheduler: SpeechScheduler::new(),
            clock: Box::new(SystemClock::new()),
            storage,
            observation,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Observe focus and insertions in `document`
    pub fn with_document(mut self, document: SharedDocument) -> Self {
        self.observation.stop();
        self.observation = Observation::new(Some(document), &self.config);
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn state(&self) -> &CoordinatorState {
        &self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn speech(&self) -> &V {
        &self.speech
    }

    pub fn observation(&self) -> &Observation {
        &self.observation
    }

    pub fn scheduler(&self) -> &SpeechScheduler {
        &self.scheduler
    }

    /// Bring up observation for an initially enabled screen reader and
    /// announce activation. Does nothing while disabled.
    pub fn mount(&mut self) {
        if !self.is_enabled() {
            return;
        }
        self.observe_interactive_focus();
        self.announce(SCREEN_READER_ACTIVATED, true);
    }

    /// Try to announce `message`. Never fails; see `AnnounceOutcome`.
    pub fn announce(&mut self, message: &str, is_active: bool) -> AnnounceOutcome {
        let request = AnnouncementRequest {
            message,
            is_active,
            timestamp_ms: self.clock.now_ms(),
        };
        self.dispatch(request)
    }

    fn dispatch(&mut self, request: AnnouncementRequest<'_>) -> AnnounceOutcome {
        if !request.is_active {
            return AnnounceOutcome::Inactive;
        }
        if !self.is_enabled() {
            return AnnounceOutcome::Disabled;
        }
        if self.state.suppress_font_size && request.message.starts_with(FONT_SIZE_ANNOUNCEMENT_PREFIX) {
            tracing::debug!(message = request.message, "font size announcement suppressed");
            return AnnounceOutcome::Suppressed;
        }
        if let Some(last) = self.state.last_announcement_ms {
            if request.timestamp_ms.saturating_sub(last) < self.config.cooldown_ms {
                tracing::debug!(message = request.message, "announcement debounced");
                return AnnounceOutcome::Debounced;
            }
        }

        self.state.last_announcement_ms = Some(request.timestamp_ms);

        if !self.sink.is_available() {
            return AnnounceOutcome::Inert;
        }

        if let Err(e) = self.sink.write(request.message) {
            tracing::warn!(error = %e, "live region write failed");
        }

        if self.speech.is_available() {
            if let Err(e) = self.speech.cancel() {
                tracing::warn!(error = %e, "speech cancel failed");
            }
            let due = request.timestamp_ms.saturating_add(self.config.speech_delay_ms);
            self.scheduler.schedule(request.message, due);
        }

        AnnounceOutcome::Delivered
    }

    /// Speak utterances whose re-delivery delay has elapsed. Call from the
    /// host event loop. Returns the number of utterances spoken.
    pub fn run_due_speech(&mut self) -> usize {
        let due = self.scheduler.take_due(self.clock.now_ms());
        if due.is_empty() {
            return 0;
        }
        if !self.is_enabled() {
            tracing::debug!(dropped = due.len(), "speech dropped after disable");
            return 0;
        }

        let mut spoken = 0;
        for utterance in due {
            match self.speech.speak(&utterance.text, self.config.speech_rate) {
                Ok(()) => spoken += 1,
                Err(e) => tracing::warn!(error = %e, text = %utterance.text, "speech output failed"),
            }
        }
        spoken
    }

    /// Milliseconds until `run_due_speech` has work
    pub fn time_until_next_speech(&self) -> Option<u64> {
        self.scheduler.time_until_next(self.clock.now_ms())
    }

    /// Switch the screen reader on or off. Repeated calls with the same
    /// value do nothing.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.is_enabled() {
            return;
        }

        if enabled {
            self.state.lifecycle = ScreenReaderState::Enabled;
            self.state.suppress_font_size = false;
            self.persist_enabled(true);
            tracing::info!("screen reader enabled");
            self.observe_interactive_focus();
            self.announce(SCREEN_READER_ACTIVATED, true);
        } else {
            // Flag first: anything reached from the steps below must see Disabled.
            self.state.lifecycle = ScreenReaderState::Disabled;
            self.silence();
            self.state.suppress_font_size = true;
            self.stop_observing_interactive_focus();
            self.persist_enabled(false);
            tracing::info!("screen reader disabled");
        }
    }

    /// Panel unmount: force Disabled and silence everything. Runs whether or
    /// not the screen reader was on; the stored preference is left untouched.
    pub fn teardown(&mut self) {
        self.state.lifecycle = ScreenReaderState::Disabled;
        self.silence();
        self.stop_observing_interactive_focus();
    }

    /// Drop pending speech, cancel the engine, empty the live region. The
    /// cancelled announcement no longer holds the cooldown.
    fn silence(&mut self) {
        self.scheduler.clear();
        self.state.last_announcement_ms = None;
        if self.speech.is_available() {
            if let Err(e) = self.speech.cancel() {
                tracing::warn!(error = %e, "speech cancel failed");
            }
        }
        if let Err(e) = self.sink.clear() {
            tracing::warn!(error = %e, "live region clear failed");
        }
    }

    /// Report the current font size. Announces real changes only: never the
    /// first report after mount, a repeated value, the default 100%, or
    /// anything while font-size announcements are suppressed.
    pub fn report_font_size_change(&mut self, percent: u32) -> Option<AnnounceOutcome> {
        let previous = self.state.last_font_size.replace(percent);

        if self.state.is_initial_mount {
            self.state.is_initial_mount = false;
            return None;
        }
        if previous == Some(percent) || percent == FONT_SIZE_DEFAULT || self.state.suppress_font_size {
            return None;
        }

        let enabled = self.is_enabled();
        Some(self.announce(&format!("{FONT_SIZE_ANNOUNCEMENT_PREFIX} {percent} percent"), enabled))
    }

    /// Attach focus listeners and the insertion observer. Failure leaves the
    /// feature off for this session.
    pub fn observe_interactive_focus(&mut self) {
        if !self.observation.has_document() {
            tracing::debug!("no document to observe");
            return;
        }
        if let Err(e) = self.observation.start() {
            tracing::warn!(error = %e, "focus observation unavailable");
        }
    }

    pub fn stop_observing_interactive_focus(&mut self) {
        self.observation.stop();
    }

    /// Move focus to `node`; announces its description if it carries one of
    /// our focus listeners.
    pub fn focus(&mut self, node: NodeId) -> Option<AnnounceOutcome> {
        let description = self.observation.focus(node)?;
        Some(self.announce(&description, true))
    }

    /// Handle queued insertions: at most one announcement per batch
    pub fn process_mutations(&mut self) -> Option<AnnounceOutcome> {
        let text = self.observation.take_inserted_announcement()?;
        Some(self.announce(&text, true))
    }

    fn persist_enabled(&self, enabled: bool) {
        let result = match self.storage.try_borrow_mut() {
            Ok(mut storage) => save_bool(&mut storage, KEY_SCREEN_READER, enabled),
            Err(_) => {
                tracing::warn!("storage busy; screen reader preference not saved");
                return;
            }
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist screen reader preference");
        }
    }
}

impl<S: LiveRegionSink, V: SpeechOutput> Drop for AnnouncementCoordinator<S, V> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<S: LiveRegionSink, V: SpeechOutput> std::fmt::Debug for AnnouncementCoordinator<S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnouncementCoordinator")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("scheduler", &self.scheduler)
            .field("observation", &self.observation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::live_region::MemoryLiveRegion;
    use crate::speech::RecordingSpeech;
    use crate::storage::Storage;

    type TestCoordinator = AnnouncementCoordinator<MemoryLiveRegion, RecordingSpeech>;

    fn coordinator(enabled: bool) -> (TestCoordinator, ManualClock, SharedStorage) {
        let storage = Storage::session().into_shared();
        save_bool(&mut storage.borrow_mut(), KEY_SCREEN_READER, enabled).unwrap();
        let clock = ManualClock::new(1_000);
        let coordinator = AnnouncementCoordinator::new(
            CoordinatorConfig::default(),
            MemoryLiveRegion::new(),
            RecordingSpeech::new(),
            storage.clone(),
        )
        .with_clock(clock.clone());
        (coordinator, clock, storage)
    }

    #[test]
    fn test_initial_state_from_storage() {
        let (on, _, _) = coordinator(true);
        assert!(on.is_enabled());
        let (off, _, _) = coordinator(false);
        assert!(!off.is_enabled());
        assert!(off.state().is_initial_mount);
    }

    #[test]
    fn test_gate_order() {
        let (mut c, _, _) = coordinator(false);
        assert_eq!(c.announce("Hello", false), AnnounceOutcome::Inactive);
        assert_eq!(c.announce("Hello", true), AnnounceOutcome::Disabled);

        c.set_enabled(true);
        c.state.suppress_font_size = true;
        assert_eq!(
            c.announce("Font size changed to 120 percent", true),
            AnnounceOutcome::Suppressed
        );
        assert_eq!(c.announce("Hello", true), AnnounceOutcome::Debounced);
    }

    #[test]
    fn test_rejected_attempts_keep_cooldown_baseline() {
        let (mut c, clock, _) = coordinator(true);
        assert!(c.announce("first", true).accepted());
        clock.advance(200);
        assert_eq!(c.announce("second", true), AnnounceOutcome::Debounced);
        clock.advance(100);
        assert_eq!(c.announce("third", true), AnnounceOutcome::Delivered);
        assert_eq!(c.sink().history(), &["first".to_string(), "third".to_string()]);
    }

    #[test]
    fn test_speech_is_delayed() {
        let (mut c, clock, _) = coordinator(true);
        c.announce("Dark theme applied", true);
        assert_eq!(c.speech().cancel_count(), 1);
        assert!(c.speech().spoken().is_empty());
        assert_eq!(c.time_until_next_speech(), Some(10));

        clock.advance(9);
        assert_eq!(c.run_due_speech(), 0);
        clock.advance(1);
        assert_eq!(c.run_due_speech(), 1);
        assert_eq!(c.speech().spoken(), vec!["Dark theme applied"]);
    }

    #[test]
    fn test_set_enabled_persists() {
        let (mut c, _, storage) = coordinator(false);
        c.set_enabled(true);
        assert_eq!(storage.borrow().get_item(KEY_SCREEN_READER), Some("true"));
        c.set_enabled(false);
        assert_eq!(storage.borrow().get_item(KEY_SCREEN_READER), Some("false"));
        assert!(c.state().suppress_font_size);
    }

    #[test]
    fn test_font_size_rules() {
        let (mut c, clock, _) = coordinator(true);
        assert_eq!(c.report_font_size_change(120), None);
        clock.advance(1_000);
        assert_eq!(c.report_font_size_change(120), None);
        assert_eq!(c.report_font_size_change(100), None);
        assert_eq!(
            c.report_font_size_change(130),
            Some(AnnounceOutcome::Delivered)
        );
        assert_eq!(c.sink().content().as_deref(), Some("Font size changed to 130 percent"));
        assert_eq!(c.state().last_font_size, Some(130));
    }

    #[test]
    fn test_font_size_while_disabled() {
        let (mut c, _, _) = coordinator(false);
        c.report_font_size_change(100);
        assert_eq!(c.report_font_size_change(115), Some(AnnounceOutcome::Inactive));

        c.set_enabled(true);
        c.set_enabled(false);
        assert_eq!(c.report_font_size_change(130), None);
        assert_eq!(c.state().last_font_size, Some(130));
    }

    #[test]
    fn test_teardown_keeps_preference() {
        let (mut c, clock, storage) = coordinator(true);
        c.mount();
        assert_eq!(c.sink().content().as_deref(), Some(SCREEN_READER_ACTIVATED));

        c.teardown();
        assert!(!c.is_enabled());
        assert_eq!(c.sink().content().as_deref(), Some(""));
        clock.advance(50);
        assert_eq!(c.run_due_speech(), 0);
        assert_eq!(storage.borrow().get_item(KEY_SCREEN_READER), Some("true"));
    }

    #[test]
    fn test_inert_coordinator_tracks_state() {
        let storage = Storage::session().into_shared();
        save_bool(&mut storage.borrow_mut(), KEY_SCREEN_READER, true).unwrap();
        let clock = ManualClock::new(0);
        let mut c = AnnouncementCoordinator::inert(CoordinatorConfig::default(), storage)
            .with_clock(clock.clone());

        c.mount();
        assert_eq!(c.state().last_announcement_ms, Some(0));
        assert_eq!(c.announce("Hello", true), AnnounceOutcome::Debounced);
        clock.advance(300);
        assert_eq!(c.announce("Hello", true), AnnounceOutcome::Inert);
        assert!(!c.scheduler().has_pending());
    }

    #[test]
    fn test_speech_failure_does_not_block_sink() {
        let storage = Storage::session().into_shared();
        save_bool(&mut storage.borrow_mut(), KEY_SCREEN_READER, true).unwrap();
        let clock = ManualClock::new(0);
        let mut c = AnnouncementCoordinator::new(
            CoordinatorConfig::default(),
            MemoryLiveRegion::new(),
            RecordingSpeech::failing("no voices installed"),
            storage,
        )
        .with_clock(clock.clone());

        assert_eq!(c.announce("Light theme applied", true), AnnounceOutcome::Delivered);
        assert_eq!(c.sink().content().as_deref(), Some("Light theme applied"));
        clock.advance(10);
        assert_eq!(c.run_due_speech(), 0);
    }
}
