//! Accessibility preferences panel
//!
//! Applies the preference record to the document root and routes every
//! announcement through the coordinator.

use civic_dom::{Document, DomError, NodeId, SharedDocument};

use crate::coordinator::{AnnounceOutcome, AnnouncementCoordinator};
use crate::live_region::LiveRegionSink;
use crate::preferences::{
    clamp_font_size, save_bool, ColorTheme, FontSizePreset, PreferenceRecord, FONT_SIZE_DEFAULT,
    KEY_COLOR_THEME, KEY_FOCUS_INDICATORS, KEY_FONT_SIZE, KEY_HIGH_CONTRAST, KEY_REDUCE_MOTION,
};
use crate::speech::SpeechOutput;
use crate::storage::{SharedStorage, Storage};
use crate::A11yError;

pub const PANEL_OPENED: &str = "Accessibility panel opened. Use tab to navigate settings.";
pub const RESETTING: &str = "Resetting accessibility settings to default values";

/// Root classes driven by boolean preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feature {
    HighContrast,
    ReduceMotion,
    FocusIndicators,
}

impl Feature {
    fn class(self) -> &'static str {
        match self {
            Self::HighContrast => "high-contrast",
            Self::ReduceMotion => "reduce-motion",
            Self::FocusIndicators => "focus-visible",
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::HighContrast => KEY_HIGH_CONTRAST,
            Self::ReduceMotion => KEY_REDUCE_MOTION,
            Self::FocusIndicators => KEY_FOCUS_INDICATORS,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::HighContrast => "High contrast mode",
            Self::ReduceMotion => "Reduced motion",
            Self::FocusIndicators => "Focus indicators",
        }
    }
}

/// Preferences panel
#[derive(Debug)]
pub struct PreferencesPanel<S: LiveRegionSink, V: SpeechOutput> {
    coordinator: AnnouncementCoordinator<S, V>,
    document: Option<SharedDocument>,
    storage: SharedStorage,
    prefs: PreferenceRecord,
    prefers_dark: bool,
}

impl<S: LiveRegionSink, V: SpeechOutput> PreferencesPanel<S, V> {
    /// Create a panel over `coordinator`, loading preferences from `storage`
    pub fn new(
        coordinator: AnnouncementCoordinator<S, V>,
        document: Option<SharedDocument>,
        storage: SharedStorage,
    ) -> Self {
        let mut prefs = PreferenceRecord::load(&storage.borrow());
        prefs.screen_reader_enabled = coordinator.is_enabled();
        Self {
            coordinator,
            document,
            storage,
            prefs,
            prefers_dark: false,
        }
    }

    /// Platform color scheme used to resolve `ColorTheme::System`
    pub fn with_system_dark(mut self, prefers_dark: bool) -> Self {
        self.prefers_dark = prefers_dark;
        self
    }

    pub fn coordinator(&self) -> &AnnouncementCoordinator<S, V> {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut AnnouncementCoordinator<S, V> {
        &mut self.coordinator
    }

    pub fn preferences(&self) -> &PreferenceRecord {
        &self.prefs
    }

    fn screen_reader_on(&self) -> bool {
        self.coordinator.is_enabled()
    }

    /// Apply stored preferences to the root and bring the coordinator up.
    /// The initial font size is reported silently.
    pub fn mount(&mut self) {
        self.apply_root();
        self.coordinator.report_font_size_change(self.prefs.font_size_percent);
        self.coordinator.mount();
    }

    /// Announce that the panel opened
    pub fn open_announcement(&mut self) -> AnnounceOutcome {
        let on = self.screen_reader_on();
        self.coordinator.announce(PANEL_OPENED, on)
    }

    /// Unmount: tear the coordinator down
    pub fn close(&mut self) {
        self.coordinator.teardown();
    }

    pub fn set_font_size(&mut self, percent: u32) -> Option<AnnounceOutcome> {
        let percent = clamp_font_size(percent);
        self.prefs.font_size_percent = percent;
        self.with_root(|doc, root| {
            if percent == FONT_SIZE_DEFAULT {
                doc.remove_attribute(root, "style")?;
            } else {
                doc.set_attribute(root, "style", &format!("font-size: {percent}%"))?;
            }
            Ok(())
        });
        self.persist(|storage| storage.set_item(KEY_FONT_SIZE, &percent.to_string()));
        self.coordinator.report_font_size_change(percent)
    }

    /// Apply a named preset; None if the name is unknown
    pub fn apply_preset(&mut self, name: &str) -> Option<AnnounceOutcome> {
        let Some(preset) = FontSizePreset::find(name) else {
            tracing::warn!(name, "unknown font size preset");
            return None;
        };
        self.set_font_size(preset.percent)
    }

    /// Apply and persist `theme`; announces only an actual change
    pub fn set_color_theme(&mut self, theme: ColorTheme) -> Option<AnnounceOutcome> {
        let changed = self.prefs.color_theme != theme;
        self.prefs.color_theme = theme;
        let dark = theme.is_dark(self.prefers_dark);
        self.apply_theme(dark);
        self.persist(|storage| storage.set_item(KEY_COLOR_THEME, theme.as_str()));

        if !changed || !self.screen_reader_on() {
            return None;
        }
        let message = if dark { "Dark theme applied" } else { "Light theme applied" };
        Some(self.coordinator.announce(message, true))
    }

    pub fn set_high_contrast(&mut self, enabled: bool) -> Option<AnnounceOutcome> {
        self.set_feature(Feature::HighContrast, enabled)
    }

    pub fn set_reduce_motion(&mut self, enabled: bool) -> Option<AnnounceOutcome> {
        self.set_feature(Feature::ReduceMotion, enabled)
    }

    pub fn set_focus_indicators(&mut self, enabled: bool) -> Option<AnnounceOutcome> {
        self.set_feature(Feature::FocusIndicators, enabled)
    }

    fn set_feature(&mut self, feature: Feature, enabled: bool) -> Option<AnnounceOutcome> {
        let slot = match feature {
            Feature::HighContrast => &mut self.prefs.high_contrast,
            Feature::ReduceMotion => &mut self.prefs.reduce_motion,
            Feature::FocusIndicators => &mut self.prefs.focus_indicators,
        };
        let changed = *slot != enabled;
        *slot = enabled;

        self.with_root(|doc, root| {
            if let Some(classes) = doc.class_list_mut(root) {
                classes.toggle(feature.class(), Some(enabled));
            }
            Ok(())
        });
        self.persist(|storage| save_bool(storage, feature.key(), enabled));

        if !changed || !self.screen_reader_on() {
            return None;
        }
        let state = if enabled { "enabled" } else { "disabled" };
        Some(self.coordinator.announce(&format!("{} {state}", feature.label()), true))
    }

    /// Switch the screen reader and mirror it on the root
    pub fn toggle_screen_reader(&mut self, enabled: bool) {
        // Marked inactive before the coordinator silences anything
        self.with_root(|doc, root| {
            doc.set_attribute(root, "data-screen-reader-active", bool_str(enabled))?;
            Ok(())
        });
        self.prefs.screen_reader_enabled = enabled;
        self.coordinator.set_enabled(enabled);
    }

    /// Announce the reset, then restore every preference to its default.
    /// The screen reader ends up off.
    pub fn reset(&mut self) {
        if self.screen_reader_on() {
            self.coordinator.announce(RESETTING, true);
        }
        let defaults = PreferenceRecord::default();
        self.set_font_size(defaults.font_size_percent);
        self.set_color_theme(defaults.color_theme);
        self.toggle_screen_reader(defaults.screen_reader_enabled);
        self.set_high_contrast(defaults.high_contrast);
        self.set_reduce_motion(defaults.reduce_motion);
        self.set_focus_indicators(defaults.focus_indicators);
    }

    /// One host event-loop turn: handle queued insertions, then speak
    /// whatever is due.
    pub fn tick(&mut self) -> usize {
        self.coordinator.process_mutations();
        self.coordinator.run_due_speech()
    }

    fn apply_root(&mut self) {
        let prefs = self.prefs.clone();
        let dark = prefs.color_theme.is_dark(self.prefers_dark);
        let reader = self.screen_reader_on();
        self.with_root(|doc, root| {
            if prefs.font_size_percent != FONT_SIZE_DEFAULT {
                doc.set_attribute(root, "style", &format!("font-size: {}%", prefs.font_size_percent))?;
            }
            doc.set_attribute(root, "data-screen-reader-active", bool_str(reader))?;
            if let Some(classes) = doc.class_list_mut(root) {
                classes.toggle(Feature::HighContrast.class(), Some(prefs.high_contrast));
                classes.toggle(Feature::ReduceMotion.class(), Some(prefs.reduce_motion));
                classes.toggle(Feature::FocusIndicators.class(), Some(prefs.focus_indicators));
            }
            Ok(())
        });
        self.apply_theme(dark);
    }

    fn apply_theme(&mut self, dark: bool) {
        self.with_root(|doc, root| {
            if let Some(classes) = doc.class_list_mut(root) {
                classes.remove("theme-light");
                classes.remove("theme-dark");
                if dark {
                    classes.add("dark");
                    classes.add("theme-dark");
                } else {
                    classes.remove("dark");
                    classes.add("theme-light");
                }
            }
            Ok(())
        });
    }

    fn with_root(&self, f: impl FnOnce(&mut Document, NodeId) -> Result<(), DomError>) {
        let Some(document) = &self.document else {
            return;
        };
        let Ok(mut doc) = document.try_borrow_mut() else {
            tracing::warn!("document busy; root attributes not applied");
            return;
        };
        let root = doc.document_element();
        if let Err(e) = f(&mut doc, root) {
            tracing::warn!(error = %e, "failed to update document root");
        }
    }

    fn persist(&self, f: impl FnOnce(&mut Storage) -> Result<(), A11yError>) {
        let Ok(mut storage) = self.storage.try_borrow_mut() else {
            tracing::warn!("storage busy; preference not saved");
            return;
        };
        if let Err(e) = f(&mut storage) {
            tracing::warn!(error = %e, "failed to persist preference");
        }
    }
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
