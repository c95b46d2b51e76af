//! Accessibility preferences
//!
//! The preference record persisted in the key-value store. Values are stored
//! as strings; an absent or unparsable key means "use the default".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::storage::Storage;
use crate::A11yError;

pub const KEY_FONT_SIZE: &str = "accessibility-font-size";
pub const KEY_COLOR_THEME: &str = "accessibility-color-theme";
pub const KEY_SCREEN_READER: &str = "accessibility-screen-reader";
pub const KEY_HIGH_CONTRAST: &str = "accessibility-high-contrast";
pub const KEY_REDUCE_MOTION: &str = "accessibility-reduce-motion";
pub const KEY_FOCUS_INDICATORS: &str = "accessibility-focus-indicators";

pub const FONT_SIZE_MIN: u32 = 80;
pub const FONT_SIZE_MAX: u32 = 150;
pub const FONT_SIZE_DEFAULT: u32 = 100;

/// Clamp a font size percentage into the supported range
pub fn clamp_font_size(percent: u32) -> u32 {
    percent.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX)
}

/// Color theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTheme {
    Light,
    Dark,
    #[default]
    System,
}

impl ColorTheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    /// Resolve `System` against the platform color scheme
    pub fn is_dark(self, system_prefers_dark: bool) -> bool {
        match self {
            Self::Light => false,
            Self::Dark => true,
            Self::System => system_prefers_dark,
        }
    }
}

impl fmt::Display for ColorTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorTheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(format!("unknown color theme: {other}")),
        }
    }
}

/// Named font size preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSizePreset {
    pub name: &'static str,
    pub percent: u32,
}

pub const FONT_SIZE_PRESETS: [FontSizePreset; 4] = [
    FontSizePreset { name: "Small", percent: 85 },
    FontSizePreset { name: "Medium", percent: 100 },
    FontSizePreset { name: "Large", percent: 115 },
    FontSizePreset { name: "Extra Large", percent: 130 },
];

impl FontSizePreset {
    /// Look up a preset by name (case-insensitive)
    pub fn find(name: &str) -> Option<Self> {
        FONT_SIZE_PRESETS
            .iter()
            .copied()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
    }
}

/// Persisted accessibility preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceRecord {
    pub font_size_percent: u32,
    pub color_theme: ColorTheme,
    pub screen_reader_enabled: bool,
    pub high_contrast: bool,
    pub reduce_motion: bool,
    pub focus_indicators: bool,
}

impl Default for PreferenceRecord {
    fn default() -> Self {
        Self {
            font_size_percent: FONT_SIZE_DEFAULT,
            color_theme: ColorTheme::System,
            screen_reader_enabled: false,
            high_contrast: false,
            reduce_motion: false,
            focus_indicators: false,
        }
    }
}

impl PreferenceRecord {
    /// Read from storage, falling back to defaults per key
    pub fn load(storage: &Storage) -> Self {
        let defaults = Self::default();
        let font_size_percent = storage
            .get_item(KEY_FONT_SIZE)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .map(clamp_font_size)
            .unwrap_or(defaults.font_size_percent);
        let color_theme = storage
            .get_item(KEY_COLOR_THEME)
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.color_theme);

        Self {
            font_size_percent,
            color_theme,
            screen_reader_enabled: load_bool(storage, KEY_SCREEN_READER),
            high_contrast: load_bool(storage, KEY_HIGH_CONTRAST),
            reduce_motion: load_bool(storage, KEY_REDUCE_MOTION),
            focus_indicators: load_bool(storage, KEY_FOCUS_INDICATORS),
        }
    }

    /// Write every field
    pub fn save(&self, storage: &mut Storage) -> Result<(), A11yError> {
        storage.set_item(KEY_FONT_SIZE, &self.font_size_percent.to_string())?;
        storage.set_item(KEY_COLOR_THEME, self.color_theme.as_str())?;
        save_bool(storage, KEY_SCREEN_READER, self.screen_reader_enabled)?;
        save_bool(storage, KEY_HIGH_CONTRAST, self.high_contrast)?;
        save_bool(storage, KEY_REDUCE_MOTION, self.reduce_motion)?;
        save_bool(storage, KEY_FOCUS_INDICATORS, self.focus_indicators)
    }
}

fn load_bool(storage: &Storage, key: &str) -> bool {
    storage.get_item(key) == Some("true")
}

pub(crate) fn save_bool(storage: &mut Storage, key: &str, value: bool) -> Result<(), A11yError> {
    storage.set_item(key, if value { "true" } else { "false" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_on_empty_storage() {
        let storage = Storage::session();
        let record = PreferenceRecord::load(&storage);
        assert_eq!(record, PreferenceRecord::default());
        assert_eq!(record.font_size_percent, 100);
        assert_eq!(record.color_theme, ColorTheme::System);
    }

    #[test]
    fn test_load_parses_and_clamps() {
        let mut storage = Storage::session();
        storage.set_item(KEY_FONT_SIZE, "400").unwrap();
        storage.set_item(KEY_COLOR_THEME, "Dark").unwrap();
        storage.set_item(KEY_SCREEN_READER, "true").unwrap();
        storage.set_item(KEY_REDUCE_MOTION, "yes").unwrap();

        let record = PreferenceRecord::load(&storage);
        assert_eq!(record.font_size_percent, 150);
        assert_eq!(record.color_theme, ColorTheme::Dark);
        assert!(record.screen_reader_enabled);
        assert!(!record.reduce_motion);
    }

    #[test]
    fn test_garbage_values_fall_back() {
        let mut storage = Storage::session();
        storage.set_item(KEY_FONT_SIZE, "big").unwrap();
        storage.set_item(KEY_COLOR_THEME, "sepia").unwrap();

        let record = PreferenceRecord::load(&storage);
        assert_eq!(record.font_size_percent, 100);
        assert_eq!(record.color_theme, ColorTheme::System);
    }

    #[test]
    fn test_save_writes_string_values() {
        let mut storage = Storage::session();
        let record = PreferenceRecord {
            font_size_percent: 115,
            color_theme: ColorTheme::Light,
            focus_indicators: true,
            ..Default::default()
        };
        record.save(&mut storage).unwrap();

        assert_eq!(storage.get_item(KEY_FONT_SIZE), Some("115"));
        assert_eq!(storage.get_item(KEY_COLOR_THEME), Some("light"));
        assert_eq!(storage.get_item(KEY_FOCUS_INDICATORS), Some("true"));
        assert_eq!(storage.get_item(KEY_SCREEN_READER), Some("false"));
        assert_eq!(PreferenceRecord::load(&storage), record);
    }

    #[test]
    fn test_presets() {
        assert_eq!(FontSizePreset::find("extra large").map(|p| p.percent), Some(130));
        assert!(FontSizePreset::find("Huge").is_none());
        assert!(FONT_SIZE_PRESETS
            .iter()
            .all(|p| clamp_font_size(p.percent) == p.percent));
    }

    #[test]
    fn test_theme_resolution() {
        assert!(ColorTheme::System.is_dark(true));
        assert!(!ColorTheme::System.is_dark(false));
        assert!(!ColorTheme::Light.is_dark(true));
        assert_eq!("system".parse::<ColorTheme>(), Ok(ColorTheme::System));
    }
}
