//! Theme and width preferences
//!
//! Preferences live in the visitor's browser (`localStorage`). This module
//! owns the allowed values, the storage keys and the resolution rules; the
//! generator turns them into the inline init script and `js/ui.js`.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// localStorage key for the colour theme
pub const THEME_STORAGE_KEY: &str = "theme";

/// localStorage key for the content width
pub const WIDTH_STORAGE_KEY: &str = "width-mode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub const ALL: [ThemeMode; 2] = [ThemeMode::Light, ThemeMode::Dark];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == value)
    }

    /// Stored value wins, then the system colour scheme
    pub fn resolve(stored: Option<&str>, prefers_dark: bool) -> Self {
        match stored.and_then(Self::parse) {
            Some(mode) => mode,
            None if prefers_dark => ThemeMode::Dark,
            None => ThemeMode::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    /// Accessible label of the toggle button while this mode is active
    pub fn toggle_label(self) -> &'static str {
        match self {
            ThemeMode::Light => "Switch to dark mode",
            ThemeMode::Dark => "Switch to light mode",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WidthMode {
    Narrow,
    #[default]
    Standard,
    Wide,
}

impl WidthMode {
    pub const ALL: [WidthMode; 3] = [WidthMode::Narrow, WidthMode::Standard, WidthMode::Wide];

    pub fn as_str(self) -> &'static str {
        match self {
            WidthMode::Narrow => "narrow",
            WidthMode::Standard => "standard",
            WidthMode::Wide => "wide",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WidthMode::Narrow => "Narrow",
            WidthMode::Standard => "Standard",
            WidthMode::Wide => "Wide",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == value)
    }

    pub fn resolve(stored: Option<&str>) -> Self {
        stored.and_then(Self::parse).unwrap_or_default()
    }
}

impl fmt::Display for WidthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Width choice as exposed to templates
#[derive(Debug, Clone, Serialize)]
pub struct WidthOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Everything templates need to render the preference widgets
#[derive(Debug, Clone, Serialize)]
pub struct PreferenceData {
    pub theme_key: &'static str,
    pub width_key: &'static str,
    pub default_theme: &'static str,
    pub default_width: &'static str,
    pub themes: Vec<&'static str>,
    /// Theme each mode switches to when the toggle is clicked
    pub next_theme: IndexMap<&'static str, &'static str>,
    /// Toggle button label while each mode is active
    pub theme_labels: IndexMap<&'static str, &'static str>,
    pub default_label: &'static str,
    pub width_options: Vec<WidthOption>,
}

impl Default for PreferenceData {
    fn default() -> Self {
        Self {
            theme_key: THEME_STORAGE_KEY,
            width_key: WIDTH_STORAGE_KEY,
            default_theme: ThemeMode::default().as_str(),
            default_width: WidthMode::default().as_str(),
            themes: ThemeMode::ALL.iter().map(|m| m.as_str()).collect(),
            next_theme: ThemeMode::ALL
                .iter()
                .map(|m| (m.as_str(), m.toggled().as_str()))
                .collect(),
            theme_labels: ThemeMode::ALL
                .iter()
                .map(|m| (m.as_str(), m.toggle_label()))
                .collect(),
            default_label: ThemeMode::default().toggle_label(),
            width_options: WidthMode::ALL
                .iter()
                .map(|m| WidthOption {
                    value: m.as_str(),
                    label: m.label(),
                })
                .collect(),
        }
    }
}

/// Script run in `<head>` before paint so the stored theme and width apply
/// without a flash of the defaults
pub fn init_script() -> String {
    let themes = js_list(ThemeMode::ALL.iter().map(|m| m.as_str()));
    let widths = js_list(WidthMode::ALL.iter().map(|m| m.as_str()));

    format!(
        r#"(() => {{
  try {{
    const root = document.documentElement;
    const storedTheme = window.localStorage.getItem("{theme_key}");
    const prefersDark = window.matchMedia("(prefers-color-scheme: dark)").matches;
    const theme = [{themes}].includes(storedTheme)
      ? storedTheme
      : (prefersDark ? "{system_dark}" : "{system_light}");
    root.setAttribute("data-theme", theme);

    const storedWidth = window.localStorage.getItem("{width_key}");
    const width = [{widths}].includes(storedWidth) ? storedWidth : "{fallback_width}";
    root.setAttribute("data-width", width);
  }} catch {{
    document.documentElement.setAttribute("data-theme", "{default_theme}");
    document.documentElement.setAttribute("data-width", "{default_width}");
  }}
}})();"#,
        theme_key = THEME_STORAGE_KEY,
        width_key = WIDTH_STORAGE_KEY,
        themes = themes,
        widths = widths,
        system_dark = ThemeMode::resolve(None, true),
        system_light = ThemeMode::resolve(None, false),
        fallback_width = WidthMode::resolve(None),
        default_theme = ThemeMode::default(),
        default_width = WidthMode::default(),
    )
}

/// Quoted, comma separated values for a JS array literal
fn js_list<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .map(|v| format!("\"{}\"", v))
        .collect::<Vec<_>>()
        .join(", ")
}
