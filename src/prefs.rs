//! User preferences and layout state.
//!
//! The theme is the only value persisted across runs. Layout (sidebar/mobile)
//! is derived from the viewport width and lives only in memory; the CLI has
//! no viewport, so [`Layout`] is exposed for front ends embedding the library.

use crate::error::PrefsError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefs {
    #[serde(default)]
    pub theme: Theme,
}

impl Prefs {
    /// `<config dir>/popdash/prefs.json`
    pub fn default_path() -> Result<PathBuf, PrefsError> {
        dirs::config_dir()
            .map(|d| d.join("popdash").join("prefs.json"))
            .ok_or(PrefsError::NoConfigDir)
    }

    /// Read preferences; a missing or unreadable file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                log::warn!("ignoring invalid preferences at {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PrefsError> {
        let path = path.as_ref();
        let write_err = |source| PrefsError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(write_err)?;
        }
        let s = serde_json::to_string_pretty(self)?;
        fs::write(path, s).map_err(write_err)
    }
}

/// Widths at or below this are laid out as mobile.
pub const MOBILE_MAX_WIDTH: u32 = 820;

/// Sidebar/mobile state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub mobile: bool,
    pub sidebar_open: bool,
}

impl Layout {
    /// Desktop widths start with the sidebar open, mobile widths closed.
    pub fn new(width: u32) -> Self {
        let mobile = width <= MOBILE_MAX_WIDTH;
        Self {
            mobile,
            sidebar_open: !mobile,
        }
    }

    /// Crossing the breakpoint resets the sidebar to that side's default.
    pub fn on_resize(&mut self, width: u32) {
        let mobile = width <= MOBILE_MAX_WIDTH;
        if mobile != self.mobile {
            *self = Self::new(width);
        }
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    pub fn close_sidebar(&mut self) {
        self.sidebar_open = false;
    }

    /// Background scrolling is locked while the sidebar overlays a mobile view.
    pub fn scroll_locked(&self) -> bool {
        self.mobile && self.sidebar_open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_follows_breakpoint() {
        let mut l = Layout::new(1200);
        assert!(l.sidebar_open && !l.mobile);
        l.toggle_sidebar();
        l.on_resize(1000);
        assert!(!l.sidebar_open, "same side of the breakpoint keeps user choice");
        l.on_resize(600);
        assert!(l.mobile && !l.sidebar_open);
        l.toggle_sidebar();
        assert!(l.scroll_locked());
        l.close_sidebar();
        assert!(!l.scroll_locked());
    }
}
