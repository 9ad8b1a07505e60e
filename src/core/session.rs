//! Process-wide default display settings.
//!
//! This is the one piece of shared mutable state in the crate: a single
//! binding read by `api::display_with_defaults`. Writers replace it wholesale
//! (last writer wins). Everything else takes `DisplaySettings` explicitly.
use std::sync::RwLock;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::core::params::DisplaySettings;

static DEFAULT_SETTINGS: Lazy<RwLock<DisplaySettings>> =
    Lazy::new(|| RwLock::new(DisplaySettings::default()));

/// Snapshot of the current default settings.
pub fn default_settings() -> DisplaySettings {
    match DEFAULT_SETTINGS.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Replace the default settings used by later `display_with_defaults` calls.
pub fn set_default_settings(settings: DisplaySettings) {
    debug!("Updating default display settings: {:?}", settings);
    match DEFAULT_SETTINGS.write() {
        Ok(mut guard) => *guard = settings,
        Err(poisoned) => *poisoned.into_inner() = settings,
    }
}

pub fn reset_default_settings() {
    set_default_settings(DisplaySettings::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so parallel test threads never race on the shared binding.
    #[test]
    fn last_writer_wins_and_reset_restores_defaults() {
        set_default_settings(DisplaySettings {
            frame: Some(2),
            ..Default::default()
        });
        set_default_settings(DisplaySettings {
            frame: Some(3),
            z1: Some(1.0),
            ..Default::default()
        });
        let current = default_settings();
        assert_eq!(current.frame, Some(3));
        assert_eq!(current.z1, Some(1.0));

        reset_default_settings();
        let current = default_settings();
        assert_eq!(current.frame, None);
        assert_eq!(current.z1, None);
    }
}
