use std::path::Path;

use crate::config;

/// Load settings, falling back to defaults when the file is broken.
///
/// Logging is not up yet when this runs, so the problem (if any) is handed
/// back to the caller to report once it is.
pub fn load_settings(explicit: Option<&Path>) -> (config::Settings, Option<String>) {
    match config::Settings::load_with_path(explicit) {
        Ok(s) => match s.validate() {
            Ok(()) => (s, None),
            Err(e) => (
                config::Settings::default(),
                Some(format!("invalid config, using defaults: {e}")),
            ),
        },
        // Config is optional; failures should not prevent the app from starting.
        Err(e) => (
            config::Settings::default(),
            Some(format!("failed to load config, using defaults: {e}")),
        ),
    }
}
