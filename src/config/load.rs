use std::{
    env,
    path::{Path, PathBuf},
};

use thiserror::Error;

use super::schema::Settings;

/// A loaded config whose values are out of range.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{field} {problem}")]
pub struct InvalidSetting {
    pub field: &'static str,
    pub problem: String,
}

fn invalid(field: &'static str, problem: impl Into<String>) -> InvalidSetting {
    InvalidSetting {
        field,
        problem: problem.into(),
    }
}

/// Configuration loading helpers.
///
/// Environment variables (prefix `CUELOOP__`) win over the config file, which
/// wins over struct defaults.
impl Settings {
    /// Load settings, reading `explicit` instead of the default config file
    /// when given. An explicit file must exist.
    pub fn load_with_path(explicit: Option<&Path>) -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();

        match explicit {
            Some(path) => {
                builder = builder.add_source(::config::File::from(path).required(true));
            }
            None => {
                if let Some(path) = resolve_config_path() {
                    builder =
                        builder.add_source(::config::File::from(path.as_path()).required(false));
                }
            }
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("CUELOOP")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), InvalidSetting> {
        let v = self.playback.default_volume;
        if !(0.0..=1.0).contains(&v) {
            return Err(invalid(
                "playback.default_volume",
                format!("must be within 0.0..=1.0, got {v}"),
            ));
        }
        let step = self.playback.volume_step;
        if !(step > 0.0 && step <= 1.0) {
            return Err(invalid(
                "playback.volume_step",
                format!("must be within (0.0, 1.0], got {step}"),
            ));
        }
        if self.audio.tick_ms == 0 {
            return Err(invalid("audio.tick_ms", "must be >= 1"));
        }
        if self.intake.mime_types.is_empty() && self.intake.extensions.is_empty() {
            return Err(invalid(
                "intake",
                "needs at least one of mime_types or extensions",
            ));
        }
        Ok(())
    }
}

/// Resolve the config path from `CUELOOP_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("CUELOOP_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

fn xdg_dir(var: &str, home_fallback: &[&str]) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| home_fallback.iter().fold(PathBuf::from(home), |p, s| p.join(s)))
    }
}

/// Compute the default config path under `$XDG_CONFIG_HOME/cueloop/config.toml`
/// or `~/.config/cueloop/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", &[".config"]).map(|d| d.join("cueloop").join("config.toml"))
}

/// Default log directory: `$XDG_STATE_HOME/cueloop` or `~/.local/state/cueloop`.
pub fn default_log_dir() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", &[".local", "state"]).map(|d| d.join("cueloop"))
}
