use std::env;
use std::path::PathBuf;

use ::config::{Config, ConfigError, Environment, File};

use super::schema::Settings;

/// Overrides the config file location.
pub const CONFIG_PATH_VAR: &str = "CADENZA_CONFIG_PATH";
/// Prefix of per-key overrides, e.g. `CADENZA__MEDIA__TICK_MS=100`.
const ENV_PREFIX: &str = "CADENZA";

impl Settings {
    /// Layer struct defaults, the optional config file and `CADENZA__*`
    /// variables, in that order.
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = config_path() {
            builder = builder.add_source(File::from(path).required(false));
        }
        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        let v = self.playback.volume;
        if !v.is_finite() || !(0.0..=1.0).contains(&v) {
            return Err(format!("playback.volume must be within [0, 1], got {v}"));
        }
        if self.media.tick_ms == 0 {
            return Err("media.tick_ms must be >= 1".to_string());
        }
        let step = self.controls.volume_step;
        if !step.is_finite() || step <= 0.0 || step > 1.0 {
            return Err(format!("controls.volume_step must be within (0, 1], got {step}"));
        }
        Ok(())
    }

    /// Render the settings as TOML, suitable as a starting config file.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// `$CADENZA_CONFIG_PATH`, else `config.toml` in the XDG config dir.
pub fn config_path() -> Option<PathBuf> {
    env::var_os(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .or_else(|| xdg_app_dir("XDG_CONFIG_HOME", &[".config"]).map(|d| d.join("config.toml")))
}

/// `$<xdg_var>/cadenza`, falling back to `$HOME/<home_rel...>/cadenza`.
pub(crate) fn xdg_app_dir(xdg_var: &str, home_rel: &[&str]) -> Option<PathBuf> {
    let base = match env::var_os(xdg_var) {
        Some(dir) => PathBuf::from(dir),
        None => {
            let mut home = PathBuf::from(env::var_os("HOME")?);
            home.extend(home_rel);
            home
        }
    };
    Some(base.join("cadenza"))
}
