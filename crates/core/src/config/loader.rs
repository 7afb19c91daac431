use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Variables read by the `reconcile` binary itself rather than by [`Config`].
const INPUT_VARIABLES: &[&str] = &["CONFIG", "LIBRARY", "CATALOG", "NOW", "METRICS_FILE"];

/// Load `reconcile.toml`, then apply `RECONCILE_<SECTION>__<KEY>` overrides.
///
/// `RECONCILE_PLAN__PRESERVE_ORIGINALS=true` sets `plan.preserve_originals`;
/// `RECONCILE_SCAN__MAX_DEPTH=4` sets `scan.max_depth`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    Figment::new()
        .merge(Toml::file(path))
        .merge(
            Env::prefixed("RECONCILE_")
                .ignore(INPUT_VARIABLES)
                .split("__"),
        )
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Parse a TOML document without environment overrides.
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
