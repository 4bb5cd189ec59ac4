//! `platera config` handlers.

use anyhow::{Context, Result};
use platera_core::FileStore;
use platera_core::config::{self, Config};

/// Prints where configuration and session state live.
pub fn path() {
    println!("config:  {}", config::paths::config_path().display());
    println!("session: {}", FileStore::default_path().display());
}

pub fn init() -> Result<()> {
    let config_path = config::paths::config_path();
    Config::init(&config_path)
        .with_context(|| format!("init config at {}", config_path.display()))?;
    println!("Created config at {}", config_path.display());
    Ok(())
}

/// Prints the effective settings after env overrides.
pub fn show(config: &Config) -> Result<()> {
    let base_url = config.base_url()?;
    let source = if std::env::var(config::API_URL_ENV).is_ok_and(|v| !v.trim().is_empty()) {
        config::API_URL_ENV
    } else if config.api.base_url.as_deref().is_some_and(|u| !u.trim().is_empty()) {
        "config"
    } else {
        "default"
    };

    println!("api.base_url     = {base_url} ({source})");
    println!("api.timeout_secs = {}", config.timeout().as_secs());
    println!("log_level        = {}", config.log_level);
    Ok(())
}
