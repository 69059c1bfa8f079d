//! Installs the global `tracing` subscriber from [`config::Logger`].

use tracing_subscriber::EnvFilter;

use crate::{
    config::{self, Format},
    Error, Result,
};

/// Installs a `tracing-subscriber` formatter for the configured level and
/// format. `RUST_LOG` takes precedence over `level`; `override_filter` takes
/// precedence over both.
///
/// Returns `false` when logging is disabled or a global subscriber is
/// already installed, so calling it more than once is harmless.
///
/// # Errors
///
/// Returns [`Error::Config`] when the filter directives cannot be parsed.
pub fn init(config: &config::Logger) -> Result<bool> {
    if !config.enable {
        return Ok(false);
    }

    let filter = filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.format {
        Format::Compact => builder.compact().try_init(),
        Format::Pretty => builder.pretty().try_init(),
        Format::Json => builder.json().try_init(),
    };
    Ok(installed.is_ok())
}

fn filter(config: &config::Logger) -> Result<EnvFilter> {
    if let Some(directives) = &config.override_filter {
        return EnvFilter::try_new(directives)
            .map_err(|err| Error::Config(format!("override_filter `{directives}`: {err}")));
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(config.level.to_string())
        .map_err(|err| Error::Config(format!("level `{}`: {err}", config.level)))
}
