//! Reposite CLI Library
//!
//! Runs the site generation pipeline once from the command line: read the
//! AI-drafted content, render it with a template and write the bundle plus
//! its zip archive.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (build, check)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use reposite::cmd::build::{self, BuildArgs};
//!
//! let args = BuildArgs {
//!     content: "README.generated.md".into(),
//!     output: "public".into(),
//!     ..Default::default()
//! };
//! build::run(Path::new("reposite.toml"), &args).unwrap();
//! ```

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};

pub mod cmd {
    pub mod build;
    pub mod check;
}

pub use reposite_core::{Config, SiteGenerationConfig};
pub use reposite_generator::{BuildStats, Builder};

/// Load configuration, falling back to defaults when `path` does not exist.
///
/// `REPOSITE__SECTION__KEY` environment variables override file values.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no configuration file, using defaults");
        return Ok(Config::default());
    }
    Config::load_with_env(path)
        .wrap_err_with(|| format!("Failed to load configuration from {}", path.display()))
}

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
///
/// `RUST_LOG` directives are honoured on top of the level.
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = load_config(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.site.domain, "reposite.dev");
    }

    #[test]
    fn test_load_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("reposite.toml");
        std::fs::write(&path, "[site]\nauthor = \"Acme Inc\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.site.author, "Acme Inc");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("reposite.toml");
        std::fs::write(&path, "[images]\njpeg_quality = 0\n").unwrap();

        assert!(load_config(&path).is_err());
    }
}
