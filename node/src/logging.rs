//! # Structured Logging
//!
//! Each subcommand logs under a [`LogProfile`] that carries its own default
//! `jpeth_*` directives. `RUST_LOG`, when set and parseable, replaces the
//! profile's defaults entirely:
//!
//! ```text
//! RUST_LOG=jpeth_node=debug,jpeth_contracts=trace
//! ```
//!
//! Output goes to stderr; stdout stays free for `version` and `init` output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Accepts "json" in any case; anything else is `Pretty`.
    pub fn from_str_lossy(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Which subcommand is logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogProfile {
    /// Serving the token: ledger decisions and HTTP traces.
    Run,
    /// One-shot `init`: node messages only.
    Init,
}

impl LogProfile {
    /// Default filter directives when `RUST_LOG` is absent.
    pub fn directives(self) -> &'static str {
        match self {
            LogProfile::Run => "jpeth_node=info,jpeth_contracts=info,tower_http=debug",
            LogProfile::Init => "jpeth_node=info,jpeth_contracts=warn",
        }
    }

    /// Builds the filter, preferring `RUST_LOG` over the profile defaults.
    pub fn env_filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directives()))
    }
}

/// Installs the global subscriber. Call once, before anything logs.
pub fn init_logging(profile: LogProfile, format: LogFormat) {
    let filter = profile.env_filter();
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false),
            )
            .init(),
    }

    tracing::debug!(?profile, ?format, "logging initialized");
}
