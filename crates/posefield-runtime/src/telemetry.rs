//! `tracing` subscriber initialisation for PoseField.
//!
//! Call [`init_tracing`] once at process startup.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `POSEFIELD_LOG_FORMAT=json` | Emit newline-delimited JSON logs. |

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise the global `tracing` subscriber.
///
/// Honours `RUST_LOG` for filtering and switches to JSON output when
/// `POSEFIELD_LOG_FORMAT=json` is set. Must be called at most once per
/// process; a second call panics in `tracing-subscriber`.
pub fn init_tracing() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if use_json_format() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    }
}

/// Whether `POSEFIELD_LOG_FORMAT` requests JSON output.
fn use_json_format() -> bool {
    std::env::var("POSEFIELD_LOG_FORMAT").as_deref() == Ok("json")
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so parallel test threads never race on the env-var.
    #[test]
    fn json_format_follows_env_var() {
        // SAFETY: no other test reads or writes this env-var.
        unsafe { std::env::remove_var("POSEFIELD_LOG_FORMAT") };
        assert!(!use_json_format());
        unsafe { std::env::set_var("POSEFIELD_LOG_FORMAT", "pretty") };
        assert!(!use_json_format());
        unsafe { std::env::set_var("POSEFIELD_LOG_FORMAT", "json") };
        assert!(use_json_format());
        unsafe { std::env::remove_var("POSEFIELD_LOG_FORMAT") };
    }
}
