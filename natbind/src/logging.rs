//! Subscriber setup for the `tracing` events emitted by the generator crates.

use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber when `NATBIND_LOG` or `RUST_LOG` is set.
///
/// `NATBIND_LOG_FORMAT=json` emits one JSON object per event; anything else
/// uses the compact text format.
pub fn init() {
    let Some(filter) = env_filter() else {
        return;
    };

    let json = std::env::var("NATBIND_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    // A subscriber may already be installed when embedded in tests.
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.compact().without_time().try_init()
    };
    if installed.is_ok() {
        tracing::debug!(json, "tracing initialized");
    }
}

fn env_filter() -> Option<EnvFilter> {
    EnvFilter::try_from_env("NATBIND_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .ok()
}
