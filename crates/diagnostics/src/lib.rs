//! Shared diagnostics for the calitp workspace.
//!
//! Lightweight logging facade over emit, configured from the environment:
//! - CALITP_LOG=off (default) - no logs
//! - CALITP_LOG=info - pipeline operations (downloads, saves, resolutions)
//! - CALITP_LOG=debug - per-object detail (listings, decoded partitions)

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

static INIT: Once = Once::new();

/// Initialize diagnostics from the CALITP_LOG environment variable.
///
/// Call once at startup; later calls are no-ops.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let requested = std::env::var("CALITP_LOG").unwrap_or_else(|_| "off".to_string());

        let level = match requested.as_str() {
            "off" => return,
            "debug" => emit::Level::Debug,
            "info" => emit::Level::Info,
            "warn" => emit::Level::Warn,
            "error" => emit::Level::Error,
            other => {
                eprintln!("Warning: Unknown CALITP_LOG value '{}', using 'info'", other);
                emit::Level::Info
            }
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        // The runtime must outlive the process; there is no shutdown hook here.
        std::mem::forget(rt);
    });
}

/// Log pipeline operations (downloads, artifact saves, latest-file resolutions).
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log per-object detail (listing results, decoded partition values, request URLs).
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log recoverable oddities (missing optional config, unparseable catalog rows).
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures that abort the current operation.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

/// Re-export the init function for convenience
pub use init_diagnostics as init;
