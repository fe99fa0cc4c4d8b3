//! Logging infrastructure for bintable.
//!
//! bintable uses `tracing` for structured logging. All events use target "bintable"
//! and include an `event` field for filtering.
//!
//! ## Library Integration
//!
//! bintable never initializes a global subscriber. Applications configure
//! tracing via `tracing_subscriber` or similar.
//!
//! ## Conventions
//!
//! - `event`: snake_case event name (required)
//! - `component`: module/subsystem (e.g., "reader", "writer", "ondisk")
//! - Use `%` for Display, `?` for Debug formatting

/// Target for all bintable log events.
pub(crate) const BINTABLE_TARGET: &str = "bintable";

/// Macro for info-level log events.
///
/// # Example
/// ```ignore
/// log_info!(
///     component = "ondisk",
///     event = "table_saved",
///     path = %path.display(),
///     rows = nrows,
/// );
/// ```
macro_rules! log_info {
    ($($field:tt)*) => {
        ::tracing::info!(target: $crate::observability::BINTABLE_TARGET, $($field)*)
    };
}

/// Macro for debug-level log events.
macro_rules! log_debug {
    ($($field:tt)*) => {
        ::tracing::debug!(target: $crate::observability::BINTABLE_TARGET, $($field)*)
    };
}

/// Macro for warn-level log events.
macro_rules! log_warn {
    ($($field:tt)*) => {
        ::tracing::warn!(target: $crate::observability::BINTABLE_TARGET, $($field)*)
    };
}

pub(crate) use log_debug;
pub(crate) use log_info;
pub(crate) use log_warn;
