//! FILENAME: core/cube/src/logging.rs
// PURPOSE: Category-tagged logging macros shared by every crate in the workspace.

// ============================================================================
// MACRO DEFINITIONS & EXPORTS
// ============================================================================
//
// The first argument is a category (e.g. "PIVOT", "CACHE"). It becomes the
// `log` target, so a backend can route or silence one subsystem at a time.

#[macro_export]
macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        ::log::log!(target: $cat, ::log::Level::Debug, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        ::log::log!(target: $cat, ::log::Level::Info, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        ::log::log!(target: $cat, ::log::Level::Warn, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($cat:expr, $($arg:tt)*) => {
        ::log::log!(target: $cat, ::log::Level::Error, $($arg)*)
    };
}
