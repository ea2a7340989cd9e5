//! Debug helpers.
//!
//! Enable the `debug_prints` feature to trace the token stream while parsing. Do not enable if
//! you are consuming the crate rather than working on it.

/// Print debugging information to stderr.
#[cfg(feature = "debug_prints")]
macro_rules! debug_print {
    ($($arg:tt)*) => {
        eprintln!($($arg)*)
    };
}

/// Print debugging information to stderr (disabled, see the `debug_prints` feature).
#[cfg(not(feature = "debug_prints"))]
macro_rules! debug_print {
    ($($arg:tt)*) => {};
}
