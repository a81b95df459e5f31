//! Utilities for logging messages from the library.

use once_cell::sync::Lazy;

/// Prints a message when logging is enabled for the given [`crate::session::Session`].
///
/// The first argument is anything with a `log_enabled()` method returning `bool`; the
/// rest are passed to `format_args!`.
#[doc(hidden)]
#[macro_export]
macro_rules! vfx_log {
    (
        $session:expr,
        $($arg:tt)+
    ) => {
        if $session.log_enabled() {
            println!("{}", format_args!($($arg)+));
        }
    };
}

/// Name of the environment variable that turns on logging.
pub const LOG_ENV_VAR: &str = "VECTORFX_LOG";

/// Whether `VECTORFX_LOG` was set when the process first asked.
pub fn log_enabled() -> bool {
    static ENABLED: Lazy<bool> = Lazy::new(|| ::std::env::var_os(LOG_ENV_VAR).is_some());

    *ENABLED
}

/// Formats an elapsed duration as fractional seconds for log messages.
pub fn seconds(elapsed: std::time::Duration) -> f64 {
    elapsed.as_secs() as f64 + f64::from(elapsed.subsec_nanos()) / 1e9
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct Quiet;

    impl Quiet {
        fn log_enabled(&self) -> bool {
            false
        }
    }

    #[test]
    fn disabled_log_does_not_evaluate_arguments() {
        let mut evaluated = false;
        vfx_log!(Quiet, "{}", {
            evaluated = true;
            1
        });
        assert!(!evaluated);
    }

    #[test]
    fn formats_seconds() {
        assert_eq!(seconds(Duration::from_millis(1500)), 1.5);
    }
}
