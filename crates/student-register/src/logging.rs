//! Diagnostic logging for the register.
//!
//! Logs go to stderr so listings and reports on stdout can be piped. Library
//! code logs store traffic at `debug`, mutations at `info`, and recovered
//! read failures at `warn`.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// How much diagnostic output to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Warnings, such as unreadable stored values.
    #[default]
    Normal,
    /// Every mutation.
    Verbose,
    /// Store reads and writes.
    Debug,
    /// Everything.
    Trace,
}

impl Verbosity {
    /// The most detailed level shown at this verbosity.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter directives for this crate and the `stureg` binary.
    #[must_use]
    pub fn directives(self) -> String {
        let level = self.level();
        format!("student_register={level},stureg={level}")
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG`, when set and valid, replaces the filter derived from
/// `verbosity`. Module targets are printed from [`Verbosity::Debug`] up.
/// Calling this again after a subscriber is installed does nothing.
///
/// # Examples
///
/// ```no_run
/// use student_register::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directives()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity >= Verbosity::Debug)
        .try_init();
}

/// Route logs through the test harness's captured output.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(Verbosity::Quiet.level(), Level::ERROR);
        assert_eq!(Verbosity::Normal.level(), Level::WARN);
        assert_eq!(Verbosity::Verbose.level(), Level::INFO);
        assert_eq!(Verbosity::Debug.level(), Level::DEBUG);
        assert_eq!(Verbosity::Trace.level(), Level::TRACE);
        assert_eq!(Verbosity::default(), Verbosity::Normal);
    }

    #[test]
    fn test_verbosity_ordering() {
        assert!(Verbosity::Quiet < Verbosity::Normal);
        assert!(Verbosity::Debug > Verbosity::Verbose);
    }

    #[test]
    fn test_directives_cover_library_and_binary() {
        let directives = Verbosity::Verbose.directives();
        assert_eq!(directives, "student_register=INFO,stureg=INFO");
        assert!(EnvFilter::try_new(&directives).is_ok());
    }

    #[test]
    fn test_init_is_repeatable() {
        init_test_logging();
        init_logging(Verbosity::Quiet);
        init_logging(Verbosity::Trace);
        tracing::warn!("logging initialized");
    }
}
