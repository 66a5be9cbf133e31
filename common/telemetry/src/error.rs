//! Error types for pipeline setup and aggregated shutdown.

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::config::SignalKind;

/// Exporter construction failed (malformed endpoint, transport setup).
#[derive(Debug, Error)]
#[error("{signal} exporter construction failed: {source}")]
pub struct ExporterInitError {
    pub signal: SignalKind,
    #[source]
    pub source: Box<dyn StdError + Send + Sync>,
}

impl ExporterInitError {
    pub(crate) fn new(signal: SignalKind, source: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            signal,
            source: Box::new(source),
        }
    }
}

/// Errors returned by [`initialize`](crate::initialize).
#[derive(Debug, Error)]
pub enum SetupError {
    /// A signal pipeline could not be assembled. Providers built earlier in
    /// the same call have already been shut down.
    #[error("{signal} pipeline setup failed")]
    Provider {
        signal: SignalKind,
        #[source]
        source: ExporterInitError,
    },

    /// A previous generation is still live; shut it down first.
    #[error("telemetry already initialized; shut down the previous generation first")]
    AlreadyInitialized,
}

/// A single provider's failure during aggregated shutdown.
#[derive(Debug, Error)]
pub enum SignalShutdownError {
    /// Flush or release of the provider failed.
    #[error("{signal} provider shutdown failed: {source}")]
    Provider {
        signal: SignalKind,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// The shutdown deadline fired before the provider finished flushing.
    #[error("{signal} provider shutdown timed out after {timeout:?}")]
    Timeout {
        signal: SignalKind,
        timeout: Duration,
    },

    /// The blocking shutdown task panicked.
    #[error("{signal} provider shutdown task panicked")]
    Panicked { signal: SignalKind },
}

impl SignalShutdownError {
    pub fn signal(&self) -> SignalKind {
        match self {
            SignalShutdownError::Provider { signal, .. }
            | SignalShutdownError::Timeout { signal, .. }
            | SignalShutdownError::Panicked { signal } => *signal,
        }
    }
}

/// Combined outcome of shutting down every provider of one generation.
/// Every individual failure is kept, not just the first one.
#[derive(Debug)]
pub struct ShutdownError {
    failures: Vec<SignalShutdownError>,
}

impl ShutdownError {
    /// `None` when nothing failed, so callers keep `Ok(())` for the
    /// all-clean case.
    pub fn from_failures(failures: Vec<SignalShutdownError>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self { failures })
        }
    }

    pub fn failures(&self) -> &[SignalShutdownError] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<SignalShutdownError> {
        self.failures
    }
}

impl fmt::Display for ShutdownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "telemetry shutdown failed for {} provider(s): ",
            self.failures.len()
        )?;
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

impl StdError for ShutdownError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self.failures.first() {
            Some(failure) => Some(failure),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_failures_means_no_error() {
        assert!(ShutdownError::from_failures(Vec::new()).is_none());
    }

    #[test]
    fn display_lists_every_failure() {
        let error = ShutdownError::from_failures(vec![
            SignalShutdownError::Timeout {
                signal: SignalKind::Trace,
                timeout: Duration::from_secs(5),
            },
            SignalShutdownError::Panicked {
                signal: SignalKind::Log,
            },
        ])
        .expect("two failures");

        let rendered = error.to_string();
        assert!(rendered.contains("2 provider(s)"));
        assert!(rendered.contains("trace provider shutdown timed out"));
        assert!(rendered.contains("log provider shutdown task panicked"));
        assert_eq!(error.failures().len(), 2);
    }

    #[test]
    fn source_is_the_first_failure() {
        let error = ShutdownError::from_failures(vec![
            SignalShutdownError::Panicked {
                signal: SignalKind::Trace,
            },
            SignalShutdownError::Panicked {
                signal: SignalKind::Log,
            },
        ])
        .expect("two failures");

        let source = error.source().expect("source");
        assert!(source
            .to_string()
            .contains("trace provider shutdown task panicked"));
    }

    #[test]
    fn signal_accessor_covers_all_variants() {
        let panicked = SignalShutdownError::Panicked {
            signal: SignalKind::Metric,
        };
        assert_eq!(panicked.signal(), SignalKind::Metric);
    }
}
