//! Error taxonomy for a digest run.
//!
//! Every stage of the pipeline reports failures through [`DigestError`].
//! Only [`FetchError`] is ever retried, and only inside
//! [`RetryFetch`](crate::fetch::RetryFetch); everything else propagates
//! unchanged to `main`, which logs it and exits without writing a report.

use std::path::PathBuf;
use thiserror::Error;

/// A single failed attempt to retrieve the promotions page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered, but not with a 2xx status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The request never produced a response (DNS, TLS, connection reset, body decode, ...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Fatal errors for a digest run.
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("failed to load categories from {path}: {source}")]
    CategoryLoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("giving up after {attempts} attempt(s): {last}")]
    FetchExhausted {
        attempts: u32,
        #[source]
        last: FetchError,
    },

    /// A section matched the section predicate but has no category heading.
    #[error("section #{index} has no category heading")]
    MalformedSection { index: usize },

    /// An offer card has no title element.
    #[error("card #{index} in category {category:?} has no title")]
    MalformedCard { category: String, index: usize },

    /// A discount badge was present but held no digits.
    #[error("discount badge {badge:?} on {name:?} ({category}) has no number in it")]
    UnparseableDiscount {
        category: String,
        name: String,
        badge: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid selector {selector:?} for {role}: {reason}")]
    InvalidSelector {
        role: &'static str,
        selector: String,
        reason: String,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl DigestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DigestError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_exhausted_carries_last_error() {
        let err = DigestError::FetchExhausted {
            attempts: 3,
            last: FetchError::Status {
                status: 503,
                url: "https://example.com".to_string(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("3 attempt(s)"));
        assert!(msg.contains("HTTP 503"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_unparseable_discount_message() {
        let err = DigestError::UnparseableDiscount {
            category: "Dairy".to_string(),
            name: "Milk".to_string(),
            badge: "SALE".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "discount badge \"SALE\" on \"Milk\" (Dairy) has no number in it"
        );
    }
}
