///! Error taxonomy for remote catalog lookups
use thiserror::Error;

/// Failure modes of the fetch/aggregation pipeline.
///
/// `NotFound`, `Transport` and `MalformedData` originate in the API client
/// and propagate unmodified through the aggregator. `RetryExhausted` is only
/// produced by the query layer after its retry budget is spent, wrapping the
/// last underlying failure.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("'{ident}' does not exist upstream")]
    NotFound { ident: String },

    #[error("request for '{ident}' failed{}: {detail}", fmt_status(.status))]
    Transport {
        ident: String,
        status: Option<u16>,
        detail: String,
    },

    #[error("malformed response for '{ident}': {detail}")]
    MalformedData { ident: String, detail: String },

    #[error("giving up on '{ident}' after {attempts} attempts")]
    RetryExhausted {
        ident: String,
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" with status {}", code),
        None => String::new(),
    }
}

impl FetchError {
    pub fn not_found(ident: impl Into<String>) -> Self {
        FetchError::NotFound {
            ident: ident.into(),
        }
    }

    pub fn transport(ident: impl Into<String>, status: Option<u16>, detail: impl Into<String>) -> Self {
        FetchError::Transport {
            ident: ident.into(),
            status,
            detail: detail.into(),
        }
    }

    pub fn malformed(ident: impl Into<String>, detail: impl Into<String>) -> Self {
        FetchError::MalformedData {
            ident: ident.into(),
            detail: detail.into(),
        }
    }

    /// The identifier that was being resolved when the failure occurred.
    pub fn ident(&self) -> &str {
        match self {
            FetchError::NotFound { ident }
            | FetchError::Transport { ident, .. }
            | FetchError::MalformedData { ident, .. }
            | FetchError::RetryExhausted { ident, .. } => ident,
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            FetchError::NotFound { .. } => true,
            FetchError::RetryExhausted { last, .. } => last.is_not_found(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_status() {
        let err = FetchError::transport("pikachu", Some(503), "service unavailable");
        let msg = err.to_string();
        assert!(msg.contains("pikachu"));
        assert!(msg.contains("503"));
    }

    #[test]
    fn test_retry_exhausted_sees_through_to_not_found() {
        let err = FetchError::RetryExhausted {
            ident: "9999".to_string(),
            attempts: 3,
            last: Box::new(FetchError::not_found("9999")),
        };
        assert!(err.is_not_found());
        assert_eq!(err.ident(), "9999");
    }
}
