//! Failure taxonomy for everything that crosses an external feed boundary.
//!
//! None of these are fatal: callers contain them at the topic (or feed)
//! boundary and degrade to an empty or prior result.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Non-success status or network fault from one endpoint.
    #[error("transport failure from {endpoint}: {reason}")]
    Transport { endpoint: String, reason: String },

    /// Payload failed the structural sanity check or failed to parse.
    #[error("format failure: {0}")]
    Format(String),

    /// Every proxy attempt plus the fallback failed for one target.
    #[error("exhausted {attempts} attempts for {target}")]
    Exhausted { target: String, attempts: usize },
}

impl FetchError {
    pub fn transport(endpoint: impl Into<String>, reason: impl ToString) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }

    pub fn format(reason: impl ToString) -> Self {
        Self::Format(reason.to_string())
    }

    /// Stable label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Format(_) => "format",
            Self::Exhausted { .. } => "exhausted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable_labels() {
        assert_eq!(FetchError::transport("p", "boom").kind(), "transport");
        assert_eq!(FetchError::format("short body").kind(), "format");
        let e = FetchError::Exhausted {
            target: "t".into(),
            attempts: 5,
        };
        assert_eq!(e.kind(), "exhausted");
        assert_eq!(e.to_string(), "exhausted 5 attempts for t");
    }
}
