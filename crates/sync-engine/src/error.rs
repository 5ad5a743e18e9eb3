//! Submission error taxonomy
//!
//! Failures are classified once, at the executor boundary, and never
//! re-classified further up the call chain. Nothing here is fatal to the
//! process; every failure is scoped to one operation.

use serde::{Deserialize, Serialize};
use solana_sdk::signature::Signature;
use thiserror::Error;

/// Stable, user-facing failure classification
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    #[error("wallet balance below the minimum fee reserve")]
    InsufficientFunds,

    #[error("network congestion: blockhash stale or unavailable")]
    NetworkCongestion,

    #[error("signature request declined")]
    UserRejected,

    #[error("referenced account does not exist on the ledger yet")]
    PreconditionMissing,

    #[error("derived address mismatch")]
    AccountMismatch,

    #[error("operation already processed")]
    AlreadyProcessed,

    #[error("submission outcome could not be confirmed")]
    Unconfirmed,

    #[error("relayer unavailable")]
    RelayerUnavailable,

    #[error("unknown error")]
    Unknown,
}

/// Terminal outcome of one submission, shared by every deduped caller
#[derive(Debug, Clone)]
pub struct SubmissionResult {
    pub success: bool,
    pub signature: Option<Signature>,
    pub error_kind: Option<ErrorKind>,
    pub error_message: Option<String>,
}

impl SubmissionResult {
    /// A confirmed submission
    pub fn confirmed(signature: Signature) -> Self {
        Self {
            success: true,
            signature: Some(signature),
            error_kind: None,
            error_message: None,
        }
    }

    /// A success recovered by re-read; the original signature was lost to
    /// the ambiguous failure
    pub fn recovered() -> Self {
        Self {
            success: true,
            signature: None,
            error_kind: None,
            error_message: None,
        }
    }

    /// A classified failure
    pub fn failed(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            signature: None,
            error_kind: Some(kind),
            error_message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_carries_kind_and_message() {
        let result = SubmissionResult::failed(ErrorKind::PreconditionMissing, "no profile");
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::PreconditionMissing));
        assert_eq!(result.error_message.as_deref(), Some("no profile"));
        assert!(result.signature.is_none());
    }

    #[test]
    fn test_recovered_has_no_signature() {
        let result = SubmissionResult::recovered();
        assert!(result.success);
        assert!(result.signature.is_none());
        assert!(result.error_kind.is_none());
    }
}
