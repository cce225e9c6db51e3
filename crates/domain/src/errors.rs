//! Error taxonomy shared by the scheduling and ledger engine.

use thiserror::Error;

/// Typed failures surfaced by every core operation.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No identity, or the identity may not act on this instance.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Identity known but lacking permission (not a member, not the creator).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Semantically invalid request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A debit would take the account below the required amount.
    #[error("Insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds { balance: i32, required: i32 },

    /// The entity left the expected state before the transition was applied.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Stored configuration violates an invariant, e.g. a missing interval.
    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl DomainError {
    /// Whether the error is a business-rule rejection of the request.
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            DomainError::BadRequest(_) | DomainError::InsufficientFunds { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            DomainError::Forbidden("not a member".to_string()).to_string(),
            "Forbidden: not a member"
        );
        assert_eq!(
            DomainError::InsufficientFunds {
                balance: 20,
                required: 50
            }
            .to_string(),
            "Insufficient funds: balance 20, required 50"
        );
    }

    #[test]
    fn test_insufficient_funds_is_bad_request() {
        assert!(DomainError::InsufficientFunds {
            balance: 0,
            required: 1
        }
        .is_bad_request());
        assert!(DomainError::BadRequest("x".to_string()).is_bad_request());
        assert!(!DomainError::Conflict("x".to_string()).is_bad_request());
    }

    #[test]
    fn test_from_sqlx() {
        let err: DomainError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DomainError::Storage(_)));
    }
}
