//! Error kinds raised by domain rules

use thiserror::Error;

use crate::order::OrderStatus;

/// Rejections produced by the domain model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input failed validation
    #[error("{0}")]
    Validation(String),

    /// Illegal lifecycle transition of an order
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Deduction larger than the stock on hand
    #[error(
        "Insufficient stock for material {material_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        material_id: i64,
        available: i64,
        requested: i64,
    },

    /// Referenced record does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Write collides with existing data
    #[error("{0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        DomainError::NotFound { entity, id }
    }
}

/// Type alias for Result with DomainError
pub type DomainResult<T> = Result<T, DomainError>;

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn required(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("Name", "  bolt ").unwrap(), "bolt");
        assert_eq!(
            required("Name", "   "),
            Err(DomainError::Validation("Name is required".to_string()))
        );
    }

    #[test]
    fn transition_message_uses_wire_names() {
        let err = DomainError::InvalidTransition {
            from: OrderStatus::InProgress,
            to: OrderStatus::Shipped,
        };
        assert_eq!(err.to_string(), "Cannot move order from in_progress to shipped");
    }
}
