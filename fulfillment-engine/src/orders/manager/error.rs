//! Manager-level errors and their mapping onto client-facing response
//! codes.

use thiserror::Error;

use crate::orders::storage::StorageError;
use crate::orders::traits::OrderError;
use shared::order::{CommandError, CommandErrorCode};

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

/// Map a raw storage failure onto an actionable response code.
///
/// redb surfaces backend conditions as strings, so this goes by
/// message content. Anything unrecognized is reported as transient.
fn classify_storage_error(message: &str) -> CommandErrorCode {
    let lower = message.to_lowercase();
    if lower.contains("no space") || lower.contains("disk full") {
        CommandErrorCode::StorageFull
    } else if lower.contains("out of memory") {
        CommandErrorCode::OutOfMemory
    } else if lower.contains("corrupt") {
        CommandErrorCode::StorageCorrupted
    } else {
        CommandErrorCode::SystemBusy
    }
}

impl From<ManagerError> for CommandError {
    fn from(err: ManagerError) -> Self {
        let message = err.to_string();
        let code = match &err {
            ManagerError::Storage(e) => classify_storage_error(&e.to_string()),
            ManagerError::InvalidCommand(_) => CommandErrorCode::ValidationFailed,
            ManagerError::Order(order_err) => match order_err {
                OrderError::OrderNotFound(_) => CommandErrorCode::OrderNotFound,
                OrderError::LineNotFound(_) => CommandErrorCode::LineNotFound,
                OrderError::OrderAlreadyCompleted(_) => CommandErrorCode::OrderAlreadyCompleted,
                OrderError::OrderAlreadyCancelled(_) => CommandErrorCode::OrderAlreadyCancelled,
                OrderError::IllegalTransition { .. } => CommandErrorCode::IllegalTransition,
                OrderError::InsufficientStock(_) => CommandErrorCode::InsufficientStock,
                OrderError::PaymentOverflow { .. } => CommandErrorCode::PaymentOverflow,
                OrderError::InvalidAmount => CommandErrorCode::InvalidAmount,
                OrderError::Validation(_) => CommandErrorCode::ValidationFailed,
                OrderError::InvalidOperation(_) => CommandErrorCode::InvalidOperation,
                OrderError::Storage(msg) => classify_storage_error(msg),
            },
        };
        CommandError::new(code, message)
    }
}
