use crate::any_key::AnyKey;
use std::any::Any;
use std::fmt;
use std::hash::Hash;
use thiserror::Error;

/// What was handed to a bind call in place of a usable destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidTarget {
    /// No destination at all
    Nil,
    /// A raw pointer of the named type that holds a null address
    NullPointer(&'static str),
}

impl fmt::Display for InvalidTarget {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InvalidTarget::Nil => write!(f, "nil"),
            InvalidTarget::NullPointer(type_name) => write!(f, "{} pointer is nil", type_name),
        }
    }
}

/// Errors that can occur when using a Store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The requested key was not found
    #[error("key {key:?} is not found")]
    KeyNotExist { key: AnyKey },
    /// The bind destination cannot be written to
    #[error("Store: Bind({0})")]
    InvalidBind(InvalidTarget),
    /// The bind destination's type differs from the stored value's type
    #[error("expect type: {expected}, actual type: {actual}")]
    BindTypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
    /// Failed to acquire the lock of a shared store
    #[error("failed to acquire lock")]
    LockError,
}

impl StoreError {
    pub(crate) fn key_not_exist<K>(key: &K) -> Self
    where
        K: Any + Eq + Hash + fmt::Debug + Clone + Send + Sync,
    {
        StoreError::KeyNotExist {
            key: AnyKey::new(key.clone()),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, StoreError>;
