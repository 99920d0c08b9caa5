use std::any::{Any, TypeId};
use std::fmt;

/// A container for type-erased values that preserves type information
///
/// Every value held by a [`Store`](crate::Store) lives in an `AnyValue`. The
/// concrete type is remembered both as a [`TypeId`] for comparisons and as a
/// type name for diagnostics.
///
/// ```
/// use sovran_store::AnyValue;
///
/// let value = AnyValue::new("alice".to_string());
/// assert!(value.is::<String>());
/// assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("alice"));
/// assert!(value.downcast_ref::<i32>().is_none());
/// ```
pub struct AnyValue {
    type_id: TypeId,
    type_name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

impl AnyValue {
    /// Create a new AnyValue from a value of any type that implements Any, Send, and Sync
    ///
    /// Passing an `AnyValue` returns it unchanged instead of boxing it again.
    pub fn new<T: 'static + Any + Send + Sync>(value: T) -> Self {
        let boxed = Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            value: Box::new(value),
        };
        match boxed.downcast::<AnyValue>() {
            Ok(inner) | Err(inner) => inner,
        }
    }

    /// Check if the contained value is of type T
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// The `TypeId` of the contained value
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The type name of the contained value, for diagnostics only
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Get a reference to the contained value if it is of type T
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Get a mutable reference to the contained value if it is of type T
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.value.downcast_mut::<T>()
    }

    /// Unwrap the contained value, handing `self` back if it is not a T
    pub fn downcast<T: 'static>(self) -> Result<T, Self> {
        if !self.is::<T>() {
            return Err(self);
        }
        let Self {
            type_id,
            type_name,
            value,
        } = self;
        value.downcast::<T>().map(|boxed| *boxed).map_err(|value| Self {
            type_id,
            type_name,
            value,
        })
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("AnyValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
