use std::any::{Any, TypeId};
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};

/// Object-safe view of a hashable, comparable key.
///
/// Blanket-implemented for every `T: Any + Eq + Hash + Debug + Clone + Send + Sync`.
pub trait DynKey: Any + Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn DynKey) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
    fn clone_key(&self) -> Box<dyn DynKey>;
}

impl<T> DynKey for T
where
    T: Any + Eq + Hash + Debug + Clone + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynKey) -> bool {
        // downcast fails whenever the concrete types differ
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }

    fn clone_key(&self) -> Box<dyn DynKey> {
        Box::new(self.clone())
    }
}

/// A type-erased key.
///
/// Two `AnyKey`s are equal only when they wrap the same concrete type and
/// the wrapped values are equal, so keys that print alike but have
/// different types never collide.
///
/// ```
/// use sovran_store::AnyKey;
///
/// assert_eq!(AnyKey::from("1"), AnyKey::from("1".to_string()).clone());
/// assert_ne!(AnyKey::from("1"), AnyKey::from(1));
/// ```
pub struct AnyKey(Box<dyn DynKey>);

impl AnyKey {
    /// Wraps `key`.
    ///
    /// A `&'static str` is stored as an owned `String`, the same as
    /// `AnyKey::from`, and wrapping an `AnyKey` returns it unchanged rather
    /// than nesting it.
    ///
    /// ```
    /// use sovran_store::AnyKey;
    ///
    /// assert_eq!(AnyKey::new("user"), AnyKey::from("user".to_string()));
    /// assert_eq!(AnyKey::new(AnyKey::from(1)), AnyKey::from(1));
    /// ```
    pub fn new<T>(key: T) -> Self
    where
        T: Any + Eq + Hash + Debug + Clone + Send + Sync,
    {
        let key: Box<dyn DynKey> = Box::new(key);
        if let Some(inner) = key.as_any().downcast_ref::<AnyKey>() {
            return inner.clone();
        }
        if let Some(text) = key.as_any().downcast_ref::<&'static str>() {
            return Self(Box::new(text.to_string()));
        }
        Self(key)
    }

    /// Borrow the wrapped key if it is a T
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Check if the wrapped key is of type T
    pub fn is<T: 'static>(&self) -> bool {
        self.0.as_any().is::<T>()
    }
}

impl PartialEq for AnyKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.dyn_eq(&*other.0)
    }
}

impl Eq for AnyKey {}

impl Hash for AnyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.dyn_hash(state);
    }
}

impl Clone for AnyKey {
    fn clone(&self) -> Self {
        Self(self.0.clone_key())
    }
}

impl Debug for AnyKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Debug::fmt(&*self.0, f)
    }
}

// non-'static slices can't go through `new`
impl From<&str> for AnyKey {
    fn from(key: &str) -> Self {
        Self::new(key.to_string())
    }
}

macro_rules! impl_from_for_any_key {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for AnyKey {
                fn from(key: $ty) -> Self {
                    Self::new(key)
                }
            }
        )*
    };
}

impl_from_for_any_key!(
    String, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct UserId(u64);

    #[test]
    fn test_equality_respects_type() {
        assert_eq!(AnyKey::from(1), AnyKey::from(1));
        assert_ne!(AnyKey::from(1i32), AnyKey::from(1i64));
        assert_ne!(AnyKey::from("1"), AnyKey::from(1));
        assert_ne!(AnyKey::new(UserId(1)), AnyKey::from(1u64));
    }

    #[test]
    fn test_str_and_string_are_same_key() {
        assert_eq!(AnyKey::from("user"), AnyKey::from("user".to_string()));
    }

    #[test]
    fn test_new_normalizes_static_str() {
        let key = AnyKey::new("user");
        assert!(key.is::<String>());
        assert_eq!(key, AnyKey::from("user"));
    }

    #[test]
    fn test_new_does_not_nest() {
        let key = AnyKey::new(AnyKey::new(UserId(3)));
        assert!(key.is::<UserId>());
        assert!(!key.is::<AnyKey>());
        assert_eq!(key, AnyKey::new(UserId(3)));
    }

    #[test]
    fn test_hash_set_membership() {
        let mut keys = HashSet::new();
        keys.insert(AnyKey::from("1"));
        keys.insert(AnyKey::from(1));
        keys.insert(AnyKey::from(1));
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&AnyKey::new(1)));
        assert!(!keys.contains(&AnyKey::from(1u8)));
    }

    #[test]
    fn test_debug_is_transparent() {
        assert_eq!(format!("{:?}", AnyKey::from("missing")), "\"missing\"");
        assert_eq!(format!("{:?}", AnyKey::new(UserId(9))), "UserId(9)");
    }

    #[test]
    fn test_downcast() {
        let key = AnyKey::new(UserId(5));
        assert!(key.is::<UserId>());
        assert_eq!(key.downcast_ref::<UserId>(), Some(&UserId(5)));
        assert!(key.downcast_ref::<u64>().is_none());
    }
}
