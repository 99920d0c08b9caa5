use crate::any_key::AnyKey;
use crate::any_value::AnyValue;
use crate::error::{InvalidTarget, Result, StoreError};
use std::any::{type_name, Any};
use std::collections::hash_map::{HashMap, Keys};
use std::fmt::Debug;
use std::hash::Hash;
use std::ptr::NonNull;
use tracing::{debug, trace};

/// A map wrapper that holds values of any type, indexed by keys of type `K`.
///
/// The default key type, [`AnyKey`], is itself type-erased, so a single
/// `Store` can mix string, integer and user-defined keys. Keys of different
/// types never collide: `"1"` and `1` name different entries.
///
/// `Store` does no locking. Mutation needs `&mut self`, so sharing one
/// across threads is up to the caller; see [`SharedStore`](crate::SharedStore)
/// for a ready-made `Arc<Mutex<_>>` wrapper.
///
/// # Examples
///
/// ```
/// use sovran_store::{Store, StoreError};
///
/// let mut store: Store = Store::new();
/// store.add("user", "alice".to_string()).add(7, 42u32);
///
/// let mut out = String::new();
/// store.bind_to(&"user".into(), Some(&mut out))?;
/// assert_eq!(out, "alice");
///
/// assert_eq!(store.bind::<u32>(&7.into())?, 42);
/// # Ok::<(), StoreError>(())
/// ```
#[derive(Debug)]
pub struct Store<K = AnyKey> {
    items: HashMap<K, AnyValue>,
}

impl<K> Store<K>
where
    K: Any + Eq + Hash + Debug + Clone + Send + Sync,
{
    /// Creates a new, empty Store
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
        }
    }

    /// Creates an empty Store with room for at least `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: HashMap::with_capacity(capacity),
        }
    }

    /// Inserts a value, replacing whatever was stored under `key`.
    ///
    /// Returns the store so calls can be chained. An [`AnyValue`] is stored
    /// as the value it already holds.
    pub fn add<V>(&mut self, key: impl Into<K>, value: V) -> &mut Self
    where
        V: Any + Send + Sync,
    {
        self.items.insert(key.into(), AnyValue::new(value));
        self
    }

    /// Inserts every entry, overwriting existing keys. Keys not mentioned in
    /// `entries` are left alone; empty input is a no-op.
    pub fn append<I>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, AnyValue)>,
    {
        let mut entries = entries.into_iter().peekable();
        if entries.peek().is_none() {
            trace!("ignoring empty append");
            return self;
        }
        self.items.extend(entries);
        self
    }

    /// Replaces the whole backing map with `entries`.
    ///
    /// An empty `entries` leaves the store untouched rather than clearing
    /// it. Use [`underlying_mut`](Self::underlying_mut) to clear.
    pub fn with(&mut self, entries: HashMap<K, AnyValue>) -> &mut Self {
        if entries.is_empty() {
            trace!("ignoring empty replacement map");
            return self;
        }
        trace!(
            previous = self.items.len(),
            next = entries.len(),
            "replacing backing map"
        );
        self.items = entries;
        self
    }

    /// Returns the value under `key`, or `None` when the key is missing
    pub fn get(&self, key: &K) -> Option<&AnyValue> {
        self.items.get(key)
    }

    /// Borrows the value under `key` if it exists and is a `T`
    pub fn get_as<T: 'static>(&self, key: &K) -> Option<&T> {
        self.items.get(key)?.downcast_ref::<T>()
    }

    /// Returns the value under `key`.
    ///
    /// # Panics
    ///
    /// Panics when the key is missing. The panic payload is the
    /// [`StoreError::KeyNotExist`] value, which can be recovered with
    /// [`std::panic::catch_unwind`] and `downcast_ref::<StoreError>()`.
    #[track_caller]
    pub fn must_get(&self, key: &K) -> &AnyValue {
        match self.items.get(key) {
            Some(value) => value,
            None => std::panic::panic_any(StoreError::key_not_exist(key)),
        }
    }

    /// The live backing map.
    pub fn underlying(&self) -> &HashMap<K, AnyValue> {
        &self.items
    }

    /// Mutable access to the live backing map. Changes made through it are
    /// what every other method sees afterwards.
    pub fn underlying_mut(&mut self) -> &mut HashMap<K, AnyValue> {
        &mut self.items
    }

    /// Returns true if the store holds a value under `key`
    pub fn contains_key(&self, key: &K) -> bool {
        self.items.contains_key(key)
    }

    /// Removes and returns the value under `key`
    pub fn remove(&mut self, key: &K) -> Option<AnyValue> {
        self.items.remove(key)
    }

    /// Returns the number of entries
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the keys in arbitrary order
    pub fn keys(&self) -> Keys<'_, K, AnyValue> {
        self.items.keys()
    }

    /// Returns a clone of the value under `key` when it is a `T`.
    ///
    /// # Errors
    ///
    /// - `StoreError::KeyNotExist` if the key is missing
    /// - `StoreError::BindTypeMismatch` if the stored value is not a `T`
    pub fn bind<T: Clone + 'static>(&self, key: &K) -> Result<T> {
        let value = self.lookup(key)?;
        Self::checked::<T>(key, value).cloned()
    }

    /// Copies the value under `key` into `dest`.
    ///
    /// Checks run in a fixed order and the first failure wins: a missing
    /// key, then a missing destination, then a type mismatch. `dest` is only
    /// written when all three pass.
    ///
    /// # Errors
    ///
    /// - `StoreError::KeyNotExist` if the key is missing
    /// - `StoreError::InvalidBind` if `dest` is `None`
    /// - `StoreError::BindTypeMismatch` if the stored value is not a `T`
    pub fn bind_to<T: Clone + 'static>(&self, key: &K, dest: Option<&mut T>) -> Result<()> {
        let value = self.lookup(key)?;
        let Some(dest) = dest else {
            debug!(key = ?key, "bind destination is nil");
            return Err(StoreError::InvalidBind(InvalidTarget::Nil));
        };
        *dest = Self::checked::<T>(key, value)?.clone();
        Ok(())
    }

    /// Raw-pointer flavour of [`bind_to`](Self::bind_to). A null `dest` is
    /// reported as `StoreError::InvalidBind` after the key check.
    ///
    /// # Safety
    ///
    /// A non-null `dest` must be aligned, valid for writes and point to an
    /// initialized `T`; the previous value is dropped in place.
    pub unsafe fn bind_raw<T: Clone + 'static>(&self, key: &K, dest: *mut T) -> Result<()> {
        let value = self.lookup(key)?;
        let Some(mut dest) = NonNull::new(dest) else {
            debug!(key = ?key, "bind destination is a null pointer");
            return Err(StoreError::InvalidBind(InvalidTarget::NullPointer(
                type_name::<T>(),
            )));
        };
        let value = Self::checked::<T>(key, value)?;
        // SAFETY: non-null here, validity is the caller's contract
        unsafe {
            *dest.as_mut() = value.clone();
        }
        Ok(())
    }

    fn lookup(&self, key: &K) -> Result<&AnyValue> {
        self.items.get(key).ok_or_else(|| {
            debug!(key = ?key, "bind key not found");
            StoreError::key_not_exist(key)
        })
    }

    fn checked<'a, T: 'static>(key: &K, value: &'a AnyValue) -> Result<&'a T> {
        value.downcast_ref::<T>().ok_or_else(|| {
            debug!(
                key = ?key,
                expected = type_name::<T>(),
                actual = value.type_name(),
                "bind type mismatch"
            );
            StoreError::BindTypeMismatch {
                expected: type_name::<T>(),
                actual: value.type_name(),
            }
        })
    }
}

impl<K> Default for Store<K>
where
    K: Any + Eq + Hash + Debug + Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn entries<const N: usize>(pairs: [(&str, &'static str); N]) -> HashMap<AnyKey, AnyValue> {
        pairs
            .into_iter()
            .map(|(k, v)| (AnyKey::from(k), AnyValue::new(v)))
            .collect()
    }

    fn snapshot(store: &Store) -> Vec<(String, &'static str)> {
        let mut pairs: Vec<_> = store
            .underlying()
            .iter()
            .map(|(k, v)| (format!("{:?}", k), *v.downcast_ref::<&'static str>().unwrap()))
            .collect();
        pairs.sort();
        pairs
    }

    #[test]
    fn test_new_is_empty_and_usable() {
        let mut store: Store = Store::new();
        assert!(store.is_empty());
        store.add("test", "hello");
        assert_eq!(store.len(), 1);

        let store: Store<u32> = Store::with_capacity(16);
        assert!(store.underlying().capacity() >= 16);
    }

    #[test]
    fn test_add_overwrites() {
        let mut store: Store = Store::new();
        store.add("test", "hello").add("test", 5i32);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_as::<i32>(&"test".into()), Some(&5));
        assert!(store.get_as::<&str>(&"test".into()).is_none());
    }

    #[test]
    fn test_get_distinguishes_key_types() {
        let mut store: Store = Store::new();
        assert!(store.get(&"test".into()).is_none());

        store.add("1", "hello");
        assert!(store.get(&"1".into()).is_some());
        assert!(store.get(&1.into()).is_none());
    }

    #[test]
    fn test_append() {
        let mut store: Store = Store::new();
        store.add("test", "hello").add("next", "hello");
        let original = snapshot(&store);

        store.append(HashMap::new());
        assert_eq!(snapshot(&store), original);

        store.append(std::iter::empty());
        assert_eq!(snapshot(&store), original);

        store.append(entries([("test", "test"), ("hello", "test")]));
        assert_eq!(
            snapshot(&store),
            vec![
                ("\"hello\"".to_string(), "test"),
                ("\"next\"".to_string(), "hello"),
                ("\"test\"".to_string(), "test"),
            ]
        );
    }

    #[test]
    fn test_with() {
        let mut store: Store = Store::new();
        store.add("test", "hello");
        let original = snapshot(&store);

        store.with(HashMap::new());
        assert_eq!(snapshot(&store), original);

        store.with(entries([("hello", "test")]));
        assert_eq!(snapshot(&store), vec![("\"hello\"".to_string(), "test")]);
        assert!(!store.contains_key(&"test".into()));
    }

    #[test]
    fn test_add_unwraps_boxed_values() {
        let mut store: Store = Store::new();
        store.add("boxed", AnyValue::new(9u32));
        assert_eq!(store.bind::<u32>(&"boxed".into()), Ok(9));
        assert!(store.get_as::<AnyValue>(&"boxed".into()).is_none());
    }

    #[test]
    fn test_empty_inputs_are_traced() {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let writer = Arc::clone(&buf);
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || Capture(Arc::clone(&writer)))
            .finish();

        let mut store: Store = Store::new();
        store.add("test", "hello");
        tracing::subscriber::with_default(subscriber, || {
            store.append(std::iter::empty());
            store.with(HashMap::new());
        });

        let logged = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("ignoring empty append"), "{}", logged);
        assert!(logged.contains("ignoring empty replacement map"), "{}", logged);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_underlying_is_live() {
        let mut store: Store = Store::new();
        store.add("test", "hello");
        store
            .underlying_mut()
            .insert("extra".into(), AnyValue::new(1u8));
        assert_eq!(store.get_as::<u8>(&"extra".into()), Some(&1));

        store.underlying_mut().clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_must_get_present() {
        let mut store: Store = Store::new();
        store.add("test", "hello");
        let value = store.must_get(&"test".into());
        assert_eq!(value.downcast_ref::<&str>(), Some(&"hello"));
    }

    #[test]
    #[should_panic]
    fn test_must_get_missing_panics() {
        let store: Store = Store::new();
        store.must_get(&"test".into());
    }

    #[test]
    fn test_remove_and_keys() {
        let mut store: Store<String> = Store::new();
        store.add("a", 1).add("b", 2);
        let mut keys: Vec<_> = store.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);

        let removed = store.remove(&"a".to_string()).unwrap();
        assert_eq!(removed.downcast::<i32>().unwrap(), 1);
        assert!(store.remove(&"a".to_string()).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_bind_error_order() {
        let mut store: Store = Store::new();
        store.add("test", "hello".to_string());

        // missing key wins over a nil destination
        let err = store.bind_to::<String>(&"test1".into(), None).unwrap_err();
        assert_eq!(
            err,
            StoreError::KeyNotExist {
                key: AnyKey::from("test1")
            }
        );

        // nil destination wins over a type mismatch
        let err = store.bind_to::<i32>(&"test".into(), None).unwrap_err();
        assert_eq!(err, StoreError::InvalidBind(InvalidTarget::Nil));

        let mut wrong = 0i32;
        let err = store
            .bind_to(&"test".into(), Some(&mut wrong))
            .unwrap_err();
        assert!(matches!(err, StoreError::BindTypeMismatch { .. }));
        assert_eq!(wrong, 0);

        let mut out = String::new();
        store.bind_to(&"test".into(), Some(&mut out)).unwrap();
        assert_eq!(out, "hello");
    }

    #[test]
    fn test_bind_raw_null_pointer() {
        let mut store: Store = Store::new();
        store.add("test", "hello".to_string());

        let err = unsafe { store.bind_raw::<String>(&"test".into(), std::ptr::null_mut()) }
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::InvalidBind(InvalidTarget::NullPointer(type_name::<String>()))
        );

        let err = unsafe { store.bind_raw::<String>(&"nope".into(), std::ptr::null_mut()) }
            .unwrap_err();
        assert!(matches!(err, StoreError::KeyNotExist { .. }));

        let mut out = String::from("before");
        unsafe { store.bind_raw(&"test".into(), &mut out as *mut String) }.unwrap();
        assert_eq!(out, "hello");
    }
}
