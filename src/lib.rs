//! # sovran-store
//!
//! A heterogeneous key-value store with type-checked binding.
//!
//! `sovran-store` keeps values of any type under keys of any type, and hands
//! them back through a runtime type check. The check either borrows the value
//! in place, clones it out, or copies it into a variable the caller already
//! owns ("binding").
//!
//! ## Key Features
//!
//! - **Mixed keys**: the default [`AnyKey`] lets `"1"`, `1` and your own key
//!   types live side by side without colliding
//! - **Typed extraction**: [`Store::bind`] and [`Store::bind_to`] check the
//!   stored type before copying anything out
//! - **Inspectable errors**: every failure is a [`StoreError`] variant that
//!   carries the offending key or the expected/actual type names
//! - **Bring your own locking**: [`Store`] is a plain value; wrap it in
//!   [`SharedStore`] when threads need to share it
//!
//! ## Usage Examples
//!
//! ### Basic Usage
//!
//! ```rust
//! use sovran_store::{Store, StoreError};
//!
//! fn main() -> Result<(), StoreError> {
//!     let mut store: Store = Store::new();
//!
//!     store
//!         .add("user", "alice".to_string())
//!         .add("retries", 3u8)
//!         .add(404, "not found");
//!
//!     // Borrow in place
//!     assert_eq!(store.get_as::<u8>(&"retries".into()), Some(&3));
//!
//!     // Copy into a variable we already own
//!     let mut user = String::new();
//!     store.bind_to(&"user".into(), Some(&mut user))?;
//!     assert_eq!(user, "alice");
//!
//!     // Clone out by type
//!     let reason: &str = store.bind(&404.into())?;
//!     assert_eq!(reason, "not found");
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Error Handling
//!
//! ```rust
//! use sovran_store::{InvalidTarget, Store, StoreError};
//!
//! let mut store: Store = Store::new();
//! store.add("port", 8080u16);
//!
//! let mut port = 0i32;
//! match store.bind_to(&"port".into(), Some(&mut port)) {
//!     Ok(()) => println!("port: {}", port),
//!     Err(StoreError::KeyNotExist { key }) => println!("{:?} is not configured", key),
//!     Err(StoreError::InvalidBind(InvalidTarget::Nil)) => println!("nowhere to write"),
//!     Err(StoreError::BindTypeMismatch { expected, actual }) => {
//!         println!("wanted {}, found {}", expected, actual)
//!     }
//!     Err(e) => println!("Other error: {}", e),
//! }
//! assert_eq!(port, 0);
//! ```
//!
//! ### Replacing Everything at Once
//!
//! ```rust
//! use sovran_store::{AnyKey, AnyValue, Store};
//! use std::collections::HashMap;
//!
//! let mut store: Store = Store::new();
//! store.add("stale", true);
//!
//! // An empty map is ignored
//! store.with(HashMap::new());
//! assert!(store.contains_key(&"stale".into()));
//!
//! let mut fresh = HashMap::new();
//! fresh.insert(AnyKey::from("fresh"), AnyValue::new(1u32));
//! store.with(fresh);
//! assert!(!store.contains_key(&"stale".into()));
//! ```

mod any_key;
mod any_value;
mod error;
mod shared;
mod store;

pub use any_key::{AnyKey, DynKey};
pub use any_value::AnyValue;
pub use error::{InvalidTarget, Result, StoreError};
pub use shared::SharedStore;
pub use store::Store;
