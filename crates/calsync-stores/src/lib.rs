//! Event and reminder stores.
//!
//! - [`EventStore`] / [`ReminderStore`] - the remote CRUD services the client talks to
//! - [`wire`] - request and response bodies
//! - [`envelope`] - tolerant decoding of store responses
//! - [`AuthSession`] - the signed-in state shared by the REST stores
//! - [`MemoryStore`] - an in-process implementation of both traits
//! - `http` (feature `http`) - the REST implementation
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use calsync_stores::{AuthSession, AuthTokens, EventFilters, EventStore};
//! use calsync_stores::http::{HttpStore, HttpStoreConfig};
//!
//! let auth = Arc::new(AuthSession::new());
//! auth.sign_in(AuthTokens::new(token));
//! let store = HttpStore::new(HttpStoreConfig::new("http://localhost:5000/api")?, auth)?;
//! let events = store.list_events(window, EventFilters::new()).await?;
//! ```

pub mod auth;
pub mod envelope;
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod memory;
pub mod store;
pub mod wire;

pub use auth::{AuthSession, AuthTokens};
pub use envelope::{Decoded, decode_item, decode_list};
pub use error::{StoreError, StoreErrorCode, StoreResult};
pub use memory::{MemoryStore, StoreOperation};
pub use store::{BoxFuture, ErrorStore, EventFilters, EventStore, ReminderStore};
pub use wire::{
    BulkCreateResult, BulkDeleteResult, Category, EventUpdate, NewReminder, ReminderRecord,
    StoredEvent,
};
