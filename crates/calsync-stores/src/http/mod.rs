//! REST implementation of the store traits.
//!
//! Endpoints live below a configurable API root:
//!
//! | Operation | Request |
//! |---|---|
//! | list events | `GET events?start_date&end_date[&category_id][&search]` |
//! | get event | `GET events/{id}` |
//! | update event | `PUT events/{id}` |
//! | list categories | `GET categories` |
//! | list reminders | `GET reminders/event/{id}/reminders` |
//! | create reminders | `POST reminders/bulk` |
//! | update reminder | `PUT reminders/{id}` |
//! | delete reminders | `DELETE reminders/bulk` |

mod client;
mod config;
mod store;

pub use client::RestClient;
pub use config::HttpStoreConfig;
pub use store::HttpStore;
