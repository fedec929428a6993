//! Application layer: the content pipeline from source records to cached view models.

pub mod catalog;
pub mod context;
pub mod error;
pub mod sanitize;
pub mod service;
pub mod source;
pub mod transform;
