//! Folio: content backend for a personal portfolio and blog.
//!
//! Posts and projects are read from Notion databases, normalized into view
//! models, and held in a process-wide TTL cache in front of the CMS.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
