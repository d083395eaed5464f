//! Post Navigator Library
//!
//! Backend for a Telegram mini app that lets a channel's audience browse
//! posts grouped by category.
//!
//! This crate provides the core functionality for:
//! - Loading, mutating and persisting the category catalog
//! - Gating admin changes behind a password and user id allow-list
//! - Serving the catalog and admin operations over HTTP

pub mod auth;
pub mod config;
pub mod server;
pub mod store;
