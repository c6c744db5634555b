//! # Shoplist
//!
//! A shared shopping-list server, usable both as a standalone binary and as a library.
//!
//! Lists are owned by one user and shared through invite links whose token
//! prefix carries the granted role (`e_` editor, `l_` reader). Items record
//! which members last touched them, and every list reports purchased and
//! pending totals.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! shoplist = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shoplist::config::ServerConfig;
//! use shoplist::server::{AppState, create_router};
//! use shoplist::store::{SqliteStore, Store};
//!
//! let config = ServerConfig::default();
//! let store = SqliteStore::new(config.db_path()).unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(Arc::new(store), &config));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `shoplist` binary. Disable with `default-features = false`.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod identity;
pub mod lists;
pub mod server;
pub mod store;
pub mod types;
