// src/lib.rs

//! HTTP access layer for TRON node APIs.
//!
//! [`rotation::CredentialRotator`] spreads requests over a pool of API keys with a
//! durable round-robin cursor, and [`dispatcher::RequestDispatcher`] performs
//! single GET/POST calls and normalizes their bodies. [`manager::ConnectionManager`]
//! ties both to named connections from configuration.

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod manager;
pub mod rotation;
pub mod storage;
pub mod transport;

pub use config::TronConfig;
pub use dispatcher::RequestDispatcher;
pub use error::{AppError, Result};
pub use manager::{Connection, ConnectionManager, ConnectionOverrides, Endpoint};
pub use rotation::{ApiKeys, CredentialRotator};
pub use storage::{CursorStore, InMemoryCursorStore};
pub use transport::{ReqwestTransport, Transport};
