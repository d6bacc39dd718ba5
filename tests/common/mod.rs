//! Common test infrastructure
//!
//! This module provides the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_health() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.health().await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```
#![allow(dead_code)] // Not every test binary uses every helper

mod client;
mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
pub use client::TestClient;
pub use constants::*;
pub use fixtures::{FailingComposer, StubComposer};
pub use server::TestServer;
