//! Campus portal back end
//!
//! JSON-over-HTTP API actions built on [`api::ActionHandler`], served by a
//! small hyper/tokio server.

pub mod api;
pub mod config;
pub mod error;
pub mod logger;
pub mod server;
