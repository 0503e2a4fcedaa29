//! docserve - a small HTTP/1.1 static file server
//!
//! Core library for request parsing, connection handling and file serving.

pub mod config;
pub mod files;
pub mod http;
pub mod server;
