//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.1 request pipeline with support for
//! keep-alive connections.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: The per-connection request-response state machine
//! - **`reader`**: Drains the bytes a peer has sent so far
//! - **`parser`**: Parses a request-line and the recognized headers from a byte buffer
//! - **`request`**: HTTP request representation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`dispatcher`**: Routes requests to handlers by method
//! - **`writer`**: Serializes and writes HTTP responses to the client
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for incoming request data
//!        └──────┬──────┘
//!               │ Request parsed (no bytes / malformed → Closed)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Dispatch to the method's handler
//!        └──────┬───────────┘
//!               │ Response ready (handler declined → Closed)
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close → Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use docserve::http::connection::Connection;
//! use docserve::http::dispatcher::Dispatcher;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let dispatcher = Arc::new(Dispatcher::new());
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let dispatcher = Arc::clone(&dispatcher);
//!         tokio::spawn(async move {
//!             if let Err(e) = Connection::new(socket, dispatcher).run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod dispatcher;
pub mod parser;
pub mod reader;
pub mod request;
pub mod response;
pub mod writer;
