//! Static file serving.
//!
//! The only built-in [`Handler`](crate::http::dispatcher::Handler): `GET`
//! requests are resolved against a document root and answered with the
//! file contents or an HTML listing for directories.

pub mod handler;
pub mod listing;
pub mod mime;

pub use handler::FilesystemHandler;
