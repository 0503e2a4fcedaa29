//! Accept loop and worker pool.

pub mod listener;
