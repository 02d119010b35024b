//! Sink write path: register once, receive per record.

#[path = "../common/mod.rs"]
mod common;

mod concurrency;
