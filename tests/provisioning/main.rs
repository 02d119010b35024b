//! Schema provisioning: idempotence, concurrency and failure paths.

#[path = "../common/mod.rs"]
mod common;

mod failures;
mod idempotence;
