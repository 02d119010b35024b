//! Record projection: documented scenarios, custom schemas and properties.

#[path = "../common/mod.rs"]
mod common;

mod custom_schema;
mod properties;
