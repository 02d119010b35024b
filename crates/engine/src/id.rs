//! Row identifier generation

use uuid::Uuid;

/// Source of primary-key identifiers
///
/// Implementations must produce globally unique values with negligible
/// collision probability and be callable from many threads at once.
pub trait IdGenerator: Send + Sync {
    /// A fresh identifier
    fn new_id(&self) -> Uuid;
}

/// Random (version 4) UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn new_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}
