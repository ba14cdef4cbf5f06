//! Time and identifier sources.

use chrono::{DateTime, Utc};

/// Supplies the current instant.
///
/// Sampled once per query; every timestamp in the response derives from it.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stopped at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Allocates message and assertion IDs.
pub trait IdGenerator: Send + Sync {
    /// Returns an ID unique within the process and valid as an `xs:ID`.
    fn new_id(&self) -> String;
}

/// Random v4 UUIDs prefixed with `_`, since an `xs:ID` may not start with a
/// digit.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn new_id(&self) -> String {
        format!("_{}", uuid::Uuid::new_v4())
    }
}
