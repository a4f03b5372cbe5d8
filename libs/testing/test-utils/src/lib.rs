//! Helpers shared by the workspace's test suites
//!
//! - [`TestDataBuilder`]: values derived from the test name, so reruns
//!   produce the same ids and emails while separate tests never collide
//! - [`TestMongo`]: throwaway MongoDB container (feature `mongodb`)
//! - [`assertions`]: checks on JSON error bodies
//!
//! ```rust,no_run
//! use test_utils::{TestDataBuilder, TestMongo};
//!
//! # async fn example() {
//! let mongo = TestMongo::new().await;
//! let builder = TestDataBuilder::from_test_name("test_register");
//! let db = mongo.database(&builder.database_name());
//! let email = builder.email("alice");
//! # }
//! ```

use bson::oid::ObjectId;
use std::hash::{DefaultHasher, Hash, Hasher};

#[cfg(feature = "mongodb")]
mod mongo;

#[cfg(feature = "mongodb")]
pub use mongo::TestMongo;

/// Deterministic test values keyed by a seed
#[derive(Debug, Clone, Copy)]
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from a hash of `name`, normally the test function's name
    pub fn from_test_name(name: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// ObjectId made of the seed followed by `n`
    pub fn object_id(&self, n: u32) -> ObjectId {
        let mut bytes = [0u8; 12];
        let (seed, index) = bytes.split_at_mut(8);
        seed.copy_from_slice(&self.seed.to_be_bytes());
        index.copy_from_slice(&n.to_be_bytes());
        ObjectId::from_bytes(bytes)
    }

    /// `who-<seed>@shop.test`
    pub fn email(&self, who: &str) -> String {
        format!("{who}-{}@shop.test", self.seed)
    }

    /// Database name no other test shares
    pub fn database_name(&self) -> String {
        format!("test_{}", self.seed)
    }
}

pub mod assertions {
    /// Panics unless the error body's `message` equals `message`
    pub fn assert_error_message(body: &serde_json::Value, message: &str) {
        assert_eq!(
            body.get("message").and_then(|m| m.as_str()),
            Some(message),
            "unexpected error body: {body}"
        );
    }
}
