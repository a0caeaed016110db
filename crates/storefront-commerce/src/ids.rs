//! Newtype IDs for type-safe identifiers.
//!
//! A cart line is keyed by product, and its size and extras point into that
//! product's option lists; newtypes keep those three from being swapped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(SizeId);
define_id!(ExtraId);
define_id!(UserId);
define_id!(CheckoutId);

impl CheckoutId {
    /// Generate a fresh checkout attempt ID.
    ///
    /// Also sent as the gateway's idempotency key, so it must be unique
    /// across processes, not just within one.
    pub fn generate() -> Self {
        Self(format!("chk_{}", uuid::Uuid::new_v4().simple()))
    }
}
