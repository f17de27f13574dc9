//! Unique identifier types for domain entities
//!
//! All IDs use UUID v7 for time-sortable ordering, enabling efficient
//! chronological queries and replay. Each entity gets its own newtype so
//! an order id can never be passed where a trade id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new id with the current timestamp embedded.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for an exchange order.
    OrderId
}

uuid_id! {
    /// Unique identifier for a trade execution record.
    TradeId
}

uuid_id! {
    /// Unique identifier for a ledger account.
    AccountId
}

uuid_id! {
    /// Unique identifier for a ledger transaction.
    TransactionId
}

uuid_id! {
    /// Unique identifier for a tracked asset.
    AssetId
}

uuid_id! {
    /// Tenant scope: every order, trade, account and asset belongs to one family.
    FamilyId
}

uuid_id! {
    /// A family member, the identity that submits orders.
    MemberId
}
