//! Strongly-typed ID wrappers for plans, expenses and recurring rules
//!
//! Each entity gets its own newtype so a plan id can never be handed to an
//! expense lookup by mistake.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Short display form used in listings
            pub fn short(&self) -> String {
                format!("{}{}", $display_prefix, &self.0.to_string()[..8])
            }

            /// Check whether `s` is a unique prefix-style reference to this id
            ///
            /// Accepts the full UUID, the short display form, or the first
            /// characters of the UUID (at least four).
            pub fn matches(&self, s: &str) -> bool {
                let s = s.trim().to_ascii_lowercase();
                let s = s.strip_prefix($display_prefix).unwrap_or(&s);
                s.len() >= 4 && self.0.to_string().starts_with(s)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.short())
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(PlanId, "pln-");
define_id!(ExpenseId, "exp-");
define_id!(RecurringRuleId, "rec-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        let id = PlanId::new();
        let display = id.to_string();
        assert!(display.starts_with("pln-"));
        assert_eq!(display.len(), 12);
    }

    #[test]
    fn test_id_parse_full_uuid() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id: ExpenseId = uuid_str.parse().unwrap();
        assert_eq!(id.as_uuid().to_string(), uuid_str);

        let prefixed: ExpenseId = format!("exp-{}", uuid_str).parse().unwrap();
        assert_eq!(prefixed, id);
    }

    #[test]
    fn test_id_matches_short_forms() {
        let id = RecurringRuleId::from(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap());
        assert!(id.matches("rec-550e8400"));
        assert!(id.matches("550e"));
        assert!(id.matches("550E8400"));
        assert!(!id.matches("55"));
        assert!(!id.matches("rec-660e8400"));
    }

    #[test]
    fn test_id_serialization() {
        let id = PlanId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: PlanId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
