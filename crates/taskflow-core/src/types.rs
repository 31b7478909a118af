//! Identifier types shared by every TaskFlow crate.
//!
//! All identifiers are database-assigned 64-bit integers. Each one gets its
//! own newtype so a page id can never be passed where a notebook id is
//! expected. They serialize transparently as plain JSON numbers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Returns the raw database value.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    };
}

id_type!(
    /// Identifier of a registered user.
    ///
    /// This is the value carried (as a decimal string) in the `userID` claim
    /// of every session token.
    UserId
);

id_type!(
    /// Identifier of a notebook.
    NotebookId
);

id_type!(
    /// Identifier of a page inside a notebook.
    PageId
);

id_type!(
    /// Identifier of a task on a page.
    TaskId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_display_round_trips_through_from_str() {
        let id = UserId(64);
        assert_eq!(id.to_string(), "64");
        assert_eq!("64".parse::<UserId>().unwrap(), id);
    }

    #[test]
    fn test_user_id_rejects_non_numeric() {
        assert!("alice".parse::<UserId>().is_err());
        assert!("".parse::<UserId>().is_err());
    }

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&NotebookId(7)).unwrap();
        assert_eq!(json, "7");
        let back: PageId = serde_json::from_str("12").unwrap();
        assert_eq!(back, PageId(12));
    }
}
