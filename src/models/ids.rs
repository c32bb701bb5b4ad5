//! Opaque Slack identifiers.
//!
//! Slack hands out user, channel and message identifiers as plain strings.
//! They are wrapped in newtypes so a channel can never be passed where a user
//! is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! slack_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
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
    };
}

slack_id!(
    /// A Slack user, e.g. `U024BE7LH`.
    UserId
);

slack_id!(
    /// A Slack channel, e.g. `C024BE91L`.
    ChannelId
);

slack_id!(
    /// A message timestamp. Slack uses it as the message's address for
    /// reactions and thread replies.
    MessageTs
);

impl UserId {
    /// Render as a Slack mention (`<@U024BE7LH>`).
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_mention() {
        let user = UserId::from("U024BE7LH");
        assert_eq!(user.mention(), "<@U024BE7LH>");
    }

    #[test]
    fn test_display_is_raw_id() {
        let channel = ChannelId::new("C024BE91L");
        assert_eq!(format!("{}", channel), "C024BE91L");
    }

    #[test]
    fn test_debug_names_the_kind() {
        let ts = MessageTs::from("1355517523.000005".to_string());
        assert_eq!(format!("{:?}", ts), "MessageTs(1355517523.000005)");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let user = UserId::from("U1");
        assert_eq!(serde_json::to_string(&user).unwrap(), "\"U1\"");

        let parsed: UserId = serde_json::from_str("\"U1\"").unwrap();
        assert_eq!(parsed, user);
    }

    #[test]
    fn test_equality() {
        assert_eq!(UserId::from("same"), UserId::from("same"));
        assert_ne!(UserId::from("same"), UserId::from("different"));
    }
}
