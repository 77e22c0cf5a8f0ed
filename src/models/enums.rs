use serde::{Deserialize, Serialize};

use crate::db::DatabaseError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Severity {
    Mild => "mild",
    Moderate => "moderate",
    Severe => "severe",
});

str_enum!(Role {
    Patient => "patient",
    Doctor => "doctor",
    Admin => "admin",
});

str_enum!(SenderTag {
    User => "user",
    SystemAlert => "system_alert",
    SystemInfo => "system_info",
});

str_enum!(CarePlanStatus {
    Draft => "draft",
    Published => "published",
});

impl SenderTag {
    /// Label shown next to the message in the doctor's chat view.
    pub fn display_label(&self) -> Option<&'static str> {
        match self {
            Self::User => None,
            Self::SystemAlert => Some("System Alert"),
            Self::SystemInfo => Some("System Info"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn severity_parses_lowercase_only() {
        assert_eq!(Severity::from_str("severe").unwrap(), Severity::Severe);
        assert!(Severity::from_str("Severe").is_err());
        assert!(Severity::from_str("critical").is_err());
    }

    #[test]
    fn invalid_role_reports_field() {
        match Role::from_str("nurse") {
            Err(DatabaseError::InvalidEnum { field, value }) => {
                assert_eq!(field, "Role");
                assert_eq!(value, "nurse");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn serde_uses_storage_strings() {
        let json = serde_json::to_string(&SenderTag::SystemAlert).unwrap();
        assert_eq!(json, "\"system_alert\"");
        let tag: SenderTag = serde_json::from_str("\"system_info\"").unwrap();
        assert_eq!(tag, SenderTag::SystemInfo);
    }

    #[test]
    fn system_tags_have_labels() {
        assert_eq!(SenderTag::SystemAlert.display_label(), Some("System Alert"));
        assert_eq!(SenderTag::SystemInfo.display_label(), Some("System Info"));
        assert_eq!(SenderTag::User.display_label(), None);
    }
}
