use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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
    };
}

str_enum!(FlagSeverity {
    Critical => "critical",
    High => "high",
    Medium => "medium",
    Low => "low",
    Info => "info",
});

str_enum!(FlagCategory {
    Dosage => "dosage",
    Age => "age",
    Interaction => "interaction",
    Contraindication => "contraindication",
    Duration => "duration",
    Frequency => "frequency",
});

str_enum!(RiskLevel {
    Safe => "safe",
    Caution => "caution",
    Warning => "warning",
    Critical => "critical",
});

str_enum!(ValidationMethod {
    AiClinicalNlp => "ai_clinical_nlp",
    RuleBased => "rule_based",
    Hybrid => "hybrid",
});

str_enum!(AlertSeverity {
    Info => "info",
    Warning => "warning",
    Critical => "critical",
});

str_enum!(AlertStatus {
    Pending => "pending",
    Acknowledged => "acknowledged",
    Resolved => "resolved",
});
