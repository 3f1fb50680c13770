use std::fmt;

use serde::{Deserialize, Serialize};

/// Selects which backend model answers a request.
///
/// The key is mapped to a concrete backend model identifier by
/// [`backend_id`](ModelKey::backend_id). Unrecognized names fall back to the
/// default key rather than failing; model choice is a preference, not a
/// precondition.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKey {
    /// The fast, inexpensive model.
    #[default]
    Fast,

    /// The slower, more accurate model.
    Accurate,
}

impl ModelKey {
    /// The backend model identifier this key maps to.
    pub fn backend_id(&self) -> &'static str {
        match self {
            ModelKey::Fast => "gpt-3.5-turbo",
            ModelKey::Accurate => "gpt-4-turbo",
        }
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKey::Fast => write!(f, "fast"),
            ModelKey::Accurate => write!(f, "accurate"),
        }
    }
}

impl std::str::FromStr for ModelKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "fast" | "gpt3" | "gpt-3.5-turbo" => ModelKey::Fast,
            "accurate" | "gpt4" | "gpt-4-turbo" => ModelKey::Accurate,
            _ => ModelKey::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_id_mapping() {
        assert_eq!(ModelKey::Fast.backend_id(), "gpt-3.5-turbo");
        assert_eq!(ModelKey::Accurate.backend_id(), "gpt-4-turbo");
    }

    #[test]
    fn parse_known_names() {
        assert_eq!("fast".parse::<ModelKey>().unwrap(), ModelKey::Fast);
        assert_eq!("gpt4".parse::<ModelKey>().unwrap(), ModelKey::Accurate);
        assert_eq!(" Accurate ".parse::<ModelKey>().unwrap(), ModelKey::Accurate);
    }

    #[test]
    fn unknown_names_fall_back_to_default() {
        assert_eq!("gpt-7-colossus".parse::<ModelKey>().unwrap(), ModelKey::Fast);
        assert_eq!("".parse::<ModelKey>().unwrap(), ModelKey::default());
    }

    #[test]
    fn serialization() {
        assert_eq!(serde_json::to_string(&ModelKey::Fast).unwrap(), r#""fast""#);
        assert_eq!(
            serde_json::to_string(&ModelKey::Accurate).unwrap(),
            r#""accurate""#
        );
    }
}
