use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical source identifiers used in metadata and envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Crunchbase,
    Linkedin,
    Websearch,
    Directweb,
}

impl SourceId {
    pub const ALL: [Self; 4] = [
        Self::Crunchbase,
        Self::Linkedin,
        Self::Websearch,
        Self::Directweb,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Crunchbase => "crunchbase",
            Self::Linkedin => "linkedin",
            Self::Websearch => "websearch",
            Self::Directweb => "directweb",
        }
    }

    /// Human-readable label used in progress messages and CLI output.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Crunchbase => "Crunchbase",
            Self::Linkedin => "LinkedIn",
            Self::Websearch => "web search",
            Self::Directweb => "direct web",
        }
    }

    /// The kind of upstream this source represents.
    pub const fn role(self) -> &'static str {
        match self {
            Self::Crunchbase => "funding database",
            Self::Linkedin => "professional network",
            Self::Websearch => "general web search",
            Self::Directweb => "direct-site fallback",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "crunchbase" => Ok(Self::Crunchbase),
            "linkedin" => Ok(Self::Linkedin),
            "websearch" | "web_search" => Ok(Self::Websearch),
            "directweb" | "direct_web" => Ok(Self::Directweb),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}
