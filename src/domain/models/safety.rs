use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::ConfigError;

/// Content categories the service can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HarmCategory {
    Harassment,
    HateSpeech,
    SexuallyExplicit,
    DangerousContent,
}

impl HarmCategory {
    pub const ALL: [HarmCategory; 4] = [
        HarmCategory::Harassment,
        HarmCategory::HateSpeech,
        HarmCategory::SexuallyExplicit,
        HarmCategory::DangerousContent,
    ];

    /// Wire name used by the generateContent API.
    pub fn as_str(&self) -> &'static str {
        match self {
            HarmCategory::Harassment => "HARM_CATEGORY_HARASSMENT",
            HarmCategory::HateSpeech => "HARM_CATEGORY_HATE_SPEECH",
            HarmCategory::SexuallyExplicit => "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            HarmCategory::DangerousContent => "HARM_CATEGORY_DANGEROUS_CONTENT",
        }
    }
}

/// How aggressively a category is blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HarmBlockThreshold {
    Unspecified,
    BlockLowAndAbove,
    BlockMediumAndAbove,
    BlockOnlyHigh,
    BlockNone,
}

impl HarmBlockThreshold {
    pub fn as_str(&self) -> &'static str {
        match self {
            HarmBlockThreshold::Unspecified => "HARM_BLOCK_THRESHOLD_UNSPECIFIED",
            HarmBlockThreshold::BlockLowAndAbove => "BLOCK_LOW_AND_ABOVE",
            HarmBlockThreshold::BlockMediumAndAbove => "BLOCK_MEDIUM_AND_ABOVE",
            HarmBlockThreshold::BlockOnlyHigh => "BLOCK_ONLY_HIGH",
            HarmBlockThreshold::BlockNone => "BLOCK_NONE",
        }
    }
}

impl FromStr for HarmBlockThreshold {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "none" | "block_none" => Ok(HarmBlockThreshold::BlockNone),
            "high" | "only_high" | "block_only_high" => Ok(HarmBlockThreshold::BlockOnlyHigh),
            "medium" | "medium_and_above" | "block_medium_and_above" => {
                Ok(HarmBlockThreshold::BlockMediumAndAbove)
            }
            "low" | "low_and_above" | "block_low_and_above" => {
                Ok(HarmBlockThreshold::BlockLowAndAbove)
            }
            "unspecified" | "harm_block_threshold_unspecified" => {
                Ok(HarmBlockThreshold::Unspecified)
            }
            other => Err(ConfigError::invalid(format!(
                "unknown safety threshold '{other}'"
            ))),
        }
    }
}

/// Per-category block thresholds, applied identically to every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySettings {
    thresholds: BTreeMap<HarmCategory, HarmBlockThreshold>,
}

impl SafetySettings {
    pub fn uniform(threshold: HarmBlockThreshold) -> Self {
        Self {
            thresholds: HarmCategory::ALL
                .iter()
                .map(|category| (*category, threshold))
                .collect(),
        }
    }

    /// Entries in stable category order.
    pub fn iter(&self) -> impl Iterator<Item = (HarmCategory, HarmBlockThreshold)> + '_ {
        self.thresholds.iter().map(|(c, t)| (*c, *t))
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }
}

impl Default for SafetySettings {
    fn default() -> Self {
        Self::uniform(HarmBlockThreshold::BlockNone)
    }
}
