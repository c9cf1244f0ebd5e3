use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::JournalError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mood {
    VerySad,
    Sad,
    #[default]
    Neutral,
    Happy,
    VeryHappy,
}

impl Mood {
    pub fn all() -> [Mood; 5] {
        [
            Mood::VerySad,
            Mood::Sad,
            Mood::Neutral,
            Mood::Happy,
            Mood::VeryHappy,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::VerySad => "very-sad",
            Mood::Sad => "sad",
            Mood::Neutral => "neutral",
            Mood::Happy => "happy",
            Mood::VeryHappy => "very-happy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mood::VerySad => "Very Sad",
            Mood::Sad => "Sad",
            Mood::Neutral => "Neutral",
            Mood::Happy => "Happy",
            Mood::VeryHappy => "Very Happy",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Mood::VerySad => "😢",
            Mood::Sad => "😞",
            Mood::Neutral => "😐",
            Mood::Happy => "😊",
            Mood::VeryHappy => "😄",
        }
    }

    /// Next mood in picker order, wrapping around.
    pub fn cycle(&self) -> Mood {
        let all = Mood::all();
        let pos = all.iter().position(|m| m == self).unwrap_or(0);
        all[(pos + 1) % all.len()]
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Mood {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "very-sad" => Ok(Mood::VerySad),
            "sad" => Ok(Mood::Sad),
            "neutral" | "ok" => Ok(Mood::Neutral),
            "happy" => Ok(Mood::Happy),
            "very-happy" => Ok(Mood::VeryHappy),
            _ => Err(JournalError::UnknownMood(s.to_string())),
        }
    }
}

impl Mood {
    /// Lenient read of a stored value; anything unrecognised is neutral.
    pub fn from_stored(raw: &str) -> Mood {
        Mood::from_str(raw).unwrap_or_default()
    }
}
