use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GlimpseError;

/// Kind of screenshot the caller expects, which decides both the prompt and
/// how the model output is post-processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    Post,
    Profile,
}

impl ExtractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Profile => "profile",
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionMode {
    type Err = GlimpseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(Self::Post),
            "profile" => Ok(Self::Profile),
            other => Err(GlimpseError::InvalidMode(other.to_string())),
        }
    }
}
