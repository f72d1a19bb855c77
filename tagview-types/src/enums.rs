use serde::{Deserialize, Serialize};

/// Content rating as reported by the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Rating {
    #[default]
    #[serde(rename = "s")]
    Safe,
    #[serde(rename = "q")]
    Questionable,
    #[serde(rename = "e")]
    Explicit,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Safe => "s",
            Rating::Questionable => "q",
            Rating::Explicit => "e",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "s" | "safe" => Some(Rating::Safe),
            "q" | "questionable" => Some(Rating::Questionable),
            "e" | "explicit" => Some(Rating::Explicit),
            _ => None,
        }
    }
}

/// Side of the window a page is loaded into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadDirection {
    /// Posts preceding the window head (newer posts)
    Previous,
    /// Posts following the window tail (older posts)
    Next,
}

/// Direction of a fullscreen navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Forward,
    Backward,
}

impl NavDirection {
    /// Page load that extends the window in this direction
    pub fn load_direction(&self) -> LoadDirection {
        match self {
            NavDirection::Forward => LoadDirection::Next,
            NavDirection::Backward => LoadDirection::Previous,
        }
    }
}
