use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw placement value as written in a window configuration.
///
/// Values stay untyped on the wire so that a bad keyword can be reported
/// with its original spelling when the placement is resolved. Anything that
/// is neither an integer nor a string lands in `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlacementValue {
    Integer(i64),
    Text(String),
    Other(serde_json::Value),
}

impl PlacementValue {
    /// The integer this value denotes, if any. Numeric strings count and
    /// fractional numbers are floored.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PlacementValue::Integer(n) => Some(*n),
            PlacementValue::Text(s) => s.trim().parse().ok(),
            PlacementValue::Other(serde_json::Value::Number(n)) => {
                n.as_f64().map(|f| f.floor() as i64)
            }
            PlacementValue::Other(_) => None,
        }
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, PlacementValue::Text(s) if s == keyword)
    }
}

impl fmt::Display for PlacementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementValue::Integer(n) => write!(f, "{}", n),
            PlacementValue::Text(s) => write!(f, "{}", s),
            PlacementValue::Other(value) => write!(f, "{}", value),
        }
    }
}

impl From<i64> for PlacementValue {
    fn from(n: i64) -> Self {
        PlacementValue::Integer(n)
    }
}

impl From<&str> for PlacementValue {
    fn from(s: &str) -> Self {
        PlacementValue::Text(s.to_string())
    }
}

/// Declarative description of the window to open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// `"primary"` or the index of a secondary display, counted left to right.
    pub display: PlacementValue,
    /// `"left"`, `"center"`, `"right"` or a pixel offset from the display origin.
    pub x: PlacementValue,
    /// `"top"`, `"center"`, `"bottom"` or a pixel offset from the work area origin.
    pub y: PlacementValue,
    /// `"full"` or a pixel count.
    pub width: PlacementValue,
    /// `"full"` or a pixel count.
    pub height: PlacementValue,
    pub frame: bool,
    pub background_color: String,
    /// Page loaded into the window.
    pub filename: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            display: "primary".into(),
            x: "center".into(),
            y: "center".into(),
            width: "full".into(),
            height: "full".into(),
            frame: false,
            background_color: "#000".to_string(),
            filename: String::new(),
        }
    }
}

impl WindowConfig {
    pub fn chrome(&self) -> ChromeOptions {
        ChromeOptions {
            frame: self.frame,
            background_color: self.background_color.clone(),
        }
    }
}

/// Window decoration passed through to the host untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChromeOptions {
    pub frame: bool,
    pub background_color: String,
}

/// Concrete window rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}
