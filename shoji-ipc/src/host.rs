use crate::display::DisplayInfo;
use crate::window::{ChromeOptions, WindowGeometry};
use serde::{Deserialize, Serialize};

/// Request sent from the shell to a host process, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMessage {
    Displays,
    CreateWindow {
        geometry: WindowGeometry,
        chrome: ChromeOptions,
        filename: String,
    },
    Close {
        window_id: u32,
    },
    Focus {
        window_id: u32,
    },
    Send {
        window_id: u32,
        event: String,
        payload: serde_json::Value,
    },
    WaitClosed {
        window_id: u32,
    },
}

/// Reply to exactly one [`HostMessage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostResult {
    Displays { displays: Vec<DisplayInfo> },
    Created { window_id: u32 },
    Closed { window_id: u32 },
    Ok,
    Error { message: String },
}
