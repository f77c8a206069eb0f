use anyhow::{Context, Result};
use shoji_ipc::{ChromeOptions, DisplayInfo, HostMessage, HostResult, Rect, WindowGeometry};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

const DISPLAYS_ENV: &str = "SHOJI_HEADLESS_DISPLAYS";
const TASKBAR_HEIGHT: u32 = 40;

#[derive(Debug)]
struct HeadlessWindow {
    #[allow(dead_code)]
    geometry: WindowGeometry,
    #[allow(dead_code)]
    chrome: ChromeOptions,
    filename: String,
    outbox: Vec<(String, serde_json::Value)>,
}

struct HostState {
    displays: Vec<DisplayInfo>,
    windows: HashMap<u32, HeadlessWindow>,
    focused: Option<u32>,
    next_id: u32,
}

impl HostState {
    fn new(displays: Vec<DisplayInfo>) -> Self {
        Self {
            displays,
            windows: HashMap::new(),
            focused: None,
            next_id: 1,
        }
    }
}

fn main() -> Result<()> {
    // stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let displays: Vec<DisplayInfo> = match std::env::var_os(DISPLAYS_ENV) {
        Some(path) => {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.to_string_lossy()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.to_string_lossy()))?
        }
        None => default_displays(),
    };
    tracing::info!("Headless host serving {} displays", displays.len());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut state = HostState::new(displays);

    for line in stdin.lock().lines() {
        let line = line?;
        let result = match serde_json::from_str::<HostMessage>(&line) {
            Ok(msg) => handle_message(&mut state, msg),
            Err(e) => HostResult::Error {
                message: format!("invalid message: {}", e),
            },
        };
        serde_json::to_writer(&mut stdout, &result)?;
        writeln!(stdout)?;
        stdout.flush()?;
    }

    tracing::info!("Protocol stream closed, {} windows left", state.windows.len());
    Ok(())
}

/// One primary 1920x1080 display with a taskbar along the bottom edge.
fn default_displays() -> Vec<DisplayInfo> {
    vec![DisplayInfo {
        id: 1,
        bounds: Rect::new(0, 0, 1920, 1080),
        work_area: Rect::new(0, 0, 1920, 1080 - TASKBAR_HEIGHT),
        primary: true,
    }]
}

fn handle_message(state: &mut HostState, msg: HostMessage) -> HostResult {
    match msg {
        HostMessage::Displays => HostResult::Displays {
            displays: state.displays.clone(),
        },
        HostMessage::CreateWindow {
            geometry,
            chrome,
            filename,
        } => {
            let window_id = state.next_id;
            state.next_id += 1;
            tracing::info!(
                "Window {} created at ({}, {}) size {}x{} frame={} background={}: {}",
                window_id,
                geometry.x,
                geometry.y,
                geometry.width,
                geometry.height,
                chrome.frame,
                chrome.background_color,
                filename
            );
            state.windows.insert(
                window_id,
                HeadlessWindow {
                    geometry,
                    chrome,
                    filename,
                    outbox: Vec::new(),
                },
            );
            HostResult::Created { window_id }
        }
        HostMessage::Close { window_id } | HostMessage::WaitClosed { window_id } => {
            match state.windows.remove(&window_id) {
                Some(window) => {
                    if state.focused == Some(window_id) {
                        state.focused = None;
                    }
                    tracing::info!(
                        "Window {} closed ({} messages delivered): {}",
                        window_id,
                        window.outbox.len(),
                        window.filename
                    );
                    HostResult::Closed { window_id }
                }
                None => unknown_window(window_id),
            }
        }
        HostMessage::Focus { window_id } => {
            if !state.windows.contains_key(&window_id) {
                return unknown_window(window_id);
            }
            state.focused = Some(window_id);
            tracing::debug!("Window {} focused", window_id);
            HostResult::Ok
        }
        HostMessage::Send {
            window_id,
            event,
            payload,
        } => match state.windows.get_mut(&window_id) {
            Some(window) => {
                tracing::info!("Window {} received '{}': {}", window_id, event, payload);
                window.outbox.push((event, payload));
                HostResult::Ok
            }
            None => unknown_window(window_id),
        },
    }
}

fn unknown_window(window_id: u32) -> HostResult {
    HostResult::Error {
        message: format!("unknown window: {}", window_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(state: &mut HostState) -> u32 {
        let result = handle_message(
            state,
            HostMessage::CreateWindow {
                geometry: WindowGeometry {
                    x: 560,
                    y: 220,
                    width: 800,
                    height: 600,
                },
                chrome: ChromeOptions {
                    frame: false,
                    background_color: "#fff".to_string(),
                },
                filename: "main.html".to_string(),
            },
        );
        match result {
            HostResult::Created { window_id } => window_id,
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_default_display_has_taskbar() {
        let displays = default_displays();
        assert_eq!(displays.len(), 1);
        assert!(displays[0].primary);
        assert_eq!(displays[0].bounds.height, 1080);
        assert_eq!(displays[0].work_area.height, 1040);
    }

    #[test]
    fn test_displays_request() {
        let mut state = HostState::new(default_displays());
        let result = handle_message(&mut state, HostMessage::Displays);
        assert_eq!(
            result,
            HostResult::Displays {
                displays: default_displays()
            }
        );
    }

    #[test]
    fn test_window_ids_increase() {
        let mut state = HostState::new(default_displays());
        assert_eq!(create(&mut state), 1);
        assert_eq!(create(&mut state), 2);
        assert_eq!(state.windows.len(), 2);
        assert_eq!(state.windows[&1].geometry.width, 800);
        assert_eq!(state.windows[&1].chrome.background_color, "#fff");
    }

    #[test]
    fn test_send_records_in_outbox() {
        let mut state = HostState::new(default_displays());
        let id = create(&mut state);
        let result = handle_message(
            &mut state,
            HostMessage::Send {
                window_id: id,
                event: "data".to_string(),
                payload: serde_json::json!({ "user": "guest" }),
            },
        );
        assert_eq!(result, HostResult::Ok);
        assert_eq!(state.windows[&id].outbox.len(), 1);
        assert_eq!(state.windows[&id].outbox[0].0, "data");
    }

    #[test]
    fn test_focus_and_close() {
        let mut state = HostState::new(default_displays());
        let id = create(&mut state);

        assert_eq!(
            handle_message(&mut state, HostMessage::Focus { window_id: id }),
            HostResult::Ok
        );
        assert_eq!(state.focused, Some(id));

        assert_eq!(
            handle_message(&mut state, HostMessage::Close { window_id: id }),
            HostResult::Closed { window_id: id }
        );
        assert_eq!(state.focused, None);
        assert!(state.windows.is_empty());
    }

    #[test]
    fn test_wait_closed_closes_immediately() {
        let mut state = HostState::new(default_displays());
        let id = create(&mut state);
        assert_eq!(
            handle_message(&mut state, HostMessage::WaitClosed { window_id: id }),
            HostResult::Closed { window_id: id }
        );
        assert!(state.windows.is_empty());
    }

    #[test]
    fn test_unknown_window_is_error() {
        let mut state = HostState::new(default_displays());
        for msg in [
            HostMessage::Focus { window_id: 9 },
            HostMessage::Close { window_id: 9 },
            HostMessage::Send {
                window_id: 9,
                event: "data".to_string(),
                payload: serde_json::Value::Null,
            },
        ] {
            let result = handle_message(&mut state, msg);
            assert!(matches!(result, HostResult::Error { .. }));
        }
    }
}
