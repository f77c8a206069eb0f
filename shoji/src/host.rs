use crate::core::DisplaySet;
use anyhow::{Context, Result};
use shoji_ipc::{ChromeOptions, HostMessage, HostResult, WindowGeometry};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

pub type WindowHandle = u32;

/// Source of the display geometry placement is computed against.
pub trait DisplayProvider {
    fn displays(&mut self) -> Result<DisplaySet>;
}

/// Native window operations, owned by the windowing host.
pub trait WindowFactory {
    fn create_window(
        &mut self,
        geometry: WindowGeometry,
        chrome: &ChromeOptions,
        filename: &str,
    ) -> Result<WindowHandle>;
    fn close_window(&mut self, handle: WindowHandle) -> Result<()>;
    fn focus_window(&mut self, handle: WindowHandle) -> Result<()>;
    fn send(&mut self, handle: WindowHandle, event: &str, payload: serde_json::Value)
        -> Result<()>;
    /// Blocks until the host reports the window closed.
    fn wait_closed(&mut self, handle: WindowHandle) -> Result<()>;
}

impl<T: WindowFactory + ?Sized> WindowFactory for &mut T {
    fn create_window(
        &mut self,
        geometry: WindowGeometry,
        chrome: &ChromeOptions,
        filename: &str,
    ) -> Result<WindowHandle> {
        (**self).create_window(geometry, chrome, filename)
    }

    fn close_window(&mut self, handle: WindowHandle) -> Result<()> {
        (**self).close_window(handle)
    }

    fn focus_window(&mut self, handle: WindowHandle) -> Result<()> {
        (**self).focus_window(handle)
    }

    fn send(
        &mut self,
        handle: WindowHandle,
        event: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        (**self).send(handle, event, payload)
    }

    fn wait_closed(&mut self, handle: WindowHandle) -> Result<()> {
        (**self).wait_closed(handle)
    }
}

/// A `shoji-host-<name>` child process speaking line-delimited JSON.
///
/// The streams are generic so the protocol can run over any pipe pair.
pub struct HostProcess<W = ChildStdin, R = BufReader<ChildStdout>> {
    child: Option<Child>,
    stdin: W,
    stdout: R,
}

impl HostProcess {
    pub fn spawn(name: &str) -> Result<Self> {
        let command = format!("shoji-host-{}", name);
        let program = locate(&command);
        let mut child = Command::new(&program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("Failed to spawn host: {}", command))?;

        let stdin = child.stdin.take().context("Failed to get stdin")?;
        let stdout = child.stdout.take().context("Failed to get stdout")?;

        tracing::info!("Host '{}' spawned", program.display());

        let mut host = Self::from_streams(stdin, BufReader::new(stdout));
        host.child = Some(child);
        Ok(host)
    }
}

impl<W: Write, R: BufRead> HostProcess<W, R> {
    /// Talks to a host that is already running on the other end of the streams.
    pub fn from_streams(stdin: W, stdout: R) -> Self {
        Self {
            child: None,
            stdin,
            stdout,
        }
    }

    /// Closes the protocol stream and waits for the host to exit.
    pub fn shutdown(self) -> Result<()> {
        let Self { child, stdin, .. } = self;
        drop(stdin);
        if let Some(mut child) = child {
            let status = child.wait().context("Failed to wait for host")?;
            tracing::debug!("Host exited with {}", status);
        }
        Ok(())
    }

    fn request(&mut self, msg: &HostMessage) -> Result<HostResult> {
        serde_json::to_writer(&mut self.stdin, msg)?;
        writeln!(self.stdin)?;
        self.stdin.flush()?;

        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            anyhow::bail!("Host closed the connection");
        }

        let result: HostResult = serde_json::from_str(&line)
            .with_context(|| format!("Failed to parse host response: {}", line.trim()))?;

        match result {
            HostResult::Error { message } => anyhow::bail!("Host error: {}", message),
            result => Ok(result),
        }
    }

    fn expect_ok(&mut self, msg: &HostMessage) -> Result<()> {
        match self.request(msg)? {
            HostResult::Ok => Ok(()),
            other => anyhow::bail!("Unexpected host response: {:?}", other),
        }
    }

    fn expect_closed(&mut self, msg: &HostMessage, handle: WindowHandle) -> Result<()> {
        match self.request(msg)? {
            HostResult::Closed { window_id } if window_id == handle => Ok(()),
            other => anyhow::bail!("Unexpected host response: {:?}", other),
        }
    }
}

impl<W: Write, R: BufRead> DisplayProvider for HostProcess<W, R> {
    fn displays(&mut self) -> Result<DisplaySet> {
        match self.request(&HostMessage::Displays)? {
            HostResult::Displays { displays } => {
                tracing::debug!("Host reported {} displays", displays.len());
                Ok(DisplaySet::from_infos(displays)?)
            }
            other => anyhow::bail!("Unexpected host response to displays: {:?}", other),
        }
    }
}

impl<W: Write, R: BufRead> WindowFactory for HostProcess<W, R> {
    fn create_window(
        &mut self,
        geometry: WindowGeometry,
        chrome: &ChromeOptions,
        filename: &str,
    ) -> Result<WindowHandle> {
        let msg = HostMessage::CreateWindow {
            geometry,
            chrome: chrome.clone(),
            filename: filename.to_string(),
        };
        match self.request(&msg)? {
            HostResult::Created { window_id } => Ok(window_id),
            other => anyhow::bail!("Unexpected host response to create_window: {:?}", other),
        }
    }

    fn close_window(&mut self, handle: WindowHandle) -> Result<()> {
        self.expect_closed(&HostMessage::Close { window_id: handle }, handle)
    }

    fn focus_window(&mut self, handle: WindowHandle) -> Result<()> {
        self.expect_ok(&HostMessage::Focus { window_id: handle })
    }

    fn send(
        &mut self,
        handle: WindowHandle,
        event: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        self.expect_ok(&HostMessage::Send {
            window_id: handle,
            event: event.to_string(),
            payload,
        })
    }

    fn wait_closed(&mut self, handle: WindowHandle) -> Result<()> {
        self.expect_closed(&HostMessage::WaitClosed { window_id: handle }, handle)
    }
}

/// Prefers a host binary installed next to the running executable, then PATH.
fn locate(command: &str) -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(command)))
        .filter(|candidate| candidate.is_file())
        .unwrap_or_else(|| PathBuf::from(command))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlacementError;
    use std::io::Cursor;

    type ScriptedHost = HostProcess<Vec<u8>, Cursor<Vec<u8>>>;

    fn scripted(responses: &[&str]) -> ScriptedHost {
        let mut script = String::new();
        for line in responses {
            script.push_str(line);
            script.push('\n');
        }
        HostProcess::from_streams(Vec::new(), Cursor::new(script.into_bytes()))
    }

    fn sent(host: &ScriptedHost) -> Vec<HostMessage> {
        String::from_utf8_lossy(&host.stdin)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn chrome() -> ChromeOptions {
        ChromeOptions {
            frame: false,
            background_color: "#000".to_string(),
        }
    }

    #[test]
    fn test_displays_builds_display_set() {
        let mut host = scripted(&[
            r#"{"type":"displays","displays":[{"id":2,"bounds":{"x":1920,"y":0,"width":1280,"height":1024},"work_area":{"x":1920,"y":0,"width":1280,"height":1024}},{"id":1,"bounds":{"x":0,"y":0,"width":1920,"height":1080},"work_area":{"x":0,"y":0,"width":1920,"height":1040},"primary":true}]}"#,
        ]);
        let displays = host.displays().unwrap();
        assert_eq!(displays.primary().id, 1);
        assert_eq!(displays.secondary()[0].id, 2);
        assert_eq!(sent(&host), vec![HostMessage::Displays]);
    }

    #[test]
    fn test_displays_without_primary_is_placement_error() {
        let mut host = scripted(&[
            r#"{"type":"displays","displays":[{"id":2,"bounds":{"x":0,"y":0,"width":800,"height":600},"work_area":{"x":0,"y":0,"width":800,"height":600}}]}"#,
        ]);
        let err = host.displays().unwrap_err();
        assert_eq!(
            err.downcast_ref::<PlacementError>(),
            Some(&PlacementError::NoPrimaryDisplay(1))
        );
    }

    #[test]
    fn test_create_focus_send_close() {
        let mut host = scripted(&[
            r#"{"type":"created","window_id":4}"#,
            r#"{"type":"ok"}"#,
            r#"{"type":"ok"}"#,
            r#"{"type":"closed","window_id":4}"#,
        ]);
        let geometry = WindowGeometry {
            x: 560,
            y: 220,
            width: 800,
            height: 600,
        };

        let handle = host.create_window(geometry, &chrome(), "main.html").unwrap();
        assert_eq!(handle, 4);
        host.focus_window(handle).unwrap();
        host.send(handle, "data", serde_json::json!([1, 2])).unwrap();
        host.close_window(handle).unwrap();

        assert_eq!(
            sent(&host),
            vec![
                HostMessage::CreateWindow {
                    geometry,
                    chrome: chrome(),
                    filename: "main.html".to_string(),
                },
                HostMessage::Focus { window_id: 4 },
                HostMessage::Send {
                    window_id: 4,
                    event: "data".to_string(),
                    payload: serde_json::json!([1, 2]),
                },
                HostMessage::Close { window_id: 4 },
            ]
        );
    }

    #[test]
    fn test_host_error_is_reported() {
        let mut host = scripted(&[r#"{"type":"error","message":"unknown window: 9"}"#]);
        let err = host.focus_window(9).unwrap_err();
        assert_eq!(err.to_string(), "Host error: unknown window: 9");
    }

    #[test]
    fn test_closed_for_other_window_is_rejected() {
        let mut host = scripted(&[r#"{"type":"closed","window_id":2}"#]);
        let err = host.wait_closed(1).unwrap_err();
        assert!(err.to_string().starts_with("Unexpected host response"));
    }

    #[test]
    fn test_unexpected_variant_is_rejected() {
        let mut host = scripted(&[
            r#"{"type":"created","window_id":1}"#,
            r#"{"type":"ok"}"#,
        ]);
        assert!(host.focus_window(1).is_err());
        assert!(host.displays().is_err());
    }

    #[test]
    fn test_closed_connection() {
        let mut host = scripted(&[]);
        let err = host.displays().unwrap_err();
        assert_eq!(err.to_string(), "Host closed the connection");
    }

    #[test]
    fn test_malformed_response() {
        let mut host = scripted(&["not json"]);
        let err = host.focus_window(1).unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse host response: not json");
    }

    #[test]
    fn test_shutdown_without_child() {
        let host = scripted(&[]);
        host.shutdown().unwrap();
    }
}
