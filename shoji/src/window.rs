use crate::core::{resolve, DisplaySet};
use crate::host::{WindowFactory, WindowHandle};
use anyhow::Result;
use shoji_ipc::WindowConfig;

type Observer = Box<dyn FnMut()>;

/// A placed host window.
///
/// Placement is resolved once at creation; the window keeps only the host
/// handle.
pub struct Window<F: WindowFactory> {
    handle: WindowHandle,
    factory: F,
    close_requested: bool,
    closed: bool,
    on_close: Option<Observer>,
    on_closed: Option<Observer>,
}

impl<F: WindowFactory> Window<F> {
    pub fn create(config: &WindowConfig, displays: &DisplaySet, mut factory: F) -> Result<Self> {
        if config.filename.is_empty() {
            anyhow::bail!("No filename given for window");
        }

        let geometry = resolve(config, displays)?;
        let handle = factory.create_window(geometry, &config.chrome(), &config.filename)?;

        tracing::info!(
            "Window {} created at ({}, {}) size {}x{}: {}",
            handle,
            geometry.x,
            geometry.y,
            geometry.width,
            geometry.height,
            config.filename
        );

        Ok(Self {
            handle,
            factory,
            close_requested: false,
            closed: false,
            on_close: None,
            on_closed: None,
        })
    }

    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    /// Called just before the host is asked to close the window.
    pub fn on_close(&mut self, observer: impl FnMut() + 'static) {
        self.on_close = Some(Box::new(observer));
    }

    /// Called once the host reports the window gone.
    pub fn on_closed(&mut self, observer: impl FnMut() + 'static) {
        self.on_closed = Some(Box::new(observer));
    }

    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        // A failed close may be retried; observers hear about it once.
        if !self.close_requested {
            self.close_requested = true;
            if let Some(observer) = self.on_close.as_mut() {
                observer();
            }
        }
        self.factory.close_window(self.handle)?;
        self.mark_closed();
        Ok(())
    }

    pub fn focus(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.factory.focus_window(self.handle)
    }

    pub fn send(&mut self, event: &str, payload: serde_json::Value) -> Result<()> {
        self.ensure_open()?;
        tracing::debug!("Sending '{}' to window {}", event, self.handle);
        self.factory.send(self.handle, event, payload)
    }

    pub fn wait_closed(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.factory.wait_closed(self.handle)?;
        self.mark_closed();
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            anyhow::bail!("Window {} is closed", self.handle);
        }
        Ok(())
    }

    fn mark_closed(&mut self) {
        self.closed = true;
        tracing::info!("Window {} closed", self.handle);
        if let Some(observer) = self.on_closed.as_mut() {
            observer();
        }
    }
}
