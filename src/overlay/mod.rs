//! Overlay window client
//!
//! Creates one ARGB window, publishes its WM metadata, maps it and waits for
//! the window manager's `WM_DELETE_WINDOW` message before unmapping it and
//! closing the connection.
//!
//! Setup runs step by step on the caller's thread. The close wait consumes the
//! client, so whoever runs it owns the connection outright.

pub mod atoms;
pub mod attributes;
pub mod display;
pub mod error;
pub mod events;
pub mod geometry;
pub mod visual;

#[cfg(test)]
pub mod testing;

use tracing::{debug, info};
use x11rb::protocol::xproto::{AtomEnum, CW, Colormap, EventMask, Window};

use crate::config::WindowConfig;
use crate::overlay::atoms::{AtomCache, WmAtoms};
use crate::overlay::attributes::{WindowAttribute, WindowAttributes};
use crate::overlay::display::{CreateWindowRequest, DisplayConnection, X11Display};
use crate::overlay::error::{OverlayError, Result};
use crate::overlay::geometry::{Geometry, Rgb16};
use crate::overlay::visual::{SelectedVisual, find_visual};

/// Lifecycle of the overlay client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Before `OverlayClient::connect` returns
    Disconnected,
    Connected,
    WindowCreated,
    Mapped,
    WaitingForClose,
    Closed,
}

/// Events the overlay window listens for
pub fn overlay_event_mask() -> EventMask {
    EventMask::STRUCTURE_NOTIFY | EventMask::EXPOSURE
}

/// The window this client created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayWindow {
    pub id: Window,
    pub visual: SelectedVisual,
    pub geometry: Geometry,
}

/// Single-window X11 client
pub struct OverlayClient<D: DisplayConnection> {
    display: D,
    state: ClientState,
    atoms: AtomCache,
    wm_atoms: Option<WmAtoms>,
    /// Colormap and the visual it was created for
    colormap: Option<(Colormap, SelectedVisual)>,
    window: Option<OverlayWindow>,
}

impl<D: DisplayConnection> OverlayClient<D> {
    /// Wrap an established connection.
    pub fn new(display: D) -> Self {
        Self {
            display,
            state: ClientState::Connected,
            atoms: AtomCache::new(),
            wm_atoms: None,
            colormap: None,
            window: None,
        }
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn window(&self) -> Option<&OverlayWindow> {
        self.window.as_ref()
    }

    pub fn wm_atoms(&self) -> Option<WmAtoms> {
        self.wm_atoms
    }

    fn transition(&mut self, next: ClientState) {
        debug!("Overlay client {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn expect_state(&self, operation: &'static str, allowed: &[ClientState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(OverlayError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn created_window(&self, operation: &'static str) -> Result<Window> {
        self.expect_state(operation, &[ClientState::WindowCreated, ClientState::Mapped])?;
        self.window.map(|w| w.id).ok_or(OverlayError::InvalidState {
            operation,
            state: self.state,
        })
    }

    /// Pick the first visual the screen advertises at `depth`.
    pub fn select_visual(&self, depth: u8) -> Result<SelectedVisual> {
        let visual = find_visual(self.display.screen(), depth)
            .ok_or(OverlayError::VisualNotFound { depth })?;
        info!("Selected visual 0x{:x} at depth {}", visual.visual, visual.depth);
        Ok(visual)
    }

    /// Allocate a 0xRRGGBB color in the screen's default colormap.
    pub fn alloc_background(&self, rgb: u32) -> Result<u32> {
        let colormap = self.display.screen().default_colormap;
        let pixel = self.display.alloc_color(colormap, Rgb16::from_hex(rgb))?;
        debug!("Allocated background #{:06x} as pixel 0x{:x}", rgb, pixel);
        Ok(pixel)
    }

    /// Create the colormap for `visual`, or return the one already created.
    ///
    /// The create request is checked, so a visual the server rejects fails
    /// here rather than in `create_window`.
    pub fn acquire_colormap(&mut self, visual: SelectedVisual) -> Result<Colormap> {
        if let Some((colormap, bound)) = self.colormap {
            if bound.visual != visual.visual {
                return Err(OverlayError::ColormapVisualMismatch {
                    bound: bound.visual,
                    requested: visual.visual,
                });
            }
            return Ok(colormap);
        }

        let colormap = self.display.generate_id()?;
        let root = self.display.screen().root;
        self.display.create_colormap(colormap, root, visual.visual)?;
        info!("Created colormap 0x{:x} for visual 0x{:x}", colormap, visual.visual);

        self.colormap = Some((colormap, visual));
        Ok(colormap)
    }

    /// Create the overlay window as a child of the root window.
    pub fn create_window(
        &mut self,
        visual: SelectedVisual,
        geometry: Geometry,
        attributes: WindowAttributes,
    ) -> Result<Window> {
        self.expect_state("create_window", &[ClientState::Connected])?;

        if let Some(&WindowAttribute::Colormap(requested)) = attributes.get(CW::COLORMAP) {
            if let Some((colormap, bound)) = self.colormap {
                if colormap == requested && bound != visual {
                    return Err(OverlayError::ColormapVisualMismatch {
                        bound: bound.visual,
                        requested: visual.visual,
                    });
                }
            }
        }

        let request = CreateWindowRequest {
            window: self.display.generate_id()?,
            parent: self.display.screen().root,
            depth: visual.depth,
            visual: visual.visual,
            geometry,
            attributes,
        };
        debug!(
            "CreateWindow 0x{:x} mask 0x{:x} values {:?}",
            request.window,
            request.attributes.value_mask(),
            request.attributes.values()
        );
        self.display.create_window(&request)?;

        info!(
            "Created window 0x{:x} at {},{} {}x{} depth {}",
            request.window, geometry.x, geometry.y, geometry.width, geometry.height, visual.depth
        );
        self.window = Some(OverlayWindow {
            id: request.window,
            visual,
            geometry,
        });
        self.transition(ClientState::WindowCreated);
        Ok(request.window)
    }

    /// Declare `WM_DELETE_WINDOW` in the window's `WM_PROTOCOLS`.
    pub fn set_protocol_handshake(&mut self) -> Result<WmAtoms> {
        let window = self.created_window("set_protocol_handshake")?;
        let atoms = WmAtoms::intern(&self.display, &mut self.atoms)?;

        self.display.change_property32(
            window,
            atoms.wm_protocols,
            AtomEnum::ATOM.into(),
            &[atoms.wm_delete_window],
        )?;
        debug!("Window 0x{:x} supports WM_DELETE_WINDOW", window);

        self.wm_atoms = Some(atoms);
        Ok(atoms)
    }

    /// Set `WM_NAME`.
    pub fn set_window_title(&self, title: &str) -> Result<()> {
        let window = self.created_window("set_window_title")?;
        self.display.change_property8(
            window,
            AtomEnum::WM_NAME.into(),
            AtomEnum::STRING.into(),
            title.as_bytes(),
        )
    }

    pub fn configure_window(&self, geometry: &Geometry) -> Result<()> {
        let window = self.created_window("configure_window")?;
        debug!("Configuring window 0x{:x} to {:?}", window, geometry);
        self.display.configure_window(window, geometry)
    }

    /// Queue a `MapWindow` request; visibility is not awaited.
    pub fn map_window(&mut self) -> Result<()> {
        let window = self.created_window("map_window")?;
        self.expect_state("map_window", &[ClientState::WindowCreated])?;
        self.display.map_window(window)?;
        info!("Mapped window 0x{:x}", window);
        self.transition(ClientState::Mapped);
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        self.display.flush()
    }

    /// Block until the window manager asks to close the window, then unmap
    /// it and close the connection. Returns the number of events consumed.
    pub fn run_until_close_requested(mut self) -> Result<usize> {
        self.expect_state("run_until_close_requested", &[ClientState::Mapped])?;
        let window = self.created_window("run_until_close_requested")?;
        let atoms = self.wm_atoms.ok_or(OverlayError::InvalidState {
            operation: "run_until_close_requested",
            state: self.state,
        })?;

        self.transition(ClientState::WaitingForClose);
        info!("Waiting for WM_DELETE_WINDOW on window 0x{:x}", window);
        let consumed = events::wait_for_close(&self.display, &atoms)?;

        self.display.unmap_window(window)?;
        self.display.flush()?;
        info!("Unmapped window 0x{:x}", window);

        self.transition(ClientState::Closed);
        drop(self.display);
        info!("Disconnected from X server");
        Ok(consumed)
    }

    /// Run every setup step for the configured window and leave it mapped.
    pub fn setup_window(&mut self, config: &WindowConfig) -> Result<Window> {
        let visual = self.select_visual(config.depth)?;
        let background = self.alloc_background(config.background)?;
        let colormap = self.acquire_colormap(visual)?;

        let mut attributes = WindowAttributes::new()
            .set(WindowAttribute::BackPixel(background))
            .set(WindowAttribute::BorderPixel(config.border_pixel))
            .set(WindowAttribute::EventMask(overlay_event_mask()))
            .set(WindowAttribute::Colormap(colormap));
        if config.override_redirect {
            attributes = attributes.set(WindowAttribute::OverrideRedirect(true));
        }

        let window = self.create_window(visual, config.geometry(), attributes)?;
        self.set_window_title(&config.title)?;
        self.set_protocol_handshake()?;

        if let Some(geometry) = &config.reposition {
            self.configure_window(geometry)?;
        }
        self.map_window()?;
        if let Some(geometry) = &config.reposition {
            self.configure_window(geometry)?;
        }
        self.flush()?;

        Ok(window)
    }
}

impl OverlayClient<X11Display> {
    /// Connect to `target` and wrap the session in a client.
    pub fn connect(target: &str) -> Result<Self> {
        Ok(Self::new(X11Display::connect(target)?))
    }
}
