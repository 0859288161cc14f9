//! Display Module
//!
//! The slice of the X11 protocol the overlay consumes. `X11Display` forwards
//! every call to an x11rb `RustConnection`; creation requests are checked so a
//! server error comes back at the call site instead of surfacing later as an
//! asynchronous error event.

use tracing::{debug, info};
use x11rb::connection::Connection;
use x11rb::protocol::Event;
use x11rb::protocol::xproto::{
    Atom, Colormap, ColormapAlloc, ConfigureWindowAux, ConnectionExt as _, PropMode, Screen,
    Visualid, Window, WindowClass,
};
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use crate::overlay::attributes::WindowAttributes;
use crate::overlay::error::{OverlayError, Result};
use crate::overlay::geometry::{Geometry, Rgb16};

/// Everything needed for one `CreateWindow` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateWindowRequest {
    pub window: Window,
    pub parent: Window,
    pub depth: u8,
    pub visual: Visualid,
    pub geometry: Geometry,
    pub attributes: WindowAttributes,
}

/// Protocol requests the overlay client issues
pub trait DisplayConnection {
    /// Screen picked during the handshake
    fn screen(&self) -> &Screen;

    fn generate_id(&self) -> Result<u32>;

    /// `AllocColor`, returning the allocated pixel.
    fn alloc_color(&self, colormap: Colormap, color: Rgb16) -> Result<u32>;

    /// Checked `CreateColormap` with `AllocNone`.
    fn create_colormap(&self, colormap: Colormap, window: Window, visual: Visualid) -> Result<()>;

    /// Checked `CreateWindow` with class `InputOutput`.
    fn create_window(&self, request: &CreateWindowRequest) -> Result<()>;

    fn intern_atom(&self, name: &str) -> Result<Atom>;

    fn atom_name(&self, atom: Atom) -> Result<String>;

    /// `ChangeProperty` in replace mode with 8-bit items.
    fn change_property8(&self, window: Window, property: Atom, type_: Atom, data: &[u8])
        -> Result<()>;

    /// `ChangeProperty` in replace mode with 32-bit items.
    fn change_property32(&self, window: Window, property: Atom, type_: Atom, data: &[u32])
        -> Result<()>;

    fn configure_window(&self, window: Window, geometry: &Geometry) -> Result<()>;

    fn map_window(&self, window: Window) -> Result<()>;

    fn unmap_window(&self, window: Window) -> Result<()>;

    /// Block until the server sends the next event.
    fn wait_for_event(&self) -> Result<Event>;

    fn flush(&self) -> Result<()>;
}

impl<T: DisplayConnection + ?Sized> DisplayConnection for &T {
    fn screen(&self) -> &Screen {
        (**self).screen()
    }

    fn generate_id(&self) -> Result<u32> {
        (**self).generate_id()
    }

    fn alloc_color(&self, colormap: Colormap, color: Rgb16) -> Result<u32> {
        (**self).alloc_color(colormap, color)
    }

    fn create_colormap(&self, colormap: Colormap, window: Window, visual: Visualid) -> Result<()> {
        (**self).create_colormap(colormap, window, visual)
    }

    fn create_window(&self, request: &CreateWindowRequest) -> Result<()> {
        (**self).create_window(request)
    }

    fn intern_atom(&self, name: &str) -> Result<Atom> {
        (**self).intern_atom(name)
    }

    fn atom_name(&self, atom: Atom) -> Result<String> {
        (**self).atom_name(atom)
    }

    fn change_property8(
        &self,
        window: Window,
        property: Atom,
        type_: Atom,
        data: &[u8],
    ) -> Result<()> {
        (**self).change_property8(window, property, type_, data)
    }

    fn change_property32(
        &self,
        window: Window,
        property: Atom,
        type_: Atom,
        data: &[u32],
    ) -> Result<()> {
        (**self).change_property32(window, property, type_, data)
    }

    fn configure_window(&self, window: Window, geometry: &Geometry) -> Result<()> {
        (**self).configure_window(window, geometry)
    }

    fn map_window(&self, window: Window) -> Result<()> {
        (**self).map_window(window)
    }

    fn unmap_window(&self, window: Window) -> Result<()> {
        (**self).unmap_window(window)
    }

    fn wait_for_event(&self) -> Result<Event> {
        (**self).wait_for_event()
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}

/// Live connection to an X server
pub struct X11Display {
    conn: RustConnection,
    screen_num: usize,
}

impl X11Display {
    /// Connect to `target` (e.g. `:0`) and use its preferred screen.
    pub fn connect(target: &str) -> Result<Self> {
        let (conn, screen_num) =
            x11rb::connect(Some(target)).map_err(|source| OverlayError::Connect {
                target: target.to_string(),
                source,
            })?;

        let screen = &conn.setup().roots[screen_num];
        info!(
            "Connected to X server {}, screen {}, root window 0x{:x}",
            target, screen_num, screen.root
        );
        debug!(
            "Screen advertises depths {:?}",
            screen.allowed_depths.iter().map(|d| d.depth).collect::<Vec<_>>()
        );

        Ok(Self { conn, screen_num })
    }
}

impl DisplayConnection for X11Display {
    fn screen(&self) -> &Screen {
        &self.conn.setup().roots[self.screen_num]
    }

    fn generate_id(&self) -> Result<u32> {
        Ok(self.conn.generate_id()?)
    }

    fn alloc_color(&self, colormap: Colormap, color: Rgb16) -> Result<u32> {
        let reply = self
            .conn
            .alloc_color(colormap, color.red, color.green, color.blue)?
            .reply()
            .map_err(OverlayError::resource("AllocColor"))?;
        Ok(reply.pixel)
    }

    fn create_colormap(&self, colormap: Colormap, window: Window, visual: Visualid) -> Result<()> {
        self.conn
            .create_colormap(ColormapAlloc::NONE, colormap, window, visual)?
            .check()
            .map_err(OverlayError::resource("CreateColormap"))
    }

    fn create_window(&self, request: &CreateWindowRequest) -> Result<()> {
        let geometry = &request.geometry;
        self.conn
            .create_window(
                request.depth,
                request.window,
                request.parent,
                geometry.x,
                geometry.y,
                geometry.width,
                geometry.height,
                geometry.border_width,
                WindowClass::INPUT_OUTPUT,
                request.visual,
                &request.attributes.to_aux(),
            )?
            .check()
            .map_err(OverlayError::resource("CreateWindow"))
    }

    fn intern_atom(&self, name: &str) -> Result<Atom> {
        let reply = self
            .conn
            .intern_atom(false, name.as_bytes())?
            .reply()
            .map_err(OverlayError::resource("InternAtom"))?;
        Ok(reply.atom)
    }

    fn atom_name(&self, atom: Atom) -> Result<String> {
        let reply = self
            .conn
            .get_atom_name(atom)?
            .reply()
            .map_err(OverlayError::resource("GetAtomName"))?;
        Ok(String::from_utf8_lossy(&reply.name).into_owned())
    }

    fn change_property8(
        &self,
        window: Window,
        property: Atom,
        type_: Atom,
        data: &[u8],
    ) -> Result<()> {
        self.conn.change_property8(PropMode::REPLACE, window, property, type_, data)?;
        Ok(())
    }

    fn change_property32(
        &self,
        window: Window,
        property: Atom,
        type_: Atom,
        data: &[u32],
    ) -> Result<()> {
        self.conn.change_property32(PropMode::REPLACE, window, property, type_, data)?;
        Ok(())
    }

    fn configure_window(&self, window: Window, geometry: &Geometry) -> Result<()> {
        let aux = ConfigureWindowAux::new()
            .x(i32::from(geometry.x))
            .y(i32::from(geometry.y))
            .width(u32::from(geometry.width))
            .height(u32::from(geometry.height))
            .border_width(u32::from(geometry.border_width));
        self.conn.configure_window(window, &aux)?;
        Ok(())
    }

    fn map_window(&self, window: Window) -> Result<()> {
        self.conn.map_window(window)?;
        Ok(())
    }

    fn unmap_window(&self, window: Window) -> Result<()> {
        self.conn.unmap_window(window)?;
        Ok(())
    }

    fn wait_for_event(&self) -> Result<Event> {
        Ok(self.conn.wait_for_event()?)
    }

    fn flush(&self) -> Result<()> {
        self.conn.flush()?;
        Ok(())
    }
}
