//! ICCCM atoms used by the overlay

use std::collections::HashMap;

use tracing::debug;
use x11rb::protocol::xproto::Atom;

use crate::overlay::display::DisplayConnection;
use crate::overlay::error::Result;

pub const WM_PROTOCOLS: &str = "WM_PROTOCOLS";
pub const WM_DELETE_WINDOW: &str = "WM_DELETE_WINDOW";

/// Interned atoms, one `InternAtom` round trip per unique name
#[derive(Debug, Default)]
pub struct AtomCache {
    interned: HashMap<&'static str, Atom>,
}

impl AtomCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern<D: DisplayConnection + ?Sized>(
        &mut self,
        display: &D,
        name: &'static str,
    ) -> Result<Atom> {
        if let Some(&atom) = self.interned.get(name) {
            return Ok(atom);
        }
        let atom = display.intern_atom(name)?;
        debug!("Interned {} = {}", name, atom);
        self.interned.insert(name, atom);
        Ok(atom)
    }
}

/// Atoms needed for the WM_DELETE_WINDOW handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WmAtoms {
    pub wm_protocols: Atom,
    pub wm_delete_window: Atom,
}

impl WmAtoms {
    pub fn intern<D: DisplayConnection + ?Sized>(
        display: &D,
        cache: &mut AtomCache,
    ) -> Result<Self> {
        Ok(Self {
            wm_protocols: cache.intern(display, WM_PROTOCOLS)?,
            wm_delete_window: cache.intern(display, WM_DELETE_WINDOW)?,
        })
    }
}
