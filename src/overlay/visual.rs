//! Visual selection
//!
//! Picks a visual from the depths a screen advertises. Depth 32 gives an ARGB
//! visual, which is what makes the overlay translucent under a compositor.

use x11rb::protocol::xproto::{Screen, Visualid};

/// Depth of the alpha-capable ARGB visuals
pub const ARGB_DEPTH: u8 = 32;

/// A visual chosen for window creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedVisual {
    pub depth: u8,
    pub visual: Visualid,
}

/// Find the first visual advertised at exactly `depth`.
///
/// Iteration follows the server's advertisement order, so with several
/// visuals at the same depth the first one wins.
pub fn find_visual(screen: &Screen, depth: u8) -> Option<SelectedVisual> {
    screen
        .allowed_depths
        .iter()
        .filter(|d| d.depth == depth)
        .flat_map(|d| d.visuals.iter())
        .map(|v| SelectedVisual {
            depth,
            visual: v.visual_id,
        })
        .next()
}
