//! Window attribute lists
//!
//! `CreateWindow` carries a value mask plus one value per set bit, and the
//! server reads the values in ascending bit order. `WindowAttributes` keys each
//! value by its CW bit so iteration always yields that order, no matter in
//! which order the attributes were set.

use std::collections::BTreeMap;

use x11rb::protocol::xproto::{Colormap, CreateWindowAux, EventMask, CW};

/// A single window attribute and its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAttribute {
    BackPixel(u32),
    BorderPixel(u32),
    OverrideRedirect(bool),
    EventMask(EventMask),
    Colormap(Colormap),
}

impl WindowAttribute {
    /// CW flag this attribute occupies in the value mask
    pub fn flag(&self) -> CW {
        match self {
            Self::BackPixel(_) => CW::BACK_PIXEL,
            Self::BorderPixel(_) => CW::BORDER_PIXEL,
            Self::OverrideRedirect(_) => CW::OVERRIDE_REDIRECT,
            Self::EventMask(_) => CW::EVENT_MASK,
            Self::Colormap(_) => CW::COLORMAP,
        }
    }

    /// Value as it goes on the wire
    pub fn value(&self) -> u32 {
        match *self {
            Self::BackPixel(pixel) | Self::BorderPixel(pixel) => pixel,
            Self::OverrideRedirect(enabled) => u32::from(enabled),
            Self::EventMask(mask) => u32::from(mask),
            Self::Colormap(colormap) => colormap,
        }
    }
}

/// Attribute set for a `CreateWindow` request, ordered by flag bit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowAttributes {
    entries: BTreeMap<u32, WindowAttribute>,
}

impl WindowAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing any earlier value for the same flag.
    pub fn set(mut self, attribute: WindowAttribute) -> Self {
        self.entries.insert(u32::from(attribute.flag()), attribute);
        self
    }

    pub fn get(&self, flag: CW) -> Option<&WindowAttribute> {
        self.entries.get(&u32::from(flag))
    }

    pub fn iter(&self) -> impl Iterator<Item = &WindowAttribute> {
        self.entries.values()
    }

    pub fn value_mask(&self) -> u32 {
        self.entries.keys().fold(0, |mask, bit| mask | bit)
    }

    /// Values in the order the server expects them
    pub fn values(&self) -> Vec<u32> {
        self.iter().map(WindowAttribute::value).collect()
    }

    /// Convert into the x11rb request aux.
    pub fn to_aux(&self) -> CreateWindowAux {
        self.iter().fold(CreateWindowAux::new(), |aux, attribute| match *attribute {
            WindowAttribute::BackPixel(pixel) => aux.background_pixel(pixel),
            WindowAttribute::BorderPixel(pixel) => aux.border_pixel(pixel),
            WindowAttribute::OverrideRedirect(enabled) => aux.override_redirect(u32::from(enabled)),
            WindowAttribute::EventMask(mask) => aux.event_mask(mask),
            WindowAttribute::Colormap(colormap) => aux.colormap(colormap),
        })
    }
}
