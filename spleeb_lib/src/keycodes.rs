use num_enum::{IntoPrimitive, TryFromPrimitive};

/// First keycode free for keyboard level use
pub const SAFE_RANGE: u16 = 0x7E40;

/// Keycodes handled by the spleeb itself, numbered up from [`SAFE_RANGE`]
#[derive(Copy, Clone, Debug, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum SpleebKeycode {
    PointerDefaultDpiForward = 0x7E40,
    PointerDefaultDpiReverse,
    PointerSnipingDpiForward,
    PointerSnipingDpiReverse,
    /// Sniping while held
    SnipingMode,
    SnipingModeToggle,
    /// Drag-scroll while held
    DragscrollMode,
    DragscrollModeToggle,
    EncModeLeftToggle,
    EncModeRightToggle,
}

/// First keycode free for keymap level use
pub const SPLEEB_SAFE_RANGE: u16 = SpleebKeycode::EncModeRightToggle as u16 + 1;

pub const DF_MOD: u16 = SpleebKeycode::PointerDefaultDpiForward as u16;
pub const DF_RMOD: u16 = SpleebKeycode::PointerDefaultDpiReverse as u16;
pub const SP_MOD: u16 = SpleebKeycode::PointerSnipingDpiForward as u16;
pub const SP_RMOD: u16 = SpleebKeycode::PointerSnipingDpiReverse as u16;
pub const SNIPING: u16 = SpleebKeycode::SnipingMode as u16;
pub const SNP_TOG: u16 = SpleebKeycode::SnipingModeToggle as u16;
pub const DRGSCRL: u16 = SpleebKeycode::DragscrollMode as u16;
pub const DRG_TOG: u16 = SpleebKeycode::DragscrollModeToggle as u16;
pub const ENC_TGL: u16 = SpleebKeycode::EncModeLeftToggle as u16;
pub const ENC_TGR: u16 = SpleebKeycode::EncModeRightToggle as u16;

impl SpleebKeycode {
    /// Hold keys that must keep the auto mouse layer alive
    pub fn is_mouse_key(self) -> bool {
        matches!(self, Self::SnipingMode | Self::DragscrollMode)
    }
}
