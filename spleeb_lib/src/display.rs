use core::fmt::{self, Write};

use crate::{
    encoder::ModeLabel,
    record::{LEFT_ENCODER, NUM_ENCODERS, RIGHT_ENCODER},
};

// HID modifier byte, left and right bits together
const MOD_MASK_CTRL: u8 = 0x11;
const MOD_MASK_SHIFT: u8 = 0x22;
const MOD_MASK_ALT: u8 = 0x44;
const MOD_MASK_GUI: u8 = 0x88;

/// Host and framework state shown next to the keyboard's own config
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusInfo {
    pub layer: u8,
    /// HID modifier byte
    pub modifiers: u8,
    pub caps_lock: bool,
    pub num_lock: bool,
}

fn flag(out: &mut impl Write, on: bool, letter: char) -> fmt::Result {
    out.write_char(if on { letter } else { '-' })
}

/// Writes the status screen, one short line per row of a vertical 128x64
/// panel.
pub fn render_status<W: Write>(
    out: &mut W,
    status: &StatusInfo,
    current_dpi: u16,
    encoder_modes: &[u8; NUM_ENCODERS],
) -> fmt::Result {
    writeln!(out, "LAYER: {}", status.layer)?;

    out.write_str("MODS: ")?;
    flag(out, status.modifiers & MOD_MASK_SHIFT != 0, 'S')?;
    flag(out, status.modifiers & MOD_MASK_CTRL != 0, 'C')?;
    flag(out, status.modifiers & MOD_MASK_ALT != 0, 'A')?;
    flag(out, status.modifiers & MOD_MASK_GUI != 0, 'G')?;
    out.write_char('\n')?;

    out.write_str("LOCK: ")?;
    flag(out, status.caps_lock, 'C')?;
    flag(out, status.num_lock, 'N')?;
    out.write_char('\n')?;

    writeln!(out, "POINTER:")?;
    writeln!(out, "dpi: {}", current_dpi)?;

    writeln!(out, "ENCODER:")?;
    writeln!(out, "R: {}", ModeLabel(encoder_modes[RIGHT_ENCODER]))?;
    writeln!(out, "L: {}", ModeLabel(encoder_modes[LEFT_ENCODER]))
}
