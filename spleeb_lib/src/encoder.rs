use core::fmt::{self, Display};

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::record::{ConfigRecord, LEFT_ENCODER, RIGHT_ENCODER};

/// Modes of the right encoder
#[derive(Copy, Clone, Debug, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RightEncoderMode {
    DefaultDpi = 0,
    SnipingDpi = 1,
}

impl RightEncoderMode {
    pub const BASE: Self = Self::DefaultDpi;

    pub const fn next(self) -> Self {
        match self {
            Self::DefaultDpi => Self::SnipingDpi,
            Self::SnipingDpi => Self::DefaultDpi,
        }
    }
}

/// Modes of the left encoder. Numbered after the right encoder's range so that
/// a stored value names exactly one mode.
#[derive(Copy, Clone, Debug, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LeftEncoderMode {
    Volume = 3,
    Off = 4,
}

impl LeftEncoderMode {
    pub const BASE: Self = Self::Volume;

    pub const fn next(self) -> Self {
        match self {
            Self::Volume => Self::Off,
            Self::Off => Self::Volume,
        }
    }
}

/// What an encoder detent should do under the active mode
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncoderAction {
    None,
    Volume { up: bool },
    StepDefaultDpi { forward: bool },
    StepSnipingDpi { forward: bool },
}

/// Advances the right encoder to its next mode. A stored value outside the
/// range restarts at the base mode.
pub fn cycle_right(record: &mut ConfigRecord) {
    let next = match RightEncoderMode::try_from(record.encoder_modes[RIGHT_ENCODER]) {
        Ok(mode) => mode.next(),
        Err(_) => RightEncoderMode::BASE,
    };
    record.encoder_modes[RIGHT_ENCODER] = next.into();
}

/// Advances the left encoder to its next mode. A stored value outside the
/// range restarts at the base mode.
pub fn cycle_left(record: &mut ConfigRecord) {
    let next = match LeftEncoderMode::try_from(record.encoder_modes[LEFT_ENCODER]) {
        Ok(mode) => mode.next(),
        Err(_) => LeftEncoderMode::BASE,
    };
    record.encoder_modes[LEFT_ENCODER] = next.into();
}

/// Resolves a turn of encoder `index` against the mode stored for it
pub fn action_for(record: &ConfigRecord, index: u8, clockwise: bool) -> EncoderAction {
    let Some(&mode) = record.encoder_modes.get(index as usize) else {
        return EncoderAction::None;
    };
    match index as usize {
        LEFT_ENCODER => match LeftEncoderMode::try_from(mode) {
            Ok(LeftEncoderMode::Volume) => EncoderAction::Volume { up: clockwise },
            _ => EncoderAction::None,
        },
        RIGHT_ENCODER => match RightEncoderMode::try_from(mode) {
            Ok(RightEncoderMode::DefaultDpi) => EncoderAction::StepDefaultDpi { forward: clockwise },
            Ok(RightEncoderMode::SnipingDpi) => EncoderAction::StepSnipingDpi { forward: clockwise },
            Err(_) => EncoderAction::None,
        },
        _ => EncoderAction::None,
    }
}

/// Short label of a stored mode value for the status display
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ModeLabel(pub u8);

impl Display for ModeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Ok(mode) = RightEncoderMode::try_from(self.0) {
            return f.write_str(match mode {
                RightEncoderMode::DefaultDpi => "dft dpi",
                RightEncoderMode::SnipingDpi => "snp dpi",
            });
        }
        match LeftEncoderMode::try_from(self.0) {
            Ok(LeftEncoderMode::Volume) => f.write_str("volume"),
            Ok(LeftEncoderMode::Off) => f.write_str("off"),
            Err(_) => write!(f, "{}", self.0),
        }
    }
}
