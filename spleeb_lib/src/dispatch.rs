use embassy_sync::blocking_mutex::raw::RawMutex;
use usbd_hid::descriptor::{MediaKey, MouseReport};

use crate::{
    encoder::{self, EncoderAction},
    keyboard::{Spleeb, UserHooks},
    keycodes::SpleebKeycode,
    pointer::PointingDevice,
};

/// One key transition as reported by the matrix
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyRecord {
    pub pressed: bool,
}

impl KeyRecord {
    pub const fn press() -> Self {
        Self { pressed: true }
    }

    pub const fn release() -> Self {
        Self { pressed: false }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Processed {
    /// Consumed here or by the user hook
    Handled,
    /// Left for the framework's default processing
    Unhandled,
}

impl<M: RawMutex, P: PointingDevice, U: UserHooks> Spleeb<'_, M, P, U> {
    /// Entry point for every key event
    pub fn process_record(&mut self, keycode: u16, record: &KeyRecord) -> Processed {
        if !self.user.process_record_user(keycode, record) {
            self.log_config();
            return Processed::Handled;
        }

        let Ok(code) = SpleebKeycode::try_from(keycode) else {
            return Processed::Unhandled;
        };

        match code {
            SpleebKeycode::PointerDefaultDpiForward if record.pressed => self.step_default_dpi(true),
            SpleebKeycode::PointerDefaultDpiReverse if record.pressed => self.step_default_dpi(false),
            SpleebKeycode::PointerSnipingDpiForward if record.pressed => self.step_sniping_dpi(true),
            SpleebKeycode::PointerSnipingDpiReverse if record.pressed => self.step_sniping_dpi(false),
            SpleebKeycode::SnipingMode => self.set_sniping_enabled(record.pressed),
            SpleebKeycode::SnipingModeToggle if record.pressed => {
                self.set_sniping_enabled(!self.sniping_enabled())
            }
            SpleebKeycode::DragscrollMode => self.set_dragscroll_enabled(record.pressed),
            SpleebKeycode::DragscrollModeToggle if record.pressed => {
                self.set_dragscroll_enabled(!self.dragscroll_enabled())
            }
            SpleebKeycode::EncModeLeftToggle if record.pressed => self.cycle_left_encoder(),
            SpleebKeycode::EncModeRightToggle if record.pressed => self.cycle_right_encoder(),
            _ => {}
        }
        self.log_config();
        Processed::Handled
    }

    /// Entry point for every encoder detent. Returns the media key the host
    /// should tap, if any.
    pub fn encoder_update(&mut self, index: u8, clockwise: bool) -> Option<MediaKey> {
        if !self.user.encoder_update_user(index, clockwise) {
            return None;
        }

        match encoder::action_for(&self.config, index, clockwise) {
            EncoderAction::Volume { up: true } => Some(MediaKey::VolumeIncrement),
            EncoderAction::Volume { up: false } => Some(MediaKey::VolumeDecrement),
            EncoderAction::StepDefaultDpi { forward } => {
                self.step_default_dpi(forward);
                None
            }
            EncoderAction::StepSnipingDpi { forward } => {
                self.step_sniping_dpi(forward);
                None
            }
            EncoderAction::None => None,
        }
    }

    /// Entry point for every pointer report. Only the master half has a
    /// pointer to rewrite.
    pub fn pointing_device_task(&mut self, report: &mut MouseReport) {
        if !self.role().is_master() {
            return;
        }
        self.pointer.task(&self.config, report);
        self.user.pointing_device_task_user(report);
    }

    /// Whether a key should keep the auto mouse layer active
    pub fn is_mouse_record(&mut self, keycode: u16, record: &KeyRecord) -> bool {
        match SpleebKeycode::try_from(keycode) {
            Ok(code) if code.is_mouse_key() => true,
            _ => self.user.is_mouse_record_user(keycode, record),
        }
    }
}
