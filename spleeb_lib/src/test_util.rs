//! Host side doubles for flash, pointer hardware and the split link.

use embedded_storage::nor_flash::{ErrorType, NorFlashErrorKind};
use embedded_storage_async::nor_flash::{NorFlash, ReadNorFlash};
use usbd_hid::descriptor::MouseReport;

use crate::{
    dispatch::KeyRecord, keyboard::UserHooks, pointer::PointingDevice, record::RECORD_SIZE,
    slave_com::Master,
};

pub const PAGE_SIZE: usize = 4096;
pub const PAGES: usize = 4;

/// NOR flash in RAM. Erase sets bytes to 0xFF and writes can only clear bits.
pub struct RamFlash {
    pub data: Vec<u8>,
}

impl RamFlash {
    pub fn new() -> Self {
        Self {
            data: vec![0xFF; PAGE_SIZE * PAGES],
        }
    }

    pub fn range() -> core::ops::Range<u32> {
        0..(PAGE_SIZE * PAGES) as u32
    }
}

impl ErrorType for RamFlash {
    type Error = NorFlashErrorKind;
}

impl ReadNorFlash for RamFlash {
    const READ_SIZE: usize = 1;

    async fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        let end = start + bytes.len();
        if end > self.data.len() {
            return Err(NorFlashErrorKind::OutOfBounds);
        }
        bytes.copy_from_slice(&self.data[start..end]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }
}

impl NorFlash for RamFlash {
    const WRITE_SIZE: usize = 4;
    const ERASE_SIZE: usize = PAGE_SIZE;

    async fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        let (from, to) = (from as usize, to as usize);
        if from % PAGE_SIZE != 0 || to % PAGE_SIZE != 0 {
            return Err(NorFlashErrorKind::NotAligned);
        }
        if to > self.data.len() {
            return Err(NorFlashErrorKind::OutOfBounds);
        }
        self.data[from..to].fill(0xFF);
        Ok(())
    }

    async fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        if start % Self::WRITE_SIZE != 0 || bytes.len() % Self::WRITE_SIZE != 0 {
            return Err(NorFlashErrorKind::NotAligned);
        }
        let end = start + bytes.len();
        if end > self.data.len() {
            return Err(NorFlashErrorKind::OutOfBounds);
        }
        for (cell, byte) in self.data[start..end].iter_mut().zip(bytes) {
            *cell &= *byte;
        }
        Ok(())
    }
}

/// Remembers the last state pushed to the pointing device
#[derive(Default)]
pub struct RecordingPointer {
    pub cpi: Option<u16>,
    pub glide: Option<bool>,
    pub cpi_writes: usize,
}

impl PointingDevice for RecordingPointer {
    fn set_cpi(&mut self, cpi: u16) {
        self.cpi = Some(cpi);
        self.cpi_writes += 1;
    }

    fn enable_cursor_glide(&mut self, enable: bool) {
        self.glide = Some(enable);
    }
}

pub fn mouse(x: i8, y: i8) -> MouseReport {
    MouseReport {
        buttons: 0,
        x,
        y,
        wheel: 0,
        pan: 0,
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct LinkDown;

/// Split link that records delivered payloads. While `up` is false every send
/// fails.
pub struct ScriptedLink {
    pub up: bool,
    pub attempts: usize,
    pub delivered: Vec<[u8; RECORD_SIZE]>,
}

impl ScriptedLink {
    pub fn new() -> Self {
        Self {
            up: true,
            attempts: 0,
            delivered: Vec::new(),
        }
    }
}

impl Master for ScriptedLink {
    type Error = LinkDown;

    async fn send_config(&mut self, payload: &[u8; RECORD_SIZE]) -> Result<(), Self::Error> {
        self.attempts += 1;
        if self.up {
            self.delivered.push(*payload);
            Ok(())
        } else {
            Err(LinkDown)
        }
    }
}

/// User hooks that log lifecycle calls and can veto events
#[derive(Default)]
pub struct HookLog {
    pub calls: Vec<&'static str>,
    pub veto_keys: bool,
    pub veto_encoder: bool,
    pub oled: Option<bool>,
    pub mouse_keycodes: Vec<u16>,
    pub pointer_reports: usize,
}

impl UserHooks for HookLog {
    fn process_record_user(&mut self, _keycode: u16, _record: &KeyRecord) -> bool {
        !self.veto_keys
    }

    fn encoder_update_user(&mut self, _index: u8, _clockwise: bool) -> bool {
        !self.veto_encoder
    }

    fn pointing_device_task_user(&mut self, _report: &mut MouseReport) {
        self.pointer_reports += 1;
    }

    fn pointing_device_init_user(&mut self) {
        self.calls.push("pointing_device_init");
    }

    fn is_mouse_record_user(&mut self, keycode: u16, _record: &KeyRecord) -> bool {
        self.mouse_keycodes.contains(&keycode)
    }

    fn eeconfig_init_user(&mut self) {
        self.calls.push("eeconfig_init");
    }

    fn matrix_init_user(&mut self) {
        self.calls.push("matrix_init");
    }

    fn keyboard_post_init_user(&mut self) {
        self.calls.push("keyboard_post_init");
    }

    fn oled_task_user(&mut self) -> bool {
        self.oled.unwrap_or(true)
    }
}
