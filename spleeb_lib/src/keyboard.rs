use core::fmt::Write;

use embassy_sync::{blocking_mutex::raw::RawMutex, signal::Signal};
use embassy_time::Instant;
use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::KeyCacheImpl;
use usbd_hid::descriptor::MouseReport;

use crate::{
    dispatch::KeyRecord,
    display::{StatusInfo, render_status},
    encoder,
    pointer::{PointerController, PointerSettings, PointingDevice},
    record::ConfigRecord,
    slave_com::{Master, apply_sync_payload},
    storage::{Storage, StorageResult},
    sync::{SyncEngine, SyncState, TickOutcome},
};

/// Keymap level callbacks. Every method has a pass-through default.
pub trait UserHooks {
    /// Return false to stop the keyboard from acting on the event
    fn process_record_user(&mut self, _keycode: u16, _record: &KeyRecord) -> bool {
        true
    }
    /// Return false to stop the keyboard from acting on the turn
    fn encoder_update_user(&mut self, _index: u8, _clockwise: bool) -> bool {
        true
    }
    fn pointing_device_task_user(&mut self, _report: &mut MouseReport) {}
    fn pointing_device_init_user(&mut self) {}
    fn is_mouse_record_user(&mut self, _keycode: u16, _record: &KeyRecord) -> bool {
        false
    }
    fn eeconfig_init_user(&mut self) {}
    fn matrix_init_user(&mut self) {}
    fn keyboard_post_init_user(&mut self) {}
    /// Return false to keep the status screen from being drawn
    fn oled_task_user(&mut self) -> bool {
        true
    }
}

/// Keymap without any callbacks
pub struct NoUserHooks;

impl UserHooks for NoUserHooks {}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SplitRole {
    /// Half with the USB connection, source of truth for the config
    Master,
    Slave,
}

impl SplitRole {
    pub fn is_master(self) -> bool {
        self == SplitRole::Master
    }
}

/// Keyboard level state of one half
pub struct Spleeb<'a, M: RawMutex, P: PointingDevice, U: UserHooks> {
    pub(crate) config: ConfigRecord,
    pub(crate) pointer: PointerController<P>,
    pub(crate) user: U,
    sync: SyncEngine,
    role: SplitRole,
    commits: &'a Signal<M, ConfigRecord>,
}

impl<'a, M: RawMutex, P: PointingDevice, U: UserHooks> Spleeb<'a, M, P, U> {
    /// `commits` receives every record that should be persisted; hand the same
    /// signal to [`Storage::run_storage`].
    pub fn new(
        role: SplitRole,
        device: P,
        settings: PointerSettings,
        user: U,
        commits: &'a Signal<M, ConfigRecord>,
    ) -> Self {
        Self {
            config: ConfigRecord::default(),
            pointer: PointerController::new(device, settings),
            user,
            sync: SyncEngine::new(),
            role,
            commits,
        }
    }

    pub fn config(&self) -> &ConfigRecord {
        &self.config
    }

    pub fn role(&self) -> SplitRole {
        self.role
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync.state()
    }

    pub fn pointer(&self) -> &PointerController<P> {
        &self.pointer
    }

    pub fn user(&self) -> &U {
        &self.user
    }

    pub fn user_mut(&mut self) -> &mut U {
        &mut self.user
    }

    /// Loads the config at boot. Formats defaults first when storage reports a
    /// first boot.
    pub async fn boot<S: NorFlash, K: KeyCacheImpl<u16>>(
        &mut self,
        storage: &mut Storage<S, K>,
    ) -> StorageResult<(), S> {
        if storage.is_first_boot() {
            self.config = storage.initialize_defaults().await?;
            self.user.eeconfig_init_user();
        }
        self.config = storage.read_config().await?;
        self.user.matrix_init_user();
        Ok(())
    }

    /// Runs once peripherals are up
    pub fn post_init(&mut self) {
        self.pointer.init(&self.config);
        self.user.pointing_device_init_user();
        self.user.keyboard_post_init_user();
    }

    /// Background tick. Only the master pushes its config to the other half.
    pub async fn housekeeping<T: Master>(&mut self, now: Instant, link: &mut T) -> TickOutcome {
        if !self.role.is_master() {
            return TickOutcome::Skipped;
        }
        self.sync.tick(&self.config, now, link).await
    }

    /// Receive handler for the config sync message
    pub fn receive_sync(&mut self, payload: &[u8]) -> bool {
        apply_sync_payload(&mut self.config, payload)
    }

    fn commit(&self) {
        self.commits.signal(self.config);
    }

    pub fn default_dpi(&self) -> u16 {
        self.pointer.settings().default_dpi(&self.config)
    }

    pub fn sniping_dpi(&self) -> u16 {
        self.pointer.settings().sniping_dpi(&self.config)
    }

    pub fn current_dpi(&self) -> u16 {
        self.pointer.settings().current_dpi(&self.config)
    }

    pub fn step_default_dpi(&mut self, forward: bool) {
        self.step_default_dpi_noeeprom(forward);
        self.commit();
    }

    /// Like [`Self::step_default_dpi`] but not persisted
    pub fn step_default_dpi_noeeprom(&mut self, forward: bool) {
        self.pointer.step_default_dpi(&mut self.config, forward);
    }

    pub fn step_sniping_dpi(&mut self, forward: bool) {
        self.step_sniping_dpi_noeeprom(forward);
        self.commit();
    }

    /// Like [`Self::step_sniping_dpi`] but not persisted
    pub fn step_sniping_dpi_noeeprom(&mut self, forward: bool) {
        self.pointer.step_sniping_dpi(&mut self.config, forward);
    }

    pub fn sniping_enabled(&self) -> bool {
        self.config.sniping_enabled
    }

    pub fn set_sniping_enabled(&mut self, enable: bool) {
        self.pointer.set_sniping_enabled(&mut self.config, enable);
    }

    pub fn dragscroll_enabled(&self) -> bool {
        self.config.dragscroll_enabled
    }

    pub fn set_dragscroll_enabled(&mut self, enable: bool) {
        self.pointer.set_dragscroll_enabled(&mut self.config, enable);
    }

    pub fn cycle_left_encoder(&mut self) {
        encoder::cycle_left(&mut self.config);
        self.commit();
    }

    pub fn cycle_right_encoder(&mut self) {
        encoder::cycle_right(&mut self.config);
        self.commit();
    }

    /// Draws the status screen into `out`. The master's screen stays blank.
    pub fn oled_task<W: Write>(&mut self, status: &StatusInfo, out: &mut W) -> core::fmt::Result {
        if self.role.is_master() || !self.user.oled_task_user() {
            return Ok(());
        }
        render_status(out, status, self.current_dpi(), &self.config.encoder_modes)
    }

    pub(crate) fn log_config(&self) {
        debug!(
            "config = raw 0x{:x} | dragscroll {} | sniping {} | default dpi {} ({}) | sniping dpi {} ({})",
            self.config.raw(),
            self.config.dragscroll_enabled,
            self.config.sniping_enabled,
            self.config.default_dpi_index,
            self.default_dpi(),
            self.config.sniping_dpi_index,
            self.sniping_dpi()
        );
    }
}
