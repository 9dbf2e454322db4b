use usbd_hid::descriptor::MouseReport;

use crate::{
    config,
    record::{ConfigRecord, DEFAULT_DPI_INDEX_MAX, SNIPING_DPI_INDEX_MAX},
};

/// Hardware the pointer controller drives
pub trait PointingDevice {
    fn set_cpi(&mut self, cpi: u16);
    /// Cirque style cursor glide, kept on only while drag-scrolling
    fn enable_cursor_glide(&mut self, enable: bool);
}

/// DPI tables and drag-scroll tuning
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PointerSettings {
    pub minimum_default_dpi: u16,
    pub default_dpi_step: u16,
    pub minimum_sniping_dpi: u16,
    pub sniping_dpi_step: u16,
    pub dragscroll_divisor: i16,
    pub dragscroll_reverse_x: bool,
    pub dragscroll_reverse_y: bool,
}

impl PointerSettings {
    /// Settings from the build time configuration
    pub const DEFAULT: Self = Self {
        minimum_default_dpi: config::MINIMUM_DEFAULT_DPI,
        default_dpi_step: config::DEFAULT_DPI_CONFIG_STEP,
        minimum_sniping_dpi: config::MINIMUM_SNIPING_DPI,
        sniping_dpi_step: config::SNIPING_DPI_CONFIG_STEP,
        dragscroll_divisor: config::DRAGSCROLL_DIVISOR,
        dragscroll_reverse_x: config::DRAGSCROLL_REVERSE_X,
        dragscroll_reverse_y: config::DRAGSCROLL_REVERSE_Y,
    };

    pub fn default_dpi(&self, record: &ConfigRecord) -> u16 {
        (record.default_dpi_index as u16)
            .saturating_mul(self.default_dpi_step)
            .saturating_add(self.minimum_default_dpi)
    }

    pub fn sniping_dpi(&self, record: &ConfigRecord) -> u16 {
        (record.sniping_dpi_index as u16)
            .saturating_mul(self.sniping_dpi_step)
            .saturating_add(self.minimum_sniping_dpi)
    }

    /// The DPI the device should run at right now. Tables that run past
    /// `u16::MAX` top out there.
    pub fn current_dpi(&self, record: &ConfigRecord) -> u16 {
        if record.sniping_enabled {
            self.sniping_dpi(record)
        } else {
            self.default_dpi(record)
        }
    }
}

/// Turns pointer motion into scroll units, carrying the remainder between
/// reports so slow motion still scrolls.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DragScroll {
    scroll_x: i32,
    scroll_y: i32,
}

impl DragScroll {
    pub const fn new() -> Self {
        Self {
            scroll_x: 0,
            scroll_y: 0,
        }
    }

    /// Motion accumulated but not yet emitted, as `(horizontal, vertical)`
    pub fn residual(&self) -> (i32, i32) {
        (self.scroll_x, self.scroll_y)
    }

    pub fn apply(&mut self, settings: &PointerSettings, report: &mut MouseReport) {
        let x = report.x as i32;
        let y = report.y as i32;
        let dx = if settings.dragscroll_reverse_x { x } else { -x };
        let dy = if settings.dragscroll_reverse_y { -y } else { y };

        self.scroll_x = self.scroll_x.saturating_add(dx);
        self.scroll_y = self.scroll_y.saturating_add(dy);

        report.pan = drain(&mut self.scroll_x, settings.dragscroll_divisor);
        report.wheel = drain(&mut self.scroll_y, settings.dragscroll_divisor);
        report.x = 0;
        report.y = 0;
    }
}

/// Removes whole scroll units from `acc` and returns them
fn drain(acc: &mut i32, divisor: i16) -> i8 {
    let divisor = divisor.max(1) as i32;
    let units = (*acc / divisor).clamp(i8::MIN as i32, i8::MAX as i32);
    *acc -= units * divisor;
    units as i8
}

fn step_index(index: u8, max: u8, forward: bool) -> u8 {
    if forward {
        index.saturating_add(1).min(max)
    } else {
        index.saturating_sub(1).min(max)
    }
}

/// Applies pointer related config changes to the device
pub struct PointerController<P: PointingDevice> {
    device: P,
    settings: PointerSettings,
    dragscroll: DragScroll,
}

impl<P: PointingDevice> PointerController<P> {
    pub fn new(device: P, settings: PointerSettings) -> Self {
        Self {
            device,
            settings,
            dragscroll: DragScroll::new(),
        }
    }

    pub fn settings(&self) -> &PointerSettings {
        &self.settings
    }

    pub fn device(&self) -> &P {
        &self.device
    }

    /// Brings the device in line with `record` after boot. Glide stays off
    /// until drag-scroll is enabled.
    pub fn init(&mut self, record: &ConfigRecord) {
        self.apply_cpi(record);
        self.device.enable_cursor_glide(false);
    }

    pub fn apply_cpi(&mut self, record: &ConfigRecord) {
        self.device.set_cpi(self.settings.current_dpi(record));
    }

    /// Moves the default DPI one step, clamped to the table
    pub fn step_default_dpi(&mut self, record: &mut ConfigRecord, forward: bool) {
        record.default_dpi_index =
            step_index(record.default_dpi_index, DEFAULT_DPI_INDEX_MAX, forward);
        self.apply_cpi(record);
    }

    /// Moves the sniping DPI one step, clamped to the table
    pub fn step_sniping_dpi(&mut self, record: &mut ConfigRecord, forward: bool) {
        record.sniping_dpi_index =
            step_index(record.sniping_dpi_index, SNIPING_DPI_INDEX_MAX, forward);
        self.apply_cpi(record);
    }

    pub fn set_sniping_enabled(&mut self, record: &mut ConfigRecord, enable: bool) {
        record.sniping_enabled = enable;
        self.apply_cpi(record);
    }

    pub fn set_dragscroll_enabled(&mut self, record: &mut ConfigRecord, enable: bool) {
        record.dragscroll_enabled = enable;
        self.device.enable_cursor_glide(enable);
        self.apply_cpi(record);
    }

    /// Rewrites motion into scroll while drag-scroll is enabled
    pub fn task(&mut self, record: &ConfigRecord, report: &mut MouseReport) {
        if record.dragscroll_enabled {
            self.dragscroll.apply(&self.settings, report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{RecordingPointer, mouse};

    fn controller() -> PointerController<RecordingPointer> {
        PointerController::new(RecordingPointer::default(), PointerSettings::DEFAULT)
    }

    const STOCK: PointerSettings = PointerSettings {
        minimum_default_dpi: 300,
        default_dpi_step: 100,
        minimum_sniping_dpi: 100,
        sniping_dpi_step: 100,
        dragscroll_divisor: 64,
        dragscroll_reverse_x: false,
        dragscroll_reverse_y: false,
    };

    #[test]
    fn dpi_follows_index_tables() {
        let mut record = ConfigRecord::default();
        let settings = STOCK;
        assert_eq!(settings.default_dpi(&record), 700);
        assert_eq!(settings.sniping_dpi(&record), 100);
        assert_eq!(settings.current_dpi(&record), 700);

        record.sniping_dpi_index = 3;
        record.sniping_enabled = true;
        assert_eq!(settings.current_dpi(&record), 400);
    }

    #[test]
    fn oversized_tables_saturate() {
        let settings = PointerSettings {
            default_dpi_step: 5000,
            sniping_dpi_step: u16::MAX,
            ..PointerSettings::DEFAULT
        };
        let record = ConfigRecord {
            default_dpi_index: DEFAULT_DPI_INDEX_MAX,
            sniping_dpi_index: SNIPING_DPI_INDEX_MAX,
            sniping_enabled: true,
            ..ConfigRecord::default()
        };
        assert_eq!(settings.default_dpi(&record), u16::MAX);
        assert_eq!(settings.sniping_dpi(&record), u16::MAX);
        assert_eq!(settings.current_dpi(&record), u16::MAX);

        let mut pointer = PointerController::new(RecordingPointer::default(), settings);
        let mut record = ConfigRecord::default();
        for _ in 0..20 {
            pointer.step_default_dpi(&mut record, true);
        }
        assert_eq!(pointer.device().cpi, Some(u16::MAX));
    }

    #[test]
    fn init_applies_dpi_and_disables_glide() {
        let mut pointer = controller();
        let record = ConfigRecord::default();
        pointer.init(&record);
        assert_eq!(
            pointer.device().cpi,
            Some(PointerSettings::DEFAULT.default_dpi(&record))
        );
        assert_eq!(pointer.device().glide, Some(false));
    }

    #[test]
    fn default_dpi_clamps_at_both_ends() {
        let mut pointer = controller();
        let mut record = ConfigRecord {
            default_dpi_index: 0,
            ..ConfigRecord::default()
        };
        pointer.step_default_dpi(&mut record, false);
        assert_eq!(record.default_dpi_index, 0);

        for _ in 0..20 {
            pointer.step_default_dpi(&mut record, true);
        }
        assert_eq!(record.default_dpi_index, DEFAULT_DPI_INDEX_MAX);
        assert_eq!(
            pointer.device().cpi,
            Some(PointerSettings::DEFAULT.default_dpi(&record))
        );

        pointer.step_default_dpi(&mut record, false);
        assert_eq!(record.default_dpi_index, DEFAULT_DPI_INDEX_MAX - 1);
    }

    #[test]
    fn sniping_dpi_clamps_at_both_ends() {
        let mut pointer = controller();
        let mut record = ConfigRecord::default();
        pointer.step_sniping_dpi(&mut record, false);
        assert_eq!(record.sniping_dpi_index, 0);
        for _ in 0..5 {
            pointer.step_sniping_dpi(&mut record, true);
        }
        assert_eq!(record.sniping_dpi_index, SNIPING_DPI_INDEX_MAX);
    }

    #[test]
    fn stepping_sniping_dpi_while_sniping_updates_device() {
        let mut pointer = controller();
        let mut record = ConfigRecord::default();
        pointer.set_sniping_enabled(&mut record, true);
        pointer.step_sniping_dpi(&mut record, true);
        assert_eq!(
            pointer.device().cpi,
            Some(PointerSettings::DEFAULT.sniping_dpi(&record))
        );
    }

    #[test]
    fn sniping_toggle_switches_device_dpi() {
        let mut pointer = controller();
        let mut record = ConfigRecord::default();
        let settings = PointerSettings::DEFAULT;

        pointer.set_sniping_enabled(&mut record, true);
        assert!(record.sniping_enabled);
        assert_eq!(pointer.device().cpi, Some(settings.sniping_dpi(&record)));

        pointer.set_sniping_enabled(&mut record, false);
        assert_eq!(pointer.device().cpi, Some(settings.default_dpi(&record)));
    }

    #[test]
    fn dragscroll_toggle_drives_glide() {
        let mut pointer = controller();
        let mut record = ConfigRecord::default();
        pointer.set_dragscroll_enabled(&mut record, true);
        assert!(record.dragscroll_enabled);
        assert_eq!(pointer.device().glide, Some(true));
        assert_eq!(pointer.device().cpi_writes, 1);

        pointer.set_dragscroll_enabled(&mut record, false);
        assert_eq!(pointer.device().glide, Some(false));
    }

    #[test]
    fn motion_passes_through_without_dragscroll() {
        let mut pointer = controller();
        let record = ConfigRecord::default();
        let mut report = mouse(12, -7);
        pointer.task(&record, &mut report);
        assert_eq!((report.x, report.y, report.pan, report.wheel), (12, -7, 0, 0));
    }

    #[test]
    fn one_divisor_of_motion_is_one_scroll_unit() {
        let mut scroll = DragScroll::new();
        let mut report = mouse(0, 64);
        scroll.apply(&STOCK, &mut report);
        assert_eq!((report.x, report.y), (0, 0));
        assert_eq!(report.wheel, 1);
        assert_eq!(report.pan, 0);
        assert_eq!(scroll.residual(), (0, 0));

        let mut report = mouse(64, 0);
        scroll.apply(&STOCK, &mut report);
        assert_eq!(report.pan, -1);
        assert_eq!(scroll.residual(), (0, 0));
    }

    #[test]
    fn remainder_carries_without_drift() {
        let mut scroll = DragScroll::new();
        let steps: [i8; 9] = [5, 17, 30, 3, 1, 40, 33, 63, 64];
        let total: i32 = steps.iter().map(|&s| s as i32).sum();
        assert_eq!(total % 64, 0);

        let mut emitted = 0i32;
        for step in steps {
            let mut report = mouse(0, step);
            scroll.apply(&STOCK, &mut report);
            assert_eq!(report.y, 0);
            emitted += report.wheel as i32;
        }
        assert_eq!(emitted, total / 64);
        assert_eq!(scroll.residual(), (0, 0));
    }

    #[test]
    fn negative_motion_accumulates_symmetrically() {
        let mut scroll = DragScroll::new();
        let mut emitted = 0i16;
        for _ in 0..4 {
            let mut report = mouse(0, -32);
            scroll.apply(&STOCK, &mut report);
            emitted += report.wheel as i16;
        }
        assert_eq!(emitted, -2);
        assert_eq!(scroll.residual(), (0, 0));
    }

    #[test]
    fn widest_divisor_keeps_every_count() {
        let settings = PointerSettings {
            dragscroll_divisor: i16::MAX,
            ..STOCK
        };
        let mut scroll = DragScroll::new();
        let mut emitted = 0i32;
        // 516 * 127 + 2 == 2 * i16::MAX
        for step in core::iter::repeat(127i8).take(516).chain([2]) {
            let mut report = mouse(0, step);
            scroll.apply(&settings, &mut report);
            emitted += report.wheel as i32;
        }
        assert_eq!(emitted, 2);
        assert_eq!(scroll.residual(), (0, 0));
    }

    #[test]
    fn reverse_flags_flip_axes() {
        let settings = PointerSettings {
            dragscroll_reverse_x: true,
            dragscroll_reverse_y: true,
            ..STOCK
        };
        let mut scroll = DragScroll::new();
        let mut report = mouse(64, 64);
        scroll.apply(&settings, &mut report);
        assert_eq!((report.pan, report.wheel), (1, -1));
    }

    #[test]
    fn emitted_units_saturate() {
        let settings = PointerSettings {
            dragscroll_divisor: 1,
            ..STOCK
        };
        let mut scroll = DragScroll::new();
        let mut report = mouse(-128, 0);
        scroll.apply(&settings, &mut report);
        assert_eq!(report.pan, i8::MAX);
        assert_eq!(scroll.residual(), (1, 0));
    }

    #[test]
    fn task_scrolls_when_dragscroll_enabled() {
        let mut pointer = controller();
        let mut record = ConfigRecord::default();
        pointer.set_dragscroll_enabled(&mut record, true);
        let divisor = PointerSettings::DEFAULT.dragscroll_divisor as i8;
        let mut report = mouse(0, divisor);
        pointer.task(&record, &mut report);
        assert_eq!((report.x, report.y), (0, 0));
        assert_ne!(report.wheel, 0);
    }
}
