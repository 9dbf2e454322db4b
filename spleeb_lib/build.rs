use std::{env, fs, path::Path};

fn knob(name: &str, default: &str) -> String {
    println!("cargo:rerun-if-env-changed={}", name);
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn flag(name: &str) -> bool {
    println!("cargo:rerun-if-env-changed={}", name);
    matches!(
        env::var(name).as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE") | Ok("yes")
    )
}

fn main() {
    let min_default_dpi: u16 = knob("SPLEEB_MINIMUM_DEFAULT_DPI", "300")
        .parse()
        .expect("SPLEEB_MINIMUM_DEFAULT_DPI must be a u16");
    let default_dpi_step: u16 = knob("SPLEEB_DEFAULT_DPI_CONFIG_STEP", "100")
        .parse()
        .expect("SPLEEB_DEFAULT_DPI_CONFIG_STEP must be a u16");
    let min_sniping_dpi: u16 = knob("SPLEEB_MINIMUM_SNIPING_DPI", "100")
        .parse()
        .expect("SPLEEB_MINIMUM_SNIPING_DPI must be a u16");
    let sniping_dpi_step: u16 = knob("SPLEEB_SNIPING_DPI_CONFIG_STEP", "100")
        .parse()
        .expect("SPLEEB_SNIPING_DPI_CONFIG_STEP must be a u16");
    let divisor: i16 = knob("SPLEEB_DRAGSCROLL_DIVISOR", "64")
        .parse()
        .expect("SPLEEB_DRAGSCROLL_DIVISOR must be an i16");
    assert!(divisor > 0, "SPLEEB_DRAGSCROLL_DIVISOR must be positive");
    let sync_interval: u64 = knob("SPLEEB_SYNC_INTERVAL_MS", "500")
        .parse()
        .expect("SPLEEB_SYNC_INTERVAL_MS must be a u64");
    let reverse_x = flag("SPLEEB_DRAGSCROLL_REVERSE_X");
    let reverse_y = flag("SPLEEB_DRAGSCROLL_REVERSE_Y");

    // Top of the 4 bit default index and the 2 bit sniping index
    let max_default_dpi = min_default_dpi as u32 + 15 * default_dpi_step as u32;
    let max_sniping_dpi = min_sniping_dpi as u32 + 3 * sniping_dpi_step as u32;
    assert!(
        max_default_dpi <= u16::MAX as u32 && max_sniping_dpi <= u16::MAX as u32,
        "DPI table overflows u16"
    );

    let contents = format!(
        r#"pub const MINIMUM_DEFAULT_DPI: u16 = {};
pub const DEFAULT_DPI_CONFIG_STEP: u16 = {};
pub const MINIMUM_SNIPING_DPI: u16 = {};
pub const SNIPING_DPI_CONFIG_STEP: u16 = {};
pub const DRAGSCROLL_DIVISOR: i16 = {};
pub const DRAGSCROLL_REVERSE_X: bool = {};
pub const DRAGSCROLL_REVERSE_Y: bool = {};
pub const SYNC_INTERVAL_MS: u64 = {};
"#,
        min_default_dpi,
        default_dpi_step,
        min_sniping_dpi,
        sniping_dpi_step,
        divisor,
        reverse_x,
        reverse_y,
        sync_interval,
    );
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is not set");
    fs::write(Path::new(&out_dir).join("config.rs"), contents).expect("Failed to write config.rs");
}
