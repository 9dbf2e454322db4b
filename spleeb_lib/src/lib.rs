#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod config {
    include!(concat!(env!("OUT_DIR"), "/config.rs"));
}

pub mod dispatch;
pub mod display;
pub mod encoder;
pub mod keyboard;
pub mod keycodes;
pub mod pointer;
pub mod record;
pub mod slave_com;
pub mod storage;
pub mod sync;

#[cfg(test)]
mod test_util;

pub use keyboard::{Spleeb, UserHooks};
pub use record::ConfigRecord;
