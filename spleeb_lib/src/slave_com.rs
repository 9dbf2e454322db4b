use crate::record::{ConfigRecord, RECORD_SIZE};

/// Master side of the split link. Carries the packed config to the slave half.
#[allow(async_fn_in_trait)]
pub trait Master {
    type Error;
    /// Resolves once the slave acknowledged the payload or the link gave up.
    /// Must not wait indefinitely.
    async fn send_config(&mut self, payload: &[u8; RECORD_SIZE]) -> Result<(), Self::Error>;
}

/// Slave side receive handler. A payload of the exact record size replaces
/// `live` wholesale, volatile toggles included. Anything else is dropped and
/// `false` returned.
pub fn apply_sync_payload(live: &mut ConfigRecord, payload: &[u8]) -> bool {
    match <&[u8; RECORD_SIZE]>::try_from(payload) {
        Ok(bytes) => {
            *live = ConfigRecord::decode_for_sync(bytes);
            true
        }
        Err(_) => {
            warn!(
                "Dropped config sync of {} bytes, expected {}",
                payload.len(),
                RECORD_SIZE
            );
            false
        }
    }
}
