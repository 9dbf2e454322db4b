use sequential_storage::map::{SerializationError, Value};

/// Size of the packed record, shared by storage and the inter-half transport
pub const RECORD_SIZE: usize = 4;

/// Largest value of the 4 bit default DPI index
pub const DEFAULT_DPI_INDEX_MAX: u8 = 0x0F;
/// Largest value of the 2 bit sniping DPI index
pub const SNIPING_DPI_INDEX_MAX: u8 = 0x03;
/// Default DPI index written on first boot
pub const DEFAULT_DPI_INDEX: u8 = 4;

pub const LEFT_ENCODER: usize = 0;
pub const RIGHT_ENCODER: usize = 1;
pub const NUM_ENCODERS: usize = 2;

const DEFAULT_DPI_SHIFT: u8 = 0;
const SNIPING_DPI_SHIFT: u8 = 4;
const DRAGSCROLL_BIT: u8 = 1 << 0;
const SNIPING_BIT: u8 = 1 << 1;

/// Per keyboard configuration shared between storage and both halves.
///
/// Wire layout, little end first:
///
/// | byte | bits | field |
/// |------|------|-------|
/// | 0 | 0..=3 | `default_dpi_index` |
/// | 0 | 4..=5 | `sniping_dpi_index` |
/// | 1 | all | `encoder_modes[LEFT_ENCODER]` |
/// | 2 | all | `encoder_modes[RIGHT_ENCODER]` |
/// | 3 | 0 | `dragscroll_enabled` |
/// | 3 | 1 | `sniping_enabled` |
///
/// Every other bit is written as zero and ignored on decode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigRecord {
    pub default_dpi_index: u8,
    pub sniping_dpi_index: u8,
    pub encoder_modes: [u8; NUM_ENCODERS],
    /// Volatile, never restored from storage
    pub dragscroll_enabled: bool,
    /// Volatile, never restored from storage
    pub sniping_enabled: bool,
}

impl ConfigRecord {
    /// Factory defaults
    pub const fn default() -> Self {
        Self {
            default_dpi_index: DEFAULT_DPI_INDEX,
            sniping_dpi_index: 0,
            encoder_modes: [
                crate::encoder::LeftEncoderMode::BASE as u8,
                crate::encoder::RightEncoderMode::BASE as u8,
            ],
            dragscroll_enabled: false,
            sniping_enabled: false,
        }
    }

    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut flags = 0;
        if self.dragscroll_enabled {
            flags |= DRAGSCROLL_BIT;
        }
        if self.sniping_enabled {
            flags |= SNIPING_BIT;
        }
        [
            ((self.default_dpi_index & DEFAULT_DPI_INDEX_MAX) << DEFAULT_DPI_SHIFT)
                | ((self.sniping_dpi_index & SNIPING_DPI_INDEX_MAX) << SNIPING_DPI_SHIFT),
            self.encoder_modes[LEFT_ENCODER],
            self.encoder_modes[RIGHT_ENCODER],
            flags,
        ]
    }

    /// Decodes a record loaded from storage. The volatile toggles always come
    /// back disabled.
    pub fn decode_for_persistence(bytes: &[u8; RECORD_SIZE]) -> Self {
        Self {
            dragscroll_enabled: false,
            sniping_enabled: false,
            ..Self::decode_for_sync(bytes)
        }
    }

    /// Decodes a record received from the master half, volatile toggles included.
    pub fn decode_for_sync(bytes: &[u8; RECORD_SIZE]) -> Self {
        Self {
            default_dpi_index: (bytes[0] >> DEFAULT_DPI_SHIFT) & DEFAULT_DPI_INDEX_MAX,
            sniping_dpi_index: (bytes[0] >> SNIPING_DPI_SHIFT) & SNIPING_DPI_INDEX_MAX,
            encoder_modes: [bytes[1], bytes[2]],
            dragscroll_enabled: bytes[3] & DRAGSCROLL_BIT != 0,
            sniping_enabled: bytes[3] & SNIPING_BIT != 0,
        }
    }

    /// The packed record as one little endian word, for debug output
    pub fn raw(&self) -> u32 {
        u32::from_le_bytes(self.encode())
    }

    /// True when every persisted field matches
    pub fn persisted_eq(&self, other: &Self) -> bool {
        self.default_dpi_index == other.default_dpi_index
            && self.sniping_dpi_index == other.sniping_dpi_index
            && self.encoder_modes == other.encoder_modes
    }
}

impl<'a> Value<'a> for ConfigRecord {
    fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
        if buffer.len() < RECORD_SIZE {
            Err(SerializationError::BufferTooSmall)
        } else {
            buffer[..RECORD_SIZE].copy_from_slice(&self.encode());
            Ok(RECORD_SIZE)
        }
    }

    fn deserialize_from(buffer: &'a [u8]) -> Result<Self, SerializationError>
    where
        Self: Sized,
    {
        let bytes: &[u8; RECORD_SIZE] = buffer
            .get(..RECORD_SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or(SerializationError::BufferTooSmall)?;
        Ok(Self::decode_for_persistence(bytes))
    }
}
