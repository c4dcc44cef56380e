//! Telemetry packet layout.
//!
//! A packet is kept in its wire form from the moment a sample is written:
//! the buffer handed to the transport is the same bytes the sampling loop
//! filled, with no serialization step in between.

/// Samples per telemetry packet (one packet per 50 ms at the 1 kHz tick)
pub const SAMPLES_PER_PACKET: usize = 50;

/// Packet validity tag, first two bytes on the wire
pub const PACKET_TAG: [u8; 2] = *b"ES";

/// Wire width of one sample: five little-endian f32 values
pub const MEASUREMENT_LEN: usize = 5 * 4;

/// Complete packet length: tag plus all sample records
pub const PACKET_LEN: usize = PACKET_TAG.len() + SAMPLES_PER_PACKET * MEASUREMENT_LEN;

/// Errors that can occur when decoding a packet on the host side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// Input shorter or longer than [`PACKET_LEN`]
    WrongLength,
    /// First two bytes are not [`PACKET_TAG`]
    BadTag,
}

/// One time sample of the machine's observable state.
///
/// Immutable once written into a packet. Units: bar, ml/s, grams, °C.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    pub pressure_bar: f32,
    pub flow_ml_s: f32,
    pub weight_g: f32,
    pub temp_boiler_c: f32,
    pub temp_group_c: f32,
}

impl Measurement {
    /// Encode into one wire record
    pub fn write_to(&self, record: &mut [u8; MEASUREMENT_LEN]) {
        record[0..4].copy_from_slice(&self.pressure_bar.to_le_bytes());
        record[4..8].copy_from_slice(&self.flow_ml_s.to_le_bytes());
        record[8..12].copy_from_slice(&self.weight_g.to_le_bytes());
        record[12..16].copy_from_slice(&self.temp_boiler_c.to_le_bytes());
        record[16..20].copy_from_slice(&self.temp_group_c.to_le_bytes());
    }

    /// Decode from one wire record
    pub fn read_from(record: &[u8; MEASUREMENT_LEN]) -> Self {
        let f = |i: usize| {
            let mut b = [0u8; 4];
            b.copy_from_slice(&record[i..i + 4]);
            f32::from_le_bytes(b)
        };
        Self {
            pressure_bar: f(0),
            flow_ml_s: f(4),
            weight_g: f(8),
            temp_boiler_c: f(12),
            temp_group_c: f(16),
        }
    }
}

/// A telemetry packet, stored as its exact wire image.
///
/// Created zeroed, filled record by record, tagged when complete, then
/// handed to the transport as-is. After a confirmed send the same storage
/// is reused for the next fill cycle; records are simply overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryPacket {
    bytes: [u8; PACKET_LEN],
}

impl Default for TelemetryPacket {
    fn default() -> Self {
        Self::empty()
    }
}

impl TelemetryPacket {
    /// Create an empty (untagged, zeroed) packet
    pub const fn empty() -> Self {
        Self {
            bytes: [0u8; PACKET_LEN],
        }
    }

    /// Write the sample record at `index`
    ///
    /// `index` must be below [`SAMPLES_PER_PACKET`].
    pub fn set_sample(&mut self, index: usize, sample: &Measurement) {
        let start = PACKET_TAG.len() + index * MEASUREMENT_LEN;
        let mut record = [0u8; MEASUREMENT_LEN];
        sample.write_to(&mut record);
        self.bytes[start..start + MEASUREMENT_LEN].copy_from_slice(&record);
    }

    /// Read back the sample record at `index`
    pub fn sample(&self, index: usize) -> Measurement {
        let start = PACKET_TAG.len() + index * MEASUREMENT_LEN;
        let mut record = [0u8; MEASUREMENT_LEN];
        record.copy_from_slice(&self.bytes[start..start + MEASUREMENT_LEN]);
        Measurement::read_from(&record)
    }

    /// Stamp the validity tag, marking the packet as complete telemetry
    pub fn stamp_tag(&mut self) {
        self.bytes[0..2].copy_from_slice(&PACKET_TAG);
    }

    /// Whether the validity tag has been stamped
    pub fn is_tagged(&self) -> bool {
        self.bytes[0..2] == PACKET_TAG
    }

    /// The complete wire image
    pub fn as_bytes(&self) -> &[u8; PACKET_LEN] {
        &self.bytes
    }

    /// Decode a received packet (host side)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PacketError> {
        let bytes: &[u8; PACKET_LEN] = bytes.try_into().map_err(|_| PacketError::WrongLength)?;
        if bytes[0..2] != PACKET_TAG {
            return Err(PacketError::BadTag);
        }
        Ok(Self { bytes: *bytes })
    }
}
