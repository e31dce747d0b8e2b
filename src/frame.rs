//! Frame assembly and interpretation: bits to bytes, checksum validation, and
//! conversion of the data bytes into physical units.

/// Reading returned by a successful decode.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub relative_humidity: f64,
}

/// The two supported sensor families.
///
/// They share the wire protocol but map the four data bytes to physical
/// values differently, so the variant is consulted only when decoding a
/// validated frame.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensorKind {
    /// DHT11: integer part plus decimal part, one byte each.
    Dht11,
    /// DHT22 (AM2302): 16-bit big-endian value in tenths of a unit.
    Dht22,
}

impl SensorKind {
    /// Interprets the four data bytes of a checksum-validated frame.
    ///
    /// Byte layout is `[humidity_hi, humidity_lo, temp_hi, temp_lo]`. The
    /// DHT22 sign bit in the temperature high byte is not decoded; sub-zero
    /// readings come back as their raw magnitude.
    pub fn decode(self, data: [u8; 4]) -> Reading {
        let [hum_hi, hum_lo, temp_hi, temp_lo] = data;

        match self {
            SensorKind::Dht11 => Reading {
                relative_humidity: f64::from(hum_hi) + f64::from(hum_lo) / 10.0,
                temperature: f64::from(temp_hi) + f64::from(temp_lo) / 10.0,
            },
            SensorKind::Dht22 => Reading {
                relative_humidity: f64::from(u16::from_be_bytes([hum_hi, hum_lo])) / 10.0,
                temperature: f64::from(u16::from_be_bytes([temp_hi, temp_lo])) / 10.0,
            },
        }
    }
}

/// Packs 40 bits, MSB first, into the 5 frame bytes.
pub fn pack_bytes(bits: &[bool]) -> [u8; 5] {
    debug_assert_eq!(bits.len(), 40);

    let mut bytes = [0u8; 5];
    for (i, &bit) in bits.iter().enumerate().take(40) {
        bytes[i / 8] <<= 1;
        if bit {
            bytes[i / 8] |= 1;
        }
    }
    bytes
}

/// Checksum over a frame: the low 8 bits of the sum of the 4 data bytes.
pub fn checksum(bytes: &[u8; 5]) -> u8 {
    bytes[..4].iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
}

/// Whether the frame's trailing byte matches its computed checksum.
pub fn checksum_matches(bytes: &[u8; 5]) -> bool {
    bytes[4] == checksum(bytes)
}
