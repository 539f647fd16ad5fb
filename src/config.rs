//! Quantization settings: target C integer type, resolution and offsets.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Unsigned C integer type used for the coordinate arrays.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DataType {
    U8,
    U16,
    U32,
}

impl DataType {
    pub fn bits(self) -> u32 {
        match self {
            DataType::U8 => 8,
            DataType::U16 => 16,
            DataType::U32 => 32,
        }
    }

    pub fn bytes(self) -> usize {
        self.bits() as usize / 8
    }

    /// Largest value representable by this type.
    pub fn max_value(self) -> u64 {
        (1u64 << self.bits()) - 1
    }

    /// The C type name, e.g. `uint16_t`.
    pub fn c_name(self) -> &'static str {
        match self {
            DataType::U8 => "uint8_t",
            DataType::U16 => "uint16_t",
            DataType::U32 => "uint32_t",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.c_name())
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uint8_t" => Ok(DataType::U8),
            "uint16_t" => Ok(DataType::U16),
            "uint32_t" => Ok(DataType::U32),
            other => Err(Error::InvalidDataType(other.to_string())),
        }
    }
}

/// Validated quantization settings.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct QuantizationConfig {
    pub data_type: DataType,
    /// Span of the scaled coordinates, `0..=resolution` before offsets.
    pub resolution: u32,
    pub x_offset: i64,
    pub y_offset: i64,
}

impl QuantizationConfig {
    /// Build a config, failing if `resolution` does not fit strictly below
    /// `2^bits` of the data type.
    pub fn new(
        data_type: DataType,
        resolution: u32,
        x_offset: i64,
        y_offset: i64,
    ) -> Result<Self, Error> {
        let config = Self {
            data_type,
            resolution,
            x_offset,
            y_offset,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if u64::from(self.resolution) >= 1u64 << self.data_type.bits() {
            return Err(Error::ResolutionOutOfRange {
                resolution: self.resolution,
                data_type: self.data_type,
            });
        }
        Ok(())
    }
}
