use alloc::vec::Vec;
use core::fmt;

use crate::capture::Sample;

/// One decoded 10-bit TMDS character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TmdsSymbol {
    /// Control period character, carrying the index of the matched control code (0-3)
    Control(u8),
    /// Video or data island leading guard band
    Guard,
    /// Recovered 8-bit pixel data
    Data(u8),
}

impl fmt::Display for TmdsSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Control(code) => write!(f, "CTL{code}"),
            Self::Guard => write!(f, "GB"),
            Self::Data(value) => write!(f, "{value:02x}"),
        }
    }
}

/// Octets recovered from one contiguous run of the GMII enable signal.
///
/// Each octet keeps the time span of the clock cycle it was sampled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthernetFrame {
    pub octets: Vec<Sample<u8>>,
}

impl EthernetFrame {
    pub fn new(octets: Vec<Sample<u8>>) -> Self {
        Self { octets }
    }

    /// Offset of the first octet.
    pub fn start(&self) -> i64 {
        self.octets.first().map(|o| o.offset).unwrap_or(0)
    }

    /// End of the last octet.
    pub fn end(&self) -> i64 {
        self.octets.last().map(|o| o.end()).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.octets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.octets.is_empty()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.octets.iter().map(|o| o.value).collect()
    }
}

impl fmt::Display for EthernetFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes:", self.octets.len())?;
        for o in &self.octets {
            write!(f, " {:02x}", o.value)?;
        }
        Ok(())
    }
}
