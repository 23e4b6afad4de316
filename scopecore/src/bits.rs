/// Read-only view over a run of logic levels, where element 0 is the first bit on the wire.
pub(crate) struct Bits<'a>(&'a [bool]);

impl<'a> Bits<'a> {
    pub(crate) fn new(data: &'a [bool]) -> Self {
        Self(data)
    }

    pub(crate) fn get_bit(&self, idx: usize) -> u8 {
        self.0.get(idx).copied().unwrap_or(false) as u8
    }

    /// True if every bit equals the corresponding 0/1 entry of `pattern`.
    pub(crate) fn matches(&self, pattern: &[u8]) -> bool {
        self.0.len() == pattern.len() && self.0.iter().zip(pattern).all(|(b, p)| *b as u8 == *p)
    }

    /// Pack the 8 bits starting at `start`, the first of them becoming the least significant.
    ///
    /// Bits beyond the end of the view read as 0.
    pub(crate) fn byte_lsb_first(&self, start: usize) -> u8 {
        let mut out = 0u8;
        for i in 0..8 {
            out |= self.get_bit(start + i) << i;
        }
        out
    }
}

/// Convert a bus value to a byte, bus bit 0 being the lowest order bit.
pub(crate) fn pack_lsb_first(bits: &[bool]) -> u8 {
    Bits::new(bits).byte_lsb_first(0)
}
