//! TMDS (HDMI/DVI) symbol recovery from a single differential lane.
//!
//! There is no character boundary signal, so the decoder works out the boundary itself by
//! looking for the control codes which are repeated during blanking (HDMI 1.4 section 5.4.2),
//! then walks the whole capture in 10-bit steps from that alignment.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::bits::Bits;
use crate::capture::{CaptureData, Channel, ChannelKind, Sample, TmdsCapture};
use crate::decoder::{Decoder, DecoderError, Parameter, bound_inputs, check_range, primary_name};
use crate::protocol::TmdsSymbol;
use crate::resample::sample_on_any_edges;
use log::{debug, trace};

pub const SYMBOL_BITS: usize = 10;

pub const LANE_PARAMETER: &str = "Lane number";

/// TMDS sends the LSB first, so element 0 here is bit 0 of the code as written in the HDMI tables.
pub(crate) const CONTROL_CODES: [[u8; SYMBOL_BITS]; 4] = [
    [0, 0, 1, 0, 1, 0, 1, 0, 1, 1],
    [1, 1, 0, 1, 0, 1, 0, 1, 0, 0],
    [0, 0, 1, 0, 1, 0, 1, 0, 1, 0],
    [1, 1, 0, 1, 0, 1, 0, 1, 0, 1],
];

/// Video leading guard band per lane (HDMI 1.4 section 5.2.2.1).
///
/// Lane 1 is also the data island guard band (5.2.3.3).
pub(crate) const VIDEO_GUARD: [[u8; SYMBOL_BITS]; 3] = [
    [0, 0, 1, 1, 0, 0, 1, 1, 0, 1],
    [1, 1, 0, 0, 1, 1, 0, 0, 1, 0],
    [0, 0, 1, 1, 0, 0, 1, 1, 0, 1],
];

// TODO: TERC4 data island characters (HDMI 1.4 section 5.4.3)

/// Character boundary chosen by the phase search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alignment {
    /// Bit position of the first complete character
    pub offset: usize,
    /// Control code seen most often at this offset
    pub code: usize,
    /// How many times it was seen
    pub count: usize,
}

/// What the previous character was, which decides whether a guard band may come next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastSymbol {
    Data,
    Preamble,
    Guard,
}

fn match_control(window: &Bits) -> Option<usize> {
    CONTROL_CODES.iter().position(|code| window.matches(code))
}

/// Find the bit offset (0-9) at which control codes line up most often.
///
/// For every offset the stream is cut into 10-bit windows and matches are counted separately
/// for each control code. The winner is the first offset to reach the highest single count,
/// so ties go to the lower offset. With no control codes at all the result is offset 0 with a
/// count of 0. The skew is assumed constant for the whole capture.
pub fn find_alignment(bits: &[bool]) -> Alignment {
    let mut best = Alignment {
        offset: 0,
        code: 0,
        count: 0,
    };
    for offset in 0..SYMBOL_BITS {
        let mut counts = [0usize; 4];
        for window in bits.get(offset..).unwrap_or(&[]).chunks_exact(SYMBOL_BITS) {
            if let Some(code) = match_control(&Bits::new(window)) {
                counts[code] += 1;
            }
        }
        for (code, &count) in counts.iter().enumerate() {
            if count > best.count {
                best = Alignment {
                    offset,
                    code,
                    count,
                };
            }
        }
    }
    best
}

/// Recover the byte from a 10-bit video data character.
///
/// Bit 9 says whether bits 0-7 were inverted and bit 8 whether the transition minimising
/// stage used XOR or XNOR.
pub fn decode_data_word(word: &[bool]) -> u8 {
    let bits = Bits::new(word);
    let mut d = bits.byte_lsb_first(0);
    if bits.get_bit(9) != 0 {
        d ^= 0xff;
    }
    if bits.get_bit(8) != 0 {
        d ^= d << 1;
    } else {
        d ^= (d << 1) ^ 0xfe;
    }
    d
}

/// Classify every complete 10-bit window of `stream`, starting at bit `offset`.
///
/// `bits` holds the values of `stream`, one per sample. A guard band is only recognised
/// straight after a control code or another guard band; anywhere else the same bits are decoded
/// as data. Each symbol runs from its first bit to the first bit of the next window, or to the
/// end of its last bit if there is no next window.
pub fn classify_symbols(
    stream: &[Sample<bool>],
    bits: &[bool],
    offset: usize,
    lane: usize,
) -> Vec<Sample<TmdsSymbol>> {
    debug_assert_eq!(stream.len(), bits.len());
    let guard = &VIDEO_GUARD[lane.min(VIDEO_GUARD.len() - 1)];

    let mut out = Vec::with_capacity(bits.len() / SYMBOL_BITS);
    let mut last = LastSymbol::Data;
    let mut i = offset;
    while i + SYMBOL_BITS <= bits.len() {
        let window = Bits::new(&bits[i..i + SYMBOL_BITS]);

        let symbol = if let Some(code) = match_control(&window) {
            last = LastSymbol::Preamble;
            TmdsSymbol::Control(code as u8)
        } else if matches!(last, LastSymbol::Preamble | LastSymbol::Guard) && window.matches(guard)
        {
            last = LastSymbol::Guard;
            TmdsSymbol::Guard
        } else {
            last = LastSymbol::Data;
            TmdsSymbol::Data(decode_data_word(&bits[i..i + SYMBOL_BITS]))
        };

        let start = stream[i].offset;
        let end = match stream.get(i + SYMBOL_BITS) {
            Some(next) => next.offset,
            None => stream[i + SYMBOL_BITS - 1].end(),
        };
        trace!("TMDS symbol at {start}: {symbol}");
        out.push(Sample::new(start, end - start, symbol));
        i += SYMBOL_BITS;
    }
    out
}

/// Phase search followed by classification, for a stream already sampled at every bit.
pub fn decode_symbols(
    stream: &[Sample<bool>],
    lane: usize,
) -> (Alignment, Vec<Sample<TmdsSymbol>>) {
    let bits: Vec<bool> = stream.iter().map(|s| s.value).collect();
    let alignment = find_alignment(&bits);
    debug!(
        "TMDS alignment: offset {} with {} x control code {}",
        alignment.offset, alignment.count, alignment.code
    );
    (alignment, classify_symbols(stream, &bits, alignment.offset, lane))
}

/// Decoder for one TMDS lane.
///
/// Inputs are the serial data line and a bit clock that toggles once per bit, so the data is
/// sampled on both edges of the clock.
pub struct TmdsDecoder {
    lane: usize,
}

impl TmdsDecoder {
    pub fn new() -> Self {
        Self { lane: 0 }
    }

    pub fn lane(&self) -> usize {
        self.lane
    }

    fn lane_parameter(&self) -> Parameter {
        Parameter {
            name: LANE_PARAMETER,
            value: self.lane as i64,
            min: 0,
            max: VIDEO_GUARD.len() as i64 - 1,
        }
    }
}

impl Default for TmdsDecoder {
    fn default() -> Self {
        Self::new()
    }
}

const INPUT_NAMES: [&str; 2] = ["data", "clk"];

impl Decoder for TmdsDecoder {
    fn protocol_name(&self) -> &'static str {
        "8b/10b (TMDS)"
    }

    fn input_names(&self) -> &'static [&'static str] {
        &INPUT_NAMES
    }

    fn validate_input(&self, slot: usize, channel: &Channel) -> bool {
        slot < INPUT_NAMES.len() && channel.kind == ChannelKind::Digital && channel.width == 1
    }

    fn needs_config(&self) -> bool {
        true
    }

    fn parameters(&self) -> Vec<Parameter> {
        alloc::vec![self.lane_parameter()]
    }

    fn set_parameter(&mut self, name: &str, value: i64) -> Result<(), DecoderError> {
        if name != LANE_PARAMETER {
            return Err(DecoderError::UnknownParameter);
        }
        check_range(&self.lane_parameter(), value)?;
        self.lane = value as usize;
        Ok(())
    }

    fn default_name(&self, inputs: &[Option<&Channel>]) -> String {
        format!("TMDS({})", primary_name(inputs))
    }

    fn refresh(&self, inputs: &[Option<&Channel>]) -> Option<CaptureData> {
        let [data, clk] = bound_inputs::<2>(inputs)?;
        if !self.validate_input(0, data) || !self.validate_input(1, clk) {
            debug!("TMDS: inputs no longer valid");
            return None;
        }
        let din = data.digital_capture()?;
        let clkin = clk.digital_capture()?;

        let stream = sample_on_any_edges(din, clkin);
        if stream.len() < SYMBOL_BITS {
            debug!("TMDS: only {} bits sampled, need at least {}", stream.len(), SYMBOL_BITS);
            return None;
        }

        let (_, symbols) = decode_symbols(&stream, self.lane);
        let mut cap = TmdsCapture::derived_from(din);
        cap.samples = symbols;
        debug!("TMDS: decoded {} symbols from {} bits", cap.len(), stream.len());
        Some(CaptureData::Tmds(cap))
    }
}
