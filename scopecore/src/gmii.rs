//! Ethernet over GMII: an 8-bit data bus qualified by an enable line, sampled on the rising
//! edge of the transmit or receive clock.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::bits::pack_lsb_first;
use crate::capture::{CaptureData, Channel, ChannelKind, EthernetCapture, Sample};
use crate::decoder::{Decoder, bound_inputs, primary_name};
use crate::protocol::EthernetFrame;
use crate::resample::{keep_last, sample_on_rising_edges};
use log::debug;

/// Turns the raw octets of one frame into output samples.
pub trait FrameParser: Send + Sync {
    fn bytes_to_frames(&self, frame: EthernetFrame, cap: &mut EthernetCapture);
}

/// Publishes every frame unchanged as a single output sample.
pub struct RawFrameParser;

impl FrameParser for RawFrameParser {
    fn bytes_to_frames(&self, frame: EthernetFrame, cap: &mut EthernetCapture) {
        let start = frame.start();
        let end = frame.end();
        cap.samples.push(Sample::new(start, end - start, frame));
    }
}

/// Split clock-aligned bus and enable streams into frames, one per run of asserted enable.
///
/// Both slices must come from the same clock with equal indices on the same edge.
pub fn assemble_frames(data: &[Sample<Vec<bool>>], en: &[Sample<bool>]) -> Vec<EthernetFrame> {
    let mut frames = Vec::new();
    let len = data.len().min(en.len());
    let mut i = 0;
    while i < len {
        if !en[i].value {
            i += 1;
            continue;
        }
        let mut octets = Vec::new();
        while i < len && en[i].value {
            let d = &data[i];
            octets.push(Sample::new(d.offset, d.duration, pack_lsb_first(&d.value)));
            i += 1;
        }
        frames.push(EthernetFrame::new(octets));
    }
    frames
}

pub struct GmiiDecoder {
    parser: Box<dyn FrameParser>,
}

impl GmiiDecoder {
    pub fn new() -> Self {
        Self::with_parser(RawFrameParser)
    }

    pub fn with_parser<P: FrameParser + 'static>(parser: P) -> Self {
        Self {
            parser: Box::new(parser),
        }
    }
}

impl Default for GmiiDecoder {
    fn default() -> Self {
        Self::new()
    }
}

// Data first, since that's where the decoded frames are normally shown.
const INPUT_NAMES: [&str; 4] = ["data", "clk", "en", "er"];

impl Decoder for GmiiDecoder {
    fn protocol_name(&self) -> &'static str {
        "Ethernet - GMII"
    }

    fn input_names(&self) -> &'static [&'static str] {
        &INPUT_NAMES
    }

    fn validate_input(&self, slot: usize, channel: &Channel) -> bool {
        if channel.kind != ChannelKind::Digital {
            return false;
        }
        match slot {
            0 => channel.width == 8,
            1..=3 => channel.width == 1,
            _ => false,
        }
    }

    fn default_name(&self, inputs: &[Option<&Channel>]) -> String {
        format!("GMII({})", primary_name(inputs))
    }

    fn refresh(&self, inputs: &[Option<&Channel>]) -> Option<CaptureData> {
        let channels = bound_inputs::<4>(inputs)?;
        if !channels
            .iter()
            .enumerate()
            .all(|(slot, c)| self.validate_input(slot, c))
        {
            debug!("GMII: inputs no longer valid");
            return None;
        }
        let [data, clk, en, er] = channels;
        let data = data.digital_bus_capture()?;
        let clk = clk.digital_capture()?;
        let en = en.digital_capture()?;
        // TODO: flag frames with er asserted; for now it is bound and checked but not read
        er.digital_capture()?;

        // Sample data and enable on the clock edges
        let mut ddata = sample_on_rising_edges(data, clk);
        let mut den = sample_on_rising_edges(en, clk);
        let len = ddata.len().min(den.len());
        keep_last(&mut ddata, len);
        keep_last(&mut den, len);

        let mut cap = EthernetCapture::derived_from(data);
        let frames = assemble_frames(&ddata, &den);
        debug!("GMII: {} frames in {} clock cycles", frames.len(), len);
        for frame in frames {
            self.parser.bytes_to_frames(frame, &mut cap);
        }
        Some(CaptureData::Ethernet(cap))
    }
}
