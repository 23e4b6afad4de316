use alloc::string::String;
use alloc::vec::Vec;

use crate::protocol::{EthernetFrame, TmdsSymbol};

/// A single value held for a span of time.
///
/// `offset` and `duration` are in ticks of the owning capture's timescale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample<T> {
    pub offset: i64,
    pub duration: i64,
    pub value: T,
}

impl<T> Sample<T> {
    pub fn new(offset: i64, duration: i64, value: T) -> Self {
        Self {
            offset,
            duration,
            value,
        }
    }

    /// First tick after this sample.
    pub fn end(&self) -> i64 {
        self.offset + self.duration
    }
}

/// An ordered, timestamped sequence of samples produced by one stage of the pipeline.
///
/// Once built a capture is only ever read. Stages that recompute their output build a
/// fresh capture rather than editing the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct Capture<T> {
    /// Length of one tick in the capture's time unit.
    pub timescale: i64,
    /// Wall clock time of the start of the capture, whole seconds.
    pub start_timestamp: i64,
    /// Sub-second part of the start time.
    pub start_femtoseconds: i64,
    pub samples: Vec<Sample<T>>,
}

impl<T> Capture<T> {
    pub fn new(timescale: i64) -> Self {
        Self {
            timescale,
            start_timestamp: 0,
            start_femtoseconds: 0,
            samples: Vec::new(),
        }
    }

    pub fn from_samples(timescale: i64, samples: Vec<Sample<T>>) -> Self {
        Self {
            samples,
            ..Self::new(timescale)
        }
    }

    /// Empty output capture with a timescale of 1 that starts at the same time as `source`.
    pub fn derived_from<U>(source: &Capture<U>) -> Self {
        Self {
            timescale: 1,
            start_timestamp: source.start_timestamp,
            start_femtoseconds: source.start_femtoseconds,
            samples: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Absolute start time of sample `idx`.
    pub fn time_of(&self, idx: usize) -> i64 {
        self.samples[idx].offset * self.timescale
    }

    /// Absolute time at which the last sample ends, or 0 for an empty capture.
    pub fn end_time(&self) -> i64 {
        self.samples
            .last()
            .map(|s| s.end() * self.timescale)
            .unwrap_or(0)
    }

    /// True if samples are sorted, none of them overlap the next, and every start and end
    /// time is representable in absolute units.
    pub fn is_well_formed(&self) -> bool {
        self.samples.iter().all(|s| s.duration >= 0 && self.fits_timeline(s))
            && self
                .samples
                .windows(2)
                .all(|pair| pair[0].end() <= pair[1].offset)
    }

    fn fits_timeline(&self, sample: &Sample<T>) -> bool {
        let Some(end) = sample.offset.checked_add(sample.duration) else {
            return false;
        };
        sample.offset.checked_mul(self.timescale).is_some()
            && end.checked_mul(self.timescale).is_some()
    }
}

pub type AnalogCapture = Capture<f32>;
pub type DigitalCapture = Capture<bool>;
pub type DigitalBusCapture = Capture<Vec<bool>>;
pub type TmdsCapture = Capture<TmdsSymbol>;
pub type EthernetCapture = Capture<EthernetFrame>;

/// Any capture that can sit on a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureData {
    Analog(AnalogCapture),
    Digital(DigitalCapture),
    DigitalBus(DigitalBusCapture),
    Tmds(TmdsCapture),
    Ethernet(EthernetCapture),
}

impl CaptureData {
    pub fn kind(&self) -> ChannelKind {
        match self {
            Self::Analog(_) => ChannelKind::Analog,
            Self::Digital(_) | Self::DigitalBus(_) => ChannelKind::Digital,
            Self::Tmds(_) | Self::Ethernet(_) => ChannelKind::Protocol,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Analog(c) => c.len(),
            Self::Digital(c) => c.len(),
            Self::DigitalBus(c) => c.len(),
            Self::Tmds(c) => c.len(),
            Self::Ethernet(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_digital(&self) -> Option<&DigitalCapture> {
        match self {
            Self::Digital(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_digital_bus(&self) -> Option<&DigitalBusCapture> {
        match self {
            Self::DigitalBus(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_tmds(&self) -> Option<&TmdsCapture> {
        match self {
            Self::Tmds(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_ethernet(&self) -> Option<&EthernetCapture> {
        match self {
            Self::Ethernet(c) => Some(c),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Analog,
    Digital,
    /// Output of another decoder
    Protocol,
}

/// A named signal that can be bound to a decoder input.
///
/// `kind` and `width` are what the channel declares itself to be. Decoders check these when
/// a channel is bound, and check `data` again when they refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub name: String,
    pub kind: ChannelKind,
    pub width: usize,
    pub data: Option<CaptureData>,
}

impl Channel {
    pub fn new(name: impl Into<String>, kind: ChannelKind, width: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            width,
            data: None,
        }
    }

    pub fn digital(name: impl Into<String>, capture: DigitalCapture) -> Self {
        Self {
            data: Some(CaptureData::Digital(capture)),
            ..Self::new(name, ChannelKind::Digital, 1)
        }
    }

    pub fn digital_bus(name: impl Into<String>, width: usize, capture: DigitalBusCapture) -> Self {
        Self {
            data: Some(CaptureData::DigitalBus(capture)),
            ..Self::new(name, ChannelKind::Digital, width)
        }
    }

    pub fn analog(name: impl Into<String>, capture: AnalogCapture) -> Self {
        Self {
            data: Some(CaptureData::Analog(capture)),
            ..Self::new(name, ChannelKind::Analog, 1)
        }
    }

    pub fn digital_capture(&self) -> Option<&DigitalCapture> {
        self.data.as_ref()?.as_digital()
    }

    pub fn digital_bus_capture(&self) -> Option<&DigitalBusCapture> {
        self.data.as_ref()?.as_digital_bus()
    }
}
