//! JSON capture files.
//!
//! ```json
//! {
//!   "timescale": 1000,
//!   "channels": [
//!     { "name": "clk", "kind": "digital", "samples": [[0, 1, false], [1, 1, true]] },
//!     { "name": "rxd", "kind": "digital", "width": 8,
//!       "samples": [[0, 2, [true, false, false, false, false, false, false, false]]] },
//!     { "name": "vbus", "kind": "analog", "samples": [[0, 2, 3.3]] }
//!   ]
//! }
//! ```
//!
//! Every channel shares the file's timescale and start time. Bus values are listed LSB first.

use crate::error::ScopeError;
use log::debug;
use scopecore::capture::{Capture, CaptureData, Channel, ChannelKind, Sample};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureFile {
    #[serde(default = "default_timescale")]
    pub timescale: i64,
    #[serde(default)]
    pub start_timestamp: i64,
    #[serde(default)]
    pub start_femtoseconds: i64,
    pub channels: Vec<ChannelRecord>,
}

fn default_timescale() -> i64 {
    1
}

fn default_width() -> usize {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Digital,
    Analog,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub name: String,
    pub kind: RecordKind,
    #[serde(default = "default_width")]
    pub width: usize,
    pub samples: Vec<SampleRecord>,
}

/// `[offset, duration, value]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord(pub i64, pub i64, pub SampleValue);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleValue {
    Bit(bool),
    Bus(Vec<bool>),
    Level(f32),
}

impl CaptureFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ScopeError> {
        let file = File::open(path.as_ref())?;
        debug!("reading capture from {}", path.as_ref().display());
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ScopeError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ScopeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Convert every record into a channel, checking each sample against the declared kind.
    pub fn into_channels(self) -> Result<Vec<Channel>, ScopeError> {
        let mut channels = Vec::with_capacity(self.channels.len());
        for record in &self.channels {
            let (kind, width, data) = match (record.kind, record.width) {
                (RecordKind::Digital, 1) => {
                    let cap = self.capture_of(record, |v| match v {
                        SampleValue::Bit(b) => Some(*b),
                        _ => None,
                    })?;
                    (ChannelKind::Digital, 1, CaptureData::Digital(cap))
                }
                (RecordKind::Digital, width) => {
                    let cap = self.capture_of(record, |v| match v {
                        SampleValue::Bus(bits) if bits.len() == width => Some(bits.clone()),
                        _ => None,
                    })?;
                    (ChannelKind::Digital, width, CaptureData::DigitalBus(cap))
                }
                (RecordKind::Analog, _) => {
                    let cap = self.capture_of(record, |v| match v {
                        SampleValue::Level(x) => Some(*x),
                        _ => None,
                    })?;
                    (ChannelKind::Analog, 1, CaptureData::Analog(cap))
                }
            };
            debug!("channel '{}': {} samples", record.name, data.len());
            channels.push(Channel {
                name: record.name.clone(),
                kind,
                width,
                data: Some(data),
            });
        }
        Ok(channels)
    }

    fn capture_of<T>(
        &self,
        record: &ChannelRecord,
        convert: impl Fn(&SampleValue) -> Option<T>,
    ) -> Result<Capture<T>, ScopeError> {
        let mut samples = Vec::with_capacity(record.samples.len());
        for (index, SampleRecord(offset, duration, value)) in record.samples.iter().enumerate() {
            let value = convert(value).ok_or_else(|| ScopeError::SampleTypeMismatch {
                channel: record.name.clone(),
                index,
            })?;
            samples.push(Sample::new(*offset, *duration, value));
        }
        let capture = Capture {
            timescale: self.timescale,
            start_timestamp: self.start_timestamp,
            start_femtoseconds: self.start_femtoseconds,
            samples,
        };
        if !capture.is_well_formed() {
            return Err(ScopeError::MalformedCapture(record.name.clone()));
        }
        Ok(capture)
    }
}
