#![doc = include_str!("../README.md")]

pub mod capture_file;
pub mod error;
pub mod filter;

pub use error::ScopeError;
pub use scopecore::capture::{Capture, CaptureData, Channel, ChannelKind, Sample};
