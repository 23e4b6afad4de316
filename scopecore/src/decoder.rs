use alloc::string::String;
use alloc::vec::Vec;

use crate::capture::{CaptureData, Channel};

/// An integer setting exposed by a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    pub name: &'static str,
    pub value: i64,
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoderError {
    /// The decoder has no parameter by this name
    UnknownParameter,
    /// The value is outside the parameter's inclusive range
    ParameterOutOfRange { value: i64, min: i64, max: i64 },
}

/// A protocol decoder: a function from a fixed set of input channels to one output capture.
///
/// Inputs are positional. `input_names()` gives the slot names in order and the caller passes
/// the same number of entries to `refresh()`, `None` for a slot with nothing bound.
pub trait Decoder: Send + Sync {
    /// Human readable protocol name, e.g. "Ethernet - GMII".
    fn protocol_name(&self) -> &'static str;

    /// Names of the input slots.
    fn input_names(&self) -> &'static [&'static str];

    /// Whether `channel` is acceptable for input slot `slot`.
    ///
    /// Callers should reject a binding that fails this check. `refresh()` checks again in case
    /// the channel has changed since it was bound.
    fn validate_input(&self, slot: usize, channel: &Channel) -> bool;

    /// Whether the decoder has settings the user should look at before relying on its output.
    fn needs_config(&self) -> bool {
        false
    }

    fn parameters(&self) -> Vec<Parameter> {
        Vec::new()
    }

    fn set_parameter(&mut self, _name: &str, _value: i64) -> Result<(), DecoderError> {
        Err(DecoderError::UnknownParameter)
    }

    /// Display name derived from the primary input, e.g. "TMDS(lane0)".
    fn default_name(&self, inputs: &[Option<&Channel>]) -> String;

    /// Decode the inputs into a freshly built capture.
    ///
    /// Returns `None` if any input is unbound, has the wrong type, or does not contain enough
    /// data to decode. This is a normal outcome and never an error.
    fn refresh(&self, inputs: &[Option<&Channel>]) -> Option<CaptureData>;
}

/// All `N` inputs, or `None` if any of them is unbound.
pub(crate) fn bound_inputs<'a, const N: usize>(
    inputs: &[Option<&'a Channel>],
) -> Option<[&'a Channel; N]> {
    let bound: Vec<&Channel> = inputs.iter().take(N).copied().collect::<Option<Vec<_>>>()?;
    bound.try_into().ok()
}

/// Name of the channel on slot 0, or an empty string if nothing is bound there.
pub(crate) fn primary_name<'a>(inputs: &[Option<&'a Channel>]) -> &'a str {
    inputs
        .first()
        .copied()
        .flatten()
        .map(|c| c.name.as_str())
        .unwrap_or("")
}

/// Check `value` against the bounds of `param`.
pub(crate) fn check_range(param: &Parameter, value: i64) -> Result<(), DecoderError> {
    if value < param.min || value > param.max {
        return Err(DecoderError::ParameterOutOfRange {
            value,
            min: param.min,
            max: param.max,
        });
    }
    Ok(())
}
