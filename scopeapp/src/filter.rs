use crate::error::ScopeError;
use log::debug;
use scopecore::capture::{CaptureData, Channel};
use scopecore::decoder::{Decoder, Parameter};
use std::sync::{Arc, RwLock};

/// Shared view of a filter's most recent output.
///
/// Cloned handles can be read from other threads while the filter refreshes. A reader sees
/// either the previous output or the new one in full, never a partly built capture.
#[derive(Clone, Default)]
pub struct OutputSlot(Arc<RwLock<Option<Arc<CaptureData>>>>);

impl OutputSlot {
    pub fn get(&self) -> Option<Arc<CaptureData>> {
        self.0.read().unwrap().clone()
    }

    fn replace(&self, data: Option<Arc<CaptureData>>) -> Option<Arc<CaptureData>> {
        std::mem::replace(&mut *self.0.write().unwrap(), data)
    }
}

/// A decoder together with the channels bound to its inputs and the output it last produced.
pub struct Filter {
    decoder: Box<dyn Decoder>,
    inputs: Vec<Option<Arc<Channel>>>,
    output: OutputSlot,
}

impl Filter {
    pub fn new(decoder: Box<dyn Decoder>) -> Self {
        let inputs = vec![None; decoder.input_names().len()];
        Self {
            decoder,
            inputs,
            output: OutputSlot::default(),
        }
    }

    /// Create a filter for a protocol from the registry, by id or name.
    pub fn for_protocol(key: &str) -> Result<Self, ScopeError> {
        let decoder = scopecore::registry::create_decoder(key)
            .ok_or_else(|| ScopeError::UnknownProtocol(key.to_owned()))?;
        Ok(Self::new(decoder))
    }

    pub fn protocol_name(&self) -> &'static str {
        self.decoder.protocol_name()
    }

    pub fn input_names(&self) -> &'static [&'static str] {
        self.decoder.input_names()
    }

    pub fn needs_config(&self) -> bool {
        self.decoder.needs_config()
    }

    /// Bind `channel` to input `slot`, replacing whatever was bound there.
    ///
    /// Fails without changing anything if the decoder does not accept the channel.
    pub fn bind(&mut self, slot: usize, channel: Arc<Channel>) -> Result<(), ScopeError> {
        let count = self.inputs.len();
        if slot >= count {
            return Err(ScopeError::SlotOutOfRange { slot, count });
        }
        if !self.decoder.validate_input(slot, &channel) {
            return Err(ScopeError::IncompatibleChannel {
                input: self.input_names()[slot].to_owned(),
                channel: channel.name.clone(),
            });
        }
        debug!(
            "{}: bound '{}' to input '{}'",
            self.protocol_name(),
            channel.name,
            self.input_names()[slot]
        );
        self.inputs[slot] = Some(channel);
        Ok(())
    }

    pub fn unbind(&mut self, slot: usize) -> Option<Arc<Channel>> {
        self.inputs.get_mut(slot)?.take()
    }

    pub fn parameters(&self) -> Vec<Parameter> {
        self.decoder.parameters()
    }

    pub fn set_parameter(&mut self, name: &str, value: i64) -> Result<(), ScopeError> {
        self.decoder
            .set_parameter(name, value)
            .map_err(|e| ScopeError::from_decoder(name, e))
    }

    /// Display name such as "TMDS(D0)", based on the channel bound to the first input.
    pub fn display_name(&self) -> String {
        self.decoder.default_name(&self.bound())
    }

    /// Recompute the output from the current inputs and install it in one step.
    ///
    /// Taking `&mut self` keeps refreshes of one filter from overlapping.
    pub fn refresh(&mut self) {
        let data = self.decoder.refresh(&self.bound()).map(Arc::new);
        match &data {
            Some(d) => debug!("{}: refreshed, {} samples", self.display_name(), d.len()),
            None => debug!("{}: refreshed, no data", self.display_name()),
        }
        self.output.replace(data);
    }

    pub fn output(&self) -> Option<Arc<CaptureData>> {
        self.output.get()
    }

    /// A handle for reading the output independently of the filter.
    pub fn output_slot(&self) -> OutputSlot {
        self.output.clone()
    }

    fn bound(&self) -> Vec<Option<&Channel>> {
        self.inputs.iter().map(|c| c.as_deref()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scopecore::capture::{Capture, ChannelKind, Sample};
    use scopecore::protocol::TmdsSymbol;
    use scopecore::tmds::LANE_PARAMETER;

    const CTL0: [bool; 10] = [
        false, false, true, false, true, false, true, false, true, true,
    ];

    /// A TMDS lane carrying `n` repetitions of control code 0, clocked on both edges.
    fn tmds_lane(n: usize) -> (Arc<Channel>, Arc<Channel>) {
        let bits: Vec<bool> = CTL0.iter().copied().cycle().take(n * 10).collect();
        let data = Capture::from_samples(
            1,
            bits.iter()
                .enumerate()
                .map(|(i, b)| Sample::new(i as i64 * 2, 2, *b))
                .collect(),
        );
        let mut clk = vec![Sample::new(0, 1, false)];
        for i in 0..bits.len() {
            clk.push(Sample::new(i as i64 * 2 + 1, 2, i % 2 == 0));
        }
        (
            Arc::new(Channel::digital("lane0", data)),
            Arc::new(Channel::digital("clk", Capture::from_samples(1, clk))),
        )
    }

    #[test]
    fn unknown_protocol() {
        assert!(matches!(
            Filter::for_protocol("usb"),
            Err(ScopeError::UnknownProtocol(p)) if p == "usb"
        ));
    }

    #[test]
    fn bind_rejects_invalid_sources() {
        let mut filter = Filter::for_protocol("gmii").unwrap();
        let scalar = Arc::new(Channel::new("rxdv", ChannelKind::Digital, 1));
        let bus = Arc::new(Channel::new("rxd", ChannelKind::Digital, 8));

        assert!(matches!(
            filter.bind(0, scalar.clone()),
            Err(ScopeError::IncompatibleChannel { .. })
        ));
        assert!(matches!(
            filter.bind(4, scalar.clone()),
            Err(ScopeError::SlotOutOfRange { slot: 4, count: 4 })
        ));
        filter.bind(0, bus.clone()).unwrap();
        filter.bind(2, scalar).unwrap();
        assert_eq!(filter.display_name(), "GMII(rxd)");
        assert_eq!(filter.unbind(0).map(|c| c.name.clone()), Some("rxd".to_owned()));
        assert!(filter.unbind(0).is_none());
        assert!(filter.unbind(9).is_none());
    }

    #[test]
    fn missing_input_publishes_no_data() {
        let (data, _) = tmds_lane(4);
        let mut filter = Filter::for_protocol("tmds").unwrap();
        filter.bind(0, data).unwrap();
        filter.refresh();
        assert!(filter.output().is_none());
    }

    #[test]
    fn refresh_replaces_output() {
        let (data, clk) = tmds_lane(4);
        let mut filter = Filter::for_protocol("tmds").unwrap();
        filter.bind(0, data).unwrap();
        filter.bind(1, clk).unwrap();
        let reader = filter.output_slot();
        assert!(reader.get().is_none());

        filter.refresh();
        let first = reader.get().unwrap();
        let symbols = first.as_tmds().unwrap();
        assert_eq!(symbols.len(), 4);
        assert!(symbols.samples.iter().all(|s| s.value == TmdsSymbol::Control(0)));

        let (longer, longer_clk) = tmds_lane(6);
        filter.bind(0, longer).unwrap();
        filter.bind(1, longer_clk).unwrap();
        filter.refresh();

        // the old output is untouched and the slot holds a new one
        assert_eq!(first.len(), 4);
        assert_eq!(reader.get().unwrap().len(), 6);
        assert_eq!(filter.output().unwrap().len(), 6);

        filter.unbind(1);
        filter.refresh();
        assert!(reader.get().is_none());
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn parameters_are_checked() {
        let mut filter = Filter::for_protocol("tmds").unwrap();
        assert!(filter.needs_config());
        filter.set_parameter(LANE_PARAMETER, 2).unwrap();
        assert_eq!(filter.parameters()[0].value, 2);
        assert!(matches!(
            filter.set_parameter(LANE_PARAMETER, 7),
            Err(ScopeError::ParameterOutOfRange { value: 7, max: 2, .. })
        ));
        assert!(matches!(
            filter.set_parameter("Bit rate", 1),
            Err(ScopeError::UnknownParameter(_))
        ));

        let mut gmii = Filter::for_protocol("gmii").unwrap();
        assert!(!gmii.needs_config());
        assert!(gmii.parameters().is_empty());
        assert!(gmii.set_parameter(LANE_PARAMETER, 0).is_err());
    }
}
