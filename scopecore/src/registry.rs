use alloc::boxed::Box;

use crate::decoder::Decoder;
use crate::gmii::GmiiDecoder;
use crate::tmds::TmdsDecoder;

/// A decoder that can be created by name.
pub struct Protocol {
    /// Short identifier, e.g. for command line use
    pub id: &'static str,
    /// Same as `Decoder::protocol_name()`
    pub name: &'static str,
    constructor: fn() -> Box<dyn Decoder>,
}

impl Protocol {
    pub fn create(&self) -> Box<dyn Decoder> {
        (self.constructor)()
    }
}

fn new_gmii() -> Box<dyn Decoder> {
    Box::new(GmiiDecoder::new())
}

fn new_tmds() -> Box<dyn Decoder> {
    Box::new(TmdsDecoder::new())
}

pub static PROTOCOLS: [Protocol; 2] = [
    Protocol {
        id: "gmii",
        name: "Ethernet - GMII",
        constructor: new_gmii,
    },
    Protocol {
        id: "tmds",
        name: "8b/10b (TMDS)",
        constructor: new_tmds,
    },
];

/// Look up a protocol by id or full name, ignoring ASCII case.
pub fn find_protocol(key: &str) -> Option<&'static Protocol> {
    PROTOCOLS
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(key) || p.name.eq_ignore_ascii_case(key))
}

pub fn create_decoder(key: &str) -> Option<Box<dyn Decoder>> {
    find_protocol(key).map(Protocol::create)
}
