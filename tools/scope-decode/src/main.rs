use std::{error::Error, fmt::Display, path::PathBuf, sync::Arc};

use clap::Parser;
use log::info;
use scopeapp::{ScopeError, capture_file::CaptureFile, filter::Filter};
use scopecore::{
    capture::{Capture, CaptureData},
    registry::PROTOCOLS,
    tmds::LANE_PARAMETER,
};

#[derive(Parser)]
struct Args {
    #[arg(short = 'i', help = "Input capture file (JSON)")]
    input: Option<PathBuf>,
    #[arg(short = 'p', help = "Protocol to decode, e.g. gmii or tmds")]
    protocol: Option<String>,
    #[arg(short = 'c', help = "Channel to bind to each decoder input, in order")]
    channels: Vec<String>,
    #[arg(long, help = "TMDS lane number (0-2)")]
    lane: Option<i64>,
    #[arg(long, help = "List available protocols and their inputs")]
    list: bool,
}

fn print_samples<T: Display>(cap: &Capture<T>) {
    for s in &cap.samples {
        println!("{:>12} {:>8} {}", s.offset, s.duration, s.value);
    }
}

fn list_protocols() {
    for p in &PROTOCOLS {
        let decoder = p.create();
        println!("{:<6} {:<16} inputs: {}", p.id, p.name, decoder.input_names().join(", "));
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    if args.list {
        list_protocols();
        return Ok(());
    }
    let (Some(input), Some(protocol)) = (args.input, args.protocol) else {
        return Err("an input file (-i) and protocol (-p) are required".into());
    };

    let channels: Vec<Arc<_>> = CaptureFile::open(&input)?
        .into_channels()?
        .into_iter()
        .map(Arc::new)
        .collect();
    info!("loaded {} channels from {}", channels.len(), input.display());

    let mut filter = Filter::for_protocol(&protocol)?;
    if let Some(lane) = args.lane {
        filter.set_parameter(LANE_PARAMETER, lane)?;
    }
    for (slot, name) in args.channels.iter().enumerate() {
        let channel = channels
            .iter()
            .find(|c| c.name == *name)
            .ok_or_else(|| ScopeError::UnknownChannel(name.clone()))?;
        filter.bind(slot, channel.clone())?;
    }

    filter.refresh();
    let name = filter.display_name();
    let Some(output) = filter.output() else {
        println!("{name}: no data");
        return Ok(());
    };

    println!("{name}");
    match output.as_ref() {
        CaptureData::Tmds(cap) => print_samples(cap),
        CaptureData::Ethernet(cap) => print_samples(cap),
        CaptureData::Digital(cap) => print_samples(cap),
        CaptureData::Analog(cap) => print_samples(cap),
        CaptureData::DigitalBus(cap) => {
            for s in &cap.samples {
                println!("{:>12} {:>8} {:?}", s.offset, s.duration, s.value);
            }
        }
    }
    println!("\ntotal decoded: {}", output.len());

    Ok(())
}
