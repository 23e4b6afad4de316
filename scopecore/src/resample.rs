//! Sampling one signal at the transitions of another.
//!
//! All times are compared in absolute units (`offset * timescale`). Resampled output always
//! has a timescale of 1.

use alloc::vec::Vec;

use crate::capture::{Capture, DigitalCapture, Sample};

/// Which transitions of the reference signal produce a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeMode {
    /// Low to high only, as for a conventional clock
    Rising,
    /// Both directions, as for a double data rate clock
    Any,
}

/// Times at which the clock changes level in the selected direction.
///
/// The first clock sample has nothing to transition from and is never an edge.
pub fn clock_edges(clock: &DigitalCapture, mode: EdgeMode) -> Vec<i64> {
    let mut edges = Vec::new();
    for i in 1..clock.samples.len() {
        let prev = clock.samples[i - 1].value;
        let cur = clock.samples[i].value;
        let selected = match mode {
            EdgeMode::Rising => cur && !prev,
            EdgeMode::Any => cur != prev,
        };
        if selected {
            edges.push(clock.time_of(i));
        }
    }
    edges
}

/// Sample `data` at every selected transition of `clock`.
///
/// Each output sample carries the value of the most recent data sample starting at or before
/// the edge, offset at the edge time. It lasts until the next output sample, or for the last
/// one until the end of the clock capture. Edges before the first data sample are skipped.
pub fn sample_on_edges<T: Clone>(
    data: &Capture<T>,
    clock: &DigitalCapture,
    mode: EdgeMode,
) -> Vec<Sample<T>> {
    let edges = clock_edges(clock, mode);
    let mut out: Vec<Sample<T>> = Vec::with_capacity(edges.len());
    if data.is_empty() {
        return out;
    }

    let mut ndata = 0;
    for t in edges {
        while ndata + 1 < data.samples.len() && data.time_of(ndata + 1) <= t {
            ndata += 1;
        }
        if data.time_of(ndata) > t {
            continue;
        }
        out.push(Sample::new(t, 0, data.samples[ndata].value.clone()));
    }

    let clock_end = clock.end_time();
    for i in 0..out.len() {
        let end = match out.get(i + 1) {
            Some(next) => next.offset,
            None => clock_end.max(out[i].offset),
        };
        out[i].duration = end - out[i].offset;
    }
    out
}

pub fn sample_on_rising_edges<T: Clone>(
    data: &Capture<T>,
    clock: &DigitalCapture,
) -> Vec<Sample<T>> {
    sample_on_edges(data, clock, EdgeMode::Rising)
}

pub fn sample_on_any_edges<T: Clone>(
    data: &Capture<T>,
    clock: &DigitalCapture,
) -> Vec<Sample<T>> {
    sample_on_edges(data, clock, EdgeMode::Any)
}

/// Drop leading samples so the stream is `len` long.
///
/// Streams resampled on the same clock differ only in how many early edges were skipped
/// because their data had not started yet, so trimming each to the shortest length leaves
/// equal indices on the same edge.
pub fn keep_last<T>(samples: &mut Vec<Sample<T>>, len: usize) {
    let excess = samples.len().saturating_sub(len);
    samples.drain(..excess);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Clock low at even ticks and high at odd ticks, giving rising edges at 1, 3, 5...
    fn clock(cycles: usize) -> DigitalCapture {
        let samples = (0..cycles * 2)
            .map(|i| Sample::new(i as i64, 1, i % 2 == 1))
            .collect();
        Capture::from_samples(1, samples)
    }

    fn data(values: &[(i64, u8)]) -> Capture<u8> {
        let mut samples: Vec<Sample<u8>> = values
            .iter()
            .map(|(t, v)| Sample::new(*t, 0, *v))
            .collect();
        for i in 0..samples.len() {
            let end = samples.get(i + 1).map(|s| s.offset).unwrap_or(samples[i].offset + 1);
            samples[i].duration = end - samples[i].offset;
        }
        Capture::from_samples(1, samples)
    }

    #[test]
    fn rising_and_any_edges() {
        let clk = clock(3);
        assert_eq!(clock_edges(&clk, EdgeMode::Rising), vec![1, 3, 5]);
        assert_eq!(clock_edges(&clk, EdgeMode::Any), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn value_held_between_data_transitions() {
        let clk = clock(4);
        let d = data(&[(0, 10), (3, 20), (4, 30)]);
        let out = sample_on_rising_edges(&d, &clk);
        let values: Vec<u8> = out.iter().map(|s| s.value).collect();
        let offsets: Vec<i64> = out.iter().map(|s| s.offset).collect();
        // data changing exactly on the edge is already in effect
        assert_eq!(values, vec![10, 20, 30, 30]);
        assert_eq!(offsets, vec![1, 3, 5, 7]);
    }

    #[test]
    fn durations_reach_next_edge_and_clock_end() {
        let clk = clock(3);
        let d = data(&[(0, 1)]);
        let out = sample_on_rising_edges(&d, &clk);
        let durations: Vec<i64> = out.iter().map(|s| s.duration).collect();
        assert_eq!(durations, vec![2, 2, 1]);
    }

    #[test]
    fn edges_before_data_are_skipped() {
        let clk = clock(4);
        let d = data(&[(4, 7), (6, 8)]);
        let out = sample_on_rising_edges(&d, &clk);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].offset, 5);
        assert_eq!(out[0].value, 7);
        assert_eq!(out[1].offset, 7);
        assert_eq!(out[1].value, 8);
    }

    #[test]
    fn empty_inputs_give_empty_output() {
        let clk = clock(4);
        let empty: Capture<u8> = Capture::new(1);
        assert!(sample_on_rising_edges(&empty, &clk).is_empty());

        let d = data(&[(0, 1)]);
        let no_clock: DigitalCapture = Capture::new(1);
        assert!(sample_on_any_edges(&d, &no_clock).is_empty());
    }

    #[test]
    fn timescales_are_honoured() {
        // clock ticks of 10 units, data ticks of 1 unit
        let mut clk = clock(2);
        clk.timescale = 10;
        let d = data(&[(0, 1), (15, 2), (25, 3)]);
        let out = sample_on_any_edges(&d, &clk);
        let pairs: Vec<(i64, u8)> = out.iter().map(|s| (s.offset, s.value)).collect();
        assert_eq!(pairs, vec![(10, 1), (20, 2), (30, 3)]);
    }

    #[test]
    fn output_never_exceeds_edge_count() {
        for cycles in 0..8 {
            let clk = clock(cycles);
            let d = data(&[(2, 1), (5, 0), (9, 1)]);
            for mode in [EdgeMode::Rising, EdgeMode::Any] {
                let edges = clock_edges(&clk, mode);
                let out = sample_on_edges(&d, &clk, mode);
                assert!(out.len() <= edges.len());
                for s in &out {
                    let latest = d
                        .samples
                        .iter()
                        .filter(|x| x.offset <= s.offset)
                        .last()
                        .unwrap();
                    assert_eq!(s.value, latest.value);
                }
            }
        }
    }

    #[test]
    fn keep_last_trims_front() {
        let mut a = vec![Sample::new(1, 2, 0u8), Sample::new(3, 2, 1), Sample::new(5, 2, 2)];
        keep_last(&mut a, 2);
        assert_eq!(a.iter().map(|s| s.offset).collect::<Vec<_>>(), vec![3, 5]);
        keep_last(&mut a, 5);
        assert_eq!(a.len(), 2);
    }
}
