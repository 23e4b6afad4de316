#![allow(clippy::needless_range_loop)]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod capture;
pub mod decoder;
pub mod gmii;
pub mod protocol;
pub mod registry;
pub mod resample;
pub mod tmds;

mod bits;
