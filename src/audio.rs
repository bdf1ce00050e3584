//! Audio capture plumbing: the cpal input stream and the raw-spectrum
//! handoff shared with the render tick.

pub mod capture;
pub mod shared_spectrum;
