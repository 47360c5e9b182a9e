//! Media inspection adapters.

mod ffprobe;

pub use ffprobe::FfprobeDurationProbe;
