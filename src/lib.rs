//! Panel builder for GVC participation and CO2 emissions.
//!
//! The library holds the data pipeline and the read-only views the
//! dashboard draws from. The binaries (`gvc-dashboard`, `build-panel`,
//! `generate_sample`) are thin shells over it.

pub mod config;
pub mod data;
pub mod pipeline;
