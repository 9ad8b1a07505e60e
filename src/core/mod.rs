//! Core building blocks: display parameters, the processing stages and the
//! optional default session. These are the primitives consumed by the
//! high-level `api` module.
pub mod params;
pub mod processing;
pub mod session;
