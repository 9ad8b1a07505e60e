//! Display processing stages, leaves first: range estimation (`zscale`),
//! the pixel `transform` chain, frame buffer `region` selection and byte
//! `quantize`-ation, composed per display call by `pipeline`.
pub mod pipeline;
pub mod quantize;
pub mod region;
pub mod transform;
pub mod zscale;
