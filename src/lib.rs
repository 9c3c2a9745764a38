//!
//! # stocklens
//!
//! A camera code-scanning engine for storefront kiosks.
//!
//! Frames are pulled from a capture session, copied into an offscreen
//! raster, and handed to a decode routine; the first decoded code produces
//! a redirect to the storefront's scan page with the payload as a
//! percent-encoded query parameter. A manual-entry path covers kiosks with
//! no usable camera.
//!

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

pub mod api;
pub mod cameras;
pub mod config;
pub mod error;
pub mod nav;
#[cfg(feature = "qr")]
pub mod qr;
pub mod raster;
pub mod scan;

pub use error::Error;
