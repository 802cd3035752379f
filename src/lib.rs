//! Raster conversion and protocol encoding for Brother P-Touch printers
//!
//! This crate turns an arbitrary raster image into the exact byte stream a
//! Brother QL or PT series label printer expects: rotation, fit-to-label
//! resizing, grayscale reduction, optional local contrast enhancement and
//! tone remapping, halftoning, device-space positioning, bit packing and
//! the raster command sequence itself (with optional PackBits row
//! compression). Sending the finished buffer over USB or network is up to
//! the caller.
//!
//! # Example
//!
//! ```rust
//! use ptouch_raster::{convert_image, ConvertOptions, Label, Model, RasterEncoder};
//!
//! let model = Model::find("QL-800")?;
//! let label = Label::find("62")?;
//! let image = image::RgbaImage::from_pixel(696, 300, image::Rgba([255, 255, 255, 255]));
//!
//! let mut encoder = RasterEncoder::new(model);
//! let data = convert_image(&mut encoder, &image, label, &ConvertOptions::default())?;
//! // hand `data` to the transport
//! # assert!(!data.is_empty());
//! # Ok::<(), ptouch_raster::Error>(())
//! ```

pub mod clahe;
mod convert;
mod error;
mod label;
mod model;
pub mod packbits;
mod raster;
pub mod two_color;

pub use crate::{
    convert::{convert_image, ConvertOptions, Dither, Rotation},
    error::Error,
    label::{FormFactor, Label, ALL_LABELS},
    model::{Family, Model, ALL_MODELS},
    raster::{RasterEncoder, RasterSettings},
    two_color::separate_rgba,
};
