//! Image to command stream conversion.
//!
//! Pipeline sequence: rotation -> fit-to-label resize -> grayscale ->
//! CLAHE -> tone remap / gamma -> halftoning -> device positioning ->
//! bit-plane packing -> command emission.

use image::{imageops, imageops::FilterType, RgbaImage};
use log::debug;

use crate::{
    clahe,
    error::Error,
    label::Label,
    raster::RasterEncoder,
};

/// Rotation applied before resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// Rotate 90 degrees when it makes the source fit the media better:
    /// for die-cut labels only on an exact transposed match of the
    /// printable box, for continuous tape whenever the source is landscape.
    Auto,
    R0,
    R90,
    R180,
    R270,
}

/// Halftoning mode for the 1-bit reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dither {
    /// Single cutoff derived from the threshold percentage.
    None,
    /// 4-neighbor error diffusion.
    FloydSteinberg,
    /// 12-neighbor error diffusion.
    Stucki,
}

const FLOYD_STEINBERG: &[(i32, i32, f32)] = &[
    (1, 0, 7.0 / 16.0),
    (-1, 1, 3.0 / 16.0),
    (0, 1, 5.0 / 16.0),
    (1, 1, 1.0 / 16.0),
];

const STUCKI: &[(i32, i32, f32)] = &[
    (1, 0, 8.0 / 42.0),
    (2, 0, 4.0 / 42.0),
    (-2, 1, 2.0 / 42.0),
    (-1, 1, 4.0 / 42.0),
    (0, 1, 8.0 / 42.0),
    (1, 1, 4.0 / 42.0),
    (2, 1, 2.0 / 42.0),
    (-2, 2, 1.0 / 42.0),
    (-1, 2, 2.0 / 42.0),
    (0, 2, 4.0 / 42.0),
    (1, 2, 2.0 / 42.0),
    (2, 2, 1.0 / 42.0),
];

/// Conversion options with the same defaults as the reference driver.
///
/// Built in the consuming builder style:
///
/// ```
/// use ptouch_raster::{ConvertOptions, Dither};
///
/// let options = ConvertOptions::default()
///     .dither(Dither::FloydSteinberg)
///     .compress(true)
///     .threshold(60);
/// ```
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    cut: bool,
    dither: Dither,
    compress: bool,
    red: bool,
    rotate: Rotation,
    dpi_600: bool,
    hq: bool,
    /// 0..=100; the black cutoff is `(100 - threshold) / 100 * 255`.
    threshold: u8,
    min_visible: u8,
    max_visible: u8,
    gamma: f32,
    clahe_alpha: f32,
    clahe_limit: f32,
    clahe_tiles: usize,
    manual_offset: i32,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            cut: true,
            dither: Dither::None,
            compress: false,
            red: false,
            rotate: Rotation::Auto,
            dpi_600: false,
            hq: true,
            threshold: 70,
            min_visible: 0,
            max_visible: 255,
            gamma: 1.0,
            clahe_alpha: 0.0,
            clahe_limit: 6.0,
            clahe_tiles: 6,
            manual_offset: 0,
        }
    }
}

impl ConvertOptions {
    pub fn cut(self, flag: bool) -> Self {
        ConvertOptions { cut: flag, ..self }
    }

    pub fn dither(self, dither: Dither) -> Self {
        ConvertOptions { dither, ..self }
    }

    pub fn compress(self, flag: bool) -> Self {
        ConvertOptions {
            compress: flag,
            ..self
        }
    }

    /// Request the second color plane. The pipeline applies the black
    /// threshold decision only; see [`crate::two_color`] for actual color
    /// separation.
    pub fn red(self, flag: bool) -> Self {
        ConvertOptions { red: flag, ..self }
    }

    pub fn rotate(self, rotate: Rotation) -> Self {
        ConvertOptions { rotate, ..self }
    }

    pub fn dpi_600(self, flag: bool) -> Self {
        ConvertOptions {
            dpi_600: flag,
            ..self
        }
    }

    pub fn high_quality(self, flag: bool) -> Self {
        ConvertOptions { hq: flag, ..self }
    }

    pub fn threshold(self, percent: u8) -> Self {
        ConvertOptions {
            threshold: percent.min(100),
            ..self
        }
    }

    /// Remap the full tone range into `[min, max]`. The default `(0, 255)`
    /// is a no-op.
    pub fn visible_range(self, min: u8, max: u8) -> Self {
        ConvertOptions {
            min_visible: min,
            max_visible: max,
            ..self
        }
    }

    /// Gamma correction; `1.0` is a no-op.
    pub fn gamma(self, gamma: f32) -> Self {
        ConvertOptions { gamma, ..self }
    }

    /// Local contrast enhancement, blended in with `alpha` (0 disables).
    pub fn clahe(self, alpha: f32, limit: f32, tiles: usize) -> Self {
        ConvertOptions {
            clahe_alpha: alpha,
            clahe_limit: limit,
            clahe_tiles: tiles,
            ..self
        }
    }

    /// Manual shift in dots, positive moves the print toward the left tape
    /// edge.
    pub fn manual_offset(self, dots: i32) -> Self {
        ConvertOptions {
            manual_offset: dots,
            ..self
        }
    }
}

/// Convert a raster image into the finished command stream for one label.
///
/// The encoder is reset first, so a single encoder can be reused across
/// jobs. The returned buffer is ready for the transport layer.
pub fn convert_image(
    qlr: &mut RasterEncoder,
    image: &RgbaImage,
    label: &Label,
    options: &ConvertOptions,
) -> Result<Vec<u8>, Error> {
    qlr.clear();
    qlr.add_invalidate();
    qlr.add_initialize();
    qlr.add_status_request();

    // 1. Rotation
    let degrees = match options.rotate {
        Rotation::R0 => 0,
        Rotation::R90 => 90,
        Rotation::R180 => 180,
        Rotation::R270 => 270,
        Rotation::Auto => {
            if label.form_factor.is_die_cut() {
                if image.width() == label.dots_printable[1]
                    && image.height() == label.dots_printable[0]
                {
                    90
                } else {
                    0
                }
            } else if image.width() > image.height() {
                // Landscape sources fill continuous tape better sideways.
                90
            } else {
                0
            }
        }
    };
    let rotated = match degrees {
        90 => imageops::rotate90(image),
        180 => imageops::rotate180(image),
        270 => imageops::rotate270(image),
        _ => image.clone(),
    };
    debug!("rotation {} deg, source {:?}", degrees, rotated.dimensions());

    // 2. Fit-to-label resize
    let mut target_w = label.dots_printable[0];
    let mut target_h = label.dots_printable[1];
    if label.form_factor.is_die_cut() {
        let ratio = rotated.width() as f64 / rotated.height() as f64;
        let target_ratio = target_w as f64 / target_h as f64;
        if ratio > target_ratio {
            target_h = (target_w as f64 / ratio).round() as u32;
        } else {
            target_w = (target_h as f64 * ratio).round() as u32;
        }
    } else {
        target_h = (target_w as f64 / rotated.width() as f64 * rotated.height() as f64).round()
            as u32;
    }
    let target_w = target_w.max(1);
    let target_h = target_h.max(1);
    let resized = imageops::resize(&rotated, target_w, target_h, FilterType::Triangle);
    debug!("resized to {}x{}", target_w, target_h);

    // 3. Grayscale, transparent pixels become white
    let mut gray = vec![0.0f32; (target_w * target_h) as usize];
    for (i, px) in resized.pixels().enumerate() {
        let [r, g, b, a] = px.0;
        gray[i] = if a < 128 {
            255.0
        } else {
            // Composite residual transparency over a white background.
            let alpha = a as f32 / 255.0;
            let r = r as f32 * alpha + 255.0 * (1.0 - alpha);
            let g = g as f32 * alpha + 255.0 * (1.0 - alpha);
            let b = b as f32 * alpha + 255.0 * (1.0 - alpha);
            0.299 * r + 0.587 * g + 0.114 * b
        };
    }

    // 4. Local contrast enhancement, blended with the original
    if options.clahe_alpha > 0.0 {
        let enhanced = clahe::enhance(
            &gray,
            target_w as usize,
            target_h as usize,
            options.clahe_limit,
            options.clahe_tiles,
            options.clahe_tiles,
        );
        let alpha = options.clahe_alpha;
        for (v, e) in gray.iter_mut().zip(enhanced) {
            *v = (1.0 - alpha) * *v + alpha * e;
        }
    }

    // 5. Tone remap and gamma
    let needs_remap = options.min_visible != 0 || options.max_visible != 255;
    let needs_gamma = options.gamma != 1.0;
    if needs_remap || needs_gamma {
        let range = options.max_visible as f32 - options.min_visible as f32;
        for v in gray.iter_mut() {
            let mut val = *v;
            if needs_remap {
                val = options.min_visible as f32 + val / 255.0 * range;
            }
            if needs_gamma {
                val = (val / 255.0).powf(options.gamma) * 255.0;
            }
            *v = val.max(0.0).min(255.0);
        }
    }

    // 7. Device-space positioning
    let device_width = qlr.pixel_width();
    let tape_width = label.dots_total[0];
    let printable_width = label.dots_printable[0];
    let tape_offset_in_head = (device_width as i64 - tape_width as i64).div_euclid(2);
    let printable_offset_in_tape =
        tape_width as i64 - printable_width as i64 - label.offset_r as i64;
    let mut offset_x =
        tape_offset_in_head + printable_offset_in_tape + qlr.model().additional_offset_r as i64;
    if target_w < printable_width {
        offset_x += ((printable_width - target_w) / 2) as i64;
    }
    offset_x += options.manual_offset as i64;
    let offset_x = offset_x.max(0);
    debug!("device width {}, print offset {}", device_width, offset_x);

    // 6. + 8. Halftoning into the black bit-plane
    let row_len = (device_width / 8) as usize;
    let plane_len = row_len * target_h as usize;
    let mut black = vec![0u8; plane_len];
    // Second plane is emitted on request; the reference driver drives it
    // from the same threshold decision and leaves it empty here.
    let red = if options.red {
        Some(vec![0u8; plane_len])
    } else {
        None
    };

    let set_black = |x: u32, y: u32, plane: &mut [u8]| {
        let dev_x = x as i64 + offset_x;
        if dev_x >= 0 && dev_x < device_width as i64 {
            let pixel_idx = y as usize * device_width as usize + dev_x as usize;
            plane[pixel_idx / 8] |= 1 << (7 - pixel_idx % 8);
        }
    };

    match options.dither {
        Dither::None => {
            let cutoff = (100 - options.threshold) as f32 / 100.0 * 255.0;
            for y in 0..target_h {
                for x in 0..target_w {
                    if gray[(y * target_w + x) as usize] < cutoff {
                        set_black(x, y, &mut black);
                    }
                }
            }
        }
        Dither::FloydSteinberg | Dither::Stucki => {
            let kernel = if options.dither == Dither::Stucki {
                STUCKI
            } else {
                FLOYD_STEINBERG
            };
            let mut data = gray.clone();
            for y in 0..target_h as i32 {
                for x in 0..target_w as i32 {
                    let idx = (y * target_w as i32 + x) as usize;
                    let old = data[idx];
                    let new = if old < 128.0 { 0.0 } else { 255.0 };
                    data[idx] = new;
                    let error = old - new;

                    if new == 0.0 {
                        set_black(x as u32, y as u32, &mut black);
                    }

                    for &(dx, dy, weight) in kernel {
                        let nx = x + dx;
                        let ny = y + dy;
                        // Error falling outside the image is dropped.
                        if nx >= 0 && nx < target_w as i32 && ny >= 0 && ny < target_h as i32 {
                            data[(ny * target_w as i32 + nx) as usize] += error * weight;
                        }
                    }
                }
            }
        }
    }

    // 9. Command emission
    qlr.set_quality(options.hq);
    use crate::label::FormFactor;
    match label.form_factor {
        FormFactor::DieCut | FormFactor::RoundDieCut => {
            qlr.set_media_type(0x0B);
            qlr.set_media_width(label.tape_size[0]);
            qlr.set_media_length(label.tape_size[1]);
        }
        FormFactor::Continuous => {
            qlr.set_media_type(0x0A);
            qlr.set_media_width(label.tape_size[0]);
            qlr.set_media_length(0);
        }
        FormFactor::PtContinuous => {
            qlr.set_media_type(0x00);
            qlr.set_media_width(label.tape_size[0]);
            qlr.set_media_length(0);
        }
    }
    qlr.add_media_and_quality(target_h);
    if options.cut {
        qlr.add_autocut(true);
        qlr.add_cut_every(1);
    }
    qlr.set_dpi_600(options.dpi_600);
    qlr.set_cut_at_end(options.cut);
    qlr.set_two_color(options.red);
    qlr.add_expanded_mode();
    qlr.add_margins(label.feed_margin);
    qlr.add_compression(options.compress);
    qlr.add_raster_data(&black, red.as_deref(), device_width, target_h)?;
    qlr.add_print(true);

    Ok(qlr.take())
}
