//! Explicit black/red color separation.
//!
//! The conversion pipeline drives both planes from one threshold decision
//! (see [`crate::ConvertOptions::red`]). When the source actually contains
//! red content, use [`separate_rgba`] to build the two planes and hand them
//! to [`crate::RasterEncoder::add_raster_data`] directly.

use image::RgbaImage;

/// Classify every pixel as red, black or blank and pack two MSB-first
/// bit-planes of `device_width` pixels per row.
///
/// `offset_x` positions the image within the head; pixels shifted outside
/// `[0, device_width)` are dropped. `device_width` must be a multiple of 8,
/// as every device pixel width is.
pub fn separate_rgba(
    image: &RgbaImage,
    device_width: u32,
    offset_x: u32,
) -> (Vec<u8>, Vec<u8>) {
    let row_len = (device_width / 8) as usize;
    let plane_len = row_len * image.height() as usize;
    let mut black = vec![0u8; plane_len];
    let mut red = vec![0u8; plane_len];

    for (x, y, px) in image.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        if a < 128 {
            continue;
        }
        let dev_x = x + offset_x;
        if dev_x >= device_width {
            continue;
        }
        let pixel_idx = y as usize * device_width as usize + dev_x as usize;
        let bit = 1 << (7 - pixel_idx % 8);
        if is_red(r, g, b) {
            red[pixel_idx / 8] |= bit;
        } else if is_black(r, g, b) {
            black[pixel_idx / 8] |= bit;
        }
    }

    (black, red)
}

fn is_red(r: u8, g: u8, b: u8) -> bool {
    r > 200 && g < 100 && b < 100
}

fn is_black(r: u8, g: u8, b: u8) -> bool {
    let brightness = ((r as u32 + g as u32 + b as u32) / 3) as u8;
    brightness < 128 && !is_red(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_classification() {
        let mut image = RgbaImage::new(8, 1);
        image.put_pixel(0, 0, Rgba([0, 0, 0, 255])); // black
        image.put_pixel(1, 0, Rgba([255, 0, 0, 255])); // red
        image.put_pixel(2, 0, Rgba([255, 255, 255, 255])); // white
        image.put_pixel(3, 0, Rgba([0, 0, 0, 10])); // transparent
        image.put_pixel(4, 0, Rgba([220, 90, 50, 255])); // still red
        image.put_pixel(5, 0, Rgba([100, 100, 100, 255])); // dark gray

        let (black, red) = separate_rgba(&image, 8, 0);
        assert_eq!(black, vec![0b1000_0100]);
        assert_eq!(red, vec![0b0101_0000]);
    }

    #[test]
    fn test_offset_and_clipping() {
        let mut image = RgbaImage::new(2, 2);
        image.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        image.put_pixel(1, 1, Rgba([255, 0, 0, 255]));

        let (black, red) = separate_rgba(&image, 16, 14);
        assert_eq!(black.len(), 4);
        // Black pixel lands at column 14; red pixel at 15 on row 1.
        assert_eq!(black, vec![0x00, 0x02, 0x00, 0x00]);
        assert_eq!(red, vec![0x00, 0x00, 0x00, 0x01]);

        // Shift further: both pixels fall off the head.
        let (black, red) = separate_rgba(&image, 16, 16);
        assert!(black.iter().all(|&b| b == 0));
        assert!(red.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_planes_are_disjoint() {
        let mut image = RgbaImage::new(16, 4);
        for (x, y, px) in image.enumerate_pixels_mut() {
            *px = if (x + y) % 3 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 0, 255])
            };
        }
        let (black, red) = separate_rgba(&image, 16, 0);
        for (b, r) in black.iter().zip(&red) {
            assert_eq!(b & r, 0);
        }
    }
}
