//! Contrast limited adaptive histogram equalization.
//!
//! Operates on a grayscale grid of `f32` values in `[0, 255]`. The pipeline
//! blends the result with the original by a caller-supplied mix factor, so
//! the enhancement here is computed in full and never applied destructively.

/// Equalize local contrast over a `tiles_x` x `tiles_y` grid.
///
/// Per tile a 256-bin histogram is built, clipped at
/// `max(1, floor(clip_limit * tile_pixels / 256))` with the clipped mass
/// redistributed uniformly in a single pass, then turned into a cumulative
/// tone curve scaled to `[0, 255]`. Each output pixel bilinearly blends the
/// curves of the four nearest tile centers; edge tiles clamp, there is no
/// wraparound. The last tile row/column absorbs any remainder pixels.
pub fn enhance(
    src: &[f32],
    width: usize,
    height: usize,
    clip_limit: f32,
    tiles_x: usize,
    tiles_y: usize,
) -> Vec<f32> {
    // A tile must be at least one pixel wide in each direction.
    let tiles_x = tiles_x.max(1).min(width.max(1));
    let tiles_y = tiles_y.max(1).min(height.max(1));
    let tile_w = width / tiles_x;
    let tile_h = height / tiles_y;

    let mut curves = vec![0.0f32; tiles_x * tiles_y * 256];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let curve = &mut curves[(ty * tiles_x + tx) * 256..][..256];
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = if tx == tiles_x - 1 { width } else { x0 + tile_w };
            let y1 = if ty == tiles_y - 1 { height } else { y0 + tile_h };
            let n_pixels = ((x1 - x0) * (y1 - y0)) as f32;
            let clip = (clip_limit * n_pixels / 256.0).floor().max(1.0);

            for y in y0..y1 {
                for x in x0..x1 {
                    let v = src[y * width + x].max(0.0).min(255.0).floor() as usize;
                    curve[v] += 1.0;
                }
            }

            let mut clipped = 0.0f32;
            for bin in curve.iter_mut() {
                if *bin > clip {
                    clipped += *bin - clip;
                    *bin = clip;
                }
            }
            let redist = clipped / 256.0;
            for bin in curve.iter_mut() {
                *bin += redist;
            }

            let mut sum = 0.0f32;
            for bin in curve.iter_mut() {
                sum += *bin;
                *bin = sum / n_pixels * 255.0;
            }
        }
    }

    let lookup = |tx: i32, ty: i32, v: usize| -> f32 {
        let cx = tx.max(0).min(tiles_x as i32 - 1) as usize;
        let cy = ty.max(0).min(tiles_y as i32 - 1) as usize;
        curves[(cy * tiles_x + cx) * 256 + v]
    };

    let mut dst = vec![0.0f32; src.len()];
    for y in 0..height {
        for x in 0..width {
            // Position relative to tile centers.
            let tx = (x as f32 - tile_w as f32 / 2.0) / tile_w as f32;
            let ty = (y as f32 - tile_h as f32 / 2.0) / tile_h as f32;
            let tx1 = tx.floor() as i32;
            let ty1 = ty.floor() as i32;
            let fx = tx - tx1 as f32;
            let fy = ty - ty1 as f32;
            let v = src[y * width + x].max(0.0).min(255.0).floor() as usize;

            let c11 = lookup(tx1, ty1, v);
            let c21 = lookup(tx1 + 1, ty1, v);
            let c12 = lookup(tx1, ty1 + 1, v);
            let c22 = lookup(tx1 + 1, ty1 + 1, v);
            dst[y * width + x] =
                (1.0 - fy) * ((1.0 - fx) * c11 + fx * c21) + fy * ((1.0 - fx) * c12 + fx * c22);
        }
    }
    dst
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: usize, height: usize) -> Vec<f32> {
        (0..width * height)
            .map(|i| {
                let (x, y) = (i % width, i / width);
                ((x + y) * 255 / (width + height - 2)) as f32
            })
            .collect()
    }

    #[test]
    fn test_output_stays_in_range() {
        let src = gradient(40, 30);
        let dst = enhance(&src, 40, 30, 6.0, 6, 6);
        assert_eq!(dst.len(), src.len());
        for &v in &dst {
            assert!((0.0..=255.0).contains(&v), "out of range: {}", v);
        }
    }

    #[test]
    fn test_single_tile_is_global_equalization() {
        let src = gradient(16, 16);
        let dst = enhance(&src, 16, 16, 1000.0, 1, 1);

        // With one tile and a clip limit too high to trigger, the result is
        // the plain global histogram equalization curve.
        let mut hist = [0.0f32; 256];
        for &v in &src {
            hist[v.floor() as usize] += 1.0;
        }
        let n = src.len() as f32;
        let mut cdf = [0.0f32; 256];
        let mut sum = 0.0;
        for i in 0..256 {
            sum += hist[i];
            cdf[i] = sum / n * 255.0;
        }
        for (i, &v) in src.iter().enumerate() {
            let expected = cdf[v.floor() as usize];
            assert!((dst[i] - expected).abs() < 1e-3, "pixel {}", i);
        }
    }

    #[test]
    fn test_remainder_pixels_belong_to_last_tile() {
        // 17x13 with 4x4 tiles leaves remainders; must not panic and every
        // pixel must be mapped.
        let src = gradient(17, 13);
        let dst = enhance(&src, 17, 13, 4.0, 4, 4);
        assert_eq!(dst.len(), 17 * 13);
    }

    #[test]
    fn test_clip_limit_flattens_peaks() {
        // A nearly uniform image: without clipping, equalization would
        // stretch the tiny variations to the full range. A low clip limit
        // keeps the output close to mid-range instead.
        let mut src = vec![128.0f32; 256];
        src[0] = 120.0;
        src[255] = 136.0;
        let dst = enhance(&src, 16, 16, 1.0, 2, 2);
        for &v in &dst {
            assert!((v - 127.5).abs() < 40.0, "over-amplified: {}", v);
        }
    }

    #[test]
    fn test_more_tiles_than_pixels_is_clamped() {
        let src = vec![10.0f32; 4];
        let dst = enhance(&src, 2, 2, 6.0, 8, 8);
        assert_eq!(dst.len(), 4);
    }
}
