//! Aspect-preserving downscale to a maximum dimension.
//!
//! The dimension math is a pure function so it can be tested without
//! allocating pixels.

use image::imageops::FilterType;

use super::decode::PixelBuffer;

/// Resampling filter for downscaling (bicubic Catmull-Rom).
pub const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// Compute output dimensions so the longer side is at most `max_dimension`.
///
/// Returns the input unchanged when both sides already fit (the bound is
/// inclusive). Otherwise the longer side becomes exactly `max_dimension` and
/// the shorter side is scaled and rounded, never below 1.
pub fn target_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width <= max_dimension && height <= max_dimension {
        return (width, height);
    }

    let scale = |short: u32, long: u32| -> u32 {
        let scaled = (f64::from(short) * f64::from(max_dimension) / f64::from(long)).round();
        (scaled as u32).clamp(1, max_dimension)
    };

    if width > height {
        (max_dimension, scale(height, width))
    } else {
        (scale(width, height), max_dimension)
    }
}

/// Downscale `pixels` to fit within `max_dimension`.
///
/// Never fails; an image that already fits is returned as-is.
pub fn resize(pixels: PixelBuffer, max_dimension: u32) -> PixelBuffer {
    let (width, height) = pixels.dimensions();
    let (new_width, new_height) = target_dimensions(width, height, max_dimension);
    if (new_width, new_height) == (width, height) {
        return pixels;
    }

    tracing::trace!("  Resize: {width}x{height} -> {new_width}x{new_height}");
    // target_dimensions never yields a zero side
    PixelBuffer {
        image: pixels
            .into_image()
            .resize_exact(new_width, new_height, RESIZE_FILTER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    fn ratio(w: u32, h: u32) -> f64 {
        f64::from(w) / f64::from(h)
    }

    #[test]
    fn test_small_image_unchanged() {
        assert_eq!(target_dimensions(640, 480, 1920), (640, 480));
        assert_eq!(target_dimensions(1, 1, 1920), (1, 1));
    }

    #[test]
    fn test_boundary_is_inclusive() {
        assert_eq!(target_dimensions(1920, 1920, 1920), (1920, 1920));
        assert_eq!(target_dimensions(1920, 1080, 1920), (1920, 1080));
    }

    #[test]
    fn test_landscape_scales_by_width() {
        assert_eq!(target_dimensions(4000, 3000, 1920), (1920, 1440));
        assert_eq!(target_dimensions(3840, 2160, 1920), (1920, 1080));
    }

    #[test]
    fn test_portrait_scales_by_height() {
        assert_eq!(target_dimensions(3000, 4000, 1920), (1440, 1920));
    }

    #[test]
    fn test_square_scales_to_max() {
        assert_eq!(target_dimensions(3000, 3000, 1920), (1920, 1920));
    }

    #[test]
    fn test_rounding_uses_nearest() {
        // 1000 * 1920 / 2999 = 640.21 -> 640
        assert_eq!(target_dimensions(2999, 1000, 1920), (1920, 640));
        // 1001 * 1920 / 3000 = 640.64 -> 641
        assert_eq!(target_dimensions(3000, 1001, 1920), (1920, 641));
    }

    #[test]
    fn test_extreme_aspect_clamps_to_one() {
        assert_eq!(target_dimensions(100_000, 10, 1920), (1920, 1));
        assert_eq!(target_dimensions(1, 50_000, 1920), (1, 1920));
    }

    #[test]
    fn test_aspect_ratio_preserved_within_tolerance() {
        for (w, h) in [(2500, 1700), (1921, 1080), (5000, 2813), (2048, 4096), (7777, 3333)] {
            let (nw, nh) = target_dimensions(w, h, 1920);
            assert_eq!(nw.max(nh), 1920, "{w}x{h}");
            assert!(
                (ratio(w, h) - ratio(nw, nh)).abs() <= 0.01,
                "{w}x{h} -> {nw}x{nh}"
            );
        }
    }

    #[test]
    fn test_resize_pixels() {
        let pixels = PixelBuffer::new(DynamicImage::new_rgb8(400, 200)).unwrap();
        let resized = resize(pixels, 100);
        assert_eq!(resized.dimensions(), (100, 50));
    }

    #[test]
    fn test_resize_noop_keeps_dimensions() {
        let pixels = PixelBuffer::new(DynamicImage::new_rgba8(64, 32)).unwrap();
        let resized = resize(pixels, 64);
        assert_eq!(resized.dimensions(), (64, 32));
    }
}
