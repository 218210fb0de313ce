//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Dimensions an image is encoded at after the optimize policy is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
    /// True when the target differs from the source and pixels get resampled.
    pub resized: bool,
}

/// Scale `original` to exactly `target_width`, preserving aspect ratio.
///
/// The height is rounded and never drops below one pixel, so very wide
/// panoramas still produce a valid image.
///
/// # Examples
/// ```
/// # use pressroom::imaging::calculations::scale_to_width;
/// assert_eq!(scale_to_width((3072, 2048), 1536), (1536, 1024));
/// assert_eq!(scale_to_width((200, 100), 300), (300, 150));
/// ```
pub fn scale_to_width(original: (u32, u32), target_width: u32) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    if orig_w == 0 {
        return (target_width, orig_h.max(1));
    }
    let ratio = target_width as f64 / orig_w as f64;
    let height = (orig_h as f64 * ratio).round().max(1.0) as u32;
    (target_width, height)
}

/// Decide the encode size for an article image.
///
/// Images at or below `max_width` keep their dimensions and are only
/// re-encoded. Wider images are downscaled to `max_width`.
pub fn optimized_size(original: (u32, u32), max_width: u32) -> TargetSize {
    let (orig_w, orig_h) = original;
    if orig_w <= max_width {
        return TargetSize {
            width: orig_w,
            height: orig_h,
            resized: false,
        };
    }
    let (width, height) = scale_to_width(original, max_width);
    TargetSize {
        width,
        height,
        resized: true,
    }
}

/// Thumbnail size: always exactly `width` wide, upscaling small covers.
pub fn thumbnail_size(original: (u32, u32), width: u32) -> TargetSize {
    let (w, h) = scale_to_width(original, width);
    TargetSize {
        width: w,
        height: h,
        resized: (w, h) != original,
    }
}
