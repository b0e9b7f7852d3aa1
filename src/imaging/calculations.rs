//! Pure calculation functions for pipeline geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Share of the splash screen's shorter edge taken by the centered icon.
pub const SPLASH_ICON_RATIO: f64 = 0.8;

/// Resize target for the optimize pipeline.
///
/// A resize only happens when *both* bounds are positive. A single bound is
/// ignored rather than treated as "scale proportionally".
///
/// # Examples
/// ```
/// # use assetpress::imaging::resize_target;
/// assert_eq!(resize_target(800, 600), Some((800, 600)));
/// assert_eq!(resize_target(100, 0), None);
/// ```
pub fn resize_target(max_width: u32, max_height: u32) -> Option<(u32, u32)> {
    (max_width > 0 && max_height > 0).then_some((max_width, max_height))
}

/// Placement of the icon square on a splash screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplashLayout {
    /// Side length of the icon square.
    pub side: u32,
    /// Top-left corner of the square on the splash surface.
    pub x: i64,
    pub y: i64,
}

/// Center a square of `min(width, height) × 0.8` on a `width × height`
/// splash.
///
/// # Examples
/// ```
/// # use assetpress::imaging::{splash_layout, SplashLayout};
/// // 640x1136 portrait → 512px square, 64px from the sides
/// assert_eq!(splash_layout(640, 1136), SplashLayout { side: 512, x: 64, y: 312 });
/// ```
pub fn splash_layout(width: u32, height: u32) -> SplashLayout {
    let side = (width.min(height) as f64 * SPLASH_ICON_RATIO).floor() as u32;
    SplashLayout {
        side,
        x: (width as i64 - side as i64) / 2,
        y: (height as i64 - side as i64) / 2,
    }
}

/// Largest value in `sizes`, or `None` when empty.
pub fn largest(sizes: &[u32]) -> Option<u32> {
    sizes.iter().copied().max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_requires_both_bounds() {
        assert_eq!(resize_target(0, 0), None);
        assert_eq!(resize_target(100, 0), None);
        assert_eq!(resize_target(0, 100), None);
        assert_eq!(resize_target(100, 50), Some((100, 50)));
    }

    #[test]
    fn splash_square_is_80_percent_of_short_edge() {
        assert_eq!(splash_layout(1000, 2000).side, 800);
        assert_eq!(splash_layout(2000, 1000).side, 800);
    }

    #[test]
    fn splash_square_is_centered() {
        let l = splash_layout(1000, 2000);
        assert_eq!((l.x, l.y), (100, 600));
        let l = splash_layout(1242, 2688);
        // 1242 * 0.8 = 993.6 → 993
        assert_eq!(l.side, 993);
        assert_eq!((l.x, l.y), (124, 847));
    }

    #[test]
    fn splash_tiny_dimensions() {
        assert_eq!(splash_layout(1, 1), SplashLayout { side: 0, x: 0, y: 0 });
    }

    #[test]
    fn largest_of_set() {
        assert_eq!(largest(&[16, 48, 32]), Some(48));
        assert_eq!(largest(&[]), None);
    }
}
