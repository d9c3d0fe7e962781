//! Pure calculation functions for image dimensions.

/// Thumbnail size for a `width`×`height` image: half on each axis, rounded down.
///
/// A one-pixel edge would halve to zero, which no encoder accepts, so each
/// axis is kept at a minimum of one pixel.
///
/// ```text
/// 800x600 → 400x300
/// 801x601 → 400x300
/// 1x9     → 1x4
/// ```
pub fn thumbnail_dimensions(width: u32, height: u32) -> (u32, u32) {
    ((width / 2).max(1), (height / 2).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_dimensions_halve_exactly() {
        assert_eq!(thumbnail_dimensions(800, 600), (400, 300));
    }

    #[test]
    fn odd_dimensions_round_down() {
        assert_eq!(thumbnail_dimensions(801, 601), (400, 300));
        assert_eq!(thumbnail_dimensions(3, 5), (1, 2));
    }

    #[test]
    fn single_pixel_edges_stay_visible() {
        assert_eq!(thumbnail_dimensions(1, 1), (1, 1));
        assert_eq!(thumbnail_dimensions(1, 9), (1, 4));
    }

    #[test]
    fn thumbnail_law_holds_across_sizes() {
        for w in 2..40 {
            for h in 2..40 {
                assert_eq!(thumbnail_dimensions(w, h), (w / 2, h / 2));
            }
        }
    }
}
