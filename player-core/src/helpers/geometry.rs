// player-core/src/helpers/geometry.rs
//
// setWidthAndHeight() from spec §4.9: derives the display size for the
// video presenter window/texture from the source dimensions and the
// VideoConfig's fit rules.

use crate::config::VideoConfig;

/// `window_fit` mode 1: scale by the max dimensions first (fit by width),
/// then re-scale by the source ratio if that overflows the other axis.
/// Always preserves `src_w / src_h`.
fn fit_inside(src_w: i32, src_h: i32, max_w: i32, max_h: i32) -> (i32, i32) {
    if src_w <= 0 || src_h <= 0 {
        return (max_w.max(2), max_h.max(2));
    }
    let mut w = max_w;
    let mut h = (w as f64 * src_h as f64 / src_w as f64).round() as i32;
    if h > max_h {
        h = max_h;
        w = (h as f64 * src_w as f64 / src_h as f64).round() as i32;
    }
    (w.max(2), h.max(2))
}

/// Derive the on-screen size for a decoded frame of `(src_w, src_h)` under
/// `cfg`. Priority, per spec §4.9:
///   1. `keep_raw_ratio` — fit source inside `(max_width, max_height)`.
///   2. `auto_fit` — honor `sample_aspect_ratio` (width derived from
///      height x SAR) when both numerator and denominator are non-zero,
///      then clamp to the max dimensions.
///   3. Otherwise use the configured `(width, height)` (or source dims when
///      either is `-1`), clamped to the max dimensions.
///
/// ```
/// use player_core::config::VideoConfig;
/// use player_core::helpers::geometry::compute_display_size;
/// let mut cfg = VideoConfig::default();
/// cfg.max_width = 640;
/// cfg.max_height = 480;
/// cfg.keep_raw_ratio = true;
/// let (w, h) = compute_display_size(1920, 1080, &cfg);
/// assert_eq!((w, h), (640, 360));
/// ```
pub fn compute_display_size(src_w: i32, src_h: i32, cfg: &VideoConfig) -> (u32, u32) {
    let (w, h) = if cfg.keep_raw_ratio {
        fit_inside(src_w, src_h, cfg.max_width, cfg.max_height)
    } else if cfg.auto_fit {
        let (mut w, h) = if cfg.width > 0 && cfg.height > 0 {
            (cfg.width, cfg.height)
        } else {
            (src_w, src_h)
        };
        if cfg.sample_aspect_ratio.is_valid() {
            w = (h as f64 * cfg.sample_aspect_ratio.as_f64()).round() as i32;
        }
        if w > cfg.max_width || h > cfg.max_height {
            fit_inside(w, h, cfg.max_width, cfg.max_height)
        } else {
            (w.max(2), h.max(2))
        }
    } else {
        let (w, h) = if cfg.width > 0 && cfg.height > 0 {
            (cfg.width, cfg.height)
        } else {
            (src_w, src_h)
        };
        if w > cfg.max_width || h > cfg.max_height {
            fit_inside(w, h, cfg.max_width, cfg.max_height)
        } else {
            (w.max(2), h.max(2))
        }
    };
    (w as u32, h as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rational;

    #[test]
    fn keep_raw_ratio_fits_by_width_first() {
        let mut cfg = VideoConfig::default();
        cfg.max_width = 1280;
        cfg.max_height = 1280; // tall cap, width is the binding constraint
        cfg.keep_raw_ratio = true;
        let (w, h) = compute_display_size(1920, 1080, &cfg);
        assert_eq!(w, 1280);
        assert_eq!(h, 720);
    }

    #[test]
    fn keep_raw_ratio_falls_back_to_height_when_width_overflows() {
        let mut cfg = VideoConfig::default();
        cfg.max_width = 2000;
        cfg.max_height = 480;
        cfg.keep_raw_ratio = true;
        let (w, h) = compute_display_size(1920, 1080, &cfg);
        assert_eq!(h, 480);
        assert!(w <= 2000);
    }

    #[test]
    fn auto_fit_derives_width_from_sar() {
        let mut cfg = VideoConfig::default();
        cfg.keep_raw_ratio = false;
        cfg.auto_fit = true;
        cfg.width = -1;
        cfg.height = -1;
        cfg.max_width = 4000;
        cfg.max_height = 4000;
        cfg.sample_aspect_ratio = Rational::new(2, 1); // anamorphic 2:1 pixels
        let (w, h) = compute_display_size(960, 1080, &cfg);
        assert_eq!(h, 1080);
        assert_eq!(w, 2160); // 1080 * 2
    }

    #[test]
    fn neither_flag_uses_explicit_dims_clamped() {
        let mut cfg = VideoConfig::default();
        cfg.keep_raw_ratio = false;
        cfg.auto_fit = false;
        cfg.width = 3840;
        cfg.height = 2160;
        cfg.max_width = 1920;
        cfg.max_height = 1080;
        let (w, h) = compute_display_size(1920, 1080, &cfg);
        assert!(w <= 1920 && h <= 1080);
    }
}
