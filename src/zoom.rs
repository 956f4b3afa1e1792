// ============================================================================
// ZOOM CONTROLLER — discrete non-linear zoom stepping + fit-to-view
// ============================================================================

/// UI bounds for the zoom slider. Stepping itself is unbounded.
pub const ZOOM_MIN: f64 = 0.0125;
pub const ZOOM_MAX: f64 = 50.0;

/// Advance the zoom level by one scroll tick.
///
/// The step size shrinks with the zoom level so small zooms stay precise:
/// ±0.5 at >= 2x, ±0.25 at >= 1x, ±0.125 at >= 0.125x, and a sqrt(2) factor
/// below that. The result is then snapped to the nearest "nice" stop
/// (half-integers when zoomed in, eighths between 0.25x and 1x) so repeated
/// scrolling lands on stable human-friendly values.
pub fn step(zl: f64, increase: bool) -> f64 {
    let mut zl = zl;
    if increase {
        if zl >= 2.0 {
            zl += 0.5;
        } else if zl >= 1.0 {
            zl += 0.25;
        } else if zl >= 0.125 {
            zl += 0.125;
        } else {
            zl *= 2.0_f64.sqrt();
        }
    } else if zl <= 0.125 {
        zl /= 2.0_f64.sqrt();
    } else if zl <= 1.0 {
        zl -= 0.125;
    } else if zl <= 2.0 {
        zl -= 0.25;
    } else {
        zl -= 0.5;
    }

    snap(zl)
}

/// Snap a zoom level to the nearest "nice" value if it is close enough.
/// Idempotent: snapping an already-snapped value returns it unchanged.
pub fn snap(zl: f64) -> f64 {
    if zl >= 1.0 {
        let nearest_half = (zl * 2.0).round() * 0.5;
        if (nearest_half - zl).abs() <= (0.1 * zl).min(0.25) {
            return nearest_half;
        }
    } else if zl > 0.25 {
        let nearest_eighth = (zl * 8.0).round() * 0.125;
        if (nearest_eighth - zl).abs() <= 0.05 {
            return nearest_eighth;
        }
    }
    zl
}

/// Zoom and pan that exactly fit a texture into the given view area
/// (window minus sidebar, in pixels).
///
/// Cubemaps are shown as a cross lying on its side, so their footprint is
/// 4 faces wide and 3 high. The axis with slack is centered via
/// floor-division; the other gets a zero offset.
///
/// Returns `(zoom, trans_x, trans_y)`.
pub fn fit_to_view(
    view_w: f64,
    view_h: f64,
    tex_w: f32,
    tex_h: f32,
    is_cube: bool,
) -> (f64, f64, f64) {
    let mut tw = tex_w as f64;
    let mut th = tex_h as f64;
    if is_cube {
        tw *= 4.0;
        th *= 3.0;
    }
    let zw = view_w / tw;
    let zh = view_h / th;
    if zw < zh {
        (zw, 0.0, (0.5 * (view_h / zw - th)).floor())
    } else {
        let tx = if is_cube {
            0.0
        } else {
            (0.5 * (view_w / zh - tw)).floor()
        };
        (zh, tx, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_is_monotonic() {
        let mut zl = 0.02;
        while zl < 40.0 {
            let up = step(zl, true);
            assert!(up > zl, "step up from {zl} gave {up}");
            let down = step(up, false);
            assert!(down < up, "step down from {up} gave {down}");
            zl = up;
        }
    }

    #[test]
    fn step_sizes_per_range() {
        assert_eq!(step(4.0, true), 4.5);
        assert_eq!(step(4.0, false), 3.5);
        assert_eq!(step(1.0, true), 1.25);
        assert_eq!(step(0.5, true), 0.625);
        assert_eq!(step(0.5, false), 0.375);
        // below 0.125 the step is multiplicative
        assert!((step(0.1, true) - 0.1 * 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn snap_is_idempotent() {
        for &zl in &[0.01, 0.3, 0.517, 0.875, 1.0, 1.48, 2.6, 10.2, 33.0] {
            let once = snap(zl);
            assert_eq!(snap(once), once, "snap not idempotent at {zl}");
        }
    }

    #[test]
    fn snap_to_half_integers_when_zoomed_in() {
        assert_eq!(snap(1.52), 1.5);
        assert_eq!(snap(3.1), 3.0);
        // 1.37 is within the 0.1*z tolerance of 1.5
        assert_eq!(snap(1.37), 1.5);
        // too far from a half-integer: left alone
        assert_eq!(snap(1.3), 1.3);
    }

    #[test]
    fn snap_to_eighths_between_quarter_and_one() {
        assert_eq!(snap(0.63), 0.625);
        assert_eq!(snap(0.3), 0.25); // exactly at the 0.05 tolerance
        assert_eq!(snap(0.31), 0.31); // just past it: left alone
    }

    #[test]
    fn fit_exact_when_aspect_matches() {
        let (zoom, tx, ty) = fit_to_view(1000.0, 500.0, 200.0, 100.0, false);
        assert_eq!(zoom, 5.0);
        assert_eq!((tx, ty), (0.0, 0.0));
    }

    #[test]
    fn fit_centers_the_slack_axis() {
        // 100x100 texture in 300x100 view: zoom 1, 100px slack centered
        let (zoom, tx, ty) = fit_to_view(300.0, 100.0, 100.0, 100.0, false);
        assert_eq!(zoom, 1.0);
        assert_eq!((tx, ty), (100.0, 0.0));

        // width-limited: vertical slack centered
        let (zoom, tx, ty) = fit_to_view(100.0, 300.0, 100.0, 100.0, false);
        assert_eq!(zoom, 1.0);
        assert_eq!((tx, ty), (0.0, 100.0));
    }

    #[test]
    fn fit_cubemap_uses_cross_footprint() {
        // 64x64 faces -> 256x192 cross fits a 256x192 view at zoom 1
        let (zoom, tx, ty) = fit_to_view(256.0, 192.0, 64.0, 64.0, true);
        assert_eq!(zoom, 1.0);
        assert_eq!((tx, ty), (0.0, 0.0));
    }
}
