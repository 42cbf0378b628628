use plotters::style::RGBColor;

/// Magma sampled at nine evenly spaced stops.
const MAGMA: [(u8, u8, u8); 9] = [
    (0, 0, 4),
    (28, 16, 68),
    (79, 18, 123),
    (129, 37, 129),
    (181, 54, 122),
    (229, 80, 100),
    (251, 135, 97),
    (254, 194, 135),
    (252, 253, 191),
];

/// Color for `t` in [0, 1]; values outside are clamped.
pub fn magma(t: f32) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (MAGMA.len() - 1) as f32;
    let lo = (scaled.floor() as usize).min(MAGMA.len() - 2);
    let frac = scaled - lo as f32;
    let (a, b) = (MAGMA[lo], MAGMA[lo + 1]);
    let lerp = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * frac).round() as u8;
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

/// Map `value` from `[min, max]` onto the colormap.
pub fn magma_scaled(value: f32, min: f32, max: f32) -> RGBColor {
    let span = max - min;
    if span <= f32::EPSILON {
        return magma(0.0);
    }
    magma((value - min) / span)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_match_stops() {
        assert_eq!(magma(0.0), RGBColor(0, 0, 4));
        assert_eq!(magma(1.0), RGBColor(252, 253, 191));
        assert_eq!(magma(0.5), RGBColor(181, 54, 122));
    }

    #[test]
    fn out_of_range_is_clamped() {
        assert_eq!(magma(-3.0), magma(0.0));
        assert_eq!(magma(7.0), magma(1.0));
        assert_eq!(magma(f32::NAN), magma(0.0));
        assert_eq!(magma_scaled(5.0, 5.0, 5.0), magma(0.0));
        assert_eq!(magma_scaled(-40.0, -80.0, 0.0), magma(0.5));
    }
}
