use eframe::egui::Color32;
use palette::{IntoColor, LinSrgb, Mix, Srgb};

/// Number of discrete levels used when many points share a colour series.
pub const LUT_SIZE: usize = 256;

// ---------------------------------------------------------------------------
// Continuous colour maps
// ---------------------------------------------------------------------------

/// Sequential colour maps, sampled at evenly spaced anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMap {
    Plasma,
    Oranges,
    Blues,
}

const PLASMA: [[u8; 3]; 9] = [
    [13, 8, 135],
    [75, 3, 161],
    [125, 3, 168],
    [168, 34, 150],
    [203, 70, 121],
    [229, 107, 93],
    [248, 148, 65],
    [253, 195, 40],
    [240, 249, 33],
];

const ORANGES: [[u8; 3]; 9] = [
    [255, 245, 235],
    [254, 230, 206],
    [253, 208, 162],
    [253, 174, 107],
    [253, 141, 60],
    [241, 105, 19],
    [217, 72, 1],
    [166, 54, 3],
    [127, 39, 4],
];

const BLUES: [[u8; 3]; 9] = [
    [247, 251, 255],
    [222, 235, 247],
    [198, 219, 239],
    [158, 202, 225],
    [107, 174, 214],
    [66, 146, 198],
    [33, 113, 181],
    [8, 81, 156],
    [8, 48, 107],
];

fn to_linear([r, g, b]: [u8; 3]) -> LinSrgb {
    Srgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0).into_linear()
}

impl ColorMap {
    fn anchors(self) -> &'static [[u8; 3]] {
        match self {
            ColorMap::Plasma => &PLASMA,
            ColorMap::Oranges => &ORANGES,
            ColorMap::Blues => &BLUES,
        }
    }

    /// Colour at `t` in `[0, 1]` (clamped).
    pub fn sample(self, t: f32) -> Color32 {
        let anchors = self.anchors();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let scaled = t * (anchors.len() - 1) as f32;
        let lo = (scaled.floor() as usize).min(anchors.len() - 2);
        let frac = scaled - lo as f32;

        let mixed = to_linear(anchors[lo]).mix(to_linear(anchors[lo + 1]), frac);
        let rgb: Srgb = mixed.into_color();
        Color32::from_rgb(
            (rgb.red * 255.0).round() as u8,
            (rgb.green * 255.0).round() as u8,
            (rgb.blue * 255.0).round() as u8,
        )
    }

    /// `n` colours evenly spaced across the map.
    pub fn lut(self, n: usize) -> Vec<Color32> {
        match n {
            0 => Vec::new(),
            1 => vec![self.sample(0.5)],
            _ => (0..n)
                .map(|i| self.sample(i as f32 / (n - 1) as f32))
                .collect(),
        }
    }
}

/// Apply an opacity in `[0, 1]` to an opaque colour.
pub fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), a)
}

// ---------------------------------------------------------------------------
// Value → colour mapping
// ---------------------------------------------------------------------------

/// Maps a numeric column onto a colour map over its finite range.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    pub map: ColorMap,
    pub min: f64,
    pub max: f64,
}

impl ColorScale {
    /// Scale spanning the finite values. With no finite value the range is
    /// `[0, 1]`.
    pub fn from_values(map: ColorMap, values: &[f64]) -> Self {
        let (min, max) = finite_range(values).unwrap_or((0.0, 1.0));
        ColorScale { map, min, max }
    }

    /// Position of `value` in `[0, 1]`, `None` for non-finite values.
    /// A degenerate range maps everything to the middle.
    pub fn normalize(&self, value: f64) -> Option<f32> {
        if !value.is_finite() {
            return None;
        }
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            return Some(0.5);
        }
        Some(((value - self.min) / span).clamp(0.0, 1.0) as f32)
    }

    pub fn color_for(&self, value: f64) -> Option<Color32> {
        self.normalize(value).map(|t| self.map.sample(t))
    }

    /// Index into a [`LUT_SIZE`] lookup table.
    pub fn bucket(&self, value: f64) -> Option<usize> {
        self.normalize(value)
            .map(|t| ((t * (LUT_SIZE - 1) as f32).round() as usize).min(LUT_SIZE - 1))
    }
}

/// Min and max of the finite entries.
pub fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_match_anchors() {
        assert_eq!(ColorMap::Plasma.sample(0.0), Color32::from_rgb(13, 8, 135));
        assert_eq!(ColorMap::Plasma.sample(1.0), Color32::from_rgb(240, 249, 33));
        assert_eq!(ColorMap::Blues.sample(0.0), Color32::from_rgb(247, 251, 255));
        assert_eq!(ColorMap::Oranges.sample(1.0), Color32::from_rgb(127, 39, 4));
    }

    #[test]
    fn sample_clamps_out_of_range() {
        assert_eq!(ColorMap::Blues.sample(-3.0), ColorMap::Blues.sample(0.0));
        assert_eq!(ColorMap::Blues.sample(7.0), ColorMap::Blues.sample(1.0));
    }

    #[test]
    fn sequential_maps_darken() {
        let lum = |c: Color32| c.r() as u32 + c.g() as u32 + c.b() as u32;
        let lut = ColorMap::Blues.lut(16);
        assert!(lut.windows(2).all(|w| lum(w[0]) >= lum(w[1])));
    }

    #[test]
    fn scale_normalizes_and_skips_non_finite() {
        let scale = ColorScale::from_values(ColorMap::Plasma, &[30.0, f64::NAN, 40.0]);
        assert_eq!(scale.min, 30.0);
        assert_eq!(scale.max, 40.0);
        assert_eq!(scale.normalize(35.0), Some(0.5));
        assert_eq!(scale.normalize(f64::NAN), None);
        assert_eq!(scale.bucket(30.0), Some(0));
        assert_eq!(scale.bucket(40.0), Some(LUT_SIZE - 1));
        assert_eq!(scale.color_for(f64::INFINITY), None);
    }

    #[test]
    fn degenerate_range_maps_to_middle() {
        let scale = ColorScale::from_values(ColorMap::Oranges, &[0.2, 0.2]);
        assert_eq!(scale.normalize(0.2), Some(0.5));
    }

    #[test]
    fn with_alpha_sets_opacity() {
        let c = with_alpha(Color32::from_rgb(10, 20, 30), 0.5);
        assert_eq!(c.a(), 128);
    }
}
