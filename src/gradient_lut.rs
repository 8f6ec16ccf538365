//! Gradient color lookup table.
//!
//! Builds a 256-entry LUT from SVG/canvas-style color stops. The heatmap
//! colorizer indexes it with the grayscale intensity of each pixel.

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};

use crate::color::Rgba8;

/// Number of entries in a [`GradientLut`].
pub const LUT_SIZE: usize = 256;

// ============================================================================
// GradientStop
// ============================================================================

/// Color stop for gradient definition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Rgba8,
}

impl GradientStop {
    pub fn new(offset: f64, color: Rgba8) -> Self {
        Self { offset, color }
    }

    /// Stop from a CSS color string; unparseable colors become transparent.
    pub fn css(offset: f64, color: &str) -> Self {
        Self::new(offset, Rgba8::parse_lossy(color))
    }

    /// Offset clamped to `[0, 1]`; NaN maps to 0.
    fn position(&self) -> f64 {
        if self.offset.is_nan() {
            0.0
        } else {
            self.offset.clamp(0.0, 1.0)
        }
    }
}

/// Serde adapter storing stops as an ordered map `{ "offset": "color" }`,
/// the shape gradient options are usually written in.
pub mod stops_as_map {
    use super::*;

    pub fn serialize<S: Serializer>(
        stops: &[GradientStop],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(stops.len()))?;
        for stop in stops {
            map.serialize_entry(&format!("{:?}", stop.offset), &stop.color)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<GradientStop>, D::Error> {
        struct StopsVisitor;

        impl<'de> Visitor<'de> for StopsVisitor {
            type Value = Vec<GradientStop>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of stop offsets to CSS colors")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut stops = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, color)) = access.next_entry::<String, Rgba8>()? {
                    let offset: f64 = key
                        .trim()
                        .parse()
                        .map_err(|_| de::Error::custom(format!("invalid stop offset {key:?}")))?;
                    stops.push(GradientStop::new(offset, color));
                }
                Ok(stops)
            }
        }

        deserializer.deserialize_map(StopsVisitor)
    }

    /// Same as [`deserialize`] for an optional field.
    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            stops: &Option<Vec<GradientStop>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match stops {
                Some(stops) => super::serialize(stops, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Vec<GradientStop>>, D::Error> {
            super::deserialize(deserializer).map(Some)
        }
    }
}

// ============================================================================
// GradientLut
// ============================================================================

/// 256-entry gradient color lookup table.
///
/// Entry `i` holds the color at position `t = i / 255`. Stops may be given in
/// any order; they are stably sorted by offset, so two stops sharing an
/// offset form a hard edge where the one added later wins from that offset
/// on. Before the first stop the first color is used, after the last stop the
/// last color. With no stops every entry is transparent black.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradientLut {
    color_lut: Vec<Rgba8>,
}

impl Default for GradientLut {
    fn default() -> Self {
        Self {
            color_lut: vec![Rgba8::TRANSPARENT; LUT_SIZE],
        }
    }
}

impl GradientLut {
    /// Build the lookup table by interpolating between color stops.
    pub fn build(stops: &[GradientStop]) -> Self {
        let mut profile: Vec<(f64, Rgba8)> = stops.iter().map(|s| (s.position(), s.color)).collect();
        profile.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut lut = Self::default();
        if profile.is_empty() {
            return lut;
        }
        for (i, entry) in lut.color_lut.iter_mut().enumerate() {
            *entry = color_at(&profile, i as f64 / (LUT_SIZE - 1) as f64);
        }
        lut
    }

    pub fn size(&self) -> usize {
        self.color_lut.len()
    }

    pub fn get(&self, index: u8) -> Rgba8 {
        self.color_lut[index as usize]
    }

    /// Nearest entry for a position in `[0, 1]`.
    pub fn sample(&self, t: f64) -> Rgba8 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        self.get((t * (LUT_SIZE - 1) as f64).round() as u8)
    }

    pub fn as_slice(&self) -> &[Rgba8] {
        &self.color_lut
    }
}

/// Color at `t` over a non-empty profile sorted by offset.
fn color_at(profile: &[(f64, Rgba8)], t: f64) -> Rgba8 {
    let next = profile.partition_point(|&(offset, _)| offset <= t);
    if next == 0 {
        return profile[0].1;
    }
    if next == profile.len() {
        return profile[next - 1].1;
    }
    let (o0, c0) = profile[next - 1];
    let (o1, c1) = profile[next];
    c0.gradient(&c1, (t - o0) / (o1 - o0))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_lut_default_is_transparent() {
        let lut = GradientLut::build(&[]);
        assert_eq!(lut.size(), 256);
        assert!(lut.as_slice().iter().all(|c| *c == Rgba8::TRANSPARENT));
    }

    #[test]
    fn test_gradient_lut_two_stops() {
        let lut = GradientLut::build(&[
            GradientStop::new(0.0, Rgba8::new_opaque(255, 0, 0)),
            GradientStop::new(1.0, Rgba8::new_opaque(0, 0, 255)),
        ]);
        assert_eq!(lut.get(0), Rgba8::new_opaque(255, 0, 0));
        assert_eq!(lut.get(255), Rgba8::new_opaque(0, 0, 255));
        let mid = lut.get(128);
        assert!(mid.r > 120 && mid.r < 135, "Mid r={}", mid.r);
        assert!(mid.b > 120 && mid.b < 135, "Mid b={}", mid.b);
    }

    #[test]
    fn test_gradient_lut_unsorted_stops() {
        let sorted = GradientLut::build(&[
            GradientStop::new(0.0, Rgba8::new_opaque(255, 0, 0)),
            GradientStop::new(0.5, Rgba8::new_opaque(0, 255, 0)),
            GradientStop::new(1.0, Rgba8::new_opaque(0, 0, 255)),
        ]);
        let shuffled = GradientLut::build(&[
            GradientStop::new(1.0, Rgba8::new_opaque(0, 0, 255)),
            GradientStop::new(0.0, Rgba8::new_opaque(255, 0, 0)),
            GradientStop::new(0.5, Rgba8::new_opaque(0, 255, 0)),
        ]);
        assert_eq!(sorted, shuffled);
        assert!(sorted.sample(0.5).g > 250);
    }

    #[test]
    fn test_gradient_lut_extends_end_colors() {
        let lut = GradientLut::build(&[
            GradientStop::new(0.25, Rgba8::new_opaque(10, 20, 30)),
            GradientStop::new(0.75, Rgba8::new_opaque(200, 200, 200)),
        ]);
        assert_eq!(lut.get(0), Rgba8::new_opaque(10, 20, 30));
        assert_eq!(lut.get(63), Rgba8::new_opaque(10, 20, 30));
        assert_eq!(lut.get(200), Rgba8::new_opaque(200, 200, 200));
        assert_eq!(lut.get(255), Rgba8::new_opaque(200, 200, 200));
    }

    #[test]
    fn test_gradient_lut_single_stop_is_solid() {
        let c = Rgba8::new(1, 2, 3, 4);
        let lut = GradientLut::build(&[GradientStop::new(0.3, c)]);
        assert!(lut.as_slice().iter().all(|e| *e == c));
    }

    #[test]
    fn test_gradient_lut_duplicate_offsets_hard_edge() {
        let lut = GradientLut::build(&[
            GradientStop::new(0.0, Rgba8::BLACK),
            GradientStop::new(0.5, Rgba8::BLACK),
            GradientStop::new(0.5, Rgba8::WHITE),
            GradientStop::new(1.0, Rgba8::WHITE),
        ]);
        assert_eq!(lut.get(127), Rgba8::BLACK);
        assert_eq!(lut.get(128), Rgba8::WHITE);
    }

    #[test]
    fn test_gradient_lut_clamps_offsets() {
        let lut = GradientLut::build(&[
            GradientStop::new(-2.0, Rgba8::BLACK),
            GradientStop::new(f64::NAN, Rgba8::BLACK),
            GradientStop::new(9.0, Rgba8::WHITE),
        ]);
        assert_eq!(lut.get(0), Rgba8::BLACK);
        assert_eq!(lut.get(255), Rgba8::WHITE);
    }

    #[test]
    fn test_stops_map_serde() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Holder {
            #[serde(with = "stops_as_map")]
            gradient: Vec<GradientStop>,
        }

        let holder: Holder = serde_json::from_str(
            r##"{"gradient": {"1.0": "#00d660", "0.0": "rgba(204, 0, 0, 1)"}}"##,
        )
        .unwrap();
        assert_eq!(holder.gradient.len(), 2);
        assert_eq!(holder.gradient[0].offset, 1.0);
        assert_eq!(holder.gradient[1].color, Rgba8::new_opaque(204, 0, 0));

        let json = serde_json::to_string(&holder).unwrap();
        assert_eq!(json, r##"{"gradient":{"1.0":"#00d660","0.0":"#cc0000"}}"##);

        assert!(serde_json::from_str::<Holder>(r#"{"gradient": {"x": "red"}}"#).is_err());
    }
}
