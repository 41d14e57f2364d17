use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::CellValue;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Hues per lightness ring; one degree apart at the densest.
const HUES_PER_RING: usize = 360;

/// Lightness of each ring, then the same rings again at lower saturation.
const RING_LIGHTNESS: [f32; 6] = [0.55, 0.40, 0.70, 0.47, 0.62, 0.33];
const RING_SATURATION: [f32; 2] = [0.75, 0.5];

/// Generates `n` visually distinct colours using evenly spaced hues. Past
/// 360 colours the hue wheel is split into rings of different lightness.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    let rings = n.div_ceil(HUES_PER_RING);
    let per_ring = n.div_ceil(rings);

    (0..n)
        .map(|i| {
            let (ring, slot) = (i / per_ring, i % per_ring);
            let hue = (slot as f32 / per_ring as f32) * 360.0;
            let lightness = RING_LIGHTNESS[ring % RING_LIGHTNESS.len()];
            let saturation = RING_SATURATION[(ring / RING_LIGHTNESS.len()) % RING_SATURATION.len()];
            let hsl = Hsl::new(hue, saturation, lightness);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0).round() as u8,
                (rgb.green * 255.0).round() as u8,
                (rgb.blue * 255.0).round() as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: cluster label → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct labels of one column to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<CellValue, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from the distinct labels of a column.
    pub fn new(unique_values: &BTreeSet<CellValue>) -> Self {
        let palette = generate_palette(unique_values.len());
        let mapping: BTreeMap<CellValue, Color32> = unique_values
            .iter()
            .cloned()
            .zip(palette)
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given label.
    pub fn color_for(&self, value: &CellValue) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_label_gets_its_own_colour() {
        let labels: BTreeSet<CellValue> = (0..12).map(CellValue::Integer).collect();
        let map = ColorMap::new(&labels);

        let colours: BTreeSet<[u8; 4]> = labels
            .iter()
            .map(|l| map.color_for(l).to_array())
            .collect();
        assert_eq!(colours.len(), labels.len());
    }

    #[test]
    fn large_label_sets_stay_distinct() {
        let palette = generate_palette(1200);
        let distinct: BTreeSet<[u8; 4]> = palette.iter().map(|c| c.to_array()).collect();
        assert_eq!(distinct.len(), 1200);
    }

    #[test]
    fn small_palettes_use_one_ring() {
        let palette = generate_palette(4);
        assert_eq!(palette.len(), 4);
        assert_eq!(palette[0], generate_palette(1)[0]);
    }

    #[test]
    fn unknown_label_is_grey() {
        let labels: BTreeSet<CellValue> = [CellValue::Integer(0)].into_iter().collect();
        let map = ColorMap::new(&labels);
        assert_eq!(map.color_for(&CellValue::Integer(9)), Color32::GRAY);
    }
}
