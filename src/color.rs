use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Qualitative palettes
// ---------------------------------------------------------------------------

const PLOTLY: [[u8; 3]; 10] = [
    [0x63, 0x6E, 0xFA],
    [0xEF, 0x55, 0x3B],
    [0x00, 0xCC, 0x96],
    [0xAB, 0x63, 0xFA],
    [0xFF, 0xA1, 0x5A],
    [0x19, 0xD3, 0xF3],
    [0xFF, 0x66, 0x92],
    [0xB6, 0xE8, 0x80],
    [0xFF, 0x97, 0xFF],
    [0xFE, 0xCB, 0x52],
];

const SET2: [[u8; 3]; 8] = [
    [102, 194, 165],
    [252, 141, 98],
    [141, 160, 203],
    [231, 138, 195],
    [166, 216, 84],
    [255, 217, 47],
    [229, 196, 148],
    [179, 179, 179],
];

const PASTEL: [[u8; 3]; 11] = [
    [102, 197, 204],
    [246, 207, 113],
    [248, 156, 116],
    [220, 176, 242],
    [135, 197, 95],
    [158, 185, 243],
    [254, 136, 177],
    [201, 219, 116],
    [139, 224, 164],
    [180, 151, 231],
    [179, 179, 179],
];

/// Named colour sequence for chart categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaletteId {
    #[default]
    Plotly,
    Set2,
    Pastel,
    /// Evenly spaced hues, as many as there are categories.
    Hue,
}

impl PaletteId {
    /// `n` colours; qualitative palettes repeat once exhausted.
    pub fn colors(self, n: usize) -> Vec<Color32> {
        let base: &[[u8; 3]] = match self {
            PaletteId::Plotly => &PLOTLY,
            PaletteId::Set2 => &SET2,
            PaletteId::Pastel => &PASTEL,
            PaletteId::Hue => return generate_palette(n),
        };
        base.iter()
            .cycle()
            .take(n)
            .map(|&[r, g, b]| Color32::from_rgb(r, g, b))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps category labels to palette colours, in the order given.  Used where
/// several charts must agree on a colour per label (stacked bars, map).
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    order: Vec<String>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new<S: AsRef<str>>(labels: &[S], palette: PaletteId) -> Self {
        let colors = palette.colors(labels.len());
        let order: Vec<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();
        let mapping = order.iter().cloned().zip(colors).collect();

        ColorMap {
            mapping,
            order,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (label → colour) in construction order.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.order
            .iter()
            .map(|label| (label.clone(), self.color_for(label)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualitative_palette_cycles() {
        let colors = PaletteId::Set2.colors(10);
        assert_eq!(colors.len(), 10);
        assert_eq!(colors[0], colors[8]);
        assert_eq!(colors[0], Color32::from_rgb(102, 194, 165));
    }

    #[test]
    fn test_hue_palette_distinct() {
        let colors = PaletteId::Hue.colors(6);
        assert_eq!(colors.len(), 6);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn test_color_map_lookup() {
        let map = ColorMap::new(&["18", "37", "45"], PaletteId::Plotly);
        assert_eq!(map.color_for("37"), Color32::from_rgb(0xEF, 0x55, 0x3B));
        assert_eq!(map.color_for("99"), Color32::GRAY);
        let legend: Vec<_> = map.legend_entries().into_iter().map(|(l, _)| l).collect();
        assert_eq!(legend, vec!["18", "37", "45"]);
    }
}
