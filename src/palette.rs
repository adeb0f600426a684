//! Colour swatches and their screen-space hit rectangles.

use image::Rgb;

use crate::geom::Pixel;

/// Screen rectangle of a swatch. Hit-testing includes both edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwatchRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl SwatchRect {
    pub fn contains(&self, p: Pixel) -> bool {
        self.x <= p.x && p.x <= self.x + self.width && self.y <= p.y && p.y <= self.y + self.height
    }

    fn overlaps(&self, other: &SwatchRect) -> bool {
        self.x <= other.x + other.width
            && other.x <= self.x + self.width
            && self.y <= other.y + other.height
            && other.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Swatch {
    pub color: Rgb<u8>,
    pub name: String,
    pub rect: SwatchRect,
}

/// Ordered, immutable set of swatches.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    swatches: Vec<Swatch>,
}

impl Palette {
    /// Build a palette, rejecting overlapping hit rectangles.
    pub fn new(swatches: Vec<Swatch>) -> Option<Self> {
        if swatches.is_empty() {
            return None;
        }
        for (i, a) in swatches.iter().enumerate() {
            if swatches[i + 1..].iter().any(|b| a.rect.overlaps(&b.rect)) {
                return None;
            }
        }
        Some(Self { swatches })
    }

    /// Lay colours out in a strip along the top edge of the screen.
    pub fn strip(colors: &[(&str, [u8; 3])]) -> Option<Self> {
        Self::new(strip_swatches(colors))
    }

    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    pub fn get(&self, index: usize) -> Option<&Swatch> {
        self.swatches.get(index)
    }

    pub fn len(&self) -> usize {
        self.swatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }

    /// Index of the swatch under `p`, if any.
    pub fn hit_test(&self, p: Pixel) -> Option<usize> {
        self.swatches.iter().position(|s| s.rect.contains(p))
    }
}

const DEFAULT_COLORS: [(&str, [u8; 3]); 6] = [
    ("Red", [255, 0, 0]),
    ("Green", [0, 255, 0]),
    ("Blue", [0, 0, 255]),
    ("Yellow", [255, 255, 0]),
    ("Magenta", [255, 0, 255]),
    ("Cyan", [0, 255, 255]),
];

/// 50x30 swatches, 10 px apart, starting at (10, 10).
fn strip_swatches(colors: &[(&str, [u8; 3])]) -> Vec<Swatch> {
    colors
        .iter()
        .enumerate()
        .map(|(i, (name, rgb))| Swatch {
            color: Rgb(*rgb),
            name: name.to_string(),
            rect: SwatchRect {
                x: i as i32 * 60 + 10,
                y: 10,
                width: 50,
                height: 30,
            },
        })
        .collect()
}

impl Default for Palette {
    /// Red, Green, Blue, Yellow, Magenta and Cyan along the top edge.
    fn default() -> Self {
        Self {
            swatches: strip_swatches(&DEFAULT_COLORS),
        }
    }
}
