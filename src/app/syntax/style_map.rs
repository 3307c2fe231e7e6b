use std::collections::HashMap;

use fltk::enums::{Color, Font};
use fltk::text::StyleTableEntry;
use syntect::highlighting::Color as SyntectColor;

use crate::app::overlay::Layer;

/// Maps syntect RGB colors to FLTK style characters.
///
/// 'A' is the plain-text fallback and 'B'..='E' are reserved for the named
/// overlay layers; dynamic syntax colors are assigned from 'F' upward as
/// they are encountered.
pub struct StyleMap {
    color_to_char: HashMap<(u8, u8, u8), char>,
    entries: Vec<StyleTableEntry>,
    font: Font,
    font_size: i32,
}

fn layer_color(layer: Layer) -> Color {
    match layer {
        Layer::AutoHighlight => Color::from_rgb(253, 224, 71),
        Layer::SearchResult => Color::from_rgb(96, 165, 250),
        Layer::SearchActive => Color::from_rgb(249, 115, 22),
        Layer::Pulse => Color::from_rgb(250, 204, 21),
    }
}

impl StyleMap {
    pub fn new(font: Font, font_size: i32) -> Self {
        let mut map = Self {
            color_to_char: HashMap::new(),
            entries: Vec::new(),
            font,
            font_size,
        };
        map.insert_reserved();
        map
    }

    fn insert_reserved(&mut self) {
        // 'A': default/fallback style (plain text color).
        self.entries.push(StyleTableEntry {
            color: Color::from_rgb(220, 220, 220),
            font: self.font,
            size: self.font_size,
        });
        // 'B'..='E': overlay layers at fixed slots.
        for layer in Layer::STACKING {
            self.entries.push(StyleTableEntry {
                color: layer_color(layer),
                font: self.font,
                size: self.font_size,
            });
        }
    }

    /// Get the style character for a syntect color, inserting a new entry if
    /// needed.
    pub fn get_or_insert(&mut self, color: SyntectColor) -> char {
        let key = (color.r, color.g, color.b);
        if let Some(&ch) = self.color_to_char.get(&key) {
            return ch;
        }

        let idx = self.entries.len();
        // FLTK style chars go 'A'..'Z' then beyond if needed, but 26 colors is plenty
        if idx >= 26 {
            return (b'A' + 25) as char;
        }
        let ch = (b'A' + idx as u8) as char;
        self.entries.push(StyleTableEntry {
            color: Color::from_rgb(color.r, color.g, color.b),
            font: self.font,
            size: self.font_size,
        });
        self.color_to_char.insert(key, ch);
        ch
    }

    /// Get the style table entries for FLTK's set_highlight_data.
    pub fn entries(&self) -> &[StyleTableEntry] {
        &self.entries
    }

    /// Drop all dynamic mappings, keeping the reserved slots.
    pub fn clear(&mut self) {
        self.color_to_char.clear();
        self.entries.clear();
        self.insert_reserved();
    }

    /// Update font info for all entries.
    pub fn update_font(&mut self, font: Font, size: i32) {
        self.font = font;
        self.font_size = size;
        for entry in &mut self.entries {
            entry.font = font;
            entry.size = size;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_slots_precede_dynamic_colors() {
        let mut map = StyleMap::new(Font::Courier, 14);
        assert_eq!(map.entries().len(), 5);

        let first = map.get_or_insert(SyntectColor {
            r: 10,
            g: 20,
            b: 30,
            a: 255,
        });
        assert_eq!(first, 'F');
    }

    #[test]
    fn test_same_color_reuses_char() {
        let mut map = StyleMap::new(Font::Courier, 14);
        let color = SyntectColor {
            r: 1,
            g: 2,
            b: 3,
            a: 255,
        };
        let a = map.get_or_insert(color);
        let b = map.get_or_insert(color);
        assert_eq!(a, b);
        assert_eq!(map.entries().len(), 6);
    }

    #[test]
    fn test_clear_keeps_reserved_slots() {
        let mut map = StyleMap::new(Font::Courier, 14);
        map.get_or_insert(SyntectColor {
            r: 9,
            g: 9,
            b: 9,
            a: 255,
        });
        map.clear();
        assert_eq!(map.entries().len(), 5);
    }
}
