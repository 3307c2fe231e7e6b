//! Named highlight layers over the rendered output.
//!
//! FLTK styles one character per byte, so the independently named layers
//! (selection marker, search results, active match, attention pulse) are
//! kept as byte-range sets and composited over the base style string in a
//! fixed precedence order. Layers coexist without knowing about each other;
//! composition never changes the style string length.

use std::collections::HashMap;

/// The highlight layers, lowest precedence first in [`Layer::STACKING`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Persistent marker for the last auto-highlighted selection.
    AutoHighlight,
    /// Every in-page search match.
    SearchResult,
    /// The currently active search match.
    SearchActive,
    /// Transient attention pulse (outline jumps).
    Pulse,
}

impl Layer {
    pub const STACKING: [Layer; 4] = [
        Layer::AutoHighlight,
        Layer::SearchResult,
        Layer::SearchActive,
        Layer::Pulse,
    ];

    /// Style character the layer renders as. The style table reserves
    /// 'B'..='E' for layers, ahead of the dynamic syntax colors.
    pub fn style_char(self) -> char {
        match self {
            Layer::AutoHighlight => 'B',
            Layer::SearchResult => 'C',
            Layer::SearchActive => 'D',
            Layer::Pulse => 'E',
        }
    }
}

#[derive(Debug, Default)]
pub struct OverlaySet {
    layers: HashMap<Layer, Vec<(usize, usize)>>,
}

impl OverlaySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a layer's ranges wholesale.
    pub fn set(&mut self, layer: Layer, ranges: Vec<(usize, usize)>) {
        if ranges.is_empty() {
            self.layers.remove(&layer);
        } else {
            self.layers.insert(layer, ranges);
        }
    }

    pub fn clear(&mut self, layer: Layer) {
        self.layers.remove(&layer);
    }

    pub fn clear_all(&mut self) {
        self.layers.clear();
    }

    pub fn is_set(&self, layer: Layer) -> bool {
        self.layers.contains_key(&layer)
    }

    /// Composite all layers over `base`, highest precedence applied last.
    /// Ranges are clamped to the base length.
    pub fn compose(&self, base: &str) -> String {
        let mut styles: Vec<u8> = base.bytes().collect();
        for layer in Layer::STACKING {
            let Some(ranges) = self.layers.get(&layer) else {
                continue;
            };
            let ch = layer.style_char() as u8;
            for &(start, end) in ranges {
                let end = end.min(styles.len());
                if start >= end {
                    continue;
                }
                for byte in &mut styles[start..end] {
                    *byte = ch;
                }
            }
        }
        // Style chars are ASCII by construction.
        String::from_utf8(styles).unwrap_or_else(|_| base.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_without_layers_is_identity() {
        let overlays = OverlaySet::new();
        assert_eq!(overlays.compose("AAAFFF"), "AAAFFF");
    }

    #[test]
    fn test_compose_single_layer() {
        let mut overlays = OverlaySet::new();
        overlays.set(Layer::SearchResult, vec![(1, 3)]);
        assert_eq!(overlays.compose("AAAAAA"), "ACCAAA");
    }

    #[test]
    fn test_compose_precedence() {
        let mut overlays = OverlaySet::new();
        overlays.set(Layer::AutoHighlight, vec![(0, 6)]);
        overlays.set(Layer::SearchResult, vec![(1, 5)]);
        overlays.set(Layer::SearchActive, vec![(2, 4)]);
        overlays.set(Layer::Pulse, vec![(3, 4)]);
        assert_eq!(overlays.compose("AAAAAA"), "BCDECB");
    }

    #[test]
    fn test_compose_never_changes_length() {
        let mut overlays = OverlaySet::new();
        overlays.set(Layer::Pulse, vec![(2, 50)]);
        let composed = overlays.compose("AAAA");
        assert_eq!(composed.len(), 4);
        assert_eq!(composed, "AAEE");
    }

    #[test]
    fn test_layers_are_independent() {
        let mut overlays = OverlaySet::new();
        overlays.set(Layer::AutoHighlight, vec![(0, 2)]);
        overlays.set(Layer::SearchResult, vec![(3, 5)]);

        overlays.clear(Layer::SearchResult);
        assert!(overlays.is_set(Layer::AutoHighlight));
        assert!(!overlays.is_set(Layer::SearchResult));
        assert_eq!(overlays.compose("AAAAA"), "BBAAA");
    }

    #[test]
    fn test_set_empty_ranges_clears_layer() {
        let mut overlays = OverlaySet::new();
        overlays.set(Layer::SearchActive, vec![(0, 1)]);
        overlays.set(Layer::SearchActive, vec![]);
        assert!(!overlays.is_set(Layer::SearchActive));
    }
}
