//! Highlight Adapter: wraps the external highlighting library (syntect) as a
//! black box (one auto-detect call, one tokenization pass) and turns its
//! output into what the UI needs: a style-char buffer, the ordered token
//! segments the search engine maps offsets against, and the structural
//! outline.

mod highlighter;
pub mod outline;
mod style_map;

use fltk::enums::Font;
use fltk::text::StyleTableEntry;
use syntect::highlighting::ThemeSet;
use syntect::parsing::{SyntaxReference, SyntaxSet};

pub use outline::OutlineEntry;

use crate::app::error::Result;
use crate::app::search::Segment;
use outline::StructuralScopes;
use style_map::StyleMap;

/// Theme the output surface renders with.
const THEME_NAME: &str = "base16-eighties.dark";

/// Everything one render pass produces.
pub struct RenderOutput {
    /// Detected language name; `None` when detection abstained (plain text).
    pub language: Option<String>,
    /// One style char per byte of the rendered text.
    pub style_string: String,
    /// Token pieces with cumulative byte offsets; the search engine's
    /// segment list.
    pub segments: Vec<Segment>,
    /// Structural symbols in document order.
    pub outline: Vec<OutlineEntry>,
}

pub struct Renderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    style_map: StyleMap,
    structural: StructuralScopes,
}

impl Renderer {
    pub fn new(font: Font, font_size: i32) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            style_map: StyleMap::new(font, font_size),
            structural: StructuralScopes::new(),
        }
    }

    /// Auto-detect the language from the first line of `text`.
    /// Returns `None` when detection abstains.
    fn detect(&self, text: &str) -> Option<&SyntaxReference> {
        let syntax = self.syntax_set.find_syntax_by_first_line(text)?;
        if syntax.name == "Plain Text" {
            return None;
        }
        Some(syntax)
    }

    /// Render `text` once. Detection abstaining is not an error (plain-text
    /// output); a tokenizer error is, and produces no partial output.
    pub fn render(&mut self, text: &str) -> Result<RenderOutput> {
        let Some(syntax) = self.detect(text) else {
            return Ok(plain_output(text));
        };
        let syntax = syntax.clone();

        let result = highlighter::highlight_text(
            text,
            &syntax,
            &self.syntax_set,
            &self.theme_set,
            THEME_NAME,
            &mut self.style_map,
            &self.structural,
        )?;

        Ok(RenderOutput {
            language: Some(syntax.name.clone()),
            style_string: result.style_string,
            segments: result.segments,
            outline: result.outline,
        })
    }

    /// Style table for FLTK's set_highlight_data. Grows as renders encounter
    /// new colors, so re-bind it after each render.
    pub fn style_table(&self) -> Vec<StyleTableEntry> {
        self.style_map.entries().to_vec()
    }

    pub fn set_font(&mut self, font: Font, size: i32) {
        self.style_map.update_font(font, size);
    }
}

fn plain_output(text: &str) -> RenderOutput {
    let segments = if text.is_empty() {
        Vec::new()
    } else {
        // The whole buffer renders as a single unstyled piece.
        vec![Segment {
            start: 0,
            len: text.len(),
        }]
    };
    RenderOutput {
        language: None,
        style_string: "A".repeat(text.len()),
        segments,
        outline: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> Renderer {
        Renderer::new(Font::Courier, 14)
    }

    #[test]
    fn test_detection_abstains_on_prose() {
        let mut r = renderer();
        let output = r.render("just some plain words\nnothing code-like\n").unwrap();
        assert_eq!(output.language, None);
        assert!(output.outline.is_empty());
        let total: usize = output.segments.iter().map(|s| s.len).sum();
        assert_eq!(output.style_string.len(), total);
    }

    #[test]
    fn test_detects_language_from_first_line() {
        let mut r = renderer();
        let source = "#!/usr/bin/env python\ndef greet(name):\n    return name\n";
        let output = r.render(source).unwrap();
        assert_eq!(output.language.as_deref(), Some("Python"));
    }

    #[test]
    fn test_outline_contains_function_names() {
        let mut r = renderer();
        let source = "#!/usr/bin/env python\ndef greet(name):\n    return name\n\ndef leave():\n    pass\n";
        let output = r.render(source).unwrap();
        let labels: Vec<&str> = output.outline.iter().map(|e| e.label.as_str()).collect();
        assert!(labels.contains(&"greet"), "outline was {:?}", labels);
        assert!(labels.contains(&"leave"), "outline was {:?}", labels);

        // Entries point back into the source text.
        let greet = output
            .outline
            .iter()
            .find(|e| e.label == "greet")
            .unwrap();
        assert_eq!(&source[greet.start..greet.end], "greet");
    }

    #[test]
    fn test_style_string_is_per_byte() {
        let mut r = renderer();
        let source = "#!/usr/bin/env python\ns = \"héllo wörld\"\n";
        let output = r.render(source).unwrap();
        assert_eq!(output.style_string.len(), source.len());
    }

    #[test]
    fn test_segments_tile_the_text() {
        let mut r = renderer();
        let source = "#!/usr/bin/env python\ndef f(a, b):\n    return a + b\n";
        let output = r.render(source).unwrap();

        let total: usize = output.segments.iter().map(|s| s.len).sum();
        assert_eq!(total, source.len());

        let mut expected_start = 0;
        for seg in &output.segments {
            assert_eq!(seg.start, expected_start);
            expected_start = seg.end();
        }
    }

    #[test]
    fn test_empty_input_renders_empty() {
        let mut r = renderer();
        let output = r.render("").unwrap();
        assert_eq!(output.language, None);
        assert!(output.style_string.is_empty());
        assert!(output.segments.is_empty());
    }
}
