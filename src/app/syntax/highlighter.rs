use syntect::highlighting::{HighlightIterator, HighlightState, Highlighter, ThemeSet};
use syntect::parsing::{ParseState, ScopeStack, SyntaxReference, SyntaxSet};

use crate::app::error::{AppError, Result};
use crate::app::search::Segment;

use super::outline::{OutlineEntry, StructuralScopes};
use super::style_map::StyleMap;

pub struct HighlightedText {
    pub style_string: String,
    pub segments: Vec<Segment>,
    pub outline: Vec<OutlineEntry>,
}

/// Highlight the whole text in one pass: style chars, the ordered token
/// segment list, and the structural outline. Any tokenizer error aborts the
/// pass; the caller gets no partial output.
pub fn highlight_text(
    text: &str,
    syntax: &SyntaxReference,
    syntax_set: &SyntaxSet,
    theme_set: &ThemeSet,
    theme_name: &str,
    style_map: &mut StyleMap,
    structural: &StructuralScopes,
) -> Result<HighlightedText> {
    let theme = &theme_set.themes[theme_name];
    let highlighter = Highlighter::new(theme);
    let mut parse_state = ParseState::new(syntax);
    let mut highlight_state = HighlightState::new(&highlighter, ScopeStack::new());
    let mut scopes = ScopeStack::new();

    let mut style_string = String::with_capacity(text.len());
    let mut segments = Vec::new();
    let mut outline = Vec::new();
    let mut line_start = 0usize;

    for line in LinesWithEndings::new(text) {
        let ops = parse_state
            .parse_line(line, syntax_set)
            .map_err(|e| AppError::Highlight(e.to_string()))?;

        let iter = HighlightIterator::new(&mut highlight_state, &ops, line, &highlighter);
        let mut piece_start = line_start;
        for (style, piece) in iter {
            let ch = style_map.get_or_insert(style.foreground);
            // One style char per byte (not per char) for UTF-8 correctness
            for _ in 0..piece.len() {
                style_string.push(ch);
            }
            if !piece.is_empty() {
                segments.push(Segment {
                    start: piece_start,
                    len: piece.len(),
                });
            }
            piece_start += piece.len();
        }

        // Walk the same ops against a scope stack to pick out structural
        // symbols for the outline.
        let mut cursor = 0usize;
        for (offset, op) in &ops {
            if *offset > cursor && structural.matches(&scopes.scopes) {
                push_symbol(
                    &mut outline,
                    &line[cursor..*offset],
                    line_start + cursor,
                    line_start + *offset,
                );
            }
            scopes
                .apply(op)
                .map_err(|e| AppError::Highlight(e.to_string()))?;
            cursor = *offset;
        }
        if line.len() > cursor && structural.matches(&scopes.scopes) {
            push_symbol(
                &mut outline,
                &line[cursor..],
                line_start + cursor,
                line_start + line.len(),
            );
        }

        line_start += line.len();
    }

    Ok(HighlightedText {
        style_string,
        segments,
        outline,
    })
}

fn push_symbol(outline: &mut Vec<OutlineEntry>, text: &str, start: usize, end: usize) {
    if text.trim().is_empty() {
        return;
    }
    outline.push(OutlineEntry::new(text, start, end));
}

/// Iterator that yields lines including their line endings.
pub(super) struct LinesWithEndings<'a> {
    text: &'a str,
}

impl<'a> LinesWithEndings<'a> {
    pub(super) fn new(text: &'a str) -> Self {
        Self { text }
    }
}

impl<'a> Iterator for LinesWithEndings<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.text.is_empty() {
            return None;
        }
        let end = self.text.find('\n').map(|i| i + 1).unwrap_or(self.text.len());
        let line = &self.text[..end];
        self.text = &self.text[end..];
        Some(line)
    }
}
