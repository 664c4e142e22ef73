//! Text-layer extraction over a captured render tree.
//!
//! Produces the same `{struct, str, offsets, quads}` layout the in-page
//! extractor reports, from a [`LayoutNode`] tree instead of a live DOM.

use pagelayer_protocols::{LayoutNode, LinkRecord, PageMessage, Rect, TextLayer};

/// Result of one extraction pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub layer: TextLayer,
    pub links: Vec<LinkRecord>,
}

impl Extraction {
    /// Wrap as the message the in-page extractor would post.
    pub fn into_message(self, iframe_height: f64) -> PageMessage {
        PageMessage::SelectionData {
            selection_data: self.layer,
            link_data: self.links,
            iframe_height,
        }
    }
}

/// Extract the text layer below `root`. The root itself is not filtered.
pub fn extract(root: &LayoutNode) -> Extraction {
    match root {
        LayoutNode::Element { children, .. } => visit_children(Extraction::default(), children),
        LayoutNode::Text { .. } => visit(Extraction::default(), root),
    }
}

fn visit_children(acc: Extraction, children: &[LayoutNode]) -> Extraction {
    children.iter().fold(acc, visit)
}

fn visit(mut acc: Extraction, node: &LayoutNode) -> Extraction {
    if node.is_hidden() {
        return acc;
    }
    match node {
        LayoutNode::Element {
            rect,
            original_href,
            children,
            ..
        } => {
            if let Some(href) = original_href {
                acc.links.push(LinkRecord {
                    client_rect: (*rect).into(),
                    href: href.clone(),
                });
            }
            visit_children(acc, children)
        }
        LayoutNode::Text { text, char_rects } => {
            append_text(&mut acc.layer, text, char_rects);
            acc
        }
    }
}

/// Characters that end a word. Tabs are ordinary characters here.
fn is_break(c: char) -> bool {
    c == ' ' || c == '\n'
}

fn has_visible_text(text: &str) -> bool {
    text.chars().any(|c| !matches!(c, ' ' | '\n' | '\t'))
}

fn quad(rect: Rect) -> [f64; 8] {
    [
        rect.left,
        rect.bottom,
        rect.right,
        rect.bottom,
        rect.right,
        rect.top,
        rect.left,
        rect.top,
    ]
}

/// Words of one line, each a list of local slot indices.
type Line = Vec<Vec<usize>>;

fn append_text(layer: &mut TextLayer, text: &str, char_rects: &[Rect]) {
    if !has_visible_text(text) {
        return;
    }

    let chars: Vec<char> = text.chars().collect();
    let quads_before = layer.quads.len() / 8;
    // Local quads: one slot per character plus one per synthesized break.
    let mut local: Vec<f64> = Vec::with_capacity((chars.len() + 1) * 8);
    let mut lines: Vec<Line> = Vec::new();
    let mut can_append_word = false;
    let mut breaks = 0usize;

    for (i, &c) in chars.iter().enumerate() {
        let rect = char_rects.get(i).copied().unwrap_or_default();
        local.extend_from_slice(&quad(rect));

        let offset = match c {
            ' ' => TextLayer::SPACE,
            '\n' => TextLayer::LINE_BREAK,
            _ => (layer.offsets.len() * 2) as i64,
        };
        layer.offsets.push(offset);

        if is_break(c) {
            can_append_word = false;
            layer.text.push(c);
            continue;
        }

        let slot = i + breaks;
        let starts_line = lines.is_empty()
            || (local[8 * (slot - 1) + 1] - local[8 * slot + 1]).abs() > 0.1;

        if starts_line {
            if !lines.is_empty() && !is_break(chars[i - 1]) {
                // Wrapped mid-run: the previous slot becomes a break and the
                // current character moves one slot on.
                layer.text.push('\n');
                let last = local.len() - 8;
                local.extend_from_within(last..);
                let current = layer.offsets.last().copied().unwrap_or_default();
                layer.offsets.push(current);
                let previous = layer.offsets.len() - 2;
                layer.offsets[previous] = TextLayer::LINE_BREAK;
                breaks += 1;
            }
            lines.push(vec![vec![i + breaks]]);
            can_append_word = true;
        } else if let Some(words) = lines.last_mut() {
            match words.last_mut() {
                Some(word) if can_append_word => word.push(slot),
                _ => {
                    words.push(vec![slot]);
                    can_append_word = true;
                }
            }
        }
        layer.text.push(c);
    }

    layer.quads.extend_from_slice(&local);

    if chars.last().is_some_and(|&c| !is_break(c)) {
        layer.text.push('\n');
        let last = layer.quads.len() - 8;
        layer.quads.extend_from_within(last..);
        layer.offsets.push(TextLayer::LINE_BREAK);
    }

    flush_structure(layer, &lines, &local, quads_before);
}

fn flush_structure(layer: &mut TextLayer, lines: &[Line], local: &[f64], quads_before: usize) {
    if let Some(count) = layer.structure.first_mut() {
        *count += lines.len() as f64;
    }

    for words in lines {
        let (Some(first), Some(last)) = (words.first(), words.last()) else {
            continue;
        };
        let (Some(&line_start), Some(&line_end)) = (first.first(), last.last()) else {
            continue;
        };

        layer.structure.extend_from_slice(&[
            words.len() as f64,
            0.0,
            local[8 * line_start],
            local[8 * line_start + 1],
            local[8 * line_end + 4],
            local[8 * line_end + 5],
        ]);

        for word in words {
            let (Some(&start), Some(&end)) = (word.first(), word.last()) else {
                continue;
            };
            layer.structure.extend_from_slice(&[
                word.len() as f64,
                (start + quads_before) as f64,
                word.len() as f64,
                local[8 * start],
                local[8 * end + 2],
            ]);
        }
    }
}

#[cfg(test)]
#[path = "text_layer_tests.rs"]
mod tests;
