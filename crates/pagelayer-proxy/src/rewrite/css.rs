//! Stylesheet rewriting.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use url::Url;

use pagelayer_core::escape::escape_link;

use super::{gunzip, gzip, is_gzip};
use crate::error::RewriteError;

/// A `vh` length, with the byte before it captured so lengths glued to
/// identifiers or escapes are left alone.
static VIEWPORT_HEIGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[^\w.\\-])(-?)(\d*\.?\d+)vh\b").expect("valid vh regex")
});

static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*(?:"([^"]*)"|'([^']*)'|([^'")\s]+))\s*\)"#).expect("valid url() regex")
});

static CSS_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)@import(\s+)(?:"([^"]*)"|'([^']*)')"#).expect("valid @import regex")
});

/// Where a stylesheet came from.
pub struct CssContext<'a> {
    /// Final upstream URL of the stylesheet.
    pub sheet_url: &'a Url,
    /// The sheet was fetched through an escape link, so its relative
    /// references point at a foreign origin.
    pub escaped: bool,
}

/// Replace `vh` lengths in declaration values with multiples of the
/// `--vh` custom property.
///
/// Selectors and at-rule preludes are copied through, as are comments,
/// strings, escapes and `url()` references anywhere in the sheet.
pub fn rewrite_viewport_units(css: &str) -> String {
    let bytes = css.as_bytes();
    let mut out = String::with_capacity(css.len() + css.len() / 8);
    let mut copied = 0;
    let mut depth = 0usize;
    let mut statement_start = 0;
    let mut in_value = false;
    let mut i = 0;

    while i < bytes.len() {
        if let Some(end) = opaque_end(css, i) {
            if in_value {
                push_value(&mut out, &css[copied..i]);
                out.push_str(&css[i..end]);
                copied = end;
            } else if bytes[i] == b'/' {
                statement_start = end;
            }
            i = end;
            continue;
        }

        match bytes[i] {
            b':' if !in_value && depth > 0 && is_property(&css[statement_start..i]) => {
                out.push_str(&css[copied..=i]);
                copied = i + 1;
                in_value = true;
            }
            b';' | b'{' | b'}' => {
                if in_value {
                    push_value(&mut out, &css[copied..i]);
                    copied = i;
                    in_value = false;
                }
                match bytes[i] {
                    b'{' => depth += 1,
                    b'}' => depth = depth.saturating_sub(1),
                    _ => {}
                }
                statement_start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    if in_value {
        push_value(&mut out, &css[copied..]);
    } else {
        out.push_str(&css[copied..]);
    }
    out
}

fn push_value(out: &mut String, value: &str) {
    out.push_str(&VIEWPORT_HEIGHT.replace_all(value, "${1}calc(${2}${3} * var(--vh))"));
}

fn is_property(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// End of a comment, string, escape or `url()` starting at `i`.
fn opaque_end(css: &str, i: usize) -> Option<usize> {
    let bytes = css.as_bytes();
    match bytes[i] {
        b'/' if bytes.get(i + 1) == Some(&b'*') => {
            Some(css[i + 2..].find("*/").map_or(css.len(), |p| i + p + 4))
        }
        b'"' | b'\'' => Some(string_end(bytes, i)),
        b'\\' => Some(i + 1 + css[i + 1..].chars().next().map_or(0, char::len_utf8)),
        b'u' | b'U' if starts_url(bytes, i) => Some(url_end(bytes, i + 4)),
        _ => None,
    }
}

fn string_end(bytes: &[u8], open: usize) -> usize {
    let quote = bytes[open];
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn starts_url(bytes: &[u8], i: usize) -> bool {
    let glued = i > 0 && {
        let prev = bytes[i - 1];
        prev.is_ascii_alphanumeric() || prev == b'-' || prev == b'_' || prev >= 0x80
    };
    !glued && bytes.get(i..i + 4).is_some_and(|b| b.eq_ignore_ascii_case(b"url("))
}

fn url_end(bytes: &[u8], from: usize) -> usize {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => i = string_end(bytes, i),
            b')' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

pub fn rewrite_css(css: &str, ctx: &CssContext<'_>) -> String {
    let css = rewrite_viewport_units(css);
    if ctx.escaped {
        rewrite_urls(&css, ctx.sheet_url)
    } else {
        css
    }
}

/// Rewrite a raw stylesheet body, gzip or not. Compressed input comes
/// back compressed.
pub fn rewrite_css_body(body: &[u8], ctx: &CssContext<'_>) -> Result<Vec<u8>, RewriteError> {
    let compressed = is_gzip(body);
    let plain = if compressed { gunzip(body)? } else { body.to_vec() };
    let text = String::from_utf8(plain).map_err(|_| RewriteError::Encoding)?;

    let rewritten = rewrite_css(&text, ctx);
    if compressed {
        gzip(rewritten.as_bytes())
    } else {
        Ok(rewritten.into_bytes())
    }
}

fn rewrite_urls(css: &str, sheet_url: &Url) -> String {
    let css = CSS_URL.replace_all(css, |caps: &Captures<'_>| {
        let reference = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
            .unwrap_or_default();

        match escaped_reference(reference, sheet_url) {
            Some(link) => format!("url(\"{}\")", link),
            None => caps[0].to_string(),
        }
    });

    CSS_IMPORT
        .replace_all(&css, |caps: &Captures<'_>| {
            let reference = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or_default();

            match escaped_reference(reference, sheet_url) {
                Some(link) => format!("@import{}\"{}\"", &caps[1], link),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn escaped_reference(reference: &str, sheet_url: &Url) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() || reference.starts_with('#') || reference.starts_with("data:") {
        return None;
    }
    let resolved = sheet_url.join(reference).ok()?;
    matches!(resolved.scheme(), "http" | "https").then(|| escape_link(&resolved))
}
