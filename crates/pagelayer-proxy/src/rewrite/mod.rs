//! In-flight body rewriting.
//!
//! Every rewrite is best effort: on failure the caller forwards the
//! original bytes.

mod css;
mod html;

pub use css::{rewrite_css, rewrite_css_body, rewrite_viewport_units, CssContext};
pub use html::{rewrite_html, HtmlContext, INJECTED_MARKER};

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::RewriteError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

pub fn is_gzip(body: &[u8]) -> bool {
    body.starts_with(&GZIP_MAGIC)
}

pub fn gunzip(body: &[u8]) -> Result<Vec<u8>, RewriteError> {
    let mut decoded = Vec::new();
    GzDecoder::new(body).read_to_end(&mut decoded)?;
    Ok(decoded)
}

pub fn gzip(body: &[u8]) -> Result<Vec<u8>, RewriteError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body)?;
    Ok(encoder.finish()?)
}
