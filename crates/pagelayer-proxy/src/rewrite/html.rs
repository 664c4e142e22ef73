//! HTML injection.

use std::cell::Cell;

use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, RewriteStrSettings};
use url::Url;

use pagelayer_core::escape::escape_link;
use pagelayer_protocols::sync::escape_for_script;

use crate::assets::InjectedAssets;
use crate::error::RewriteError;

/// Attribute on the injected `<style>`; its presence means the document
/// was already rewritten.
pub const INJECTED_MARKER: &str = "data-pagelayer-injected";

/// What the HTML rewriter needs to know about the page.
pub struct HtmlContext<'a> {
    /// Final upstream URL of the document, after redirects.
    pub page_url: &'a Url,
    /// ASCII origin of the session target.
    pub session_origin: &'a str,
    /// URL the session is bound to, exposed to scripts as `urlToProxy`.
    pub bound_url: &'a str,
    pub viewport_height: u32,
    pub assets: &'a InjectedAssets,
}

/// Inject the page scripts and styles before `</head>`.
///
/// Also pins `--vh` on the root element (its `style` attribute, plus a
/// `:root` rule for documents with no `<html>` tag) and routes stylesheets
/// through the proxy. Documents without a head are refused; documents that
/// already carry [`INJECTED_MARKER`] come back unchanged.
pub fn rewrite_html(body: &str, ctx: &HtmlContext<'_>) -> Result<String, RewriteError> {
    if body.contains(INJECTED_MARKER) {
        return Ok(body.to_string());
    }
    if !body.to_ascii_lowercase().contains("</head>") {
        return Err(RewriteError::MissingHead);
    }

    let viewport_unit = format!("--vh: {}px;", f64::from(ctx.viewport_height) / 100.0);
    let injection = injection(ctx, &viewport_unit);
    let injected = Cell::new(false);

    rewrite_str(
        body,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("html", |el| {
                    let style = match el.get_attribute("style") {
                        Some(existing) if !existing.trim().is_empty() => {
                            format!("{} {}", viewport_unit, existing)
                        }
                        _ => viewport_unit.clone(),
                    };
                    el.set_attribute("style", &style)?;
                    Ok(())
                }),
                element!(r#"link[rel~="stylesheet"][href]"#, |el| {
                    if let Some(href) = el.get_attribute("href") {
                        if let Some(proxied) = stylesheet_href(&href, ctx) {
                            el.set_attribute("href", &proxied)?;
                        }
                    }
                    Ok(())
                }),
                element!("head", |el| {
                    if !injected.replace(true) {
                        el.append(&injection, ContentType::Html);
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|e| RewriteError::Html(e.to_string()))
}

/// Same-origin stylesheets become root-relative; foreign ones become
/// escape links.
fn stylesheet_href(href: &str, ctx: &HtmlContext<'_>) -> Option<String> {
    let resolved = ctx.page_url.join(href.trim()).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }

    if resolved.origin().ascii_serialization() == ctx.session_origin {
        let mut local = resolved.path().to_string();
        if let Some(query) = resolved.query() {
            local.push('?');
            local.push_str(query);
        }
        Some(local)
    } else {
        Some(escape_link(&resolved))
    }
}

fn injection(ctx: &HtmlContext<'_>, viewport_unit: &str) -> String {
    let globals = serde_json::json!({ "urlToProxy": ctx.bound_url }).to_string();

    let mut out = format!(
        "<style {}>:root{{{}}}{}</style><script>window.PageLayer = {};</script>",
        INJECTED_MARKER,
        viewport_unit,
        ctx.assets.style,
        escape_for_script(&globals)
    );
    for script in &ctx.assets.scripts {
        out.push_str("<script>");
        out.push_str(script);
        out.push_str("</script>");
    }
    out
}

#[cfg(test)]
#[path = "html_tests.rs"]
mod tests;
