//! Scripts and styles injected into proxied HTML.

use rust_embed::RustEmbed;

use crate::error::ProxyError;

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Embedded;

/// Injection order matters: later scripts use globals of earlier ones.
const SCRIPTS: &[&str] = &[
    "debounce.js",
    "shared.js",
    "block_navigation.js",
    "text_layer.js",
    "link_preview.js",
];

const STYLE: &str = "block_navigation.css";

/// Embedded injection assets, decoded once at startup.
#[derive(Debug, Clone)]
pub struct InjectedAssets {
    pub style: String,
    pub scripts: Vec<String>,
}

impl InjectedAssets {
    pub fn load() -> Result<Self, ProxyError> {
        let style = read(STYLE)?;
        let scripts = SCRIPTS
            .iter()
            .map(|name| read(name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { style, scripts })
    }
}

fn read(name: &str) -> Result<String, ProxyError> {
    let file = Embedded::get(name).ok_or_else(|| ProxyError::AssetMissing(name.to_string()))?;
    String::from_utf8(file.data.into_owned())
        .map_err(|_| ProxyError::AssetMissing(format!("{} is not UTF-8", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_all_assets() {
        let assets = InjectedAssets::load().unwrap();
        assert_eq!(assets.scripts.len(), SCRIPTS.len());
        assert!(assets.style.contains(".pagelayer-link-popup"));
        assert!(assets.scripts[0].contains("pagelayerDebounce"));
        assert!(assets.scripts[3].contains("selectionData"));
    }

    #[test]
    fn test_missing_asset() {
        assert!(matches!(read("nope.js"), Err(ProxyError::AssetMissing(_))));
    }
}
