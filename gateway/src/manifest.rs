use crate::directory::TenantSettings;
use serde::Serialize;

/// Platform logo used when a tenant has not uploaded one.
pub const DEFAULT_LOGO_URL: &str = "https://assets.mesa.example/logos/mesa-pwa.webp";

const DEFAULT_APP_NAME: &str = "Digital Menu";
const DEFAULT_SHORT_NAME: &str = "Menu";
const DEFAULT_THEME_COLOR: &str = "#ff6b35";
const BACKGROUND_COLOR: &str = "#0f0f0f";

pub const MANIFEST_CONTENT_TYPE: &str = "application/manifest+json";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: &'static str,
    #[serde(rename = "type")]
    pub mime_type: &'static str,
    pub purpose: &'static str,
}

/// Installable-app descriptor for one tenant's public menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub start_url: String,
    pub scope: String,
    pub id: String,
    pub display: &'static str,
    pub orientation: &'static str,
    pub background_color: &'static str,
    pub theme_color: String,
    pub lang: &'static str,
    pub dir: &'static str,
    pub categories: [&'static str; 2],
    pub icons: Vec<ManifestIcon>,
}

/// Detects the icon MIME type from the URL extension. Defaults to PNG.
fn detect_icon_mime(url: &str) -> &'static str {
    let lower = url.to_ascii_lowercase();
    if lower.contains(".webp") {
        "image/webp"
    } else if lower.contains(".jpg") || lower.contains(".jpeg") {
        "image/jpeg"
    } else if lower.contains(".svg") {
        "image/svg+xml"
    } else {
        "image/png"
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

/// Synthesizes the descriptor from tenant settings.
///
/// Every string field falls back to a sane default when the tenant field is
/// empty; the descriptor never carries an empty `name`.
pub fn build_manifest(slug: &str, settings: &TenantSettings) -> Manifest {
    let name = non_empty(&settings.app_name).unwrap_or_else(|| DEFAULT_APP_NAME.to_string());
    let short_name = non_empty(&settings.app_name).unwrap_or_else(|| DEFAULT_SHORT_NAME.to_string());
    let logo_url = non_empty(&settings.logo_url).unwrap_or_else(|| DEFAULT_LOGO_URL.to_string());
    let theme_color =
        non_empty(&settings.primary_color).unwrap_or_else(|| DEFAULT_THEME_COLOR.to_string());
    let mime_type = detect_icon_mime(&logo_url);

    Manifest {
        description: format!("Order online at {name}! Digital menu with up-to-date prices."),
        name,
        short_name,
        start_url: format!("/menu/{slug}?utm_source=pwa"),
        scope: format!("/menu/{slug}/"),
        id: format!("/menu/{slug}/"),
        display: "standalone",
        orientation: "portrait",
        background_color: BACKGROUND_COLOR,
        theme_color,
        lang: "pt-BR",
        dir: "ltr",
        categories: ["food", "shopping"],
        icons: vec![
            ManifestIcon {
                src: logo_url.clone(),
                sizes: "192x192",
                mime_type,
                purpose: "any",
            },
            ManifestIcon {
                src: logo_url.clone(),
                sizes: "512x512",
                mime_type,
                purpose: "any",
            },
            ManifestIcon {
                src: logo_url,
                sizes: "512x512",
                mime_type,
                purpose: "maskable",
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(app_name: Option<&str>, logo_url: Option<&str>) -> TenantSettings {
        TenantSettings {
            app_name: app_name.map(str::to_string),
            logo_url: logo_url.map(str::to_string),
            primary_color: None,
            public_slug: Some("joes-grill".to_string()),
        }
    }

    #[test]
    fn test_tenant_fields_flow_through() {
        let manifest = build_manifest(
            "joes-grill",
            &settings(Some("Joe's Grill"), Some("https://cdn.example/logo.webp")),
        );

        assert_eq!(manifest.name, "Joe's Grill");
        assert_eq!(manifest.start_url, "/menu/joes-grill?utm_source=pwa");
        assert_eq!(manifest.scope, "/menu/joes-grill/");
        assert_eq!(manifest.icons.len(), 3);
        assert_eq!(manifest.icons[0].src, "https://cdn.example/logo.webp");
        assert_eq!(manifest.icons[0].mime_type, "image/webp");
        assert_eq!(manifest.icons[2].purpose, "maskable");
        assert_eq!(manifest.icons[2].sizes, "512x512");
    }

    #[test]
    fn test_missing_logo_falls_back_to_default() {
        let manifest = build_manifest("joes-grill", &settings(Some("Joe's Grill"), None));
        assert_eq!(manifest.icons[0].src, DEFAULT_LOGO_URL);
        assert_eq!(manifest.name, "Joe's Grill");
    }

    #[test]
    fn test_name_is_never_empty() {
        let manifest = build_manifest("joes-grill", &settings(None, None));
        assert_eq!(manifest.name, DEFAULT_APP_NAME);
        assert_eq!(manifest.short_name, DEFAULT_SHORT_NAME);

        let manifest = build_manifest("joes-grill", &settings(Some(""), None));
        assert_eq!(manifest.name, DEFAULT_APP_NAME);
    }

    #[test]
    fn test_icon_mime_detection() {
        let cases = [
            ("https://cdn.example/a.webp", "image/webp"),
            ("https://cdn.example/a.JPG", "image/jpeg"),
            ("https://cdn.example/a.jpeg", "image/jpeg"),
            ("https://cdn.example/a.svg", "image/svg+xml"),
            ("https://cdn.example/a.png", "image/png"),
            ("https://cdn.example/no-extension", "image/png"),
        ];
        for (url, expected) in cases {
            assert_eq!(detect_icon_mime(url), expected);
        }
    }

    #[test]
    fn test_theme_color_defaults() {
        let manifest = build_manifest("joes-grill", &settings(Some("Joe's Grill"), None));
        assert_eq!(manifest.theme_color, DEFAULT_THEME_COLOR);
        assert_eq!(manifest.background_color, BACKGROUND_COLOR);
    }
}
