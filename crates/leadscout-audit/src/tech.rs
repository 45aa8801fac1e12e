//! Platform fingerprinting from response headers and HTML signatures.

use crate::fetch::Homepage;
use crate::markup::meta_content;

struct Fingerprint {
    platform: &'static str,
    headers: &'static [(&'static str, &'static str)],
    body: &'static [&'static str],
}

/// Checked in order; the first platform with any matching signature wins.
const FINGERPRINTS: &[Fingerprint] = &[
    Fingerprint {
        platform: "Shopify",
        headers: &[("x-shopid", ""), ("x-shopify-stage", ""), ("server", "shopify")],
        body: &["cdn.shopify.com", "shopify.theme", "myshopify.com"],
    },
    Fingerprint {
        platform: "Wix",
        headers: &[("x-wix-request-id", "")],
        body: &["static.wixstatic.com", "wix.com website builder", "_wixcssimports"],
    },
    Fingerprint {
        platform: "Squarespace",
        headers: &[("server", "squarespace")],
        body: &["static1.squarespace.com", "squarespace.com", "sqs-block"],
    },
    Fingerprint {
        platform: "Webflow",
        headers: &[],
        body: &["data-wf-page", "data-wf-site", "assets.website-files.com", "webflow.js"],
    },
    Fingerprint {
        platform: "Weebly",
        headers: &[],
        body: &["weebly.com", "editmysite.com"],
    },
    Fingerprint {
        platform: "GoDaddy",
        headers: &[],
        body: &["img1.wsimg.com", "godaddy website builder", "websites.godaddy.com"],
    },
    Fingerprint {
        platform: "WordPress",
        headers: &[("link", "api.w.org"), ("x-powered-by", "wp engine")],
        body: &["wp-content/", "wp-includes/", "wp-json"],
    },
    Fingerprint {
        platform: "Drupal",
        headers: &[("x-generator", "drupal")],
        body: &["drupal-settings-json", "/sites/default/files/", "drupal.js"],
    },
    Fingerprint {
        platform: "Joomla",
        headers: &[],
        body: &["/media/jui/", "joomla!", "/components/com_"],
    },
];

/// Identify the site's platform, or `None` when nothing conclusive matches.
#[must_use]
pub fn detect_tech_stack(page: &Homepage) -> Option<String> {
    if let Some(generator) = meta_content(&page.body, "name", "generator") {
        let lowered = generator.to_ascii_lowercase();
        if let Some(fp) = FINGERPRINTS
            .iter()
            .find(|fp| lowered.contains(&fp.platform.to_ascii_lowercase()))
        {
            return Some(fp.platform.to_string());
        }
    }

    let body = page.body.to_ascii_lowercase();
    FINGERPRINTS
        .iter()
        .find(|fp| header_match(page, fp) || fp.body.iter().any(|sig| body.contains(sig)))
        .map(|fp| fp.platform.to_string())
}

fn header_match(page: &Homepage, fp: &Fingerprint) -> bool {
    fp.headers.iter().any(|(name, needle)| {
        page.header(name)
            .is_some_and(|value| value.to_ascii_lowercase().contains(needle))
    })
}
