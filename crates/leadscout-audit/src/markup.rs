//! Schema.org and meta-tag checks over raw homepage HTML.

use std::sync::LazyLock;

use leadscout_core::MarkupChecks;
use regex::Regex;
use serde_json::Value;

static JSON_LD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid json-ld regex")
});
static ITEMTYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)itemtype\s*=\s*["']https?://schema\.org/([A-Za-z]+)["']"#)
        .expect("valid itemtype regex")
});
static RDFA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)vocab\s*=\s*["']https?://schema\.org/?["']"#).expect("valid rdfa regex")
});
static RDFA_TYPEOF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)typeof\s*=\s*["']([A-Za-z]+)["']"#).expect("valid typeof regex")
});
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid title regex"));
static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid meta regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
/// One quoted `name="value"` attribute; the name must follow whitespace.
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\s([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("valid attribute regex")
});

const TITLE_LEN: std::ops::RangeInclusive<usize> = 10..=70;
const DESCRIPTION_LEN: std::ops::RangeInclusive<usize> = 50..=160;

/// Schema.org types treated as an organisation or local-business identity.
const ORGANIZATION_TYPES: &[&str] = &[
    "Organization",
    "LocalBusiness",
    "Corporation",
    "ProfessionalService",
    "HomeAndConstructionBusiness",
    "MedicalBusiness",
    "LegalService",
    "AutomotiveBusiness",
    "AutoDealer",
    "AutoRepair",
    "Dentist",
    "Plumber",
    "Electrician",
    "HVACBusiness",
    "RoofingContractor",
    "GeneralContractor",
    "HealthAndBeautyBusiness",
    "FoodEstablishment",
    "Restaurant",
    "RealEstateAgent",
    "FinancialService",
    "InsuranceAgency",
];

/// Inspect HTML for structured data and meta-tag quality.
#[must_use]
pub fn check_markup(html: &str) -> MarkupChecks {
    let types = schema_types(html);
    let has_json_ld = JSON_LD_RE
        .captures_iter(html)
        .any(|c| c.get(1).is_some_and(|m| !m.as_str().trim().is_empty()));

    MarkupChecks {
        has_structured_data: has_json_ld
            || ITEMTYPE_RE.is_match(html)
            || RDFA_RE.is_match(html),
        has_faq_markup: types.iter().any(|t| t == "FAQPage"),
        has_organization_markup: types
            .iter()
            .any(|t| ORGANIZATION_TYPES.contains(&t.as_str())),
        meta_title_ok: title(html).is_some_and(|t| TITLE_LEN.contains(&t.chars().count())),
        meta_description_ok: meta_content(html, "name", "description")
            .is_some_and(|d| DESCRIPTION_LEN.contains(&d.chars().count())),
    }
}

/// Every Schema.org `@type` declared on the page, across JSON-LD, microdata
/// and RDFa.
fn schema_types(html: &str) -> Vec<String> {
    let mut types = Vec::new();
    for cap in JSON_LD_RE.captures_iter(html) {
        let raw = cap.get(1).map_or("", |m| m.as_str()).trim();
        if let Ok(value) = serde_json::from_str::<Value>(raw) {
            collect_types(&value, &mut types);
        }
    }
    for cap in ITEMTYPE_RE.captures_iter(html) {
        types.push(cap[1].to_string());
    }
    if RDFA_RE.is_match(html) {
        for cap in RDFA_TYPEOF_RE.captures_iter(html) {
            types.push(cap[1].to_string());
        }
    }
    types
}

fn collect_types(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            match map.get("@type") {
                Some(Value::String(t)) => out.push(t.clone()),
                Some(Value::Array(items)) => {
                    out.extend(items.iter().filter_map(Value::as_str).map(str::to_string));
                }
                _ => {}
            }
            for child in map.values() {
                collect_types(child, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_types(item, out);
            }
        }
        _ => {}
    }
}

/// Every raw JSON-LD block that parses, for freshness markers.
pub(crate) fn json_ld_values(html: &str) -> Vec<Value> {
    JSON_LD_RE
        .captures_iter(html)
        .filter_map(|c| serde_json::from_str::<Value>(c.get(1)?.as_str().trim()).ok())
        .collect()
}

pub(crate) fn title(html: &str) -> Option<String> {
    let raw = TITLE_RE.captures(html)?.get(1)?.as_str();
    let cleaned = WHITESPACE_RE.replace_all(raw, " ").trim().to_string();
    (!cleaned.is_empty()).then_some(cleaned)
}

pub(crate) fn meta_content(html: &str, key_attr: &str, key_value: &str) -> Option<String> {
    META_TAG_RE.find_iter(html).find_map(|m| {
        let tag = m.as_str();
        let key = extract_attr(tag, key_attr)?;
        if key.eq_ignore_ascii_case(key_value) {
            extract_attr(tag, "content").map(|c| WHITESPACE_RE.replace_all(&c, " ").trim().to_string())
        } else {
            None
        }
    })
}

pub(crate) fn extract_attr(tag: &str, attr: &str) -> Option<String> {
    ATTR_RE
        .captures_iter(tag)
        .find(|caps| caps[1].eq_ignore_ascii_case(attr))
        .and_then(|caps| caps.get(2).or_else(|| caps.get(3)))
        .map(|m| m.as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_PAGE: &str = r#"<!doctype html>
<html><head>
<title>Smith Family Dentistry | Austin Dentist</title>
<meta name="description" content="Gentle family and cosmetic dentistry in Austin, TX. Same-week appointments, most insurance accepted.">
<script type="application/ld+json">
{"@context":"https://schema.org","@graph":[
  {"@type":"Dentist","name":"Smith Family Dentistry"},
  {"@type":"FAQPage","mainEntity":[]}
]}
</script>
</head><body></body></html>"#;

    #[test]
    fn detects_json_ld_types() {
        let checks = check_markup(GOOD_PAGE);
        assert!(checks.has_structured_data);
        assert!(checks.has_faq_markup);
        assert!(checks.has_organization_markup);
        assert!(checks.meta_title_ok);
        assert!(checks.meta_description_ok);
    }

    #[test]
    fn bare_page_fails_every_check() {
        let checks = check_markup("<html><head><title>Home</title></head></html>");
        assert_eq!(checks, MarkupChecks::default());
    }

    #[test]
    fn microdata_counts_as_structured_data() {
        let html = r#"<div itemscope itemtype="https://schema.org/LocalBusiness"></div>"#;
        let checks = check_markup(html);
        assert!(checks.has_structured_data);
        assert!(checks.has_organization_markup);
        assert!(!checks.has_faq_markup);
    }

    #[test]
    fn rdfa_counts_as_structured_data() {
        let html = r#"<body vocab="https://schema.org/" typeof="Organization"></body>"#;
        let checks = check_markup(html);
        assert!(checks.has_structured_data);
        assert!(checks.has_organization_markup);
    }

    #[test]
    fn overlong_title_fails() {
        let long = "x".repeat(71);
        let html = format!("<title>{long}</title>");
        assert!(!check_markup(&html).meta_title_ok);
        let ok = format!("<title>{}</title>", "x".repeat(70));
        assert!(check_markup(&ok).meta_title_ok);
    }

    #[test]
    fn short_description_fails() {
        let html = r#"<meta content="Too short" name="description">"#;
        assert_eq!(meta_content(html, "name", "description").as_deref(), Some("Too short"));
        assert!(!check_markup(html).meta_description_ok);
    }

    #[test]
    fn prefixed_attribute_is_not_the_key() {
        let html = r#"<meta data-name="description" content="Decoy text that should never be read as the page description.">
<meta property='og:title' NAME='description' content='Real description'>"#;
        assert_eq!(meta_content(html, "name", "description").as_deref(), Some("Real description"));
        assert_eq!(extract_attr(r#"<meta data-name="x">"#, "name"), None);
    }

    #[test]
    fn malformed_json_ld_still_marks_structured_data() {
        let html = r#"<script type="application/ld+json">{ broken</script>"#;
        let checks = check_markup(html);
        assert!(checks.has_structured_data);
        assert!(!checks.has_organization_markup);
    }
}
