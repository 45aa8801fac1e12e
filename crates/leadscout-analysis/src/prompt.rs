//! Prompt construction and answer parsing for deep analysis.

use std::sync::LazyLock;

use leadscout_core::DeepAnalysis;
use regex::Regex;
use serde_json::Value;

use crate::error::AnalysisError;

static SCRIPT_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|noscript|svg)\b[^>]*>.*?</(script|style|noscript|svg)>")
        .expect("valid script/style regex")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").expect("valid tag regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Page text budget sent to the model, in bytes.
pub const MAX_PAGE_TEXT_BYTES: usize = 12_000;

pub(crate) const SYSTEM_PROMPT: &str = "You are a senior local-SEO consultant preparing a sales \
call. You answer with a single JSON object and nothing else.";

/// Visible text of an HTML page with markup, scripts and styles removed.
#[must_use]
pub fn page_text(html: &str) -> String {
    let without_code = SCRIPT_STYLE_RE.replace_all(html, " ");
    let without_tags = TAG_RE.replace_all(&without_code, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">");
    WHITESPACE_RE.replace_all(&decoded, " ").trim().to_string()
}

/// Truncate a string to at most `max_bytes` bytes at a character boundary.
#[must_use]
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

pub(crate) fn build_prompt(name: &str, industry: &str, url: &str, text: &str) -> String {
    let text = truncate_to_char_boundary(text, MAX_PAGE_TEXT_BYTES);
    format!(
        r#"Analyse the homepage of a local business as a sales opportunity for SEO and website services.

Business: {name}
Industry: {industry}
Website: {url}

Homepage text:
"""
{text}
"""

Return JSON with exactly these keys:
- "seo_score": integer 0-100, overall SEO health (higher is healthier)
- "critical_issues": array of the most damaging problems
- "revenue_impact": short estimate of monthly revenue lost to these problems
- "opportunities": array of growth opportunities
- "services_offered": array of services the business sells
- "unique_selling_proposition": one sentence
- "cta_quality": one of "Strong", "Weak", "Missing"
- "target_keywords": array of keywords the site currently targets
- "missing_keywords": array of high-intent local keywords it should target
- "content_quality": one or two sentences
- "quick_wins": array of fixes deliverable in the first two weeks
- "pitch_angle": two or three sentences to open a sales call"#
    )
}

/// Strip markdown code fences from a model answer.
fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Parse the model's JSON answer, tolerating code fences, surrounding prose
/// and a score given as a string or outside 0-100.
///
/// # Errors
///
/// Returns [`AnalysisError::Deserialize`] if no JSON object can be read.
pub fn parse_analysis(raw: &str) -> Result<DeepAnalysis, AnalysisError> {
    let stripped = strip_code_blocks(raw);
    let candidate = match (stripped.find('{'), stripped.rfind('}')) {
        (Some(start), Some(end)) if end > start => &stripped[start..=end],
        _ => stripped,
    };

    let mut value: Value =
        serde_json::from_str(candidate).map_err(|e| AnalysisError::Deserialize {
            context: "deep analysis answer".to_string(),
            source: e,
        })?;

    if let Some(obj) = value.as_object_mut() {
        let score = obj.get("seo_score").and_then(normalise_score);
        obj.insert(
            "seo_score".to_string(),
            score.map_or(Value::Null, Value::from),
        );
    }

    serde_json::from_value::<DeepAnalysis>(value)
        .map(DeepAnalysis::normalized)
        .map_err(|e| AnalysisError::Deserialize {
            context: "deep analysis fields".to_string(),
            source: e,
        })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn normalise_score(value: &Value) -> Option<u8> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches("/100").trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then(|| n.round().clamp(0.0, 100.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_text_drops_markup() {
        let html = r"<html><head><style>body{color:red}</style><script>var x = 1;</script></head>
<body><h1>Denver&nbsp;Plumbing</h1><p>24/7   emergency &amp; repair</p></body></html>";
        assert_eq!(page_text(html), "Denver Plumbing 24/7 emergency & repair");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let text = "Hello 世界";
        let truncated = truncate_to_char_boundary(text, 8);
        assert!(truncated.len() <= 8);
        assert!(text.starts_with(truncated));
        assert_eq!(truncate_to_char_boundary("Hello", 100), "Hello");
    }

    #[test]
    fn prompt_mentions_business_and_keys() {
        let prompt = build_prompt("Bob's Plumbing", "plumbers", "https://bob.example", "We fix pipes");
        assert!(prompt.contains("Business: Bob's Plumbing"));
        assert!(prompt.contains("We fix pipes"));
        assert!(prompt.contains("\"pitch_angle\""));
    }

    #[test]
    fn parses_fenced_answer() {
        let raw = "```json\n{\"seo_score\": 38, \"critical_issues\": [\"22s load time\"], \"cta_quality\": \"Missing\"}\n```";
        let analysis = parse_analysis(raw).unwrap();
        assert_eq!(analysis.seo_score, Some(38));
        assert_eq!(analysis.critical_issues, vec!["22s load time"]);
        assert_eq!(analysis.cta_quality.as_deref(), Some("Missing"));
        assert!(analysis.quick_wins.is_empty());
    }

    #[test]
    fn parses_answer_wrapped_in_prose() {
        let raw = "Here is the analysis:\n{\"pitch_angle\": \"Your site is slow.\"}\nLet me know!";
        let analysis = parse_analysis(raw).unwrap();
        assert_eq!(analysis.pitch_angle.as_deref(), Some("Your site is slow."));
    }

    #[test]
    fn blank_answers_are_absent() {
        let analysis =
            parse_analysis(r#"{"revenue_impact": "", "content_quality": "  ", "pitch_angle": "Slow site"}"#)
                .unwrap();
        assert_eq!(analysis.revenue_impact, None);
        assert_eq!(analysis.content_quality, None);
        assert_eq!(analysis.pitch_angle.as_deref(), Some("Slow site"));
    }

    #[test]
    fn score_is_normalised() {
        assert_eq!(parse_analysis(r#"{"seo_score": "45/100"}"#).unwrap().seo_score, Some(45));
        assert_eq!(parse_analysis(r#"{"seo_score": 420}"#).unwrap().seo_score, Some(100));
        assert_eq!(parse_analysis(r#"{"seo_score": "n/a"}"#).unwrap().seo_score, None);
    }

    #[test]
    fn non_json_answer_is_an_error() {
        assert!(matches!(
            parse_analysis("I cannot analyse this site."),
            Err(AnalysisError::Deserialize { .. })
        ));
    }
}
