//! Resolution of an [`IndustryMode`] into concrete (locality, industry) pairs.

use std::collections::HashSet;

use leadscout_core::IndustryMode;

use crate::error::PipelineError;
use crate::traits::IndustrySource;

/// One discovery query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPair {
    pub locality: String,
    pub industry: String,
}

/// Industries for one locality under `mode`.
///
/// Hybrid mode is the discovered list followed by the manual additions,
/// de-duplicated case-insensitively with the discovered spelling kept.
///
/// # Errors
///
/// Returns [`PipelineError::IndustryDiscovery`] if auto-discovery fails.
pub async fn industries_for(
    mode: &IndustryMode,
    locality: &str,
    source: &dyn IndustrySource,
    max_industries: usize,
) -> Result<Vec<String>, PipelineError> {
    let discover = || async {
        source
            .top_industries(locality, max_industries)
            .await
            .map_err(|e| PipelineError::IndustryDiscovery {
                locality: locality.to_string(),
                reason: e.to_string(),
            })
    };

    let combined = match mode {
        IndustryMode::Auto => discover().await?,
        IndustryMode::Manual(list) => list.clone(),
        IndustryMode::Hybrid(extra) => {
            let mut all = discover().await?;
            all.extend(extra.iter().cloned());
            all
        }
    };
    Ok(dedupe(combined))
}

/// Every (locality, industry) pair for a run, localities in input order.
///
/// # Errors
///
/// - [`PipelineError::IndustryDiscovery`] if auto-discovery fails.
/// - [`PipelineError::NoIndustries`] if resolution yields no pairs.
pub async fn resolve_pairs(
    mode: &IndustryMode,
    localities: &[String],
    source: &dyn IndustrySource,
    max_industries: usize,
) -> Result<Vec<SearchPair>, PipelineError> {
    let mut pairs = Vec::new();
    for locality in localities {
        for industry in industries_for(mode, locality, source, max_industries).await? {
            pairs.push(SearchPair {
                locality: locality.clone(),
                industry,
            });
        }
    }
    if pairs.is_empty() {
        return Err(PipelineError::NoIndustries);
    }
    Ok(pairs)
}

fn dedupe(industries: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    industries
        .into_iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .filter(|i| seen.insert(i.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::traits::CapabilityError;

    struct FixedSource(Vec<&'static str>);

    #[async_trait]
    impl IndustrySource for FixedSource {
        async fn top_industries(
            &self,
            _locality: &str,
            k: usize,
        ) -> Result<Vec<String>, CapabilityError> {
            Ok(self.0.iter().take(k).map(|s| (*s).to_string()).collect())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl IndustrySource for FailingSource {
        async fn top_industries(
            &self,
            _locality: &str,
            _k: usize,
        ) -> Result<Vec<String>, CapabilityError> {
            Err("catalog offline".into())
        }
    }

    #[tokio::test]
    async fn hybrid_is_auto_then_manual_without_duplicates() {
        let source = FixedSource(vec!["auto dealers", "dentists", "plumbers"]);
        let mode = IndustryMode::Hybrid(vec![
            "Dentists".to_string(),
            "car washes".to_string(),
            "yoga studios".to_string(),
        ]);
        let got = industries_for(&mode, "Houston, TX", &source, 3).await.unwrap();
        assert_eq!(
            got,
            vec!["auto dealers", "dentists", "plumbers", "car washes", "yoga studios"]
        );
    }

    #[tokio::test]
    async fn manual_ignores_the_source() {
        let mode = IndustryMode::Manual(vec!["coffee shops".to_string()]);
        let got = industries_for(&mode, "Austin, TX", &FailingSource, 5)
            .await
            .unwrap();
        assert_eq!(got, vec!["coffee shops"]);
    }

    #[tokio::test]
    async fn auto_respects_max_industries() {
        let source = FixedSource(vec!["a", "b", "c", "d"]);
        let got = industries_for(&IndustryMode::Auto, "Reno, NV", &source, 2)
            .await
            .unwrap();
        assert_eq!(got, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn auto_failure_is_run_level() {
        let err = industries_for(&IndustryMode::Auto, "Reno, NV", &FailingSource, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::IndustryDiscovery { .. }));
    }

    #[tokio::test]
    async fn pairs_cover_every_locality() {
        let source = FixedSource(vec!["dentists", "plumbers"]);
        let localities = vec!["Austin, TX".to_string(), "Denver, CO".to_string()];
        let pairs = resolve_pairs(&IndustryMode::Auto, &localities, &source, 5)
            .await
            .unwrap();
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[2].locality, "Denver, CO");
        assert_eq!(pairs[2].industry, "dentists");
    }

    #[tokio::test]
    async fn empty_manual_list_is_no_industries() {
        let localities = vec!["Austin, TX".to_string()];
        let err = resolve_pairs(&IndustryMode::Manual(vec![]), &localities, &FailingSource, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoIndustries));
    }
}
