//! Ranked catalog of local-service industries for auto-discovery runs.
//!
//! Ranking favours industries with high customer value, heavy reliance on
//! local search, and a large share of template-built websites.

use crate::error::PlacesError;

const CATALOG: &[&str] = &[
    "auto dealers",
    "dentists",
    "plumbers",
    "roofing contractors",
    "hvac contractors",
    "personal injury lawyers",
    "med spas",
    "chiropractors",
    "real estate agents",
    "electricians",
    "landscaping services",
    "home remodeling contractors",
    "veterinarians",
    "daycare centers",
    "auto repair shops",
    "insurance agencies",
    "pest control services",
    "moving companies",
    "cleaning services",
    "orthodontists",
];

/// The `k` highest-ranked industries for `locality`.
///
/// # Errors
///
/// Returns [`PlacesError::InvalidQuery`] if `locality` is blank.
pub fn top_industries(locality: &str, k: usize) -> Result<Vec<String>, PlacesError> {
    if locality.trim().is_empty() {
        return Err(PlacesError::InvalidQuery("locality is blank".to_string()));
    }
    Ok(CATALOG.iter().take(k).map(|s| (*s).to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_exactly_k() {
        let top = top_industries("Houston, TX", 5).unwrap();
        assert_eq!(top.len(), 5);
        assert_eq!(top[0], "auto dealers");
    }

    #[test]
    fn k_larger_than_catalog_returns_everything() {
        let all = top_industries("Houston, TX", 500).unwrap();
        assert_eq!(all.len(), CATALOG.len());
    }

    #[test]
    fn blank_locality_is_rejected() {
        assert!(matches!(
            top_industries(" ", 3),
            Err(PlacesError::InvalidQuery(_))
        ));
    }

    #[test]
    fn catalog_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        assert!(CATALOG.iter().all(|c| seen.insert(c.to_lowercase())));
    }
}
