use std::collections::{BTreeSet, HashMap};

use crate::{
    rules::pattern::{OwnerMatcher, SignaturePattern},
    scanner::SymbolicReference,
    Result,
};

/// An immutable, validated set of signature patterns, indexed by owner.
///
/// Built once before scanning and shared by reference across all scan tasks. Patterns with
/// an exact owner are found through a hash lookup; prefix patterns are checked in turn.
/// Several patterns may share a rule id.
///
/// # Examples
///
/// ```rust
/// use jarscope::{
///     rules::{RuleCatalog, SignaturePattern},
///     scanner::{ReferenceKind, SymbolicReference},
/// };
///
/// let catalog = RuleCatalog::new([
///     SignaturePattern::method("okhttp", "okhttp3/Call", "execute", "()Lokhttp3/Response;"),
///     SignaturePattern::package("okhttp-any", "okhttp3"),
/// ])?;
///
/// let call = SymbolicReference::member(
///     ReferenceKind::InvokeInterface,
///     "okhttp3/Call",
///     "execute",
///     "()Lokhttp3/Response;",
/// );
/// assert_eq!(catalog.match_reference(&call), ["okhttp", "okhttp-any"]);
/// # Ok::<(), jarscope::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    patterns: Vec<SignaturePattern>,
    by_owner: HashMap<String, Vec<usize>>,
    by_prefix: Vec<(String, usize)>,
    rule_ids: BTreeSet<String>,
}

impl RuleCatalog {
    /// Validate `patterns` and build the lookup index.
    ///
    /// # Errors
    /// Returns [`crate::Error::Catalog`] for the first invalid pattern.
    pub fn new(patterns: impl IntoIterator<Item = SignaturePattern>) -> Result<Self> {
        let mut catalog = RuleCatalog::default();
        for pattern in patterns {
            pattern.validate()?;

            let position = catalog.patterns.len();
            match &pattern.owner {
                OwnerMatcher::Exact(owner) => catalog
                    .by_owner
                    .entry(owner.clone())
                    .or_default()
                    .push(position),
                OwnerMatcher::Prefix(prefix) => catalog.by_prefix.push((prefix.clone(), position)),
            }
            catalog.rule_ids.insert(pattern.rule_id.clone());
            catalog.patterns.push(pattern);
        }

        log::debug!(
            "rule catalog: {} patterns for {} rules ({} exact owners, {} prefixes)",
            catalog.patterns.len(),
            catalog.rule_ids.len(),
            catalog.by_owner.len(),
            catalog.by_prefix.len()
        );
        Ok(catalog)
    }

    /// A catalog without patterns; every scan against it yields no findings.
    #[must_use]
    pub fn empty() -> Self {
        RuleCatalog::default()
    }

    /// Number of patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the catalog has no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns in the order they were supplied.
    #[must_use]
    pub fn patterns(&self) -> &[SignaturePattern] {
        &self.patterns
    }

    /// Distinct rule ids, sorted.
    pub fn rule_ids(&self) -> impl Iterator<Item = &str> {
        self.rule_ids.iter().map(String::as_str)
    }

    /// Every pattern that matches `reference`, in catalog order.
    #[must_use]
    pub fn matching_patterns(&self, reference: &SymbolicReference<'_>) -> Vec<&SignaturePattern> {
        let exact = self
            .by_owner
            .get(reference.owner)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .copied();
        let prefixed = self
            .by_prefix
            .iter()
            .filter(|(prefix, _)| reference.owner.starts_with(prefix.as_str()))
            .map(|(_, position)| *position);

        let mut candidates: Vec<usize> = exact.chain(prefixed).collect();
        candidates.sort_unstable();
        candidates
            .into_iter()
            .map(|position| &self.patterns[position])
            .filter(|pattern| pattern.matches(reference))
            .collect()
    }

    /// Rule ids of every pattern matching `reference`, sorted and without duplicates.
    ///
    /// The result depends only on the set of patterns, never on their order.
    #[must_use]
    pub fn match_reference(&self, reference: &SymbolicReference<'_>) -> Vec<&str> {
        let mut rules: Vec<&str> = self
            .matching_patterns(reference)
            .into_iter()
            .map(|pattern| pattern.rule_id.as_str())
            .collect();
        rules.sort_unstable();
        rules.dedup();
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        rules::OwnerMatcher,
        scanner::{ReferenceKind, ReferenceKinds},
        Error,
    };

    fn patterns() -> Vec<SignaturePattern> {
        vec![
            SignaturePattern::method("R1", "okhttp3/Call", "execute", "()Lokhttp3/Response;"),
            SignaturePattern::package("okhttp", "okhttp3"),
            SignaturePattern::new("R1", OwnerMatcher::parse("okhttp3/Call")),
            SignaturePattern::new("ctor", OwnerMatcher::parse("okhttp3/*"))
                .with_kinds(ReferenceKinds::NEW_INSTANCE),
            SignaturePattern::method("other", "java/lang/String", "length", "()I"),
        ]
    }

    #[test]
    fn matches_are_sorted_and_deduplicated() {
        let catalog = RuleCatalog::new(patterns()).unwrap();
        assert_eq!(catalog.len(), 5);
        assert_eq!(
            catalog.rule_ids().collect::<Vec<_>>(),
            ["R1", "ctor", "okhttp", "other"]
        );

        let call = SymbolicReference::member(
            ReferenceKind::InvokeVirtual,
            "okhttp3/Call",
            "execute",
            "()Lokhttp3/Response;",
        );
        assert_eq!(catalog.match_reference(&call), ["R1", "okhttp"]);
        assert_eq!(catalog.matching_patterns(&call).len(), 3);

        let new = SymbolicReference::type_only(ReferenceKind::NewInstance, "okhttp3/OkHttpClient");
        assert_eq!(catalog.match_reference(&new), ["ctor", "okhttp"]);

        let unrelated = SymbolicReference::type_only(ReferenceKind::CheckCast, "java/util/List");
        assert!(catalog.match_reference(&unrelated).is_empty());
    }

    #[test]
    fn order_does_not_change_matches() {
        let forward = RuleCatalog::new(patterns()).unwrap();
        let mut reversed_patterns = patterns();
        reversed_patterns.reverse();
        let reversed = RuleCatalog::new(reversed_patterns).unwrap();

        let references = [
            SymbolicReference::member(
                ReferenceKind::InvokeVirtual,
                "okhttp3/Call",
                "execute",
                "()Lokhttp3/Response;",
            ),
            SymbolicReference::type_only(ReferenceKind::NewInstance, "okhttp3/Request"),
            SymbolicReference::member(ReferenceKind::InvokeVirtual, "java/lang/String", "length", "()I"),
        ];
        for reference in &references {
            assert_eq!(forward.match_reference(reference), reversed.match_reference(reference));
        }
    }

    #[test]
    fn invalid_pattern_rejects_catalog() {
        let mut all = patterns();
        all.push(SignaturePattern::method("broken", "a/B", "m", "(X)V"));
        match RuleCatalog::new(all) {
            Err(Error::Catalog { rule_id, .. }) => assert_eq!(rule_id, "broken"),
            other => panic!("expected Catalog error, got {other:?}"),
        }
    }

    #[test]
    fn empty_catalog_matches_nothing() {
        let catalog = RuleCatalog::empty();
        assert!(catalog.is_empty());
        let call = SymbolicReference::member(ReferenceKind::InvokeStatic, "a/B", "c", "()V");
        assert!(catalog.match_reference(&call).is_empty());
    }
}
