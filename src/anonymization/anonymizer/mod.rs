//! Replacement strategies
//!
//! A strategy turns an original identifier into its replacement. Results are
//! memoized through the [`MappingStore`] by [`create_mapping`].

pub mod sequential;
pub mod structure;

use crate::anonymization::mapping::MappingStore;

/// Trait for replacement strategy implementations
pub trait ReplacementStrategy: Send + Sync {
    /// Produce a replacement for `original`.
    ///
    /// `prefix` is the category prefix; `store` is the current mapping store,
    /// which stateful strategies may consult.
    fn generate(&self, original: &str, prefix: &str, store: &MappingStore) -> String;

    /// Short name used in logs and reports
    fn name(&self) -> &'static str;
}

/// Return the stored replacement for `original`, or generate and store a new one
pub fn create_mapping(
    strategy: &dyn ReplacementStrategy,
    store: &mut MappingStore,
    original: &str,
    prefix: &str,
) -> String {
    if let Some(existing) = store.get(original) {
        return existing.to_string();
    }

    let replacement = strategy.generate(original, prefix, store);
    tracing::trace!(
        prefix,
        strategy = strategy.name(),
        replacement = %replacement,
        "Created mapping"
    );
    store.insert(original, replacement.clone());
    replacement
}
