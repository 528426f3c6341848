use crate::config::ServerConfig;
use crate::convert::{ConvertError, ConvertOptions, Rendered, Target, render};
use crate::negotiate::{Format, Scope};
use crate::vocabulary::{Vocabulary, VocabularyError};
use lru::LruCache;
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

/// Identity of a rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderKey {
    pub scope: Scope,
    pub name: Option<String>,
    pub format: Format,
}

impl RenderKey {
    pub fn new(target: Target<'_>, format: Format) -> Self {
        Self {
            scope: target.scope(),
            name: target.name().map(str::to_string),
            format,
        }
    }
}

impl fmt::Display for RenderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}/{}.{}", self.scope.as_str(), name, self.format),
            None => write!(f, "{}.{}", self.scope.as_str(), self.format),
        }
    }
}

/// Shared server state: the immutable vocabulary and the render cache.
pub struct AppState {
    config: Arc<ServerConfig>,
    vocabulary: Arc<Vocabulary>,
    options: ConvertOptions,
    /// Keyed by the format actually served, so fallbacks share entries
    cache: RwLock<LruCache<RenderKey, Arc<Rendered>>>,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl AppState {
    pub fn new(config: Arc<ServerConfig>, vocabulary: Arc<Vocabulary>) -> Self {
        let capacity = NonZeroUsize::new(config.cache_capacity).unwrap_or(NonZeroUsize::MIN);
        let options = config.convert_options();

        Self {
            config,
            vocabulary,
            options,
            cache: RwLock::new(LruCache::new(capacity)),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
        }
    }

    /// Loads the configured vocabulary, or the bundled one, and reports
    /// dangling references without rejecting them.
    pub fn load(config: Arc<ServerConfig>) -> Result<Self, VocabularyError> {
        let vocabulary = match config.vocabulary_path.as_deref() {
            Some(path) => Vocabulary::load(path)?,
            None => {
                let vocabulary = Vocabulary::embedded()?;
                info!(
                    version = %vocabulary.version,
                    classes = vocabulary.classes.len(),
                    properties = vocabulary.properties.len(),
                    "using bundled vocabulary"
                );
                vocabulary
            }
        };

        for dangling in vocabulary.dangling_references() {
            warn!(
                kind = %dangling.kind,
                term = %dangling.term,
                field = dangling.field,
                reference = %dangling.reference,
                "reference names no class in the vocabulary"
            );
        }

        Ok(Self::new(config, Arc::new(vocabulary)))
    }

    pub fn config(&self) -> Arc<ServerConfig> {
        self.config.clone()
    }

    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocabulary
    }

    pub fn convert_options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Renders a document, serving repeated requests from the LRU cache.
    ///
    /// Misses for unknown names are not cached.
    pub fn render(&self, target: Target<'_>, requested: Format) -> Result<Arc<Rendered>, ConvertError> {
        let served = crate::negotiate::select_converter(target.scope(), requested).format;
        let key = RenderKey::new(target, served);

        let hit = self.cache.read().peek(&key).cloned();
        if let Some(entry) = hit {
            // Recency is best effort: a contended write lock skips the promotion
            if let Some(mut cache) = self.cache.try_write() {
                cache.promote(&key);
            }
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            crate::metrics::METRICS.record_cache_hit();
            crate::log_cache_operation!(hit, key, "render cache");
            return Ok(entry);
        }

        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        crate::metrics::METRICS.record_cache_miss();
        crate::log_cache_operation!(miss, key, "render cache");

        let rendered = Arc::new(render(&self.vocabulary, target, served, &self.options)?);
        let entries = {
            let mut cache = self.cache.write();
            cache.put(key, rendered.clone());
            cache.len()
        };
        crate::metrics::METRICS.update_cache_entries(entries);
        Ok(rendered)
    }

    pub fn cache_stats(&self) -> CacheStats {
        let cache = self.cache.read();
        CacheStats {
            hits: self.cache_hits.load(Ordering::Relaxed),
            misses: self.cache_misses.load(Ordering::Relaxed),
            size: cache.len(),
            capacity: cache.cap().get(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::fixtures;

    fn state(capacity: usize) -> AppState {
        let config = ServerConfig {
            cache_capacity: capacity,
            ..Default::default()
        };
        AppState::new(Arc::new(config), Arc::new(fixtures::vocabulary()))
    }

    #[test]
    fn repeated_renders_hit_the_cache() {
        let state = state(4);
        let first = state.render(Target::Class("Course"), Format::Turtle).unwrap();
        let second = state.render(Target::Class("Course"), Format::Turtle).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let stats = state.cache_stats();
        assert_eq!((stats.hits, stats.misses, stats.size), (1, 1, 1));
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn fallback_formats_share_an_entry() {
        let state = state(4);
        state.render(Target::Vocabulary, Format::Rdfa).unwrap();
        state.render(Target::Vocabulary, Format::Json).unwrap();
        assert_eq!(state.cache_stats().size, 1);
        assert_eq!(state.cache_stats().hits, 1);
    }

    #[test]
    fn unknown_names_are_not_cached() {
        let state = state(4);
        assert!(state.render(Target::Property("missing"), Format::Json).is_err());
        assert_eq!(state.cache_stats().size, 0);
    }

    #[test]
    fn capacity_bounds_the_cache() {
        let state = state(2);
        for format in [Format::Json, Format::JsonLd, Format::Turtle] {
            state.render(Target::Class("Course"), format).unwrap();
        }
        let stats = state.cache_stats();
        assert_eq!(stats.size, 2);
        assert_eq!(stats.capacity, 2);
    }

    #[test]
    fn hits_refresh_recency() {
        let state = state(2);
        state.render(Target::Class("Course"), Format::Json).unwrap();
        state.render(Target::Class("Course"), Format::Turtle).unwrap();
        state.render(Target::Class("Course"), Format::Json).unwrap();
        state.render(Target::Class("Course"), Format::NTriples).unwrap();

        let cache = state.cache.read();
        assert!(cache.contains(&RenderKey::new(Target::Class("Course"), Format::Json)));
        assert!(!cache.contains(&RenderKey::new(Target::Class("Course"), Format::Turtle)));
    }

    #[test]
    fn concurrent_hits_share_the_read_lock() {
        let state = Arc::new(state(4));
        let first = state.render(Target::Vocabulary, Format::Turtle).unwrap();

        // Hits complete while another reader holds the cache
        let reader = state.cache.read();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let state = state.clone();
                std::thread::spawn(move || state.render(Target::Vocabulary, Format::Turtle).unwrap())
            })
            .collect();
        for handle in handles {
            assert!(Arc::ptr_eq(&handle.join().unwrap(), &first));
        }
        drop(reader);
        assert_eq!(state.cache_stats().hits, 4);
    }

    #[test]
    fn served_json_is_pretty_by_default() {
        let state = state(1);
        let rendered = state.render(Target::Class("Course"), Format::Json).unwrap();
        assert!(rendered.body.starts_with("{\n  \"className\": \"Course\""));
    }

    #[test]
    fn bundled_vocabulary_loads_without_a_path() {
        let state = AppState::load(Arc::new(ServerConfig::default())).unwrap();
        assert!(state.vocabulary().class("Course").is_some());
    }
}
