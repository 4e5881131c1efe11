//! Short-lived server-side registries: pending navigations and the
//! per-document link cache.
//!
//! Both are bounded maps with oldest-first eviction, owned by the server
//! layer. The navigation registry hands out generated link ids that command
//! URIs carry back when the user clicks a link; the cache is a pure
//! optimization keyed by document identity and version.

use std::collections::{HashMap, VecDeque};

use nanoid::nanoid;
use tower_lsp::lsp_types::{DocumentLink, Url};

use crate::links::LinkTarget;

/// Targets for links the client may still click, keyed by generated id.
pub struct NavigationRegistry {
    capacity: usize,
    entries: HashMap<String, LinkTarget>,
    order: VecDeque<String>,
}

impl NavigationRegistry {
    pub fn new(capacity: usize) -> NavigationRegistry {
        NavigationRegistry {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Store a target and return the id a command URI should carry.
    pub fn register(&mut self, target: LinkTarget) -> String {
        let id = nanoid!();
        self.entries.insert(id.clone(), target);
        self.order.push_back(id.clone());

        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }

        id
    }

    pub fn get(&self, id: &str) -> Option<&LinkTarget> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Computed document links for one version of one document.
struct CachedLinks {
    version: i32,
    links: Vec<DocumentLink>,
}

/// Bounded cache of computed links, invalidated by version mismatch.
pub struct LinkCache {
    capacity: usize,
    entries: HashMap<Url, CachedLinks>,
    order: VecDeque<Url>,
}

impl LinkCache {
    pub fn new(capacity: usize) -> LinkCache {
        LinkCache {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn get(&self, uri: &Url, version: i32) -> Option<&[DocumentLink]> {
        self.entries
            .get(uri)
            .filter(|cached| cached.version == version)
            .map(|cached| cached.links.as_slice())
    }

    pub fn insert(&mut self, uri: Url, version: i32, links: Vec<DocumentLink>) {
        if self.entries.insert(uri.clone(), CachedLinks { version, links }).is_none() {
            self.order.push_back(uri);
        }

        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn remove(&mut self, uri: &Url) {
        self.entries.remove(uri);
        self.order.retain(|entry| entry != uri);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn target(name: &str) -> LinkTarget {
        LinkTarget::File(PathBuf::from(name))
    }

    #[test]
    fn registry_round_trips_targets() {
        let mut registry = NavigationRegistry::new(8);
        let id = registry.register(target("a.cshtml"));
        assert_eq!(registry.get(&id), Some(&target("a.cshtml")));
        assert_eq!(registry.get("missing"), None);
    }

    #[test]
    fn registry_evicts_oldest_first() {
        let mut registry = NavigationRegistry::new(2);
        let first = registry.register(target("first"));
        let second = registry.register(target("second"));
        let third = registry.register(target("third"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(&first), None);
        assert!(registry.get(&second).is_some());
        assert!(registry.get(&third).is_some());
    }

    #[test]
    fn cache_misses_on_version_change() {
        let mut cache = LinkCache::new(4);
        let uri = Url::parse("file:///tmp/HomeController.cs").unwrap();

        cache.insert(uri.clone(), 1, vec![]);
        assert!(cache.get(&uri, 1).is_some());
        assert!(cache.get(&uri, 2).is_none());
    }

    #[test]
    fn cache_evicts_oldest_document() {
        let mut cache = LinkCache::new(2);
        let a = Url::parse("file:///a.cs").unwrap();
        let b = Url::parse("file:///b.cs").unwrap();
        let c = Url::parse("file:///c.cs").unwrap();

        cache.insert(a.clone(), 1, vec![]);
        cache.insert(b.clone(), 1, vec![]);
        cache.insert(c.clone(), 1, vec![]);

        assert!(cache.get(&a, 1).is_none());
        assert!(cache.get(&b, 1).is_some());
        assert!(cache.get(&c, 1).is_some());
    }
}
