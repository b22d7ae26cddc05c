// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Concurrent cache of compiled type descriptors.
//!
//! Entries are keyed by `TypeId` and never evicted: a descriptor lives as
//! long as the compiler owning the cache. Publication is get-or-insert, so
//! when two threads compile the same type concurrently, the first insert wins
//! and every caller observes that same `Arc`.

use super::descriptor::CompiledType;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::any::TypeId;
use std::sync::Arc;

/// Cache hit/miss and publication statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Descriptors inserted into the cache.
    pub published: u64,
    /// Descriptors compiled by a losing racer and dropped.
    pub discarded: u64,
}

pub struct TypeCache {
    entries: DashMap<TypeId, Arc<CompiledType>>,
    stats: RwLock<CacheStats>,
}

impl TypeCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    pub fn get(&self, type_id: TypeId) -> Option<Arc<CompiledType>> {
        let found = self.entries.get(&type_id).map(|e| Arc::clone(e.value()));
        let mut stats = self.stats.write();
        if found.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        found
    }

    /// Insert unless an entry already exists; return the entry in the cache.
    pub fn publish(&self, compiled: CompiledType) -> Arc<CompiledType> {
        let type_id = compiled.type_id();
        let candidate = Arc::new(compiled);
        let winner = Arc::clone(
            self.entries
                .entry(type_id)
                .or_insert_with(|| Arc::clone(&candidate))
                .value(),
        );

        let mut stats = self.stats.write();
        if Arc::ptr_eq(&winner, &candidate) {
            stats.published += 1;
            log::debug!("[contract] published {}", winner.type_name());
        } else {
            stats.discarded += 1;
            log::debug!(
                "[contract] discarded concurrent compile of {}",
                winner.type_name()
            );
        }
        winner
    }

    pub fn contains(&self, type_id: TypeId) -> bool {
        self.entries.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        *self.stats.read()
    }
}

impl Default for TypeCache {
    fn default() -> Self {
        Self::new()
    }
}
