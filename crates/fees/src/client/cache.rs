//! In-memory fee package cache.
//!
//! Lookup cache mapping a package key to a previously fetched package
//! definition. Entries never expire; a refresh replaces the entry
//! wholesale. The read-through policy (fetch on miss, populate on success
//! only) lives in the client, not here.
//!
//! Concurrent misses for the same key may both fetch and both write -
//! last write wins, which is harmless because fetches are idempotent.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::models::{FeeCalculationContext, FeePackage};

/// Cache key: a package is scoped to the tenancy it was fetched under.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PackageKey {
    package_id: String,
    organization_id: String,
    ledger_id: String,
    segment_id: Option<String>,
}

impl PackageKey {
    /// Build the key for a package under a tenancy context.
    pub fn new(package_id: &str, context: &FeeCalculationContext) -> Self {
        Self {
            package_id: package_id.to_string(),
            organization_id: context.organization_id.clone(),
            ledger_id: context.ledger_id.clone(),
            segment_id: context.segment_id.clone(),
        }
    }

    /// The package id this key refers to.
    pub fn package_id(&self) -> &str {
        &self.package_id
    }
}

#[derive(Clone, Debug)]
struct CacheEntry {
    package: FeePackage,
    inserted_at: DateTime<Utc>,
}

/// Process-lifetime package cache.
pub struct FeePackageCache {
    entries: Mutex<HashMap<PackageKey, CacheEntry>>,
}

impl FeePackageCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PackageKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Package cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Pure lookup; no side effects, no expiry.
    pub fn get(&self, key: &PackageKey) -> Option<FeePackage> {
        let entries = self.lock();
        let hit = entries.get(key).map(|entry| entry.package.clone());
        debug!(
            "Package cache {} for '{}'",
            if hit.is_some() { "hit" } else { "miss" },
            key.package_id
        );
        hit
    }

    /// Unconditional overwrite.
    pub fn set(&self, key: PackageKey, package: FeePackage) {
        let mut entries = self.lock();
        entries.insert(
            key,
            CacheEntry {
                package,
                inserted_at: Utc::now(),
            },
        );
    }

    /// When the entry under `key` was stored, if present.
    pub fn inserted_at(&self, key: &PackageKey) -> Option<DateTime<Utc>> {
        self.lock().get(key).map(|entry| entry.inserted_at)
    }

    /// Number of cached packages.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Default for FeePackageCache {
    fn default() -> Self {
        Self::new()
    }
}
