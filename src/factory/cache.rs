//! Fingerprint cache
//!
//! Maps a description's structural fingerprint to its compiled plan so that
//! repeated calls of structurally identical factories skip recompilation.
//! Buckets are keyed by a short hash prefix; within a bucket, candidates are
//! confirmed by graph identity first and by a streaming byte comparison
//! against the stored shape otherwise, so a hash collision can never hand
//! back the wrong plan.
//!
//! Compilation happens outside the lock. When two threads race on the same
//! new shape the second writer finds the first one's entry and discards its
//! own plan; both calls still succeed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use crate::environment::Environment;
use crate::factory::compiler::{self, CompiledPlan};
use crate::factory::errors::CompileError;
use crate::factory::walker::{self, Fingerprint};
use crate::factory::TemplateDescription;
use crate::template::Template;

struct CacheEntry {
    shape: Box<[u8]>,
    plan: Arc<CompiledPlan>,
    graph: Weak<TemplateDescription>,
}

impl CacheEntry {
    fn matches(&self, description: &Arc<TemplateDescription>) -> bool {
        if let Some(graph) = self.graph.upgrade() {
            if Arc::ptr_eq(&graph, description) {
                return true;
            }
        }
        walker::matches_serialized(description, &self.shape)
    }
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheMetrics {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Plan cache owned by one environment.
pub struct FactoryCache {
    buckets: RwLock<HashMap<u64, Vec<CacheEntry>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for FactoryCache {
    fn default() -> Self {
        FactoryCache {
            buckets: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

impl FactoryCache {
    /// Resolve a description to a template, compiling on the first sighting
    /// of its shape and reusing the cached plan afterwards.
    pub(crate) fn resolve(
        &self,
        description: &Arc<TemplateDescription>,
        environment: &Environment,
    ) -> Result<Template, CompileError> {
        let mut scratch = environment.walk_scratch();
        walker::walk(description.as_ref(), &mut *scratch);
        let fingerprint = scratch.finish();
        let key = fingerprint.key();

        if let Some(plan) = self.lookup(key, description) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            log::debug!("plan cache hit for shape {fingerprint}");
            return Ok(plan.apply(&scratch.binds));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        log::debug!("plan cache miss for shape {fingerprint}, compiling");

        let plan = Arc::new(compiler::compile(description.as_ref(), environment)?);
        let plan = self.insert(key, &fingerprint, description, plan);
        Ok(plan.apply(&scratch.binds))
    }

    fn lookup(
        &self,
        key: u64,
        description: &Arc<TemplateDescription>,
    ) -> Option<Arc<CompiledPlan>> {
        let buckets = self.buckets.read().unwrap();
        let bucket = buckets.get(&key)?;
        bucket
            .iter()
            .find(|entry| entry.matches(description))
            .map(|entry| entry.plan.clone())
    }

    /// Insert-if-absent. If another thread won the race for the same shape,
    /// its plan is kept and ours is dropped.
    fn insert(
        &self,
        key: u64,
        fingerprint: &Fingerprint,
        description: &Arc<TemplateDescription>,
        plan: Arc<CompiledPlan>,
    ) -> Arc<CompiledPlan> {
        let mut buckets = self.buckets.write().unwrap();
        let bucket = buckets.entry(key).or_default();
        if let Some(existing) = bucket.iter().find(|entry| entry.matches(description)) {
            log::debug!("discarding duplicate plan for shape {fingerprint}");
            return existing.plan.clone();
        }
        bucket.push(CacheEntry {
            shape: walker::serialize(description.as_ref()),
            plan: plan.clone(),
            graph: Arc::downgrade(description),
        });
        plan
    }

    pub fn metrics(&self) -> CacheMetrics {
        let buckets = self.buckets.read().unwrap();
        CacheMetrics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: buckets.values().map(Vec::len).sum(),
        }
    }
}
