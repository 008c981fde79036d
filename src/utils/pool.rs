//! Scoped scratch pools
//!
//! Walker scratch state and render text buffers are reused across calls.
//! A pool entry is reset (not merely appended to) when acquired, and returned
//! to the pool when the guard drops - including on error paths, so a failed
//! render does not leak its buffer.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

/// Reusable scratch state that can be wiped between uses.
pub(crate) trait Recycle {
    fn recycle(&mut self);
}

impl Recycle for String {
    fn recycle(&mut self) {
        self.clear();
    }
}

pub(crate) struct ScratchPool<T> {
    items: Mutex<Vec<T>>,
}

impl<T: Recycle + Default> ScratchPool<T> {
    pub(crate) fn new() -> Self {
        ScratchPool {
            items: Mutex::new(Vec::new()),
        }
    }

    /// Take an entry out of the pool (or create one) and reset it.
    pub(crate) fn acquire(&self) -> PoolGuard<'_, T> {
        let mut item = self.items.lock().unwrap().pop().unwrap_or_default();
        item.recycle();
        PoolGuard {
            pool: self,
            item: Some(item),
        }
    }
}

/// RAII handle over a pooled entry; returns it to the pool on drop.
pub(crate) struct PoolGuard<'a, T: Recycle + Default> {
    pool: &'a ScratchPool<T>,
    item: Option<T>,
}

impl<T: Recycle + Default> Deref for PoolGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.item.as_ref().expect("pool guard holds an item until drop")
    }
}

impl<T: Recycle + Default> DerefMut for PoolGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.item.as_mut().expect("pool guard holds an item until drop")
    }
}

impl<T: Recycle + Default> Drop for PoolGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.items.lock().unwrap().push(item);
        }
    }
}
