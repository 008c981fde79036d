//! Structural walker
//!
//! Visits every node of a description in a fixed pre-order, feeding a
//! [`TraversalSink`] with identity-relevant bytes (node kind tags, skeleton
//! text, type identities, member names, literal scalar bytes) while reporting
//! opaque bind values separately. Two descriptions with the same shape but
//! different bind values emit identical byte streams, and the order in which
//! bind values are reported matches the slot order the compiler assigns -
//! that alignment is part of the contract.
//!
//! All variable-length segments are length-prefixed so the byte stream is
//! unambiguous when compared piecewise.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::factory::{ArgExpr, TemplateDescription};
use crate::utils::pool::Recycle;

const TAG_TABLE: u8 = 1;
const TAG_COLUMN: u8 = 2;
const TAG_RAW: u8 = 3;
const TAG_LIT: u8 = 4;
const TAG_BIND: u8 = 5;

/// Receives the walker's output.
///
/// `on_bytes` may return `false` to stop the walk early; the comparison sink
/// uses this to short-circuit on the first mismatch.
pub(crate) trait TraversalSink {
    fn on_bytes(&mut self, data: &[u8]) -> bool;
    fn on_bind(&mut self, value: &Value);
}

/// Walk a description in fixed pre-order. Returns `false` if the sink
/// stopped the walk. Never mutates the description.
pub(crate) fn walk<S: TraversalSink>(description: &TemplateDescription, sink: &mut S) -> bool {
    if !emit_str(sink, description.skeleton()) {
        return false;
    }
    if !sink.on_bytes(&(description.args().len() as u32).to_le_bytes()) {
        return false;
    }

    for arg in description.args() {
        let ok = match arg {
            ArgExpr::Table { param, ty, .. } => {
                sink.on_bytes(&[TAG_TABLE])
                    && sink.on_bytes(&(*param as u32).to_le_bytes())
                    && sink.on_bytes(&type_id_bytes(ty))
            }
            ArgExpr::Column {
                param, ty, member, ..
            } => {
                sink.on_bytes(&[TAG_COLUMN])
                    && sink.on_bytes(&(*param as u32).to_le_bytes())
                    && sink.on_bytes(&type_id_bytes(ty))
                    && emit_str(sink, member)
            }
            ArgExpr::Raw(text) => sink.on_bytes(&[TAG_RAW]) && emit_str(sink, text),
            ArgExpr::Lit(value) => {
                // A silent fallback here would make two distinct literals
                // hash alike, so fail loudly instead.
                let bytes =
                    serde_json::to_vec(value).expect("Value serialization is infallible");
                sink.on_bytes(&[TAG_LIT])
                    && sink.on_bytes(&(bytes.len() as u32).to_le_bytes())
                    && sink.on_bytes(&bytes)
            }
            ArgExpr::Bind(value) => {
                sink.on_bind(value);
                sink.on_bytes(&[TAG_BIND])
            }
        };
        if !ok {
            return false;
        }
    }

    true
}

fn emit_str<S: TraversalSink>(sink: &mut S, text: &str) -> bool {
    sink.on_bytes(&(text.len() as u32).to_le_bytes()) && sink.on_bytes(text.as_bytes())
}

/// `TypeId` is process-local, which is all the cache needs; hash it down to a
/// stable 8-byte form for the stream.
fn type_id_bytes(ty: &TypeId) -> [u8; 8] {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    ty.hash(&mut hasher);
    hasher.finish().to_le_bytes()
}

/// Structural fingerprint of a description's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Fingerprint {
    digest: [u8; 32],
}

impl Fingerprint {
    /// Short key for the cache's bucket map.
    pub(crate) fn key(&self) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.digest[..8]);
        u64::from_le_bytes(bytes)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.digest[..8]))
    }
}

/// Hashing sink: accumulates the fingerprint and collects bind values in
/// call order. Pooled per environment; reset before every walk.
pub(crate) struct HashCollector {
    hasher: Sha256,
    pub(crate) binds: Vec<Value>,
}

impl Default for HashCollector {
    fn default() -> Self {
        HashCollector {
            hasher: Sha256::new(),
            binds: Vec::new(),
        }
    }
}

impl Recycle for HashCollector {
    fn recycle(&mut self) {
        self.hasher = Sha256::new();
        self.binds.clear();
    }
}

impl HashCollector {
    pub(crate) fn finish(&mut self) -> Fingerprint {
        Fingerprint {
            digest: self.hasher.finalize_reset().into(),
        }
    }
}

impl TraversalSink for HashCollector {
    fn on_bytes(&mut self, data: &[u8]) -> bool {
        self.hasher.update(data);
        true
    }

    fn on_bind(&mut self, value: &Value) {
        self.binds.push(value.clone());
    }
}

/// Serializing sink: captures the exact byte stream for storage in a cache
/// entry (one copy per distinct shape).
struct TreeSerializer {
    buffer: Vec<u8>,
}

impl TraversalSink for TreeSerializer {
    fn on_bytes(&mut self, data: &[u8]) -> bool {
        self.buffer.extend_from_slice(data);
        true
    }

    fn on_bind(&mut self, _value: &Value) {}
}

pub(crate) fn serialize(description: &TemplateDescription) -> Box<[u8]> {
    let mut serializer = TreeSerializer { buffer: Vec::new() };
    walk(description, &mut serializer);
    serializer.buffer.into_boxed_slice()
}

/// Comparison sink: streams the walk against a stored byte stream and stops
/// at the first mismatch, so structurally different descriptions are rejected
/// without a full serialization.
struct CompareWithSerialized<'a> {
    serialized: &'a [u8],
    position: usize,
}

impl TraversalSink for CompareWithSerialized<'_> {
    fn on_bytes(&mut self, data: &[u8]) -> bool {
        let remaining = &self.serialized[self.position..];
        if remaining.len() < data.len() || &remaining[..data.len()] != data {
            return false;
        }
        self.position += data.len();
        true
    }

    fn on_bind(&mut self, _value: &Value) {}
}

/// Byte-for-byte equality between a description's shape and a stored stream.
pub(crate) fn matches_serialized(description: &TemplateDescription, serialized: &[u8]) -> bool {
    let mut comparer = CompareWithSerialized {
        serialized,
        position: 0,
    };
    walk(description, &mut comparer) && comparer.position == serialized.len()
}
