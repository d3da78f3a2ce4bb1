use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A digest function used for every witness, state and proof hash.
///
/// Canonicalization (serializing the payload in declared field order) is
/// fixed and shared by all strategies; only the byte digest is swappable.
pub trait HashStrategy: Send + Sync {
    /// Algorithm label, e.g. `"fnv1a32"`.
    fn algorithm(&self) -> &'static str;

    /// Digest canonical bytes into a lowercase hex string.
    fn digest(&self, bytes: &[u8]) -> String;
}

impl fmt::Debug for dyn HashStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashStrategy({})", self.algorithm())
    }
}

const FNV32_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a. Fast and NOT cryptographic: a placeholder digest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fnv1a32;

impl Fnv1a32 {
    pub fn hash32(bytes: &[u8]) -> u32 {
        let mut h = FNV32_OFFSET_BASIS;
        for b in bytes {
            h ^= u32::from(*b);
            h = h.wrapping_mul(FNV32_PRIME);
        }
        h
    }
}

impl HashStrategy for Fnv1a32 {
    fn algorithm(&self) -> &'static str {
        "fnv1a32"
    }

    fn digest(&self, bytes: &[u8]) -> String {
        format!("{:08x}", Self::hash32(bytes))
    }
}

/// BLAKE3 (32 bytes, hex-encoded).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Blake3Strategy;

impl HashStrategy for Blake3Strategy {
    fn algorithm(&self) -> &'static str {
        "blake3"
    }

    fn digest(&self, bytes: &[u8]) -> String {
        blake3::hash(bytes).to_hex().to_string()
    }
}

/// The strategy used when none is injected.
pub fn default_strategy() -> Arc<dyn HashStrategy> {
    Arc::new(Fnv1a32)
}

/// Serialize `payload` canonically (JSON, struct fields in declaration
/// order) and digest it with `strategy`.
pub fn canonical_digest<T: Serialize + ?Sized>(
    strategy: &dyn HashStrategy,
    payload: &T,
) -> String {
    let bytes = serde_json::to_vec(payload).unwrap_or_default();
    strategy.digest(&bytes)
}
