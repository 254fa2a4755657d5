//! Compact type identity - 32-bit FNV-1a over canonical names
//!
//! Ids are deterministic across runs for the same name but not globally
//! unique: two different names may hash to the same value. The cast engine
//! lands views through a typed slot, so a collision there degrades to a miss
//! on that branch instead of a wrong reference. Plain `is` queries stay
//! exposed to collisions; use `TypeDescriptor::reaches_descriptor` or a
//! `Registry` audit when that matters.

/// Numeric type identity
pub type RttiId = u32;

const FNV_OFFSET_BASIS: RttiId = 0x811c_9dc5;
const FNV_PRIME: RttiId = 0x0100_0193;

/// Hash a string with 32-bit FNV-1a
#[inline]
pub const fn fnv1a_32(input: &str) -> RttiId {
    fnv1a_32_bytes(input.as_bytes())
}

/// Hash raw bytes with 32-bit FNV-1a
pub const fn fnv1a_32_bytes(bytes: &[u8]) -> RttiId {
    let mut hash = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as RttiId;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}
