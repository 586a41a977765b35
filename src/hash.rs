//! The salted hash primitive used to route a real to a ring position.
//!
//! Any table-driven 32-bit polynomial CRC with a `hash(data, previous) ->
//! u32` signature works here: determinism, platform independence, and good
//! avalanche across salts are what matter, not the particular CRC variant.
//! This crate uses `crc32fast` as a thin wrapper around that primitive.

/// Differentiates one [`crate::unweighted::UnweightedRing`] from another.
pub type Salt = u32;

/// `f(Real, Salt)`.
pub type IdHash = u32;

/// Salted hash of `data`. `salt` seeds the CRC as its "previous" running
/// state, so distinct salts route the same `data` to distinct hash values.
#[inline]
pub fn salted_hash(data: &[u8], salt: Salt) -> IdHash {
    let mut hasher = crc32fast::Hasher::new_with_initial(salt);
    hasher.update(data);
    hasher.finalize()
}
