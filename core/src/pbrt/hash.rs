//! Hashing

use super::Float;

/// Fixed-capacity stack buffer collecting the bytes fed to `hash!`.
#[derive(Copy, Clone, Debug)]
pub struct HashBuffer {
    /// Storage.
    bytes: [u8; HashBuffer::CAPACITY],

    /// Number of bytes in use.
    len: usize,
}

impl HashBuffer {
    /// Maximum number of bytes hashed; the rest are dropped.
    pub const CAPACITY: usize = 64;

    /// Returns an empty buffer.
    pub fn new() -> Self {
        Self {
            bytes: [0; Self::CAPACITY],
            len: 0,
        }
    }

    /// Append bytes.
    ///
    /// * `bytes` - The bytes to append.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        debug_assert!(self.len + bytes.len() <= Self::CAPACITY);
        let n = bytes.len().min(Self::CAPACITY - self.len);
        self.bytes[self.len..self.len + n].copy_from_slice(&bytes[..n]);
        self.len += n;
    }

    /// Returns the bytes in use.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl Default for HashBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Values that can be fed to `hash!` by appending their in-memory bytes.
pub trait HashBytes {
    /// Append the value's native-endian byte representation.
    ///
    /// * `buf` - The buffer to append to.
    fn hash_bytes(&self, buf: &mut HashBuffer);
}

impl HashBytes for Float {
    fn hash_bytes(&self, buf: &mut HashBuffer) {
        buf.extend_from_slice(&self.to_ne_bytes());
    }
}

impl HashBytes for i32 {
    fn hash_bytes(&self, buf: &mut HashBuffer) {
        buf.extend_from_slice(&self.to_ne_bytes());
    }
}

impl HashBytes for u64 {
    fn hash_bytes(&self, buf: &mut HashBuffer) {
        buf.extend_from_slice(&self.to_ne_bytes());
    }
}

impl<T: HashBytes> HashBytes for &T {
    fn hash_bytes(&self, buf: &mut HashBuffer) {
        (*self).hash_bytes(buf)
    }
}

/// Hash the concatenated bytes of one or more `HashBytes` values with
/// MurmurHash64A. The bytes are gathered on the stack.
#[macro_export]
macro_rules! hash {
    ($($v: expr),+ $(,)?) => {{
        let mut buf = $crate::pbrt::HashBuffer::new();
        $( $crate::pbrt::HashBytes::hash_bytes(&$v, &mut buf); )+
        $crate::pbrt::murmur_hash_64a(buf.as_slice(), 0)
    }};
}

/// MurmurHash64A by Austin Appleby.
///
/// * `key`  - Bytes to hash.
/// * `seed` - Seed value.
pub fn murmur_hash_64a(key: &[u8], seed: u64) -> u64 {
    const M: u64 = 0xc6a4a7935bd1e995;
    const R: u32 = 47;

    let mut h = seed ^ (key.len() as u64).wrapping_mul(M);

    let mut chunks = key.chunks_exact(8);
    for chunk in &mut chunks {
        let mut k = u64::from_le_bytes([
            chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7],
        ]);
        k = k.wrapping_mul(M);
        k ^= k >> R;
        k = k.wrapping_mul(M);

        h ^= k;
        h = h.wrapping_mul(M);
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        for (i, b) in tail.iter().enumerate().rev() {
            h ^= (*b as u64) << (8 * i);
        }
        h = h.wrapping_mul(M);
    }

    h ^= h >> R;
    h = h.wrapping_mul(M);
    h ^= h >> R;
    h
}

/// Scrambles the bits of a 64-bit value.
///
/// * `v` - The value.
#[inline]
pub fn mix_bits(mut v: u64) -> u64 {
    v ^= v >> 31;
    v = v.wrapping_mul(0x7fb5d329728ea185);
    v ^= v >> 27;
    v = v.wrapping_mul(0x81dadef4bc2dd44d);
    v ^= v >> 33;
    v
}

/// Hash a slice of floats.
///
/// * `values` - The floats.
pub fn hash_floats(values: &[Float]) -> u64 {
    let buf: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
    murmur_hash_64a(&buf, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector3f;

    #[test]
    fn empty_key_with_zero_seed() {
        assert_eq!(murmur_hash_64a(&[], 0), 0);
    }

    #[test]
    fn hash_is_deterministic_and_order_sensitive() {
        let a = crate::hash!(1.0 as Float, 2.0 as Float);
        let b = crate::hash!(1.0 as Float, 2.0 as Float);
        let c = crate::hash!(2.0 as Float, 1.0 as Float);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, hash_floats(&[1.0, 2.0]));
    }

    #[test]
    fn tail_bytes_contribute() {
        assert_ne!(murmur_hash_64a(&[1, 2, 3], 0), murmur_hash_64a(&[1, 2, 4], 0));
    }

    #[test]
    fn stack_buffer_matches_direct_bytes() {
        let v = Vector3f::new(0.25, -1.0, 3.5);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&7i32.to_ne_bytes());
        for c in [v.x, v.y, v.z] {
            bytes.extend_from_slice(&c.to_ne_bytes());
        }
        assert_eq!(crate::hash!(7i32, v), murmur_hash_64a(&bytes, 0));

        let mut buf = HashBuffer::new();
        v.hash_bytes(&mut buf);
        assert_eq!(buf.as_slice().len(), 12);
    }

    #[test]
    fn mix_bits_scrambles() {
        assert_eq!(mix_bits(0), 0);
        assert_ne!(mix_bits(1), 1);
    }
}
