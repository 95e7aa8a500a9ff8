//! Packed sort keys and an LSD radix sort over `u64`.
//!
//! A `(bound, item_id)` pair is packed into one `u64` whose *ascending* order is
//! the visitation order we want: bound descending, then item id ascending.
//! This relies on IEEE-754 bit patterns of non-negative floats being ordered
//! like their values, so bounds must be sanitized with [`sortable_bound`] first.

use crate::error::TopKError;

/// Below this length a comparison sort beats the counting passes.
const SMALL_SORT_LEN: usize = 256;

const DIGIT_BITS: u32 = 16;
const DIGIT_MASK: u64 = (1 << DIGIT_BITS) - 1;
const NUM_DIGITS: usize = 1 << DIGIT_BITS;
const NUM_PASSES: u32 = 64 / DIGIT_BITS;

/// Map a bound onto the range where bit order equals value order.
///
/// Negative values (and -0.0) become +0.0; NaN becomes +∞ so the item is never
/// pruned on account of it.
#[inline]
pub fn sortable_bound(bound: f32) -> f32 {
    if bound.is_nan() {
        f32::INFINITY
    } else if bound > 0.0 {
        bound
    } else {
        0.0
    }
}

/// Pack a sanitized bound and an item id into a key that sorts ascending as
/// (bound descending, id ascending).
#[inline]
pub fn pack_desc_key(bound: f32, item_id: u32) -> u64 {
    debug_assert!(
        bound.is_sign_positive() && !bound.is_nan(),
        "bound must be sanitized before packing: {bound}"
    );
    ((!bound.to_bits() as u64) << 32) | item_id as u64
}

#[inline]
pub fn unpack_desc_key(key: u64) -> (f32, u32) {
    (f32::from_bits(!((key >> 32) as u32)), key as u32)
}

/// Reusable buffers for [`radix_sort_u64`].
pub struct RadixScratch {
    buf: Vec<u64>,
    counts: Vec<usize>,
}

impl RadixScratch {
    /// Allocate scratch space for sorting up to `capacity` keys.
    pub fn try_new(capacity: usize) -> Result<Self, TopKError> {
        Ok(Self {
            buf: try_filled("radix sort buffer", capacity, 0u64)?,
            counts: try_filled("radix digit counts", NUM_DIGITS, 0usize)?,
        })
    }
}

/// Sort `keys` ascending.
///
/// # Panics
/// Panics if `keys` is longer than the scratch capacity.
pub fn radix_sort_u64(keys: &mut [u64], scratch: &mut RadixScratch) {
    let n = keys.len();
    if n <= SMALL_SORT_LEN {
        keys.sort_unstable();
        return;
    }
    assert!(n <= scratch.buf.len(), "radix scratch too small: {} < {}", scratch.buf.len(), n);

    let counts = &mut scratch.counts;
    let buf = &mut scratch.buf[..n];
    // true while the current data lives in `keys`
    let mut in_keys = true;

    for pass in 0..NUM_PASSES {
        let shift = pass * DIGIT_BITS;
        let (src, dst): (&[u64], &mut [u64]) = if in_keys {
            (&*keys, &mut *buf)
        } else {
            (&*buf, &mut *keys)
        };

        counts.fill(0);
        for &k in src {
            counts[((k >> shift) & DIGIT_MASK) as usize] += 1;
        }
        // Every key shares this digit: the pass would be the identity.
        if counts[((src[0] >> shift) & DIGIT_MASK) as usize] == n {
            continue;
        }

        let mut offset = 0usize;
        for c in counts.iter_mut() {
            let here = *c;
            *c = offset;
            offset += here;
        }
        for &k in src {
            let d = ((k >> shift) & DIGIT_MASK) as usize;
            dst[counts[d]] = k;
            counts[d] += 1;
        }
        in_keys = !in_keys;
    }

    if !in_keys {
        keys.copy_from_slice(buf);
    }
}

/// Heap-allocate `len` copies of `value`, reporting failure instead of aborting.
pub(crate) fn try_filled<T: Clone>(
    what: &'static str,
    len: usize,
    value: T,
) -> Result<Vec<T>, TopKError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| TopKError::AllocationFailure { what, elements: len })?;
    v.resize(len, value);
    Ok(v)
}
