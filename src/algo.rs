//! Stable MSD radix ordering over byte keys.
//!
//! [`order_keys`] distributes rows into 257 buckets by the key byte at the
//! current offset (one bucket for keys that have ended, then one per byte
//! value) and recurses into each bucket one byte further on. The
//! distribution pass walks rows in order, so rows with equal keys never
//! change their relative order.
//!
//! - **Common-prefix skipping**: before distributing, bytes shared by every
//!   key in the partition are skipped in one step using the cached 8-byte
//!   window.
//! - **Small partitions**: fall back to a comparison sort that breaks ties by
//!   original row index, which keeps the result stable.
//! - **Parallelism**: large partitions refine their buckets on rayon workers.
//!   Buckets are disjoint slices, so no merge step is needed.

use std::cmp::Ordering;

use cuneiform::cuneiform;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::core::{KeyAccessor, PREFIX_CACHE_SIZE, SortPtr};

const RADIX_SORT_THRESHOLD: usize = 64;
const PARALLEL_THRESHOLD: usize = 32 * 1024;

/// Bucket 0 holds exhausted keys, buckets 1..=256 hold byte values 0..=255.
const RADIX_BUCKETS: usize = 257;

// Cache-aligned histogram.
#[cuneiform]
struct RadixCounts {
    data: [usize; RADIX_BUCKETS],
}

/// A bijection from output rank to original row index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Permutation {
    indices: Vec<usize>,
}

impl Permutation {
    pub fn identity(len: usize) -> Self {
        Self {
            indices: (0..len).collect(),
        }
    }

    /// Wraps `indices` if they form a bijection on `0..indices.len()`.
    pub fn from_indices(indices: Vec<usize>) -> Option<Self> {
        Self::is_valid(&indices).then_some(Self { indices })
    }

    /// Whether `indices` is a bijection on `0..indices.len()`.
    pub fn is_valid(indices: &[usize]) -> bool {
        let mut seen = vec![false; indices.len()];
        indices.iter().all(|&i| {
            if i >= seen.len() || seen[i] {
                return false;
            }
            seen[i] = true;
            true
        })
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.indices
    }

    /// The rank of every original row: `inverse[row] == rank`.
    pub fn inverse(&self) -> Permutation {
        let mut inverse = vec![0; self.indices.len()];
        for (rank, &row) in self.indices.iter().enumerate() {
            inverse[row] = rank;
        }
        Permutation { indices: inverse }
    }

    /// Composes two permutations: applying the result equals applying
    /// `self` and then `then`.
    pub fn then(&self, then: &Permutation) -> Permutation {
        Permutation {
            indices: then.indices.iter().map(|&i| self.indices[i]).collect(),
        }
    }

    /// Returns `data` reordered by this permutation.
    pub fn apply<T: Clone>(&self, data: &[T]) -> Vec<T> {
        self.indices.iter().map(|&i| data[i].clone()).collect()
    }

    /// Reorders `data` in place by following permutation cycles.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != self.len()`.
    pub fn apply_in_place<T>(&self, data: &mut [T]) {
        assert_eq!(
            data.len(),
            self.indices.len(),
            "permutation length mismatch"
        );
        let mut indices = self.indices.clone();
        for i in 0..data.len() {
            let mut current = i;
            while indices[current] != i {
                let next = indices[current];
                data.swap(current, next);
                indices[current] = current;
                current = next;
            }
            indices[current] = current;
        }
    }
}

/// Computes the stable ascending order of the keys in `provider`.
///
/// Keys compare byte-wise; a key that is a proper prefix of another sorts
/// first. Rows with identical keys keep their input order.
///
/// # Examples
///
/// ```
/// use locsort::order_keys;
///
/// let keys = vec!["banana", "apple", "cherry", "apple"];
/// let permutation = order_keys(&keys);
///
/// assert_eq!(permutation.indices(), &[1, 3, 0, 2]);
/// ```
pub fn order_keys<T: KeyAccessor + Sync + ?Sized>(provider: &T) -> Permutation {
    let len = provider.len();
    if len == 0 {
        return Permutation::default();
    }

    let mut pointers: Vec<SortPtr> = (0..len)
        .map(|index| SortPtr {
            index,
            len: provider.get_key(index).len(),
            cache: provider.get_u64_prefix(index, 0),
        })
        .collect();

    sort_partition(provider, &mut pointers, 0);
    debug!(rows = len, "ordered keys");

    Permutation {
        indices: pointers.into_iter().map(|p| p.index).collect(),
    }
}

/// Sorts a slice of byte-like values in place, stably.
///
/// # Examples
///
/// ```
/// use locsort::order_mut;
///
/// let mut data = vec!["banana", "apple", "cherry"];
/// order_mut(&mut data);
///
/// assert_eq!(data, vec!["apple", "banana", "cherry"]);
/// ```
pub fn order_mut<T: AsRef<[u8]> + Sync>(data: &mut [T]) {
    let permutation = order_keys(data);
    permutation.apply_in_place(data);
}

/// Orders one partition whose keys all share their first `offset` bytes.
fn sort_partition<T: KeyAccessor + Sync + ?Sized>(
    provider: &T,
    ptrs: &mut [SortPtr],
    offset: usize,
) {
    if ptrs.len() <= 1 {
        return;
    }

    if ptrs.len() <= RADIX_SORT_THRESHOLD {
        ptrs.sort_unstable_by(|a, b| {
            compare_entries(provider, a, b, offset).then_with(|| a.index.cmp(&b.index))
        });
        return;
    }

    radix_pass(provider, ptrs, offset);
}

/// One MSD radix step.
///
/// 1. Skips bytes common to every key in the partition.
/// 2. Counts bucket sizes (histogram) and computes their start offsets.
/// 3. Scatters rows into a buffer in input order and copies them back.
/// 4. Refines every byte bucket one byte further on.
fn radix_pass<T: KeyAccessor + Sync + ?Sized>(
    provider: &T,
    ptrs: &mut [SortPtr],
    mut offset: usize,
) {
    loop {
        let anchor = ptrs[0].cache;
        let (diff, min_remaining) = ptrs.iter().fold((0u64, usize::MAX), |(diff, min), p| {
            let remaining = p.len.saturating_sub(offset);
            (diff | (p.cache ^ anchor), min.min(remaining))
        });
        let common = ((diff.leading_zeros() / 8) as usize)
            .min(PREFIX_CACHE_SIZE)
            .min(min_remaining);
        if common == 0 {
            break;
        }
        offset += common;
        update_caches(provider, ptrs, offset);
    }

    trace!(rows = ptrs.len(), offset, "radix pass");

    let mut counts = RadixCounts {
        data: [0; RADIX_BUCKETS],
    };
    let counts = &mut counts.data;
    ptrs.iter().for_each(|p| counts[bucket_of(p, offset)] += 1);

    let mut offsets = [0usize; RADIX_BUCKETS];
    let mut sum = 0;
    offsets
        .iter_mut()
        .zip(counts.iter())
        .for_each(|(start, &count)| {
            *start = sum;
            sum += count;
        });

    let buffer = ptrs.to_vec();
    buffer.iter().for_each(|p| {
        let bucket = bucket_of(p, offset);
        ptrs[offsets[bucket]] = *p;
        offsets[bucket] += 1;
    });

    let parallel = ptrs.len() >= PARALLEL_THRESHOLD;
    let mut buckets: Vec<&mut [SortPtr]> = Vec::new();
    let mut rest: &mut [SortPtr] = ptrs;
    for (bucket, &count) in counts.iter().enumerate() {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(count);
        rest = tail;
        // Exhausted keys are all equal and already in input order.
        if bucket > 0 && count > 1 {
            buckets.push(head);
        }
    }

    let next = offset + 1;
    let refine = |bucket: &mut [SortPtr]| {
        update_caches(provider, bucket, next);
        sort_partition(provider, bucket, next);
    };
    if parallel {
        buckets.into_par_iter().for_each(refine);
    } else {
        buckets.into_iter().for_each(refine);
    }
}

#[inline(always)]
fn bucket_of(p: &SortPtr, offset: usize) -> usize {
    if p.len <= offset {
        0
    } else {
        (p.cache >> 56) as usize + 1
    }
}

/// Reloads every cached window to start at `offset`.
fn update_caches<T: KeyAccessor + ?Sized>(provider: &T, ptrs: &mut [SortPtr], offset: usize) {
    ptrs.iter_mut().for_each(|p| {
        p.cache = provider.get_u64_prefix(p.index, offset);
    });
}

/// Compares two rows whose keys agree on their first `offset` bytes.
///
/// Differing cached windows decide the order directly: zero padding past the
/// end of a key never outranks a real byte. Equal windows fall back to the
/// full key tails.
#[inline(always)]
fn compare_entries<T: KeyAccessor + ?Sized>(
    provider: &T,
    a: &SortPtr,
    b: &SortPtr,
    offset: usize,
) -> Ordering {
    if a.cache != b.cache {
        return a.cache.cmp(&b.cache);
    }

    let key_a = provider.get_key(a.index);
    let key_b = provider.get_key(b.index);
    let tail_a = key_a.get(offset..).unwrap_or(&[]);
    let tail_b = key_b.get(offset..).unwrap_or(&[]);
    tail_a.cmp(tail_b)
}
