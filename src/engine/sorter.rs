//! Per-bin item visitation order: bound descending, item id ascending.

use super::bounds::BoundTable;
use crate::error::TopKError;
use crate::sort::{pack_desc_key, radix_sort_u64, try_filled, unpack_desc_key, RadixScratch};
use crate::types::ItemId;

/// One item's bound within a bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundEntry {
    pub bound: f32,
    pub item_id: ItemId,
}

/// For each bin, every item ordered by descending bound.
#[derive(Debug, Clone)]
pub struct SortedBounds {
    num_items: usize,
    entries: Vec<BoundEntry>,
}

impl SortedBounds {
    pub fn build(table: &BoundTable) -> Result<Self, TopKError> {
        let num_items = table.num_items();
        if num_items > u32::MAX as usize {
            return Err(TopKError::InvalidConfiguration(format!(
                "{} items exceed the 32-bit item id range",
                num_items
            )));
        }
        let len = table.num_bins() * num_items;
        let mut entries = try_filled(
            "sorted bound table",
            len,
            BoundEntry {
                bound: 0.0,
                item_id: 0,
            },
        )?;
        let mut keys = try_filled("sort keys", num_items, 0u64)?;
        let mut scratch = RadixScratch::try_new(num_items)?;

        if num_items > 0 {
            for (bin, out) in entries.chunks_exact_mut(num_items).enumerate() {
                for (j, (key, &b)) in keys.iter_mut().zip(table.row(bin)).enumerate() {
                    *key = pack_desc_key(b, j as u32);
                }
                radix_sort_u64(&mut keys, &mut scratch);
                for (e, &key) in out.iter_mut().zip(&keys) {
                    let (bound, item_id) = unpack_desc_key(key);
                    *e = BoundEntry { bound, item_id };
                }
            }
        }

        Ok(Self { num_items, entries })
    }

    /// The visitation order for `bin`.
    #[inline]
    pub fn bin(&self, bin: usize) -> &[BoundEntry] {
        let start = bin * self.num_items;
        &self.entries[start..start + self.num_items]
    }

    #[inline]
    pub fn num_bins(&self) -> usize {
        if self.num_items == 0 {
            0
        } else {
            self.entries.len() / self.num_items
        }
    }
}
