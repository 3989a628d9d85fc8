//! FILENAME: core/cube/src/radix.rs
//! PURPOSE: Conversion between category tuples and flat value-array offsets.
//! CONTEXT: A cube stores its values in one flat array. The position of the
//! value for a tuple of category positions is a mixed-radix number whose
//! digits are the category positions and whose radices are the dimension
//! sizes. The FIRST declared dimension is the MOST significant digit; the
//! last declared dimension varies fastest (JSON-stat row-major order).
//! Both directions below use that one convention.

use serde::{Deserialize, Serialize};

/// Which end of the dimension list holds the most significant digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Significance {
    FirstDimensionMostSignificant,
}

/// The convention used by every encode/decode path in this workspace.
pub const RADIX_ORDER: Significance = Significance::FirstDimensionMostSignificant;

/// Precomputed strides for a fixed list of dimension sizes.
///
/// `strides[i]` is the distance in the flat array between two values whose
/// tuples differ by one in dimension `i` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadixIndex {
    sizes: Vec<usize>,
    strides: Vec<usize>,
    len: usize,
}

impl RadixIndex {
    /// Builds the index for the given dimension sizes.
    /// Returns `None` if the product of the sizes overflows `usize`.
    pub fn new(sizes: &[usize]) -> Option<Self> {
        let mut strides = vec![0; sizes.len()];
        let mut stride: usize = 1;
        for (i, &size) in sizes.iter().enumerate().rev() {
            strides[i] = stride;
            stride = stride.checked_mul(size)?;
        }
        Some(RadixIndex {
            sizes: sizes.to_vec(),
            strides,
            len: stride,
        })
    }

    /// Total number of cells (product of all sizes).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Converts a tuple of category positions to a flat offset.
    ///
    /// Returns `None` if the tuple has the wrong arity or a position is out
    /// of range for its dimension.
    pub fn encode(&self, tuple: &[usize]) -> Option<usize> {
        if tuple.len() != self.sizes.len() {
            return None;
        }
        let mut offset = 0;
        for ((&pos, &size), &stride) in tuple.iter().zip(&self.sizes).zip(&self.strides) {
            if pos >= size {
                return None;
            }
            offset += pos * stride;
        }
        Some(offset)
    }

    /// Converts a flat offset back to its tuple of category positions.
    pub fn decode(&self, mut offset: usize) -> Option<Vec<usize>> {
        if offset >= self.len {
            return None;
        }
        let mut tuple = Vec::with_capacity(self.sizes.len());
        for &stride in &self.strides {
            tuple.push(offset / stride);
            offset %= stride;
        }
        Some(tuple)
    }

    /// Iterates over every tuple in flat-array order.
    pub fn tuples(&self) -> TupleIter<'_> {
        TupleIter {
            sizes: &self.sizes,
            current: vec![0; self.sizes.len()],
            remaining: self.len,
        }
    }
}

/// Odometer-style iterator over all category tuples, last dimension fastest.
pub struct TupleIter<'a> {
    sizes: &'a [usize],
    current: Vec<usize>,
    remaining: usize,
}

impl<'a> Iterator for TupleIter<'a> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.current.clone();
        self.remaining -= 1;

        // Advance the odometer
        for i in (0..self.sizes.len()).rev() {
            self.current[i] += 1;
            if self.current[i] < self.sizes[i] {
                break;
            }
            self.current[i] = 0;
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_dimension_is_most_significant() {
        assert_eq!(RADIX_ORDER, Significance::FirstDimensionMostSignificant);
        let index = RadixIndex::new(&[2, 3, 4]).unwrap();
        assert_eq!(index.strides(), &[12, 4, 1]);
        assert_eq!(index.len(), 24);
        assert_eq!(index.encode(&[0, 0, 1]), Some(1));
        assert_eq!(index.encode(&[1, 0, 0]), Some(12));
        assert_eq!(index.encode(&[1, 2, 3]), Some(23));
    }

    #[test]
    fn decode_inverts_encode() {
        let index = RadixIndex::new(&[3, 1, 5]).unwrap();
        for offset in 0..index.len() {
            let tuple = index.decode(offset).unwrap();
            assert_eq!(index.encode(&tuple), Some(offset));
        }
    }

    #[test]
    fn out_of_range_positions_are_rejected() {
        let index = RadixIndex::new(&[2, 2]).unwrap();
        assert_eq!(index.encode(&[2, 0]), None);
        assert_eq!(index.encode(&[0]), None);
        assert_eq!(index.decode(4), None);
    }

    #[test]
    fn tuples_follow_flat_order() {
        let index = RadixIndex::new(&[2, 3]).unwrap();
        let tuples: Vec<Vec<usize>> = index.tuples().collect();
        assert_eq!(tuples.len(), 6);
        for (offset, tuple) in tuples.iter().enumerate() {
            assert_eq!(index.encode(tuple), Some(offset));
        }
        assert_eq!(tuples[1], vec![0, 1]);
        assert_eq!(tuples[3], vec![1, 0]);
    }

    #[test]
    fn zero_sized_dimension_has_no_tuples() {
        let index = RadixIndex::new(&[3, 0]).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.tuples().count(), 0);
    }

    #[test]
    fn no_dimensions_is_a_single_cell() {
        let index = RadixIndex::new(&[]).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.encode(&[]), Some(0));
        assert_eq!(index.tuples().count(), 1);
    }
}
