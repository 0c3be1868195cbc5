//! Bounded, distance-ordered k-nearest-neighbour lists.

/// Up to `k` `(distance, index)` pairs, ascending by distance.
///
/// Equal distances keep their insertion order: a new entry goes after the
/// existing entries at the same distance, and eviction removes the last
/// entry. Two lists fed the same candidates in the same order therefore end
/// up identical, which is what lets incremental and batch neighbourhoods
/// agree exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborList {
    k: usize,
    entries: Vec<(f64, usize)>,
}

impl NeighborList {
    /// Empty list holding at most `k` neighbours.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            entries: Vec::with_capacity(k),
        }
    }

    /// Capacity.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of neighbours currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no neighbour is held.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` when `k` neighbours are held.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.k
    }

    /// Offer a candidate; returns whether it was kept.
    ///
    /// The candidate is kept when the list is not full or when it is strictly
    /// closer than the current farthest neighbour, which is then evicted.
    pub fn offer(&mut self, distance: f64, index: usize) -> bool {
        if self.k == 0 {
            return false;
        }
        if self.is_full() {
            match self.entries.last() {
                Some(&(farthest, _)) if distance < farthest => {
                    let _ = self.entries.pop();
                }
                _ => return false,
            }
        }
        let pos = self.entries.partition_point(|&(d, _)| d <= distance);
        self.entries.insert(pos, (distance, index));
        true
    }

    /// Distance to the farthest held neighbour (the k-distance once full).
    pub fn k_distance(&self) -> Option<f64> {
        self.entries.last().map(|&(d, _)| d)
    }

    /// `(distance, index)` pairs, nearest first.
    pub fn iter(&self) -> impl Iterator<Item = (f64, usize)> + '_ {
        self.entries.iter().copied()
    }

    /// Neighbour indices, nearest first.
    pub fn indices(&self) -> Vec<usize> {
        self.entries.iter().map(|&(_, i)| i).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_k_nearest() {
        let mut list = NeighborList::new(3);
        for (d, i) in [(5.0, 0), (1.0, 1), (3.0, 2), (4.0, 3), (2.0, 4)] {
            let _ = list.offer(d, i);
        }
        assert_eq!(list.indices(), vec![1, 4, 2]);
        assert_eq!(list.k_distance(), Some(3.0));
        assert!(list.is_full());
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut list = NeighborList::new(2);
        assert!(list.offer(1.0, 7));
        assert!(list.offer(1.0, 3));
        // Equal to the farthest: rejected.
        assert!(!list.offer(1.0, 9));
        assert_eq!(list.indices(), vec![7, 3]);

        // Strictly closer evicts the last of the tied entries.
        assert!(list.offer(0.5, 9));
        assert_eq!(list.indices(), vec![9, 7]);
    }

    #[test]
    fn test_zero_capacity() {
        let mut list = NeighborList::new(0);
        assert!(!list.offer(1.0, 0));
        assert!(list.is_empty());
        assert_eq!(list.k_distance(), None);
    }
}
