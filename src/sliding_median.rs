//! Component B: sliding weighted median.
//!
//! Keeps two indexed views of the same samples — one ordered by value (for
//! the quantile scan in [`SlidingMedian::get_average`]), one in arrival order
//! (for expiry in [`SlidingMedian::add_sample`]) — exactly as the C++
//! `util::SlidingMedian` this is ported from does with a `std::multimap` plus
//! a `std::queue` of iterators into it.

use std::collections::{BTreeMap, VecDeque};

pub type SampleValue = i64;
pub type SampleWeight = i64;

struct Entry {
    value: SampleValue,
    weight: SampleWeight,
}

/// A bounded-weight streaming quantile estimator. Used by the bandwidth
/// meter as its averager, with `weight = sqrt(bytes_transferred)`.
pub struct SlidingMedian {
    max_weight: SampleWeight,
    entries: BTreeMap<u64, Entry>,
    arrival_order: VecDeque<u64>,
    by_value: BTreeMap<SampleValue, VecDeque<u64>>,
    total_weight: SampleWeight,
    next_id: u64,
}

impl SlidingMedian {
    /// `max_weight` must be positive.
    pub fn new(max_weight: SampleWeight) -> Self {
        assert!(max_weight > 0, "max_weight must be positive");
        SlidingMedian {
            max_weight,
            entries: BTreeMap::new(),
            arrival_order: VecDeque::new(),
            by_value: BTreeMap::new(),
            total_weight: 0,
            next_id: 0,
        }
    }

    /// Records a new observation. `weight` must be positive. While the total
    /// weight exceeds `max_weight`, the oldest sample is reduced in weight
    /// (or removed, if its weight is entirely consumed) to make room. A
    /// single very large new sample may evict several old ones.
    pub fn add_sample(&mut self, weight: SampleWeight, value: SampleValue) {
        assert!(weight > 0, "weight must be positive");

        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, Entry { value, weight });
        self.arrival_order.push_back(id);
        self.by_value.entry(value).or_default().push_back(id);
        self.total_weight += weight;

        while self.total_weight > self.max_weight {
            let excess_weight = self.total_weight - self.max_weight;
            let oldest_id = *self.arrival_order.front().expect("total_weight > 0 implies a sample exists");
            let oldest_weight = self.entries.get(&oldest_id).expect("id present").weight;
            if oldest_weight <= excess_weight {
                self.arrival_order.pop_front();
                let entry = self.entries.remove(&oldest_id).expect("id present");
                self.total_weight -= entry.weight;
                if let Some(bucket) = self.by_value.get_mut(&entry.value) {
                    bucket.retain(|&x| x != oldest_id);
                    if bucket.is_empty() {
                        self.by_value.remove(&entry.value);
                    }
                }
            } else {
                self.entries.get_mut(&oldest_id).expect("id present").weight -= excess_weight;
                self.total_weight -= excess_weight;
                break;
            }
        }
    }

    /// Returns `true` iff [`get_average`](Self::get_average) will return a
    /// value actually derived from samples (as opposed to the empty-window 0).
    pub fn has_sample(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Returns the value at cumulative weight `ceil(total_weight / 2)` from
    /// the lowest value, or 0 if empty.
    pub fn get_average(&self) -> SampleValue {
        let desired_weight = self.total_weight / 2 + self.total_weight % 2;
        let mut accumulated = 0;
        for (&value, ids) in &self.by_value {
            for id in ids {
                accumulated += self.entries.get(id).expect("id present").weight;
                if accumulated >= desired_weight {
                    return value;
                }
            }
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_by_one_sample() {
        let mut m = SlidingMedian::new(1000);
        m.add_sample(1000, 1);
        assert_eq!(m.get_average(), 1);
        m.add_sample(1000, 5);
        assert_eq!(m.get_average(), 5);
        m.add_sample(1000, 100);
        assert_eq!(m.get_average(), 100);
    }

    #[test]
    fn build_up_sequence() {
        let mut m = SlidingMedian::new(70);
        let samples: [(SampleWeight, SampleValue); 8] =
            [(10, 5), (20, 7), (15, 3), (5, 6), (1, 8), (2, 4), (9, 1), (15, 9)];
        let expected = [5, 7, 5, 5, 6, 5, 5, 7];
        for ((weight, value), &want) in samples.iter().zip(expected.iter()) {
            m.add_sample(*weight, *value);
            assert_eq!(m.get_average(), want);
        }
    }

    #[test]
    fn empty_has_no_sample() {
        let m = SlidingMedian::new(10);
        assert!(!m.has_sample());
        assert_eq!(m.get_average(), 0);
    }
}
