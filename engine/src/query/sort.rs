//! Multi-key stable sorting of records.

use crate::record::Record;
use crate::value::{as_f64, canonical_string};
use serde_json::Value;
use std::borrow::Borrow;
use std::cmp::Ordering;

/// One field of a sort specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ord = compare_values(a.get(&self.field), b.get(&self.field));
        if self.descending {
            ord.reverse()
        } else {
            ord
        }
    }
}

/// Ordered list of sort keys. Earlier keys take precedence; records that
/// compare equal on every key keep their original relative order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    pub fn new(keys: Vec<SortKey>) -> Self {
        Self { keys }
    }

    /// Parse `"a,-b,c"`: comma separated fields, `-` prefix for descending.
    pub fn parse(spec: &str) -> Self {
        let keys = spec
            .split(',')
            .map(str::trim)
            .filter_map(|part| match part.strip_prefix('-') {
                Some(field) if !field.is_empty() => Some(SortKey::desc(field)),
                Some(_) => None,
                None if !part.is_empty() => Some(SortKey::asc(part)),
                None => None,
            })
            .collect();
        Self { keys }
    }

    /// Apply a legacy `_order` value: a comma separated list of `asc`/`desc`
    /// aligned with the keys. A single value applies to every key. Keys that
    /// were already marked descending with `-` stay descending.
    pub fn with_order(mut self, order: &str) -> Self {
        let directions: Vec<bool> = order
            .split(',')
            .map(|d| d.trim().eq_ignore_ascii_case("desc"))
            .collect();

        for (i, key) in self.keys.iter_mut().enumerate() {
            let desc = if directions.len() == 1 {
                directions[0]
            } else {
                directions.get(i).copied().unwrap_or(false)
            };
            key.descending |= desc;
        }
        self
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Compare two records key by key; the first non-equal key decides.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        self.keys
            .iter()
            .map(|key| key.compare(a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Stable in-place sort. An empty spec leaves the order untouched.
    ///
    /// A field mixing numbers and text does not compare as a total order.
    /// The merge below only consults pairwise results and never panics on it.
    pub fn sort<T: Borrow<Record>>(&self, records: &mut [T]) {
        if self.is_empty() || records.len() < 2 {
            return;
        }
        let order = stable_order(records.len(), |a, b| {
            self.compare(records[a].borrow(), records[b].borrow())
        });
        apply_order(records, order);
    }
}

/// Bottom-up merge sort over indices. Ties keep the left element, so the
/// result is stable.
fn stable_order(len: usize, cmp: impl Fn(usize, usize) -> Ordering) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    let mut buf = vec![0; len];
    let mut width = 1;

    while width < len {
        for start in (0..len).step_by(2 * width) {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut i, mut j) = (start, mid);
            for slot in &mut buf[start..end] {
                let take_left = j >= end || (i < mid && cmp(order[i], order[j]).is_le());
                if take_left {
                    *slot = order[i];
                    i += 1;
                } else {
                    *slot = order[j];
                    j += 1;
                }
            }
        }
        std::mem::swap(&mut order, &mut buf);
        width *= 2;
    }
    order
}

/// Rearrange `items` so that position `i` holds the element previously at
/// `order[i]`. Walks each permutation cycle once.
fn apply_order<T>(items: &mut [T], mut order: Vec<usize>) {
    for start in 0..items.len() {
        let mut current = start;
        loop {
            let next = order[current];
            order[current] = current;
            if next == start {
                break;
            }
            items.swap(current, next);
            current = next;
        }
    }
}

/// Numeric when both sides have a numeric form, canonical string otherwise.
/// Absent and null values compare as the empty string.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    if let (Some(x), Some(y)) = (a.and_then(as_f64), b.and_then(as_f64)) {
        if let Some(ord) = x.partial_cmp(&y) {
            return ord;
        }
    }
    let a = a.map(canonical_string).unwrap_or_default();
    let b = b.map(canonical_string).unwrap_or_default();
    a.cmp(&b)
}
