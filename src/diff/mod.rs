//! Generic sequence differencing
//!
//! `diff` classifies every element of two sequences as common to both or
//! present on one side only, using the linear-space variant of Myers'
//! shortest-edit-script algorithm. The skeleton reducer built on top of it
//! lives in [`skeleton`].

pub mod skeleton;

use std::ops::{Index, IndexMut};

pub use skeleton::{common, WILDCARD};

/// How an element of the diff relates to the two inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeTag {
    /// Present in both sequences
    Equal,
    /// Only in the old (left) sequence
    Delete,
    /// Only in the new (right) sequence
    Insert,
}

/// One element of a diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change<T> {
    pub tag: ChangeTag,
    pub value: T,
}

impl<T> Change<T> {
    fn new(tag: ChangeTag, value: T) -> Self {
        Self { tag, value }
    }

    pub fn is_equal(&self) -> bool {
        self.tag == ChangeTag::Equal
    }
}

/// Compute the element-wise diff of `old` against `new`.
///
/// Concatenating the `Equal` and `Delete` values in order yields `old`;
/// concatenating `Equal` and `Insert` yields `new`. The number of `Equal`
/// elements is a longest common subsequence.
pub fn diff<T: PartialEq + Clone>(old: &[T], new: &[T]) -> Vec<Change<T>> {
    let max_d = (old.len() + new.len() + 1) / 2 + 1;
    let mut forward = Diagonals::new(max_d);
    let mut backward = Diagonals::new(max_d);

    let mut changes = Vec::with_capacity(old.len().max(new.len()));
    conquer(old, new, &mut forward, &mut backward, &mut changes);
    changes
}

/// Similarity of the two sides of a diff: `2 * matches / total`, in `[0, 1]`.
/// Two empty sequences are identical (1.0).
pub fn ratio<T>(changes: &[Change<T>]) -> f64 {
    let mut matches = 0usize;
    let mut total = 0usize;
    for change in changes {
        match change.tag {
            ChangeTag::Equal => {
                matches += 1;
                total += 2;
            }
            ChangeTag::Delete | ChangeTag::Insert => total += 1,
        }
    }

    if total == 0 {
        1.0
    } else {
        2.0 * matches as f64 / total as f64
    }
}

/// Furthest-reaching x per diagonal `k`, indexed by `k` in `-max_d..=max_d`
struct Diagonals {
    offset: isize,
    v: Vec<isize>,
}

impl Diagonals {
    fn new(max_d: usize) -> Self {
        Self {
            offset: max_d as isize,
            v: vec![0; 2 * max_d + 2],
        }
    }
}

impl Index<isize> for Diagonals {
    type Output = isize;

    fn index(&self, k: isize) -> &isize {
        &self.v[(k + self.offset) as usize]
    }
}

impl IndexMut<isize> for Diagonals {
    fn index_mut(&mut self, k: isize) -> &mut isize {
        &mut self.v[(k + self.offset) as usize]
    }
}

fn common_prefix_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().rev().zip(b.iter().rev()).take_while(|(x, y)| x == y).count()
}

fn push_all<T: Clone>(out: &mut Vec<Change<T>>, tag: ChangeTag, values: &[T]) {
    out.extend(values.iter().cloned().map(|v| Change::new(tag, v)));
}

/// Linear-space Myers: strip the common ends, split the rest at the middle
/// snake of an optimal edit path and recurse on both halves.
fn conquer<T: PartialEq + Clone>(
    a: &[T],
    b: &[T],
    forward: &mut Diagonals,
    backward: &mut Diagonals,
    out: &mut Vec<Change<T>>,
) {
    let prefix = common_prefix_len(a, b);
    let suffix = common_suffix_len(&a[prefix..], &b[prefix..]);
    let inner_a = &a[prefix..a.len() - suffix];
    let inner_b = &b[prefix..b.len() - suffix];

    push_all(out, ChangeTag::Equal, &a[..prefix]);

    if inner_a.is_empty() {
        push_all(out, ChangeTag::Insert, inner_b);
    } else if inner_b.is_empty() {
        push_all(out, ChangeTag::Delete, inner_a);
    } else if let Some((x, y)) = middle_snake(inner_a, inner_b, forward, backward) {
        conquer(&inner_a[..x], &inner_b[..y], forward, backward, out);
        conquer(&inner_a[x..], &inner_b[y..], forward, backward, out);
    } else {
        push_all(out, ChangeTag::Delete, inner_a);
        push_all(out, ChangeTag::Insert, inner_b);
    }

    push_all(out, ChangeTag::Equal, &a[a.len() - suffix..]);
}

/// Run the forward and backward searches until they overlap and return the
/// point where the overlapping snake starts.
fn middle_snake<T: PartialEq>(
    a: &[T],
    b: &[T],
    forward: &mut Diagonals,
    backward: &mut Diagonals,
) -> Option<(usize, usize)> {
    let n = a.len() as isize;
    let m = b.len() as isize;
    let delta = n - m;
    let odd = delta & 1 == 1;
    let max_d = (n + m + 1) / 2 + 1;

    forward[1] = 0;
    backward[1] = 0;

    for d in 0..max_d {
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && forward[k - 1] < forward[k + 1]) {
                forward[k + 1]
            } else {
                forward[k - 1] + 1
            };
            let y = x - k;
            let (x0, y0) = (x, y);
            if x < n && y < m {
                x += common_prefix_len(&a[x as usize..], &b[y as usize..]) as isize;
            }
            forward[k] = x;

            if odd && (k - delta).abs() <= d - 1 && forward[k] + backward[-(k - delta)] >= n {
                return Some((x0 as usize, y0 as usize));
            }
        }

        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && backward[k - 1] < backward[k + 1]) {
                backward[k + 1]
            } else {
                backward[k - 1] + 1
            };
            let mut y = x - k;
            if x < n && y < m {
                let advance =
                    common_suffix_len(&a[..(n - x) as usize], &b[..(m - y) as usize]) as isize;
                x += advance;
                y += advance;
            }
            backward[k] = x;

            if !odd && (k - delta).abs() <= d && backward[k] + forward[-(k - delta)] >= n {
                return Some(((n - x) as usize, (m - y) as usize));
            }
        }
    }

    None
}
