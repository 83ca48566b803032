//! Sequence helpers: run-length encoding, chunking, grouping.

use crate::error::{Result, WkrError};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// A run of equal values covering the half-open index range `start..end`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run<T> {
    pub value: T,
    pub start: usize,
    pub end: usize,
}

impl<T> Run<T> {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Iterator returned by [`rle`] and [`rle_by`]
pub struct RleBy<I, F, K> {
    iter: I,
    key: F,
    current: Option<(K, usize)>,
    position: usize,
}

impl<I, F, K> Iterator for RleBy<I, F, K>
where
    I: Iterator,
    F: FnMut(&I::Item) -> K,
    K: PartialEq,
{
    type Item = Run<K>;

    fn next(&mut self) -> Option<Run<K>> {
        loop {
            let Some(item) = self.iter.next() else {
                let end = self.position;
                return self
                    .current
                    .take()
                    .map(|(value, start)| Run { value, start, end });
            };

            let key = (self.key)(&item);
            let index = self.position;
            self.position += 1;

            match self.current.take() {
                Some((value, start)) if value != key => {
                    self.current = Some((key, index));
                    return Some(Run {
                        value,
                        start,
                        end: index,
                    });
                }
                Some(run) => self.current = Some(run),
                None => self.current = Some((key, index)),
            }
        }
    }
}

/// Run-length encode `items`.
///
/// ```
/// let runs: Vec<_> = wkr::seq::rle("aaab".chars()).map(|r| (r.value, r.start, r.end)).collect();
/// assert_eq!(runs, vec![('a', 0, 3), ('b', 3, 4)]);
/// ```
pub fn rle<I>(items: I) -> impl Iterator<Item = Run<I::Item>>
where
    I: IntoIterator,
    I::Item: Clone + PartialEq,
{
    rle_by(items, |item: &I::Item| item.clone())
}

/// Run-length encode `items` by `key`; each run reports the key it shares
pub fn rle_by<I, F, K>(items: I, key: F) -> RleBy<I::IntoIter, F, K>
where
    I: IntoIterator,
    F: FnMut(&I::Item) -> K,
    K: PartialEq,
{
    RleBy {
        iter: items.into_iter(),
        key,
        current: None,
        position: 0,
    }
}

/// First item matching `predicate`
pub fn first<I, P>(items: I, mut predicate: P) -> Option<I::Item>
where
    I: IntoIterator,
    P: FnMut(&I::Item) -> bool,
{
    items.into_iter().find(|item| predicate(item))
}

/// First item matching `predicate`, or `default` when none does
pub fn first_or<I, P>(items: I, predicate: P, default: I::Item) -> I::Item
where
    I: IntoIterator,
    P: FnMut(&I::Item) -> bool,
{
    first(items, predicate).unwrap_or(default)
}

/// Iterator returned by [`chunks`]
pub struct Chunks<I> {
    iter: I,
    size: usize,
}

impl<I: Iterator> Iterator for Chunks<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Vec<I::Item>> {
        let chunk: Vec<_> = self.iter.by_ref().take(self.size).collect();
        if chunk.is_empty() {
            None
        } else {
            Some(chunk)
        }
    }
}

/// Split `items` into consecutive chunks of `size`; the last may be shorter
pub fn chunks<I: IntoIterator>(items: I, size: usize) -> Result<Chunks<I::IntoIter>> {
    if size == 0 {
        return Err(WkrError::invalid_argument("chunk size must be positive"));
    }
    Ok(Chunks {
        iter: items.into_iter(),
        size,
    })
}

/// Iterator returned by [`pairwise`]
pub struct Pairwise<I: Iterator> {
    iter: I,
    previous: Option<I::Item>,
}

impl<I> Iterator for Pairwise<I>
where
    I: Iterator,
    I::Item: Clone,
{
    type Item = (I::Item, I::Item);

    fn next(&mut self) -> Option<Self::Item> {
        if self.previous.is_none() {
            self.previous = Some(self.iter.next()?);
        }
        let next = self.iter.next()?;
        let previous = self.previous.replace(next.clone())?;
        Some((previous, next))
    }
}

/// Overlapping adjacent pairs: `a, b, c` gives `(a, b), (b, c)`
pub fn pairwise<I>(items: I) -> Pairwise<I::IntoIter>
where
    I: IntoIterator,
    I::Item: Clone,
{
    Pairwise {
        iter: items.into_iter(),
        previous: None,
    }
}

/// Group items into vectors by key, keeping input order within each group
pub fn group_by<I, K, F>(items: I, key: F) -> HashMap<K, Vec<I::Item>>
where
    I: IntoIterator,
    K: Eq + Hash,
    F: FnMut(&I::Item) -> K,
{
    group_by_into(items, key)
}

/// Group items by key into any extendable container
pub fn group_by_into<I, K, F, C>(items: I, mut key: F) -> HashMap<K, C>
where
    I: IntoIterator,
    K: Eq + Hash,
    F: FnMut(&I::Item) -> K,
    C: Default + Extend<I::Item>,
{
    let mut groups: HashMap<K, C> = HashMap::new();
    for item in items {
        groups
            .entry(key(&item))
            .or_default()
            .extend(std::iter::once(item));
    }
    groups
}

/// Group by `outer`, then split each group again by `inner`.
///
/// ```
/// let groups = wkr::seq::group_by_nested(0..10, |x| x % 2, |y| y % 3);
/// assert_eq!(groups[&0][&0], vec![0, 6]);
/// assert_eq!(groups[&1][&2], vec![5]);
/// ```
pub fn group_by_nested<I, K1, K2, F1, F2>(
    items: I,
    outer: F1,
    mut inner: F2,
) -> HashMap<K1, HashMap<K2, Vec<I::Item>>>
where
    I: IntoIterator,
    K1: Eq + Hash,
    K2: Eq + Hash,
    F1: FnMut(&I::Item) -> K1,
    F2: FnMut(&I::Item) -> K2,
{
    group_by(items, outer)
        .into_iter()
        .map(|(key, group)| (key, group_by(group, &mut inner)))
        .collect()
}

/// Concatenate a sequence of sequences
pub fn reduce_lists<L, T>(lists: L) -> Vec<T>
where
    L: IntoIterator,
    L::Item: IntoIterator<Item = T>,
{
    lists.into_iter().flatten().collect()
}

/// Union of a sequence of sets
pub fn reduce_sets_or<S, T>(sets: S) -> HashSet<T>
where
    S: IntoIterator,
    S::Item: IntoIterator<Item = T>,
    T: Eq + Hash,
{
    sets.into_iter().flatten().collect()
}
