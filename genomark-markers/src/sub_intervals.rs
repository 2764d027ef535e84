use std::cmp::Ordering;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use genomark_core::models::{Locus, Strand};

use crate::marker::{Marker, MarkerLike};

///
/// Children of a feature, unique by id.
///
/// Sorted views are computed on demand and cached; any mutable access drops
/// the caches.
///
#[derive(Debug)]
pub struct SubIntervals<T> {
    items: Vec<T>,
    sorted: OnceCell<Vec<usize>>,
    sorted_by_end: OnceCell<Vec<usize>>,
}

impl<T> Default for SubIntervals<T> {
    fn default() -> Self {
        SubIntervals {
            items: Vec::new(),
            sorted: OnceCell::new(),
            sorted_by_end: OnceCell::new(),
        }
    }
}

impl<T: Clone> Clone for SubIntervals<T> {
    fn clone(&self) -> Self {
        SubIntervals {
            items: self.items.clone(),
            sorted: self.sorted.clone(),
            sorted_by_end: self.sorted_by_end.clone(),
        }
    }
}

impl<T: PartialEq> PartialEq for SubIntervals<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq> Eq for SubIntervals<T> {}

impl<T: Serialize> Serialize for SubIntervals<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for SubIntervals<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        Ok(SubIntervals {
            items,
            ..Default::default()
        })
    }
}

impl<T> SubIntervals<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.invalidate();
        self.items.iter_mut()
    }

    pub fn retain<F: FnMut(&T) -> bool>(&mut self, f: F) {
        self.invalidate();
        self.items.retain(f);
    }

    pub fn clear(&mut self) {
        self.invalidate();
        self.items.clear();
    }

    pub fn invalidate(&mut self) {
        self.sorted = OnceCell::new();
        self.sorted_by_end = OnceCell::new();
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: MarkerLike> SubIntervals<T> {
    ///
    /// Add a child. A child with the same id replaces the previous one,
    /// which is returned.
    ///
    pub fn add(&mut self, item: T) -> Option<T> {
        self.invalidate();
        match self.items.iter().position(|i| i.id() == item.id()) {
            Some(idx) => Some(std::mem::replace(&mut self.items[idx], item)),
            None => {
                self.items.push(item);
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|i| i.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.invalidate();
        self.items.iter_mut().find(|i| i.id() == id)
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        let idx = self.items.iter().position(|i| i.id() == id)?;
        self.invalidate();
        Some(self.items.remove(idx))
    }

    /// Children sorted by chromosome, start, end.
    pub fn sorted(&self) -> Vec<&T> {
        let order = self.sorted.get_or_init(|| {
            self.order_by(|a, b| a.compare_locus(b))
        });
        order.iter().map(|&i| &self.items[i]).collect()
    }

    ///
    /// Children in the direction of transcription: ascending start on the
    /// plus strand, descending end on the minus strand.
    ///
    pub fn sorted_strand(&self, strand: Strand) -> Vec<&T> {
        match strand {
            Strand::Plus => self.sorted(),
            Strand::Minus => {
                let order = self.sorted_by_end.get_or_init(|| {
                    self.order_by(|a, b| b.compare_locus_by_end(a))
                });
                order.iter().map(|&i| &self.items[i]).collect()
            }
        }
    }

    fn order_by<F: Fn(&T, &T) -> Ordering>(&self, cmp: F) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.items.len()).collect();
        order.sort_by(|&a, &b| cmp(&self.items[a], &self.items[b]));
        order
    }

    ///
    /// New container with `f` applied to every child; children mapped to
    /// `None` are dropped.
    ///
    pub fn apply_each<E, F>(&self, mut f: F) -> Result<SubIntervals<T>, E>
    where
        F: FnMut(&T) -> Result<Option<T>, E>,
    {
        let mut out = SubIntervals::new();
        for item in self.items.iter() {
            if let Some(mapped) = f(item)? {
                out.add(mapped);
            }
        }
        Ok(out)
    }

    /// Children intersecting `locus`.
    pub fn intersecting<L: Locus + ?Sized>(&self, locus: &L) -> Vec<&T> {
        self.items.iter().filter(|i| i.intersects(locus)).collect()
    }

    /// Every marker in these subtrees intersecting `locus`.
    pub fn query_into<'a, L: Locus + ?Sized>(&'a self, locus: &L, out: &mut Vec<&'a Marker>) {
        for item in self.items.iter() {
            item.query_into(locus, out);
        }
    }
}

impl<T: MarkerLike> FromIterator<T> for SubIntervals<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut sub = SubIntervals::new();
        for item in iter {
            sub.add(item);
        }
        sub
    }
}

impl<'a, T> IntoIterator for &'a SubIntervals<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::MarkerKind;
    use genomark_core::models::Pos;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn marker(id: &str, start: Pos, end: Pos) -> Marker {
        Marker::new("chr1", start, end, Strand::Plus, id, MarkerKind::Exon).unwrap()
    }

    #[fixture]
    fn subs() -> SubIntervals<Marker> {
        vec![marker("b", 300, 400), marker("a", 100, 200), marker("c", 250, 500)]
            .into_iter()
            .collect()
    }

    fn ids(items: Vec<&Marker>) -> Vec<&str> {
        items.into_iter().map(|m| m.id()).collect()
    }

    #[rstest]
    fn test_sorted_views(subs: SubIntervals<Marker>) {
        assert_eq!(ids(subs.sorted()), vec!["a", "c", "b"]);
        assert_eq!(ids(subs.sorted_strand(Strand::Plus)), vec!["a", "c", "b"]);
        assert_eq!(ids(subs.sorted_strand(Strand::Minus)), vec!["c", "b", "a"]);
    }

    #[rstest]
    fn test_add_replaces_same_id(mut subs: SubIntervals<Marker>) {
        let old = subs.add(marker("a", 600, 700));
        assert_eq!(old.map(|m| m.start()), Some(100));
        assert_eq!(subs.len(), 3);
        assert_eq!(ids(subs.sorted()), vec!["c", "b", "a"]);
    }

    #[rstest]
    fn test_mutation_invalidates_cache(mut subs: SubIntervals<Marker>) {
        assert_eq!(ids(subs.sorted()), vec!["a", "c", "b"]);
        subs.get_mut("b").unwrap().set_range(10, 20);
        assert_eq!(ids(subs.sorted()), vec!["b", "a", "c"]);
        subs.remove("a");
        assert_eq!(ids(subs.sorted()), vec!["b", "c"]);
    }

    #[rstest]
    fn test_query(subs: SubIntervals<Marker>) {
        let probe = marker("probe", 350, 360);
        let mut out = Vec::new();
        subs.query_into(&probe, &mut out);
        let mut found = ids(out);
        found.sort();
        assert_eq!(found, vec!["b", "c"]);
        assert_eq!(subs.intersecting(&marker("p", 0, 50)).len(), 0);
    }

    #[rstest]
    fn test_serde_as_list(subs: SubIntervals<Marker>) {
        let json = serde_json::to_string(&subs).unwrap();
        assert!(json.starts_with('['));
        let back: SubIntervals<Marker> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, subs);
    }
}
