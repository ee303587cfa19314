//! Triplet tables: the `(peer_rank, local_slot, element_id)` records that
//! drive the exchange plan.

/// One exchange record: which peer it concerns, where it lives in the
/// local buffer, and which global element it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triplet {
    pub peer_rank: i64,
    pub local_slot: i64,
    pub element_id: i64,
}

impl Triplet {
    pub fn new(peer_rank: i64, local_slot: i64, element_id: i64) -> Self {
        Self {
            peer_rank,
            local_slot,
            element_id,
        }
    }

    fn field(&self, field: TripletField) -> i64 {
        match field {
            TripletField::PeerRank => self.peer_rank,
            TripletField::LocalSlot => self.local_slot,
            TripletField::ElementId => self.element_id,
        }
    }
}

/// Selects one of the three columns of a [`Triplet`] for sort/search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripletField {
    PeerRank,
    LocalSlot,
    ElementId,
}

/// Ordered sequence of triplets owned by exactly one decomposition handle.
///
/// Two canonical orderings are used by the engine: sorted by `peer_rank`
/// (the form the transfer engine consumes) and sorted by `element_id`
/// (the form construction uses for lookups).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripletTable {
    rows: Vec<Triplet>,
}

impl TripletTable {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            rows: Vec::with_capacity(cap),
        }
    }

    pub fn push(&mut self, t: Triplet) {
        self.rows.push(t);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Triplet> {
        self.rows.iter()
    }

    pub fn as_slice(&self) -> &[Triplet] {
        &self.rows
    }

    /// In-place stable sort by `key_field`. Ties are broken by the
    /// remaining two fields in column order (peer_rank, local_slot,
    /// element_id skipping the key itself), so sort-then-search is
    /// deterministic regardless of insertion order.
    pub fn sort_by_field(&mut self, key_field: TripletField) {
        self.rows.sort_by(|a, b| {
            a.field(key_field)
                .cmp(&b.field(key_field))
                .then_with(|| a.peer_rank.cmp(&b.peer_rank))
                .then_with(|| a.local_slot.cmp(&b.local_slot))
                .then_with(|| a.element_id.cmp(&b.element_id))
        });
    }

    /// Binary search a table already sorted by `field` for any triplet
    /// whose `field` equals `key`. Returns a reference to a matching row,
    /// or `None`. When multiple rows match, which one is unspecified.
    pub fn search_by_field(&self, key: i64, field: TripletField) -> Option<&Triplet> {
        self.rows
            .binary_search_by_key(&key, |t| t.field(field))
            .ok()
            .map(|idx| &self.rows[idx])
    }

    /// Sorts by `peer_rank` with `element_id` as the secondary key,
    /// independent of `local_slot`. This is the exact ordering the
    /// transfer engine relies on: two tables built from the same
    /// matching and sorted this way agree row-for-row within each peer
    /// group regardless of how `local_slot` happens to relate to
    /// `element_id` on either side.
    pub fn sort_by_peer_then_element(&mut self) {
        self.rows
            .sort_by(|a, b| a.peer_rank.cmp(&b.peer_rank).then_with(|| a.element_id.cmp(&b.element_id)));
    }
}

impl IntoIterator for TripletTable {
    type Item = Triplet;
    type IntoIter = std::vec::IntoIter<Triplet>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a TripletTable {
    type Item = &'a Triplet;
    type IntoIter = std::slice::Iter<'a, Triplet>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl FromIterator<Triplet> for TripletTable {
    fn from_iter<I: IntoIterator<Item = Triplet>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(p: i64, s: i64, e: i64) -> Triplet {
        Triplet::new(p, s, e)
    }

    #[test]
    fn sort_by_peer_rank_is_stable_and_tie_broken() {
        let mut table: TripletTable = [t(1, 0, 9), t(0, 1, 3), t(1, 1, 2), t(0, 0, 7)]
            .into_iter()
            .collect();
        table.sort_by_field(TripletField::PeerRank);
        let rows: Vec<_> = table.iter().copied().collect();
        assert_eq!(
            rows,
            vec![t(0, 0, 7), t(0, 1, 3), t(1, 0, 9), t(1, 1, 2)]
        );
    }

    #[test]
    fn sort_by_peer_then_element_ignores_local_slot() {
        // local_slot is deliberately inverted relative to element_id
        // within the peer-1 group, simulating an interleaved compute
        // buffer layout; the sort must still land on increasing
        // element_id, not increasing local_slot.
        let mut table: TripletTable = [t(1, 0, 40), t(0, 1, 10), t(1, 2, 20)]
            .into_iter()
            .collect();
        table.sort_by_peer_then_element();
        let rows: Vec<_> = table.iter().map(|t| (t.peer_rank, t.element_id)).collect();
        assert_eq!(rows, vec![(0, 10), (1, 20), (1, 40)]);
    }

    #[test]
    fn sort_by_element_id_then_binary_search() {
        let mut table: TripletTable =
            [t(2, 0, 50), t(0, 0, 10), t(1, 0, 30)].into_iter().collect();
        table.sort_by_field(TripletField::ElementId);

        let found = table.search_by_field(30, TripletField::ElementId).unwrap();
        assert_eq!(found.peer_rank, 1);

        assert!(table.search_by_field(999, TripletField::ElementId).is_none());
    }

    #[test]
    fn search_on_unsorted_field_is_undefined_but_does_not_panic() {
        let table: TripletTable = [t(0, 0, 1), t(1, 0, 2)].into_iter().collect();
        // Table is sorted by neither peer_rank nor local_slot here by
        // construction; binary_search_by_key on an unsorted key column
        // may miss, but must not panic.
        let _ = table.search_by_field(0, TripletField::LocalSlot);
    }

    #[test]
    fn empty_table_search_returns_none() {
        let table = TripletTable::new();
        assert!(table.search_by_field(0, TripletField::ElementId).is_none());
        assert!(table.is_empty());
    }
}
