use serde::{Deserialize, Serialize};

use crate::{
    domain::process::{ProcessEntry, ProcessId, ProcessKind, ProcessType},
    errors::DomainError,
};

/// Ordered process cards of a quotation.
///
/// Order numbers are always `1..=len` in list order; every mutation
/// renumbers. The list may be empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessList {
    entries: Vec<ProcessEntry>,
}

impl ProcessList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopts existing entries in their current sequence and renumbers them.
    pub fn from_entries(entries: Vec<ProcessEntry>) -> Self {
        let mut list = Self { entries };
        list.renumber();
        list
    }

    pub fn entries(&self) -> &[ProcessEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ProcessEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &ProcessId) -> Option<&ProcessEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    pub fn append(&mut self, kind: ProcessKind) -> ProcessId {
        let id = ProcessId::generate();
        let order = next_order(self.entries.len());
        self.entries.push(ProcessEntry { id: id.clone(), order, kind });
        id
    }

    pub fn remove(&mut self, id: &ProcessId) -> Option<ProcessEntry> {
        let index = self.entries.iter().position(|entry| &entry.id == id)?;
        let removed = self.entries.remove(index);
        self.renumber();
        Some(removed)
    }

    /// Syncs the list with a multi-select of process types.
    ///
    /// Entries whose type is still selected keep their id and rates; types
    /// that were deselected are dropped; newly selected types are appended
    /// as blank cards in selection order.
    pub fn select_types(&mut self, selected: &[ProcessType]) {
        self.entries.retain(|entry| selected.contains(&entry.process_type()));

        for process_type in selected {
            let present = self.entries.iter().any(|entry| entry.process_type() == *process_type);
            if !present {
                let order = next_order(self.entries.len());
                self.entries.push(ProcessEntry {
                    id: ProcessId::generate(),
                    order,
                    kind: ProcessKind::blank(*process_type),
                });
            }
        }

        self.renumber();
    }

    /// Moves the entry at `from` so it lands at index `to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), DomainError> {
        let len = self.entries.len();
        if from >= len || to >= len {
            return Err(DomainError::ReorderOutOfRange { from, to, len });
        }

        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        self.renumber();
        Ok(())
    }

    /// Replaces the rate fields of an entry. The process type cannot change.
    pub fn update_kind(&mut self, id: &ProcessId, kind: ProcessKind) -> Result<(), DomainError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| &entry.id == id)
            .ok_or_else(|| DomainError::UnknownProcess(id.clone()))?;

        let expected = entry.process_type();
        let actual = kind.process_type();
        if expected != actual {
            return Err(DomainError::ProcessTypeMismatch { expected, actual });
        }

        entry.kind = kind;
        Ok(())
    }

    fn renumber(&mut self) {
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.order = next_order(index);
        }
    }
}

fn next_order(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::ProcessList;
    use crate::{
        cpq::pricing::compute_line_costs,
        domain::process::{Backside, ProcessId, ProcessKind, ProcessType},
        errors::DomainError,
    };

    fn orders(list: &ProcessList) -> Vec<u32> {
        list.entries().iter().map(|entry| entry.order).collect()
    }

    fn ids(list: &ProcessList) -> Vec<ProcessId> {
        list.entries().iter().map(|entry| entry.id.clone()).collect()
    }

    #[test]
    fn append_assigns_next_order_and_unique_ids() {
        let mut list = ProcessList::new();
        let first = list.append(ProcessKind::blank(ProcessType::Printing));
        let second = list.append(ProcessKind::blank(ProcessType::Die));

        assert_ne!(first, second);
        assert_eq!(orders(&list), vec![1, 2]);
    }

    #[test]
    fn reorder_renumbers_and_keeps_ids() {
        let mut list = ProcessList::new();
        for process_type in [ProcessType::Printing, ProcessType::Lamination, ProcessType::Die] {
            list.append(ProcessKind::blank(process_type));
        }
        let original = ids(&list);

        list.reorder(0, 2).expect("in-range reorder");
        assert_eq!(orders(&list), vec![1, 2, 3]);
        assert_eq!(ids(&list), vec![original[1].clone(), original[2].clone(), original[0].clone()]);

        list.reorder(2, 0).expect("reorder back");
        assert_eq!(ids(&list), original);
        assert_eq!(orders(&list), vec![1, 2, 3]);
    }

    #[test]
    fn reorder_rejects_out_of_range_indices() {
        let mut list = ProcessList::new();
        list.append(ProcessKind::B2bPasting);

        let error = list.reorder(0, 1).expect_err("index 1 is out of range");
        assert_eq!(error, DomainError::ReorderOutOfRange { from: 0, to: 1, len: 1 });
    }

    #[test]
    fn remove_renumbers_and_allows_empty_list() {
        let mut list = ProcessList::new();
        let first = list.append(ProcessKind::blank(ProcessType::Varnish));
        let second = list.append(ProcessKind::blank(ProcessType::Flute));

        assert!(list.remove(&first).is_some());
        assert_eq!(orders(&list), vec![1]);
        assert!(list.remove(&first).is_none());

        list.remove(&second);
        assert!(list.is_empty());
    }

    #[test]
    fn select_types_keeps_rates_of_still_selected_cards() {
        let mut list = ProcessList::new();
        list.select_types(&[ProcessType::Printing, ProcessType::Die]);
        let printing_id = list.entries()[0].id.clone();
        list.update_kind(
            &printing_id,
            ProcessKind::Printing { rate_per_1000: Decimal::new(500, 0), backside: Backside::Yes },
        )
        .expect("printing update");

        list.select_types(&[ProcessType::Printing, ProcessType::CornerPasting]);

        let types: Vec<_> = list.entries().iter().map(|entry| entry.process_type()).collect();
        assert_eq!(types, vec![ProcessType::Printing, ProcessType::CornerPasting]);
        assert_eq!(list.entries()[0].id, printing_id);
        assert_eq!(list.entries()[0].kind.display_rate(), Some(Decimal::new(1000, 0)));
        assert_eq!(orders(&list), vec![1, 2]);
    }

    #[test]
    fn update_kind_checks_identity_and_type() {
        let mut list = ProcessList::new();
        let id = list.append(ProcessKind::blank(ProcessType::UvPlate));

        let mismatch = list
            .update_kind(&id, ProcessKind::Varnish { rate_per_1000: Decimal::ONE })
            .expect_err("type cannot change");
        assert!(matches!(mismatch, DomainError::ProcessTypeMismatch { .. }));

        let unknown = list
            .update_kind(&ProcessId("missing".to_owned()), ProcessKind::B2bPasting)
            .expect_err("unknown id");
        assert!(matches!(unknown, DomainError::UnknownProcess(_)));
    }

    #[test]
    fn rate_edit_is_reflected_in_next_costing() {
        let mut list = ProcessList::new();
        let id = list.append(ProcessKind::blank(ProcessType::UvPlate));
        let lines = compute_line_costs(list.entries(), 2000).expect("line costs");
        assert_eq!(lines[0].total_cost, Decimal::ZERO);

        list.update_kind(&id, ProcessKind::UvPlate { rate_per_1000: Decimal::new(90, 0) })
            .expect("uv plate update");
        let lines = compute_line_costs(list.entries(), 2000).expect("line costs");
        assert_eq!(lines[0].total_cost, Decimal::new(180, 0));
    }

    #[test]
    fn from_entries_normalizes_orders() {
        let mut source = ProcessList::new();
        source.append(ProcessKind::B2bPasting);
        source.append(ProcessKind::blank(ProcessType::Die));
        let mut entries = source.into_entries();
        entries[0].order = 7;
        entries[1].order = 3;

        let list = ProcessList::from_entries(entries);
        assert_eq!(orders(&list), vec![1, 2]);
        assert_eq!(list.len(), 2);
        assert!(list.get(&list.entries()[1].id).is_some());
    }
}
