use crate::{ItemKind, SuggestionItem};

/// Ordered goal and task collections, addressable by item id.
///
/// Mutation is crate-private: only [`crate::update`] changes the store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemStore {
    goals: Vec<SuggestionItem>,
    tasks: Vec<SuggestionItem>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn goals(&self) -> &[SuggestionItem] {
        &self.goals
    }

    pub fn tasks(&self) -> &[SuggestionItem] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.goals.len() + self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty() && self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SuggestionItem> {
        self.goals
            .iter()
            .chain(self.tasks.iter())
            .find(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Texts of the selected items of one kind, in display order.
    pub fn selected_texts(&self, kind: ItemKind) -> Vec<String> {
        self.collection(kind)
            .iter()
            .filter(|item| item.is_selected())
            .map(|item| item.text.clone())
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.goals.clear();
        self.tasks.clear();
    }

    /// Appends in arrival order. Ids are never merged.
    pub(crate) fn append(&mut self, item: SuggestionItem) {
        match item.kind {
            ItemKind::Goal => self.goals.push(item),
            ItemKind::Task => self.tasks.push(item),
        }
    }

    /// Marks the item as loading and returns its kind; `None` when absent.
    pub(crate) fn begin_mutation(&mut self, id: &str) -> Option<ItemKind> {
        let item = self.get_mut(id)?;
        item.begin_mutation();
        Some(item.kind)
    }

    /// Settles one in-flight mutation. Returns false when the item is gone.
    pub(crate) fn finish_mutation(&mut self, id: &str, text: Option<String>) -> bool {
        match self.get_mut(id) {
            Some(item) => {
                item.finish_mutation(text);
                true
            }
            None => false,
        }
    }

    pub(crate) fn toggle_selected(&mut self, id: &str) -> bool {
        match self.get_mut(id) {
            Some(item) => {
                item.selected = Some(!item.is_selected());
                true
            }
            None => false,
        }
    }

    fn collection(&self, kind: ItemKind) -> &[SuggestionItem] {
        match kind {
            ItemKind::Goal => &self.goals,
            ItemKind::Task => &self.tasks,
        }
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut SuggestionItem> {
        self.goals
            .iter_mut()
            .chain(self.tasks.iter_mut())
            .find(|item| item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::ItemStore;
    use crate::{ItemKind, ItemStatus, SuggestionItem};

    fn store_with(items: &[(&str, ItemKind)]) -> ItemStore {
        let mut store = ItemStore::new();
        for (id, kind) in items {
            store.append(SuggestionItem::new(*id, *kind, format!("text {id}")).with_selected(true));
        }
        store
    }

    #[test]
    fn append_routes_by_kind_and_keeps_duplicates() {
        let store = store_with(&[
            ("g1", ItemKind::Goal),
            ("t1", ItemKind::Task),
            ("g1", ItemKind::Goal),
        ]);
        assert_eq!(store.goals().len(), 2);
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn mutation_on_missing_id_is_none() {
        let mut store = store_with(&[("g1", ItemKind::Goal)]);
        assert_eq!(store.begin_mutation("nope"), None);
        assert!(!store.finish_mutation("nope", Some("x".into())));
        assert_eq!(store.goals()[0].text, "text g1");
    }

    #[test]
    fn mutation_targets_tasks_too() {
        let mut store = store_with(&[("g1", ItemKind::Goal), ("t1", ItemKind::Task)]);
        assert_eq!(store.begin_mutation("t1"), Some(ItemKind::Task));
        assert_eq!(store.tasks()[0].status(), ItemStatus::Loading);
        assert_eq!(store.goals()[0].status(), ItemStatus::Idle);
    }

    #[test]
    fn selected_texts_skip_unselected() {
        let mut store = store_with(&[("g1", ItemKind::Goal), ("g2", ItemKind::Goal)]);
        store.toggle_selected("g1");
        assert_eq!(store.selected_texts(ItemKind::Goal), vec!["text g2".to_string()]);
        assert!(store.selected_texts(ItemKind::Task).is_empty());
    }
}
