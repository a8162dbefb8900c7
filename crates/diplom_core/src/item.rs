use std::fmt;

/// Server-assigned item identity, unique within one generation run.
pub type ItemId = String;

/// Monotonic counter identifying a generation run.
pub type RunEpoch = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Goal,
    Task,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Goal => write!(f, "goal"),
            ItemKind::Task => write!(f, "task"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemStatus {
    #[default]
    Idle,
    Loading,
}

/// Out-of-band regeneration of a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOp {
    Rephrase,
    Replace,
}

impl MutationOp {
    pub(crate) fn failure_notice(self) -> &'static str {
        match self {
            MutationOp::Rephrase => "Could not rephrase the item.",
            MutationOp::Replace => "Could not replace the wording.",
        }
    }
}

impl fmt::Display for MutationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationOp::Rephrase => write!(f, "rephrase"),
            MutationOp::Replace => write!(f, "replace"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionItem {
    pub id: ItemId,
    pub kind: ItemKind,
    pub text: String,
    /// `Some` only when the funnel produces a document.
    pub selected: Option<bool>,
    in_flight: u32,
}

impl SuggestionItem {
    pub fn new(id: impl Into<ItemId>, kind: ItemKind, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            text: text.into(),
            selected: None,
            in_flight: 0,
        }
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = Some(selected);
        self
    }

    /// Loading while at least one mutation request targets this item.
    pub fn status(&self) -> ItemStatus {
        if self.in_flight > 0 {
            ItemStatus::Loading
        } else {
            ItemStatus::Idle
        }
    }

    pub fn in_flight(&self) -> u32 {
        self.in_flight
    }

    pub fn is_selected(&self) -> bool {
        self.selected.unwrap_or(false)
    }

    pub(crate) fn begin_mutation(&mut self) {
        self.in_flight += 1;
    }

    pub(crate) fn finish_mutation(&mut self, text: Option<String>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if let Some(text) = text {
            self.text = text;
        }
    }
}
