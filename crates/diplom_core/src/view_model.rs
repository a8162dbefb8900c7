use std::path::PathBuf;

use crate::{
    DocumentProfile, ItemId, ItemKind, ItemStatus, RunState, StageVisibility, SuggestionItem,
    TitlePage,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub topic: String,
    pub topic_error: Option<String>,
    pub run: RunState,
    pub is_generating: bool,
    /// Run in progress and nothing has arrived yet.
    pub show_generating_hint: bool,
    /// Run-level error: a mutation notice, or the failed run's message.
    pub error: Option<String>,
    pub goals: Vec<ItemView>,
    pub tasks: Vec<ItemView>,
    pub stages: StageVisibility,
    pub document: Option<DocumentFormView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub id: ItemId,
    pub kind: ItemKind,
    pub text: String,
    pub status: ItemStatus,
    pub selected: Option<bool>,
    pub actions_enabled: bool,
}

impl ItemView {
    pub(crate) fn from_item(item: &SuggestionItem) -> Self {
        let status = item.status();
        Self {
            id: item.id.clone(),
            kind: item.kind,
            text: item.text.clone(),
            status,
            selected: item.selected,
            actions_enabled: status == ItemStatus::Idle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFormView {
    pub profile: DocumentProfile,
    pub title: TitlePage,
    pub error: Option<String>,
    pub building: bool,
    pub can_build: bool,
    pub saved_path: Option<PathBuf>,
}
