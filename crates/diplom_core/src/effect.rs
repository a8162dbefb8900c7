use std::time::Duration;

use crate::{DocumentProfile, ItemId, ItemKind, MutationOp, RunEpoch, TitlePage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open the generation stream for `topic`, superseding any earlier run.
    StartGeneration { epoch: RunEpoch, topic: String },
    /// Report back with `Msg::SettleElapsed` after `delay`.
    ScheduleSettle { epoch: RunEpoch, delay: Duration },
    MutateItem {
        epoch: RunEpoch,
        id: ItemId,
        kind: ItemKind,
        op: MutationOp,
    },
    BuildDocument(DocumentDraft),
}

/// Validated inputs for a document build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDraft {
    pub profile: DocumentProfile,
    pub title: TitlePage,
    pub goals: Vec<String>,
    pub tasks: Vec<String>,
}
