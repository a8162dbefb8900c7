use std::path::PathBuf;

use crate::{DocumentProfile, ItemId, ItemKind, MutationOp, RunEpoch, TitleField};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the topic input.
    TopicChanged(String),
    /// User asked for a generation run on the current topic.
    GenerateClicked,
    /// One decoded stream record of the run identified by `epoch`.
    RecordReceived {
        epoch: RunEpoch,
        kind: ItemKind,
        id: ItemId,
        text: String,
    },
    /// Generation stream ended, cleanly or not.
    GenerationFinished {
        epoch: RunEpoch,
        result: Result<(), String>,
    },
    /// The task stage settle delay of run `epoch` elapsed.
    SettleElapsed { epoch: RunEpoch },
    /// User clicked rephrase/replace on an item.
    MutateClicked { id: ItemId, op: MutationOp },
    /// A rephrase/replace request resolved with the new text or a failure.
    MutationFinished {
        epoch: RunEpoch,
        id: ItemId,
        op: MutationOp,
        result: Result<String, String>,
    },
    /// User toggled the document selection checkbox of an item.
    ToggleSelected(ItemId),
    ProfileSelected(DocumentProfile),
    TitleFieldChanged { field: TitleField, value: String },
    /// User asked for the document download.
    BuildDocumentClicked,
    /// Document written to disk, or failed.
    DocumentSaved(Result<PathBuf, String>),
    /// User dismissed the run-level error message.
    DismissError,
    /// Fallback for placeholder wiring.
    NoOp,
}
