//! DiplomAI core: pure funnel state machine and view-model helpers.
mod effect;
mod error;
mod item;
mod msg;
mod stages;
mod state;
mod store;
mod update;
mod view_model;

pub use effect::{DocumentDraft, Effect};
pub use error::ValidationError;
pub use item::{ItemId, ItemKind, ItemStatus, MutationOp, RunEpoch, SuggestionItem};
pub use msg::Msg;
pub use stages::{stage_visibility, FunnelStage, StageVisibility};
pub use state::{
    AppState, DocumentProfile, FunnelVariant, RunState, TitleField, TitlePage,
    TASKS_SETTLE_DELAY,
};
pub use store::ItemStore;
pub use update::update;
pub use view_model::{AppViewModel, DocumentFormView, ItemView};
