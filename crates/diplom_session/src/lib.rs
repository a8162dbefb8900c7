//! DiplomAI session: wires the pure funnel core to the engine and exposes the
//! operations a front end drives.
mod config;
mod effects;
mod error;
pub mod logging;
mod session;
mod store;

pub use config::{SessionConfig, API_URL_ENV};
pub use diplom_engine::ClientSettings;
pub use effects::EffectRunner;
pub use error::SessionError;
pub use session::Session;
pub use store::{StateStore, SubscriptionId};

pub use diplom_core::{
    AppViewModel, DocumentProfile, FunnelStage, FunnelVariant, ItemKind, ItemStatus, ItemView,
    MutationOp, RunState, TitleField,
};
