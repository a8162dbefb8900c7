use std::sync::Arc;

use chrono::Datelike;
use diplom_core::{
    AppState, AppViewModel, DocumentProfile, ItemId, Msg, MutationOp, TitleField, TitlePage,
};
use diplom_engine::{EngineHandle, FailureKind, GenerationService, ReqwestClient};
use diplom_logging::diplom_info;
use tokio::runtime::Handle;

use crate::effects::EffectRunner;
use crate::store::{StateStore, SubscriptionId};
use crate::{SessionConfig, SessionError};

/// One user's funnel: state, listeners and the engine running its requests.
///
/// Every operation applies its message immediately and starts any resulting
/// requests in the background. Their results are applied by [`Session::pump_next`]
/// or [`Session::run_until_idle`].
pub struct Session {
    store: StateStore,
    runner: EffectRunner,
}

impl Session {
    /// Creates a session talking to the configured service over HTTP.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let runtime = Handle::try_current().map_err(|_| SessionError::NoRuntime)?;
        let client = ReqwestClient::new(config.client.clone()).map_err(|err| {
            if err.kind == FailureKind::InvalidUrl {
                SessionError::InvalidBaseUrl {
                    address: config.client.base_url.clone(),
                    reason: err.message,
                }
            } else {
                SessionError::Client(err)
            }
        })?;
        diplom_info!("session using service at {}", config.client.base_url);
        Ok(Self::with_service(config, Arc::new(client), runtime))
    }

    /// Creates a session over any service implementation.
    pub fn with_service(
        config: SessionConfig,
        service: Arc<dyn GenerationService>,
        runtime: Handle,
    ) -> Self {
        let title = TitlePage {
            year: chrono::Local::now().year().to_string(),
            ..TitlePage::default()
        };
        let state = AppState::with_variant(config.variant)
            .with_settle_delay(config.settle_delay)
            .with_title(title);
        let engine = EngineHandle::new(service, config.download_dir, runtime);
        Self {
            store: StateStore::new(state),
            runner: EffectRunner::new(engine),
        }
    }

    pub fn state(&self) -> &AppState {
        self.store.get()
    }

    pub fn view(&self) -> AppViewModel {
        self.store.view()
    }

    /// Calls `listener` with a fresh view model after every change.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&AppViewModel) + Send + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.apply(Msg::TopicChanged(topic.into()));
    }

    /// Starts a new generation run for `topic`, superseding any current run.
    /// A blank topic only sets the inline topic error.
    pub fn run_generation(&mut self, topic: impl Into<String>) {
        self.apply(Msg::TopicChanged(topic.into()));
        self.apply(Msg::GenerateClicked);
    }

    pub fn rephrase(&mut self, id: impl Into<ItemId>) {
        self.apply(Msg::MutateClicked {
            id: id.into(),
            op: MutationOp::Rephrase,
        });
    }

    pub fn replace(&mut self, id: impl Into<ItemId>) {
        self.apply(Msg::MutateClicked {
            id: id.into(),
            op: MutationOp::Replace,
        });
    }

    pub fn toggle_select(&mut self, id: impl Into<ItemId>) {
        self.apply(Msg::ToggleSelected(id.into()));
    }

    pub fn set_profile(&mut self, profile: DocumentProfile) {
        self.apply(Msg::ProfileSelected(profile));
    }

    pub fn set_title_field(&mut self, field: TitleField, value: impl Into<String>) {
        self.apply(Msg::TitleFieldChanged {
            field,
            value: value.into(),
        });
    }

    pub fn build_document(&mut self) {
        self.apply(Msg::BuildDocumentClicked);
    }

    pub fn dismiss_error(&mut self) {
        self.apply(Msg::DismissError);
    }

    /// Waits for one background result and applies it.
    pub async fn pump_next(&mut self) -> bool {
        match self.runner.next().await {
            Some(msg) => {
                self.apply(msg);
                true
            }
            None => false,
        }
    }

    /// Applies background results until no request or timer is left running.
    pub async fn run_until_idle(&mut self) {
        loop {
            self.drain_ready();
            if self.runner.is_idle() {
                if !self.drain_ready() && self.runner.is_idle() {
                    return;
                }
                continue;
            }
            if !self.pump_next().await {
                return;
            }
        }
    }

    fn drain_ready(&mut self) -> bool {
        let mut applied = false;
        while let Some(msg) = self.runner.try_next() {
            self.apply(msg);
            applied = true;
        }
        applied
    }

    fn apply(&mut self, msg: Msg) {
        let effects = self.store.dispatch(msg);
        self.runner.run(effects);
    }
}
