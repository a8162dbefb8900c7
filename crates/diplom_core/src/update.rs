use diplom_logging::{diplom_debug, diplom_info, diplom_warn};

use crate::{AppState, DocumentDraft, Effect, FunnelVariant, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::TopicChanged(topic) => {
            state.set_topic(topic);
            Vec::new()
        }
        Msg::GenerateClicked => match state.begin_run() {
            Ok(topic) => {
                diplom_info!(
                    "starting run {} topic_len={}",
                    state.epoch(),
                    topic.len()
                );
                vec![Effect::StartGeneration {
                    epoch: state.epoch(),
                    topic,
                }]
            }
            Err(err) => {
                diplom_debug!("generation rejected: {}", err);
                state.set_topic_error(err);
                Vec::new()
            }
        },
        Msg::RecordReceived {
            epoch,
            kind,
            id,
            text,
        } => {
            // Records of a superseded run must never reach the new run's store.
            if epoch != state.epoch() {
                diplom_debug!("dropping stale record id={} from run {}", id, epoch);
                return (state, Vec::new());
            }
            if state.append_record(kind, id, text) {
                vec![Effect::ScheduleSettle {
                    epoch,
                    delay: state.settle_delay(),
                }]
            } else {
                Vec::new()
            }
        }
        Msg::GenerationFinished { epoch, result } => {
            if epoch == state.epoch() {
                if let Err(cause) = &result {
                    diplom_warn!("generation failed: {}", cause);
                }
                state.finish_run(result);
            }
            Vec::new()
        }
        Msg::SettleElapsed { epoch } => {
            if epoch == state.epoch() {
                state.settle_tasks();
            }
            Vec::new()
        }
        Msg::MutateClicked { id, op } => {
            if !state.items().contains(&id) {
                return (state, Vec::new());
            }
            let epoch = state.epoch();
            match state.items_mut().begin_mutation(&id) {
                Some(kind) => vec![Effect::MutateItem { epoch, id, kind, op }],
                None => Vec::new(),
            }
        }
        Msg::MutationFinished {
            epoch,
            id,
            op,
            result,
        } => {
            // The item may have been cleared by a newer run while the request was out.
            if epoch != state.epoch() || !state.items().contains(&id) {
                diplom_debug!("discarding {} result for vanished item {}", op, id);
                return (state, Vec::new());
            }
            match result {
                Ok(text) => {
                    state.items_mut().finish_mutation(&id, Some(text));
                }
                Err(cause) => {
                    diplom_warn!("{} of item {} failed: {}", op, id, cause);
                    state.items_mut().finish_mutation(&id, None);
                    state.set_notice(op.failure_notice());
                }
            }
            Vec::new()
        }
        Msg::ToggleSelected(id) => {
            if state.variant() == FunnelVariant::Document && state.items().contains(&id) {
                state.items_mut().toggle_selected(&id);
            }
            Vec::new()
        }
        Msg::ProfileSelected(profile) => {
            state.set_profile(profile);
            Vec::new()
        }
        Msg::TitleFieldChanged { field, value } => {
            state.set_title_field(field, value);
            Vec::new()
        }
        Msg::BuildDocumentClicked => {
            if state.variant() != FunnelVariant::Document || state.is_document_building() {
                return (state, Vec::new());
            }
            match state.validate_document() {
                Ok((goals, tasks)) => {
                    state.start_document_build();
                    vec![Effect::BuildDocument(DocumentDraft {
                        profile: state.profile(),
                        title: state.title().clone(),
                        goals,
                        tasks,
                    })]
                }
                Err(err) => {
                    state.set_document_error(err.to_string());
                    Vec::new()
                }
            }
        }
        Msg::DocumentSaved(result) => {
            state.finish_document_build(result);
            Vec::new()
        }
        Msg::DismissError => {
            state.dismiss_error();
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
