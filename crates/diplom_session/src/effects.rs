use diplom_core::{DocumentDraft, Effect, ItemKind, MutationOp, Msg};
use diplom_engine::{DocumentProfile, DocumentRequest, EngineEvent, EngineHandle, TitlePage};
use diplom_logging::{diplom_debug, diplom_info, diplom_warn};

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartGeneration { epoch, topic } => {
                    diplom_info!("StartGeneration epoch={} topic_len={}", epoch, topic.len());
                    self.engine.start_generation(epoch, topic);
                }
                Effect::ScheduleSettle { epoch, delay } => {
                    diplom_debug!("ScheduleSettle epoch={} delay={:?}", epoch, delay);
                    self.engine.schedule_settle(epoch, delay);
                }
                Effect::MutateItem { epoch, id, kind, op } => {
                    diplom_debug!("MutateItem epoch={} id={} op={}", epoch, id, op);
                    self.engine
                        .mutate(epoch, id, engine_kind(kind), engine_op(op));
                }
                Effect::BuildDocument(draft) => {
                    diplom_info!(
                        "BuildDocument goals={} tasks={}",
                        draft.goals.len(),
                        draft.tasks.len()
                    );
                    self.engine.build_document(document_request(draft));
                }
            }
        }
    }

    /// Next event that is already waiting, if any.
    pub fn try_next(&mut self) -> Option<Msg> {
        self.engine.try_recv().map(map_event)
    }

    /// Waits for the next event.
    pub async fn next(&mut self) -> Option<Msg> {
        self.engine.recv().await.map(map_event)
    }

    /// True when no engine task is running. Tasks report before they finish,
    /// so once idle every event is already queued.
    pub fn is_idle(&self) -> bool {
        self.engine.in_flight() == 0
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::RecordReceived { epoch, record } => Msg::RecordReceived {
            epoch,
            kind: core_kind(record.kind),
            id: record.id,
            text: record.text,
        },
        EngineEvent::GenerationFinished { epoch, result } => Msg::GenerationFinished {
            epoch,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::SettleElapsed { epoch } => Msg::SettleElapsed { epoch },
        EngineEvent::MutationFinished {
            epoch,
            id,
            op,
            result,
        } => {
            let result = match result {
                Ok(update) => {
                    if update.id != id {
                        diplom_warn!("service answered for {} when asked about {}", update.id, id);
                    }
                    Ok(update.text)
                }
                Err(err) => Err(err.to_string()),
            };
            Msg::MutationFinished {
                epoch,
                id,
                op: core_op(op),
                result,
            }
        }
        EngineEvent::DocumentSaved { result } => {
            Msg::DocumentSaved(result.map_err(|err| err.to_string()))
        }
    }
}

fn document_request(draft: DocumentDraft) -> DocumentRequest {
    let title = draft.title;
    DocumentRequest {
        profile: match draft.profile {
            diplom_core::DocumentProfile::Gost => DocumentProfile::Gost,
            diplom_core::DocumentProfile::Msu => DocumentProfile::Msu,
            diplom_core::DocumentProfile::Hse => DocumentProfile::Hse,
        },
        title: TitlePage {
            university: title.university,
            faculty: title.faculty,
            department: title.department,
            work_title: title.work_title,
            student_name: title.student_name,
            supervisor_name: title.supervisor_name,
            city: title.city,
            year: title.year,
        },
        goals: draft.goals,
        tasks: draft.tasks,
    }
}

fn engine_kind(kind: ItemKind) -> diplom_engine::ItemKind {
    match kind {
        ItemKind::Goal => diplom_engine::ItemKind::Goal,
        ItemKind::Task => diplom_engine::ItemKind::Task,
    }
}

fn core_kind(kind: diplom_engine::ItemKind) -> ItemKind {
    match kind {
        diplom_engine::ItemKind::Goal => ItemKind::Goal,
        diplom_engine::ItemKind::Task => ItemKind::Task,
    }
}

fn engine_op(op: MutationOp) -> diplom_engine::MutationOp {
    match op {
        MutationOp::Rephrase => diplom_engine::MutationOp::Rephrase,
        MutationOp::Replace => diplom_engine::MutationOp::Replace,
    }
}

fn core_op(op: diplom_engine::MutationOp) -> MutationOp {
    match op {
        diplom_engine::MutationOp::Rephrase => MutationOp::Rephrase,
        diplom_engine::MutationOp::Replace => MutationOp::Replace,
    }
}
