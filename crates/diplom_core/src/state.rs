use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::stages::{stage_visibility, StageVisibility};
use crate::view_model::{AppViewModel, DocumentFormView, ItemView};
use crate::{ItemKind, ItemStore, RunEpoch, SuggestionItem, ValidationError};

/// Delay between the first goal of a run and the task stage being revealed.
pub const TASKS_SETTLE_DELAY: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Error(String),
}

/// Whether the funnel ends in a document stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FunnelVariant {
    /// Goals and tasks only; no selection.
    Suggestions,
    #[default]
    Document,
}

/// Formatting guideline the document outline follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentProfile {
    #[default]
    Gost,
    Msu,
    Hse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TitleField {
    University,
    Faculty,
    Department,
    WorkTitle,
    StudentName,
    SupervisorName,
    City,
    Year,
}

impl TitleField {
    pub const ALL: [TitleField; 8] = [
        TitleField::University,
        TitleField::Faculty,
        TitleField::Department,
        TitleField::WorkTitle,
        TitleField::StudentName,
        TitleField::SupervisorName,
        TitleField::City,
        TitleField::Year,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TitleField::University => "university",
            TitleField::Faculty => "faculty",
            TitleField::Department => "department",
            TitleField::WorkTitle => "work title",
            TitleField::StudentName => "student name",
            TitleField::SupervisorName => "supervisor name",
            TitleField::City => "city",
            TitleField::Year => "year",
        }
    }
}

/// Title page fields of the generated document. All are required.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TitlePage {
    pub university: String,
    pub faculty: String,
    pub department: String,
    pub work_title: String,
    pub student_name: String,
    pub supervisor_name: String,
    pub city: String,
    pub year: String,
}

impl TitlePage {
    pub fn get(&self, field: TitleField) -> &str {
        match field {
            TitleField::University => &self.university,
            TitleField::Faculty => &self.faculty,
            TitleField::Department => &self.department,
            TitleField::WorkTitle => &self.work_title,
            TitleField::StudentName => &self.student_name,
            TitleField::SupervisorName => &self.supervisor_name,
            TitleField::City => &self.city,
            TitleField::Year => &self.year,
        }
    }

    pub fn set(&mut self, field: TitleField, value: String) {
        let slot = match field {
            TitleField::University => &mut self.university,
            TitleField::Faculty => &mut self.faculty,
            TitleField::Department => &mut self.department,
            TitleField::WorkTitle => &mut self.work_title,
            TitleField::StudentName => &mut self.student_name,
            TitleField::SupervisorName => &mut self.supervisor_name,
            TitleField::City => &mut self.city,
            TitleField::Year => &mut self.year,
        };
        *slot = value;
    }

    pub fn missing_fields(&self) -> Vec<TitleField> {
        TitleField::ALL
            .into_iter()
            .filter(|field| self.get(*field).trim().is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    variant: FunnelVariant,
    settle_delay: Duration,
    topic: String,
    topic_error: Option<ValidationError>,
    run: RunState,
    epoch: RunEpoch,
    items: ItemStore,
    tasks_settled: bool,
    notice: Option<String>,
    profile: DocumentProfile,
    title: TitlePage,
    document_error: Option<String>,
    document_building: bool,
    saved_document: Option<PathBuf>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_variant(FunnelVariant::default())
    }

    pub fn with_variant(variant: FunnelVariant) -> Self {
        Self {
            variant,
            settle_delay: TASKS_SETTLE_DELAY,
            ..Self::default()
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_title(mut self, title: TitlePage) -> Self {
        self.title = title;
        self
    }

    pub fn variant(&self) -> FunnelVariant {
        self.variant
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn epoch(&self) -> RunEpoch {
        self.epoch
    }

    pub fn items(&self) -> &ItemStore {
        &self.items
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn profile(&self) -> DocumentProfile {
        self.profile
    }

    pub fn title(&self) -> &TitlePage {
        &self.title
    }

    pub fn document_error(&self) -> Option<&str> {
        self.document_error.as_deref()
    }

    pub fn saved_document(&self) -> Option<&Path> {
        self.saved_document.as_deref()
    }

    pub fn is_document_building(&self) -> bool {
        self.document_building
    }

    pub fn stages(&self) -> StageVisibility {
        stage_visibility(&self.items, &self.run, self.tasks_settled, self.variant)
    }

    pub fn view(&self) -> AppViewModel {
        let is_generating = self.run == RunState::Running;
        let error = self.notice.clone().or_else(|| match &self.run {
            RunState::Error(message) => Some(message.clone()),
            _ => None,
        });
        let document = match self.variant {
            FunnelVariant::Document => Some(DocumentFormView {
                profile: self.profile,
                title: self.title.clone(),
                error: self.document_error.clone(),
                building: self.document_building,
                can_build: !self.document_building && self.validate_document().is_ok(),
                saved_path: self.saved_document.clone(),
            }),
            FunnelVariant::Suggestions => None,
        };

        AppViewModel {
            topic: self.topic.clone(),
            topic_error: self.topic_error.as_ref().map(ToString::to_string),
            run: self.run.clone(),
            is_generating,
            show_generating_hint: is_generating && self.items.is_empty(),
            error,
            goals: self.items.goals().iter().map(ItemView::from_item).collect(),
            tasks: self.items.tasks().iter().map(ItemView::from_item).collect(),
            stages: self.stages(),
            document,
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_topic(&mut self, topic: String) {
        if self.topic != topic {
            self.topic = topic;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_topic_error(&mut self, error: ValidationError) {
        self.topic_error = Some(error);
        self.mark_dirty();
    }

    /// Resets the funnel for a new run and returns the trimmed topic.
    pub(crate) fn begin_run(&mut self) -> Result<String, ValidationError> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(ValidationError::BlankTopic);
        }
        let topic = topic.to_string();

        self.topic_error = None;
        self.notice = None;
        self.document_error = None;
        self.items.clear();
        self.tasks_settled = false;
        self.title.work_title = topic.clone();
        self.epoch += 1;
        self.run = RunState::Running;
        self.mark_dirty();
        Ok(topic)
    }

    /// Appends a streamed record. Returns true when it was the first goal of the run.
    pub(crate) fn append_record(&mut self, kind: ItemKind, id: String, text: String) -> bool {
        let first_goal = kind == ItemKind::Goal && self.items.goals().is_empty();
        let item = SuggestionItem::new(id, kind, text);
        let item = match self.variant {
            FunnelVariant::Document => item.with_selected(true),
            FunnelVariant::Suggestions => item,
        };
        self.items.append(item);
        self.mark_dirty();
        first_goal
    }

    pub(crate) fn finish_run(&mut self, result: Result<(), String>) {
        self.run = match result {
            Ok(()) => RunState::Idle,
            Err(cause) => RunState::Error(format!(
                "Could not get a response from the server: {cause}"
            )),
        };
        self.mark_dirty();
    }

    pub(crate) fn settle_tasks(&mut self) {
        if !self.items.goals().is_empty() && !self.tasks_settled {
            self.tasks_settled = true;
            self.mark_dirty();
        }
    }

    pub(crate) fn items_mut(&mut self) -> &mut ItemStore {
        self.mark_dirty();
        &mut self.items
    }

    pub(crate) fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
        self.mark_dirty();
    }

    pub(crate) fn dismiss_error(&mut self) {
        let had_error = matches!(self.run, RunState::Error(_));
        if had_error {
            self.run = RunState::Idle;
        }
        if self.notice.take().is_some() || had_error {
            self.mark_dirty();
        }
    }

    pub(crate) fn set_profile(&mut self, profile: DocumentProfile) {
        if self.profile != profile {
            self.profile = profile;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_title_field(&mut self, field: TitleField, value: String) {
        self.title.set(field, value);
        self.mark_dirty();
    }

    /// Selected goal and task texts, provided the form is complete.
    pub(crate) fn validate_document(&self) -> Result<(Vec<String>, Vec<String>), ValidationError> {
        let goals = self.items.selected_texts(ItemKind::Goal);
        let tasks = self.items.selected_texts(ItemKind::Task);
        if goals.is_empty() || tasks.is_empty() {
            return Err(ValidationError::NothingSelected);
        }
        let missing = self.title.missing_fields();
        if !missing.is_empty() {
            return Err(ValidationError::MissingTitleFields(missing));
        }
        Ok((goals, tasks))
    }

    pub(crate) fn set_document_error(&mut self, error: String) {
        self.document_error = Some(error);
        self.mark_dirty();
    }

    pub(crate) fn start_document_build(&mut self) {
        self.document_error = None;
        self.document_building = true;
        self.mark_dirty();
    }

    pub(crate) fn finish_document_build(&mut self, result: Result<PathBuf, String>) {
        self.document_building = false;
        match result {
            Ok(path) => self.saved_document = Some(path),
            Err(cause) => {
                self.document_error = Some(format!("Could not build the document: {cause}"))
            }
        }
        self.mark_dirty();
    }
}
