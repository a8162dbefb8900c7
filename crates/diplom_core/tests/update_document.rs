use std::path::PathBuf;

use diplom_core::{
    update, AppState, DocumentDraft, DocumentProfile, Effect, ItemKind, Msg, TitleField, TitlePage,
    ValidationError,
};
use pretty_assertions::assert_eq;

fn full_title() -> TitlePage {
    TitlePage {
        university: "State University".into(),
        faculty: "Faculty of Education".into(),
        department: "Pedagogy".into(),
        work_title: String::new(),
        student_name: "A. Student".into(),
        supervisor_name: "B. Supervisor".into(),
        city: "Moscow".into(),
        year: "2026".into(),
    }
}

fn generated(state: AppState) -> AppState {
    let (state, _) = update(state, Msg::TopicChanged("AI in education".to_string()));
    let (mut state, _) = update(state, Msg::GenerateClicked);
    let epoch = state.epoch();
    for (kind, id, text) in [
        (ItemKind::Goal, "g1", "Investigate AI impact"),
        (ItemKind::Goal, "g2", "Assess risks"),
        (ItemKind::Task, "t1", "Survey existing literature"),
    ] {
        let msg = Msg::RecordReceived {
            epoch,
            kind,
            id: id.to_string(),
            text: text.to_string(),
        };
        state = update(state, msg).0;
    }
    update(state, Msg::GenerationFinished { epoch, result: Ok(()) }).0
}

#[test]
fn build_emits_selected_items_and_title() {
    let state = generated(AppState::new().with_title(full_title()));
    let (state, _) = update(state, Msg::ToggleSelected("g2".to_string()));
    let (state, _) = update(state, Msg::ProfileSelected(DocumentProfile::Hse));
    assert!(state.view().document.unwrap().can_build);

    let (state, effects) = update(state, Msg::BuildDocumentClicked);

    let mut expected_title = full_title();
    expected_title.work_title = "AI in education".to_string();
    assert_eq!(
        effects,
        vec![Effect::BuildDocument(DocumentDraft {
            profile: DocumentProfile::Hse,
            title: expected_title,
            goals: vec!["Investigate AI impact".to_string()],
            tasks: vec!["Survey existing literature".to_string()],
        })]
    );
    let form = state.view().document.unwrap();
    assert!(form.building);
    assert!(!form.can_build);

    let (_, effects) = update(state, Msg::BuildDocumentClicked);
    assert!(effects.is_empty());
}

#[test]
fn nothing_selected_is_reported_locally() {
    let state = generated(AppState::new().with_title(full_title()));
    let (state, _) = update(state, Msg::ToggleSelected("t1".to_string()));
    let (state, effects) = update(state, Msg::BuildDocumentClicked);

    assert!(effects.is_empty());
    assert_eq!(
        state.document_error(),
        Some(ValidationError::NothingSelected.to_string().as_str())
    );
    assert!(!state.is_document_building());
}

#[test]
fn blank_title_fields_are_reported_locally() {
    let state = generated(AppState::new().with_title(full_title()));
    let (state, _) = update(
        state,
        Msg::TitleFieldChanged {
            field: TitleField::City,
            value: "   ".to_string(),
        },
    );
    let (state, effects) = update(state, Msg::BuildDocumentClicked);

    assert!(effects.is_empty());
    assert_eq!(
        state.document_error(),
        Some(
            ValidationError::MissingTitleFields(vec![TitleField::City])
                .to_string()
                .as_str()
        )
    );
}

#[test]
fn saved_document_is_recorded_and_failure_reported() {
    let state = generated(AppState::new().with_title(full_title()));
    let (state, _) = update(state, Msg::BuildDocumentClicked);
    let (state, _) = update(
        state,
        Msg::DocumentSaved(Ok(PathBuf::from("out/diplom-structure.docx"))),
    );
    assert_eq!(
        state.saved_document(),
        Some(PathBuf::from("out/diplom-structure.docx").as_path())
    );
    assert!(!state.is_document_building());

    let (state, _) = update(state, Msg::BuildDocumentClicked);
    let (state, _) = update(state, Msg::DocumentSaved(Err("http status 422".to_string())));
    assert_eq!(
        state.document_error(),
        Some("Could not build the document: http status 422")
    );
    assert_eq!(state.view().error, None);
}

#[test]
fn new_run_prefills_work_title_and_clears_document_error() {
    let state = generated(AppState::new());
    let (state, _) = update(state, Msg::BuildDocumentClicked);
    assert!(state.document_error().is_some());

    let (state, _) = update(state, Msg::TopicChanged("  Robotics  ".to_string()));
    let (state, _) = update(state, Msg::GenerateClicked);
    assert_eq!(state.title().get(TitleField::WorkTitle), "Robotics");
    assert_eq!(state.document_error(), None);
}
