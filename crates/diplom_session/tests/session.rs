use std::sync::{Arc, Mutex};
use std::time::Duration;

use diplom_session::{
    ClientSettings, FunnelStage, FunnelVariant, ItemStatus, RunState, Session, SessionConfig,
    SessionError, TitleField,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EXAMPLE_STREAM: &str = concat!(
    r#"{"type":"goal","id":"g1","text":"Investigate AI impact"}"#,
    "\n",
    r#"{"type":"task","id":"t1","text":"Survey existing literature"}"#,
    "\n",
);

fn config(server: &MockServer, dir: &TempDir, variant: FunnelVariant) -> SessionConfig {
    SessionConfig {
        client: ClientSettings {
            base_url: server.uri(),
            ..ClientSettings::default()
        },
        settle_delay: Duration::from_millis(20),
        download_dir: dir.path().to_path_buf(),
        variant,
    }
}

async fn mount_stream(server: &MockServer, topic: &str, body: &str) {
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_json(json!({ "topic": topic })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/json"))
        .mount(server)
        .await;
}

async fn settle(session: &mut Session) {
    tokio::time::timeout(Duration::from_secs(5), session.run_until_idle())
        .await
        .expect("session went idle");
}

fn ids(items: &[diplom_session::ItemView]) -> Vec<&str> {
    items.iter().map(|item| item.id.as_str()).collect()
}

#[tokio::test]
async fn example_topic_fills_goals_and_tasks() {
    let server = MockServer::start().await;
    mount_stream(&server, "AI in education", EXAMPLE_STREAM).await;
    let dir = TempDir::new().unwrap();
    let mut session =
        Session::new(config(&server, &dir, FunnelVariant::Suggestions)).expect("session");

    session.run_generation("AI in education");
    let running = session.view();
    assert_eq!(running.run, RunState::Running);
    assert!(running.show_generating_hint);
    assert!(running.stages.is_visible(FunnelStage::Goals));

    settle(&mut session).await;
    let view = session.view();
    assert_eq!(ids(&view.goals), vec!["g1"]);
    assert_eq!(ids(&view.tasks), vec!["t1"]);
    assert_eq!(view.run, RunState::Idle);
    assert!(view.stages.is_visible(FunnelStage::Tasks));
    assert!(!view.stages.is_visible(FunnelStage::Document));
    assert_eq!(view.goals[0].selected, None);
}

#[tokio::test]
async fn blank_topic_never_reaches_the_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let mut session =
        Session::new(config(&server, &dir, FunnelVariant::Suggestions)).expect("session");

    session.run_generation("   ");
    settle(&mut session).await;

    let view = session.view();
    assert_eq!(view.topic_error.as_deref(), Some("Please enter a thesis topic."));
    assert_eq!(view.run, RunState::Idle);
    assert!(view.stages.visible_stages().is_empty());
}

#[tokio::test]
async fn goals_alone_reveal_tasks_after_settle_delay() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        "topic",
        "{\"type\":\"goal\",\"id\":\"g1\",\"text\":\"Only goal\"}\n",
    )
    .await;
    let dir = TempDir::new().unwrap();
    let mut session =
        Session::new(config(&server, &dir, FunnelVariant::Suggestions)).expect("session");

    session.run_generation("topic");
    settle(&mut session).await;

    let view = session.view();
    assert!(view.tasks.is_empty());
    assert!(view.stages.is_visible(FunnelStage::Tasks));
}

#[tokio::test]
async fn failed_stream_keeps_partial_items() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        "topic",
        "{\"type\":\"goal\",\"id\":\"g1\",\"text\":\"Kept\"}\nnot json\n",
    )
    .await;
    let dir = TempDir::new().unwrap();
    let mut session =
        Session::new(config(&server, &dir, FunnelVariant::Suggestions)).expect("session");

    session.run_generation("topic");
    settle(&mut session).await;

    let view = session.view();
    assert_eq!(ids(&view.goals), vec!["g1"]);
    match &view.run {
        RunState::Error(message) => {
            assert!(message.starts_with("Could not get a response from the server"))
        }
        other => panic!("expected error state, got {other:?}"),
    }
    assert_eq!(view.error.as_deref(), Some(message_of(&view.run)));

    session.dismiss_error();
    assert_eq!(session.view().error, None);
}

fn message_of(run: &RunState) -> &str {
    match run {
        RunState::Error(message) => message,
        _ => "",
    }
}

#[tokio::test]
async fn newer_run_discards_slow_earlier_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_json(json!({ "topic": "slow" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_raw(
                    "{\"type\":\"goal\",\"id\":\"old\",\"text\":\"Old\"}\n",
                    "application/json",
                ),
        )
        .mount(&server)
        .await;
    mount_stream(
        &server,
        "fast",
        "{\"type\":\"goal\",\"id\":\"new\",\"text\":\"New\"}\n",
    )
    .await;
    let dir = TempDir::new().unwrap();
    let mut session =
        Session::new(config(&server, &dir, FunnelVariant::Suggestions)).expect("session");

    session.run_generation("slow");
    session.run_generation("fast");
    settle(&mut session).await;

    let view = session.view();
    assert_eq!(ids(&view.goals), vec!["new"]);
    assert_eq!(view.run, RunState::Idle);
}

#[tokio::test]
async fn rephrase_changes_only_the_target() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        "topic",
        concat!(
            "{\"type\":\"goal\",\"id\":\"g1\",\"text\":\"First\"}\n",
            "{\"type\":\"goal\",\"id\":\"g2\",\"text\":\"Second\"}\n",
        ),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/items/g1/rephrase"))
        .and(body_json(json!({ "type": "goal" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "g1", "text": "First, reworded" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let mut session =
        Session::new(config(&server, &dir, FunnelVariant::Suggestions)).expect("session");
    session.run_generation("topic");
    settle(&mut session).await;

    session.rephrase("g1");
    let pending = session.view();
    assert_eq!(pending.goals[0].status, ItemStatus::Loading);
    assert!(!pending.goals[0].actions_enabled);
    assert_eq!(pending.goals[1].status, ItemStatus::Idle);

    settle(&mut session).await;
    let view = session.view();
    assert_eq!(view.goals[0].text, "First, reworded");
    assert_eq!(view.goals[0].status, ItemStatus::Idle);
    assert_eq!(view.goals[1].text, "Second");
}

#[tokio::test]
async fn failed_replace_leaves_item_idle_and_unchanged() {
    let server = MockServer::start().await;
    mount_stream(&server, "topic", EXAMPLE_STREAM).await;
    Mock::given(method("POST"))
        .and(path("/items/t1/replace"))
        .and(body_json(json!({ "type": "task" })))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let mut session =
        Session::new(config(&server, &dir, FunnelVariant::Suggestions)).expect("session");
    session.run_generation("topic");
    settle(&mut session).await;

    session.replace("t1");
    settle(&mut session).await;

    let view = session.view();
    assert_eq!(view.tasks[0].text, "Survey existing literature");
    assert_eq!(view.tasks[0].status, ItemStatus::Idle);
    assert_eq!(view.error.as_deref(), Some("Could not replace the wording."));
    assert_eq!(view.run, RunState::Idle);
}

#[tokio::test]
async fn document_lands_in_download_dir() {
    let server = MockServer::start().await;
    mount_stream(&server, "AI in education", EXAMPLE_STREAM).await;
    Mock::given(method("POST"))
        .and(path("/documents/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", "attachment; filename=\"structure.docx\"")
                .set_body_raw(b"PK\x03\x04".to_vec(), "application/octet-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let mut session =
        Session::new(config(&server, &dir, FunnelVariant::Document)).expect("session");

    session.run_generation("AI in education");
    settle(&mut session).await;
    let form = session.view().document.expect("document form");
    assert_eq!(form.title.work_title, "AI in education");
    assert!(!form.title.year.is_empty());
    assert!(session.view().stages.is_visible(FunnelStage::Document));

    for (field, value) in [
        (TitleField::University, "State University"),
        (TitleField::Faculty, "Education"),
        (TitleField::Department, "Pedagogy"),
        (TitleField::StudentName, "A. Student"),
        (TitleField::SupervisorName, "B. Supervisor"),
        (TitleField::City, "Moscow"),
    ] {
        session.set_title_field(field, value);
    }
    session.build_document();
    assert!(session.view().document.unwrap().building);
    settle(&mut session).await;

    let form = session.view().document.unwrap();
    let saved = form.saved_path.expect("saved path");
    assert_eq!(saved, dir.path().join("structure.docx"));
    assert_eq!(std::fs::read(saved).unwrap(), b"PK\x03\x04");
    assert!(!form.building);
    assert_eq!(form.error, None);
}

#[tokio::test]
async fn deselected_tasks_block_document_request() {
    let server = MockServer::start().await;
    mount_stream(&server, "topic", EXAMPLE_STREAM).await;
    Mock::given(method("POST"))
        .and(path("/documents/generate"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let mut session =
        Session::new(config(&server, &dir, FunnelVariant::Document)).expect("session");
    session.run_generation("topic");
    settle(&mut session).await;

    session.toggle_select("t1");
    let view = session.view();
    assert_eq!(view.tasks[0].selected, Some(false));
    assert_eq!(view.goals[0].selected, Some(true));

    session.build_document();
    settle(&mut session).await;
    assert_eq!(
        session.view().document.unwrap().error.as_deref(),
        Some("Select at least one goal and one task for the document.")
    );
}

#[tokio::test]
async fn listeners_follow_the_run() {
    let server = MockServer::start().await;
    mount_stream(&server, "topic", EXAMPLE_STREAM).await;
    let dir = TempDir::new().unwrap();
    let mut session =
        Session::new(config(&server, &dir, FunnelVariant::Suggestions)).expect("session");

    let runs = Arc::new(Mutex::new(Vec::new()));
    let sink = runs.clone();
    session.subscribe(move |view| sink.lock().unwrap().push(view.run.clone()));

    session.run_generation("topic");
    settle(&mut session).await;

    let runs = runs.lock().unwrap();
    assert!(runs.contains(&RunState::Running));
    assert_eq!(runs.last(), Some(&RunState::Idle));
}

#[tokio::test]
async fn malformed_address_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = SessionConfig {
        client: ClientSettings {
            base_url: "not an address".into(),
            ..ClientSettings::default()
        },
        download_dir: dir.path().to_path_buf(),
        ..SessionConfig::default()
    };
    assert!(matches!(
        Session::new(config),
        Err(SessionError::InvalidBaseUrl { .. })
    ));
}

#[test]
fn session_needs_a_runtime() {
    assert!(matches!(
        Session::new(SessionConfig::default()),
        Err(SessionError::NoRuntime)
    ));
}
