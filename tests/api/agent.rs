use std::{sync::Arc, time::Duration};

use drafts::agent::{AgentConfig, DraftAgent, Edit, EditSession, HttpTransport, Status};
use drafts::editor::EditorConfig;
use drafts::routes::Discarded;
use drafts::store::DraftStore;
use secrecy::Secret;
use tokio::time::timeout;

use crate::helpers::{spawn_app, TestApp, TestUser};

async fn open_editor(app: &TestApp, user: &TestUser, edit_token: &str) -> drafts::agent::AgentHandle {
    let editor: EditorConfig = app
        .editor(user, "Main Page", None)
        .await
        .json()
        .await
        .unwrap();
    let mut config = AgentConfig::from(&editor);
    config.auto_save_wait = Some(Duration::from_millis(50));
    config.auto_save_timeout = Duration::from_secs(5);

    let session = EditSession::from_editor(
        &editor,
        Secret::new(edit_token.to_string()),
        "Main Page",
        "20240601120000",
        "20240601115500",
    );
    let transport = HttpTransport::new(&app.address, Secret::new(user.jwt.clone()));
    DraftAgent::spawn(config, session, Arc::new(transport))
}

#[tokio::test]
async fn editing_session_autosaves_then_publishes() {
    let app = spawn_app().await;
    let user = app.test_user();
    let agent = open_editor(&app, &user, &user.edit_token).await;

    agent.edit(Edit::Text("first words".into())).await.unwrap();
    let saved = timeout(Duration::from_secs(5), agent.wait_for(Status::Saved))
        .await
        .expect("autosave completed")
        .unwrap();
    let id = saved.draft_id.expect("server assigned an id");
    assert!(!saved.control.enabled);
    assert_eq!(app.store.get(id).await.unwrap().unwrap().text, "first words");

    agent.edit(Edit::Text("more words".into())).await.unwrap();
    let changed = agent.wait_for(Status::Changed).await.unwrap();
    assert!(changed.control.enabled);
    agent.save().await.unwrap();
    timeout(Duration::from_secs(5), agent.wait_for(Status::Saved))
        .await
        .expect("manual save completed")
        .unwrap();
    assert_eq!(agent.draft_id(), Some(id));
    assert_eq!(app.store.get(id).await.unwrap().unwrap().text, "more words");
    assert_eq!(app.store.count_for_title("Main Page").await.unwrap(), 1);

    let discarded: Discarded = app.publish_succeeded(&user, id).await.json().await.unwrap();
    assert!(discarded.discarded);
    assert!(app.store.get(id).await.unwrap().is_none());
    agent.shutdown().await;
}

#[tokio::test]
async fn stale_edit_token_puts_the_agent_in_error() {
    let app = spawn_app().await;
    let user = app.test_user();
    let agent = open_editor(&app, &user, "expired-token").await;

    agent.edit(Edit::Text("lost words".into())).await.unwrap();
    agent.save().await.unwrap();
    let state = timeout(Duration::from_secs(5), agent.wait_for(Status::Error))
        .await
        .expect("save answered")
        .unwrap();

    assert_eq!(state.draft_id, None);
    assert_eq!(state.control.label, "Error");
    assert_eq!(app.store.count_for_title("Main Page").await.unwrap(), 0);
}
