use drafts::editor::EditorConfig;

use crate::helpers::spawn_app;

#[tokio::test]
async fn editor_handoff_carries_configuration_and_draft_count() {
    let app = spawn_app().await;
    let user = app.test_user();
    app.save(&user, None, "Main Page", "earlier").await;

    let response = app.editor(&user, "Main Page", None).await;

    assert_eq!(response.status().as_u16(), 200);
    let config: EditorConfig = response.json().await.unwrap();
    assert_eq!(config.draft_count, 1);
    assert!(config.draft.is_none());
    assert_eq!(config.auto_save_timeout, 10);
    assert_eq!(config.messages.saving, "Saving...");
    assert!(!config.draft_token.is_empty());
}

#[tokio::test]
async fn each_editor_session_gets_its_own_token() {
    let app = spawn_app().await;
    let user = app.test_user();

    let first: EditorConfig = app.editor(&user, "Main Page", None).await.json().await.unwrap();
    let second: EditorConfig = app.editor(&user, "Main Page", None).await.json().await.unwrap();

    assert_ne!(first.draft_token, second.draft_token);
}

#[tokio::test]
async fn editor_resumes_an_owned_draft() {
    let app = spawn_app().await;
    let user = app.test_user();
    let id = app.save(&user, None, "Main Page", "pick up here").await;

    let config: EditorConfig = app
        .editor(&user, "Main Page", Some(id))
        .await
        .json()
        .await
        .unwrap();

    let draft = config.draft.expect("draft resumed");
    assert_eq!(draft.id, id);
    assert_eq!(draft.text, "pick up here");
    assert_eq!(config.draft_token, "tab-token");
}

#[tokio::test]
async fn editor_does_not_leak_foreign_drafts() {
    let app = spawn_app().await;
    let owner = app.test_user();
    let other = app.test_user();
    let id = app.save(&owner, None, "Main Page", "private").await;

    let config: EditorConfig = app
        .editor(&other, "Main Page", Some(id))
        .await
        .json()
        .await
        .unwrap();

    assert!(config.draft.is_none());
    assert_eq!(config.draft_count, 0);
}
