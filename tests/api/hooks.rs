use drafts::routes::{Discarded, Retitled};
use drafts::store::DraftStore;

use crate::helpers::spawn_app;

#[tokio::test]
async fn rename_moves_every_users_drafts() {
    let app = spawn_app().await;
    let alice = app.test_user();
    let bob = app.test_user();
    let a = app.save(&alice, None, "Sandbox", "a").await;
    let b = app.save(&bob, None, "Sandbox", "b").await;
    let other = app.save(&bob, None, "Help", "c").await;

    let response = app.document_renamed("Sandbox", "Playground").await;

    assert_eq!(response.status().as_u16(), 200);
    let retitled: Retitled = response.json().await.unwrap();
    assert_eq!(retitled.moved, 2);
    for (id, owner) in [(a, alice.id), (b, bob.id)] {
        let draft = app.store.get(id).await.unwrap().unwrap();
        assert_eq!(draft.title, "Playground");
        assert_eq!(draft.owner, owner);
    }
    assert_eq!(app.store.get(other).await.unwrap().unwrap().title, "Help");
}

#[tokio::test]
async fn rename_to_blank_title_is_rejected() {
    let app = spawn_app().await;

    let response = app.document_renamed("Sandbox", " ").await;

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn publish_discards_the_draft() {
    let app = spawn_app().await;
    let user = app.test_user();
    let id = app.save(&user, None, "Main Page", "ready").await;

    let discarded: Discarded = app.publish_succeeded(&user, id).await.json().await.unwrap();
    assert!(discarded.discarded);
    assert!(app.store.get(id).await.unwrap().is_none());

    let again: Discarded = app.publish_succeeded(&user, id).await.json().await.unwrap();
    assert!(!again.discarded);
}

#[tokio::test]
async fn publish_by_another_user_keeps_the_draft() {
    let app = spawn_app().await;
    let owner = app.test_user();
    let other = app.test_user();
    let id = app.save(&owner, None, "Main Page", "ready").await;

    let response = app.publish_succeeded(&other, id).await;

    assert_eq!(response.status().as_u16(), 403);
    assert!(app.store.get(id).await.unwrap().is_some());
}

#[tokio::test]
async fn editors_cannot_rename_other_users_drafts() {
    let app = spawn_app().await;
    let alice = app.test_user();
    let mallory = app.test_user();
    let id = app.save(&alice, None, "Main Page", "mine").await;

    let response = app
        .post_hook(
            &mallory.jwt,
            "document-renamed",
            serde_json::json!({ "old_title": "Main Page", "new_title": "Hidden" }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 401);
    assert_eq!(app.store.get(id).await.unwrap().unwrap().title, "Main Page");
    assert_eq!(app.store.count_for_title("Hidden").await.unwrap(), 0);
}

#[tokio::test]
async fn editors_cannot_trigger_publish_discards() {
    let app = spawn_app().await;
    let alice = app.test_user();
    let id = app.save(&alice, None, "Main Page", "mine").await;

    let response = app
        .post_hook(
            &alice.jwt,
            "publish-succeeded",
            serde_json::json!({ "draft_id": id, "user_id": alice.id }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 401);
    assert!(app.store.get(id).await.unwrap().is_some());
}

#[tokio::test]
async fn hooks_require_a_bearer_token() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(format!("{}/hooks/document-renamed", app.address))
        .json(&serde_json::json!({ "old_title": "Sandbox", "new_title": "Playground" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}
