use drafts::draft::DraftId;
use drafts::store::DraftStore;
use futures::future::join_all;

use crate::helpers::spawn_app;

#[tokio::test]
async fn missing_bearer_token_is_rejected() {
    let app = spawn_app().await;
    let user = app.test_user();

    let response = app
        .client
        .post(format!("{}/drafts/save", app.address))
        .form(&user.save_params(None, "Main Page", "text"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn forged_bearer_token_is_rejected() {
    let app = spawn_app().await;
    let user = app.test_user();

    let response = app
        .post_save("not-a-jwt", &user.save_params(None, "Main Page", "text"))
        .await;

    assert_eq!(response.status().as_u16(), 401);
    assert_eq!(app.store.count_for_title("Main Page").await.unwrap(), 0);
}

#[tokio::test]
async fn first_save_creates_an_owned_draft() {
    let app = spawn_app().await;
    let user = app.test_user();

    let id = app.save(&user, None, "Main Page", "hello").await;

    let draft = app.store.get(id).await.unwrap().expect("draft persisted");
    assert_eq!(draft.owner, user.id);
    assert_eq!(draft.text, "hello");
    assert_eq!(draft.token, "tab-token");
    assert_eq!(draft.section, None);
    assert!(chrono::Utc::now() - draft.save_time < chrono::Duration::minutes(1));
}

#[tokio::test]
async fn mismatched_edit_token_returns_the_sentinel() {
    let app = spawn_app().await;
    let user = app.test_user();
    let mut params = user.save_params(None, "Main Page", "hello");
    params.token = "stale-token".to_string();

    let response = app.post_save(&user.jwt, &params).await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "-1");
    assert_eq!(app.store.count_for_title("Main Page").await.unwrap(), 0);
}

#[tokio::test]
async fn mismatched_edit_token_wins_over_a_malformed_id() {
    let app = spawn_app().await;
    let user = app.test_user();
    let mut params = user.save_params(None, "Main Page", "hello");
    params.token = "stale-token".to_string();
    params.id = Some("abc".to_string());

    let response = app.post_save(&user.jwt, &params).await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "-1");
}

#[tokio::test]
async fn mismatched_edit_token_wins_over_a_blank_title() {
    let app = spawn_app().await;
    let user = app.test_user();
    let mut params = user.save_params(None, "", "hello");
    params.token = "stale-token".to_string();

    let response = app.post_save(&user.jwt, &params).await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "-1");
}

#[tokio::test]
async fn form_without_title_or_token_gets_the_sentinel() {
    let app = spawn_app().await;
    let user = app.test_user();

    let response = app
        .client
        .post(format!("{}/drafts/save", app.address))
        .bearer_auth(&user.jwt)
        .form(&[("text", "hello")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "-1");
}

#[tokio::test]
async fn blank_title_with_valid_token_is_a_bad_request() {
    let app = spawn_app().await;
    let user = app.test_user();

    let response = app
        .post_save(&user.jwt, &user.save_params(None, " ", "hello"))
        .await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(app.store.count_for_title(" ").await.unwrap(), 0);
}

#[tokio::test]
async fn saving_with_an_id_updates_the_same_draft() {
    let app = spawn_app().await;
    let user = app.test_user();
    let id = app.save(&user, None, "Main Page", "first").await;

    let again = app.save(&user, Some(id), "Main Page", "second").await;

    assert_eq!(again, id);
    assert_eq!(app.store.get(id).await.unwrap().unwrap().text, "second");
    assert_eq!(app.store.count_for_title("Main Page").await.unwrap(), 1);
}

#[tokio::test]
async fn saving_over_a_foreign_draft_is_forbidden() {
    let app = spawn_app().await;
    let owner = app.test_user();
    let intruder = app.test_user();
    let id = app.save(&owner, None, "Main Page", "mine").await;

    let response = app
        .post_save(&intruder.jwt, &intruder.save_params(Some(id), "Main Page", "theirs"))
        .await;

    assert_eq!(response.status().as_u16(), 403);
    assert_eq!(response.text().await.unwrap(), "-1");
    let draft = app.store.get(id).await.unwrap().unwrap();
    assert_eq!(draft.text, "mine");
    assert_eq!(draft.owner, owner.id);
}

#[tokio::test]
async fn saving_to_a_vanished_draft_starts_a_new_one() {
    let app = spawn_app().await;
    let user = app.test_user();

    let id = app.save(&user, Some(DraftId(9999)), "Main Page", "text").await;

    assert_ne!(id, DraftId(9999));
    assert_eq!(app.store.get(id).await.unwrap().unwrap().owner, user.id);
}

#[tokio::test]
async fn malformed_id_is_a_bad_request() {
    let app = spawn_app().await;
    let user = app.test_user();
    let mut params = user.save_params(None, "Main Page", "text");
    params.id = Some("abc".to_string());

    let response = app.post_save(&user.jwt, &params).await;

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn minor_edit_and_section_are_carried_through() {
    let app = spawn_app().await;
    let user = app.test_user();
    let mut params = user.save_params(None, "Main Page", "text");
    params.minoredit = Some("1".to_string());
    params.section = Some("2".to_string());
    params.scrolltop = Some("315".to_string());

    let response = app.post_save(&user.jwt, &params).await;
    let id = DraftId(response.text().await.unwrap().parse().unwrap());

    let draft = app.store.get(id).await.unwrap().unwrap();
    assert!(draft.minor_edit);
    assert_eq!(draft.section.as_deref(), Some("2"));
    assert_eq!(draft.scroll_top, 315);
}

#[tokio::test]
async fn racing_first_saves_may_each_create_a_draft() {
    let app = spawn_app().await;
    let user = app.test_user();

    let ids = join_all((0..3).map(|i| app.save(&user, None, "Main Page", ["a", "b", "c"][i]))).await;

    let mut distinct = ids.clone();
    distinct.sort_by_key(|id| id.0);
    distinct.dedup();
    assert_eq!(distinct.len(), 3);
    let drafts = app.store.list_for_title("Main Page").await.unwrap();
    assert_eq!(drafts.len(), 3);
    assert!(drafts.iter().all(|draft| draft.token == "tab-token"));
}
