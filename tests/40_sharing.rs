mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::ids;

#[tokio::test]
async fn share_grants_access_to_private_note() -> Result<()> {
    let server = common::spawn_server().await?;
    let owner = server.register("alice@example.com").await?;
    let friend = server.register("bob@example.com").await?;

    let note = server.create_note(&owner, "Secret plans", "Nobody else should read this", false).await?;
    let note_id = note["id"].as_i64().unwrap();
    let path = format!("/api/notes/{}", note_id);

    let res = server.get(&friend, &path).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "You do not have access to this note");

    let res = server
        .post(&owner, &format!("{}/share", path), json!({ "email": "  BOB@example.com " }))
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["userId"], friend.id);
    assert_eq!(body["data"]["email"], "bob@example.com");

    let res = server.get(&friend, &path).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = server.get(&friend, "/api/notes?scope=shared").await?.json().await?;
    assert_eq!(ids(&body["data"]["notes"]), vec![note_id]);

    let body: Value = server.get(&friend, "/api/notes").await?.json().await?;
    assert_eq!(ids(&body["data"]["notes"]), vec![note_id]);

    // Sharing does not grant write access
    let res = server.patch(&friend, &path, json!({ "title": "Edited by Bob" })).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn share_rejections() -> Result<()> {
    let server = common::spawn_server().await?;
    let owner = server.register("carol@example.com").await?;
    let friend = server.register("dave@example.com").await?;

    let note = server.create_note(&owner, "Team notes", "Shared meeting minutes", false).await?;
    let share_path = format!("/api/notes/{}/share", note["id"]);

    let res = server.post(&owner, &share_path, json!({ "email": "not-an-email" })).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert!(body["errors"]["email"].is_array());

    let res = server.post(&owner, &share_path, json!({ "email": "nobody@example.com" })).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "User not found");

    let res = server.post(&owner, &share_path, json!({ "email": "carol@example.com" })).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "You cannot share a note with yourself");

    let res = server.post(&owner, &share_path, json!({ "email": "dave@example.com" })).await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = server.post(&owner, &share_path, json!({ "email": "dave@example.com" })).await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Note is already shared with this user");

    // Only the owner manages shares
    let res = server.post(&friend, &share_path, json!({ "email": "carol@example.com" })).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.get(&friend, &format!("/api/notes/{}/shares", note["id"])).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.post(&owner, "/api/notes/999/share", json!({ "email": "dave@example.com" })).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn unshare_revokes_access() -> Result<()> {
    let server = common::spawn_server().await?;
    let owner = server.register("erin@example.com").await?;
    let friend = server.register("frank@example.com").await?;

    let note = server.create_note(&owner, "Draft", "Work in progress text", false).await?;
    let path = format!("/api/notes/{}", note["id"]);

    server
        .post(&owner, &format!("{}/share", path), json!({ "email": "frank@example.com" }))
        .await?;

    let body: Value = server.get(&owner, &format!("{}/shares", path)).await?.json().await?;
    let shares = body["data"].as_array().unwrap();
    assert_eq!(shares.len(), 1);
    assert_eq!(shares[0]["userId"], friend.id);
    assert_eq!(shares[0]["name"], "Test User");

    let res = server.delete(&owner, &format!("{}/share/abc", path)).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Invalid user ID");

    let unshare = format!("{}/share/{}", path, friend.id);
    let res = server.delete(&owner, &unshare).await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server.delete(&owner, &unshare).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Note is not shared with this user");

    let res = server.get(&friend, &path).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body: Value = server.get(&owner, &format!("{}/shares", path)).await?.json().await?;
    assert!(body["data"].as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn deleting_a_note_drops_its_shares() -> Result<()> {
    let server = common::spawn_server().await?;
    let owner = server.register("gina@example.com").await?;
    let friend = server.register("hank@example.com").await?;

    let note = server.create_note(&owner, "Ephemeral", "Gone after deletion", false).await?;
    let path = format!("/api/notes/{}", note["id"]);
    server
        .post(&owner, &format!("{}/share", path), json!({ "email": "hank@example.com" }))
        .await?;

    let res = server.delete(&owner, &path).await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let body: Value = server.get(&friend, "/api/notes?scope=shared").await?.json().await?;
    assert_eq!(body["data"]["pagination"]["total"], 0);
    Ok(())
}
