//! Authorization gates over real routes: board member vs admin, task
//! membership tiers, the admin self-removal guard, and not-found handling.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{
    delete_auth, get_auth, patch_json_auth, post_json_auth, register_user, send, test_state,
};

async fn create_board(
    app: &axum::Router,
    token: &str,
    name: &str,
) -> String {
    let (status, body) = send(
        app,
        post_json_auth(
            "/api/v1/boards",
            json!({ "name": name, "color": "#3b82f6" }),
            token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create board failed: {body}");
    body["board"]["id"].as_str().expect("board id").to_string()
}

#[tokio::test]
async fn creator_is_admin_and_sole_member() {
    let Some(state) = test_state().await else {
        return;
    };
    let app = kanri_api::router(state);
    let alice = register_user(&app, "alice").await;

    let board_id = create_board(&app, &alice.access, "Sprint1").await;
    let (status, body) = send(&app, get_auth(&format!("/api/v1/boards/{board_id}"), &alice.access)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["board"]["admin"], alice.id.as_str());
    let members = body["board"]["members"].as_array().expect("members");
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["user"], alice.id.as_str());
    assert_eq!(members[0]["role"], "admin");
}

#[tokio::test]
async fn non_member_fails_both_board_gates_until_added() {
    let Some(state) = test_state().await else {
        return;
    };
    let app = kanri_api::router(state);
    let alice = register_user(&app, "alice").await;
    let bob = register_user(&app, "bob").await;

    let board_id = create_board(&app, &alice.access, "Sprint1").await;

    // Bob is not a member: member gate rejects.
    let (status, body) = send(&app, get_auth(&format!("/api/v1/boards/{board_id}"), &bob.access)).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");
    assert_eq!(body["error"], "forbidden");

    // And the admin gate rejects too.
    let (status, _) = send(
        &app,
        delete_auth(&format!("/api/v1/boards/{board_id}"), &bob.access),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Alice adds Bob as a plain member.
    let (status, body) = send(
        &app,
        post_json_auth(
            &format!("/api/v1/boards/{board_id}/members"),
            json!({ "userId": bob.id }),
            &alice.access,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    // Bob now passes the member gate but still fails the admin gate.
    let (status, _) = send(&app, get_auth(&format!("/api/v1/boards/{board_id}"), &bob.access)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        delete_auth(&format!("/api/v1/boards/{board_id}"), &bob.access),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn task_membership_controls_updates_and_admin_actions() {
    let Some(state) = test_state().await else {
        return;
    };
    let app = kanri_api::router(state);
    let alice = register_user(&app, "alice").await;
    let bob = register_user(&app, "bob").await;

    let board_id = create_board(&app, &alice.access, "Sprint1").await;
    let (status, _) = send(
        &app,
        post_json_auth(
            &format!("/api/v1/boards/{board_id}/members"),
            json!({ "userId": bob.id }),
            &alice.access,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Alice creates a task; she is auto-assigned as task admin.
    let (status, body) = send(
        &app,
        post_json_auth(
            &format!("/api/v1/boards/{board_id}/tasks"),
            json!({ "title": "Write release notes" }),
            &alice.access,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let task_id = body["task"]["id"].as_str().expect("task id").to_string();
    assert_eq!(body["task"]["taskAdmin"], alice.id.as_str());
    assert_eq!(body["task"]["assignedTo"][0], alice.id.as_str());

    let task_uri = format!("/api/v1/boards/{board_id}/tasks/{task_id}");

    // Bob is a board member but not assigned: task-member gate rejects.
    let (status, body) = send(
        &app,
        patch_json_auth(&task_uri, json!({ "title": "Hijacked" }), &bob.access),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");

    // Bob also cannot assign himself: that needs task or board admin.
    let (status, _) = send(
        &app,
        post_json_auth(
            &format!("{task_uri}/assignees"),
            json!({ "userId": bob.id }),
            &bob.access,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Alice (board admin) assigns Bob.
    let (status, body) = send(
        &app,
        post_json_auth(
            &format!("{task_uri}/assignees"),
            json!({ "userId": bob.id }),
            &alice.access,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    // Bob can now update the task.
    let (status, body) = send(
        &app,
        patch_json_auth(&task_uri, json!({ "title": "Reviewed notes" }), &bob.access),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["task"]["title"], "Reviewed notes");

    // But as a plain assignee Bob still cannot unassign others.
    let (status, _) = send(
        &app,
        delete_auth(&format!("{task_uri}/assignees/{}", alice.id), &bob.access),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Bob can move the task between status columns as an assignee.
    let (status, body) = send(
        &app,
        patch_json_auth(
            &format!("{task_uri}/status"),
            json!({ "status": "On Progress" }),
            &bob.access,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["task"]["status"], "On Progress");
}

#[tokio::test]
async fn board_admin_cannot_be_removed_from_own_board() {
    let Some(state) = test_state().await else {
        return;
    };
    let app = kanri_api::router(state);
    let alice = register_user(&app, "alice").await;

    let board_id = create_board(&app, &alice.access, "Sprint1").await;

    // Even the admin herself cannot remove the admin membership.
    let (status, body) = send(
        &app,
        delete_auth(
            &format!("/api/v1/boards/{board_id}/members/{}", alice.id),
            &alice.access,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn unknown_board_is_not_found_not_forbidden() {
    let Some(state) = test_state().await else {
        return;
    };
    let app = kanri_api::router(state);
    let alice = register_user(&app, "alice").await;

    let missing = uuid::Uuid::new_v4().to_string();
    let (status, body) = send(&app, get_auth(&format!("/api/v1/boards/{missing}"), &alice.access)).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");
    assert_eq!(body["error"], "not_found");

    // Same for the admin gate.
    let (status, body) = send(
        &app,
        delete_auth(&format!("/api/v1/boards/{missing}"), &alice.access),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");
}

#[tokio::test]
async fn subtasks_follow_task_membership() {
    let Some(state) = test_state().await else {
        return;
    };
    let app = kanri_api::router(state);
    let alice = register_user(&app, "alice").await;

    let board_id = create_board(&app, &alice.access, "Sprint1").await;
    let (status, body) = send(
        &app,
        post_json_auth(
            &format!("/api/v1/boards/{board_id}/tasks"),
            json!({ "title": "Ship v1" }),
            &alice.access,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let task_id = body["task"]["id"].as_str().expect("task id").to_string();
    let task_uri = format!("/api/v1/boards/{board_id}/tasks/{task_id}");

    let (status, body) = send(
        &app,
        post_json_auth(
            &format!("{task_uri}/subtasks"),
            json!({ "title": "Tag the release" }),
            &alice.access,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let subtask_id = body["task"]["subtasks"][0]["id"]
        .as_str()
        .expect("subtask id")
        .to_string();

    let (status, body) = send(
        &app,
        patch_json_auth(
            &format!("{task_uri}/subtasks/{subtask_id}"),
            json!({ "isCompleted": true }),
            &alice.access,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["task"]["subtasks"][0]["isCompleted"], true);
}
