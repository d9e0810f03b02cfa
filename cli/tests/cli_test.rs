use std::path::Path;

use clap::Parser;
use promptworks_cli::commands::{PromptsSubcommand, RoleArg};
use promptworks_cli::{Cli, CliError, Command, build_session, run};
use serde_json::{Value, json};
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_json(id: i64, username: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "is_active": true,
        "is_superuser": false,
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z",
    })
}

fn parse(server: &MockServer, token_file: &Path, args: &[&str]) -> Cli {
    let base_url = format!("{}/api/v1/", server.uri());
    let mut argv = vec![
        "promptworks".to_owned(),
        "--base-url".to_owned(),
        base_url,
        "--token-file".to_owned(),
        token_file.display().to_string(),
    ];
    argv.extend(args.iter().map(|arg| (*arg).to_owned()));
    Cli::try_parse_from(argv).unwrap()
}

async fn exec(server: &MockServer, token_file: &Path, args: &[&str]) -> Result<Value, CliError> {
    let cli = parse(server, token_file, args);
    let session = build_session(&cli.base_url, cli.token_file)?;
    run(&session, cli.command).await
}

// =============================================================
// Session commands
// =============================================================

#[tokio::test]
async fn login_persists_token_for_the_next_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("username=alice&password=secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "tok123", "token_type": "bearer" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(1, "alice")))
        .expect(2)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("access_token");

    let logged_in = exec(&server, &token_file, &["login", "alice", "--password", "secret"]).await.unwrap();
    let again = exec(&server, &token_file, &["whoami"]).await.unwrap();

    assert_eq!(logged_in["username"], "alice");
    assert_eq!(again["username"], "alice");
    assert_eq!(std::fs::read_to_string(&token_file).unwrap(), "tok123");
}

#[tokio::test]
async fn login_with_unloadable_account_reports_incomplete_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "tok123", "token_type": "bearer" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("access_token");

    let err = exec(&server, &token_file, &["login", "alice", "--password", "secret"]).await.unwrap_err();

    assert!(matches!(err, CliError::LoginIncomplete));
    assert!(!token_file.exists());
}

#[tokio::test]
async fn login_failure_reports_service_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "detail": "Incorrect username or password" })))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("access_token");

    let err = exec(&server, &token_file, &["login", "alice", "--password", "wrong"]).await.unwrap_err();

    match err {
        CliError::Auth(failure) => {
            assert_eq!(failure.message, "Incorrect username or password");
            assert_eq!(failure.source.status(), Some(400));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!token_file.exists());
}

#[tokio::test]
async fn whoami_with_rejected_token_clears_it() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Could not validate credentials" })))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("access_token");
    std::fs::write(&token_file, "stale").unwrap();

    let err = exec(&server, &token_file, &["whoami"]).await.unwrap_err();

    assert!(matches!(err, CliError::NotLoggedIn));
    assert!(!token_file.exists());
}

#[tokio::test]
async fn logout_removes_token_file() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("access_token");
    std::fs::write(&token_file, "tok123").unwrap();

    let output = exec(&server, &token_file, &["logout"]).await.unwrap();

    assert_eq!(output, Value::Null);
    assert!(!token_file.exists());
}

// =============================================================
// Resource commands
// =============================================================

#[tokio::test]
async fn unauthenticated_request_surfaces_status_and_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/prompts"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Not authenticated" })))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("access_token");

    let err = exec(&server, &token_file, &["prompts", "list"]).await.unwrap_err();

    match err {
        CliError::Api(api) => {
            assert_eq!(api.status(), Some(401));
            assert_eq!(api.detail(), Some("Not authenticated"));
            assert_eq!(api.payload(), Some(&json!({ "detail": "Not authenticated" })));
        }
        other => panic!("unexpected error: {other}"),
    }
    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn prompt_list_forwards_query_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/prompts"))
        .and(query_param("q", "sql helper"))
        .and(query_param("limit", "5"))
        .and(header("authorization", "Bearer tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("access_token");
    std::fs::write(&token_file, "tok123").unwrap();

    let output = exec(&server, &token_file, &["prompts", "list", "--q", "sql helper", "--limit", "5"]).await.unwrap();

    assert_eq!(output, json!([]));
}

#[tokio::test]
async fn prompt_delete_accepts_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/prompts/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("access_token");
    std::fs::write(&token_file, "tok123").unwrap();

    let output = exec(&server, &token_file, &["prompts", "delete", "7"]).await.unwrap();

    assert_eq!(output, Value::Null);
}

#[tokio::test]
async fn tag_update_patches_only_given_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/prompt-tags/5"))
        .and(header("content-type", "application/json"))
        .and(body_string(r##"{"color":"#ff0000"}"##))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5,
            "name": "sql",
            "color": "#ff0000",
            "prompt_count": 3,
            "created_at": "t",
            "updated_at": "t",
        })))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("access_token");
    std::fs::write(&token_file, "tok123").unwrap();

    let output = exec(&server, &token_file, &["tags", "update", "5", "--color", "#ff0000"]).await.unwrap();

    assert_eq!(output["prompt_count"], 3);
}

#[tokio::test]
async fn switch_version_rejects_unknown_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/prompts/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 4,
            "name": "greeting",
            "description": null,
            "author": null,
            "owner_id": 1,
            "prompt_class": { "id": 1, "name": "general", "description": null, "created_at": "t", "updated_at": "t" },
            "current_version": null,
            "versions": [],
            "tags": [],
            "created_at": "t",
            "updated_at": "t",
        })))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("access_token");

    let err = exec(&server, &token_file, &["prompts", "switch-version", "4", "9"]).await.unwrap_err();

    assert!(matches!(err, CliError::UnknownVersion { prompt_id: 4, version_id: 9 }));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn unreachable_service_is_a_transport_failure() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);
    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("access_token");

    let session = build_session(&format!("{uri}/api/v1"), Some(token_file)).unwrap();
    let cli = Cli::try_parse_from(["promptworks", "users", "get", "1"]).unwrap();
    let err = run(&session, cli.command).await.unwrap_err();

    match err {
        CliError::Api(api) => assert_eq!(api.status(), None),
        other => panic!("unexpected error: {other}"),
    }
}

// =============================================================
// Argument parsing
// =============================================================

#[test]
fn share_parses_role() {
    let cli = Cli::try_parse_from(["promptworks", "prompts", "share", "4", "bob", "--role", "editor"]).unwrap();
    match cli.command {
        Command::Prompts(prompts) => match prompts.command {
            PromptsSubcommand::Share { prompt_id, username, role } => {
                assert_eq!(prompt_id, 4);
                assert_eq!(username, "bob");
                assert_eq!(role, RoleArg::Editor);
            }
            other => panic!("unexpected subcommand: {other:?}"),
        },
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn log_level_defaults_to_warn() {
    let cli = Cli::try_parse_from(["promptworks", "logout"]).unwrap();
    assert_eq!(cli.log_level, tracing::Level::WARN);
}
