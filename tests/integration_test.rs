#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::env;
use std::fs;

use anyhow::Result;
use ci_gate::cli::targets::TargetsCommand;
use ci_gate::github::client::{MAX_PAGES, PER_PAGE};
use ci_gate::github::{GitHubClient, GitHubError};
use ci_gate::ErrorKind;
use clap::Parser;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FILES_PATH: &str = "/repos/octo/provider/pulls/7/files";

fn file_records(paths: &[&str]) -> Value {
    Value::Array(
        paths
            .iter()
            .map(|p| json!({"sha": "abc", "filename": p, "status": "modified"}))
            .collect(),
    )
}

async fn mount_page(server: &MockServer, page: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(FILES_PATH))
        .and(query_param("page", page))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn lists_files_with_auth_headers() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FILES_PATH))
        .and(header("authorization", "Bearer secret"))
        .and(header("accept", "application/vnd.github+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_records(&[
            "internal/resources/user/main.go",
            "docs/readme.md",
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = GitHubClient::with_base_url(&server.uri(), "secret".to_string())?;
    let files = client.list_pull_request_files("octo", "provider", 7).await?;

    let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
    assert_eq!(names, vec!["internal/resources/user/main.go", "docs/readme.md"]);
    Ok(())
}

#[tokio::test]
async fn follows_pagination_until_short_page() -> Result<()> {
    let server = MockServer::start().await;

    let first: Vec<String> = (0..100)
        .map(|i| format!("internal/resources/res{i}/main.go"))
        .collect();
    let first_refs: Vec<&str> = first.iter().map(String::as_str).collect();
    mount_page(&server, "1", file_records(&first_refs)).await;
    mount_page(&server, "2", file_records(&["internal/resources/tail/main.go"])).await;

    let client = GitHubClient::with_base_url(&server.uri(), "secret".to_string())?;
    let files = client.list_pull_request_files("octo", "provider", 7).await?;

    assert_eq!(files.len(), 101);
    assert_eq!(files[100].filename, "internal/resources/tail/main.go");
    Ok(())
}

#[tokio::test]
async fn stops_at_the_page_ceiling() -> Result<()> {
    let server = MockServer::start().await;

    let full: Vec<String> = (0..PER_PAGE)
        .map(|i| format!("internal/resources/res{i}/main.go"))
        .collect();
    let full_refs: Vec<&str> = full.iter().map(String::as_str).collect();
    Mock::given(method("GET"))
        .and(path(FILES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_records(&full_refs)))
        .expect(MAX_PAGES as u64)
        .mount(&server)
        .await;

    let client = GitHubClient::with_base_url(&server.uri(), "secret".to_string())?;
    let files = client.list_pull_request_files("octo", "provider", 7).await?;

    assert_eq!(files.len(), 3000);
    Ok(())
}

#[tokio::test]
async fn too_many_requests_is_rate_limited() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FILES_PATH))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let client = GitHubClient::with_base_url(&server.uri(), "secret".to_string())?;
    let err = client
        .list_pull_request_files("octo", "provider", 7)
        .await
        .unwrap_err();

    assert!(matches!(err, GitHubError::RateLimited));
    assert_eq!(err.kind(), ErrorKind::Transport);
    Ok(())
}

#[tokio::test]
async fn maps_http_failures_to_transport_errors() -> Result<()> {
    let server = MockServer::start().await;
    let client = GitHubClient::with_base_url(&server.uri(), "secret".to_string())?;

    Mock::given(method("GET"))
        .and(path(FILES_PATH))
        .respond_with(ResponseTemplate::new(403).insert_header("x-ratelimit-remaining", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    let err = client
        .list_pull_request_files("octo", "provider", 7)
        .await
        .unwrap_err();
    assert!(matches!(err, GitHubError::RateLimited));
    assert_eq!(err.kind(), ErrorKind::Transport);

    Mock::given(method("GET"))
        .and(path(FILES_PATH))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    let err = client
        .list_pull_request_files("octo", "provider", 7)
        .await
        .unwrap_err();
    assert!(matches!(err, GitHubError::Unauthorized(401)));

    Mock::given(method("GET"))
        .and(path(FILES_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    let err = client
        .list_pull_request_files("octo", "provider", 7)
        .await
        .unwrap_err();
    match err {
        GitHubError::ApiRequestFailed { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "Not Found");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    Mock::given(method("GET"))
        .and(path(FILES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"not\": \"a list\"}"))
        .mount(&server)
        .await;
    let err = client
        .list_pull_request_files("octo", "provider", 7)
        .await
        .unwrap_err();
    assert!(matches!(err, GitHubError::InvalidResponse(_)));
    Ok(())
}

#[tokio::test]
async fn targets_command_against_api() -> Result<()> {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "1",
        file_records(&[
            "internal/services/policy/resource_crud.go",
            "internal/services/policy/state.go",
            "internal/services/site/resource_crud.go",
            "README.md",
        ]),
    )
    .await;

    let dir = tempfile::tempdir()?;
    let output = dir.path().join("targets.txt");
    let uri = server.uri();

    let cmd = TargetsCommand::parse_from([
        "targets",
        "--repo-owner",
        "octo",
        "--repo-name",
        "provider",
        "--pr-number",
        "7",
        "--github-token",
        "secret",
        "--api-url",
        uri.as_str(),
        "--markers",
        "internal,services",
        "--namespace",
        "jamfpro_",
        "--output",
        output.to_str().unwrap(),
    ]);
    cmd.execute().await?;

    assert_eq!(fs::read_to_string(&output)?, "jamfpro_policy,jamfpro_site");
    Ok(())
}

#[tokio::test]
async fn targets_command_empty_pr_writes_nothing() -> Result<()> {
    let server = MockServer::start().await;
    mount_page(&server, "1", json!([])).await;

    let dir = tempfile::tempdir()?;
    let output = dir.path().join("targets.txt");
    let uri = server.uri();

    let cmd = TargetsCommand::parse_from([
        "targets",
        "--repo-owner",
        "octo",
        "--repo-name",
        "provider",
        "--pr-number",
        "7",
        "--github-token",
        "secret",
        "--api-url",
        uri.as_str(),
        "--output",
        output.to_str().unwrap(),
    ]);
    let err = cmd.execute().await.unwrap_err();

    assert!(err.to_string().contains("no targets found"));
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn targets_command_token_from_environment() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FILES_PATH))
        .and(header("authorization", "Bearer from-gh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(file_records(&["internal/resources/user/main.go"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    // No settings file either, so the token can only come from GH_TOKEN.
    let home = tempfile::tempdir()?;
    env::set_var("HOME", home.path());
    env::remove_var("GITHUB_TOKEN");
    env::remove_var("GH_TOKEN");

    let output = home.path().join("targets.txt");
    let uri = server.uri();
    let args = [
        "targets",
        "--repo-owner",
        "octo",
        "--repo-name",
        "provider",
        "--pr-number",
        "7",
        "--api-url",
        uri.as_str(),
        "--output",
        output.to_str().unwrap(),
    ];

    let err = TargetsCommand::parse_from(args)
        .execute()
        .await
        .unwrap_err();
    assert!(err.to_string().contains("GitHub token missing"));
    assert!(!output.exists());

    env::set_var("GH_TOKEN", "from-gh");
    TargetsCommand::parse_from(args).execute().await?;
    env::remove_var("GH_TOKEN");

    assert_eq!(fs::read_to_string(&output)?, "user");
    Ok(())
}
