//! Integration tests for jj-stack-prs

#![allow(deprecated)] // cargo_bin is the standard way to test CLI binaries

mod common;

use assert_cmd::Command;
use common::{MockPlatformService, ScriptedRunner, TestRepo, make_pr, make_pr_in_state, test_repo};
use jj_stack_prs::config::Config;
use jj_stack_prs::engine::{resolve, resolve_base_branch};
use jj_stack_prs::error::Error;
use jj_stack_prs::exec::ExecOutput;
use jj_stack_prs::repo::{revsets, templates};
use jj_stack_prs::submit::{PlanOptions, SubmitStep, create_submission_plan};
use jj_stack_prs::types::PrState;
use predicates::prelude::*;

// =============================================================================
// CLI Tests
// =============================================================================

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("jjsp").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Stacked GitHub PRs for Jujutsu"))
        .stdout(predicate::str::contains("--no-auto-bookmark"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("jjsp").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_draft_and_publish_conflict() {
    let mut cmd = Command::cargo_bin("jjsp").unwrap();
    cmd.args(["--draft", "--publish"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_invalid_path() {
    let mut cmd = Command::cargo_bin("jjsp").unwrap();
    cmd.args(["--path", "/nonexistent/path/to/repo"]);

    cmd.assert().failure().code(1);
}

// =============================================================================
// Resolution Flow Tests
// =============================================================================

/// Two local bookmarks (`feat-b` on `@`), a stale auto bookmark whose PR was
/// merged, and a teammate's PR stacked on `feat-b` that only exists remotely.
fn script_stack(runner: &ScriptedRunner) {
    runner
        .ok(
            &[revsets::ANCESTORS, templates::PARENT_COUNT],
            "bbbbbbbbbbbb 1\naaaaaaaaaaaa 1\n",
        )
        .ok(&[revsets::STACK_CHILDREN], "bbbbbbbbbbbb aaaaaaaaaaaa\n")
        .ok(&["::@ ~ ::\"main\""], "")
        .ok(&[revsets::LINEAGE, templates::LINEAGE], "feat-b*\nfeat-a\n")
        .ok(&[revsets::DESCENDANTS], "feat-b*\n")
        .ok(
            &["bookmark", "list"],
            "feat-a\nfeat-b\nauto/jjsp-old-cccccc\n",
        )
        .ok(
            &[revsets::MUTABLE_STACK],
            "bbbbbbbbbbbb\tchanged\tfeat-b\tAdd feature B\naaaaaaaaaaaa\tchanged\tfeat-a\tAdd feature A\n",
        )
        .ok(&["\"feat-a\"", templates::COMMIT_SUMMARY], "1111aaaa\tAdd feature A\n")
        .ok(&["\"feat-b\"", templates::COMMIT_SUMMARY], "2222bbbb\tAdd feature B\n")
        .ok(
            &["\"feat-c\"@\"origin\"", templates::COMMIT_SUMMARY],
            "3333cccc\tAdd feature C\n",
        )
        .ok(&["bookmark", "create"], "")
        .ok(&["bookmark", "delete"], "")
        .ok(&["bookmark", "forget"], "");
}

fn forge() -> MockPlatformService {
    let mock = MockPlatformService::new();
    mock.set_open_prs(vec![
        make_pr(8, "feat-b", "auto/jjsp-old-cccccc"),
        make_pr(9, "feat-c", "feat-b"),
    ]);
    mock.set_find_pr_response(
        "auto/jjsp-old-cccccc",
        Some(make_pr_in_state(7, "auto/jjsp-old-cccccc", PrState::Merged)),
    );
    mock
}

fn scripted(dry_run: bool) -> TestRepo {
    let t = test_repo(dry_run);
    script_stack(&t.runner);
    t
}

#[tokio::test]
async fn test_resolve_full_pipeline() {
    let t = scripted(false);
    let mock = forge();
    let config = Config::default();

    let resolution = resolve(&t.repo, &mock, &config, "main").await.unwrap();

    assert_eq!(resolution.cleanup.deleted, vec!["auto/jjsp-old-cccccc"]);
    assert!(resolution.auto_bookmarks.is_empty());
    assert_eq!(resolution.stack.current().unwrap().name, "feat-b");
    assert!(!resolution.stack.is_partial_stack);

    let chain = &resolution.chain;
    assert_eq!(chain.names(), vec!["feat-a", "feat-b", "feat-c"]);
    assert!(chain.is_consistent());
    assert_eq!(chain.get(0).unwrap().title, "Add feature A");
    assert_eq!(chain.get(2).unwrap().title, "Add feature C");
    assert_eq!(resolution.materialized, vec!["feat-c"]);
    assert!(resolution.failures.is_empty());

    // feat-b's PR targeted the deleted auto bookmark
    assert!(chain.get(1).unwrap().needs_retarget());
    assert!(t.runner.ran(&["bookmark", "create", "feat-c"]));

    let plan = create_submission_plan(chain, &PlanOptions::default());
    assert_eq!(plan.create_count(), 1);
    assert!(plan.steps.contains(&SubmitStep::UpdateBase {
        bookmark: "feat-b".to_string(),
        pr_number: 8,
        from: "auto/jjsp-old-cccccc".to_string(),
        to: "feat-a".to_string(),
    }));
}

#[tokio::test]
async fn test_resolve_is_deterministic() {
    let first = resolve(&scripted(false).repo, &forge(), &Config::default(), "main")
        .await
        .unwrap();
    let second = resolve(&scripted(false).repo, &forge(), &Config::default(), "main")
        .await
        .unwrap();
    assert_eq!(first.chain, second.chain);
}

#[tokio::test]
async fn test_resolve_skip_cleanup_keeps_auto_bookmark() {
    let t = scripted(false);
    let mock = forge();
    let mut config = Config::default();
    config.auto_bookmark.cleanup = false;

    let resolution = resolve(&t.repo, &mock, &config, "main").await.unwrap();

    assert!(resolution.cleanup.deleted.is_empty());
    assert!(!t.runner.ran(&["bookmark", "delete"]));
    assert!(mock.get_find_pr_calls().is_empty());
    // the auto bookmark rejoins the chain through feat-b's PR base
    assert!(resolution.chain.names().contains(&"auto/jjsp-old-cccccc"));
}

#[tokio::test]
async fn test_resolve_rejects_non_linear_stack_before_forge_calls() {
    let t = test_repo(false);
    t.runner.ok(
        &[revsets::ANCESTORS, templates::PARENT_COUNT],
        "bbbbbbbbbbbb 2\naaaaaaaaaaaa 1\n",
    );
    script_stack(&t.runner);
    let mock = forge();

    let err = resolve(&t.repo, &mock, &Config::default(), "main")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NonLinearStack { .. }));
    assert!(mock.get_find_pr_calls().is_empty());
    assert!(!t.runner.ran(&["bookmark", "list"]));
}

#[tokio::test]
async fn test_resolve_degrades_when_listing_fails() {
    let t = scripted(false);
    let mock = forge();
    mock.fail_list("gh: not logged in");

    let resolution = resolve(&t.repo, &mock, &Config::default(), "main")
        .await
        .unwrap();

    assert_eq!(resolution.chain.names(), vec!["feat-a", "feat-b"]);
    assert!(
        t.reporter
            .warnings()
            .iter()
            .any(|w| w.contains("Could not list open PRs"))
    );
}

#[tokio::test]
async fn test_resolve_reports_bookmark_it_could_not_restore() {
    let t = test_repo(false);
    t.runner.on(
        &["bookmark", "create", "feat-c"],
        ExecOutput::failed(1, "Error: revision not found"),
    );
    script_stack(&t.runner);
    let mock = forge();

    let resolution = resolve(&t.repo, &mock, &Config::default(), "main")
        .await
        .unwrap();

    assert_eq!(resolution.chain.names(), vec!["feat-a", "feat-b", "feat-c"]);
    assert!(resolution.materialized.is_empty());
    assert_eq!(resolution.failures.len(), 1);
    assert!(
        t.reporter
            .warnings()
            .iter()
            .any(|w| w.starts_with("failed to materialize bookmark 'feat-c'"))
    );
}

#[tokio::test]
async fn test_resolve_dry_run_mutates_nothing() {
    let t = scripted(true);
    let mock = forge();

    resolve(&t.repo, &mock, &Config::default(), "main")
        .await
        .unwrap();

    assert!(!t.runner.ran(&["bookmark", "create"]));
    assert!(!t.runner.ran(&["bookmark", "delete"]));
    assert!(!t.runner.ran(&["bookmark", "forget"]));
    assert!(!t.reporter.of_kind("dry_run").is_empty());
}

/// One unpublished change, `qpvuntsmwlqt` "feat: add login", at `@`
///
/// `window_bookmarks` is what the mutable window shows on the change and
/// `lineage` what the lineage query prints.
fn script_single_change(runner: &ScriptedRunner, window_bookmarks: &str, lineage: &str, local: &str) {
    runner
        .ok(&[revsets::ANCESTORS, templates::PARENT_COUNT], "qpvuntsmwlqt 1\n")
        .ok(&[revsets::STACK_CHILDREN], "")
        .ok(&["::@ ~ ::\"main\""], "")
        .ok(&[revsets::LINEAGE, templates::LINEAGE], lineage)
        .ok(&[revsets::DESCENDANTS], "")
        .ok(&["bookmark", "list"], local)
        .ok(
            &[revsets::MUTABLE_STACK],
            &format!("qpvuntsmwlqt\tchanged\t{window_bookmarks}\tfeat: add login\n"),
        )
        .ok(&[templates::COMMIT_SUMMARY], "1111aaaa\tfeat: add login\n")
        .ok(&["bookmark", "create"], "")
        .ok(&["bookmark", "delete"], "")
        .ok(&["bookmark", "forget"], "");
}

const LOGIN: &str = "auto/jjsp-add-login-qpvunt";

#[tokio::test]
async fn test_dry_run_counts_bookmarks_it_would_create() {
    let t = test_repo(true);
    script_single_change(&t.runner, "", "", "");
    let mock = MockPlatformService::new();

    let resolution = resolve(&t.repo, &mock, &Config::default(), "main")
        .await
        .unwrap();

    assert_eq!(resolution.chain.names(), vec![LOGIN]);
    assert_eq!(resolution.chain.get(0).unwrap().title, "feat: add login");
    assert_eq!(resolution.stack.current().unwrap().name, LOGIN);
    assert!(!t.runner.ran(&["bookmark", "create"]));
    assert!(
        t.reporter
            .of_kind("dry_run")
            .iter()
            .any(|line| line.contains(LOGIN))
    );
}

#[tokio::test]
async fn test_real_run_with_only_unbookmarked_changes() {
    let t = test_repo(false);
    // the lineage is read after the bookmark exists
    script_single_change(&t.runner, "", &format!("{LOGIN}*\n"), "");
    let mock = MockPlatformService::new();

    let resolution = resolve(&t.repo, &mock, &Config::default(), "main")
        .await
        .unwrap();

    assert_eq!(resolution.chain.names(), vec![LOGIN]);
    assert!(t.runner.ran(&["bookmark", "create", LOGIN]));
}

#[tokio::test]
async fn test_auto_bookmark_without_pr_is_recreated_and_kept() {
    let t = test_repo(false);
    // after cleanup deletes it the window no longer shows it
    script_single_change(&t.runner, "", &format!("{LOGIN}*\n"), &format!("{LOGIN}\n"));
    let mock = MockPlatformService::new();

    let resolution = resolve(&t.repo, &mock, &Config::default(), "main")
        .await
        .unwrap();

    assert!(t.runner.ran(&["bookmark", "delete", &format!("exact:{LOGIN}")]));
    assert!(t.runner.ran(&["bookmark", "create", LOGIN]));
    assert!(resolution.cleanup.deleted.is_empty());
    assert_eq!(resolution.chain.names(), vec![LOGIN]);

    let plan = create_submission_plan(&resolution.chain, &PlanOptions::default());
    assert_eq!(plan.create_count(), 1);
}

#[tokio::test]
async fn test_dry_run_matches_real_run_for_recreated_auto_bookmark() {
    let t = test_repo(true);
    // nothing is deleted, so the window still shows the bookmark
    script_single_change(&t.runner, LOGIN, &format!("{LOGIN}*\n"), &format!("{LOGIN}\n"));
    let mock = MockPlatformService::new();

    let resolution = resolve(&t.repo, &mock, &Config::default(), "main")
        .await
        .unwrap();

    assert!(resolution.cleanup.deleted.is_empty());
    assert_eq!(resolution.chain.names(), vec![LOGIN]);
    assert!(!t.runner.ran(&["bookmark", "delete"]));
    assert!(!t.runner.ran(&["bookmark", "create"]));
}

#[tokio::test]
async fn test_base_branch_resolution_order() {
    let t = test_repo(false);
    t.runner.ok(&["log", revsets::TRUNK], "develop main main@origin\n");

    let mut config = Config::default();
    assert_eq!(resolve_base_branch(&t.repo, &config).await, "main");

    config.base_branch = Some("release".to_string());
    assert_eq!(resolve_base_branch(&t.repo, &config).await, "release");

    let empty = test_repo(false);
    config.base_branch = None;
    config.base_branch_fallback = "trunk".to_string();
    assert_eq!(resolve_base_branch(&empty.repo, &config).await, "trunk");
}

// =============================================================================
// GitHub API Backend Tests
// =============================================================================

mod github_api {
    use jj_stack_prs::error::Error;
use jj_stack_prs::exec::ExecOutput;
    use jj_stack_prs::platform::{GitHubService, PlatformService};
    use jj_stack_prs::types::{PlatformConfig, PrState};
    use mockito::Matcher;

    fn service(server: &mockito::Server) -> GitHubService {
        GitHubService::with_base_uri(
            "test-token",
            PlatformConfig {
                owner: "o".to_string(),
                repo: "r".to_string(),
                host: None,
            },
            &server.url(),
        )
        .unwrap()
    }

    const PR_JSON: &str = r#"[{
        "url": "https://api.github.com/repos/o/r/pulls/7",
        "id": 1007,
        "number": 7,
        "state": "open",
        "draft": true,
        "html_url": "https://github.com/o/r/pull/7",
        "body": "notes",
        "head": {"ref": "feat-a", "sha": "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"},
        "base": {"ref": "main", "sha": "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"}
    }]"#;

    #[tokio::test]
    async fn test_find_pr_for_head() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Regex(r"^/repos/o/r/pulls".to_string()))
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("head".into(), "o:feat-a".into()),
                Matcher::UrlEncoded("state".into(), "all".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(PR_JSON)
            .create_async()
            .await;

        let pr = service(&server)
            .find_pr_for_head("feat-a")
            .await
            .unwrap()
            .unwrap();

        mock.assert_async().await;
        assert_eq!(pr.number, 7);
        assert_eq!(pr.head_ref_name, "feat-a");
        assert_eq!(pr.base_ref_name, "main");
        assert!(pr.is_draft);
        assert_eq!(pr.state, PrState::Open);
        assert_eq!(pr.body.as_deref(), Some("notes"));
    }

    #[tokio::test]
    async fn test_find_pr_for_head_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Regex(r"^/repos/o/r/pulls".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        assert!(service(&server).find_pr_for_head("feat-z").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_api_error_maps_to_github_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PATCH", "/repos/o/r/pulls/3")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "Validation Failed", "documentation_url": "https://docs.github.com"}"#)
            .create_async()
            .await;

        let err = service(&server).update_pr_base(3, "main").await.unwrap_err();
        assert!(matches!(err, Error::GitHubApi(_)));
    }
}
