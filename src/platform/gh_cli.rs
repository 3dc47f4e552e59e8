//! `gh` command line backend

use crate::error::{Error, Result};
use crate::exec::CommandRunner;
use crate::platform::{CreatePrRequest, PlatformService};
use crate::types::{ExistingPr, PlatformConfig, PrState};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

const PR_FIELDS: &str = "number,headRefName,baseRefName,isDraft,state,url,body";
const LIST_LIMIT: &str = "200";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhPr {
    number: u64,
    head_ref_name: String,
    base_ref_name: String,
    #[serde(default)]
    is_draft: bool,
    state: PrState,
    #[serde(default)]
    url: String,
    #[serde(default)]
    body: Option<String>,
}

impl From<GhPr> for ExistingPr {
    fn from(pr: GhPr) -> Self {
        Self {
            number: pr.number,
            head_ref_name: pr.head_ref_name,
            base_ref_name: pr.base_ref_name,
            is_draft: pr.is_draft,
            state: pr.state,
            url: pr.url,
            body: pr.body,
        }
    }
}

/// Parse the JSON array printed by `gh pr list --json`
pub(crate) fn parse_pr_list(json: &str) -> Result<Vec<ExistingPr>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    let prs: Vec<GhPr> = serde_json::from_str(json)?;
    Ok(prs.into_iter().map(Into::into).collect())
}

/// PR number from a `.../pull/<n>` URL
fn pr_number_from_url(url: &str) -> Option<u64> {
    url.trim().trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

/// GitHub service driving the `gh` CLI
pub struct GhCliService {
    runner: Arc<dyn CommandRunner>,
    repo: Option<String>,
}

impl GhCliService {
    /// Run `gh` through `runner`, letting `gh` infer the repository
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner, repo: None }
    }

    /// Target an explicit repository instead of letting `gh` infer it
    #[must_use]
    pub fn with_repo(mut self, config: &PlatformConfig) -> Self {
        self.repo = Some(match &config.host {
            Some(host) => format!("{host}/{}/{}", config.owner, config.repo),
            None => format!("{}/{}", config.owner, config.repo),
        });
        self
    }

    async fn gh(&self, args: &[&str]) -> Result<String> {
        let mut argv = vec!["gh".to_string()];
        argv.extend(args.iter().map(|a| (*a).to_string()));
        if let Some(repo) = &self.repo {
            argv.push("--repo".to_string());
            argv.push(repo.clone());
        }

        let out = self.runner.exec(&argv).await;
        if out.success() {
            Ok(out.stdout)
        } else {
            debug!(exit_code = out.exit_code, stderr = %out.stderr.trim(), "gh failed");
            Err(Error::Platform(format!(
                "gh {} failed: {}",
                args.first().copied().unwrap_or_default(),
                out.stderr.trim()
            )))
        }
    }

    async fn list_by_state(&self, state: &str) -> Result<Vec<ExistingPr>> {
        debug!(state, "listing PRs");
        let out = self
            .gh(&[
                "pr", "list", "--author", "@me", "--state", state, "--json", PR_FIELDS, "--limit",
                LIST_LIMIT,
            ])
            .await?;
        let prs = parse_pr_list(&out)?;
        debug!(state, count = prs.len(), "listed PRs");
        Ok(prs)
    }
}

#[async_trait]
impl PlatformService for GhCliService {
    async fn list_open_prs(&self) -> Result<Vec<ExistingPr>> {
        self.list_by_state("open").await
    }

    async fn list_merged_prs(&self) -> Result<Vec<ExistingPr>> {
        self.list_by_state("merged").await
    }

    async fn find_pr_for_head(&self, head: &str) -> Result<Option<ExistingPr>> {
        debug!(head, "finding PR for head");
        let out = self
            .gh(&[
                "pr", "list", "--head", head, "--state", "all", "--json", PR_FIELDS, "--limit", "1",
            ])
            .await?;
        Ok(parse_pr_list(&out)?.into_iter().next())
    }

    async fn create_pr(&self, request: &CreatePrRequest) -> Result<ExistingPr> {
        debug!(head = %request.head, base = %request.base, draft = request.draft, "creating PR");
        let mut args = vec![
            "pr",
            "create",
            "--head",
            request.head.as_str(),
            "--base",
            request.base.as_str(),
            "--title",
            request.title.as_str(),
            "--body",
            request.body.as_str(),
        ];
        if request.draft {
            args.push("--draft");
        }

        let out = self.gh(&args).await?;
        let url = out.lines().rev().find(|l| l.contains("/pull/")).unwrap_or_default().trim();
        let number = pr_number_from_url(url)
            .ok_or_else(|| Error::Parse(format!("no PR URL in gh output: {}", out.trim())))?;
        debug!(pr_number = number, "created PR");

        Ok(ExistingPr {
            number,
            head_ref_name: request.head.clone(),
            base_ref_name: request.base.clone(),
            is_draft: request.draft,
            state: PrState::Open,
            url: url.to_string(),
            body: Some(request.body.clone()),
        })
    }

    async fn update_pr_base(&self, number: u64, base: &str) -> Result<()> {
        debug!(number, base, "updating PR base");
        let n = number.to_string();
        self.gh(&["pr", "edit", &n, "--base", base]).await?;
        Ok(())
    }

    async fn update_pr_body(&self, number: u64, body: &str) -> Result<()> {
        debug!(number, "updating PR body");
        let n = number.to_string();
        self.gh(&["pr", "edit", &n, "--body", body]).await?;
        Ok(())
    }

    async fn set_draft(&self, number: u64, draft: bool) -> Result<()> {
        debug!(number, draft, "setting draft state");
        let n = number.to_string();
        let mut args = vec!["pr", "ready", n.as_str()];
        if draft {
            args.push("--undo");
        }
        self.gh(&args).await?;
        Ok(())
    }
}
