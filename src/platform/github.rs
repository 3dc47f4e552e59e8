//! GitHub API backend using octocrab

use crate::error::{Error, Result};
use crate::platform::{CreatePrRequest, PlatformService};
use crate::types::{ExistingPr, PlatformConfig, PrState};
use async_trait::async_trait;
use octocrab::Octocrab;
use octocrab::params::State;
use serde::Deserialize;
use tracing::debug;

const PER_PAGE: u8 = 100;

const MARK_READY_MUTATION: &str = r"
    mutation MarkPullRequestReadyForReview($pullRequestId: ID!) {
        markPullRequestReadyForReview(input: { pullRequestId: $pullRequestId }) {
            pullRequest { number isDraft }
        }
    }
";

const CONVERT_TO_DRAFT_MUTATION: &str = r"
    mutation ConvertPullRequestToDraft($pullRequestId: ID!) {
        convertPullRequestToDraft(input: { pullRequestId: $pullRequestId }) {
            pullRequest { number isDraft }
        }
    }
";

// GraphQL response envelope for the draft mutations

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<serde_json::Value>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
}

impl GitHubService {
    /// Create a service for github.com or, with `config.host`, GitHub Enterprise
    pub fn new(token: &str, config: PlatformConfig) -> Result<Self> {
        let base_uri = config
            .host
            .as_ref()
            .map(|h| format!("https://{h}/api/v3"));
        Self::build(token, config, base_uri.as_deref())
    }

    /// Create a service against an explicit API root
    pub fn with_base_uri(token: &str, config: PlatformConfig, base_uri: &str) -> Result<Self> {
        Self::build(token, config, Some(base_uri))
    }

    fn build(token: &str, config: PlatformConfig, base_uri: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());
        if let Some(uri) = base_uri {
            builder = builder
                .base_uri(uri)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }
        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;
        Ok(Self { client, config })
    }

    async fn current_login(&self) -> Result<String> {
        Ok(self.client.current().user().await?.login)
    }

    async fn list_authored(&self, state: State) -> Result<Vec<octocrab::models::pulls::PullRequest>> {
        let login = self.current_login().await?;
        let first = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .state(state)
            .per_page(PER_PAGE)
            .send()
            .await?;
        let all = self.client.all_pages(first).await?;

        Ok(all
            .into_iter()
            .filter(|pr| pr.user.as_ref().is_some_and(|u| u.login == login))
            .collect())
    }

    async fn set_draft_graphql(&self, number: u64, draft: bool) -> Result<()> {
        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .get(number)
            .await?;
        let node_id = pr.node_id.as_ref().ok_or_else(|| {
            Error::GitHubApi("PR missing node_id for GraphQL mutation".to_string())
        })?;

        let query = if draft {
            CONVERT_TO_DRAFT_MUTATION
        } else {
            MARK_READY_MUTATION
        };
        let response: GraphQlResponse = self
            .client
            .graphql(&serde_json::json!({
                "query": query,
                "variables": { "pullRequestId": node_id }
            }))
            .await
            .map_err(|e| Error::GitHubApi(format!("GraphQL mutation failed: {e}")))?;

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
            return Err(Error::GitHubApi(format!(
                "GraphQL error: {}",
                messages.join(", ")
            )));
        }
        if response.data.is_none() {
            return Err(Error::GitHubApi("No data in GraphQL response".to_string()));
        }
        Ok(())
    }
}

/// Convert an octocrab PR to [`ExistingPr`]
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> ExistingPr {
    let state = match pr.state {
        Some(octocrab::models::IssueState::Open) => PrState::Open,
        Some(_) if pr.merged_at.is_some() => PrState::Merged,
        Some(_) | None => PrState::Closed,
    };

    ExistingPr {
        number: pr.number,
        head_ref_name: pr.head.ref_field.clone(),
        base_ref_name: pr.base.ref_field.clone(),
        is_draft: pr.draft.unwrap_or(false),
        state,
        url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        body: pr.body.clone(),
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn list_open_prs(&self) -> Result<Vec<ExistingPr>> {
        debug!("listing open PRs");
        let prs: Vec<ExistingPr> = self
            .list_authored(State::Open)
            .await?
            .iter()
            .map(pr_from_octocrab)
            .collect();
        debug!(count = prs.len(), "listed open PRs");
        Ok(prs)
    }

    async fn list_merged_prs(&self) -> Result<Vec<ExistingPr>> {
        debug!("listing merged PRs");
        let prs: Vec<ExistingPr> = self
            .list_authored(State::Closed)
            .await?
            .iter()
            .filter(|pr| pr.merged_at.is_some())
            .map(pr_from_octocrab)
            .collect();
        debug!(count = prs.len(), "listed merged PRs");
        Ok(prs)
    }

    async fn find_pr_for_head(&self, head: &str) -> Result<Option<ExistingPr>> {
        debug!(head, "finding PR for head");
        let prs = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .head(format!("{}:{head}", self.config.owner))
            .state(State::All)
            .send()
            .await?;

        let result = prs.items.first().map(pr_from_octocrab);
        if let Some(ref pr) = result {
            debug!(pr_number = pr.number, state = %pr.state, "found PR");
        } else {
            debug!("no PR found");
        }
        Ok(result)
    }

    async fn create_pr(&self, request: &CreatePrRequest) -> Result<ExistingPr> {
        debug!(head = %request.head, base = %request.base, draft = request.draft, "creating PR");
        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .create(&request.title, &request.head, &request.base)
            .body(&request.body)
            .draft(request.draft)
            .send()
            .await?;

        let result = pr_from_octocrab(&pr);
        debug!(pr_number = result.number, "created PR");
        Ok(result)
    }

    async fn update_pr_base(&self, number: u64, base: &str) -> Result<()> {
        debug!(number, base, "updating PR base");
        self.client
            .pulls(&self.config.owner, &self.config.repo)
            .update(number)
            .base(base)
            .send()
            .await?;
        Ok(())
    }

    async fn update_pr_body(&self, number: u64, body: &str) -> Result<()> {
        debug!(number, "updating PR body");
        self.client
            .pulls(&self.config.owner, &self.config.repo)
            .update(number)
            .body(body)
            .send()
            .await?;
        Ok(())
    }

    async fn set_draft(&self, number: u64, draft: bool) -> Result<()> {
        debug!(number, draft, "setting draft state");
        self.set_draft_graphql(number, draft).await
    }
}
