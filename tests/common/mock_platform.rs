//! Mock platform service for testing

#![allow(dead_code)]

use async_trait::async_trait;
use jj_stack_prs::error::{Error, Result};
use jj_stack_prs::platform::{CreatePrRequest, PlatformService};
use jj_stack_prs::types::{ExistingPr, PrState};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `update_pr_base`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBaseCall {
    pub pr_number: u64,
    pub new_base: String,
}

/// Call record for `update_pr_body`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBodyCall {
    pub pr_number: u64,
    pub body: String,
}

/// Simple mock platform service for testing
///
/// Manually implements `PlatformService` with:
/// - Auto-incrementing PR numbers
/// - Call tracking for verification
/// - Configurable responses per head branch
/// - Error injection for failure path testing
pub struct MockPlatformService {
    next_pr_number: AtomicU64,
    open_prs: Mutex<Vec<ExistingPr>>,
    merged_prs: Mutex<Vec<ExistingPr>>,
    find_pr_responses: Mutex<HashMap<String, Option<ExistingPr>>>,
    // Call tracking
    find_pr_calls: Mutex<Vec<String>>,
    create_pr_calls: Mutex<Vec<CreatePrRequest>>,
    update_base_calls: Mutex<Vec<UpdateBaseCall>>,
    update_body_calls: Mutex<Vec<UpdateBodyCall>>,
    set_draft_calls: Mutex<Vec<(u64, bool)>>,
    // Error injection
    error_on_list: Mutex<Option<String>>,
    error_on_find_pr: Mutex<Option<String>>,
    error_on_create_pr: Mutex<Option<String>>,
    error_on_update_base: Mutex<Option<String>>,
}

impl Default for MockPlatformService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatformService {
    /// Create an empty mock; new PRs start at #100
    pub fn new() -> Self {
        Self {
            next_pr_number: AtomicU64::new(100),
            open_prs: Mutex::new(Vec::new()),
            merged_prs: Mutex::new(Vec::new()),
            find_pr_responses: Mutex::new(HashMap::new()),
            find_pr_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            update_base_calls: Mutex::new(Vec::new()),
            update_body_calls: Mutex::new(Vec::new()),
            set_draft_calls: Mutex::new(Vec::new()),
            error_on_list: Mutex::new(None),
            error_on_find_pr: Mutex::new(None),
            error_on_create_pr: Mutex::new(None),
            error_on_update_base: Mutex::new(None),
        }
    }

    // === Error injection methods ===

    /// Make both listing methods return an error
    pub fn fail_list(&self, msg: &str) {
        *self.error_on_list.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `find_pr_for_head` return an error
    pub fn fail_find_pr(&self, msg: &str) {
        *self.error_on_find_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_pr` return an error
    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `update_pr_base` return an error
    pub fn fail_update_base(&self, msg: &str) {
        *self.error_on_update_base.lock().unwrap() = Some(msg.to_string());
    }

    // === Response setup ===

    /// Set the PRs returned by `list_open_prs`
    pub fn set_open_prs(&self, prs: Vec<ExistingPr>) {
        *self.open_prs.lock().unwrap() = prs;
    }

    /// Set the PRs returned by `list_merged_prs`
    pub fn set_merged_prs(&self, prs: Vec<ExistingPr>) {
        *self.merged_prs.lock().unwrap() = prs;
    }

    /// Set the response for `find_pr_for_head` for a specific head
    pub fn set_find_pr_response(&self, head: &str, pr: Option<ExistingPr>) {
        self.find_pr_responses
            .lock()
            .unwrap()
            .insert(head.to_string(), pr);
    }

    // === Call inspection ===

    pub fn get_find_pr_calls(&self) -> Vec<String> {
        self.find_pr_calls.lock().unwrap().clone()
    }

    pub fn get_create_pr_calls(&self) -> Vec<CreatePrRequest> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    pub fn get_update_base_calls(&self) -> Vec<UpdateBaseCall> {
        self.update_base_calls.lock().unwrap().clone()
    }

    pub fn get_update_body_calls(&self) -> Vec<UpdateBodyCall> {
        self.update_body_calls.lock().unwrap().clone()
    }

    pub fn get_set_draft_calls(&self) -> Vec<(u64, bool)> {
        self.set_draft_calls.lock().unwrap().clone()
    }

    /// Assert no mutating call was made
    pub fn assert_no_mutations(&self) {
        assert!(self.get_create_pr_calls().is_empty(), "unexpected create_pr");
        assert!(self.get_update_base_calls().is_empty(), "unexpected update_pr_base");
        assert!(self.get_update_body_calls().is_empty(), "unexpected update_pr_body");
        assert!(self.get_set_draft_calls().is_empty(), "unexpected set_draft");
    }

    fn check_error(slot: &Mutex<Option<String>>) -> Result<()> {
        match slot.lock().unwrap().as_ref() {
            Some(msg) => Err(Error::Platform(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn list_open_prs(&self) -> Result<Vec<ExistingPr>> {
        Self::check_error(&self.error_on_list)?;
        Ok(self.open_prs.lock().unwrap().clone())
    }

    async fn list_merged_prs(&self) -> Result<Vec<ExistingPr>> {
        Self::check_error(&self.error_on_list)?;
        Ok(self.merged_prs.lock().unwrap().clone())
    }

    async fn find_pr_for_head(&self, head: &str) -> Result<Option<ExistingPr>> {
        self.find_pr_calls.lock().unwrap().push(head.to_string());
        Self::check_error(&self.error_on_find_pr)?;
        Ok(self
            .find_pr_responses
            .lock()
            .unwrap()
            .get(head)
            .cloned()
            .flatten())
    }

    async fn create_pr(&self, request: &CreatePrRequest) -> Result<ExistingPr> {
        self.create_pr_calls.lock().unwrap().push(request.clone());
        Self::check_error(&self.error_on_create_pr)?;

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        Ok(ExistingPr {
            number,
            head_ref_name: request.head.clone(),
            base_ref_name: request.base.clone(),
            is_draft: request.draft,
            state: PrState::Open,
            url: format!("https://github.com/test/repo/pull/{number}"),
            body: Some(request.body.clone()),
        })
    }

    async fn update_pr_base(&self, number: u64, base: &str) -> Result<()> {
        self.update_base_calls.lock().unwrap().push(UpdateBaseCall {
            pr_number: number,
            new_base: base.to_string(),
        });
        Self::check_error(&self.error_on_update_base)
    }

    async fn update_pr_body(&self, number: u64, body: &str) -> Result<()> {
        self.update_body_calls.lock().unwrap().push(UpdateBodyCall {
            pr_number: number,
            body: body.to_string(),
        });
        Ok(())
    }

    async fn set_draft(&self, number: u64, draft: bool) -> Result<()> {
        self.set_draft_calls.lock().unwrap().push((number, draft));
        Ok(())
    }
}
