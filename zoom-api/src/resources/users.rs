//! Users API.

use log::*;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::pagination::{PageRequest, PagedResult, MAX_RECORDS_PER_PAGE};
use crate::pipeline::{path_segment, ApiRequest, Pipeline};

/// Account status filter for user listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Pending,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Pending => "pending",
        }
    }
}

/// A Zoom user
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, rename = "type")]
    pub user_type: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub dept: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

pub struct Users<'a> {
    pipeline: &'a Pipeline,
}

impl<'a> Users<'a> {
    pub(crate) fn new(pipeline: &'a Pipeline) -> Self {
        Self { pipeline }
    }

    /// List users on the account. Accepts token paging or a legacy page number.
    pub async fn list(
        &self,
        status: UserStatus,
        page: &PageRequest,
        cancel: &CancellationToken,
    ) -> Result<PagedResult<User>, Error> {
        let request = ApiRequest::get("/users").query("status", status.as_str());
        let users = self
            .pipeline
            .execute_paged(request, "users", page, MAX_RECORDS_PER_PAGE, cancel)
            .await?;
        debug!("Listed {} {} users", users.records.len(), status.as_str());
        Ok(users)
    }

    /// Get a user by id, email address, or `me`.
    pub async fn get(&self, user_id: &str, cancel: &CancellationToken) -> Result<User, Error> {
        let request = ApiRequest::get(format!("/users/{}", path_segment(user_id)?));
        self.pipeline.execute_json(&request, cancel).await
    }
}
