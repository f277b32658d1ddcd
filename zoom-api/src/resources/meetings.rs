//! Meetings API.

use log::*;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::pagination::{PageRequest, PagedResult, MAX_RECORDS_PER_PAGE};
use crate::pipeline::{path_segment, ApiRequest, Pipeline};

/// Which of a user's meetings to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MeetingListType {
    #[default]
    Scheduled,
    Live,
    Upcoming,
}

impl MeetingListType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingListType::Scheduled => "scheduled",
            MeetingListType::Live => "live",
            MeetingListType::Upcoming => "upcoming",
        }
    }
}

/// A Zoom meeting
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Meeting {
    pub id: i64,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub host_id: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default, rename = "type")]
    pub meeting_type: Option<i32>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub duration: Option<i32>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub join_url: Option<String>,
    #[serde(default)]
    pub agenda: Option<String>,
}

/// Body for creating a meeting
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateMeetingRequest {
    pub topic: String,
    /// 1 instant, 2 scheduled, 3 recurring without fixed time, 8 recurring with fixed time.
    #[serde(rename = "type")]
    pub meeting_type: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agenda: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

pub struct Meetings<'a> {
    pipeline: &'a Pipeline,
}

impl<'a> Meetings<'a> {
    pub(crate) fn new(pipeline: &'a Pipeline) -> Self {
        Self { pipeline }
    }

    /// List a user's meetings.
    pub async fn list(
        &self,
        user_id: &str,
        list_type: MeetingListType,
        page: &PageRequest,
        cancel: &CancellationToken,
    ) -> Result<PagedResult<Meeting>, Error> {
        let request = ApiRequest::get(format!("/users/{}/meetings", path_segment(user_id)?))
            .query("type", list_type.as_str());
        self.pipeline
            .execute_paged(request, "meetings", page, MAX_RECORDS_PER_PAGE, cancel)
            .await
    }

    pub async fn get(&self, meeting_id: i64, cancel: &CancellationToken) -> Result<Meeting, Error> {
        let request = ApiRequest::get(format!("/meetings/{}", meeting_id));
        self.pipeline.execute_json(&request, cancel).await
    }

    /// Schedule a meeting for a user.
    pub async fn create(
        &self,
        user_id: &str,
        meeting: &CreateMeetingRequest,
        cancel: &CancellationToken,
    ) -> Result<Meeting, Error> {
        let request =
            ApiRequest::post(format!("/users/{}/meetings", path_segment(user_id)?)).json(meeting)?;
        let created: Meeting = self.pipeline.execute_json(&request, cancel).await?;
        info!("Created Zoom meeting {}", created.id);
        Ok(created)
    }

    pub async fn delete(&self, meeting_id: i64, cancel: &CancellationToken) -> Result<(), Error> {
        let request = ApiRequest::delete(format!("/meetings/{}", meeting_id));
        self.pipeline.execute(&request, cancel).await?;
        info!("Deleted Zoom meeting {}", meeting_id);
        Ok(())
    }
}
