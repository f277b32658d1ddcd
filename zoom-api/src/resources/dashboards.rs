//! Dashboard metrics API.

use chrono::NaiveDate;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::cloud_recordings::{validate_date_range, DATE_FORMAT};
use crate::error::Error;
use crate::pagination::{PageRequest, PagedResult, MAX_RECORDS_PER_PAGE};
use crate::pipeline::{path_segment, ApiRequest, Pipeline};

/// Dashboard listing type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DashboardMeetingType {
    #[default]
    Live,
    Past,
    PastOne,
}

impl DashboardMeetingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardMeetingType::Live => "live",
            DashboardMeetingType::Past => "past",
            DashboardMeetingType::PastOne => "pastOne",
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DashboardMeeting {
    #[serde(default)]
    pub uuid: Option<String>,
    pub id: i64,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub participants: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Participant {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub join_time: Option<String>,
    #[serde(default)]
    pub leave_time: Option<String>,
}

pub struct Dashboards<'a> {
    pipeline: &'a Pipeline,
}

impl<'a> Dashboards<'a> {
    pub(crate) fn new(pipeline: &'a Pipeline) -> Self {
        Self { pipeline }
    }

    pub async fn list_meetings(
        &self,
        meeting_type: DashboardMeetingType,
        from: NaiveDate,
        to: NaiveDate,
        page: &PageRequest,
        cancel: &CancellationToken,
    ) -> Result<PagedResult<DashboardMeeting>, Error> {
        validate_date_range(from, to)?;
        let request = ApiRequest::get("/metrics/meetings")
            .query("type", meeting_type.as_str())
            .query("from", from.format(DATE_FORMAT))
            .query("to", to.format(DATE_FORMAT));
        self.pipeline
            .execute_paged(request, "meetings", page, MAX_RECORDS_PER_PAGE, cancel)
            .await
    }

    /// List participants of a live or past meeting, by meeting id or UUID.
    pub async fn list_meeting_participants(
        &self,
        meeting_id: &str,
        meeting_type: DashboardMeetingType,
        page: &PageRequest,
        cancel: &CancellationToken,
    ) -> Result<PagedResult<Participant>, Error> {
        let request = ApiRequest::get(format!(
            "/metrics/meetings/{}/participants",
            meeting_uuid_segment(meeting_id)?
        ))
        .query("type", meeting_type.as_str());
        self.pipeline
            .execute_paged(request, "participants", page, MAX_RECORDS_PER_PAGE, cancel)
            .await
    }
}

/// Zoom requires UUIDs that begin with `/` or contain `//` to be encoded twice.
fn meeting_uuid_segment(meeting_id: &str) -> Result<String, Error> {
    let encoded = path_segment(meeting_id)?;
    if meeting_id.starts_with('/') || meeting_id.contains("//") {
        Ok(urlencoding::encode(&encoded).into_owned())
    } else {
        Ok(encoded)
    }
}
