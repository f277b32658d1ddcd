//! Cloud recordings API.

use chrono::NaiveDate;
use log::*;
use secrecy::SecretString;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::error::{validation_error, Error, ValidationErrorKind};
use crate::pagination::{PageRequest, PagedResult, MAX_RECORDS_PER_PAGE};
use crate::pipeline::{path_segment, ApiRequest, Pipeline};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// A recorded meeting and its files
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RecordingMeeting {
    #[serde(default)]
    pub uuid: Option<String>,
    pub id: i64,
    #[serde(default)]
    pub host_id: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub duration: Option<i32>,
    #[serde(default)]
    pub total_size: Option<u64>,
    #[serde(default)]
    pub recording_files: Vec<RecordingFile>,
}

/// One file of a cloud recording
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RecordingFile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub recording_type: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

pub struct CloudRecordings<'a> {
    pipeline: &'a Pipeline,
}

impl<'a> CloudRecordings<'a> {
    pub(crate) fn new(pipeline: &'a Pipeline) -> Self {
        Self { pipeline }
    }

    /// List a user's cloud recordings started between `from` and `to` inclusive.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        page: &PageRequest,
        cancel: &CancellationToken,
    ) -> Result<PagedResult<RecordingMeeting>, Error> {
        validate_date_range(from, to)?;
        let request = ApiRequest::get(format!("/users/{}/recordings", path_segment(user_id)?))
            .query("from", from.format(DATE_FORMAT))
            .query("to", to.format(DATE_FORMAT));
        self.pipeline
            .execute_paged(request, "meetings", page, MAX_RECORDS_PER_PAGE, cancel)
            .await
    }

    /// Download a recording file.
    ///
    /// `override_token` is used verbatim when given, e.g. the `download_access_token`
    /// delivered with a `recording.completed` webhook. Otherwise the session token is used,
    /// and only for URLs on the API host, `zoom.us` or a `*.zoom.us` subdomain. Any other
    /// host is rejected as an invalid argument before a request is sent.
    pub async fn download_file(
        &self,
        download_url: &str,
        override_token: Option<SecretString>,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, Error> {
        if download_url.trim().is_empty() {
            return Err(validation_error(
                ValidationErrorKind::InvalidArgument,
                "Download URL must not be empty",
            ));
        }
        let request = ApiRequest::get(download_url).override_token(override_token);
        let response = self.pipeline.execute(&request, cancel).await?;
        debug!("Downloaded {} bytes of recording", response.body.len());
        Ok(response.body)
    }
}

pub(crate) fn validate_date_range(from: NaiveDate, to: NaiveDate) -> Result<(), Error> {
    if from > to {
        return Err(validation_error(
            ValidationErrorKind::InvalidArgument,
            &format!("`from` ({}) must not be after `to` ({})", from, to),
        ));
    }
    Ok(())
}
