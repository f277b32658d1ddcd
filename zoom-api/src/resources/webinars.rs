//! Webinar panelists API.

use log::*;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{validation_error, Error, ValidationErrorKind};
use crate::pipeline::{path_segment, ApiRequest, Pipeline};

/// Zoom accepts at most this many panelists in one add request.
pub const MAX_PANELISTS_PER_REQUEST: usize = 30;

/// A webinar panelist
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Panelist {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub join_url: Option<String>,
}

/// Panelists of a webinar
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Panelists {
    #[serde(default)]
    pub total_records: u64,
    #[serde(default)]
    pub panelists: Vec<Panelist>,
}

/// Panelist to invite
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewPanelist {
    pub name: String,
    pub email: String,
}

#[derive(Serialize)]
struct AddPanelistsBody<'a> {
    panelists: &'a [NewPanelist],
}

pub struct Webinars<'a> {
    pipeline: &'a Pipeline,
}

impl<'a> Webinars<'a> {
    pub(crate) fn new(pipeline: &'a Pipeline) -> Self {
        Self { pipeline }
    }

    pub async fn list_panelists(
        &self,
        webinar_id: i64,
        cancel: &CancellationToken,
    ) -> Result<Panelists, Error> {
        let request = ApiRequest::get(format!("/webinars/{}/panelists", webinar_id));
        self.pipeline.execute_json(&request, cancel).await
    }

    /// Invite between 1 and 30 panelists to a webinar.
    pub async fn add_panelists(
        &self,
        webinar_id: i64,
        panelists: &[NewPanelist],
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        if panelists.is_empty() {
            return Err(validation_error(
                ValidationErrorKind::InvalidArgument,
                "At least one panelist is required",
            ));
        }
        if panelists.len() > MAX_PANELISTS_PER_REQUEST {
            return Err(validation_error(
                ValidationErrorKind::InvalidArgument,
                &format!(
                    "At most {} panelists can be added at once, got {}",
                    MAX_PANELISTS_PER_REQUEST,
                    panelists.len()
                ),
            ));
        }

        let request = ApiRequest::post(format!("/webinars/{}/panelists", webinar_id))
            .json(&AddPanelistsBody { panelists })?;
        self.pipeline.execute(&request, cancel).await?;
        info!("Added {} panelists to webinar {}", panelists.len(), webinar_id);
        Ok(())
    }

    pub async fn remove_panelist(
        &self,
        webinar_id: i64,
        panelist_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        let request = ApiRequest::delete(format!(
            "/webinars/{}/panelists/{}",
            webinar_id,
            path_segment(panelist_id)?
        ));
        self.pipeline.execute(&request, cancel).await?;
        Ok(())
    }
}
