//! Resource groups: thin callers that build requests and hand them to the pipeline.

mod cloud_recordings;
mod dashboards;
mod meetings;
mod users;
mod webinars;

pub use cloud_recordings::{CloudRecordings, RecordingFile, RecordingMeeting};
pub use dashboards::{DashboardMeeting, DashboardMeetingType, Dashboards, Participant};
pub use meetings::{CreateMeetingRequest, Meeting, MeetingListType, Meetings};
pub use users::{User, UserStatus, Users};
pub use webinars::{NewPanelist, Panelist, Panelists, Webinars, MAX_PANELISTS_PER_REQUEST};
