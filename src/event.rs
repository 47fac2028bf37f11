//! Build status events as delivered by the build system's Pub/Sub topic

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

use crate::error::{GlueError, Result};

pub const SUB_TRIGGER_NAME: &str = "TRIGGER_NAME";
pub const SUB_IMAGE_TAG: &str = "_IMAGE_TAG";
pub const SUB_TAG: &str = "_TAG";
pub const SUB_HOST: &str = "_HOST";
pub const SUB_COMMIT_SHA: &str = "COMMIT_SHA";
pub const SUB_REPO_NAME: &str = "REPO_NAME";

/// Status of a build
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildStatus {
    StatusUnknown,
    Pending,
    Queued,
    Working,
    Success,
    Failure,
    InternalError,
    Timeout,
    Cancelled,
    Expired,
    #[serde(other)]
    Other,
}

impl BuildStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStatus::StatusUnknown => "STATUS_UNKNOWN",
            BuildStatus::Pending => "PENDING",
            BuildStatus::Queued => "QUEUED",
            BuildStatus::Working => "WORKING",
            BuildStatus::Success => "SUCCESS",
            BuildStatus::Failure => "FAILURE",
            BuildStatus::InternalError => "INTERNAL_ERROR",
            BuildStatus::Timeout => "TIMEOUT",
            BuildStatus::Cancelled => "CANCELLED",
            BuildStatus::Expired => "EXPIRED",
            BuildStatus::Other => "OTHER",
        }
    }

    /// Statuses that produce a notification.
    pub fn is_notifiable(&self) -> bool {
        matches!(
            self,
            BuildStatus::Working
                | BuildStatus::Success
                | BuildStatus::Failure
                | BuildStatus::InternalError
                | BuildStatus::Timeout
                | BuildStatus::Cancelled
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            BuildStatus::Failure | BuildStatus::InternalError | BuildStatus::Timeout
        )
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which service a deploy build targets, derived from the image tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployTarget {
    Frontend,
    Api,
    Auth,
}

impl DeployTarget {
    pub fn from_image_tag(tag: &str) -> Self {
        let tag = tag.to_lowercase();
        if tag.contains("api") {
            DeployTarget::Api
        } else if tag.contains("auth") {
            DeployTarget::Auth
        } else {
            DeployTarget::Frontend
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeployTarget::Frontend => "Frontend",
            DeployTarget::Api => "API",
            DeployTarget::Auth => "Auth",
        }
    }
}

impl fmt::Display for DeployTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A build status event. Only the fields the notifier reads are modelled.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildEvent {
    pub id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    pub status: BuildStatus,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finish_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub substitutions: HashMap<String, String>,
    #[serde(default)]
    pub log_url: Option<String>,
    #[serde(default)]
    pub build_trigger_id: Option<String>,
}

impl BuildEvent {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn substitution(&self, key: &str) -> Option<&str> {
        self.substitutions
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn trigger_name(&self) -> Option<&str> {
        self.substitution(SUB_TRIGGER_NAME)
    }

    pub fn image_tag(&self) -> Option<&str> {
        self.substitution(SUB_IMAGE_TAG)
            .or_else(|| self.substitution(SUB_TAG))
    }

    pub fn host(&self) -> Option<&str> {
        self.substitution(SUB_HOST)
    }

    pub fn commit_sha(&self) -> Option<&str> {
        self.substitution(SUB_COMMIT_SHA)
    }

    pub fn repo_name(&self) -> Option<&str> {
        self.substitution(SUB_REPO_NAME)
    }

    pub fn target(&self) -> DeployTarget {
        DeployTarget::from_image_tag(self.image_tag().unwrap_or_default())
    }

    /// Wall-clock build time. `None` unless both timestamps are present and ordered.
    pub fn duration(&self) -> Option<Duration> {
        let (start, finish) = (self.start_time?, self.finish_time?);
        let elapsed = finish - start;
        (elapsed >= Duration::zero()).then_some(elapsed)
    }

    pub fn short_id(&self) -> &str {
        self.id.split('-').next().unwrap_or(&self.id)
    }
}

/// A single Pub/Sub message; `data` carries the base64 encoded build JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PubSubMessage {
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default, alias = "message_id")]
    pub message_id: Option<String>,
}

impl PubSubMessage {
    pub fn decode_build(&self) -> Result<BuildEvent> {
        let data = self
            .data
            .as_deref()
            .filter(|d| !d.is_empty())
            .ok_or_else(|| GlueError::PayloadError("message has no data".to_string()))?;
        let raw = STANDARD.decode(data.trim())?;
        BuildEvent::from_json(&raw)
    }
}

/// Body of a Pub/Sub push request
#[derive(Debug, Clone, Deserialize)]
pub struct PushEnvelope {
    pub message: PubSubMessage,
    #[serde(default)]
    pub subscription: Option<String>,
}

pub fn decode_push_envelope(body: &[u8]) -> Result<BuildEvent> {
    let envelope: PushEnvelope = serde_json::from_slice(body)?;
    envelope.message.decode_build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build_json() -> serde_json::Value {
        json!({
            "id": "0f6c2b7e-1234-4d2a-9a7e-5b1c2d3e4f50",
            "projectId": "acme-prod",
            "status": "SUCCESS",
            "createTime": "2024-03-01T10:00:00.123456789Z",
            "startTime": "2024-03-01T10:00:05Z",
            "finishTime": "2024-03-01T10:03:12Z",
            "logUrl": "https://console.cloud.google.com/cloud-build/builds/0f6c2b7e",
            "substitutions": {
                "TRIGGER_NAME": "deploy-api",
                "_IMAGE_TAG": "gcr.io/acme/api:v1.4.0",
                "_HOST": "api.acme.test",
                "COMMIT_SHA": "a1b2c3d4e5f6",
                "REPO_NAME": "backend"
            }
        })
    }

    #[test]
    fn decodes_push_envelope() {
        let data = STANDARD.encode(build_json().to_string());
        let body = json!({
            "message": { "data": data, "messageId": "42", "attributes": { "buildId": "0f6c2b7e" } },
            "subscription": "projects/acme-prod/subscriptions/cloud-builds"
        });

        let event = decode_push_envelope(body.to_string().as_bytes()).unwrap();
        assert_eq!(event.status, BuildStatus::Success);
        assert_eq!(event.trigger_name(), Some("deploy-api"));
        assert_eq!(event.host(), Some("api.acme.test"));
        assert_eq!(event.target(), DeployTarget::Api);
        assert_eq!(event.short_id(), "0f6c2b7e");
        assert_eq!(event.duration(), Some(Duration::seconds(187)));
    }

    #[test]
    fn unknown_status_is_other() {
        let mut value = build_json();
        value["status"] = json!("SOMETHING_NEW");
        let event = BuildEvent::from_json(value.to_string().as_bytes()).unwrap();
        assert_eq!(event.status, BuildStatus::Other);
        assert!(!event.status.is_notifiable());
    }

    #[test]
    fn missing_timestamps_have_no_duration() {
        let event = BuildEvent::from_json(br#"{"id": "b1", "status": "WORKING"}"#).unwrap();
        assert!(event.duration().is_none());
        assert!(event.trigger_name().is_none());
        assert_eq!(event.target(), DeployTarget::Frontend);
    }

    #[test]
    fn finish_before_start_has_no_duration() {
        let mut value = build_json();
        value["startTime"] = json!("2024-03-01T10:05:00Z");
        value["finishTime"] = json!("2024-03-01T10:00:00Z");
        let event = BuildEvent::from_json(value.to_string().as_bytes()).unwrap();
        assert!(event.duration().is_none());
    }

    #[test]
    fn tag_falls_back_to_short_substitution() {
        let event = BuildEvent::from_json(
            br#"{"id": "b1", "status": "QUEUED", "substitutions": {"_TAG": "auth-service", "_IMAGE_TAG": ""}}"#,
        )
        .unwrap();
        assert_eq!(event.image_tag(), Some("auth-service"));
        assert_eq!(event.target(), DeployTarget::Auth);
    }

    #[test]
    fn rejects_bad_base64() {
        let body = json!({ "message": { "data": "%%%not-base64%%%" } });
        let err = decode_push_envelope(body.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, GlueError::Base64(_)));
    }

    #[test]
    fn rejects_message_without_data() {
        let body = json!({ "message": { "messageId": "1" } });
        let err = decode_push_envelope(body.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, GlueError::PayloadError(_)));
    }

    #[test]
    fn target_detection_is_case_insensitive() {
        assert_eq!(DeployTarget::from_image_tag("Web-API"), DeployTarget::Api);
        assert_eq!(DeployTarget::from_image_tag("AUTH"), DeployTarget::Auth);
        assert_eq!(DeployTarget::from_image_tag("web:latest"), DeployTarget::Frontend);
    }
}
