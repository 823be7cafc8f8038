use serde::{Deserialize, Serialize};
use std::fmt;

/// A session clients connect to
///
/// Returned by `/session/create`. The platform always wraps it in a
/// one-element list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "session_id")]
    pub id: String,
    pub project_id: String,
    #[serde(rename = "created_dt", default)]
    pub created_at: String,
    #[serde(default)]
    pub media_server_url: String,
}

/// A recorded archive of a session
///
/// The platform owns the archive lifecycle ("started", "stopped",
/// "uploaded", "failed", ...); this is a snapshot taken from a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Archive {
    pub id: String,
    /// Unix timestamp in milliseconds
    #[serde(rename = "createdAt", alias = "created_at", default)]
    pub created_at: i64,
    /// Seconds
    #[serde(default)]
    pub duration: i64,
    #[serde(rename = "hasAudio", alias = "has_audio", default)]
    pub has_audio: bool,
    #[serde(rename = "hasVideo", alias = "has_video", default)]
    pub has_video: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "projectId", alias = "projectID", alias = "project_id", default)]
    pub project_id: i64,
    #[serde(default)]
    pub reason: String,
    #[serde(rename = "sessionId", alias = "session_id")]
    pub session_id: String,
    /// Bytes
    #[serde(default)]
    pub size: i64,
    pub status: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "outputMode", alias = "output_mode", default)]
    pub output_mode: Option<OutputMode>,
}

/// Envelope returned by the archive listing endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveList {
    pub count: u32,
    #[serde(default)]
    pub items: Vec<Archive>,
}

/// Whether a session is archived automatically
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveMode {
    #[default]
    Manual,
    Always,
}

/// How the streams of an archive are recorded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Composed,
    Individual,
}

/// Role granted by a client token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Publisher,
    Subscriber,
    Moderator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Publisher => "publisher",
            Role::Subscriber => "subscriber",
            Role::Moderator => "moderator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_deserialization() {
        let body = json!({
            "session_id": "1_MX40NTgyMjcyMn5-MTUxNjI5OTQyMzM0OH4",
            "project_id": "45822722",
            "partner_id": "45822722",
            "create_dt": "Thu Jan 18 10:50:23 PST 2018",
            "created_dt": "Thu Jan 18 10:50:23 PST 2018",
            "media_server_url": ""
        });

        let session: Session = serde_json::from_value(body).unwrap();
        assert_eq!(session.id, "1_MX40NTgyMjcyMn5-MTUxNjI5OTQyMzM0OH4");
        assert_eq!(session.project_id, "45822722");
        assert_eq!(session.created_at, "Thu Jan 18 10:50:23 PST 2018");
        assert!(session.media_server_url.is_empty());
    }

    #[test]
    fn test_archive_deserialization_camel_case() {
        let body = json!({
            "createdAt": 1384221730555i64,
            "duration": 5049,
            "hasAudio": true,
            "hasVideo": true,
            "id": "b40ef09b-3811-4726-b508-e41a0f96c68f",
            "name": "The archive name you supplied",
            "outputMode": "composed",
            "projectId": 234567,
            "reason": "",
            "sessionId": "flR1ZSBPY3QgMjkgMTI6MTM6MjMgUERUIDIwMTN",
            "size": 247748791,
            "status": "available",
            "url": "https://tokbox.com.archive2.s3.amazonaws.com/123456/archive.mp4"
        });

        let archive: Archive = serde_json::from_value(body).unwrap();
        assert_eq!(archive.id, "b40ef09b-3811-4726-b508-e41a0f96c68f");
        assert_eq!(archive.created_at, 1384221730555);
        assert_eq!(archive.duration, 5049);
        assert!(archive.has_audio);
        assert_eq!(archive.project_id, 234567);
        assert_eq!(archive.session_id, "flR1ZSBPY3QgMjkgMTI6MTM6MjMgUERUIDIwMTN");
        assert_eq!(archive.output_mode, Some(OutputMode::Composed));
        assert_eq!(archive.status, "available");
    }

    #[test]
    fn test_archive_deserialization_snake_case_and_defaults() {
        let body = json!({
            "id": "archive-1",
            "session_id": "session-1",
            "has_video": true,
            "status": "started",
            "name": null,
            "url": null
        });

        let archive: Archive = serde_json::from_value(body).unwrap();
        assert_eq!(archive.session_id, "session-1");
        assert!(archive.has_video);
        assert!(!archive.has_audio);
        assert_eq!(archive.name, None);
        assert_eq!(archive.url, None);
        assert_eq!(archive.size, 0);
        assert_eq!(archive.output_mode, None);
    }

    #[test]
    fn test_archive_requires_id_session_and_status() {
        let result: Result<Archive, _> = serde_json::from_value(json!({"unexpected": "shape"}));
        assert!(result.is_err());

        let result: Result<Archive, _> = serde_json::from_value(json!({
            "id": "archive-1",
            "sessionId": "session-1"
        }));
        assert!(result.unwrap_err().to_string().contains("status"));
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_string(&ArchiveMode::Manual).unwrap(), "\"manual\"");
        assert_eq!(serde_json::to_string(&ArchiveMode::Always).unwrap(), "\"always\"");
        assert_eq!(serde_json::to_string(&OutputMode::Composed).unwrap(), "\"composed\"");
        assert_eq!(serde_json::to_string(&OutputMode::Individual).unwrap(), "\"individual\"");
        assert_eq!(Role::Moderator.to_string(), "moderator");
        assert_eq!(Role::default(), Role::Publisher);
    }
}
