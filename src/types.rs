use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Generation status as reported by the status endpoints.
///
/// On the wire this is the integer `generateStatus` (1 through 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum JobStatus {
    Pending,
    Processing,
    Generated,
    Auditing,
    Success,
    Failed,
    Timeout,
}

impl JobStatus {
    /// Whether no further status change will occur.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failed | JobStatus::Timeout)
    }

    pub fn code(self) -> u8 {
        match self {
            JobStatus::Pending => 1,
            JobStatus::Processing => 2,
            JobStatus::Generated => 3,
            JobStatus::Auditing => 4,
            JobStatus::Success => 5,
            JobStatus::Failed => 6,
            JobStatus::Timeout => 7,
        }
    }
}

impl TryFrom<u8> for JobStatus {
    type Error = String;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        match code {
            1 => Ok(JobStatus::Pending),
            2 => Ok(JobStatus::Processing),
            3 => Ok(JobStatus::Generated),
            4 => Ok(JobStatus::Auditing),
            5 => Ok(JobStatus::Success),
            6 => Ok(JobStatus::Failed),
            7 => Ok(JobStatus::Timeout),
            other => Err(format!("unknown generateStatus {}", other)),
        }
    }
}

impl From<JobStatus> for u8 {
    fn from(status: JobStatus) -> u8 {
        status.code()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Processing => "PROCESSING",
            JobStatus::Generated => "GENERATED",
            JobStatus::Auditing => "AUDITING",
            JobStatus::Success => "SUCCESS",
            JobStatus::Failed => "FAILED",
            JobStatus::Timeout => "TIMEOUT",
        };
        f.write_str(name)
    }
}

/// Identifier (`generateUuid`) of a submitted job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobHandle {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for JobHandle {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// An image produced by a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionImage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub seed: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub audit_status: i32,
}

/// A video produced by a workflow job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionVideo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub video_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cover_path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub node_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub output_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub audit_status: i32,
}

/// Status payload of a job. Returned unchanged once terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    #[serde(default, deserialize_with = "null_as_default")]
    pub generate_uuid: String,
    pub generate_status: JobStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub percent_completed: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub generate_msg: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub points_cost: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub account_balance: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<PredictionImage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub videos: Vec<PredictionVideo>,
}

impl Prediction {
    pub fn status(&self) -> JobStatus {
        self.generate_status
    }

    pub fn is_success(&self) -> bool {
        self.generate_status == JobStatus::Success
    }
}

/// `{code, msg, data}` wrapper every endpoint responds with.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub msg: String,
    pub data: Option<T>,
}

/// `data` of a submission response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResult {
    pub generate_uuid: JobHandle,
}

/// Fields of a one-time upload signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSignature {
    pub key: String,
    pub policy: String,
    pub post_url: String,
    pub x_oss_date: String,
    #[serde(deserialize_with = "string_or_number")]
    pub x_oss_expires: String,
    pub x_oss_signature: String,
    pub x_oss_credential: String,
    pub x_oss_signature_version: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_set() {
        let terminal: Vec<_> = (1..=7u8)
            .map(|c| JobStatus::try_from(c).unwrap())
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(
            terminal,
            vec![JobStatus::Success, JobStatus::Failed, JobStatus::Timeout]
        );
    }

    #[test]
    fn test_status_codes() {
        for code in 1..=7u8 {
            assert_eq!(JobStatus::try_from(code).unwrap().code(), code);
        }
        assert!(JobStatus::try_from(0).is_err());
        assert!(JobStatus::try_from(8).is_err());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(JobStatus::Auditing.to_string(), "AUDITING");
        assert_eq!(JobStatus::Timeout.to_string(), "TIMEOUT");
    }

    #[test]
    fn test_parse_status_response() {
        let env: Envelope<Prediction> = serde_json::from_str(
            r#"{
            "code": 0,
            "msg": "",
            "data": {
                "generateUuid": "8dcbfa2997444899b71357ccb7db378b",
                "generateStatus": 5,
                "percentCompleted": 1,
                "generateMsg": "",
                "pointsCost": 10,
                "accountBalance": 1356402,
                "images": [
                    {"imageUrl": "https://liblibai-online.liblib.cloud/img/a.png", "seed": 12345, "auditStatus": 3}
                ]
            }
        }"#,
        )
        .unwrap();

        let p = env.data.unwrap();
        assert_eq!(p.generate_uuid, "8dcbfa2997444899b71357ccb7db378b");
        assert_eq!(p.status(), JobStatus::Success);
        assert!(p.is_success());
        assert_eq!(p.points_cost, 10.0);
        assert_eq!(p.images.len(), 1);
        assert_eq!(p.images[0].seed, 12345);
        assert!(p.videos.is_empty());
    }

    #[test]
    fn test_parse_video_prediction_with_nulls() {
        let p: Prediction = serde_json::from_str(
            r#"{
            "generateUuid": "v1",
            "generateStatus": 6,
            "generateMsg": null,
            "images": null,
            "videos": [
                {"videoUrl": "https://x/v.mp4", "coverPath": "https://x/c.png",
                 "nodeId": "12", "outputName": "VHS_VideoCombine", "auditStatus": 3}
            ]
        }"#,
        )
        .unwrap();
        assert_eq!(p.status(), JobStatus::Failed);
        assert!(p.generate_msg.is_empty());
        assert!(p.images.is_empty());
        assert_eq!(p.videos[0].node_id, "12");
        assert_eq!(p.videos[0].output_name, "VHS_VideoCombine");
    }

    #[test]
    fn test_null_fields_read_as_defaults() {
        let p: Prediction = serde_json::from_str(
            r#"{
            "generateUuid": null,
            "generateStatus": 2,
            "percentCompleted": null,
            "duration": null,
            "generateMsg": null,
            "pointsCost": null,
            "accountBalance": null,
            "images": [{"imageUrl": null, "seed": null, "auditStatus": null}],
            "videos": [{"videoUrl": null, "coverPath": null, "nodeId": null, "outputName": null, "auditStatus": null}]
        }"#,
        )
        .unwrap();
        assert_eq!(p.status(), JobStatus::Processing);
        assert!(p.generate_uuid.is_empty());
        assert_eq!(p.duration, 0.0);
        assert_eq!(p.points_cost, 0.0);
        assert_eq!(p.account_balance, 0.0);
        assert_eq!(p.images[0].image_url, "");
        assert_eq!(p.images[0].seed, 0);
        assert_eq!(p.videos[0].cover_path, "");
        assert_eq!(p.videos[0].audit_status, 0);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let res: std::result::Result<Prediction, _> =
            serde_json::from_str(r#"{"generateStatus": 42}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_null_data_envelope() {
        let env: Envelope<SubmitResult> =
            serde_json::from_str(r#"{"code": 0, "msg": "ok", "data": null}"#).unwrap();
        assert!(env.data.is_none());

        let env: Envelope<SubmitResult> =
            serde_json::from_str(r#"{"code": 0, "msg": "ok"}"#).unwrap();
        assert!(env.data.is_none());
    }

    #[test]
    fn test_parse_upload_signature() {
        let sig: UploadSignature = serde_json::from_str(
            r#"{
            "key": "img/abc/test.png",
            "policy": "eyJ...",
            "postUrl": "https://bucket.oss-cn-beijing.aliyuncs.com",
            "xOssDate": "20241019T120000Z",
            "xOssExpires": 3600,
            "xOssSignature": "sig",
            "xOssCredential": "cred",
            "xOssSignatureVersion": "OSS4-HMAC-SHA256"
        }"#,
        )
        .unwrap();
        assert_eq!(sig.x_oss_expires, "3600");
        assert_eq!(sig.post_url, "https://bucket.oss-cn-beijing.aliyuncs.com");
    }

    #[test]
    fn test_job_handle_serializes_transparently() {
        let h = JobHandle::new("abc");
        assert_eq!(serde_json::to_string(&h).unwrap(), "\"abc\"");
        assert_eq!(h.to_string(), "abc");
    }
}
