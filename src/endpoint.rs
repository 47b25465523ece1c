//! Mapping from job kinds to API paths.

use std::fmt;
use std::str::FromStr;

use crate::error::LiblibError;

pub const TEXT2IMG_PATH: &str = "/api/generate/webui/text2img";
pub const IMG2IMG_PATH: &str = "/api/generate/webui/img2img";
pub const TEXT2IMG_ULTRA_PATH: &str = "/api/generate/webui/text2img/ultra";
pub const IMG2IMG_ULTRA_PATH: &str = "/api/generate/webui/img2img/ultra";
pub const COMFY_APP_PATH: &str = "/api/generate/comfyui/app";
pub const WEBUI_STATUS_PATH: &str = "/api/generate/webui/status";
pub const COMFY_STATUS_PATH: &str = "/api/generate/comfyui/status";
pub const UPLOAD_SIGNATURE_PATH: &str = "/api/generate/upload/signature";

/// The kind of generation job to submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JobKind {
    /// Text to image (`text2img`).
    #[default]
    StandardText,
    /// Image to image (`img2img`).
    StandardImage,
    /// Text to image on the "ultra" pipeline.
    UltraText,
    /// Image to image on the "ultra" pipeline.
    UltraImage,
    /// ComfyUI workflow execution (`run_comfy`).
    Workflow,
}

/// Which status endpoint reports on a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobFamily {
    /// WebUI-style generation jobs.
    Standard,
    /// ComfyUI workflow jobs.
    Workflow,
}

impl JobKind {
    pub const ALL: [JobKind; 5] = [
        JobKind::StandardText,
        JobKind::StandardImage,
        JobKind::UltraText,
        JobKind::UltraImage,
        JobKind::Workflow,
    ];

    /// Path jobs of this kind are submitted to.
    pub fn submit_path(self) -> &'static str {
        match self {
            JobKind::StandardText => TEXT2IMG_PATH,
            JobKind::StandardImage => IMG2IMG_PATH,
            JobKind::UltraText => TEXT2IMG_ULTRA_PATH,
            JobKind::UltraImage => IMG2IMG_ULTRA_PATH,
            JobKind::Workflow => COMFY_APP_PATH,
        }
    }

    pub fn family(self) -> JobFamily {
        match self {
            JobKind::StandardText
            | JobKind::StandardImage
            | JobKind::UltraText
            | JobKind::UltraImage => JobFamily::Standard,
            JobKind::Workflow => JobFamily::Workflow,
        }
    }

    /// The task token used by the HTTP API documentation.
    pub fn task_name(self) -> &'static str {
        match self {
            JobKind::StandardText => "text2img",
            JobKind::StandardImage => "img2img",
            JobKind::UltraText => "text2img_ultra",
            JobKind::UltraImage => "img2img_ultra",
            JobKind::Workflow => "run_comfy",
        }
    }

    /// Resolve a task token leniently: unknown tokens fall back to
    /// [`JobKind::StandardText`] with a warning.
    pub fn from_task(task: &str) -> JobKind {
        task.parse().unwrap_or_else(|_| {
            tracing::warn!(task, "unknown task, falling back to text2img");
            JobKind::default()
        })
    }
}

impl JobFamily {
    /// Path the status of jobs in this family is polled from.
    pub fn status_path(self) -> &'static str {
        match self {
            JobFamily::Standard => WEBUI_STATUS_PATH,
            JobFamily::Workflow => COMFY_STATUS_PATH,
        }
    }
}

impl FromStr for JobKind {
    type Err = LiblibError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobKind::ALL
            .into_iter()
            .find(|k| k.task_name() == s)
            .ok_or_else(|| LiblibError::InvalidInput(format!("unknown task: {}", s)))
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.task_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_paths() {
        assert_eq!(JobKind::StandardText.submit_path(), "/api/generate/webui/text2img");
        assert_eq!(JobKind::StandardImage.submit_path(), "/api/generate/webui/img2img");
        assert_eq!(JobKind::UltraText.submit_path(), "/api/generate/webui/text2img/ultra");
        assert_eq!(JobKind::UltraImage.submit_path(), "/api/generate/webui/img2img/ultra");
        assert_eq!(JobKind::Workflow.submit_path(), "/api/generate/comfyui/app");
    }

    #[test]
    fn test_families() {
        for kind in JobKind::ALL {
            let expected = if kind == JobKind::Workflow {
                JobFamily::Workflow
            } else {
                JobFamily::Standard
            };
            assert_eq!(kind.family(), expected, "{}", kind);
        }
        assert_eq!(JobFamily::Standard.status_path(), "/api/generate/webui/status");
        assert_eq!(JobFamily::Workflow.status_path(), "/api/generate/comfyui/status");
    }

    #[test]
    fn test_task_tokens_round_trip() {
        for kind in JobKind::ALL {
            assert_eq!(kind.task_name().parse::<JobKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_strict_parse_rejects_unknown() {
        assert!(matches!(
            "upscale".parse::<JobKind>(),
            Err(LiblibError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_lenient_parse_falls_back() {
        assert_eq!(JobKind::from_task("img2img_ultra"), JobKind::UltraImage);
        assert_eq!(JobKind::from_task("upscale"), JobKind::StandardText);
        assert_eq!(JobKind::from_task(""), JobKind::StandardText);
    }
}
