use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::endpoint::{JobFamily, JobKind, UPLOAD_SIGNATURE_PATH};
use crate::error::{LiblibError, Result};
use crate::poller::{JobPoller, PollOptions};
use crate::signer::Signer;
use crate::transport::{HttpTransport, Transport};
use crate::types::*;
use crate::upload;

/// Async client for the LiblibAI open API.
///
/// Every request is signed with the configured credential. Jobs are submitted
/// with [`submit`](Self::submit) and awaited with
/// [`wait_for_completion`](Self::wait_for_completion), or both at once with
/// [`run`](Self::run).
///
/// # Example
/// ```no_run
/// use liblibai_rs::{ClientConfig, GenerateRequest, LiblibClient};
///
/// # async fn example() -> liblibai_rs::Result<()> {
/// let client = LiblibClient::new(ClientConfig::new("access-key", "secret-key")?);
/// let prediction = client
///     .text2img(&GenerateRequest::text2img("a lighthouse at dusk").build())
///     .await?;
/// println!("{} -> {} image(s)", prediction.generate_status, prediction.images.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LiblibClient {
    config: ClientConfig,
    signer: Signer,
    poller: JobPoller,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for LiblibClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiblibClient")
            .field("config", &self.config)
            .field("poller", &self.poller)
            .finish_non_exhaustive()
    }
}

impl LiblibClient {
    /// Create a client from a validated config.
    pub fn new(config: ClientConfig) -> Self {
        let transport = HttpTransport::new(Client::new(), config.request_timeout(), config.user_agent());
        Self {
            signer: Signer::new(config.credential().clone()),
            poller: JobPoller::new(config.poll_interval()),
            transport: Arc::new(transport),
            config,
        }
    }

    /// Shorthand for `LiblibClient::new(ClientConfig::new(key, secret)?)`.
    pub fn from_keys(access_key: impl Into<String>, secret_key: impl Into<String>) -> Result<Self> {
        Ok(Self::new(ClientConfig::new(access_key, secret_key)?))
    }

    /// Use a custom `reqwest::Client` (for connection pooling, proxies, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.transport = Arc::new(HttpTransport::new(
            client,
            self.config.request_timeout(),
            self.config.user_agent(),
        ));
        self
    }

    /// Route API calls and storage uploads through another [`Transport`].
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    // ── Raw requests ────────────────────────────────────────────────

    /// Sign `path`, POST `body` to it and decode the response envelope.
    pub async fn request<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<Envelope<T>> {
        let signed = self.signer.sign(path)?;
        let url = format!("{}{}", self.config.base_url(), signed.signed_path());
        tracing::debug!(path, "sending signed request");

        let resp = self
            .transport
            .send(Method::POST, &url, Some(body))
            .await?
            .error_for_status()?;

        Ok(serde_json::from_slice(&resp.body)?)
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Submit a job. Returns its handle without waiting.
    ///
    /// A response with no `data` means the service rejected the job and
    /// yields [`LiblibError::Submission`].
    pub async fn submit(&self, kind: JobKind, body: &Value) -> Result<JobHandle> {
        let env: Envelope<SubmitResult> = self.request(kind.submit_path(), body).await?;
        match env.data {
            Some(result) => {
                tracing::info!(job = %result.generate_uuid, %kind, "job submitted");
                Ok(result.generate_uuid)
            }
            None => Err(LiblibError::Submission {
                code: env.code,
                msg: env.msg,
            }),
        }
    }

    /// Submit by task token (`text2img`, `img2img`, `text2img_ultra`,
    /// `img2img_ultra`, `run_comfy`). Unknown tokens submit as `text2img`.
    pub async fn submit_task(&self, task: &str, body: &Value) -> Result<JobHandle> {
        self.submit(JobKind::from_task(task), body).await
    }

    pub async fn submit_text2img(&self, body: &Value) -> Result<JobHandle> {
        self.submit(JobKind::StandardText, body).await
    }

    pub async fn submit_img2img(&self, body: &Value) -> Result<JobHandle> {
        self.submit(JobKind::StandardImage, body).await
    }

    pub async fn submit_text2img_ultra(&self, body: &Value) -> Result<JobHandle> {
        self.submit(JobKind::UltraText, body).await
    }

    pub async fn submit_img2img_ultra(&self, body: &Value) -> Result<JobHandle> {
        self.submit(JobKind::UltraImage, body).await
    }

    pub async fn submit_comfy(&self, body: &Value) -> Result<JobHandle> {
        self.submit(JobKind::Workflow, body).await
    }

    // ── Status ──────────────────────────────────────────────────────

    /// Fetch the current status of a job once.
    pub async fn status(&self, family: JobFamily, handle: &JobHandle) -> Result<Prediction> {
        let body = json!({ "generateUuid": handle });
        let env: Envelope<Prediction> = self.request(family.status_path(), &body).await?;
        env.data.ok_or_else(|| {
            LiblibError::InvalidResponse(format!(
                "Status response for {} has no data (code {}): {}",
                handle, env.code, env.msg
            ))
        })
    }

    // ── Completion waiting ──────────────────────────────────────────

    /// Poll until the job reaches `SUCCESS`, `FAILED` or `TIMEOUT`.
    ///
    /// Failed and timed-out jobs are returned, not raised; check
    /// [`Prediction::generate_status`] and `generate_msg`.
    pub async fn wait_for_completion(&self, handle: &JobHandle, family: JobFamily) -> Result<Prediction> {
        self.wait_for_completion_with(handle, family, &PollOptions::default())
            .await
    }

    /// Poll with a cancellation token and/or deadline.
    pub async fn wait_for_completion_with(
        &self,
        handle: &JobHandle,
        family: JobFamily,
        options: &PollOptions,
    ) -> Result<Prediction> {
        self.poller
            .await_completion(
                handle,
                |h| async move { self.status(family, &h).await },
                options,
            )
            .await
    }

    /// Poll, calling `on_update` with every status payload (for progress bars).
    pub async fn wait_for_completion_observed<P>(
        &self,
        handle: &JobHandle,
        family: JobFamily,
        options: &PollOptions,
        on_update: P,
    ) -> Result<Prediction>
    where
        P: FnMut(&Prediction),
    {
        self.poller
            .await_completion_observed(
                handle,
                |h| async move { self.status(family, &h).await },
                options,
                on_update,
            )
            .await
    }

    // ── Submit and wait ─────────────────────────────────────────────

    /// Submit a job and wait for its terminal status.
    pub async fn run(&self, kind: JobKind, body: &Value) -> Result<Prediction> {
        self.run_with(kind, body, &PollOptions::default()).await
    }

    /// [`run`](Self::run) with bounded polling.
    pub async fn run_with(&self, kind: JobKind, body: &Value, options: &PollOptions) -> Result<Prediction> {
        let handle = self.submit(kind, body).await?;
        self.wait_for_completion_with(&handle, kind.family(), options)
            .await
    }

    /// Run by task token; see [`submit_task`](Self::submit_task).
    pub async fn run_task(&self, task: &str, body: &Value) -> Result<Prediction> {
        self.run(JobKind::from_task(task), body).await
    }

    pub async fn text2img(&self, body: &Value) -> Result<Prediction> {
        self.run(JobKind::StandardText, body).await
    }

    pub async fn img2img(&self, body: &Value) -> Result<Prediction> {
        self.run(JobKind::StandardImage, body).await
    }

    pub async fn text2img_ultra(&self, body: &Value) -> Result<Prediction> {
        self.run(JobKind::UltraText, body).await
    }

    pub async fn img2img_ultra(&self, body: &Value) -> Result<Prediction> {
        self.run(JobKind::UltraImage, body).await
    }

    pub async fn run_comfy(&self, body: &Value) -> Result<Prediction> {
        self.run(JobKind::Workflow, body).await
    }

    // ── Upload ──────────────────────────────────────────────────────

    /// Request a one-time upload policy for `file_name`.
    pub async fn upload_signature(&self, file_name: &str) -> Result<UploadSignature> {
        let (name, extension) = upload::split_file_name(file_name)?;
        let body = json!({ "name": name, "extension": extension });
        let env: Envelope<UploadSignature> = self.request(UPLOAD_SIGNATURE_PATH, &body).await?;
        env.data.ok_or(LiblibError::Submission {
            code: env.code,
            msg: env.msg,
        })
    }

    /// Upload a file and return its public URL, ready to be used as
    /// `sourceImage` in an image-to-image job.
    pub async fn upload_file(&self, bytes: impl Into<Vec<u8>>, file_name: &str) -> Result<String> {
        let sig = self.upload_signature(file_name).await?;
        let url = upload::post_file(self.transport.as_ref(), &sig, bytes.into(), file_name).await?;
        tracing::info!(%url, "file uploaded");
        Ok(url)
    }
}
