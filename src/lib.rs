//! # liblibai-rs
//!
//! Async Rust client for the [LiblibAI](https://www.liblib.art) open API:
//! hosted Stable Diffusion WebUI and ComfyUI generation.
//!
//! Handles the HMAC-SHA1 request signing every call needs, job submission
//! for text-to-image, image-to-image, their "ultra" variants and ComfyUI
//! workflows, and polling a job until it finishes. Also provides request
//! builders and file upload for image-to-image inputs.
//!
//! ## Quick Start
//!
//! ```no_run
//! use liblibai_rs::{ClientConfig, GenerateRequest, JobKind, JobStatus, LiblibClient, PollOptions};
//! use std::time::Duration;
//!
//! # async fn example() -> liblibai_rs::Result<()> {
//! let client = LiblibClient::new(ClientConfig::from_env()?);
//!
//! let body = GenerateRequest::text2img("a sunset over mountains")
//!     .negative("lowres, blurry")
//!     .steps(25)
//!     .build();
//!
//! // Submit, then wait at most five minutes
//! let handle = client.submit(JobKind::StandardText, &body).await?;
//! let options = PollOptions::new().with_deadline(Duration::from_secs(300));
//! let prediction = client
//!     .wait_for_completion_with(&handle, JobKind::StandardText.family(), &options)
//!     .await?;
//!
//! match prediction.generate_status {
//!     JobStatus::Success => {
//!         for img in &prediction.images {
//!             println!("{} (seed {})", img.image_url, img.seed);
//!         }
//!     }
//!     status => eprintln!("job ended {}: {}", status, prediction.generate_msg),
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod poller;
pub mod request;
pub mod signer;
pub mod transport;
pub mod types;
pub mod upload;

pub use client::LiblibClient;
pub use config::ClientConfig;
pub use endpoint::{JobFamily, JobKind};
pub use error::{LiblibError, Result};
pub use poller::{JobPoller, PollOptions};
pub use request::{ComfyRequest, GenerateRequest};
pub use signer::{Credential, SignedRequest, Signer};
pub use tokio_util::sync::CancellationToken;
pub use transport::{HttpTransport, MultipartForm, Transport, TransportResponse};
pub use types::{
    Envelope, JobHandle, JobStatus, Prediction, PredictionImage, PredictionVideo, SubmitResult,
    UploadSignature,
};
