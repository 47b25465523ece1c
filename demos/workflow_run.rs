//! Submit a ComfyUI workflow, print progress, and give up after ten minutes
//! or on Ctrl-C.
//!
//! ```sh
//! cargo run --example workflow_run -- <templateUuid> <workflowUuid>
//! ```

use liblibai_rs::{
    CancellationToken, ClientConfig, ComfyRequest, JobKind, LiblibClient, LiblibError, PollOptions,
};
use serde_json::json;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "liblibai_rs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(template), Some(workflow)) = (args.next(), args.next()) else {
        eprintln!("usage: workflow_run <templateUuid> <workflowUuid>");
        return Ok(());
    };

    let client = LiblibClient::new(ClientConfig::from_env()?);
    let body = ComfyRequest::new(template)
        .workflow_uuid(workflow)
        .node("12", "LoadImage", json!({ "image": "https://liblibai-online.liblib.cloud/img/sample.png" }))
        .build();

    let handle = client.submit(JobKind::Workflow, &body).await?;
    println!("Submitted workflow job {}", handle);

    let token = CancellationToken::new();
    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let options = PollOptions::new()
        .with_cancellation(token)
        .with_deadline(Duration::from_secs(600));

    let result = client
        .wait_for_completion_observed(&handle, JobKind::Workflow.family(), &options, |p| {
            println!("  {} {:.0}%", p.generate_status, p.percent_completed * 100.0)
        })
        .await;

    match result {
        Ok(prediction) => {
            println!("Finished {}", prediction.generate_status);
            for video in &prediction.videos {
                println!("  video {} (node {})", video.video_url, video.node_id);
            }
            for img in &prediction.images {
                println!("  image {}", img.image_url);
            }
        }
        Err(LiblibError::Cancelled) => eprintln!("Stopped waiting; job {} keeps running", handle),
        Err(LiblibError::DeadlineExceeded) => eprintln!("Gave up after ten minutes"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
