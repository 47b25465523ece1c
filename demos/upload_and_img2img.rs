//! Upload a local image and use it as the source of an image-to-image job.
//!
//! ```sh
//! cargo run --example upload_and_img2img -- ./input.png
//! ```

use liblibai_rs::{ClientConfig, GenerateRequest, LiblibClient};
use std::path::Path;
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

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: upload_and_img2img <image file>");
        return Ok(());
    };
    let path = Path::new(&path);
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or("image path has no file name")?;

    let client = LiblibClient::new(ClientConfig::from_env()?);

    let bytes = std::fs::read(path)?;
    let url = client.upload_file(bytes, file_name).await?;
    println!("Uploaded: {}", url);

    let body = GenerateRequest::img2img("a beautiful sunset", &url)
        .resize(0, 1024, 1024)
        .build();
    let prediction = client.img2img(&body).await?;

    println!("Job ended {}", prediction.generate_status);
    for img in &prediction.images {
        println!("  {}", img.image_url);
    }

    Ok(())
}
