//! Generate a single image from a text prompt.
//!
//! Requires `LIBLIBAI_API_KEY` and `LIBLIBAI_API_SECRET` in the environment.
//!
//! ```sh
//! RUST_LOG=liblibai_rs=debug cargo run --example simple_generation
//! ```

use liblibai_rs::{ClientConfig, GenerateRequest, JobStatus, LiblibClient};
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

    let client = LiblibClient::new(ClientConfig::from_env()?);

    let body = GenerateRequest::text2img(
        "Asian portrait, a young woman wearing a green baseball cap, covering one eye with her hand",
    )
    .negative("ng_deepnegative_v1_75t, (badhandv4:1.2), EasyNegative, (worst quality:2), nsfw")
    .size(768, 1024)
    .steps(20)
    .cfg_scale(7.0)
    .build();

    let prediction = client.text2img(&body).await?;

    match prediction.generate_status {
        JobStatus::Success => {
            println!(
                "Generated {} image(s), cost {} points, balance {}",
                prediction.images.len(),
                prediction.points_cost,
                prediction.account_balance
            );
            for img in &prediction.images {
                println!("  {} (seed {})", img.image_url, img.seed);
            }
        }
        status => eprintln!("Generation ended {}: {}", status, prediction.generate_msg),
    }

    Ok(())
}
