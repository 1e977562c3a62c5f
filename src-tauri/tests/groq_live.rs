//! Live round trip against the real Groq API.
//!
//! Skipped unless GROQ_API_KEY is set (in the environment or .env.local).

use image::{Rgba, RgbaImage};
use snaplens_lib::capture::CapturedImage;
use snaplens_lib::config::Config;
use snaplens_lib::llm::{prompt_for, GroqClient, InferenceClient, InferenceRequest};
use std::sync::Arc;

#[tokio::test]
async fn test_live_stream_describes_a_solid_image() {
    let config = Config::load().expect("config");
    if config.inference.api_key.is_none() || std::env::var("GROQ_API_KEY").is_err() {
        eprintln!("SKIP: No GROQ_API_KEY");
        return;
    }

    let image = CapturedImage::encode(RgbaImage::from_pixel(64, 64, Rgba([220, 30, 30, 255]))).unwrap();
    let request = InferenceRequest::new(Arc::new(image), prompt_for("What colour fills this image? One word."));
    let client = GroqClient::new(config.inference).unwrap();

    eprintln!("[TEST] Streaming from {} ...", client.config().model);
    let start = std::time::Instant::now();
    let mut text = String::new();
    let mut fragments = 0;
    client
        .stream(&request, &mut |t: String| {
            fragments += 1;
            text.push_str(&t);
        })
        .await
        .expect("stream failed");

    eprintln!("[TEST] {} fragments in {}ms: {}", fragments, start.elapsed().as_millis(), text);
    assert!(fragments > 0);
    assert!(!text.trim().is_empty());
}
