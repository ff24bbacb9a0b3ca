//! Text-to-image call used to illustrate the top dish.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

use crate::config::ImageConfig;
use crate::error::ImageError;
use crate::models::GeneratedImage;

#[derive(Serialize)]
struct ImageRequest<'a> {
    inputs: &'a str,
}

/// Generate an image for `prompt`. The payload is checked before it is
/// returned: empty or non-image bodies are errors, never passed on.
pub async fn generate_image(
    client: &reqwest::Client,
    config: &ImageConfig,
    prompt: &str,
) -> Result<GeneratedImage, ImageError> {
    let mut req = client.post(&config.api_url).json(&ImageRequest { inputs: prompt });
    if let Some(token) = &config.token {
        req = req.header("Authorization", token);
    }

    let resp = req
        .send()
        .await
        .map_err(|e| ImageError::Request(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(ImageError::Status { status, body });
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| ImageError::Request(e.to_string()))?;

    encode_image(&bytes)
}

/// Validate raw bytes and wrap them as a base64 image.
pub fn encode_image(bytes: &[u8]) -> Result<GeneratedImage, ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::EmptyPayload);
    }
    let mime_type = sniff_mime(bytes).ok_or(ImageError::UnknownFormat)?;
    Ok(GeneratedImage {
        mime_type,
        data_base64: STANDARD.encode(bytes),
    })
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}
