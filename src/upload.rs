//! File upload.
//!
//! Uploading is a two-step flow: ask LiblibAI for a one-time signed policy,
//! then post the file straight to object storage as a multipart form. The
//! file's public URL is `postUrl/key`.

use crate::error::{LiblibError, Result};
use crate::transport::{MultipartForm, Transport};
use crate::types::UploadSignature;

/// Split `photo.final.png` into `("photo.final", "png")`.
pub fn split_file_name(file_name: &str) -> Result<(&str, &str)> {
    let base = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name);
    match base.rsplit_once('.') {
        Some((name, ext)) if !name.is_empty() && !ext.is_empty() => Ok((name, ext)),
        _ => Err(LiblibError::InvalidInput(format!(
            "file name needs a name and an extension: {:?}",
            file_name
        ))),
    }
}

/// Public URL the file is reachable at once the form post succeeds.
pub fn public_url(sig: &UploadSignature) -> String {
    format!("{}/{}", sig.post_url.trim_end_matches('/'), sig.key)
}

/// Signed policy fields, in the order object storage expects them.
pub fn form_fields(sig: &UploadSignature) -> Vec<(&'static str, String)> {
    vec![
        ("key", sig.key.clone()),
        ("policy", sig.policy.clone()),
        ("x-oss-date", sig.x_oss_date.clone()),
        ("x-oss-expires", sig.x_oss_expires.clone()),
        ("x-oss-signature-version", sig.x_oss_signature_version.clone()),
        ("x-oss-credential", sig.x_oss_credential.clone()),
        ("x-oss-signature", sig.x_oss_signature.clone()),
    ]
}

/// Storage form for `bytes`: the signed policy fields, then the file part.
pub fn storage_form(sig: &UploadSignature, bytes: Vec<u8>, file_name: &str) -> MultipartForm {
    MultipartForm {
        fields: form_fields(sig)
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
        file_field: "file".to_string(),
        file_name: file_name.to_string(),
        file: bytes,
    }
}

/// Post `bytes` to the signed storage location and return the public URL.
pub(crate) async fn post_file(
    transport: &dyn Transport,
    sig: &UploadSignature,
    bytes: Vec<u8>,
    file_name: &str,
) -> Result<String> {
    transport
        .send_multipart(&sig.post_url, storage_form(sig, bytes, file_name))
        .await?
        .error_for_status()?;
    Ok(public_url(sig))
}
