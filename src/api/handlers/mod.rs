//! Axum route handlers.
//!
//! - [`pages`]: embedded static pages and assets
//! - [`users`]: registration form flow and the admin user listing
//! - [`complaints`]: report submission flow and the admin complaint listing
//! - [`detection`]: the image category detection endpoint

use axum::extract::multipart::Field;
use axum::response::Redirect;

use crate::errors::{Error, Result};

pub mod complaints;
pub mod detection;
pub mod pages;
pub mod users;

/// 303 redirect with a `msg` query parameter the pages render as a banner.
pub(crate) fn redirect_with_msg(path: &str, msg: &str) -> Redirect {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("msg", msg)
        .finish();
    Redirect::to(&format!("{path}?{query}"))
}

/// Drain a multipart file field into memory, enforcing the size cap.
pub(crate) async fn read_file_field(mut field: Field<'_>, max_size: u64) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();

    while let Some(chunk) = field.chunk().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to read file chunk: {e}"),
    })? {
        if bytes.len() as u64 + chunk.len() as u64 > max_size {
            return Err(Error::PayloadTooLarge {
                message: format!("Image exceeds maximum allowed size of {} bytes", max_size),
            });
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
