//! Embedded image payloads.
//!
//! Interchange images are standard base64, optionally wrapped in a
//! `data:<type>/<subtype>;base64,` URI. Decoding failures are fatal to the
//! import, unlike unparsable dates.

use crate::{error::ImageDecodeError, types::Blob};
use base64::{Engine, engine::general_purpose::STANDARD};

const DATA_URI_SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// Decode an interchange image payload into raw bytes.
pub fn decode_image(payload: &str) -> Result<Blob, ImageDecodeError> {
    let body = strip_data_uri(payload)?;
    let bytes = STANDARD.decode(body)?;

    Ok(Blob::from(bytes))
}

// Returns the base64 body, with any data-URI header removed.
fn strip_data_uri(payload: &str) -> Result<&str, ImageDecodeError> {
    let Some(rest) = payload.strip_prefix(DATA_URI_SCHEME) else {
        return Ok(payload);
    };

    let Some((media_type, body)) = rest.split_once(BASE64_MARKER) else {
        return Err(ImageDecodeError::MalformedDataUri(
            "missing ';base64,' marker".to_string(),
        ));
    };

    match media_type.split_once('/') {
        Some((kind, subtype)) if !kind.is_empty() && !subtype.is_empty() => Ok(body),
        _ => Err(ImageDecodeError::MalformedDataUri(format!(
            "invalid media type '{media_type}'"
        ))),
    }
}

///
/// TESTS
///
