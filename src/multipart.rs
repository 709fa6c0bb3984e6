//! src/multipart.rs
//!
//! Multipart/form-data decoder for upload requests. Pure parsing over a raw
//! byte buffer plus the declared content type; no I/O. A part carrying a
//! `filename` parameter in its Content-Disposition is the file part and its
//! body is kept as raw bytes; every other named part is a text field.

use bytes::Bytes;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MultipartError {
    #[error("Content-Type must be multipart/form-data")]
    InvalidContentType,
    #[error("Empty body")]
    EmptyBody,
    #[error("Missing file field (expected field name='file')")]
    MissingFilePart,
    #[error("{0}")]
    Malformed(String),
}

/// Decoded form: scalar text fields plus exactly one file payload.
#[derive(Debug)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub file_bytes: Bytes,
    /// Filename declared by the client. `Some("")` when the parameter was
    /// present but empty.
    pub file_name: Option<String>,
}

enum Part {
    Field { name: String, value: String },
    File { filename: String, bytes: Bytes },
}

/// Decode a multipart/form-data payload.
///
/// The buffer is split on the `--{boundary}` delimiter; the preamble and
/// everything after the closing `--{boundary}--` marker are ignored. When
/// several parts share a name, the last one wins.
pub fn decode(content_type: &str, raw: &[u8]) -> Result<MultipartForm, MultipartError> {
    if raw.is_empty() {
        return Err(MultipartError::EmptyBody);
    }
    if !content_type
        .to_ascii_lowercase()
        .contains("multipart/form-data")
    {
        return Err(MultipartError::InvalidContentType);
    }
    let boundary = header_param(content_type, "boundary")
        .filter(|b| !b.is_empty())
        .ok_or_else(|| {
            MultipartError::Malformed("content type missing boundary parameter".into())
        })?;
    let delimiter = format!("--{boundary}").into_bytes();

    let mut fields = HashMap::new();
    let mut file: Option<(Bytes, String)> = None;

    let start = find(raw, &delimiter)
        .ok_or_else(|| MultipartError::Malformed("boundary delimiter not found in body".into()))?;
    let mut rest = &raw[start + delimiter.len()..];

    loop {
        if rest.starts_with(b"--") {
            // closing marker, anything after it is epilogue
            break;
        }
        let end = find(rest, &delimiter)
            .ok_or_else(|| MultipartError::Malformed("unterminated multipart body".into()))?;
        match parse_part(&rest[..end])? {
            Some(Part::Field { name, value }) => {
                fields.insert(name, value);
            }
            Some(Part::File { filename, bytes }) => {
                file = Some((bytes, filename));
            }
            None => {}
        }
        rest = &rest[end + delimiter.len()..];
    }

    let (file_bytes, file_name) = file.ok_or(MultipartError::MissingFilePart)?;
    Ok(MultipartForm {
        fields,
        file_bytes,
        file_name: Some(file_name),
    })
}

/// Parse one delimited segment. Returns `None` for parts without a `name`
/// parameter, which are skipped.
fn parse_part(segment: &[u8]) -> Result<Option<Part>, MultipartError> {
    let segment = segment.strip_prefix(b"\r\n").unwrap_or(segment);
    let segment = segment.strip_suffix(b"\r\n").unwrap_or(segment);

    let split = find(segment, b"\r\n\r\n")
        .ok_or_else(|| MultipartError::Malformed("part missing header terminator".into()))?;
    let headers = parse_headers(&segment[..split])?;
    let body = &segment[split + 4..];

    let disposition = header_value(&headers, "content-disposition").ok_or_else(|| {
        MultipartError::Malformed("part missing Content-Disposition header".into())
    })?;
    let Some(name) = header_param(disposition, "name") else {
        return Ok(None);
    };

    // Presence of the filename parameter marks the file part, even when the
    // declared name is empty.
    if let Some(filename) = header_param(disposition, "filename") {
        Ok(Some(Part::File {
            filename,
            bytes: Bytes::copy_from_slice(body),
        }))
    } else {
        let charset = header_value(&headers, "content-type")
            .and_then(|ct| header_param(ct, "charset"));
        Ok(Some(Part::Field {
            name,
            value: decode_text(body, charset.as_deref()),
        }))
    }
}

/// Parse a part's header block into lowercased name/value pairs.
fn parse_headers(block: &[u8]) -> Result<Vec<(String, String)>, MultipartError> {
    let text = String::from_utf8_lossy(block);
    let mut headers = Vec::new();
    for line in text.split("\r\n") {
        if line.is_empty() {
            continue;
        }
        let (name, value) = line.split_once(':').ok_or_else(|| {
            MultipartError::Malformed(format!("invalid part header line `{line}`"))
        })?;
        headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
    }
    Ok(headers)
}

fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Extract a `;`-separated parameter from a header value, e.g. the `name` in
/// `form-data; name="user"`. Surrounding quotes are stripped.
fn header_param(value: &str, param: &str) -> Option<String> {
    for segment in value.split(';').skip(1) {
        if let Some((key, val)) = segment.split_once('=') {
            if key.trim().eq_ignore_ascii_case(param) {
                return Some(val.trim().trim_matches('"').to_string());
            }
        }
    }
    None
}

/// Decode a text field body using its declared charset. UTF-8 by default,
/// ISO-8859-1 supported; invalid input is decoded lossily.
fn decode_text(body: &[u8], charset: Option<&str>) -> String {
    match charset {
        Some(cs) if cs.eq_ignore_ascii_case("iso-8859-1") || cs.eq_ignore_ascii_case("latin-1") => {
            body.iter().map(|&b| b as char).collect()
        }
        _ => String::from_utf8_lossy(body).into_owned(),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
