//! Framing of the single-file multipart upload body.

/// Boundary between parts.
pub(crate) const BOUNDARY: &str = "*****";

/// Form field the server reads the file from.
const FIELD_NAME: &str = "uploadedfile";

const HYPHENS: &str = "--";
const LINE_END: &str = "\r\n";

/// Value of the `Content-Type` header.
pub(crate) fn content_type() -> String {
    format!("multipart/form-data;boundary={BOUNDARY}")
}

/// Everything sent before the file bytes.
pub(crate) fn head(file_name: &str) -> String {
    format!(
        "{HYPHENS}{BOUNDARY}{LINE_END}\
         Content-Disposition: form-data; name=\"{FIELD_NAME}\";filename=\"{file_name}\"{LINE_END}\
         {LINE_END}"
    )
}

/// Everything sent after the file bytes.
pub(crate) fn tail() -> String {
    format!("{LINE_END}{HYPHENS}{BOUNDARY}{HYPHENS}{LINE_END}")
}

/// Length of the whole body for a file of `file_len` bytes.
pub(crate) fn content_length(file_name: &str, file_len: u64) -> u64 {
    let framing = head(file_name).len() + tail().len();
    u64::try_from(framing).unwrap_or(u64::MAX).saturating_add(file_len)
}
