use crate::config::ValidationPolicy;
use std::path::Path;

/// Extensions accepted for staging, lower-case
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["png", "jpg"];

pub const UNSUPPORTED_FORMAT_MESSAGE: &str =
    "Unsupported file format. Only PNG and JPG are allowed.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Extracts the trailing extension of an uploaded file name and checks it
/// against the allow list. Returns the lower-cased extension.
pub fn validate_extension(filename: &str) -> Result<String, ValidationError> {
    let unsupported = || ValidationError {
        code: "UNSUPPORTED_FORMAT",
        message: UNSUPPORTED_FORMAT_MESSAGE.to_string(),
    };

    let (_, ext) = filename.rsplit_once('.').ok_or_else(unsupported)?;
    let ext = ext.to_lowercase();

    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(unsupported())
    }
}

/// Applies the content policy to the uploaded bytes
pub fn validate_content(
    data: &[u8],
    extension: &str,
    policy: ValidationPolicy,
) -> Result<(), ValidationError> {
    if data.is_empty() {
        return Err(ValidationError {
            code: "EMPTY_FILE",
            message: "File appears to be empty".to_string(),
        });
    }

    match policy {
        ValidationPolicy::TrustExtension => Ok(()),
        ValidationPolicy::VerifyMagicBytes => verify_magic_bytes(data, extension),
    }
}

/// Checks magic bytes to verify actual file type matches the claimed extension
pub fn verify_magic_bytes(header: &[u8], extension: &str) -> Result<(), ValidationError> {
    let expected = match extension {
        "png" => "image/png",
        "jpg" => "image/jpeg",
        _ => {
            return Err(ValidationError {
                code: "UNSUPPORTED_FORMAT",
                message: UNSUPPORTED_FORMAT_MESSAGE.to_string(),
            });
        }
    };

    match infer::get(header) {
        Some(kind) if kind.mime_type() == expected => Ok(()),
        detected => {
            let detected = detected.map(|k| k.mime_type()).unwrap_or("unknown");
            tracing::warn!(
                "Content mismatch: claimed .{} but detected {}",
                extension,
                detected
            );
            Err(ValidationError {
                code: "CONTENT_MISMATCH",
                message: format!(
                    "File content ({}) does not match its .{} extension",
                    detected, extension
                ),
            })
        }
    }
}

/// Validates a staged file name requested for retrieval.
///
/// Only a single plain path component is accepted.
pub fn validate_staged_name(name: &str) -> Result<(), ValidationError> {
    let invalid = |reason: &str| ValidationError {
        code: "INVALID_FILENAME",
        message: format!("Invalid file name: {}", reason),
    };

    if name.is_empty() {
        return Err(invalid("name cannot be empty"));
    }
    if name.contains("..") || name.contains('/') || name.contains('\\') {
        tracing::warn!("Path traversal attempt detected: {}", name);
        return Err(invalid("path separators are not allowed"));
    }
    if name.contains('\0') || name.chars().any(char::is_control) {
        return Err(invalid("control characters are not allowed"));
    }
    if name.starts_with('.') {
        return Err(invalid("hidden files are not allowed"));
    }
    if Path::new(name).is_absolute() {
        return Err(invalid("absolute paths are not allowed"));
    }

    Ok(())
}
