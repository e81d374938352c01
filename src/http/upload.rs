//! Upload validation and storage.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::tabular::format::{is_supported, SUPPORTED_EXTENSIONS};

use super::errors::ApiError;

/// Normalize a client-supplied file name.
///
/// Whitespace runs become `-`, anything other than ASCII alphanumerics and
/// `.` `-` `_` is dropped, and leading separators are stripped. Returns
/// `None` when nothing usable is left.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    // Browsers on Windows may send the full client path
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);

    let mut out = String::with_capacity(base.len());
    let mut in_whitespace = false;
    for ch in base.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_') {
            out.push(ch);
        }
    }

    let trimmed = out.trim_start_matches(['.', '-', '_']);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Sanitize and check the extension of an uploaded file name.
pub fn validate_filename(raw: &str) -> Result<String, ApiError> {
    let name = sanitize_filename(raw)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid file name: '{raw}'")))?;
    if !is_supported(&name) {
        return Err(ApiError::BadRequest(format!(
            "unsupported file type, allowed extensions: {}",
            SUPPORTED_EXTENSIONS
                .iter()
                .map(|ext| format!(".{ext}"))
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }
    Ok(name)
}

/// Directory holding one session's upload.
pub fn session_dir(upload_dir: &Path, session_id: Uuid) -> PathBuf {
    upload_dir.join(session_id.to_string())
}

/// Write the upload to `<upload_dir>/<session_id>/<filename>`.
pub async fn store(
    upload_dir: &Path,
    session_id: Uuid,
    filename: &str,
    bytes: &[u8],
) -> Result<PathBuf, ApiError> {
    let dir = session_dir(upload_dir, session_id);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to create upload directory: {e}")))?;

    let path = dir.join(filename);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to store upload: {e}")))?;

    tracing::info!(
        session_id = %session_id,
        path = %path.display(),
        bytes = bytes.len(),
        "upload stored"
    );
    Ok(path)
}

/// Remove a session's upload directory. Missing directories are fine.
pub async fn discard(upload_dir: &Path, session_id: Uuid) {
    let dir = session_dir(upload_dir, session_id);
    match tokio::fs::remove_dir_all(&dir).await {
        Ok(()) => tracing::debug!(session_id = %session_id, "upload directory removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            session_id = %session_id,
            error = %e,
            "failed to remove upload directory"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(
            sanitize_filename("Produção  Janeiro 2024.xlsx").as_deref(),
            Some("Produo-Janeiro-2024.xlsx")
        );
        assert_eq!(sanitize_filename("..hidden.csv").as_deref(), Some("hidden.csv"));
        assert_eq!(sanitize_filename("_-report.xlsm").as_deref(), Some("report.xlsm"));
        assert_eq!(
            sanitize_filename("C:\\Users\\ana\\dados.csv").as_deref(),
            Some("dados.csv")
        );
        assert_eq!(sanitize_filename("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize_filename("***"), None);
        assert_eq!(sanitize_filename(""), None);
    }

    #[test]
    fn test_validate_filename_extension() {
        assert_eq!(validate_filename("dados.CSV").unwrap(), "dados.CSV");
        assert!(validate_filename("planilha.xlsb").is_ok());

        let err = validate_filename("notes.txt").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert!(err.detail().contains(".xlsx"));
        assert!(validate_filename("%%%").is_err());
    }

    #[tokio::test]
    async fn test_store_and_discard() {
        let dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();

        let path = store(dir.path(), id, "dados.csv", b"a,b\n").await.unwrap();
        assert_eq!(path, dir.path().join(id.to_string()).join("dados.csv"));
        assert_eq!(std::fs::read(&path).unwrap(), b"a,b\n");

        discard(dir.path(), id).await;
        assert!(!session_dir(dir.path(), id).exists());
        // Second discard is a no-op
        discard(dir.path(), id).await;
    }
}
