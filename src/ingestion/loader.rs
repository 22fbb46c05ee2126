//! Reading the user-selected import file into memory.

use std::path::Path;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::ImportResult;

/// Read the whole file at `path` as UTF-8 text.
///
/// Any I/O failure (including invalid UTF-8) becomes [`crate::ImportError::Read`].
pub async fn load_text(path: impl AsRef<Path>) -> ImportResult<String> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path).await?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "loaded import file");
    Ok(text)
}

/// Read an async source to the end as UTF-8 text.
pub async fn load_text_from_reader<R>(mut reader: R) -> ImportResult<String>
where
    R: AsyncRead + Unpin,
{
    let mut text = String::new();
    reader.read_to_string(&mut text).await?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::{load_text, load_text_from_reader};
    use crate::error::ImportError;

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let err = load_text("definitely/not/here.csv").await.unwrap_err();
        assert!(matches!(err, ImportError::Read(_)));
    }

    #[tokio::test]
    async fn invalid_utf8_is_a_read_error() {
        let bytes: &[u8] = &[0x55, 0x49, 0x44, 0xff, 0xfe];
        let err = load_text_from_reader(bytes).await.unwrap_err();
        assert!(matches!(err, ImportError::Read(_)));
    }
}
