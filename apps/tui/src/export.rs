use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::{Session, Visualization};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("image payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("image payload is not a PNG")]
    NotPng,

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Size facts read from a PNG header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
}

pub fn decode_png(visualization: &Visualization) -> Result<Vec<u8>, ExportError> {
    let cleaned: String = visualization
        .data
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let bytes = STANDARD.decode(cleaned)?;
    if bytes.starts_with(&PNG_SIGNATURE) {
        Ok(bytes)
    } else {
        Err(ExportError::NotPng)
    }
}

pub fn inspect(visualization: &Visualization) -> Result<ImageInfo, ExportError> {
    let bytes = decode_png(visualization)?;
    // IHDR is always the first chunk: width and height follow its 8-byte header.
    let width = read_u32(&bytes, 16).ok_or(ExportError::NotPng)?;
    let height = read_u32(&bytes, 20).ok_or(ExportError::NotPng)?;
    Ok(ImageInfo {
        width,
        height,
        bytes: bytes.len(),
    })
}

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let slice = bytes.get(offset..offset + 4)?;
    let array: [u8; 4] = slice.try_into().ok()?;
    Some(u32::from_be_bytes(array))
}

pub fn file_name(round: &str, session: &Session, visualization: &Visualization) -> String {
    format!(
        "round-{}-{}-{}.png",
        slugify(round),
        slugify(session.as_str()),
        visualization.kind.as_str()
    )
}

fn slugify(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

/// Decodes the visualization and writes it under `dir`, returning the file path.
pub fn export_png(
    dir: &Path,
    round: &str,
    session: &Session,
    visualization: &Visualization,
) -> Result<PathBuf, ExportError> {
    let bytes = decode_png(visualization)?;

    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(file_name(round, session, visualization));
    fs::write(&path, bytes).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::info!(path = %path.display(), "exported visualization");
    Ok(path)
}
