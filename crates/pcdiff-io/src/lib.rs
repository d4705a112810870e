//! pcdiff-io — labeled XYZ text reader.
//! Reading is async (the only suspension point); parsing itself is synchronous.

use std::path::Path;

use anyhow::{Context, Result};
use pcdiff_core::PointCloud;
use tokio::io::{AsyncRead, AsyncReadExt};

mod xyz;

pub use xyz::{parse_xyz, parse_xyz_with, parse_xyz_with_report, MalformedRow, ParseOptions, ParseReport};

/// Display name for a cloud loaded from `path`: its file name component.
pub fn cloud_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read and parse a file. The cloud is named after the file.
pub async fn read_xyz(path: impl AsRef<Path>) -> Result<PointCloud> {
    Ok(read_xyz_with_report(path, &ParseOptions::default()).await?.0)
}

pub async fn read_xyz_with_report(
    path: impl AsRef<Path>,
    opts: &ParseOptions,
) -> Result<(PointCloud, ParseReport)> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    Ok(parse_xyz_with(&text, &cloud_name(path), opts))
}

/// Read everything from an open handle, then parse.
pub async fn read_xyz_from<R: AsyncRead + Unpin>(reader: R, name: &str) -> Result<PointCloud> {
    Ok(read_xyz_from_with_report(reader, name, &ParseOptions::default()).await?.0)
}

pub async fn read_xyz_from_with_report<R: AsyncRead + Unpin>(
    mut reader: R,
    name: &str,
    opts: &ParseOptions,
) -> Result<(PointCloud, ParseReport)> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .await
        .with_context(|| format!("read {}", name))?;
    Ok(parse_xyz_with(&text, name, opts))
}
