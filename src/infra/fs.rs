//! # Report File Output / 报告文件输出
//!
//! Writes rendered reports to disk, creating parent directories on the
//! way and decorating failures with the offending path.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Writes a rendered report to `path`, creating missing parent
/// directories first.
///
/// 将渲染好的报告写入 `path`，必要时先创建缺失的父目录。
pub fn write_report(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create report directory: {}", parent.display()))?;
        }
    }
    fs::write(path, content)
        .with_context(|| format!("Failed to write report file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_through_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/report.txt");
        write_report(&path, b"hello").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"hello");
    }
}
