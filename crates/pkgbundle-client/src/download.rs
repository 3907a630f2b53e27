/*
[INPUT]:  Completed task id, optional server archive path, download directory
[OUTPUT]: Archive file written to disk
[POS]:    Side effect - saving a finished bundle locally
[UPDATE]: When archive naming or storage location rules change
*/

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use pkgbundle_adapter::TaskService;

/// Local file name for a task's archive.
///
/// Uses the last segment of `archive_path` when it has one, else
/// `packages-{task_id}.tar.gz`.
pub fn archive_file_name(task_id: &str, archive_path: Option<&str>) -> String {
    let from_path = archive_path
        .and_then(|path| path.rsplit(['/', '\\']).next())
        .map(sanitize_file_component)
        .filter(|name| !name.is_empty() && name != "." && name != "..");

    from_path.unwrap_or_else(|| {
        format!("packages-{}.tar.gz", sanitize_file_component(task_id))
    })
}

fn sanitize_file_component(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            other => other,
        })
        .collect()
}

/// First free path for `file_name` in `dir`; `name.tar.gz` becomes `name-1.tar.gz`
fn unique_destination(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, ext) = match file_name.find('.') {
        Some(idx) if idx > 0 => file_name.split_at(idx),
        _ => (file_name, ""),
    };
    (1u32..)
        .map(|n| dir.join(format!("{stem}-{n}{ext}")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Saves task archives under one directory
#[derive(Clone)]
pub struct ArchiveDownloader {
    service: Arc<dyn TaskService>,
    download_dir: PathBuf,
}

impl ArchiveDownloader {
    pub fn new(service: Arc<dyn TaskService>, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            service,
            download_dir: download_dir.into(),
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Download the archive of `task_id`, returning the written path
    pub async fn download(&self, task_id: &str, file_name: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.download_dir)
            .await
            .with_context(|| format!("create {}", self.download_dir.display()))?;

        let dest = unique_destination(&self.download_dir, file_name);
        let bytes = self
            .service
            .download_archive(task_id, &dest)
            .await
            .with_context(|| format!("download archive for task {task_id}"))?;

        info!(task_id = %task_id, path = %dest.display(), bytes, "archive saved");
        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("t1", Some("/srv/out/bundle_t1.tar.gz"), "bundle_t1.tar.gz")]
    #[case("t1", Some("C:\\out\\bundle.tar.gz"), "bundle.tar.gz")]
    #[case("t1", Some("bundle.tar.gz"), "bundle.tar.gz")]
    #[case("t1", Some("/srv/out/"), "packages-t1.tar.gz")]
    #[case("t1", Some(""), "packages-t1.tar.gz")]
    #[case("t1", Some(".."), "packages-t1.tar.gz")]
    #[case("t1", None, "packages-t1.tar.gz")]
    #[case("../x", None, "packages-.._x.tar.gz")]
    fn test_archive_file_name(
        #[case] task_id: &str,
        #[case] archive_path: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(archive_file_name(task_id, archive_path), expected);
    }

    #[test]
    fn test_unique_destination_appends_counter() {
        let dir = std::env::temp_dir().join(format!("pkgbundle-unique-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("dir");
        std::fs::write(dir.join("bundle.tar.gz"), b"x").expect("write");

        let next = unique_destination(&dir, "bundle.tar.gz");
        assert_eq!(next, dir.join("bundle-1.tar.gz"));
        assert_eq!(unique_destination(&dir, "fresh.zip"), dir.join("fresh.zip"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
