/*
[INPUT]:  Completed task identifier and a destination path
[OUTPUT]: Archive bytes streamed to disk
[POS]:    HTTP layer - artifact download endpoint
[UPDATE]: When the download route or transfer behavior changes
*/

use std::path::{Path, PathBuf};

use reqwest::{Method, Response};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::http::{BundleClient, Result};

impl BundleClient {
    /// Path segments of the archive route for a task
    fn archive_segments<'a>(&self, task_id: &'a str) -> Vec<&'a str> {
        let mut segments = vec!["api", "download", task_id];
        if self.archive_suffix() {
            segments.push("archive");
        }
        segments
    }

    /// Stream the archive to `dest`, returning the number of bytes written.
    ///
    /// The file is only created once the service answered with a success status.
    /// Bytes land in a `.part` sibling that is renamed into place when the stream
    /// ends, so a broken transfer never leaves a truncated archive at `dest`.
    pub async fn download_archive_to(&self, task_id: &str, dest: &Path) -> Result<u64> {
        let builder = self.request(Method::GET, &self.archive_segments(task_id))?;
        let mut response = self.send_checked(builder).await?;

        let part = partial_path(dest);
        let written = match stream_to_file(&mut response, &part, task_id).await {
            Ok(written) => written,
            Err(err) => {
                warn!(task_id, error = %err, "archive transfer interrupted");
                if let Err(remove_err) = tokio::fs::remove_file(&part).await {
                    debug!(task_id, error = %remove_err, "partial archive not removed");
                }
                return Err(err);
            }
        };
        tokio::fs::rename(&part, dest).await?;

        info!(task_id, bytes = written, dest = %dest.display(), "archive downloaded");
        Ok(written)
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

async fn stream_to_file(response: &mut Response, path: &Path, task_id: &str) -> Result<u64> {
    let mut file = File::create(path).await?;
    let mut written: u64 = 0;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
        debug!(task_id, written, "archive chunk written");
    }
    file.flush().await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::partial_path;
    use crate::http::{BundleClient, BundleError, ClientConfig};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_download_archive_to_file() {
        let server = MockServer::start().await;
        let payload = vec![0x1f, 0x8b, 0x08, 0x00, 0x42, 0x42];

        Mock::given(method("GET"))
            .and(path("/api/download/t1"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(payload.clone(), "application/gzip"))
            .expect(1)
            .mount(&server)
            .await;

        let client = BundleClient::new(&server.uri()).expect("client init");
        let dir = std::env::temp_dir().join(format!("pkgbundle-archive-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.expect("temp dir");
        let dest = dir.join("packages-t1.tar.gz");

        let written = client
            .download_archive_to("t1", &dest)
            .await
            .expect("download failed");

        assert_eq!(written, payload.len() as u64);
        let on_disk = tokio::fs::read(&dest).await.expect("read archive");
        assert_eq!(on_disk, payload);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_archive_suffix_route() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/download/t2/archive"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"abc".to_vec(), "application/gzip"))
            .expect(1)
            .mount(&server)
            .await;

        let config = ClientConfig {
            archive_suffix: true,
            ..ClientConfig::default()
        };
        let client = BundleClient::with_config(config, &server.uri()).expect("client init");
        let dest = std::env::temp_dir().join(format!("pkgbundle-suffix-{}.tar.gz", std::process::id()));
        let written = client.download_archive_to("t2", &dest).await.expect("download failed");
        assert_eq!(written, 3);
        assert_eq!(tokio::fs::read(&dest).await.expect("read archive"), b"abc".to_vec());
        let _ = tokio::fs::remove_file(&dest).await;
    }

    #[tokio::test]
    async fn test_interrupted_transfer_leaves_no_file() {
        // Promises 100 bytes, sends 6, then hangs up.
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut request = [0u8; 1024];
                let _ = socket.read(&mut request).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\npartia")
                    .await;
                let _ = socket.shutdown().await;
            }
        });

        let client = BundleClient::new(&format!("http://{addr}")).expect("client init");
        let dir = std::env::temp_dir().join(format!("pkgbundle-broken-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.expect("temp dir");
        let dest = dir.join("packages-t4.tar.gz");

        let err = client.download_archive_to("t4", &dest).await.unwrap_err();
        assert!(matches!(err, BundleError::Http(_)), "unexpected error: {err}");
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_download_not_ready() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/download/t3"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({ "detail": "task not finished" })),
            )
            .mount(&server)
            .await;

        let client = BundleClient::new(&server.uri()).expect("client init");
        let dest = std::env::temp_dir().join(format!("pkgbundle-never-{}.tar.gz", std::process::id()));
        let err = client.download_archive_to("t3", &dest).await.unwrap_err();

        assert!(matches!(err, BundleError::Api { code: 400, .. }));
        assert!(!dest.exists());
    }
}
