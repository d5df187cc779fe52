//! Streaming asset download with redirect, status, and content-type
//! validation.

use std::path::Path;

use futures_util::StreamExt;
use log::{debug, info};
use reqwest::header::{CONTENT_TYPE, HeaderMap, LOCATION};
use reqwest::{Response, StatusCode};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use super::models::Downloaded;
use super::progress::ProgressTracker;
use crate::backend::error::{Result, UpdateError};
use crate::backend::installer::archive;
use crate::backend::net::HttpClient;
use crate::backend::sources::Asset;

/// Content types accepted for an archive download. Anything else is
/// treated as a mismatch even on a success status, so an HTML error page
/// served with 200 never reaches the installer.
const ARCHIVE_CONTENT_TYPES: [&str; 2] = ["application/zip", "application/octet-stream"];

fn is_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

/// Download `asset` into the system temp directory, reporting progress as
/// whole percentages, then check the result is a well-formed archive.
///
/// At most one redirect hop is followed and the redirected request must
/// succeed outright. The temp file is left in place for the installer.
pub async fn download_asset<F>(asset: &Asset, headers: HeaderMap, report: F) -> Result<Downloaded>
where
    F: FnMut(u8),
{
    let response = fetch(&asset.download_url, headers).await?;
    validate_content_type(&response)?;

    let destination = std::env::temp_dir().join(asset.file_name());
    let bytes_written = write_body(response, &destination, report).await?;

    archive::validate_archive(&destination)?;
    info!("downloaded {} ({bytes_written} bytes)", asset.name);
    Ok(Downloaded {
        path: destination,
        bytes_written,
    })
}

/// Issue the download GET, resolving at most one redirect hop. The hop
/// request carries only the client's browser-like user agent.
async fn fetch(url: &str, headers: HeaderMap) -> Result<Response> {
    let client = HttpClient::shared();
    let response = client.get_download(url, headers).await?;
    let status = response.status();

    if is_redirect(status) {
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| UpdateError::Redirect(url.to_string()))?;
        debug!("following redirect to {location}");

        let redirected = client.get_download(&location, HeaderMap::new()).await?;
        let status = redirected.status();
        if !status.is_success() {
            return Err(UpdateError::HttpStatus {
                status,
                url: location,
            });
        }
        return Ok(redirected);
    }

    if !status.is_success() {
        return Err(UpdateError::HttpStatus {
            status,
            url: url.to_string(),
        });
    }
    Ok(response)
}

fn validate_content_type(response: &Response) -> Result<()> {
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    if !ARCHIVE_CONTENT_TYPES
        .iter()
        .any(|accepted| content_type.contains(accepted))
    {
        return Err(UpdateError::ContentMismatch(content_type.to_string()));
    }
    Ok(())
}

async fn write_body<F>(response: Response, destination: &Path, report: F) -> Result<u64>
where
    F: FnMut(u8),
{
    let mut tracker = ProgressTracker::new(response.content_length(), report);
    let mut file = File::create(destination).await.map_err(|err| {
        UpdateError::fs(format!("cannot create {}", destination.display()), err)
    })?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await.map_err(|err| {
            UpdateError::fs(format!("cannot write {}", destination.display()), err)
        })?;
        tracker.advance(chunk.len() as u64);
    }
    file.flush().await.map_err(|err| {
        UpdateError::fs(format!("cannot flush {}", destination.display()), err)
    })?;

    Ok(tracker.written())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn zip_bytes(entry: &str, content: &[u8]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file(entry, options).unwrap();
        writer.write_all(content).unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn asset(server: &MockServer, file: &str) -> Asset {
        Asset {
            name: file.to_string(),
            download_url: format!("{}/dl/{file}", server.uri()),
            size_hint: None,
        }
    }

    #[tokio::test]
    async fn streams_and_reports_complete_progress() {
        let server = MockServer::start().await;
        let body = zip_bytes("data.txt", &vec![7u8; 64 * 1024]);
        Mock::given(method("GET"))
            .and(path("/dl/progress-case.zip"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "application/zip")
                    .set_body_bytes(body.clone()),
            )
            .mount(&server)
            .await;

        let mut seen = Vec::new();
        let downloaded = download_asset(
            &asset(&server, "progress-case.zip"),
            HeaderMap::new(),
            |p| seen.push(p),
        )
        .await
        .unwrap();

        assert_eq!(downloaded.bytes_written, body.len() as u64);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*seen.last().unwrap(), 100);
        assert_eq!(std::fs::read(&downloaded.path).unwrap(), body);
    }

    #[tokio::test]
    async fn follows_one_redirect_hop() {
        let server = MockServer::start().await;
        let body = zip_bytes("data.txt", b"redirected");
        Mock::given(method("GET"))
            .and(path("/dl/redirect-case.zip"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/real/file.zip", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/real/file.zip"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "application/octet-stream")
                    .set_body_bytes(body.clone()),
            )
            .mount(&server)
            .await;

        let downloaded = download_asset(
            &asset(&server, "redirect-case.zip"),
            HeaderMap::new(),
            |_| {},
        )
        .await
        .unwrap();
        assert_eq!(downloaded.bytes_written, body.len() as u64);
    }

    #[tokio::test]
    async fn redirect_without_location_fails_before_any_write() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dl/no-location-case.zip"))
            .respond_with(ResponseTemplate::new(302))
            .mount(&server)
            .await;

        let err = download_asset(
            &asset(&server, "no-location-case.zip"),
            HeaderMap::new(),
            |_| {},
        )
        .await
        .unwrap_err();

        assert!(matches!(err, UpdateError::Redirect(_)));
        assert!(!std::env::temp_dir().join("no-location-case.zip").exists());
    }

    #[tokio::test]
    async fn html_error_page_with_success_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dl/html-case.zip"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html>quota exceeded</html>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let err = download_asset(&asset(&server, "html-case.zip"), HeaderMap::new(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, UpdateError::ContentMismatch(ct) if ct.contains("text/html")));
    }

    #[tokio::test]
    async fn structurally_invalid_archive_is_a_distinct_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dl/corrupt-case.zip"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "application/zip")
                    .set_body_bytes(b"definitely not a zip".to_vec()),
            )
            .mount(&server)
            .await;

        let err = download_asset(&asset(&server, "corrupt-case.zip"), HeaderMap::new(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, UpdateError::CorruptArchive(_)));
    }

    #[tokio::test]
    async fn non_success_status_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dl/teapot-case.zip"))
            .respond_with(ResponseTemplate::new(418))
            .mount(&server)
            .await;

        let err = download_asset(&asset(&server, "teapot-case.zip"), HeaderMap::new(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, UpdateError::HttpStatus { status, .. } if status.as_u16() == 418));
    }
}
