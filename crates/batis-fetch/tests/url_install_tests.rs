//! Install-from-URL tests against a wiremock server

mod common;

use std::fs;

use batis_apps::StepReporter;
use batis_core::{Error, RuntimeConfig};
use batis_distro::HostPlatform;
use batis_fetch::{load_index, Downloader, IndexVerifier, UrlInstaller};
use common::*;
use tempfile::TempDir;
use wiremock::MockServer;

fn installer(temp: &TempDir) -> UrlInstaller {
    UrlInstaller::new(scheme_in(temp), RuntimeConfig::default())
        .unwrap()
        .with_platform(HostPlatform::new("linux", "x86_64"))
        .with_progress(false)
        .with_runner(noop_runner())
}

#[tokio::test]
async fn test_install_latest_build_with_matching_hash() {
    let temp = TempDir::new().unwrap();
    let server = MockServer::start().await;
    let tarball = packed_app(temp.path());
    let hash = sha512_hex(&tarball);

    let old = format!("{}/downloads/fooview-1.0.app.tar.gz", server.uri());
    let new = format!("{}{}", server.uri(), TARBALL_PATH);
    let index = index_json(&[
        (old, "1.0", Some("0".repeat(128))),
        (new, "2.0", Some(hash.to_uppercase())),
    ]);
    mock_index(&server, &index).await;
    mock_file(&server, TARBALL_PATH, &tarball).await;

    let report = installer(&temp)
        .install_from_index(&index_url(&server), &mut StepReporter::Log)
        .await
        .unwrap();

    let scheme = scheme_in(&temp);
    assert_eq!(report.install_dir, scheme.application_dir(APP_NAME));
    assert!(report.install_dir.join("fooview.sh").is_file());
    assert_eq!(
        fs::read_link(scheme.commands.join("fooview")).unwrap(),
        report.install_dir.join("fooview.sh")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_backend_reporter_survives_install() {
    let temp = TempDir::new().unwrap();
    let server = MockServer::start().await;
    let tarball = packed_app(temp.path());
    let url = format!("{}{}", server.uri(), TARBALL_PATH);
    mock_index(&server, &index_json(&[(url, "2.0", Some(sha512_hex(&tarball)))])).await;
    mock_file(&server, TARBALL_PATH, &tarball).await;

    let buffer = SharedBuffer::default();
    let mut reporter = StepReporter::Backend(Box::new(buffer.clone()));
    installer(&temp)
        .install_from_index(&index_url(&server), &mut reporter)
        .await
        .unwrap();

    assert!(reporter.is_backend());
    let lines = buffer.contents();
    assert!(lines.starts_with("step: system_packages\n"), "{}", lines);
    assert!(lines.ends_with("finished\n"), "{}", lines);
}

#[tokio::test]
async fn test_corrupted_download_is_rejected() {
    let temp = TempDir::new().unwrap();
    let server = MockServer::start().await;
    let tarball = packed_app(temp.path());

    let url = format!("{}{}", server.uri(), TARBALL_PATH);
    mock_index(&server, &index_json(&[(url, "2.0", Some("f".repeat(128)))])).await;
    mock_file(&server, TARBALL_PATH, &tarball).await;

    let err = installer(&temp)
        .install_from_index(&index_url(&server), &mut StepReporter::Log)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::ChecksumMismatch { .. })
    ));
    assert!(!scheme_in(&temp).application_dir(APP_NAME).exists());
}

#[tokio::test]
async fn test_plain_http_build_needs_hash() {
    let temp = TempDir::new().unwrap();
    let server = MockServer::start().await;
    let url = format!("{}{}", server.uri(), TARBALL_PATH);
    mock_index(&server, &index_json(&[(url, "2.0", None)])).await;

    let err = installer(&temp)
        .install_from_index(&index_url(&server), &mut StepReporter::Log)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::InsecureDownload { .. })
    ));
}

#[tokio::test]
async fn test_no_build_for_platform() {
    let temp = TempDir::new().unwrap();
    let server = MockServer::start().await;
    let url = format!("{}{}", server.uri(), TARBALL_PATH);
    mock_index(&server, &index_json(&[(url, "2.0", None)])).await;

    let err = installer(&temp)
        .with_platform(HostPlatform::new("linux", "aarch64"))
        .choose_build(&index_url(&server))
        .await
        .unwrap_err();

    match err.downcast_ref::<Error>() {
        Some(Error::NoEligibleBuild { kernel, arch }) => {
            assert_eq!(kernel, "linux");
            assert_eq!(arch, "aarch64");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_tarball_fails() {
    let temp = TempDir::new().unwrap();
    let server = MockServer::start().await;
    let url = format!("{}{}", server.uri(), TARBALL_PATH);
    mock_index(&server, &index_json(&[(url, "2.0", Some("a".repeat(128)))])).await;
    mock_missing(&server, TARBALL_PATH).await;

    let result = installer(&temp)
        .install_from_index(&index_url(&server), &mut StepReporter::Log)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_downloaded_index_verifies() {
    let server = MockServer::start().await;
    let url = "https://example.com/fooview-2.0.app.tar.gz".to_string();
    mock_index(&server, &index_json(&[(url, "2.0", None)])).await;

    let downloader = Downloader::new(&RuntimeConfig::default().network).unwrap();
    let index: serde_json::Value = downloader.get_json(&index_url(&server)).await.unwrap();
    assert!(IndexVerifier::new(&index).verify().is_empty());
}

#[tokio::test]
async fn test_load_index_prefers_local_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("batis_index.json");
    let url = "https://example.com/fooview-2.0.app.tar.gz".to_string();
    fs::write(&path, index_json(&[(url, "2.0", None)]).to_string()).unwrap();

    let downloader = Downloader::new(&RuntimeConfig::default().network).unwrap();
    let index = load_index(&downloader, path.to_str().unwrap()).await.unwrap();
    assert_eq!(index["builds"][0]["version"], "2.0");
}
