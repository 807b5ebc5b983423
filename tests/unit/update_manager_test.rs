//! Unit tests for update checking: version comparison, release parsing and
//! package detection. No network access is needed.

use rstest::rstest;
use seabrowser::services::update_manager::{
    package_kind_from_os_release, parse_release, UpdateManager, UpdateManagerTrait,
};
use seabrowser::types::errors::UpdateError;
use seabrowser::types::update::PackageKind;

const RELEASE_JSON: &str = r#"{
    "tag_name": "v2.1.0",
    "html_url": "https://github.com/seasoftware-dev/tsunami/releases/tag/v2.1.0",
    "body": "Faster tabs",
    "published_at": "2026-01-15T10:00:00Z",
    "assets": [
        {"name": "tsunami-2.1.0.x86_64.rpm", "browser_download_url": "https://dl.example/t.rpm", "size": 1200},
        {"name": "tsunami_2.1.0_amd64.deb", "browser_download_url": "https://dl.example/t.deb", "size": 1100},
        {"name": "Tsunami-2.1.0.AppImage", "browser_download_url": "https://dl.example/t.AppImage", "size": 5000},
        {"name": "Tsunami-Setup-2.1.0.exe", "browser_download_url": "https://dl.example/t.exe", "size": 900}
    ]
}"#;

#[rstest]
#[case("1.0.0", "1.0.1", true)]
#[case("1.0.0", "v1.1.0", true)]
#[case("1.9.0", "1.10.0", true)]
#[case("1.0.0", "1.0.0", false)]
#[case("1.2", "1.2.0", false)]
#[case("2.0.0", "1.9.9", false)]
#[case("1.0.0", "2.0.0-beta", true)]
fn test_is_newer_version(#[case] current: &str, #[case] latest: &str, #[case] expected: bool) {
    assert_eq!(UpdateManager::is_newer_version(current, latest), expected);
}

/// The asset matching the package kind is chosen.
#[rstest]
#[case(PackageKind::Rpm, "tsunami-2.1.0.x86_64.rpm", 1200)]
#[case(PackageKind::Deb, "tsunami_2.1.0_amd64.deb", 1100)]
#[case(PackageKind::AppImage, "Tsunami-2.1.0.AppImage", 5000)]
#[case(PackageKind::WindowsInstaller, "Tsunami-Setup-2.1.0.exe", 900)]
fn test_parse_release_picks_asset(#[case] kind: PackageKind, #[case] asset: &str, #[case] size: u64) {
    let info = parse_release(RELEASE_JSON, "1.0.0", kind)
        .expect("parse failed")
        .expect("update expected");

    assert_eq!(info.version, "2.1.0");
    assert_eq!(info.asset_name, asset);
    assert_eq!(info.file_size, size);
    assert_eq!(info.changelog, "Faster tabs");
    assert_eq!(info.published_at, "2026-01-15T10:00:00Z");
}

/// Without a matching asset the release page is offered.
#[test]
fn test_parse_release_without_matching_asset() {
    let info = parse_release(RELEASE_JSON, "1.0.0", PackageKind::MacDmg)
        .expect("parse failed")
        .expect("update expected");
    assert!(info.asset_name.is_empty());
    assert_eq!(
        info.download_url,
        "https://github.com/seasoftware-dev/tsunami/releases/tag/v2.1.0"
    );
}

#[test]
fn test_parse_release_when_up_to_date() {
    let info = parse_release(RELEASE_JSON, "2.1.0", PackageKind::Deb).expect("parse failed");
    assert!(info.is_none());
}

#[test]
fn test_parse_release_errors() {
    assert!(matches!(
        parse_release("not json", "1.0.0", PackageKind::Deb),
        Err(UpdateError::ParseError(_))
    ));
    assert!(matches!(
        parse_release(r#"{"name": "no tag"}"#, "1.0.0", PackageKind::Deb),
        Err(UpdateError::ParseError(_))
    ));
}

#[rstest]
#[case("NAME=\"Fedora Linux\"\nID=fedora\n", PackageKind::Rpm)]
#[case("ID=opensuse-tumbleweed\nID_LIKE=\"opensuse suse\"\n", PackageKind::Rpm)]
#[case("ID=ubuntu\nID_LIKE=debian\n", PackageKind::Deb)]
#[case("ID=linuxmint\nID_LIKE=\"ubuntu debian\"\n", PackageKind::Deb)]
#[case("ID=arch\n", PackageKind::AppImage)]
#[case("", PackageKind::AppImage)]
fn test_package_kind_from_os_release(#[case] content: &str, #[case] expected: PackageKind) {
    assert_eq!(package_kind_from_os_release(content), expected);
}

#[test]
fn test_manager_defaults() {
    let mut mgr = UpdateManager::with_repo("owner", "repo");
    assert_eq!(mgr.get_current_version(), env!("CARGO_PKG_VERSION"));
    assert_eq!(
        mgr.releases_url(),
        "https://api.github.com/repos/owner/repo/releases/latest"
    );
    assert!(mgr.is_auto_check_enabled());
    mgr.set_auto_check_enabled(false);
    assert!(!mgr.is_auto_check_enabled());
}
