//! End-to-end exercises of the `pkgr` binary: config file edits and the
//! plan command's exit-code contract against a mocked repository.

use assert_cmd::Command;
use assert_fs::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pkgr() -> Command {
    Command::cargo_bin("pkgr").unwrap()
}

#[test]
fn add_then_remove_round_trips_the_config_file() {
    let dir = assert_fs::TempDir::new().unwrap();
    let config = dir.child("pkgr.yml");
    config.write_str("Version: 1\nRepos:\n  - cran: https://cran.r-project.org\n").unwrap();

    pkgr().args(["-c", config.path().to_str().unwrap(), "add", "dplyr"]).assert().success();
    assert!(std::fs::read_to_string(config.path()).unwrap().contains("- dplyr"));

    pkgr().args(["-c", config.path().to_str().unwrap(), "remove", "dplyr"]).assert().success();
    assert!(!std::fs::read_to_string(config.path()).unwrap().contains("- dplyr"));
}

#[test]
fn adding_twice_is_a_no_op_and_still_succeeds() {
    let dir = assert_fs::TempDir::new().unwrap();
    let config = dir.child("pkgr.yml");
    config.write_str("Packages:\n  - dplyr\n").unwrap();

    pkgr().args(["-c", config.path().to_str().unwrap(), "add", "dplyr"]).assert().success();
    let body = std::fs::read_to_string(config.path()).unwrap();
    assert_eq!(body.matches("dplyr").count(), 1);
}

#[tokio::test]
async fn plan_exits_zero_for_a_resolvable_root() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/src/contrib/PACKAGES"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Package: dplyr\nVersion: 1.1.4\n"))
        .mount(&server)
        .await;

    let dir = assert_fs::TempDir::new().unwrap();
    let config = dir.child("pkgr.yml");
    config
        .write_str(&format!(
            "Repos:\n  - cran: {}\nPackages:\n  - dplyr\nCache: {}/cache\nLibrary: {}/library\n",
            server.uri(),
            dir.path().display(),
            dir.path().display(),
        ))
        .unwrap();

    pkgr().args(["-c", config.path().to_str().unwrap(), "plan"]).assert().success();
}

#[tokio::test]
async fn plan_exits_nonzero_for_a_missing_root() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/src/contrib/PACKAGES"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Package: dplyr\nVersion: 1.1.4\n"))
        .mount(&server)
        .await;

    let dir = assert_fs::TempDir::new().unwrap();
    let config = dir.child("pkgr.yml");
    config
        .write_str(&format!(
            "Repos:\n  - cran: {}\nPackages:\n  - doesnotexist\nCache: {}/cache\nLibrary: {}/library\n",
            server.uri(),
            dir.path().display(),
            dir.path().display(),
        ))
        .unwrap();

    pkgr().args(["-c", config.path().to_str().unwrap(), "plan"]).assert().failure().code(1);
}
