//! End-to-end tests for add/remove operations.
//!
//! These exercise the full path: target parsing -> install delegation ->
//! reconciliation -> manifest write-back, against real files in a temp
//! project directory.

use std::fs;
use std::path::Path;

use appstrap_core::project::{AddOptions, Project, RemoveOptions};
use appstrap_manifest::{CONFIG_FILENAME, PACKAGE_FILENAME, PackageManifest, ProjectConfig};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const BASE_CONFIG: &str = r#"
id = "com.example.HelloApp"
name = "HelloApp"
version = "1.0.0"
"#;

fn setup_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(CONFIG_FILENAME), BASE_CONFIG).unwrap();
    temp
}

fn read_package(root: &Path) -> PackageManifest {
    PackageManifest::load(&root.join(PACKAGE_FILENAME)).unwrap()
}

fn read_config(root: &Path) -> ProjectConfig {
    ProjectConfig::load(&root.join(CONFIG_FILENAME)).unwrap()
}

fn save() -> AddOptions {
    AddOptions {
        save: true,
        ..Default::default()
    }
}

#[test]
fn test_add_platform_with_save_pins_caret_and_tilde() {
    let temp = setup_project();
    let project = Project::new(temp.path());

    let report = project.add_platforms(&["android@7.0.0"], &save()).unwrap();
    assert!(report.diagnostics.is_empty());

    let package = read_package(temp.path());
    assert_eq!(
        package.appstrap.as_ref().unwrap().platforms,
        vec!["android"]
    );
    assert_eq!(package.dependencies["appstrap-android"], "^7.0.0");

    let config = read_config(temp.path());
    assert_eq!(
        config.engines().get("android").unwrap().spec.as_deref(),
        Some("~7.0.0")
    );
}

#[test]
fn test_add_platform_with_save_bootstraps_package_manifest() {
    let temp = setup_project();
    assert!(!temp.path().join(PACKAGE_FILENAME).exists());

    Project::new(temp.path())
        .add_platforms(&["android@7.0.0"], &save())
        .unwrap();

    let package = read_package(temp.path());
    assert_eq!(package.name.as_deref(), Some("com.example.helloapp"));
    assert_eq!(package.version.as_deref(), Some("1.0.0"));
    assert_eq!(package.display_name.as_deref(), Some("HelloApp"));
}

#[test]
fn test_add_platform_range_override_lands_verbatim_on_both_sides() {
    let temp = setup_project();
    Project::new(temp.path())
        .add_platforms(&["browser@^5.0.0"], &save())
        .unwrap();

    let package = read_package(temp.path());
    assert_eq!(package.dependencies["appstrap-browser"], "^5.0.0");
    assert_eq!(
        read_config(temp.path())
            .engines()
            .get("browser")
            .unwrap()
            .spec
            .as_deref(),
        Some("^5.0.0")
    );
}

#[test]
fn test_add_platform_from_url_records_location_on_both_sides() {
    let temp = setup_project();
    let url = "https://github.com/example/appstrap-browser";

    Project::new(temp.path()).add_platforms(&[url], &save()).unwrap();

    let package = read_package(temp.path());
    assert_eq!(package.appstrap.as_ref().unwrap().platforms, vec!["browser"]);
    assert_eq!(package.dependencies["appstrap-browser"], url);
    assert_eq!(
        read_config(temp.path())
            .engines()
            .get("browser")
            .unwrap()
            .spec
            .as_deref(),
        Some(url)
    );
}

#[test]
fn test_add_plugin_with_save_carries_variables_to_both_sides() {
    let temp = setup_project();
    let options = AddOptions {
        save: true,
        variables: [("variable_1".to_string(), "value_1".to_string())].into(),
    };

    Project::new(temp.path())
        .add_plugins(&["plugin-camera@2.3.0"], &options)
        .unwrap();

    let package = read_package(temp.path());
    assert_eq!(
        package.appstrap.as_ref().unwrap().plugins["plugin-camera"]["variable_1"],
        "value_1"
    );
    assert_eq!(package.dependencies["appstrap-plugin-camera"], "^2.3.0");

    let config = read_config(temp.path());
    let camera = config.plugin("plugin-camera").unwrap();
    assert_eq!(camera.spec.as_deref(), Some("~2.3.0"));
    assert_eq!(camera.variables["variable_1"], "value_1");
}

#[test]
fn test_add_without_save_leaves_both_manifests_untouched() {
    let temp = setup_project();
    fs::write(
        temp.path().join(PACKAGE_FILENAME),
        r#"{ "name": "helloapp", "version": "1.0.0" }"#,
    )
    .unwrap();
    let package_before = fs::read_to_string(temp.path().join(PACKAGE_FILENAME)).unwrap();
    let config_before = fs::read_to_string(temp.path().join(CONFIG_FILENAME)).unwrap();

    Project::new(temp.path())
        .add_platforms(&["android@7.0.0"], &AddOptions::default())
        .unwrap();

    assert_eq!(
        fs::read_to_string(temp.path().join(PACKAGE_FILENAME)).unwrap(),
        package_before
    );
    assert_eq!(
        fs::read_to_string(temp.path().join(CONFIG_FILENAME)).unwrap(),
        config_before
    );
}

#[test]
fn test_remove_without_save_clears_artifact_but_not_manifests() {
    let temp = setup_project();
    fs::write(
        temp.path().join(CONFIG_FILENAME),
        format!("{BASE_CONFIG}\n[[engine]]\nname = \"android\"\nspec = \"~7.0.0\"\n"),
    )
    .unwrap();
    let artifact = temp.path().join("platforms/android");
    fs::create_dir_all(&artifact).unwrap();
    let config_before = fs::read_to_string(temp.path().join(CONFIG_FILENAME)).unwrap();

    Project::new(temp.path())
        .remove_platforms(&["android"], &RemoveOptions::default())
        .unwrap();

    assert!(!artifact.exists());
    assert_eq!(
        fs::read_to_string(temp.path().join(CONFIG_FILENAME)).unwrap(),
        config_before
    );
}

#[test]
fn test_remove_with_save_drops_entry_and_dependency() {
    let temp = setup_project();
    let project = Project::new(temp.path());
    project.add_platforms(&["android@7.0.0"], &save()).unwrap();

    project
        .remove_platforms(&["android"], &RemoveOptions { save: true })
        .unwrap();

    let package = read_package(temp.path());
    assert!(package.platforms().is_empty());
    assert!(!package.dependencies.contains_key("appstrap-android"));
    assert!(read_config(temp.path()).engines().is_empty());
}

#[test]
fn test_remove_plugin_with_save() {
    let temp = setup_project();
    let project = Project::new(temp.path());
    project
        .add_plugins(&["plugin-camera@2.3.0"], &save())
        .unwrap();

    project
        .remove_plugins(&["plugin-camera"], &RemoveOptions { save: true })
        .unwrap();

    let package = read_package(temp.path());
    assert!(package.plugins().is_empty());
    assert!(!package.dependencies.contains_key("appstrap-plugin-camera"));
    assert!(read_config(temp.path()).plugin("plugin-camera").is_none());
}

#[test]
fn test_remove_with_save_never_creates_package_manifest() {
    let temp = setup_project();
    fs::write(
        temp.path().join(CONFIG_FILENAME),
        format!("{BASE_CONFIG}\n[[engine]]\nname = \"android\"\n"),
    )
    .unwrap();

    Project::new(temp.path())
        .remove_platforms(&["android"], &RemoveOptions { save: true })
        .unwrap();

    assert!(!temp.path().join(PACKAGE_FILENAME).exists());
    assert!(read_config(temp.path()).engines().is_empty());
}

#[test]
fn test_add_rejects_malformed_target() {
    let temp = setup_project();
    let result = Project::new(temp.path()).add_platforms(&["android@"], &save());
    assert!(result.is_err());
}

#[test]
fn test_add_missing_config_fails() {
    let temp = TempDir::new().unwrap();
    let result = Project::new(temp.path()).add_platforms(&["android"], &AddOptions::default());
    assert!(result.is_err());
}
