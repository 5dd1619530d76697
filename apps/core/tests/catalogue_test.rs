use std::fs;

use quicklaunch_core::catalogue::{ApplicationDirectorySource, CatalogueSource};

#[test]
fn finds_bundles_without_descending_into_them() {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir_all(root.path().join("Safari.app/Contents/Helpers/Inner.app")).unwrap();
    fs::create_dir_all(root.path().join("Utilities/Terminal.app")).unwrap();
    fs::create_dir_all(root.path().join("notes.APP")).unwrap();
    fs::write(root.path().join("readme.txt"), b"ignore me").unwrap();

    let source = ApplicationDirectorySource::new(
        vec![root.path().to_path_buf()],
        vec![".app".to_string()],
        4,
    );
    let apps = source.list_applications().unwrap();
    let names: Vec<&str> = apps.iter().map(|app| app.name.as_str()).collect();

    assert_eq!(names, vec!["notes", "Safari", "Terminal"]);
    assert_eq!(apps[2].path, root.path().join("Utilities/Terminal.app"));
}

#[test]
fn scan_depth_limits_the_walk() {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir_all(root.path().join("a/b/c/Deep.app")).unwrap();
    fs::create_dir_all(root.path().join("Shallow.app")).unwrap();

    let source =
        ApplicationDirectorySource::new(vec![root.path().to_path_buf()], vec!["app".into()], 2);
    let apps = source.list_applications().unwrap();

    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].name, "Shallow");
}

#[test]
fn desktop_files_and_missing_roots() {
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("firefox.desktop"), b"[Desktop Entry]").unwrap();
    let missing = root.path().join("does-not-exist");

    let source = ApplicationDirectorySource::new(
        vec![missing, root.path().to_path_buf(), root.path().to_path_buf()],
        vec!["desktop".into()],
        1,
    );
    let apps = source.list_applications().unwrap();

    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].name, "firefox");
}
