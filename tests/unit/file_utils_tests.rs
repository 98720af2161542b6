/*!
 * Tests for file utilities
 */

use modlocai::file_utils::FileManager;

use crate::common::{create_temp_dir, create_test_file};

#[test]
fn test_is_plugin_file_shouldMatchKnownExtensionsInAnyCase() {
    assert!(FileManager::is_plugin_file("Skyrim.esm"));
    assert!(FileManager::is_plugin_file("mods/Patch.ESP"));
    assert!(FileManager::is_plugin_file("Light.esl"));
    assert!(!FileManager::is_plugin_file("readme.txt"));
    assert!(!FileManager::is_plugin_file("esp"));
}

#[test]
fn test_find_mod_plugins_shouldSearchTwoLevelsSorted() {
    let dir = create_temp_dir().unwrap();
    let root = dir.path();
    create_test_file(root, "Loose.esp", "").unwrap();
    create_test_file(root, "ModB/Beta.esm", "").unwrap();
    create_test_file(root, "ModA/Alpha.esp", "").unwrap();
    create_test_file(root, "ModA/textures/Deep.esp", "").unwrap();
    create_test_file(root, "ModA/notes.txt", "").unwrap();

    let plugins = FileManager::find_mod_plugins(root).unwrap();

    assert_eq!(
        plugins,
        vec![
            root.join("Loose.esp"),
            root.join("ModA").join("Alpha.esp"),
            root.join("ModB").join("Beta.esm"),
        ]
    );
}

#[test]
fn test_find_mod_plugins_withMissingRoot_shouldFail() {
    let dir = create_temp_dir().unwrap();

    assert!(FileManager::find_mod_plugins(dir.path().join("mods")).is_err());
}

#[test]
fn test_resolve_input_dir_shouldHandleDirectoryFileAndNothing() {
    let dir = create_temp_dir().unwrap();
    let default_dir = dir.path().join("mods");
    let dropped_dir = dir.path().join("dropped");
    std::fs::create_dir_all(&dropped_dir).unwrap();
    let dropped_file = create_test_file(&dropped_dir, "Mod.esp", "").unwrap();

    assert_eq!(FileManager::resolve_input_dir(Some(&dropped_dir), &default_dir), dropped_dir);
    assert_eq!(FileManager::resolve_input_dir(Some(&dropped_file), &default_dir), dropped_dir);
    assert_eq!(FileManager::resolve_input_dir(None, &default_dir), default_dir);
    assert_eq!(
        FileManager::resolve_input_dir(Some(&dir.path().join("nowhere")), &default_dir),
        default_dir
    );
}

#[test]
fn test_ensure_dir_shouldCreateNestedDirectories() {
    let dir = create_temp_dir().unwrap();
    let nested = dir.path().join("a").join("b");

    FileManager::ensure_dir(&nested).unwrap();
    FileManager::ensure_dir(&nested).unwrap();

    assert!(FileManager::dir_exists(&nested));
    assert_eq!(FileManager::file_name_of(&nested), "b");
}
