/*!
 * Tests for load-order plugin resolution
 */

use std::path::PathBuf;

use modlocai::load_order::{dedupe_by_file_name, plugins_from_profile, read_enabled_mods, resolve_plugins};

use crate::common::{create_temp_dir, create_test_file};

#[test]
fn test_read_enabled_mods_withMixedLines_shouldKeepOnlyEnabledInOrder() {
    let dir = create_temp_dir().unwrap();
    let profile = create_test_file(
        dir.path(),
        "modlist.txt",
        "# This file was automatically generated\r\n+High Priority Mod\r\n-Disabled Mod\r\n*Unmanaged: DLC\r\n+ Low Priority Mod \r\n+\r\n",
    )
    .unwrap();

    let mods = read_enabled_mods(&profile).unwrap();

    assert_eq!(mods, vec!["High Priority Mod".to_string(), "Low Priority Mod".to_string()]);
}

#[test]
fn test_read_enabled_mods_withMissingProfile_shouldFail() {
    let dir = create_temp_dir().unwrap();
    assert!(read_enabled_mods(&dir.path().join("missing.txt")).is_err());
}

#[test]
fn test_resolve_plugins_withSameFileInTwoMods_shouldKeepHighestPriority() {
    let dir = create_temp_dir().unwrap();
    let root = dir.path();
    create_test_file(root, "Patch/Shared.esp", "patch").unwrap();
    create_test_file(root, "Patch/Extra.ESL", "extra").unwrap();
    create_test_file(root, "Base/Shared.esp", "base").unwrap();
    create_test_file(root, "Base/Base.esm", "base").unwrap();
    create_test_file(root, "Base/readme.txt", "not a plugin").unwrap();

    let enabled = vec!["Patch".to_string(), "Missing".to_string(), "Base".to_string()];
    let resolved = resolve_plugins(&enabled, root);

    assert_eq!(resolved.len(), 3);
    assert_eq!(resolved["Shared.esp"], root.join("Patch").join("Shared.esp"));
    assert_eq!(resolved["Extra.ESL"], root.join("Patch").join("Extra.ESL"));
    assert_eq!(resolved["Base.esm"], root.join("Base").join("Base.esm"));
}

#[test]
fn test_resolve_plugins_withReversedPriority_shouldPickOtherCopy() {
    let dir = create_temp_dir().unwrap();
    let root = dir.path();
    create_test_file(root, "Patch/Shared.esp", "patch").unwrap();
    create_test_file(root, "Base/Shared.esp", "base").unwrap();

    let resolved = resolve_plugins(&["Base".to_string(), "Patch".to_string()], root);

    assert_eq!(resolved["Shared.esp"], root.join("Base").join("Shared.esp"));
}

#[test]
fn test_plugins_from_profile_withEnabledMods_shouldReturnResolvedPaths() {
    let dir = create_temp_dir().unwrap();
    let root = dir.path().join("mods");
    create_test_file(&root, "A/Alpha.esp", "").unwrap();
    create_test_file(&root, "B/Beta.esp", "").unwrap();
    let profile = create_test_file(dir.path(), "modlist.txt", "+B\n-A\n").unwrap();

    let plugins = plugins_from_profile(&profile, &root).unwrap();

    assert_eq!(plugins, vec![root.join("B").join("Beta.esp")]);
}

#[test]
fn test_dedupe_by_file_name_withSharedName_shouldKeepFirst() {
    let plugins = vec![
        PathBuf::from("mods/A/Shared.esp"),
        PathBuf::from("mods/A/Alpha.esp"),
        PathBuf::from("mods/B/Shared.esp"),
        PathBuf::from("mods/B/Beta.esm"),
    ];

    let kept = dedupe_by_file_name(plugins);

    assert_eq!(
        kept,
        vec![
            PathBuf::from("mods/A/Shared.esp"),
            PathBuf::from("mods/A/Alpha.esp"),
            PathBuf::from("mods/B/Beta.esm"),
        ]
    );
}
