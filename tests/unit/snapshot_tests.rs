/*!
 * Tests for the plugin modification-time snapshot
 */

use modlocai::snapshot::{file_mtime_secs, select_changed, PluginTimestampSnapshot};

use crate::common::{create_temp_dir, create_test_file, set_mtime};

#[test]
fn test_load_withMissingFile_shouldReturnEmptySnapshot() {
    let dir = create_temp_dir().unwrap();

    let snapshot = PluginTimestampSnapshot::load(&dir.path().join("plugin_timestamps.txt")).unwrap();

    assert!(snapshot.is_empty());
}

#[test]
fn test_load_withMalformedLines_shouldSkipThem() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(
        dir.path(),
        "plugin_timestamps.txt",
        "Good.esp\t1700000000.5\nno tab here\nBad.esp\tnot-a-number\n\nOther.esm\t42\n",
    )
    .unwrap();

    let snapshot = PluginTimestampSnapshot::load(&path).unwrap();

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.get("Good.esp"), Some(1700000000.5));
    assert_eq!(snapshot.get("Other.esm"), Some(42.0));
}

#[test]
fn test_save_thenLoad_shouldPreserveEntries() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("nested").join("plugin_timestamps.txt");
    let mut snapshot = PluginTimestampSnapshot::new();
    snapshot.insert("A.esp", 1700000000.123456);
    snapshot.insert("B.esm", 5.0);

    snapshot.save(&path).unwrap();
    let loaded = PluginTimestampSnapshot::load(&path).unwrap();

    assert_eq!(loaded, snapshot);
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("A.esp\t"));
}

#[test]
fn test_select_changed_withNewAndModifiedPlugins_shouldSelectThem() {
    let dir = create_temp_dir().unwrap();
    let unchanged = create_test_file(dir.path(), "Same.esp", "a").unwrap();
    let newer = create_test_file(dir.path(), "Newer.esp", "b").unwrap();
    let older = create_test_file(dir.path(), "Older.esp", "c").unwrap();
    let fresh = create_test_file(dir.path(), "Fresh.esp", "d").unwrap();
    set_mtime(&unchanged, 1_000).unwrap();
    set_mtime(&newer, 2_000).unwrap();
    set_mtime(&older, 500).unwrap();

    let mut snapshot = PluginTimestampSnapshot::new();
    snapshot.insert("Same.esp", file_mtime_secs(&unchanged).unwrap());
    snapshot.insert("Newer.esp", 1_000.0);
    snapshot.insert("Older.esp", 1_000.0);

    let plugins = vec![unchanged, newer.clone(), older.clone(), fresh.clone()];
    let changed = select_changed(&plugins, &snapshot);

    assert_eq!(changed, vec![newer, older, fresh]);
}

#[test]
fn test_select_changed_withUnreadablePlugin_shouldExcludeIt() {
    let dir = create_temp_dir().unwrap();
    let missing = dir.path().join("Gone.esp");

    let changed = select_changed(&[missing], &PluginTimestampSnapshot::new());

    assert!(changed.is_empty());
}

#[test]
fn test_from_plugins_withExistingFiles_shouldRecordCurrentTimes() {
    let dir = create_temp_dir().unwrap();
    let plugin = create_test_file(dir.path(), "Mod.esp", "x").unwrap();
    set_mtime(&plugin, 1_234).unwrap();

    let snapshot = PluginTimestampSnapshot::from_plugins(&[plugin.clone(), dir.path().join("Missing.esp")]);

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.get("Mod.esp"), Some(1_234.0));
    assert!(select_changed(&[plugin], &snapshot).is_empty());
}
