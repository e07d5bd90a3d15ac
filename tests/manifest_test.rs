//! Integration tests for scene manifest resolution against a realistic
//! project file.

use assert_matches::assert_matches;
use std::path::{Path, PathBuf};
use tbtools_common::Error;
use tbtools_scene::{load_manifest, SceneManifest};

fn fixture() -> SceneManifest {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/project.json");
    load_manifest(&path).unwrap()
}

#[test]
fn scene_ids_fall_back_to_legacy_code() {
    let manifest = fixture();
    let ids: Vec<_> = manifest.scenes.iter().filter_map(|s| s.id()).collect();
    assert_eq!(ids, ["C01", "C02", "C03"]);
}

#[test]
fn scene_dirs_resolve_against_scenes_root() {
    let manifest = fixture();
    let dirs: Vec<_> = manifest
        .scenes
        .iter()
        .map(|s| manifest.resolve_scene_dir(s).unwrap())
        .collect();

    assert_eq!(
        dirs,
        [
            PathBuf::from("/studio/ep01/scenes/C01"),
            PathBuf::from("/studio/ep01/scenes/retakes/C02_v2"),
            PathBuf::from("/mnt/overflow/C03"),
        ]
    );
}

#[test]
fn animatics_resolve_with_defaults() {
    let manifest = fixture();
    assert_eq!(
        manifest.resolve_animatic(&manifest.scenes[0]).as_deref(),
        Some(Path::new("/studio/ep01/editorial/animatics/C01.mp4"))
    );
    // Defaults carry no path, so a scene without its own animatic has none.
    assert_eq!(manifest.resolve_animatic(&manifest.scenes[1]), None);
}

#[test]
fn defaults_merge_without_overriding() {
    let manifest = fixture();
    let c01 = manifest.scenes[0].with_defaults(&manifest.defaults);

    let bg = c01.bg.unwrap();
    assert_eq!(bg["path"], "C01_bg.psd");
    assert_eq!(bg["node_name"], "BG");
    assert_eq!(c01.animatic.unwrap()["image_prefix"], "ANIM_");

    let c03 = manifest.scenes[2].with_defaults(&manifest.defaults);
    assert_eq!(c03.rig.unwrap()["path"], "hero.tpl");
    assert_eq!(c03.bg.unwrap()["z"], -10);
}

#[test]
fn opaque_fields_are_kept() {
    let manifest = fixture();
    assert_eq!(manifest.project.extra["name"], "Episode 01");
    assert_eq!(manifest.project.paths.rigs.as_deref(), Some("/studio/library/rigs"));
    assert_eq!(manifest.scenes[0].extra["nodes"][0]["name"], "Root");
}

#[test]
fn selection_reports_missing_ids() {
    let manifest = fixture();
    let requested = vec!["C03".to_string(), "C09".to_string(), "C01".to_string()];
    let selection = manifest.select(&requested).unwrap();

    let ids: Vec<_> = selection.scenes.iter().filter_map(|s| s.id()).collect();
    assert_eq!(ids, ["C03", "C01"]);
    assert_eq!(selection.missing, ["C09"]);

    assert_matches!(
        manifest.select(&["C09".to_string()]),
        Err(Error::NoScenesMatched { requested }) if requested == ["C09"]
    );
}

#[test]
fn missing_manifest_file() {
    assert_matches!(
        load_manifest(Path::new("/nonexistent/project.json")),
        Err(Error::MissingFile { .. })
    );
}
