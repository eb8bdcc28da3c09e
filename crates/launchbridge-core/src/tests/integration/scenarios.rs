#![cfg(test)]

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::host::{InMemoryHost, PropertyValue};
use crate::kernel::bootstrap::BridgePhase;
use crate::kernel::bridge::BridgeService;
use crate::kernel::constants;
use crate::kernel::error::Error;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::TransformationService;

use super::super::common::{ARTIFACT_FILE, GameDir, call_log, default_factory, init_logger, transformer_names};

fn no_services() -> BTreeSet<String> {
    BTreeSet::new()
}

#[test]
fn test_happy_path_registers_and_patches_host() {
    init_logger();
    let dir = GameDir::new();
    let host = dir.host();
    let calls = call_log();
    let mut bridge = BridgeService::new(host.clone(), default_factory(&calls), dir.artifact.clone());
    let mut env = host.clone();

    bridge.on_load(&mut env, &no_services()).expect("Bootstrap should succeed");

    assert_eq!(bridge.phase(), BridgePhase::Ready);
    assert_eq!(
        host.launch_plugin_names(),
        vec![constants::WELL_KNOWN_PLUGIN_NAME.to_string(), constants::BRIDGE_NAME.to_string()]
    );

    let snapshot = host.snapshot();
    assert_eq!(snapshot.mod_list.len(), 1, "one listing row per artifact");
    assert_eq!(snapshot.mod_list[0].kind, constants::LISTING_TYPE);
    assert_eq!(snapshot.mod_list[0].file, ARTIFACT_FILE);
    assert_eq!(snapshot.mod_list[0].name, constants::WELL_KNOWN_PLUGIN_NAME);

    assert_eq!(snapshot.excluded_paths, vec![dir.candidate()]);
    assert_eq!(snapshot.classpath, vec![dir.artifact.clone()]);

    let artifact_dir = dir.artifact.parent().map(PathBuf::from).unwrap_or_default();
    assert_eq!(
        snapshot.discovery_locations,
        vec![
            artifact_dir.join("custom").join("plugins"),
            artifact_dir.join("custom").join("mods"),
        ]
    );

    let mods_locator = snapshot.properties[constants::MOD_FOLDER_FACTORY_PROPERTY]
        .as_locator()
        .cloned()
        .expect("mods locator should be set");
    assert_eq!(mods_locator.folder(), artifact_dir.join("custom").join("mods"));
    assert_eq!(mods_locator.name(), constants::CUSTOM_MODS_LOCATOR_NAME);

    let plugins_locator = snapshot.properties[constants::PLUGIN_FOLDER_FACTORY_PROPERTY]
        .as_locator()
        .cloned()
        .expect("plugins locator should be set");
    assert_eq!(plugins_locator.folder(), dir.base.join("custom").join("plugins"));

    assert_eq!(bridge.downstream_services(), vec!["target"]);
    assert_eq!(transformer_names(&bridge.transformers()), vec!["A", "B"]);
    assert!(calls.borrow().contains(&"target:on_load(0)".to_string()));
}

#[test]
fn test_host_below_minimum_fails_without_mutation() {
    init_logger();
    let dir = GameDir::new();
    let host = InMemoryHost::new("3.9")
        .with_property(constants::BASE_DIRECTORY_PROPERTY, PropertyValue::Path(dir.base.clone()));
    let before = host.snapshot();
    let calls = call_log();
    let mut bridge = BridgeService::new(host.clone(), default_factory(&calls), dir.artifact.clone());
    let mut env = host.clone();

    let err = bridge.on_load(&mut env, &no_services()).expect_err("Bootstrap should fail");

    assert!(err.is_incompatible());
    match err {
        Error::IncompatibleEnvironment {
            source: Some(PluginSystemError::Incompatible { required, actual }),
            ..
        } => {
            assert_eq!(required, "4.0.0");
            assert_eq!(actual, "3.9");
        }
        other => panic!("Unexpected error: {:?}", other),
    }
    assert_eq!(bridge.phase(), BridgePhase::Failed);
    assert_eq!(host.snapshot(), before);
    assert!(calls.borrow().is_empty());
}

#[cfg(unix)]
#[test]
fn test_symlinked_artifact_is_not_excluded() {
    use std::fs;
    use std::os::unix::fs::symlink;

    init_logger();
    let dir = GameDir::new();
    let store = dir.base.join("store");
    fs::create_dir_all(&store).expect("Failed to create store dir");
    let real = store.join(ARTIFACT_FILE);
    fs::rename(&dir.artifact, &real).expect("Failed to move artifact");
    symlink(&real, &dir.artifact).expect("Failed to create symlink");

    let host = dir.host();
    let calls = call_log();
    let mut bridge = BridgeService::new(host.clone(), default_factory(&calls), dir.artifact.clone());
    let mut env = host.clone();

    bridge.on_load(&mut env, &no_services()).expect("Bootstrap should succeed");

    let snapshot = host.snapshot();
    assert!(snapshot.excluded_paths.is_empty());
    assert_eq!(snapshot.launch_plugins.len(), 2);
    assert_eq!(snapshot.mod_list.len(), 1);
    assert_eq!(bridge.phase(), BridgePhase::Ready);
}

#[test]
fn test_second_bridge_in_same_process_is_bypassed() {
    init_logger();
    let dir = GameDir::new();
    let host = dir.host();
    let calls = call_log();
    let mut env = host.clone();

    let mut first = BridgeService::new(host.clone(), default_factory(&calls), dir.artifact.clone());
    first.on_load(&mut env, &no_services()).expect("First bootstrap should succeed");
    let after_first = host.snapshot();

    let mut second = BridgeService::new(host.clone(), default_factory(&calls), dir.artifact.clone());
    second.on_load(&mut env, &no_services()).expect("Second bootstrap should be a no-op");

    assert_eq!(second.phase(), BridgePhase::Bypassed);
    assert_eq!(host.snapshot(), after_first);
    assert!(second.downstream_services().is_empty());
    assert!(second.transformers().is_empty());

    first.on_load(&mut env, &no_services()).expect("Repeated load should be a no-op");
    assert_eq!(first.phase(), BridgePhase::Ready);
    assert_eq!(host.snapshot(), after_first);
}
