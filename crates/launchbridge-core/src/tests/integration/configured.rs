#![cfg(test)]

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::{BridgeConfig, ConfigFormat};
use crate::host::ParsedOptions;
use crate::host::memory::DeclaredArguments;
use crate::kernel::bootstrap::BridgePhase;
use crate::kernel::bridge::BridgeService;
use crate::kernel::constants;
use crate::kernel::error::Error;
use crate::plugin_system::error::{PluginSystemError, ResolutionFailure};
use crate::plugin_system::traits::{LaunchPlugin, TransformationService};

use super::super::common::{
    ForeignLaunchPlugin, GameDir, MockService, Primary, Secondary, TargetLaunchPlugin, call_log, default_factory,
    init_logger, transformer_names,
};

const TWO_SERVICES: &str = r#"{
    "patch_exclusion_list": false,
    "services": [
        { "qualified_name": "test.First", "kind": "transformation_service" },
        { "qualified_name": "test.Second", "kind": "transformation_service" },
        { "qualified_name": "test.Target", "kind": "launch_plugin" }
    ]
}"#;

fn two_service_bridge(dir: &GameDir) -> (BridgeService<crate::host::InMemoryHost>, super::super::common::CallLog) {
    let calls = call_log();
    let mut factory = default_factory(&calls);
    let first_calls = calls.clone();
    factory.register_transformation_service("test.First", move || {
        Ok(Box::new(MockService::<Primary>::new("first", &["A", "B"], first_calls.clone())) as Box<dyn TransformationService>)
    });
    let second_calls = calls.clone();
    factory.register_transformation_service("test.Second", move || {
        Ok(Box::new(MockService::<Secondary>::new("second", &["C"], second_calls.clone())) as Box<dyn TransformationService>)
    });
    factory.register_launch_plugin("test.Target", || {
        Ok(Arc::new(TargetLaunchPlugin::named("target")) as Arc<dyn LaunchPlugin>)
    });

    let config = BridgeConfig::from_str(TWO_SERVICES, ConfigFormat::Json).expect("Config should parse");
    let bridge = BridgeService::new(dir.host(), factory, dir.artifact.clone()).with_config(config);
    (bridge, calls)
}

#[test]
fn test_delegation_follows_resolution_order() {
    init_logger();
    let dir = GameDir::new();
    let (mut bridge, calls) = two_service_bridge(&dir);
    let mut env = bridge.host().clone();
    let others: BTreeSet<String> = ["fml".to_string()].into_iter().collect();

    bridge.on_load(&mut env, &others).expect("Bootstrap should succeed");
    assert_eq!(bridge.downstream_services(), vec!["first", "second"]);

    let mut declared = DeclaredArguments::new();
    bridge.arguments(&mut declared);
    assert_eq!(declared.names(), vec!["first.debug", "second.debug"]);

    bridge.argument_values(&ParsedOptions::new().with_value("second.debug", "true"));
    bridge.initialize(&mut env);
    bridge.begin_scanning(&mut env);
    let scanned: Vec<String> = bridge.run_scan(&mut env).into_iter().map(|r| r.name).collect();
    assert_eq!(scanned, vec!["first-resources", "second-resources"]);
    assert_eq!(transformer_names(&bridge.transformers()), vec!["A", "B", "C"]);

    assert_eq!(
        *calls.borrow(),
        vec![
            "first:on_load(1)",
            "second:on_load(1)",
            "first:arguments",
            "second:arguments",
            "first:argument_values=",
            "second:argument_values=true",
            "first:initialize",
            "second:initialize",
            "first:begin_scanning",
            "second:begin_scanning",
            "first:run_scan",
            "second:run_scan",
            "first:transformers",
            "second:transformers",
        ]
    );

    assert!(bridge.host().snapshot().excluded_paths.is_empty(), "exclusion patch is disabled");
}

#[test]
fn test_equivalent_plugin_under_other_key_is_skipped() {
    init_logger();
    let dir = GameDir::new();
    let calls = call_log();
    let host = dir
        .host()
        .with_launch_plugin("legacy", Arc::new(TargetLaunchPlugin::named("legacy")));
    let mut bridge = BridgeService::new(host.clone(), default_factory(&calls), dir.artifact.clone());
    let mut env = host.clone();

    bridge.on_load(&mut env, &BTreeSet::new()).expect("Duplicates are not fatal");

    assert_eq!(host.launch_plugin_names(), vec!["legacy".to_string(), constants::BRIDGE_NAME.to_string()]);
    assert_eq!(bridge.phase(), BridgePhase::Ready);
}

#[test]
fn test_occupied_key_is_fatal() {
    init_logger();
    let dir = GameDir::new();
    let calls = call_log();
    let host = dir
        .host()
        .with_launch_plugin(constants::BRIDGE_NAME, Arc::new(ForeignLaunchPlugin::new(constants::BRIDGE_NAME)));
    let mut bridge = BridgeService::new(host.clone(), default_factory(&calls), dir.artifact.clone());
    let mut env = host.clone();

    let err = bridge.on_load(&mut env, &BTreeSet::new()).expect_err("Occupied key should fail");

    assert!(matches!(
        err,
        Error::IncompatibleEnvironment {
            source: Some(PluginSystemError::Registration { .. }),
            ..
        }
    ));
    assert_eq!(bridge.phase(), BridgePhase::Failed);
    assert!(bridge.downstream_services().is_empty());
}

#[test]
fn test_equivalent_transformation_service_is_skipped() {
    init_logger();
    let dir = GameDir::new();
    let calls = call_log();
    let mut factory = default_factory(&calls);
    let one_calls = calls.clone();
    factory.register_transformation_service("test.One", move || {
        Ok(Box::new(MockService::<Primary>::new("one", &["A"], one_calls.clone())) as Box<dyn TransformationService>)
    });
    let two_calls = calls.clone();
    factory.register_transformation_service("test.Two", move || {
        Ok(Box::new(MockService::<Primary>::new("two", &["B"], two_calls.clone())) as Box<dyn TransformationService>)
    });
    let config = BridgeConfig::from_str(
        r#"{ "services": [
            { "qualified_name": "test.One", "kind": "transformation_service" },
            { "qualified_name": "test.Two", "kind": "transformation_service" }
        ] }"#,
        ConfigFormat::Json,
    )
    .expect("Config should parse");
    let host = dir.host();
    let mut bridge = BridgeService::new(host.clone(), factory, dir.artifact.clone()).with_config(config);
    let mut env = host.clone();

    bridge.on_load(&mut env, &BTreeSet::new()).expect("Duplicates are not fatal");

    assert_eq!(bridge.phase(), BridgePhase::Ready);
    assert_eq!(bridge.downstream_services(), vec!["one"]);
    assert_eq!(transformer_names(&bridge.transformers()), vec!["A"]);
    assert_eq!(*calls.borrow(), vec!["one:on_load(0)", "one:transformers"]);
}

#[test]
fn test_unresolvable_service_fails_for_good() {
    init_logger();
    let dir = GameDir::new();
    let host = dir.host();
    let mut env = host.clone();
    let mut bridge = BridgeService::new(host.clone(), crate::plugin_system::ServiceFactory::with_defaults(), dir.artifact.clone());

    let err = bridge.on_load(&mut env, &BTreeSet::new()).expect_err("Missing constructor should fail");
    match &err {
        Error::IncompatibleEnvironment {
            source: Some(PluginSystemError::ClassResolution { qualified_name, reason }),
            ..
        } => {
            assert_eq!(qualified_name, constants::TARGET_LAUNCH_PLUGIN);
            assert_eq!(reason, &ResolutionFailure::NotFound);
        }
        other => panic!("Unexpected error: {:?}", other),
    }

    let again = bridge.on_load(&mut env, &BTreeSet::new()).expect_err("Failed is terminal");
    assert!(again.is_incompatible());
    assert_eq!(again.to_string(), err.to_string());
    assert!(host.launch_plugin_names().is_empty());
}

#[test]
fn test_unavailable_registry_fails_before_mutation() {
    init_logger();
    let dir = GameDir::new();
    let calls = call_log();
    let host = dir.host().without_launch_plugin_registry();
    let before = host.snapshot();
    let mut bridge = BridgeService::new(host.clone(), default_factory(&calls), dir.artifact.clone());
    let mut env = host.clone();

    let err = bridge.on_load(&mut env, &BTreeSet::new()).expect_err("Missing registry should fail");

    assert!(matches!(
        err,
        Error::IncompatibleEnvironment {
            source: Some(PluginSystemError::RegistryUnavailable),
            ..
        }
    ));
    assert_eq!(host.snapshot(), before);
}

#[test]
fn test_classpath_rejection_aborts_before_resolution() {
    init_logger();
    let dir = GameDir::new();
    let calls = call_log();
    let host = dir.host().rejecting_classpath("sealed loader");
    let mut bridge = BridgeService::new(host.clone(), default_factory(&calls), dir.artifact.clone());
    let mut env = host.clone();

    let err = bridge.on_load(&mut env, &BTreeSet::new()).expect_err("Classpath failure should be fatal");

    assert!(matches!(
        err,
        Error::IncompatibleEnvironment {
            source: Some(PluginSystemError::ClasspathExtension { .. }),
            ..
        }
    ));
    assert!(host.launch_plugin_names().is_empty());
    assert!(host.snapshot().excluded_paths.is_empty());
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_downstream_load_failure_is_fatal() {
    init_logger();
    let dir = GameDir::new();
    let calls = call_log();
    let mut factory = default_factory(&calls);
    let failing_calls = calls.clone();
    factory.register_transformation_service(constants::TARGET_TRANSFORMATION_SERVICE, move || {
        Ok(Box::new(MockService::<Primary>::new("target", &["A"], failing_calls.clone()).failing_on_load())
            as Box<dyn TransformationService>)
    });
    let host = dir.host();
    let mut bridge = BridgeService::new(host.clone(), factory, dir.artifact.clone());
    let mut env = host.clone();

    let err = bridge.on_load(&mut env, &BTreeSet::new()).expect_err("Downstream failure should be fatal");

    assert!(err.is_incompatible());
    assert!(err.to_string().contains("target failed to load"));
    assert_eq!(bridge.phase(), BridgePhase::Failed);
    assert!(bridge.transformers().is_empty());
}
