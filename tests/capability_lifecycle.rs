mod common;

use std::collections::HashMap;
use std::sync::Arc;

use agent_toolkit::{
    CapabilityCategory, Catalogue, DynamicApiTools, InMemoryHost, ToolkitConfig, ToolkitError,
};
use common::{build, failing, fake, scenario_catalogue, RecordingSink};
use serde_json::json;

#[test]
fn test_no_config_keeps_non_dynamic_with_declared_defaults() -> anyhow::Result<()> {
    let host = InMemoryHost::new();
    let toolkit = build(scenario_catalogue(), None, Arc::new(RecordingSink::default()), &host)?;

    assert_eq!(toolkit.list_names(), vec!["X", "Y"]);
    let expected: HashMap<String, bool> =
        [("X".to_string(), true), ("Y".to_string(), false)].into_iter().collect();
    assert_eq!(toolkit.status_all(), expected);

    let visible: Vec<String> = host.list_visible().into_iter().map(|c| c.name).collect();
    assert_eq!(visible, vec!["X"]);
    Ok(())
}

#[test]
fn test_read_only_never_registers_write() -> anyhow::Result<()> {
    let host = InMemoryHost::new();
    let config = ToolkitConfig::default().with_read_only(true);
    let toolkit = build(scenario_catalogue(), Some(config), Arc::new(RecordingSink::default()), &host)?;

    assert_eq!(toolkit.list_names(), vec!["X"]);
    assert!(!toolkit.enable("Y"));
    assert_eq!(toolkit.status("Y"), None);
    assert_eq!(host.names(), vec!["X"]);
    Ok(())
}

#[tokio::test]
async fn test_manager_enables_hidden_capability() -> anyhow::Result<()> {
    let host = InMemoryHost::new();
    let config = ToolkitConfig::default().with_tool_manager(true);
    let toolkit = build(scenario_catalogue(), Some(config), Arc::new(RecordingSink::default()), &host)?;
    assert_eq!(toolkit.status("Y"), Some(false));

    let result = host
        .call(
            "manage_capabilities",
            json!({"action": "enable", "toolName": "Y"}),
        )
        .await;

    assert!(!result.is_error);
    assert!(result.text_content().contains("Y is now enabled"));
    assert_eq!(toolkit.status("Y"), Some(true));
    assert_eq!(host.is_visible("Y"), Some(true));
    Ok(())
}

#[tokio::test]
async fn test_manager_keeps_working_after_toolkit_dropped() -> anyhow::Result<()> {
    let host = InMemoryHost::new();
    let config = ToolkitConfig::default().with_tool_manager(true);
    let toolkit = build(scenario_catalogue(), Some(config), Arc::new(RecordingSink::default()), &host)?;
    drop(toolkit);

    let result = host
        .call(
            "manage_capabilities",
            json!({"action": "enable", "toolName": "Y"}),
        )
        .await;

    assert!(!result.is_error, "{}", result.text_content());
    assert_eq!(host.is_visible("Y"), Some(true));
    assert!(!host.call("X", json!({})).await.is_error);
    Ok(())
}

#[tokio::test]
async fn test_manager_rejects_unknown_action_before_dispatch() -> anyhow::Result<()> {
    let host = InMemoryHost::new();
    let config = ToolkitConfig::default().with_tool_manager(true);
    let toolkit = build(scenario_catalogue(), Some(config), Arc::new(RecordingSink::default()), &host)?;
    let before = toolkit.status_all();

    let result = host
        .call("manage_capabilities", json!({"action": "purge", "toolName": "Y"}))
        .await;

    assert!(result.is_error);
    assert!(result.text_content().starts_with("Invalid arguments:"));
    assert_eq!(toolkit.status_all(), before);
    Ok(())
}

#[test]
fn test_default_disabled_hidden_exactly_once() -> anyhow::Result<()> {
    let host = InMemoryHost::new();
    build(scenario_catalogue(), None, Arc::new(RecordingSink::default()), &host)?;

    let calls = host.handle_calls("Y").expect("Y registered");
    assert_eq!(calls.disable, 1);
    assert_eq!(calls.enable, 0);
    assert_eq!(host.handle_calls("X").map(|c| c.disable), Some(0));
    Ok(())
}

#[test]
fn test_repeated_toggles_reach_host_once() -> anyhow::Result<()> {
    let host = InMemoryHost::new();
    let toolkit = build(scenario_catalogue(), None, Arc::new(RecordingSink::default()), &host)?;

    assert!(toolkit.enable("Y"));
    assert!(toolkit.enable("Y"));
    assert_eq!(host.handle_calls("Y").map(|c| c.enable), Some(1));

    assert!(toolkit.disable("X"));
    assert!(toolkit.disable("X"));
    assert_eq!(host.handle_calls("X").map(|c| c.disable), Some(1));
    Ok(())
}

#[test]
fn test_reset_returns_to_declared_default() -> anyhow::Result<()> {
    let host = InMemoryHost::new();
    let toolkit = build(scenario_catalogue(), None, Arc::new(RecordingSink::default()), &host)?;

    toolkit.enable("Y");
    toolkit.disable("X");
    toolkit.enable("X");
    toolkit.disable("X");

    assert!(toolkit.reset("X"));
    assert!(toolkit.reset("Y"));
    assert_eq!(toolkit.status("X"), Some(true));
    assert_eq!(toolkit.status("Y"), Some(false));
    assert_eq!(host.is_visible("X"), Some(true));
    assert_eq!(host.is_visible("Y"), Some(false));

    let detailed = toolkit.detailed_status();
    assert!(detailed.iter().all(|s| s.enabled == s.enabled_by_default));
    Ok(())
}

#[test]
fn test_unknown_names_return_false() -> anyhow::Result<()> {
    let host = InMemoryHost::new();
    let toolkit = build(scenario_catalogue(), None, Arc::new(RecordingSink::default()), &host)?;
    let before = toolkit.status_all();

    assert!(!toolkit.enable("Z"));
    assert!(!toolkit.disable("Z"));
    assert!(!toolkit.reset("Z"));
    assert_eq!(toolkit.status_all(), before);
    Ok(())
}

#[test]
fn test_include_wins_over_exclude() -> anyhow::Result<()> {
    let catalogue = Catalogue::new()
        .with_api(fake("a", CapabilityCategory::Read, None))
        .with_api(fake("b", CapabilityCategory::Read, None));
    let config = ToolkitConfig::default().with_include(["a"]).with_exclude(["a"]);

    let host = InMemoryHost::new();
    let toolkit = build(catalogue, Some(config), Arc::new(RecordingSink::default()), &host)?;

    assert_eq!(toolkit.list_names(), vec!["a"]);
    Ok(())
}

#[test]
fn test_only_mode_ignores_read_only() -> anyhow::Result<()> {
    let catalogue = Catalogue::new()
        .with_api(fake("read", CapabilityCategory::Read, None))
        .with_api(fake("write", CapabilityCategory::Write, None))
        .with_api(fake("graphql", CapabilityCategory::Dynamic, None));
    let config = ToolkitConfig::default()
        .with_dynamic_api_tools(DynamicApiTools::Only)
        .with_read_only(true);

    let host = InMemoryHost::new();
    let toolkit = build(catalogue, Some(config), Arc::new(RecordingSink::default()), &host)?;

    assert_eq!(toolkit.list_names(), vec!["graphql"]);
    Ok(())
}

#[tokio::test]
async fn test_one_event_per_invocation_with_outcome() -> anyhow::Result<()> {
    let catalogue = scenario_catalogue().with_api(failing("broken"));
    let sink = Arc::new(RecordingSink::default());
    let host = InMemoryHost::new();
    build(catalogue, None, sink.clone(), &host)?;

    let ok = host.call("X", json!({"id": "1"})).await;
    let failed = host.call("broken", json!({})).await;
    let invalid = host.call("X", json!({"id": 1})).await;

    assert!(!ok.is_error);
    assert!(failed.is_error);
    assert!(invalid.is_error);

    let flags: Vec<bool> = sink
        .events()
        .iter()
        .map(|(name, data)| {
            assert_eq!(name, "capability_invoked");
            data["isError"].as_bool().unwrap_or_default()
        })
        .collect();
    assert_eq!(flags, vec![false, true, true]);

    let (_, first) = &sink.events()[0];
    assert_eq!(first["capabilityName"], "X");
    assert_eq!(first["capabilityFamily"], "api");
    assert!(!first.to_string().contains("test-token"));
    Ok(())
}

#[tokio::test]
async fn test_sink_failure_is_invisible() -> anyhow::Result<()> {
    let sink = Arc::new(RecordingSink::failing());
    let host = InMemoryHost::new();
    build(scenario_catalogue(), None, sink.clone(), &host)?;

    let result = host.call("X", json!({})).await;

    assert!(!result.is_error);
    assert_eq!(result.text_content(), "X handled {}");
    assert_eq!(sink.attempts(), 1);
    Ok(())
}

#[tokio::test]
async fn test_contract_violation_is_error_result() -> anyhow::Result<()> {
    let host = InMemoryHost::new();
    build(scenario_catalogue(), None, Arc::new(RecordingSink::default()), &host)?;

    let result = host.call("X", json!({"unexpected": true})).await;

    assert!(result.is_error);
    assert!(result.text_content().starts_with("Invalid arguments:"));
    Ok(())
}

#[tokio::test]
async fn test_execution_error_names_capability() -> anyhow::Result<()> {
    let host = InMemoryHost::new();
    build(
        Catalogue::new().with_api(failing("broken")),
        None,
        Arc::new(RecordingSink::default()),
        &host,
    )?;

    let result = host.call("broken", json!({})).await;

    assert_eq!(
        result.text_content(),
        "Failed to execute capability broken: remote refused"
    );
    Ok(())
}

#[tokio::test]
async fn test_direct_execute_propagates_errors() -> anyhow::Result<()> {
    let host = InMemoryHost::new();
    let sink = Arc::new(RecordingSink::default());
    let toolkit = build(
        scenario_catalogue().with_api(failing("broken")),
        None,
        sink.clone(),
        &host,
    )?;

    let invalid = toolkit.execute("X", json!({"id": 7})).await;
    assert!(matches!(invalid, Err(ToolkitError::InvalidArguments(_))));

    let failed = toolkit.execute("broken", json!({})).await;
    assert!(matches!(failed, Err(ToolkitError::Execution { ref name, .. }) if name == "broken"));

    // Hidden capabilities are still reachable directly.
    let output = toolkit.execute("Y", json!({"id": "9"})).await?;
    assert_eq!(output.content, r#"Y handled {"id":"9"}"#);

    assert_eq!(sink.events().len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_tools_accessor_bypasses_host() -> anyhow::Result<()> {
    let host = InMemoryHost::new();
    let toolkit = build(scenario_catalogue(), None, Arc::new(RecordingSink::default()), &host)?;

    let tools = toolkit.tools();
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["X", "Y"]);
    assert_eq!(tools[1].description, "Fake Y");
    assert!(tools[1].input_contract.is_some());

    let result = (tools[1].handler)(json!({"id": "2"})).await;
    assert!(!result.is_error);
    Ok(())
}
