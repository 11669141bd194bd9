use std::sync::Arc;

use agent_hooks::hooks::{DispatchReport, HookDefinition, HookEvent, HookPayload, HookRegistry};
use agent_hooks::{logging, RegistryConfig};
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Deserialize;
use serde_json::Value;

/// Scenario used when no path is given
const DEFAULT_SCENARIO: &str = include_str!("../demos/scenario.json");

/// A hook to register for the run
#[derive(Debug, Deserialize)]
struct HookSpec {
    id: String,
    priority: Option<i32>,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    events: Vec<HookEvent>,
    tool_pattern: Option<String>,
}

fn default_enabled() -> bool {
    true
}

/// An event to dispatch. `kind` stays a raw tag so unknown kinds can be shown.
#[derive(Debug, Deserialize)]
struct EventSpec {
    kind: String,
    #[serde(default = "empty_object")]
    payload: Value,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(default)]
    config: RegistryConfig,
    #[serde(default)]
    hooks: Vec<HookSpec>,
    #[serde(default)]
    events: Vec<EventSpec>,
}

impl Scenario {
    fn load(path: Option<&str>) -> Result<Self> {
        let contents = match path {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read scenario {}", path))?,
            None => DEFAULT_SCENARIO.to_string(),
        };
        let scenario: Scenario =
            serde_json::from_str(&contents).context("failed to parse scenario")?;
        scenario.config.validate()?;
        Ok(scenario)
    }
}

/// Build a definition whose callbacks print what they observe
fn tracing_definition(spec: &HookSpec) -> Result<HookDefinition> {
    let mut definition = HookDefinition::new();
    if let Some(priority) = spec.priority {
        definition = definition.with_priority(priority);
    }

    for event in &spec.events {
        let id: Arc<str> = Arc::from(spec.id.as_str());
        definition = match event {
            HookEvent::BeforeGenerate => definition.before_generate(move |messages| {
                tracing::debug!(hook = %id, "beforeGenerate");
                let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
                println!("    {} {} messages, last: {:?}", id.cyan(), messages.len(), last);
            }),
            HookEvent::AfterGenerate => definition.after_generate(move |response, error| {
                tracing::debug!(hook = %id, "afterGenerate");
                match error {
                    Some(err) => println!("    {} generation failed: {}", id.cyan(), err.red()),
                    None => println!("    {} response: {:?}", id.cyan(), response.content),
                }
            }),
            HookEvent::BeforeToolCall => definition.before_tool_call(move |tool, params| {
                tracing::debug!(hook = %id, tool, "beforeToolCall");
                let params = Value::Object(params.clone());
                println!("    {} calling {} with {}", id.cyan(), tool.bold(), params);
            }),
            HookEvent::AfterToolCall => definition.after_tool_call(move |tool, result, error| {
                tracing::debug!(hook = %id, tool, "afterToolCall");
                match error {
                    Some(err) => {
                        println!("    {} {} failed: {}", id.cyan(), tool.bold(), err.red())
                    }
                    None => println!("    {} {} returned {}", id.cyan(), tool.bold(), result),
                }
            }),
        };
    }

    if let Some(pattern) = &spec.tool_pattern {
        definition = definition.with_tool_pattern(pattern)?;
    }
    Ok(definition)
}

fn print_report(report: &DispatchReport) {
    let invoked = if report.invoked.is_empty() {
        "(none)".dimmed().to_string()
    } else {
        report.invoked.join(" -> ")
    };
    println!("  ran: {}", invoked.green());
    if !report.failed.is_empty() {
        println!("  failed: {}", report.failed.join(", ").red());
    }
}

fn main() -> Result<()> {
    let _guard = logging::init_logging()?;

    let path = std::env::args().nth(1);
    let scenario = Scenario::load(path.as_deref())?;

    tracing::info!("=== hookctl starting ===");

    let registry = HookRegistry::with_config(scenario.config.clone());
    registry.initialize()?;

    for spec in &scenario.hooks {
        registry.register(spec.id.clone(), tracing_definition(spec)?)?;
        if !spec.enabled {
            registry.disable(&spec.id)?;
        }
    }

    println!("{}", "Registered hooks".bold());
    for info in registry.list()? {
        let state = if info.enabled {
            "enabled".green()
        } else {
            "disabled".yellow()
        };
        println!("  {:>6}  {:<16} {}  {:?}", info.priority, info.id, state, info.events);
    }

    for event in &scenario.events {
        println!("\n{} {}", "dispatch".bold(), event.kind.blue());

        let result = event
            .kind
            .parse::<HookEvent>()
            .and_then(|kind| HookPayload::from_value(kind, &event.payload))
            .and_then(|payload| registry.dispatch_with_report(&payload));

        match result {
            Ok(report) => print_report(&report),
            Err(err) => {
                tracing::warn!("dispatch of {} failed: {}", event.kind, err);
                println!("  {}", err.to_string().red());
            }
        }
    }

    let stats = registry.stats()?;
    println!(
        "\n{} {} hooks, {} enabled",
        "stats".bold(),
        stats.total_hooks,
        stats.enabled_hooks
    );

    registry.cleanup()?;
    tracing::info!("=== hookctl done ===");

    Ok(())
}
