//! One chat turn from the terminal: `dispatch` starts an invocation, `click`
//! continues one from a button payload. Messages go to an in-memory client and
//! are printed afterwards, together with the payload of every button.

use crate::output::print_json;
use anyhow::{bail, Context};
use chatops_core::commands::{build_registry, BuiltinDeps};
use chatops_core::config::Config;
use chatops_core::context::CommandContext;
use chatops_core::engine::HandleOutcome;
use chatops_core::invocation::{CommandInvocation, DisplayMode};
use chatops_core::messaging::InMemoryMessageClient;
use chatops_core::params::ParameterBag;
use std::path::Path;
use std::sync::Arc;

pub struct DispatchArgs {
    pub command: String,
    pub params: Vec<String>,
    pub correlation_id: Option<String>,
    pub channel: Option<String>,
    pub user: Option<String>,
    pub hide_summary: bool,
}

pub fn run(root: &Path, args: DispatchArgs, json: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let display = if args.hide_summary {
        DisplayMode::Hide
    } else {
        config.display.default
    };
    let invocation = CommandInvocation {
        command: args.command,
        correlation_id: args.correlation_id,
        display: Some(display),
        params: parse_params(&args.params)?,
    };
    turn(&config, invocation, args.channel, args.user, json)
}

pub fn click(
    root: &Path,
    payload: &str,
    channel: Option<String>,
    user: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let invocation: CommandInvocation =
        serde_json::from_str(payload).context("payload is not a command invocation")?;
    turn(&config, invocation, channel, user, json)
}

fn parse_params(raw: &[String]) -> anyhow::Result<ParameterBag> {
    let mut params = ParameterBag::new();
    for item in raw {
        let Some((key, value)) = item.split_once('=') else {
            bail!("invalid parameter '{item}', expected key=value");
        };
        if key.trim().is_empty() {
            bail!("invalid parameter '{item}', key is empty");
        }
        params.insert(key.trim().to_string(), value.to_string());
    }
    Ok(params)
}

fn turn(
    config: &Config,
    invocation: CommandInvocation,
    channel: Option<String>,
    user: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let registry = build_registry(BuiltinDeps::from_config(config))?;
    let client = Arc::new(InMemoryMessageClient::new());
    let ctx = CommandContext {
        client: client.clone(),
        channel,
        user,
    };

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(registry.dispatch(invocation, &ctx))?;
    let log = client.log();

    if json {
        return print_json(&serde_json::json!({
            "correlation_id": result.correlation_id,
            "outcome": result.outcome,
            "messages": log,
        }));
    }

    for edit in &log {
        println!("── {} ──", edit.correlation_id);
        println!("{}", edit.message.render_plain());
        for action in edit.message.actions() {
            let payload = serde_json::to_string(&action.invocation)?;
            println!("  {} → chatops click '{}'", action.label, payload);
        }
        println!();
    }
    match &result.outcome {
        HandleOutcome::Prompted { parameter } => println!("waiting for: {parameter}"),
        HandleOutcome::Completed => println!("completed"),
        HandleOutcome::Failed { kind, message } => {
            bail!("{} ({})", message, kind.as_str())
        }
    }
    Ok(())
}
