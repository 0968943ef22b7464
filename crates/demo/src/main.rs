//! Local driver for the registry.
//!
//! ```text
//! warden-demo                                          # print stats
//! warden-demo export                                   # print the full snapshot
//! warden-demo check <actor> <resource> <action> [k=v]  # explain one decision
//! ```
//!
//! Configuration comes from `WARDEN_BOOTSTRAP_DEFAULTS`, `WARDEN_POLICY_PATH`
//! and `WARDEN_LOG_FORMAT`.

use std::sync::Arc;

use anyhow::{bail, Context};

use warden_auth::{Action, ActorId, AttributeValue, Attributes, AuthorizationRegistry, RegistryConfig, SystemClock};
use warden_observability::ObservabilityConfig;

fn main() -> anyhow::Result<()> {
    warden_observability::init_with(&ObservabilityConfig::from_env());

    let config = RegistryConfig::from_env().context("reading registry configuration")?;
    let registry = AuthorizationRegistry::from_config(&config, Arc::new(SystemClock))
        .context("building authorization registry")?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let output = match args.first().map(String::as_str) {
        None | Some("stats") => serde_json::to_value(registry.get_stats())?,
        Some("export") => serde_json::to_value(registry.export())?,
        Some("check") => {
            let [actor, resource, action, pairs @ ..] = &args[1..] else {
                bail!("usage: warden-demo check <actor> <resource> <action> [key=value ...]");
            };
            let action: Action = action.parse()?;
            let context = parse_context(pairs)?;
            let explanation = registry.explain_permission(
                &ActorId::from(actor),
                resource,
                action,
                context.as_ref(),
            );
            serde_json::to_value(explanation)?
        }
        Some(other) => bail!("unknown command '{other}'"),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// `key=value` pairs into a request context; no pairs means no context.
fn parse_context(pairs: &[String]) -> anyhow::Result<Option<Attributes>> {
    if pairs.is_empty() {
        return Ok(None);
    }

    let mut context = Attributes::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .with_context(|| format!("context entry '{pair}' is not key=value"))?;
        context.insert(key, parse_value(raw));
    }
    Ok(Some(context))
}

fn parse_value(raw: &str) -> AttributeValue {
    if let Ok(b) = raw.parse::<bool>() {
        AttributeValue::Bool(b)
    } else if let Ok(i) = raw.parse::<i64>() {
        AttributeValue::Int(i)
    } else {
        AttributeValue::Str(raw.to_string())
    }
}
