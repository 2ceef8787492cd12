//! Context management commands.

use std::path::Path;

use anyhow::Result;

use crate::config::{ClientConfig, Context};

/// Create a context or update its endpoints.
pub fn set(
    name: &str,
    server: Option<&str>,
    push: Option<&str>,
    client_config_path: &Path,
) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    let existing = config.contexts.iter().find(|c| c.name == name).cloned();
    let created = existing.is_none();
    let mut ctx =
        existing.unwrap_or_else(|| Context { name: name.to_string(), ..Default::default() });

    if let Some(s) = server {
        ctx.server = s.trim_end_matches('/').to_string();
    }
    if let Some(p) = push {
        ctx.push = p.to_string();
    }
    config.upsert_context(ctx);
    config.save(client_config_path)?;

    if created {
        println!("Context \"{}\" created.", name);
    } else {
        println!("Context \"{}\" updated.", name);
    }
    Ok(())
}

pub fn list(client_config_path: &Path) -> Result<()> {
    let config = ClientConfig::load(client_config_path)?;

    if config.contexts.is_empty() {
        println!("No contexts configured.");
        println!("Run: codegram context set <name> --server <url>");
        return Ok(());
    }

    println!("{:2} {:16} {:36} {:32} {:8}", "", "NAME", "SERVER", "PUSH", "SESSION");
    for ctx in &config.contexts {
        let marker = if ctx.name == config.current_context { "*" } else { " " };
        let server = if ctx.server.is_empty() { "-" } else { &ctx.server };
        let push = if ctx.push.is_empty() { "-" } else { &ctx.push };
        let session = if ctx.session.is_empty() { "no" } else { "yes" };
        println!("{:2} {:16} {:36} {:32} {:8}", marker, ctx.name, server, push, session);
    }

    Ok(())
}

pub fn use_context(name: &str, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    if !config.contexts.iter().any(|c| c.name == name) {
        anyhow::bail!(
            "Context \"{}\" not found. Run `codegram context list` to see available contexts.",
            name
        );
    }

    config.current_context = name.to_string();
    config.save(client_config_path)?;
    println!("Switched to context \"{}\".", name);
    Ok(())
}

pub fn delete(name: &str, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    if !config.remove_context(name) {
        anyhow::bail!("Context \"{}\" not found.", name);
    }

    config.save(client_config_path)?;
    println!("Context \"{}\" deleted.", name);
    Ok(())
}
