//! Login / logout commands.
//!
//! CodeGram sessions are issued by an external identity provider; the CLI
//! only stores the resulting cookie and checks it against `/auth/me`.

use std::path::Path;

use anyhow::Result;

use codegram_client::CodegramApi;

use crate::commands::{build_client, current_context};
use crate::config::ClientConfig;

/// Verify `cookie` and save it to the current context.
pub async fn login(cookie: &str, client_config_path: &Path) -> Result<()> {
    let cookie = cookie.trim();
    if cookie.is_empty() {
        anyhow::bail!("Cookie cannot be empty.");
    }

    let mut ctx = current_context(client_config_path)?;
    ctx.session = cookie.to_string();

    let user = build_client(&ctx)?.current_user().await.map_err(|e| {
        if e.is_unauthorized() {
            anyhow::anyhow!("Login failed: the server rejected this session cookie.")
        } else {
            anyhow::anyhow!("failed to verify session: {}", e)
        }
    })?;

    let mut config = ClientConfig::load(client_config_path)?;
    let name = ctx.name.clone();
    config.upsert_context(ctx);
    config.save(client_config_path)?;

    println!("Logged in as {} (@{}).", user.display_name(), user.username);
    println!("Session saved to context \"{}\".", name);
    Ok(())
}

/// Clear the session from the current context.
pub fn logout(client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    let current_name = config.current_context.clone();
    if current_name.is_empty() {
        anyhow::bail!("No current context.");
    }

    let ctx = config
        .get_mut(&current_name)
        .ok_or_else(|| anyhow::anyhow!("Current context not found."))?;

    ctx.session = String::new();
    config.save(client_config_path)?;
    println!("Logged out from context \"{}\".", current_name);
    Ok(())
}

/// Print the current context and who its session belongs to.
pub async fn status(client_config_path: &Path) -> Result<()> {
    let ctx = current_context(client_config_path)?;

    println!("Context:   {}", ctx.name);
    println!("Server:    {}", ctx.server);
    println!("Push:      {}", if ctx.push.is_empty() { "-" } else { &ctx.push });

    if ctx.session.is_empty() {
        println!("User:      not logged in");
        return Ok(());
    }
    match build_client(&ctx)?.current_user().await {
        Ok(user) => println!("User:      {} (@{}, {:?})", user.display_name(), user.username, user.role),
        Err(e) if e.is_unauthorized() => println!("User:      session expired"),
        Err(e) => println!("User:      unknown ({})", e),
    }
    Ok(())
}
