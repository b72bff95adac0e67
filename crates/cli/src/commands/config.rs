// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::ConfigCommand;
use crate::config::{Config, RemoteConfig};
use crate::error::{Error, Result};

use super::Context;

/// Execute a config subcommand.
pub fn run(ctx: &Context, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            print!("{}", render(&ctx.config)?);
            Ok(())
        }
        ConfigCommand::Remote { url } => {
            let config = set_remote(ctx.config.clone(), &url)?;
            config.save(&ctx.state_dir)?;
            println!("Remote set to {}", url);
            Ok(())
        }
    }
}

/// Point `config` at `url`, keeping any tuned timeouts.
pub(crate) fn set_remote(mut config: Config, url: &str) -> Result<Config> {
    let mut remote = config
        .remote
        .take()
        .unwrap_or_else(|| RemoteConfig::new(url));
    remote.url = url.to_string();
    if let Some(reason) = remote.validate_url() {
        return Err(Error::InvalidRemoteUrl {
            url: url.to_string(),
            reason,
        });
    }
    config.remote = Some(remote);
    Ok(config)
}

/// Effective configuration as TOML, with the token masked.
pub(crate) fn render(config: &Config) -> Result<String> {
    let mut shown = config.clone();
    if let Some(identity) = config.identity()? {
        shown.token = Some(identity.to_string());
    }
    Ok(toml::to_string_pretty(&shown)?)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
