// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `onyx cw` subcommands.

use clap::Args;
use clap::Subcommand;
use onyx_aws::AwsClients;
use onyx_core::provider::EventRuleApi;
use slog::Logger;
use slog::info;

#[derive(Debug, Args)]
pub(crate) struct CwArgs {
    #[command(subcommand)]
    command: CwCommands,
}

#[derive(Debug, Subcommand)]
enum CwCommands {
    /// Enable an events rule
    Enable {
        /// Rule name
        name: String,
    },
    /// Disable an events rule
    Disable {
        /// Rule name
        name: String,
    },
}

impl CwArgs {
    pub async fn run_cmd(
        &self,
        clients: &AwsClients,
        log: &Logger,
    ) -> Result<(), anyhow::Error> {
        match &self.command {
            CwCommands::Enable { name } => {
                clients.enable_rule(name).await?;
                info!(log, "enabled rule {name}");
            }
            CwCommands::Disable { name } => {
                clients.disable_rule(name).await?;
                info!(log, "disabled rule {name}");
            }
        }
        Ok(())
    }
}
