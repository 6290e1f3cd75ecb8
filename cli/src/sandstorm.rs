// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `onyx sandstorm`: park or restore a configured ECS fleet.

use anyhow::bail;
use clap::Args;
use onyx_aws::AwsClients;
use onyx_core::sandstorm;
use onyx_core::sandstorm::SandstormEvent;
use slog::Logger;

use crate::config::OnyxConfig;

#[derive(Debug, Args)]
pub(crate) struct SandstormArgs {
    /// Environment whose fleet to process (must exist in the config file)
    env: String,

    /// `init` parks the fleet; `revert` restores it
    #[clap(value_parser = parse_event)]
    event: SandstormEvent,
}

fn parse_event(value: &str) -> Result<SandstormEvent, String> {
    value.parse()
}

impl SandstormArgs {
    pub async fn run_cmd(
        &self,
        clients: &AwsClients,
        config: &OnyxConfig,
        log: &Logger,
    ) -> Result<(), anyhow::Error> {
        let Some(fleet) = config.fleet(&self.env) else {
            bail!("no sandstorm fleet configured for environment {:?}", self.env);
        };
        sandstorm::process(clients, clients, fleet, self.event, log).await?;
        Ok(())
    }
}
