// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `onyx ecs` subcommands.

use clap::Args;
use clap::Subcommand;
use onyx_aws::AwsClients;
use onyx_core::ecs;
use slog::Logger;

use crate::helpers::ReadlinePrompter;

#[derive(Debug, Args)]
pub(crate) struct EcsArgs {
    #[command(subcommand)]
    command: EcsCommands,
}

#[derive(Debug, Subcommand)]
enum EcsCommands {
    /// Show a cluster's services, tasks, and their instance IPs
    Describe(ClusterServiceArgs),
    /// Force a new deployment of one or more services
    Restart(ClusterServiceArgs),
    /// Update the container agent on every registered container instance
    UpdateAgent,
}

#[derive(Debug, Args)]
struct ClusterServiceArgs {
    /// Cluster name
    #[clap(long)]
    cluster: String,

    /// Keep only services whose name contains this value; empty matches
    /// every service
    #[clap(long, default_value = "")]
    service: String,
}

impl EcsArgs {
    pub async fn run_cmd(
        &self,
        clients: &AwsClients,
        log: &Logger,
    ) -> Result<(), anyhow::Error> {
        match &self.command {
            EcsCommands::Describe(args) => {
                let view = ecs::describe_cluster(
                    clients,
                    clients,
                    &args.cluster,
                    &args.service,
                    log,
                )
                .await?;
                print!("{}", ecs::render_cluster(&view));
                Ok(())
            }
            EcsCommands::Restart(args) => {
                let mut prompter = ReadlinePrompter::new();
                ecs::restart_services(
                    clients,
                    &mut prompter,
                    &args.cluster,
                    &args.service,
                    log,
                )
                .await?;
                Ok(())
            }
            EcsCommands::UpdateAgent => {
                ecs::update_container_agents(clients, log).await?;
                Ok(())
            }
        }
    }
}
