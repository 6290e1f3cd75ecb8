// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `onyx ec2` subcommands: security groups and instances.

use anyhow::Context;
use anyhow::bail;
use clap::Args;
use clap::Subcommand;
use onyx_aws::AwsClients;
use onyx_aws::HttpPublicIp;
use onyx_common::model::GroupFilter;
use onyx_core::discovery;
use onyx_core::display;
use onyx_core::display::Styles;
use onyx_core::provider::InstanceApi;
use onyx_core::reconcile::ChangeRequest;
use onyx_core::reconcile::Reconciler;
use slog::Logger;
use slog::info;
use tabled::Tabled;

use crate::config::OnyxConfig;
use crate::helpers::ReadlinePrompter;

#[derive(Debug, Args)]
pub(crate) struct Ec2Args {
    #[command(subcommand)]
    command: Ec2Commands,
}

#[derive(Debug, Subcommand)]
enum Ec2Commands {
    /// Actions on security groups
    #[command(subcommand)]
    Sg(SgCommands),
    /// Actions on instances
    #[command(subcommand)]
    Instance(InstanceCommands),
}

#[derive(Debug, Subcommand)]
enum SgCommands {
    /// Show groups with their ingress rules
    Describe(SgDescribeArgs),
    /// List group ids and names for an environment
    List(SgListArgs),
    /// Grant yourself ingress from your current public IP
    Authorize(RuleChangeArgs),
    /// Remove the ingress rules previously granted to you
    Revoke(RuleChangeArgs),
}

#[derive(Debug, Args)]
struct SgDescribeArgs {
    /// Environment whose groups to describe
    #[clap(long, conflicts_with = "id")]
    env: Option<String>,

    /// A single group id (sg-...)
    #[clap(long)]
    id: Option<String>,

    /// Keep only groups whose name contains VALUE (repeatable, as
    /// name=VALUE)
    #[clap(long = "filter")]
    filters: Vec<String>,
}

#[derive(Debug, Args)]
struct SgListArgs {
    /// Environment to list; empty lists every group
    #[clap(long, default_value = "")]
    env: String,
}

#[derive(Debug, Args)]
struct RuleChangeArgs {
    /// Environment name, or a literal sg- id to skip discovery
    target: String,

    /// Rule types to apply (ssh, redis, ...)
    #[clap(long, short = 't', value_delimiter = ',')]
    types: Vec<String>,

    /// Explicit port numbers, combined with --types
    #[clap(long, value_delimiter = ',')]
    ports: Vec<u16>,

    /// Keep only groups whose name contains VALUE (repeatable, as
    /// name=VALUE)
    #[clap(long = "filter")]
    filters: Vec<String>,

    /// When exactly one group matches, apply to it without prompting
    #[clap(long)]
    skip_choice: bool,
}

impl Ec2Args {
    pub async fn run_cmd(
        &self,
        clients: &AwsClients,
        config: &OnyxConfig,
        styles: &Styles,
        log: &Logger,
    ) -> Result<(), anyhow::Error> {
        match &self.command {
            Ec2Commands::Sg(SgCommands::Describe(args)) => {
                cmd_sg_describe(clients, args, styles, log).await
            }
            Ec2Commands::Sg(SgCommands::List(args)) => {
                cmd_sg_list(clients, args, log).await
            }
            Ec2Commands::Sg(SgCommands::Authorize(args)) => {
                cmd_sg_change(clients, config, args, styles, true, log).await
            }
            Ec2Commands::Sg(SgCommands::Revoke(args)) => {
                cmd_sg_change(clients, config, args, styles, false, log).await
            }
            Ec2Commands::Instance(InstanceCommands::Describe(args)) => {
                cmd_instance_describe(clients, args).await
            }
            Ec2Commands::Instance(InstanceCommands::Start { id }) => {
                clients.start(id).await.context("starting instance")?;
                info!(log, "started instance {id}");
                Ok(())
            }
            Ec2Commands::Instance(InstanceCommands::Stop { id }) => {
                clients.stop(id).await.context("stopping instance")?;
                info!(log, "stopped instance {id}");
                Ok(())
            }
        }
    }
}

async fn cmd_sg_describe(
    clients: &AwsClients,
    args: &SgDescribeArgs,
    styles: &Styles,
    log: &Logger,
) -> Result<(), anyhow::Error> {
    let groups = match (&args.id, &args.env) {
        (Some(id), _) => vec![discovery::get_by_id(clients, id).await?],
        (None, Some(env)) => {
            let groups =
                discovery::list_by_environment(clients, env, log).await?;
            let filters = GroupFilter::parse_all(&args.filters);
            discovery::apply_filters(groups, &filters)
        }
        (None, None) => bail!("either --id or --env is required"),
    };
    for group in &groups {
        display::print_group(group, &[], false, styles);
    }
    Ok(())
}

async fn cmd_sg_list(
    clients: &AwsClients,
    args: &SgListArgs,
    log: &Logger,
) -> Result<(), anyhow::Error> {
    let groups =
        discovery::list_by_environment(clients, &args.env, log).await?;
    for group in &groups {
        println!("{} ( {} )", group.id, group.name);
    }
    Ok(())
}

async fn cmd_sg_change(
    clients: &AwsClients,
    config: &OnyxConfig,
    args: &RuleChangeArgs,
    styles: &Styles,
    authorize: bool,
    log: &Logger,
) -> Result<(), anyhow::Error> {
    let catalog = config.catalog();
    let public_ip = HttpPublicIp::new()?;
    let reconciler = Reconciler {
        groups: clients,
        identity: clients,
        public_ip: &public_ip,
        catalog: &catalog,
        styles: *styles,
    };
    let request = ChangeRequest {
        target: args.target.clone(),
        types: args.types.clone(),
        ports: args.ports.clone(),
        filters: args.filters.clone(),
        skip_choice: args.skip_choice,
        authorize,
    };
    let mut prompter = ReadlinePrompter::new();
    reconciler.run(&request, &mut prompter, log).await?;
    Ok(())
}

#[derive(Debug, Subcommand)]
enum InstanceCommands {
    /// Show instance ids and addresses
    Describe(InstanceDescribeArgs),
    /// Start a stopped instance
    Start { id: String },
    /// Stop a running instance
    Stop { id: String },
}

#[derive(Debug, Args)]
struct InstanceDescribeArgs {
    /// Instance ids to describe
    #[clap(required = true)]
    ids: Vec<String>,
}

async fn cmd_instance_describe(
    clients: &AwsClients,
    args: &InstanceDescribeArgs,
) -> Result<(), anyhow::Error> {
    let instances =
        clients.describe(&args.ids).await.context("describing instances")?;

    #[derive(Tabled)]
    #[tabled(rename_all = "SCREAMING_SNAKE_CASE")]
    struct InstanceRow {
        id: String,
        public_ip: String,
        private_ip: String,
    }

    let rows = instances.into_iter().map(|instance| InstanceRow {
        id: instance.id,
        public_ip: instance.public_ip.unwrap_or_else(|| "-".to_string()),
        private_ip: instance.private_ip.unwrap_or_else(|| "-".to_string()),
    });
    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::empty())
        .with(tabled::settings::Padding::new(0, 1, 0, 0))
        .to_string();
    println!("{}", table);
    Ok(())
}
