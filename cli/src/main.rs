// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI for recurring AWS ops tasks: security-group ingress, ECS
//! restarts, fleet parking, and CloudWatch Events rule toggling.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::ColorChoice;
use clap::Parser;
use clap::Subcommand;
use onyx_aws::AwsClients;
use onyx_core::display::Styles;
use onyx_core::provider::IdentityApi;
use slog::Drain;

mod cloudwatch;
mod config;
mod ec2;
mod ecs;
mod helpers;
mod sandstorm;

use config::OnyxConfig;
use helpers::should_colorize;

#[derive(Debug, Parser)]
#[command(name = "onyx", version)]
/// Onyx: a lightweight wrapper over the AWS APIs
struct Onyx {
    /// AWS region to operate in (overrides the config file)
    #[clap(long, env = "ONYX_REGION", global = true)]
    region: Option<String>,

    /// Path to a TOML config file (extra rule types, sandstorm fleets)
    #[clap(long, env = "ONYX_CONFIG", global = true)]
    config: Option<Utf8PathBuf>,

    /// Color output
    #[clap(long, value_enum, global = true, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Log level filter
    #[clap(
        long,
        global = true,
        default_value = "info",
        value_parser = parse_log_level
    )]
    log_level: slog::Level,

    #[command(subcommand)]
    command: OnyxCommands,
}

#[derive(Debug, Subcommand)]
enum OnyxCommands {
    /// Actions on the EC2 namespace (security groups and instances)
    Ec2(ec2::Ec2Args),
    /// Actions on ECS clusters
    Ecs(ecs::EcsArgs),
    /// Enable or disable CloudWatch Events rules
    Cw(cloudwatch::CwArgs),
    /// Park or restore an environment's ECS fleet
    Sandstorm(sandstorm::SandstormArgs),
    /// Print the identity making requests
    Whoami,
}

fn parse_log_level(value: &str) -> Result<slog::Level, String> {
    value.parse().map_err(|_| format!("invalid log level: {value:?}"))
}

fn build_logger(level: slog::Level) -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog::LevelFilter::new(drain, level).fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    slog::Logger::root(drain, slog::o!())
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let onyx = Onyx::parse();
    let log = build_logger(onyx.log_level);

    let config = OnyxConfig::load(onyx.config.as_deref())?;

    let mut styles = Styles::default();
    if should_colorize(onyx.color, supports_color::Stream::Stdout) {
        styles.colorize();
    }

    let region = onyx.region.clone().or_else(|| config.region.clone());
    let clients = AwsClients::new(region).await;

    match &onyx.command {
        OnyxCommands::Ec2(args) => {
            args.run_cmd(&clients, &config, &styles, &log).await
        }
        OnyxCommands::Ecs(args) => args.run_cmd(&clients, &log).await,
        OnyxCommands::Cw(args) => args.run_cmd(&clients, &log).await,
        OnyxCommands::Sandstorm(args) => {
            args.run_cmd(&clients, &config, &log).await
        }
        OnyxCommands::Whoami => {
            let identity = clients
                .whoami()
                .await
                .context("resolving the calling identity")?;
            println!("{identity}");
            Ok(())
        }
    }
}
