// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! AWS SDK implementations of the provider traits in `onyx-core`.
//!
//! One [`AwsClients`] value is built per process and implements every
//! capability the core logic consumes.  No retries are layered on top of
//! the SDK: every provider error surfaces immediately.

use aws_config::BehaviorVersion;
use aws_config::Region;
use onyx_common::Error;

mod ec2;
mod ecs;
mod events;
mod iam;
mod public_ip;
mod scaling;

pub use public_ip::HttpPublicIp;

const DEFAULT_REGION: &str = "us-east-1";

/// Service clients sharing one resolved SDK configuration.
pub struct AwsClients {
    ec2: aws_sdk_ec2::Client,
    ecs: aws_sdk_ecs::Client,
    iam: aws_sdk_iam::Client,
    events: aws_sdk_cloudwatchevents::Client,
    scaling: aws_sdk_applicationautoscaling::Client,
}

impl AwsClients {
    /// Loads the ambient AWS configuration (credentials, profiles, IMDS)
    /// and builds one client per service.
    pub async fn new(region: Option<String>) -> AwsClients {
        let region = Region::new(region.unwrap_or_else(|| DEFAULT_REGION.to_string()));
        let config =
            aws_config::defaults(BehaviorVersion::latest()).region(region).load().await;
        AwsClients {
            ec2: aws_sdk_ec2::Client::new(&config),
            ecs: aws_sdk_ecs::Client::new(&config),
            iam: aws_sdk_iam::Client::new(&config),
            events: aws_sdk_cloudwatchevents::Client::new(&config),
            scaling: aws_sdk_applicationautoscaling::Client::new(&config),
        }
    }
}

/// Wraps an SDK error with a one-line description of the failed call.
pub(crate) fn provider_error(
    context: &'static str,
    err: impl std::error::Error + Send + Sync + 'static,
) -> Error {
    Error::Provider(anyhow::Error::new(err).context(context))
}
