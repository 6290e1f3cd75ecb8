// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sandstorm: parking and restoring an environment's ECS fleet.
//!
//! `init` suspends scale-out and scheduled scaling for every service in the
//! fleet and drives its desired/min counts to zero; `revert` restores the
//! configured counts and resumes scaling, walking the fleet in reverse so
//! dependencies come back in the opposite order they were parked.

use std::fmt;
use std::str::FromStr;

use onyx_common::Error;
use serde::Deserialize;
use slog::Logger;
use slog::error;
use slog::info;

use crate::provider::EcsApi;
use crate::provider::ScalingApi;
use crate::provider::ScalingTarget;

/// One ECS service in the fleet, with the counts `revert` restores.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FleetService {
    pub name: String,
    pub cluster: String,
    pub desired_count: i32,
    pub min_count: i32,
    pub max_count: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandstormEvent {
    Init,
    Revert,
}

impl FromStr for SandstormEvent {
    type Err = String;

    fn from_str(value: &str) -> Result<SandstormEvent, String> {
        match value {
            "init" => Ok(SandstormEvent::Init),
            "revert" => Ok(SandstormEvent::Revert),
            other => Err(format!("invalid event {other:?} (expected init or revert)")),
        }
    }
}

impl fmt::Display for SandstormEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SandstormEvent::Init => write!(f, "init"),
            SandstormEvent::Revert => write!(f, "revert"),
        }
    }
}

/// Applies the event to every service in the fleet.  Per-service errors
/// (autoscaling registration or the desired-count update) are logged and
/// the loop continues.
pub async fn process(
    scaling: &dyn ScalingApi,
    ecs: &dyn EcsApi,
    fleet: &[FleetService],
    event: SandstormEvent,
    log: &Logger,
) -> Result<(), Error> {
    info!(log, "running sandstorm {event} on {} services", fleet.len());

    let ordered: Vec<&FleetService> = match event {
        SandstormEvent::Init => fleet.iter().collect(),
        SandstormEvent::Revert => fleet.iter().rev().collect(),
    };

    for service in ordered {
        let (desired_count, min_count) = match event {
            SandstormEvent::Init => (0, 0),
            SandstormEvent::Revert => (service.desired_count, service.min_count),
        };

        let target = ScalingTarget {
            cluster: service.cluster.clone(),
            service: service.name.clone(),
            min_capacity: min_count,
            max_capacity: service.max_count,
            suspend_scaling: event == SandstormEvent::Init,
        };
        if let Err(err) = scaling.register_ecs_target(&target).await {
            error!(
                log,
                "{event} ({desired_count}) -> {} ({}) | autoscaling error: {err}",
                service.name,
                service.cluster
            );
            continue;
        }

        match ecs.set_desired_count(&service.cluster, &service.name, desired_count).await {
            Ok(()) => {
                info!(
                    log,
                    "{event} ({desired_count}) -> {} ({})",
                    service.name,
                    service.cluster
                );
            }
            Err(err) => {
                error!(
                    log,
                    "{event} ({desired_count}) -> {} ({}) | error: {err}",
                    service.name,
                    service.cluster
                );
            }
        }
    }

    Ok(())
}
