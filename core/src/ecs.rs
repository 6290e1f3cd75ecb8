// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ECS cluster inspection and service restarts.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use onyx_common::Error;
use slog::Logger;
use slog::error;
use slog::info;
use slog::warn;

use crate::provider::EcsApi;
use crate::provider::InstanceApi;
use crate::provider::Prompter;

/// `DescribeServices` accepts a bounded batch of ARNs per call.
const DESCRIBE_SERVICES_CHUNK: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceView {
    pub name: String,
    /// Private IPs of the instances the service's tasks run on.
    pub task_ips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterView {
    pub cluster: String,
    pub services: Vec<ServiceView>,
}

/// Resolves a cluster's services down to the private IPs of the EC2
/// instances their tasks are placed on.  `service_filter` is a substring
/// match on the service ARN; empty means every replica service.
pub async fn describe_cluster(
    ecs: &dyn EcsApi,
    instances: &dyn InstanceApi,
    cluster: &str,
    service_filter: &str,
    log: &Logger,
) -> Result<ClusterView, Error> {
    if service_filter.is_empty() {
        warn!(
            log,
            "no service name given; this results in a large query, \
             consider narrowing the search"
        );
    }

    let all_arns = ecs.list_service_arns(cluster).await?;
    let wanted_arns: Vec<String> = if service_filter.is_empty() {
        all_arns
    } else {
        all_arns.into_iter().filter(|arn| arn.contains(service_filter)).collect()
    };

    let mut services = Vec::new();
    for chunk in wanted_arns.chunks(DESCRIBE_SERVICES_CHUNK) {
        services.extend(ecs.describe_services(cluster, chunk).await?);
    }

    let mut task_arns = Vec::new();
    for service in &services {
        task_arns.extend(ecs.list_task_arns(cluster, &service.name).await?);
    }
    let tasks = if task_arns.is_empty() {
        Vec::new()
    } else {
        ecs.describe_tasks(cluster, &task_arns).await?
    };

    let container_instance_arns: Vec<String> = tasks
        .iter()
        .filter_map(|task| task.container_instance_arn.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let container_instances = if container_instance_arns.is_empty() {
        Vec::new()
    } else {
        ecs.describe_container_instances(cluster, &container_instance_arns).await?
    };

    let instance_ids: Vec<String> =
        container_instances.iter().map(|ci| ci.instance_id.clone()).collect();
    let instance_details = if instance_ids.is_empty() {
        Vec::new()
    } else {
        instances.describe(&instance_ids).await?
    };

    let instance_by_id: BTreeMap<&str, _> = instance_details
        .iter()
        .map(|instance| (instance.id.as_str(), instance))
        .collect();
    let instance_id_by_ci_arn: BTreeMap<&str, &str> = container_instances
        .iter()
        .map(|ci| (ci.arn.as_str(), ci.instance_id.as_str()))
        .collect();

    let views = services
        .iter()
        .map(|service| ServiceView {
            name: service.name.clone(),
            task_ips: tasks
                .iter()
                .filter(|task| task.task_definition == service.task_definition)
                .filter_map(|task| task.container_instance_arn.as_deref())
                .filter_map(|ci_arn| instance_id_by_ci_arn.get(ci_arn).copied())
                .filter_map(|instance_id| instance_by_id.get(instance_id).copied())
                .filter_map(|instance| instance.private_ip.clone())
                .collect(),
        })
        .collect();

    Ok(ClusterView { cluster: cluster.to_string(), services: views })
}

pub fn render_cluster(view: &ClusterView) -> String {
    let mut out = String::new();
    out.push_str(&format!("Cluster name: {}\n", view.cluster));
    for service in &view.services {
        out.push_str(&format!("Service Name: {}\n", service.name));
        out.push_str("  Tasks:\n");
        for ip in &service.task_ips {
            out.push_str(&format!("    IP: {}\n", ip));
        }
    }
    out
}

/// Forces a new deployment of one or more services.  With an explicit
/// service name the restart is immediate; otherwise the operator picks from
/// a numbered list with comma-separated indices.  Per-service failures are
/// logged and the loop continues.
pub async fn restart_services(
    ecs: &dyn EcsApi,
    prompter: &mut dyn Prompter,
    cluster: &str,
    service: &str,
    log: &Logger,
) -> Result<(), Error> {
    let selected: BTreeSet<String> = if service.is_empty() {
        let arns = ecs.list_service_arns(cluster).await?;
        let mut services = Vec::new();
        for chunk in arns.chunks(DESCRIBE_SERVICES_CHUNK) {
            services.extend(ecs.describe_services(cluster, chunk).await?);
        }

        println!("Cluster Name: {}", cluster);
        println!("Select service(s) to restart:");
        for (index, summary) in services.iter().enumerate() {
            println!("{} : {}", index, summary.name);
        }

        let line = prompter.read_line("Enter choice: ")?;
        let line = line.trim();
        if line.is_empty() {
            return Err(Error::InvalidSelection);
        }

        line.split(',')
            .filter_map(|token| token.trim().parse::<usize>().ok())
            .filter_map(|index| services.get(index))
            .map(|summary| summary.name.clone())
            .collect()
    } else {
        BTreeSet::from([service.to_string()])
    };

    if selected.is_empty() {
        return Err(Error::NoServicesToRestart);
    }

    for name in &selected {
        match ecs.restart_service(cluster, name).await {
            Ok(()) => info!(log, "restarted {name}"),
            Err(err) => error!(log, "unable to restart {name}: {err}"),
        }
    }

    Ok(())
}

/// Updates the ECS agent on every container instance of every cluster.
/// The agent may already be current or mid-update; those provider errors
/// are logged per instance and the walk continues.
pub async fn update_container_agents(
    ecs: &dyn EcsApi,
    log: &Logger,
) -> Result<(), Error> {
    for cluster in ecs.list_cluster_arns().await? {
        let instance_arns = ecs.list_container_instance_arns(&cluster).await?;
        info!(
            log,
            "updating agents on {} container instances of {cluster}",
            instance_arns.len()
        );
        for arn in &instance_arns {
            match ecs.update_container_agent(&cluster, arn).await {
                Ok(()) => info!(log, "updated agent on {arn}"),
                Err(err) => error!(log, "unable to update agent on {arn}: {err}"),
            }
        }
    }
    Ok(())
}
