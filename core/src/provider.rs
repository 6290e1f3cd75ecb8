// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Provider capabilities consumed by the core logic.
//!
//! Each trait is one external capability: security-group CRUD, identity,
//! public-IP lookup, ECS, EC2 instances, CloudWatch Events rules, and
//! application autoscaling.  `onyx-aws` implements all of them against the
//! AWS SDK; tests implement them in memory.

use async_trait::async_trait;
use onyx_common::Error;
use onyx_common::model::IngressRule;
use onyx_common::model::RuleRequest;
use onyx_common::model::SecurityGroup;
use slog::Logger;

#[async_trait]
pub trait SecurityGroupApi: Send + Sync {
    /// Lists security groups, provider-side filtered by the `Environment`
    /// tag when one is given.
    async fn list(&self, env_tag: Option<&str>) -> Result<Vec<SecurityGroup>, Error>;

    /// Fetches a single group by id.  Fails with [`Error::NotFound`] when
    /// the id does not resolve.
    async fn get(&self, id: &str) -> Result<SecurityGroup, Error>;

    /// Authorizes one ingress rule per request, all bound to `cidr` and
    /// described with the request's canonical approval tag.
    async fn authorize_ingress(
        &self,
        group_id: &str,
        requests: &[RuleRequest],
        cidr: &str,
    ) -> Result<(), Error>;

    /// Revokes the given existing rules.  `Ok(false)` means the provider
    /// accepted the call but did not apply the revocation.
    async fn revoke_ingress(
        &self,
        group_id: &str,
        rules: &[IngressRule],
    ) -> Result<bool, Error>;
}

#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// The name of the calling cloud identity.
    async fn whoami(&self) -> Result<String, Error>;
}

#[async_trait]
pub trait PublicIpSource: Send + Sync {
    /// The operator's current public IP in `<ip>/32` form.
    async fn current_cidr(&self, log: &Logger) -> Result<String, Error>;
}

/// Blocking line-oriented input for interactive selection.  The CLI backs
/// this with a real terminal prompt; tests feed canned lines.
pub trait Prompter {
    fn read_line(&mut self, message: &str) -> Result<String, Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSummary {
    pub arn: String,
    pub name: String,
    pub task_definition: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummary {
    pub arn: String,
    pub task_definition: String,
    pub container_instance_arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInstanceSummary {
    pub arn: String,
    pub instance_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub id: String,
    pub public_ip: Option<String>,
    pub private_ip: Option<String>,
}

#[async_trait]
pub trait EcsApi: Send + Sync {
    /// ARNs of every cluster in the account.
    async fn list_cluster_arns(&self) -> Result<Vec<String>, Error>;

    /// All replica-service ARNs of a cluster, across pagination.
    async fn list_service_arns(&self, cluster: &str) -> Result<Vec<String>, Error>;

    async fn describe_services(
        &self,
        cluster: &str,
        service_arns: &[String],
    ) -> Result<Vec<ServiceSummary>, Error>;

    async fn list_task_arns(
        &self,
        cluster: &str,
        service: &str,
    ) -> Result<Vec<String>, Error>;

    async fn describe_tasks(
        &self,
        cluster: &str,
        task_arns: &[String],
    ) -> Result<Vec<TaskSummary>, Error>;

    async fn describe_container_instances(
        &self,
        cluster: &str,
        container_instance_arns: &[String],
    ) -> Result<Vec<ContainerInstanceSummary>, Error>;

    /// ARNs of every container instance registered to a cluster.
    async fn list_container_instance_arns(
        &self,
        cluster: &str,
    ) -> Result<Vec<String>, Error>;

    /// Updates the ECS agent on one container instance.
    async fn update_container_agent(
        &self,
        cluster: &str,
        container_instance_arn: &str,
    ) -> Result<(), Error>;

    /// Forces a new deployment of the service.
    async fn restart_service(&self, cluster: &str, service: &str) -> Result<(), Error>;

    async fn set_desired_count(
        &self,
        cluster: &str,
        service: &str,
        desired_count: i32,
    ) -> Result<(), Error>;
}

#[async_trait]
pub trait InstanceApi: Send + Sync {
    async fn describe(&self, instance_ids: &[String]) -> Result<Vec<Instance>, Error>;
    async fn start(&self, instance_id: &str) -> Result<(), Error>;
    async fn stop(&self, instance_id: &str) -> Result<(), Error>;
}

#[async_trait]
pub trait EventRuleApi: Send + Sync {
    async fn enable_rule(&self, name: &str) -> Result<(), Error>;
    async fn disable_rule(&self, name: &str) -> Result<(), Error>;
}

/// One autoscaling registration for an ECS service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalingTarget {
    pub cluster: String,
    pub service: String,
    pub min_capacity: i32,
    pub max_capacity: i32,
    /// Suspends scale-out and scheduled scaling while the fleet is parked.
    pub suspend_scaling: bool,
}

impl ScalingTarget {
    /// The application-autoscaling resource id for the service.
    pub fn resource_id(&self) -> String {
        format!("service/{}/{}", self.cluster, self.service)
    }
}

#[async_trait]
pub trait ScalingApi: Send + Sync {
    async fn register_ecs_target(&self, target: &ScalingTarget) -> Result<(), Error>;
}
