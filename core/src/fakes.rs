// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory provider implementations shared by the core test modules.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use anyhow::anyhow;
use async_trait::async_trait;
use onyx_common::Error;
use onyx_common::model::IngressRule;
use onyx_common::model::RuleRequest;
use onyx_common::model::SecurityGroup;
use slog::Logger;

use crate::provider::ContainerInstanceSummary;
use crate::provider::EcsApi;
use crate::provider::IdentityApi;
use crate::provider::Instance;
use crate::provider::InstanceApi;
use crate::provider::Prompter;
use crate::provider::PublicIpSource;
use crate::provider::ScalingApi;
use crate::provider::ScalingTarget;
use crate::provider::SecurityGroupApi;
use crate::provider::ServiceSummary;
use crate::provider::TaskSummary;

pub(crate) fn test_logger() -> Logger {
    Logger::root(slog::Discard, slog::o!())
}

/// In-memory security-group store with per-group failure injection.
pub(crate) struct FakeCloud {
    groups: Mutex<BTreeMap<String, SecurityGroup>>,
    list_calls: AtomicUsize,
    fail_revoke: Mutex<BTreeSet<String>>,
    unapplied_revoke: Mutex<BTreeSet<String>>,
    fail_authorize: Mutex<BTreeSet<String>>,
}

impl FakeCloud {
    pub fn with_groups(groups: impl IntoIterator<Item = SecurityGroup>) -> FakeCloud {
        FakeCloud {
            groups: Mutex::new(
                groups.into_iter().map(|group| (group.id.clone(), group)).collect(),
            ),
            list_calls: AtomicUsize::new(0),
            fail_revoke: Mutex::new(BTreeSet::new()),
            unapplied_revoke: Mutex::new(BTreeSet::new()),
            fail_authorize: Mutex::new(BTreeSet::new()),
        }
    }

    /// Like `with_groups`, but tags every group with the given environment
    /// so provider-side tag filtering works.
    pub fn with_env_groups(
        env: &str,
        groups: impl IntoIterator<Item = SecurityGroup>,
    ) -> FakeCloud {
        let tagged = groups.into_iter().map(|group| {
            let mut tags = group.tags.clone();
            tags.insert("Environment".to_string(), env.to_string());
            SecurityGroup::new(group.id, group.name, group.description, tags, group.rules)
        });
        FakeCloud::with_groups(tagged)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn fail_revoke_for(&self, id: &str) {
        self.fail_revoke.lock().unwrap().insert(id.to_string());
    }

    pub fn unapplied_revoke_for(&self, id: &str) {
        self.unapplied_revoke.lock().unwrap().insert(id.to_string());
    }

    pub fn fail_authorize_for(&self, id: &str) {
        self.fail_authorize.lock().unwrap().insert(id.to_string());
    }

    pub fn rules_for(&self, id: &str) -> Vec<IngressRule> {
        self.groups.lock().unwrap()[id].rules.clone()
    }
}

#[async_trait]
impl SecurityGroupApi for FakeCloud {
    async fn list(&self, env_tag: Option<&str>) -> Result<Vec<SecurityGroup>, Error> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let groups = self.groups.lock().unwrap();
        Ok(groups
            .values()
            .filter(|group| match env_tag {
                Some(env) => group.tags.get("Environment").map(String::as_str) == Some(env),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> Result<SecurityGroup, Error> {
        self.groups
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn authorize_ingress(
        &self,
        group_id: &str,
        requests: &[RuleRequest],
        cidr: &str,
    ) -> Result<(), Error> {
        if self.fail_authorize.lock().unwrap().contains(group_id) {
            return Err(Error::Provider(anyhow!("injected authorize failure")));
        }
        let mut groups = self.groups.lock().unwrap();
        let group = groups
            .get_mut(group_id)
            .ok_or_else(|| Error::NotFound(group_id.to_string()))?;
        for request in requests {
            group.rules.push(IngressRule {
                port: request.port,
                cidr: cidr.to_string(),
                protocol: "tcp".to_string(),
                description: request.description(),
            });
        }
        Ok(())
    }

    async fn revoke_ingress(
        &self,
        group_id: &str,
        rules: &[IngressRule],
    ) -> Result<bool, Error> {
        if self.fail_revoke.lock().unwrap().contains(group_id) {
            return Err(Error::Provider(anyhow!("injected revoke failure")));
        }
        if self.unapplied_revoke.lock().unwrap().contains(group_id) {
            return Ok(false);
        }
        let mut groups = self.groups.lock().unwrap();
        let group = groups
            .get_mut(group_id)
            .ok_or_else(|| Error::NotFound(group_id.to_string()))?;
        group.rules.retain(|rule| !rules.contains(rule));
        Ok(true)
    }
}

pub(crate) struct ScriptedPrompter {
    lines: VecDeque<String>,
    prompted: bool,
}

impl ScriptedPrompter {
    pub fn new<const N: usize>(lines: [&str; N]) -> ScriptedPrompter {
        ScriptedPrompter {
            lines: lines.iter().map(|line| line.to_string()).collect(),
            prompted: false,
        }
    }

    pub fn was_prompted(&self) -> bool {
        self.prompted
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, _message: &str) -> Result<String, Error> {
        self.prompted = true;
        self.lines
            .pop_front()
            .ok_or_else(|| Error::Provider(anyhow!("no scripted input left")))
    }
}

pub(crate) struct FakeIdentity(pub String);

#[async_trait]
impl IdentityApi for FakeIdentity {
    async fn whoami(&self) -> Result<String, Error> {
        Ok(self.0.clone())
    }
}

pub(crate) struct FakePublicIp {
    cidr: String,
    fetches: AtomicUsize,
}

impl FakePublicIp {
    pub fn new(cidr: &str) -> FakePublicIp {
        FakePublicIp { cidr: cidr.to_string(), fetches: AtomicUsize::new(0) }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PublicIpSource for FakePublicIp {
    async fn current_cidr(&self, _log: &Logger) -> Result<String, Error> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.cidr.clone())
    }
}

/// In-memory ECS control plane: a single cluster's services, tasks, and
/// container instances, with mutation recording.
#[derive(Default)]
pub(crate) struct FakeEcs {
    pub clusters: Vec<String>,
    pub services: Vec<ServiceSummary>,
    pub tasks: Vec<TaskSummary>,
    pub container_instances: Vec<ContainerInstanceSummary>,
    pub describe_chunk_sizes: Mutex<Vec<usize>>,
    pub restarted: Mutex<Vec<String>>,
    pub desired_counts: Mutex<Vec<(String, i32)>>,
    pub agent_updates: Mutex<Vec<(String, String)>>,
    pub fail_restart: BTreeSet<String>,
    pub fail_agent_update: BTreeSet<String>,
    pub fail_desired_count: BTreeSet<String>,
}

#[async_trait]
impl EcsApi for FakeEcs {
    async fn list_cluster_arns(&self) -> Result<Vec<String>, Error> {
        Ok(self.clusters.clone())
    }

    async fn list_service_arns(&self, _cluster: &str) -> Result<Vec<String>, Error> {
        Ok(self.services.iter().map(|service| service.arn.clone()).collect())
    }

    async fn describe_services(
        &self,
        _cluster: &str,
        service_arns: &[String],
    ) -> Result<Vec<ServiceSummary>, Error> {
        self.describe_chunk_sizes.lock().unwrap().push(service_arns.len());
        Ok(self
            .services
            .iter()
            .filter(|service| service_arns.contains(&service.arn))
            .cloned()
            .collect())
    }

    async fn list_task_arns(
        &self,
        _cluster: &str,
        service: &str,
    ) -> Result<Vec<String>, Error> {
        let task_definition = self
            .services
            .iter()
            .find(|summary| summary.name == service)
            .map(|summary| summary.task_definition.clone())
            .unwrap_or_default();
        Ok(self
            .tasks
            .iter()
            .filter(|task| task.task_definition == task_definition)
            .map(|task| task.arn.clone())
            .collect())
    }

    async fn describe_tasks(
        &self,
        _cluster: &str,
        task_arns: &[String],
    ) -> Result<Vec<TaskSummary>, Error> {
        Ok(self
            .tasks
            .iter()
            .filter(|task| task_arns.contains(&task.arn))
            .cloned()
            .collect())
    }

    async fn describe_container_instances(
        &self,
        _cluster: &str,
        container_instance_arns: &[String],
    ) -> Result<Vec<ContainerInstanceSummary>, Error> {
        Ok(self
            .container_instances
            .iter()
            .filter(|instance| container_instance_arns.contains(&instance.arn))
            .cloned()
            .collect())
    }

    async fn list_container_instance_arns(
        &self,
        _cluster: &str,
    ) -> Result<Vec<String>, Error> {
        Ok(self.container_instances.iter().map(|ci| ci.arn.clone()).collect())
    }

    async fn update_container_agent(
        &self,
        cluster: &str,
        container_instance_arn: &str,
    ) -> Result<(), Error> {
        if self.fail_agent_update.contains(container_instance_arn) {
            return Err(Error::Provider(anyhow!("injected agent update failure")));
        }
        self.agent_updates
            .lock()
            .unwrap()
            .push((cluster.to_string(), container_instance_arn.to_string()));
        Ok(())
    }

    async fn restart_service(&self, _cluster: &str, service: &str) -> Result<(), Error> {
        if self.fail_restart.contains(service) {
            return Err(Error::Provider(anyhow!("injected restart failure")));
        }
        self.restarted.lock().unwrap().push(service.to_string());
        Ok(())
    }

    async fn set_desired_count(
        &self,
        _cluster: &str,
        service: &str,
        desired_count: i32,
    ) -> Result<(), Error> {
        if self.fail_desired_count.contains(service) {
            return Err(Error::Provider(anyhow!("injected desired-count failure")));
        }
        self.desired_counts.lock().unwrap().push((service.to_string(), desired_count));
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeInstances {
    pub instances: Vec<Instance>,
}

#[async_trait]
impl InstanceApi for FakeInstances {
    async fn describe(&self, instance_ids: &[String]) -> Result<Vec<Instance>, Error> {
        Ok(self
            .instances
            .iter()
            .filter(|instance| instance_ids.contains(&instance.id))
            .cloned()
            .collect())
    }

    async fn start(&self, _instance_id: &str) -> Result<(), Error> {
        Ok(())
    }

    async fn stop(&self, _instance_id: &str) -> Result<(), Error> {
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeScaling {
    pub registered: Mutex<Vec<ScalingTarget>>,
    pub fail_for: BTreeSet<String>,
}

#[async_trait]
impl ScalingApi for FakeScaling {
    async fn register_ecs_target(&self, target: &ScalingTarget) -> Result<(), Error> {
        if self.fail_for.contains(&target.service) {
            return Err(Error::Provider(anyhow!("injected registration failure")));
        }
        self.registered.lock().unwrap().push(target.clone());
        Ok(())
    }
}
