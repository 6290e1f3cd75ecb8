// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ECS capability over the ECS API.

use async_trait::async_trait;
use aws_sdk_ecs::types::SchedulingStrategy;
use onyx_common::Error;
use onyx_core::provider::ContainerInstanceSummary;
use onyx_core::provider::EcsApi;
use onyx_core::provider::ServiceSummary;
use onyx_core::provider::TaskSummary;

use crate::AwsClients;
use crate::provider_error;

#[async_trait]
impl EcsApi for AwsClients {
    async fn list_cluster_arns(&self) -> Result<Vec<String>, Error> {
        let output = self
            .ecs
            .list_clusters()
            .send()
            .await
            .map_err(|err| provider_error("listing clusters", err))?;
        Ok(output.cluster_arns().to_vec())
    }

    async fn list_service_arns(&self, cluster: &str) -> Result<Vec<String>, Error> {
        let mut arns = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .ecs
                .list_services()
                .cluster(cluster)
                .scheduling_strategy(SchedulingStrategy::Replica)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|err| provider_error("listing services", err))?;
            arns.extend(output.service_arns().iter().cloned());
            next_token = output.next_token().map(str::to_string);
            if next_token.is_none() {
                break;
            }
        }
        Ok(arns)
    }

    async fn describe_services(
        &self,
        cluster: &str,
        service_arns: &[String],
    ) -> Result<Vec<ServiceSummary>, Error> {
        let output = self
            .ecs
            .describe_services()
            .cluster(cluster)
            .set_services(Some(service_arns.to_vec()))
            .send()
            .await
            .map_err(|err| provider_error("describing services", err))?;
        Ok(output
            .services()
            .iter()
            .filter_map(|service| {
                Some(ServiceSummary {
                    arn: service.service_arn()?.to_string(),
                    name: service.service_name()?.to_string(),
                    task_definition: service.task_definition()?.to_string(),
                })
            })
            .collect())
    }

    async fn list_task_arns(
        &self,
        cluster: &str,
        service: &str,
    ) -> Result<Vec<String>, Error> {
        let output = self
            .ecs
            .list_tasks()
            .cluster(cluster)
            .service_name(service)
            .send()
            .await
            .map_err(|err| provider_error("listing tasks", err))?;
        Ok(output.task_arns().to_vec())
    }

    async fn describe_tasks(
        &self,
        cluster: &str,
        task_arns: &[String],
    ) -> Result<Vec<TaskSummary>, Error> {
        let output = self
            .ecs
            .describe_tasks()
            .cluster(cluster)
            .set_tasks(Some(task_arns.to_vec()))
            .send()
            .await
            .map_err(|err| provider_error("describing tasks", err))?;
        Ok(output
            .tasks()
            .iter()
            .filter_map(|task| {
                Some(TaskSummary {
                    arn: task.task_arn()?.to_string(),
                    task_definition: task.task_definition_arn()?.to_string(),
                    container_instance_arn: task
                        .container_instance_arn()
                        .map(str::to_string),
                })
            })
            .collect())
    }

    async fn describe_container_instances(
        &self,
        cluster: &str,
        container_instance_arns: &[String],
    ) -> Result<Vec<ContainerInstanceSummary>, Error> {
        let output = self
            .ecs
            .describe_container_instances()
            .cluster(cluster)
            .set_container_instances(Some(container_instance_arns.to_vec()))
            .send()
            .await
            .map_err(|err| provider_error("describing container instances", err))?;
        Ok(output
            .container_instances()
            .iter()
            .filter_map(|ci| {
                Some(ContainerInstanceSummary {
                    arn: ci.container_instance_arn()?.to_string(),
                    instance_id: ci.ec2_instance_id()?.to_string(),
                })
            })
            .collect())
    }

    async fn list_container_instance_arns(
        &self,
        cluster: &str,
    ) -> Result<Vec<String>, Error> {
        let output = self
            .ecs
            .list_container_instances()
            .cluster(cluster)
            .send()
            .await
            .map_err(|err| provider_error("listing container instances", err))?;
        Ok(output.container_instance_arns().to_vec())
    }

    async fn update_container_agent(
        &self,
        cluster: &str,
        container_instance_arn: &str,
    ) -> Result<(), Error> {
        self.ecs
            .update_container_agent()
            .cluster(cluster)
            .container_instance(container_instance_arn)
            .send()
            .await
            .map_err(|err| provider_error("updating container agent", err))?;
        Ok(())
    }

    async fn restart_service(&self, cluster: &str, service: &str) -> Result<(), Error> {
        self.ecs
            .update_service()
            .cluster(cluster)
            .service(service)
            .force_new_deployment(true)
            .send()
            .await
            .map_err(|err| provider_error("restarting service", err))?;
        Ok(())
    }

    async fn set_desired_count(
        &self,
        cluster: &str,
        service: &str,
        desired_count: i32,
    ) -> Result<(), Error> {
        self.ecs
            .update_service()
            .cluster(cluster)
            .service(service)
            .desired_count(desired_count)
            .send()
            .await
            .map_err(|err| provider_error("updating desired count", err))?;
        Ok(())
    }
}
