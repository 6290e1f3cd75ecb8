// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Security-group and instance capabilities over the EC2 API.

use std::collections::BTreeMap;

use async_trait::async_trait;
use aws_sdk_ec2::error::ProvideErrorMetadata;
use aws_sdk_ec2::types::Filter;
use aws_sdk_ec2::types::IpPermission;
use aws_sdk_ec2::types::IpRange;
use onyx_common::Error;
use onyx_common::model::IngressRule;
use onyx_common::model::RuleRequest;
use onyx_common::model::SecurityGroup;
use onyx_core::provider::Instance;
use onyx_core::provider::InstanceApi;
use onyx_core::provider::SecurityGroupApi;

use crate::AwsClients;
use crate::provider_error;

const ENVIRONMENT_TAG: &str = "tag:Environment";
const GROUP_NOT_FOUND_CODE: &str = "InvalidGroup.NotFound";

#[async_trait]
impl SecurityGroupApi for AwsClients {
    async fn list(&self, env_tag: Option<&str>) -> Result<Vec<SecurityGroup>, Error> {
        let mut request = self.ec2.describe_security_groups();
        if let Some(env) = env_tag {
            request = request
                .filters(Filter::builder().name(ENVIRONMENT_TAG).values(env).build());
        }
        let output = request
            .send()
            .await
            .map_err(|err| provider_error("listing security groups", err))?;
        Ok(output.security_groups().iter().map(convert_group).collect())
    }

    async fn get(&self, id: &str) -> Result<SecurityGroup, Error> {
        let output = self
            .ec2
            .describe_security_groups()
            .group_ids(id)
            .send()
            .await
            .map_err(|err| {
                if err.code() == Some(GROUP_NOT_FOUND_CODE) {
                    Error::NotFound(id.to_string())
                } else {
                    provider_error("describing security group", err)
                }
            })?;
        output
            .security_groups()
            .first()
            .map(convert_group)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn authorize_ingress(
        &self,
        group_id: &str,
        requests: &[RuleRequest],
        cidr: &str,
    ) -> Result<(), Error> {
        let permissions: Vec<IpPermission> = requests
            .iter()
            .map(|request| {
                IpPermission::builder()
                    .from_port(i32::from(request.port))
                    .to_port(i32::from(request.port))
                    .ip_protocol("tcp")
                    .ip_ranges(
                        IpRange::builder()
                            .cidr_ip(cidr)
                            .description(request.description())
                            .build(),
                    )
                    .build()
            })
            .collect();

        self.ec2
            .authorize_security_group_ingress()
            .group_id(group_id)
            .set_ip_permissions(Some(permissions))
            .send()
            .await
            .map_err(|err| provider_error("authorizing ingress rules", err))?;
        Ok(())
    }

    async fn revoke_ingress(
        &self,
        group_id: &str,
        rules: &[IngressRule],
    ) -> Result<bool, Error> {
        // One permission per port, carrying every range revoked on it.
        let mut ranges_by_port: BTreeMap<u16, Vec<IpRange>> = BTreeMap::new();
        for rule in rules {
            ranges_by_port.entry(rule.port).or_default().push(
                IpRange::builder()
                    .cidr_ip(&rule.cidr)
                    .description(&rule.description)
                    .build(),
            );
        }
        let permissions: Vec<IpPermission> = ranges_by_port
            .into_iter()
            .map(|(port, ranges)| {
                IpPermission::builder()
                    .from_port(i32::from(port))
                    .to_port(i32::from(port))
                    .ip_protocol("tcp")
                    .set_ip_ranges(Some(ranges))
                    .build()
            })
            .collect();

        let output = self
            .ec2
            .revoke_security_group_ingress()
            .group_id(group_id)
            .set_ip_permissions(Some(permissions))
            .send()
            .await
            .map_err(|err| provider_error("revoking ingress rules", err))?;
        Ok(output.r#return().unwrap_or(false))
    }
}

fn convert_group(raw: &aws_sdk_ec2::types::SecurityGroup) -> SecurityGroup {
    let mut rules = Vec::new();
    for permission in raw.ip_permissions() {
        let Some(port) =
            permission.from_port().and_then(|port| u16::try_from(port).ok())
        else {
            // "-1" permissions (all traffic) carry no meaningful port.
            continue;
        };
        let protocol = permission.ip_protocol().unwrap_or("tcp").to_string();
        for range in permission.ip_ranges() {
            rules.push(IngressRule {
                port,
                cidr: range.cidr_ip().unwrap_or_default().to_string(),
                protocol: protocol.clone(),
                description: range.description().unwrap_or_default().to_string(),
            });
        }
        for pair in permission.user_id_group_pairs() {
            rules.push(IngressRule {
                port,
                cidr: pair.group_id().unwrap_or_default().to_string(),
                protocol: protocol.clone(),
                description: pair.description().unwrap_or_default().to_string(),
            });
        }
    }

    let tags: BTreeMap<String, String> = raw
        .tags()
        .iter()
        .filter_map(|tag| Some((tag.key()?.to_string(), tag.value()?.to_string())))
        .collect();

    SecurityGroup::new(
        raw.group_id().unwrap_or_default().to_string(),
        raw.group_name().unwrap_or_default().to_string(),
        raw.description().unwrap_or_default().to_string(),
        tags,
        rules,
    )
}

#[async_trait]
impl InstanceApi for AwsClients {
    async fn describe(&self, instance_ids: &[String]) -> Result<Vec<Instance>, Error> {
        let output = self
            .ec2
            .describe_instances()
            .set_instance_ids(Some(instance_ids.to_vec()))
            .send()
            .await
            .map_err(|err| provider_error("describing instances", err))?;

        let mut instances = Vec::new();
        for reservation in output.reservations() {
            for instance in reservation.instances() {
                instances.push(Instance {
                    id: instance.instance_id().unwrap_or_default().to_string(),
                    public_ip: instance.public_ip_address().map(str::to_string),
                    private_ip: instance.private_ip_address().map(str::to_string),
                });
            }
        }
        Ok(instances)
    }

    async fn start(&self, instance_id: &str) -> Result<(), Error> {
        self.ec2
            .start_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .map_err(|err| provider_error("starting instance", err))?;
        Ok(())
    }

    async fn stop(&self, instance_id: &str) -> Result<(), Error> {
        self.ec2
            .stop_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .map_err(|err| provider_error("stopping instance", err))?;
        Ok(())
    }
}
