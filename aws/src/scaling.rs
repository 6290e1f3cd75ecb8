// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Application-autoscaling registration for ECS services.

use async_trait::async_trait;
use aws_sdk_applicationautoscaling::types::ScalableDimension;
use aws_sdk_applicationautoscaling::types::ServiceNamespace;
use aws_sdk_applicationautoscaling::types::SuspendedState;
use onyx_common::Error;
use onyx_core::provider::ScalingApi;
use onyx_core::provider::ScalingTarget;

use crate::AwsClients;
use crate::provider_error;

#[async_trait]
impl ScalingApi for AwsClients {
    async fn register_ecs_target(&self, target: &ScalingTarget) -> Result<(), Error> {
        self.scaling
            .register_scalable_target()
            .service_namespace(ServiceNamespace::Ecs)
            .scalable_dimension(ScalableDimension::EcsServiceDesiredCount)
            .resource_id(target.resource_id())
            .min_capacity(target.min_capacity)
            .max_capacity(target.max_capacity)
            .suspended_state(
                SuspendedState::builder()
                    .dynamic_scaling_in_suspended(false)
                    .dynamic_scaling_out_suspended(target.suspend_scaling)
                    .scheduled_scaling_suspended(target.suspend_scaling)
                    .build(),
            )
            .send()
            .await
            .map_err(|err| provider_error("registering scalable target", err))?;
        Ok(())
    }
}
