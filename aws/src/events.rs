// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CloudWatch Events rule toggling.

use async_trait::async_trait;
use onyx_common::Error;
use onyx_core::provider::EventRuleApi;

use crate::AwsClients;
use crate::provider_error;

#[async_trait]
impl EventRuleApi for AwsClients {
    async fn enable_rule(&self, name: &str) -> Result<(), Error> {
        self.events
            .enable_rule()
            .name(name)
            .send()
            .await
            .map_err(|err| provider_error("enabling rule", err))?;
        Ok(())
    }

    async fn disable_rule(&self, name: &str) -> Result<(), Error> {
        self.events
            .disable_rule()
            .name(name)
            .send()
            .await
            .map_err(|err| provider_error("disabling rule", err))?;
        Ok(())
    }
}
