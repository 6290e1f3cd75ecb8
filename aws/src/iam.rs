// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identity lookup over the IAM API.

use async_trait::async_trait;
use onyx_common::Error;
use onyx_core::provider::IdentityApi;

use crate::AwsClients;
use crate::provider_error;

#[async_trait]
impl IdentityApi for AwsClients {
    async fn whoami(&self) -> Result<String, Error> {
        let output = self
            .iam
            .get_user()
            .send()
            .await
            .map_err(|err| provider_error("resolving identity", err))?;
        Ok(output
            .user()
            .map(|user| user.user_name().to_string())
            .unwrap_or_default())
    }
}
