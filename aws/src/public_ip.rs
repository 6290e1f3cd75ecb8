// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Public-IP discovery over an ordered list of HTTP fallback endpoints.

use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use onyx_common::Error;
use onyx_core::provider::PublicIpSource;
use slog::Logger;
use slog::error;
use slog::info;
use slog::warn;

const PUBLIC_IP_SOURCES: [&str; 4] = [
    "https://api.ipify.org?format=text",
    "https://api64.ipify.org/?format=text",
    "https://www.ipify.org",
    "https://myexternalip.com/raw",
];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Tries each source in order; the first response that parses as an IPv4
/// address wins.  Security-group IP ranges are v4 CIDRs, so a v6-only
/// answer is skipped rather than turned into a bogus `/32`.
pub struct HttpPublicIp {
    client: reqwest::Client,
}

impl HttpPublicIp {
    pub fn new() -> Result<HttpPublicIp, Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| Error::Provider(err.into()))?;
        Ok(HttpPublicIp { client })
    }
}

#[async_trait]
impl PublicIpSource for HttpPublicIp {
    async fn current_cidr(&self, log: &Logger) -> Result<String, Error> {
        for source in PUBLIC_IP_SOURCES {
            info!(log, "getting IP address from {source}");
            let response = match self.client.get(source).send().await {
                Ok(response) => response,
                Err(err) => {
                    error!(log, "unable to get ip from {source}: {err}");
                    continue;
                }
            };
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    error!(log, "unable to read ip from {source}: {err}");
                    continue;
                }
            };
            match body.trim().parse::<Ipv4Addr>() {
                Ok(ip) => {
                    let cidr = format!("{ip}/32");
                    info!(log, "authorizing for CIDR: {cidr}");
                    return Ok(cidr);
                }
                Err(_) => {
                    warn!(log, "response from {source} is not an IPv4 address");
                }
            }
        }
        Err(Error::PublicIpUnavailable)
    }
}
