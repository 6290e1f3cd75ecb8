// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The rule reconciliation engine.
//!
//! For each selected group: find the rules previously granted to this
//! operator for the requested ports, revoke them, then authorize fresh
//! rules bound to the operator's current public IP.  Each mutation is a
//! single provider call, the group is re-fetched and re-rendered after
//! every one, and failures are isolated per group and aggregated at the
//! end of the run.

use onyx_common::Error;
use onyx_common::model::GroupFilter;
use onyx_common::model::IngressRule;
use onyx_common::model::RuleRequest;
use onyx_common::model::SecurityGroup;
use onyx_common::rules::RuleCatalog;
use slog::Logger;
use slog::error;
use slog::info;
use slog::warn;

use crate::display;
use crate::display::Styles;
use crate::provider::IdentityApi;
use crate::provider::Prompter;
use crate::provider::PublicIpSource;
use crate::provider::SecurityGroupApi;
use crate::selection;

/// One authorize/revoke invocation, fully resolved from the CLI flags.
/// Immutable for the duration of the run.
#[derive(Debug, Clone)]
pub struct ChangeRequest {
    /// Environment name, or a literal `sg-` id.
    pub target: String,
    /// Symbolic rule-type names to resolve through the catalog.
    pub types: Vec<String>,
    /// Explicit ports, unioned with the resolved types.
    pub ports: Vec<u16>,
    /// Raw `key=value` filters.
    pub filters: Vec<String>,
    pub skip_choice: bool,
    /// When false, only the revoke half runs.
    pub authorize: bool,
}

/// The reconciler and its capabilities.  One value serves one invocation.
pub struct Reconciler<'a> {
    pub groups: &'a dyn SecurityGroupApi,
    pub identity: &'a dyn IdentityApi,
    pub public_ip: &'a dyn PublicIpSource,
    pub catalog: &'a RuleCatalog,
    pub styles: Styles,
}

impl Reconciler<'_> {
    /// Runs one authorize/revoke invocation end to end.
    ///
    /// Validation failures (unknown type, bad identity, empty port set)
    /// abort before any mutation.  An empty selection is a soft success.
    /// Per-group mutation failures are logged, the loop continues, and the
    /// run ends with [`Error::GroupsFailed`] naming the failed groups.
    pub async fn run(
        &self,
        request: &ChangeRequest,
        prompter: &mut dyn Prompter,
        log: &Logger,
    ) -> Result<(), Error> {
        let filters = GroupFilter::parse_all(&request.filters);

        let mut ports_to_update = self.catalog.resolve_types(&request.types)?;
        ports_to_update.extend(request.ports.iter().copied());
        if ports_to_update.is_empty() {
            return Err(Error::NoPortsToAuthorize);
        }

        let identity = self.identity.whoami().await?;
        let identity = identity.trim().to_string();
        if identity.len() < 3 {
            return Err(Error::InvalidUser);
        }

        let selection = selection::select_groups(
            self.groups,
            prompter,
            self.catalog,
            &request.target,
            &filters,
            request.skip_choice,
            &ports_to_update,
            log,
        )
        .await?;
        if selection.is_empty() {
            warn!(log, "no security group matched; exiting");
            return Ok(());
        }

        // One public IP per invocation: every rule created below shares the
        // same CIDR even if the outbound IP changes mid-run.
        let cidr = self.public_ip.current_cidr(log).await?;

        let mut failed_groups: Vec<String> = Vec::new();
        for (group_id, selected) in &selection {
            info!(
                log,
                "processing ports {:?} for {} ({})",
                selected.ports.iter().collect::<Vec<_>>(),
                selected.group.name,
                group_id
            );

            let requests: Vec<RuleRequest> = selected
                .ports
                .iter()
                .map(|port| RuleRequest::new(*port, &identity))
                .collect();

            let owned = selected.group.owned_rules(&requests);
            let mut group_failed = false;
            if !owned.is_empty() {
                if let Err(err) =
                    self.revoke(group_id, &selected.group, &owned, log).await
                {
                    error!(
                        log,
                        "error revoking rules for {} ({}): {}",
                        selected.group.name,
                        group_id,
                        err
                    );
                    group_failed = true;
                }
            }

            // A failed revoke does not block the authorize attempt for the
            // same group; the group is still reported as failed.
            if request.authorize {
                if let Err(err) = self.authorize(group_id, &requests, &cidr, log).await {
                    error!(
                        log,
                        "error authorizing rules for {} ({}): {}",
                        selected.group.name,
                        group_id,
                        err
                    );
                    group_failed = true;
                }
            }

            if group_failed {
                failed_groups.push(group_id.clone());
            }
        }

        if failed_groups.is_empty() {
            Ok(())
        } else {
            Err(Error::GroupsFailed { groups: failed_groups })
        }
    }

    /// Shows the pending removals, revokes them, then re-fetches and
    /// re-renders the group.
    async fn revoke(
        &self,
        group_id: &str,
        group: &SecurityGroup,
        owned: &[IngressRule],
        log: &Logger,
    ) -> Result<(), Error> {
        let changed: Vec<display::ChangedRuleKey> =
            owned.iter().map(|rule| (rule.description.clone(), rule.port)).collect();
        display::print_group(group, &changed, true, &self.styles);

        info!(log, "revoking old rules for {group_id}");
        let applied = self.groups.revoke_ingress(group_id, owned).await?;

        let refreshed = self.groups.get(group_id).await?;
        display::print_group(&refreshed, &[], false, &self.styles);

        if applied {
            info!(log, "revoked old rules for {group_id}");
            Ok(())
        } else {
            Err(Error::RevokeFailed { group: group_id.to_string() })
        }
    }

    /// Authorizes the full candidate list, then re-fetches and renders the
    /// group with the new rules highlighted.
    async fn authorize(
        &self,
        group_id: &str,
        requests: &[RuleRequest],
        cidr: &str,
        log: &Logger,
    ) -> Result<(), Error> {
        info!(log, "authorizing new rules for {group_id}");
        self.groups.authorize_ingress(group_id, requests, cidr).await?;
        info!(log, "authorized new rules for {group_id}");

        let refreshed = self.groups.get(group_id).await?;
        let changed: Vec<display::ChangedRuleKey> =
            requests.iter().map(|request| (request.description(), request.port)).collect();
        display::print_group(&refreshed, &changed, false, &self.styles);
        Ok(())
    }
}
