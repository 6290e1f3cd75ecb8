// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operational error type used across the workspace.
//!
//! Validation errors (`InvalidRuleType`, `InvalidUser`, `NoPortsToAuthorize`)
//! are always raised before any mutation happens.  Per-group mutation
//! failures are collected by the reconciler and surfaced at the end of the
//! run as `GroupsFailed`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A rule-type name not present in the rule catalog.
    #[error("invalid rule type {name:?}. Allowed values: {allowed}")]
    InvalidRuleType { name: String, allowed: String },

    /// The resolved identity was empty or implausibly short.
    #[error("invalid user")]
    InvalidUser,

    /// The union of resolved types and explicit ports was empty.
    #[error("no ports to authorize")]
    NoPortsToAuthorize,

    /// Operator selection finished without any group gaining a port.
    #[error("no rules to apply")]
    NoRulesToApply,

    /// No security group with the requested id.
    #[error("security group {0:?} not found")]
    NotFound(String),

    /// The provider reported that a revoke was not applied.
    #[error("unable to revoke old rules for {group}")]
    RevokeFailed { group: String },

    /// Empty or unparseable interactive input.
    #[error("invalid choice")]
    InvalidSelection,

    /// Every public-IP source in the fallback chain failed.
    #[error("unable to determine public ip")]
    PublicIpUnavailable,

    /// No ECS service ended up selected for a restart.
    #[error("no services to restart")]
    NoServicesToRestart,

    /// One or more groups failed to reconcile; the rest were processed.
    #[error("failed to reconcile security groups: {}", .groups.join(", "))]
    GroupsFailed { groups: Vec<String> },

    /// An error from the underlying cloud provider or transport.
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}
