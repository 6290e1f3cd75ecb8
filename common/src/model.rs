// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Security-group model types.
//!
//! `SecurityGroup` and `IngressRule` are value snapshots of provider state:
//! they are rebuilt from scratch on every discovery or refresh call and are
//! never patched in place after a mutation.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Tag whose comma-separated value names the catalog types a group is
/// permitted to receive.
pub const ALLOWED_RULES_TAG: &str = "onyx:rules";

/// Prefix that marks an input as a literal security-group id rather than an
/// environment name.
pub const GROUP_ID_PREFIX: &str = "sg-";

const APPROVAL_TAG_PREFIX: &str = "[Onyx approved] User: ";

/// A snapshot of one security group and its ingress rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroup {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: BTreeMap<String, String>,
    pub rules: Vec<IngressRule>,
    /// Catalog types this group may receive, parsed from `onyx:rules`.
    pub allowed_rule_types: BTreeSet<String>,
}

impl SecurityGroup {
    pub fn new(
        id: String,
        name: String,
        description: String,
        tags: BTreeMap<String, String>,
        rules: Vec<IngressRule>,
    ) -> SecurityGroup {
        let allowed_rule_types = tags
            .get(ALLOWED_RULES_TAG)
            .map(|value| {
                value
                    .split(',')
                    .map(|rule_type| rule_type.trim().to_string())
                    .filter(|rule_type| !rule_type.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        SecurityGroup { id, name, description, tags, rules, allowed_rule_types }
    }

    /// Returns the existing rules owned by the operator behind `requests`,
    /// i.e. the rules a fresh authorize must first revoke.
    pub fn owned_rules(&self, requests: &[RuleRequest]) -> Vec<IngressRule> {
        self.rules
            .iter()
            .filter(|rule| requests.iter().any(|request| rule.is_owned_by(request)))
            .cloned()
            .collect()
    }
}

/// One existing ingress rule, as discovered from the provider.  `cidr`
/// holds either a CIDR block or a peer security-group id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressRule {
    pub port: u16,
    pub cidr: String,
    pub protocol: String,
    pub description: String,
}

impl IngressRule {
    /// The two-tier ownership predicate.  A rule belongs to the requesting
    /// operator if its description is exactly the canonical approval tag,
    /// or merely contains the identity (rules created before the canonical
    /// format existed).  Both tiers must stay supported.
    pub fn is_owned_by(&self, request: &RuleRequest) -> bool {
        self.port == request.port
            && (self.description == request.description()
                || self.description.contains(request.identity()))
    }
}

/// A rule the reconciler intends to create.  The CIDR is attached only at
/// authorize time, so one invocation stamps every new rule with the same
/// public IP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRequest {
    pub port: u16,
    identity: String,
}

impl RuleRequest {
    pub fn new(port: u16, identity: &str) -> RuleRequest {
        RuleRequest { port, identity: identity.to_lowercase() }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// The canonical approval tag recorded as the rule description.
    pub fn description(&self) -> String {
        format!("{}{}", APPROVAL_TAG_PREFIX, self.identity)
    }
}

/// A `key=value` pair narrowing discovered groups.  Only the `name` key is
/// honored; unknown keys are carried but ignored downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFilter {
    pub key: String,
    pub value: String,
}

impl GroupFilter {
    /// Parses `key=value`, lower-casing both halves.  Anything else yields
    /// no filter.
    pub fn parse(raw: &str) -> Option<GroupFilter> {
        match raw.split('=').collect::<Vec<_>>()[..] {
            [key, value] if !key.is_empty() && !value.is_empty() => Some(GroupFilter {
                key: key.to_lowercase(),
                value: value.to_lowercase(),
            }),
            _ => None,
        }
    }

    pub fn parse_all(raw: &[String]) -> Vec<GroupFilter> {
        raw.iter().filter_map(|filter| GroupFilter::parse(filter)).collect()
    }
}

/// One group chosen by the operator, with the ports resolved for it.
#[derive(Debug, Clone)]
pub struct SelectedGroup {
    pub group: SecurityGroup,
    pub ports: BTreeSet<u16>,
}

/// Result of operator selection, keyed by group id.
pub type Selection = BTreeMap<String, SelectedGroup>;

/// Normalizes an environment name to the title-cased form used as the
/// `Environment` tag value ("staging" becomes "Staging").
pub fn title_case(value: &str) -> String {
    let lowered = value.to_lowercase();
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
