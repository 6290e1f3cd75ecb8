// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operator selection: resolving an environment name or group id into the
//! set of groups to reconcile, each with its own port set.
//!
//! The interactive grammar has two mutually exclusive forms, chosen by one
//! upfront scan of the line for `:`
//!
//! ```text
//! 0:ssh,redis 2:mongo      per-group explicit rule types
//! 0,2                      plain indices, using the default port set
//! ```
//!
//! Out-of-range or unparseable indices are skipped.  Unknown type names in
//! the explicit form are skipped.  Repeated indices union their ports.

use std::collections::BTreeSet;

use onyx_common::Error;
use onyx_common::model::GROUP_ID_PREFIX;
use onyx_common::model::GroupFilter;
use onyx_common::model::SecurityGroup;
use onyx_common::model::SelectedGroup;
use onyx_common::model::Selection;
use onyx_common::rules::RuleCatalog;
use slog::Logger;
use slog::info;

use crate::discovery;
use crate::provider::Prompter;
use crate::provider::SecurityGroupApi;

/// Resolves `env_or_id` into the groups to alter.
///
/// A `sg-`-prefixed input is taken as a literal group id: no discovery, no
/// filtering, no prompt; the result carries the caller's default ports.
/// Otherwise groups are discovered by environment and filtered; a single
/// match with `skip_choice` is auto-selected, anything else goes through
/// the interactive prompt.  An empty candidate set is an empty selection,
/// not an error.
pub async fn select_groups(
    provider: &dyn SecurityGroupApi,
    prompter: &mut dyn Prompter,
    catalog: &RuleCatalog,
    env_or_id: &str,
    filters: &[GroupFilter],
    skip_choice: bool,
    default_ports: &BTreeSet<u16>,
    log: &Logger,
) -> Result<Selection, Error> {
    if env_or_id.starts_with(GROUP_ID_PREFIX) {
        let group = discovery::get_by_id(provider, env_or_id).await?;
        info!(log, "detected security group: {} ({})", group.id, group.name);
        let mut selection = Selection::new();
        selection.insert(
            group.id.clone(),
            SelectedGroup { group, ports: default_ports.clone() },
        );
        return Ok(selection);
    }

    let groups = discovery::list_by_environment(provider, env_or_id, log).await?;
    let groups = discovery::apply_filters(groups, filters);
    if groups.is_empty() {
        return Ok(Selection::new());
    }

    if groups.len() == 1 && skip_choice {
        if default_ports.is_empty() {
            return Err(Error::NoPortsToAuthorize);
        }
        let mut selection = Selection::new();
        for group in groups {
            selection.insert(
                group.id.clone(),
                SelectedGroup { group, ports: default_ports.clone() },
            );
        }
        return Ok(selection);
    }

    info!(log, "select security groups:");
    for (index, group) in groups.iter().enumerate() {
        println!("{} : {} ( {} )", index, group.id, group.name);
    }

    let line = prompter.read_line("Enter Choice: ")?;
    let selection = parse_selection(&line, &groups, catalog, default_ports)?;
    if selection.is_empty() {
        return Err(Error::NoRulesToApply);
    }

    Ok(selection)
}

/// Parses one selection line against the displayed candidate list.  Groups
/// that end up with an empty port set are dropped.
pub fn parse_selection(
    line: &str,
    groups: &[SecurityGroup],
    catalog: &RuleCatalog,
    default_ports: &BTreeSet<u16>,
) -> Result<Selection, Error> {
    let line = line.trim();
    if line.is_empty() {
        return Err(Error::InvalidSelection);
    }

    let selection = if line.contains(':') {
        parse_explicit_types(line, groups, catalog)
    } else {
        parse_plain_indices(line, groups, default_ports)
    };

    Ok(selection)
}

/// `index:type,type ...`: each chosen group gets its own resolved types.
fn parse_explicit_types(
    line: &str,
    groups: &[SecurityGroup],
    catalog: &RuleCatalog,
) -> Selection {
    let mut selection = Selection::new();
    for token in line.split_whitespace() {
        let Some((index, type_list)) = token.split_once(':') else {
            continue;
        };
        let Some(group) = parse_index(index, groups) else {
            continue;
        };

        let ports: BTreeSet<u16> = type_list
            .split(',')
            .filter_map(|name| catalog.lookup(name.trim()))
            .collect();
        if ports.is_empty() {
            continue;
        }

        selection
            .entry(group.id.clone())
            .or_insert_with(|| SelectedGroup {
                group: group.clone(),
                ports: BTreeSet::new(),
            })
            .ports
            .extend(ports);
    }
    selection
}

/// `index,index,...`: every chosen group gets the default port set.
fn parse_plain_indices(
    line: &str,
    groups: &[SecurityGroup],
    default_ports: &BTreeSet<u16>,
) -> Selection {
    let mut selection = Selection::new();
    if default_ports.is_empty() {
        return selection;
    }
    for token in line.split(',') {
        let Some(group) = parse_index(token, groups) else {
            continue;
        };
        selection.insert(
            group.id.clone(),
            SelectedGroup { group: group.clone(), ports: default_ports.clone() },
        );
    }
    selection
}

fn parse_index<'a>(token: &str, groups: &'a [SecurityGroup]) -> Option<&'a SecurityGroup> {
    token.trim().parse::<usize>().ok().and_then(|index| groups.get(index))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fakes::FakeCloud;
    use crate::fakes::ScriptedPrompter;
    use crate::fakes::test_logger;
    use std::collections::BTreeMap;

    fn group(id: &str, name: &str) -> SecurityGroup {
        SecurityGroup::new(
            id.to_string(),
            name.to_string(),
            String::new(),
            BTreeMap::new(),
            Vec::new(),
        )
    }

    fn candidates() -> Vec<SecurityGroup> {
        vec![
            group("sg-a", "staging-api"),
            group("sg-b", "staging-db"),
            group("sg-c", "staging-cache"),
        ]
    }

    #[test]
    fn test_parse_empty_line_is_invalid() {
        let catalog = RuleCatalog::builtin();
        let err = parse_selection("  ", &candidates(), &catalog, &BTreeSet::from([22]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSelection));
    }

    #[test]
    fn test_parse_explicit_types() {
        let catalog = RuleCatalog::builtin();
        let selection =
            parse_selection("0:ssh 2:redis", &candidates(), &catalog, &BTreeSet::new())
                .unwrap();
        assert_eq!(selection.len(), 2);
        assert_eq!(selection["sg-a"].ports, BTreeSet::from([22]));
        assert_eq!(selection["sg-c"].ports, BTreeSet::from([6379]));
        assert!(!selection.contains_key("sg-b"));
    }

    #[test]
    fn test_parse_explicit_repeated_index_unions_ports() {
        let catalog = RuleCatalog::builtin();
        let selection = parse_selection(
            "0:ssh 0:redis,mongo",
            &candidates(),
            &catalog,
            &BTreeSet::new(),
        )
        .unwrap();
        assert_eq!(selection["sg-a"].ports, BTreeSet::from([22, 6379, 27017]));
    }

    #[test]
    fn test_parse_explicit_skips_unknown_types_and_bad_indices() {
        let catalog = RuleCatalog::builtin();
        let selection = parse_selection(
            "0:ssh,telnet 9:ssh x:ssh 1:telnet",
            &candidates(),
            &catalog,
            &BTreeSet::new(),
        )
        .unwrap();
        // sg-b only had an unknown type, so it is dropped entirely.
        assert_eq!(selection.len(), 1);
        assert_eq!(selection["sg-a"].ports, BTreeSet::from([22]));
    }

    #[test]
    fn test_parse_plain_indices_use_default_ports() {
        let catalog = RuleCatalog::builtin();
        let defaults = BTreeSet::from([22, 3306]);
        let selection =
            parse_selection("0, 2, 7, x", &candidates(), &catalog, &defaults).unwrap();
        assert_eq!(selection.len(), 2);
        assert_eq!(selection["sg-a"].ports, defaults);
        assert_eq!(selection["sg-c"].ports, defaults);
    }

    #[tokio::test]
    async fn test_group_id_input_bypasses_discovery() {
        let cloud = FakeCloud::with_groups([group("sg-a", "staging-api")]);
        let mut prompter = ScriptedPrompter::new([]);
        let log = test_logger();
        let selection = select_groups(
            &cloud,
            &mut prompter,
            &RuleCatalog::builtin(),
            "sg-a",
            &[],
            false,
            &BTreeSet::from([22]),
            &log,
        )
        .await
        .unwrap();
        assert_eq!(selection.len(), 1);
        assert_eq!(selection["sg-a"].ports, BTreeSet::from([22]));
        assert_eq!(cloud.list_calls(), 0, "discovery must not run for literal ids");
    }

    #[tokio::test]
    async fn test_single_match_with_skip_choice_auto_selects() {
        let cloud = FakeCloud::with_env_groups("Staging", [group("sg-a", "staging-api")]);
        let mut prompter = ScriptedPrompter::new([]);
        let log = test_logger();
        let selection = select_groups(
            &cloud,
            &mut prompter,
            &RuleCatalog::builtin(),
            "staging",
            &[],
            true,
            &BTreeSet::from([22]),
            &log,
        )
        .await
        .unwrap();
        assert_eq!(selection.len(), 1);
        assert_eq!(selection["sg-a"].ports, BTreeSet::from([22]));
        assert!(!prompter.was_prompted(), "no prompt expected for auto-selection");
    }

    #[tokio::test]
    async fn test_single_match_skip_choice_without_ports_is_an_error() {
        let cloud = FakeCloud::with_env_groups("Staging", [group("sg-a", "staging-api")]);
        let mut prompter = ScriptedPrompter::new([]);
        let log = test_logger();
        let err = select_groups(
            &cloud,
            &mut prompter,
            &RuleCatalog::builtin(),
            "staging",
            &[],
            true,
            &BTreeSet::new(),
            &log,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::NoPortsToAuthorize));
    }

    #[tokio::test]
    async fn test_no_matching_groups_is_empty_selection() {
        let cloud = FakeCloud::with_env_groups("Staging", [group("sg-a", "staging-api")]);
        let mut prompter = ScriptedPrompter::new([]);
        let log = test_logger();
        let selection = select_groups(
            &cloud,
            &mut prompter,
            &RuleCatalog::builtin(),
            "production",
            &[],
            false,
            &BTreeSet::from([22]),
            &log,
        )
        .await
        .unwrap();
        assert!(selection.is_empty());
    }

    #[tokio::test]
    async fn test_interactive_explicit_selection() {
        let cloud = FakeCloud::with_env_groups("Staging", candidates());
        let mut prompter = ScriptedPrompter::new(["0:ssh 2:redis"]);
        let log = test_logger();
        let selection = select_groups(
            &cloud,
            &mut prompter,
            &RuleCatalog::builtin(),
            "staging",
            &[],
            false,
            &BTreeSet::from([22]),
            &log,
        )
        .await
        .unwrap();
        assert_eq!(selection.len(), 2);
        assert_eq!(selection["sg-a"].ports, BTreeSet::from([22]));
        assert_eq!(selection["sg-c"].ports, BTreeSet::from([6379]));
    }

    #[tokio::test]
    async fn test_interactive_selection_without_ports_is_an_error() {
        let cloud = FakeCloud::with_env_groups("Staging", candidates());
        let mut prompter = ScriptedPrompter::new(["0:telnet"]);
        let log = test_logger();
        let err = select_groups(
            &cloud,
            &mut prompter,
            &RuleCatalog::builtin(),
            "staging",
            &[],
            false,
            &BTreeSet::from([22]),
            &log,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::NoRulesToApply));
    }
}
