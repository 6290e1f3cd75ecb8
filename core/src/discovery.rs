// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Security-group discovery and client-side filtering.

use onyx_common::Error;
use onyx_common::model::GroupFilter;
use onyx_common::model::SecurityGroup;
use onyx_common::model::title_case;
use slog::Logger;
use slog::warn;

use crate::provider::SecurityGroupApi;

/// Lists groups tagged with the title-cased environment name.  An empty
/// environment lists everything, with a warning since that query can be
/// very large.
pub async fn list_by_environment(
    provider: &dyn SecurityGroupApi,
    env: &str,
    log: &Logger,
) -> Result<Vec<SecurityGroup>, Error> {
    if env.is_empty() {
        warn!(log, "no environment given; listing all security groups");
        provider.list(None).await
    } else {
        provider.list(Some(&title_case(env))).await
    }
}

pub async fn get_by_id(
    provider: &dyn SecurityGroupApi,
    id: &str,
) -> Result<SecurityGroup, Error> {
    provider.get(id).await
}

/// Keeps only the groups whose name contains every filter's value,
/// case-insensitively.  Only the `name` key is honored; filters with other
/// keys are ignored.  No filters means no filtering.
pub fn apply_filters(
    groups: Vec<SecurityGroup>,
    filters: &[GroupFilter],
) -> Vec<SecurityGroup> {
    let name_filters: Vec<_> =
        filters.iter().filter(|filter| filter.key == "name").collect();
    if name_filters.is_empty() {
        return groups;
    }

    groups
        .into_iter()
        .filter(|group| {
            let name = group.name.to_lowercase();
            name_filters.iter().all(|filter| name.contains(&filter.value))
        })
        .collect()
}
