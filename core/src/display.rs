// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rendering of security-group state and pending changes.
//!
//! Pure string formatting: the reconciler calls this before and after every
//! mutation so the operator sees a live before/after diff of the rule set.

use onyx_common::model::SecurityGroup;
use owo_colors::OwoColorize;
use owo_colors::Style;

/// Styles applied to rendered output.  The default is unstyled; the CLI
/// calls [`Styles::colorize`] when the output stream supports color.
#[derive(Debug, Clone, Copy, Default)]
pub struct Styles {
    pub bold: Style,
    pub removal: Style,
    pub addition: Style,
}

impl Styles {
    pub fn colorize(&mut self) {
        self.bold = Style::new().bold();
        self.removal = Style::new().red();
        self.addition = Style::new().green();
    }
}

/// A (description, port) pair identifying a rule that is about to change.
pub type ChangedRuleKey = (String, u16);

/// Renders the group header and one line per rule, highlighting rules whose
/// (description, port) key appears in `changed`: red with a removal marker
/// when `marked_for_removal`, green otherwise (just added).
pub fn render_group(
    group: &SecurityGroup,
    changed: &[ChangedRuleKey],
    marked_for_removal: bool,
    styles: &Styles,
) -> String {
    let mut out = String::new();
    out.push_str("|-----------------------------------------------------\n");
    out.push_str(&format!("| {} ({})\n", group.name.style(styles.bold), group.id));
    out.push_str(&format!("| Description: {}\n", group.description));
    out.push_str("| Rules:\n");
    out.push_str("|  |------------------------------------------\n");
    for rule in &group.rules {
        let line = format!(
            "|  | {} -> {} ({}): {} - {}",
            rule.port, rule.port, rule.protocol, rule.cidr, rule.description
        );
        let is_changed = changed
            .iter()
            .any(|(description, port)| *port == rule.port && *description == rule.description);
        if is_changed {
            if marked_for_removal {
                out.push_str(&format!(
                    "{}{}\n",
                    line.style(styles.removal),
                    "    <------- This rule will be removed/updated".style(styles.bold)
                ));
            } else {
                out.push_str(&format!("{}\n", line.style(styles.addition)));
            }
        } else {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out.push_str("|  |------------------------------------------\n");
    out.push_str("|-----------------------------------------------------\n");
    out
}

/// Renders and prints in one step.
pub fn print_group(
    group: &SecurityGroup,
    changed: &[ChangedRuleKey],
    marked_for_removal: bool,
    styles: &Styles,
) {
    print!("{}", render_group(group, changed, marked_for_removal, styles));
}
