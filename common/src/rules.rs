// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The rule catalog: symbolic rule-type names and their canonical ports.
//!
//! The built-in table is fixed.  A config file may add extra entries, but a
//! built-in name can never be shadowed.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::error::Error;

const BUILTIN_RULE_TYPES: [(&str, u16); 6] = [
    ("ssh", 22),
    ("redis", 6379),
    ("mongo", 27017),
    ("mysql", 3306),
    ("timescale", 5432),
    ("pgbouncer", 6432),
];

#[derive(Debug, Clone)]
pub struct RuleCatalog {
    entries: BTreeMap<String, u16>,
}

impl RuleCatalog {
    pub fn builtin() -> RuleCatalog {
        RuleCatalog {
            entries: BUILTIN_RULE_TYPES
                .iter()
                .map(|(name, port)| (name.to_string(), *port))
                .collect(),
        }
    }

    /// Extends the built-in table with user-supplied entries.  Built-in
    /// names win over extra entries with the same (lower-cased) name.
    pub fn with_extra_entries<I>(extra: I) -> RuleCatalog
    where
        I: IntoIterator<Item = (String, u16)>,
    {
        let mut catalog = RuleCatalog::builtin();
        for (name, port) in extra {
            catalog.entries.entry(name.to_lowercase()).or_insert(port);
        }
        catalog
    }

    /// Case-insensitive lookup that reports nothing on a miss.  Used by the
    /// interactive selection parser, where unknown names are skipped.
    pub fn lookup(&self, name: &str) -> Option<u16> {
        self.entries.get(&name.to_lowercase()).copied()
    }

    /// Case-insensitive lookup that fails with the full list of allowed
    /// names on a miss.
    pub fn resolve_type(&self, name: &str) -> Result<u16, Error> {
        self.lookup(name).ok_or_else(|| Error::InvalidRuleType {
            name: name.to_string(),
            allowed: self.allowed_names(),
        })
    }

    /// Resolves every name, short-circuiting on the first unknown one.
    pub fn resolve_types(&self, names: &[String]) -> Result<BTreeSet<u16>, Error> {
        names.iter().map(|name| self.resolve_type(name)).collect()
    }

    pub fn allowed_names(&self) -> String {
        self.entries.keys().cloned().collect::<Vec<_>>().join("|")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_resolve_type_is_case_insensitive() {
        let catalog = RuleCatalog::builtin();
        assert_eq!(catalog.resolve_type("ssh").unwrap(), 22);
        assert_eq!(catalog.resolve_type("SSH").unwrap(), 22);
        assert_eq!(catalog.resolve_type("Redis").unwrap(), 6379);
        assert_eq!(catalog.resolve_type("mongo").unwrap(), 27017);
        assert_eq!(catalog.resolve_type("mysql").unwrap(), 3306);
    }

    #[test]
    fn test_resolve_type_unknown_lists_allowed_names() {
        let catalog = RuleCatalog::builtin();
        match catalog.resolve_type("telnet") {
            Err(Error::InvalidRuleType { name, allowed }) => {
                assert_eq!(name, "telnet");
                for builtin in ["ssh", "redis", "mongo", "mysql"] {
                    assert!(allowed.contains(builtin), "missing {builtin}");
                }
            }
            other => panic!("expected InvalidRuleType, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_types_short_circuits() {
        let catalog = RuleCatalog::builtin();
        let ports = catalog
            .resolve_types(&["ssh".to_string(), "redis".to_string()])
            .unwrap();
        assert_eq!(ports, BTreeSet::from([22, 6379]));

        let err = catalog
            .resolve_types(&["ssh".to_string(), "nope".to_string(), "redis".to_string()])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRuleType { ref name, .. } if name == "nope"));
    }

    #[test]
    fn test_extra_entries_cannot_shadow_builtins() {
        let catalog = RuleCatalog::with_extra_entries([
            ("kafka".to_string(), 9092),
            ("SSH".to_string(), 2222),
        ]);
        assert_eq!(catalog.resolve_type("kafka").unwrap(), 9092);
        assert_eq!(catalog.resolve_type("ssh").unwrap(), 22);
    }
}
