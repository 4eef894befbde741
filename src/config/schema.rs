//! Component manifest schema and validation.
//!
//! A manifest is parsed into a generic [`toml::Table`] first and only then
//! validated into a [`ComponentManifest`].  Validation collects every
//! violation instead of stopping at the first one, and applies defaults
//! (`force = false`, `tags = ["*"]`) before returning.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use toml::{Table, Value};

use crate::error::{SchemaError, Violation, ViolationKind};
use crate::platform::{MachineId, Tag};

/// How a config entry is materialized at its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Copy the source file or directory tree.
    Copy,
    /// Create a symbolic link pointing at the source.
    Symlink,
}

impl Method {
    /// Spelling used in manifests.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Symlink => "symlink",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "copy" => Ok(Self::Copy),
            "symlink" => Ok(Self::Symlink),
            _ => Err(()),
        }
    }
}

/// One file mapping declared in a manifest's `configs` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    /// Path relative to the component directory.
    pub from: String,
    /// Destination path; may start with `~`.
    pub to: String,
    /// Installation strategy.
    pub method: Method,
    /// Whether an existing destination may be overwritten.
    pub force: bool,
    /// Tags selecting the machines this entry applies to.
    pub tags: BTreeSet<Tag>,
}

impl ConfigEntry {
    /// Whether this entry should be installed on `machine`.
    #[must_use]
    pub fn applies_to(&self, machine: MachineId) -> bool {
        self.tags.iter().any(|tag| tag.applies_to(machine))
    }
}

/// A validated component manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentManifest {
    /// Component name.
    pub name: String,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Sort priority; lower sorts earlier and `None` sorts last.
    pub priority: Option<i64>,
    /// Shell commands keyed by tag.
    pub builds: BTreeMap<Tag, Vec<String>>,
    /// File mappings, in declaration order.
    pub configs: Vec<ConfigEntry>,
    /// Shell commands run when the component is removed.
    pub cleanup: Vec<String>,
}

impl ComponentManifest {
    /// Every distinct tag used by this manifest's config entries.
    #[must_use]
    pub fn config_tags(&self) -> BTreeSet<Tag> {
        self.configs
            .iter()
            .flat_map(|entry| entry.tags.iter().copied())
            .collect()
    }
}

/// Description of the accepted tag values, used in violation messages.
fn expected_tags() -> String {
    let mut names = vec![Tag::WILDCARD];
    names.extend(MachineId::ALL.iter().map(|id| id.as_str()));
    format!("one of {}", names.join(", "))
}

/// Collects violations while walking a document.
#[derive(Debug, Default)]
struct Validator {
    violations: Vec<Violation>,
}

impl Validator {
    fn push(&mut self, field: impl Into<String>, kind: ViolationKind) {
        self.violations.push(Violation::new(field, kind));
    }

    fn wrong_type(&mut self, field: impl Into<String>, expected: &'static str) {
        self.push(field, ViolationKind::WrongType { expected });
    }

    fn required_str(&mut self, table: &Table, key: &str, field: &str) -> Option<String> {
        match table.get(key) {
            None => {
                self.push(field, ViolationKind::Missing);
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.wrong_type(field, "string");
                None
            }
        }
    }

    fn optional_str(&mut self, table: &Table, key: &str) -> Option<String> {
        match table.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.wrong_type(key, "string");
                None
            }
            None => None,
        }
    }

    fn string_list(&mut self, value: &Value, field: &str) -> Vec<String> {
        let Value::Array(items) = value else {
            self.wrong_type(field, "list of strings");
            return Vec::new();
        };
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match item {
                Value::String(s) => out.push(s.clone()),
                _ => self.wrong_type(format!("{field}[{i}]"), "string"),
            }
        }
        out
    }

    fn tag(&mut self, raw: &str, field: String) -> Option<Tag> {
        raw.parse::<Tag>().map_or_else(
            |_| {
                self.push(
                    field,
                    ViolationKind::InvalidValue {
                        value: raw.to_string(),
                        expected: expected_tags(),
                    },
                );
                None
            },
            Some,
        )
    }

    fn builds(&mut self, value: &Value) -> BTreeMap<Tag, Vec<String>> {
        let Value::Table(table) = value else {
            self.wrong_type("builds", "table");
            return BTreeMap::new();
        };
        let mut builds = BTreeMap::new();
        for (key, commands) in table {
            let field = format!("builds.{key}");
            let commands = self.string_list(commands, &field);
            if let Some(tag) = self.tag(key, field) {
                builds.insert(tag, commands);
            }
        }
        builds
    }

    fn configs(&mut self, value: &Value) -> Vec<ConfigEntry> {
        let Value::Array(items) = value else {
            self.wrong_type("configs", "list of tables");
            return Vec::new();
        };
        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| self.config_entry(item, &format!("configs[{i}]")))
            .collect()
    }

    fn config_entry(&mut self, value: &Value, prefix: &str) -> Option<ConfigEntry> {
        let Value::Table(table) = value else {
            self.wrong_type(prefix, "table");
            return None;
        };
        let before = self.violations.len();

        let from = self.required_str(table, "from", &format!("{prefix}.from"));
        let to = self.required_str(table, "to", &format!("{prefix}.to"));
        let method = self
            .required_str(table, "method", &format!("{prefix}.method"))
            .and_then(|raw| {
                raw.parse::<Method>().map_or_else(
                    |()| {
                        self.push(
                            format!("{prefix}.method"),
                            ViolationKind::InvalidValue {
                                value: raw.clone(),
                                expected: "copy or symlink".to_string(),
                            },
                        );
                        None
                    },
                    Some,
                )
            });

        let force = match table.get("force") {
            None => false,
            Some(Value::Boolean(b)) => *b,
            Some(_) => {
                self.wrong_type(format!("{prefix}.force"), "boolean");
                false
            }
        };

        let tags = match table.get("tags") {
            None => BTreeSet::from([Tag::Any]),
            Some(value) => {
                let field = format!("{prefix}.tags");
                let raw = self.string_list(value, &field);
                raw.iter()
                    .enumerate()
                    .filter_map(|(i, t)| self.tag(t, format!("{field}[{i}]")))
                    .collect()
            }
        };

        if self.violations.len() > before {
            return None;
        }
        Some(ConfigEntry {
            from: from?,
            to: to?,
            method: method?,
            force,
            tags,
        })
    }
}

/// Validate a parsed manifest document.
///
/// Unknown keys are ignored.  On success every default has been applied; on
/// failure the returned [`SchemaError`] lists every violated constraint and no
/// partial manifest is produced.
///
/// # Errors
///
/// Returns a [`SchemaError`] when any required field is missing, any field
/// has the wrong type, or an enum-like value (method, tag, builds key) is not
/// recognised.
///
/// # Examples
///
/// ```
/// use dotfiles_components::config::schema::validate;
///
/// let doc: toml::Table = r#"
/// name = "git"
/// [[configs]]
/// from = "gitconfig"
/// to = "~/.gitconfig"
/// method = "symlink"
/// "#.parse().unwrap();
///
/// let manifest = validate(&doc).unwrap();
/// assert_eq!(manifest.name, "git");
/// assert!(!manifest.configs[0].force);
/// ```
pub fn validate(doc: &Table) -> Result<ComponentManifest, SchemaError> {
    let mut v = Validator::default();

    let name = v.required_str(doc, "name", "name");
    let description = v.optional_str(doc, "description");

    let priority = match doc.get("priority") {
        None => None,
        Some(Value::Integer(p)) => Some(*p),
        Some(_) => {
            v.wrong_type("priority", "integer");
            None
        }
    };

    let builds = doc.get("builds").map(|b| v.builds(b)).unwrap_or_default();
    let configs = doc.get("configs").map(|c| v.configs(c)).unwrap_or_default();
    let cleanup = doc
        .get("cleanup")
        .map(|c| v.string_list(c, "cleanup"))
        .unwrap_or_default();

    match name {
        Some(name) if v.violations.is_empty() => Ok(ComponentManifest {
            name,
            description,
            priority,
            builds,
            configs,
            cleanup,
        }),
        _ => Err(SchemaError {
            violations: v.violations,
        }),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Table {
        text.parse().expect("test document should parse")
    }

    #[test]
    fn minimal_manifest_is_valid() {
        let m = validate(&doc("name = \"zsh\"")).unwrap();
        assert_eq!(m.name, "zsh");
        assert!(m.description.is_none());
        assert!(m.priority.is_none());
        assert!(m.builds.is_empty());
        assert!(m.configs.is_empty());
        assert!(m.cleanup.is_empty());
    }

    #[test]
    fn missing_name_is_reported() {
        let err = validate(&doc("description = \"no name\"")).unwrap_err();
        assert!(err.mentions("name"));
        assert_eq!(err.violations[0].kind, ViolationKind::Missing);
    }

    #[test]
    fn config_defaults_are_applied() {
        let m = validate(&doc(
            r#"
name = "git"
[[configs]]
from = "gitconfig"
to = "~/.gitconfig"
method = "symlink"
"#,
        ))
        .unwrap();
        let entry = &m.configs[0];
        assert!(!entry.force);
        assert_eq!(entry.tags, BTreeSet::from([Tag::Any]));
        assert_eq!(entry.method, Method::Symlink);
    }

    #[test]
    fn explicit_priority_zero_is_kept() {
        let m = validate(&doc("name = \"a\"\npriority = 0")).unwrap();
        assert_eq!(m.priority, Some(0));
    }

    #[test]
    fn every_missing_config_field_is_reported() {
        let err = validate(&doc(
            r#"
name = "x"
[[configs]]
force = true
"#,
        ))
        .unwrap_err();
        assert!(err.mentions("configs[0].from"));
        assert!(err.mentions("configs[0].to"));
        assert!(err.mentions("configs[0].method"));
        assert_eq!(err.violations.len(), 3);
    }

    #[test]
    fn invalid_method_is_rejected() {
        let err = validate(&doc(
            r#"
name = "x"
[[configs]]
from = "a"
to = "b"
method = "hardlink"
"#,
        ))
        .unwrap_err();
        assert!(matches!(
            &err.violations[0].kind,
            ViolationKind::InvalidValue { value, .. } if value == "hardlink"
        ));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = validate(&doc(
            r#"
name = "x"
[[configs]]
from = "a"
to = "b"
method = "copy"
tags = ["arch", "beos"]
"#,
        ))
        .unwrap_err();
        assert!(err.mentions("configs[0].tags[1]"));
        assert_eq!(err.violations.len(), 1);
    }

    #[test]
    fn unknown_builds_key_is_rejected() {
        let err = validate(&doc(
            r#"
name = "x"
[builds]
fedora = ["dnf install -y git"]
amiga = ["true"]
"#,
        ))
        .unwrap_err();
        assert!(err.mentions("builds.amiga"));
    }

    #[test]
    fn builds_are_keyed_by_tag() {
        let m = validate(&doc(
            r#"
name = "x"
[builds]
"*" = ["b"]
fedora = ["a1", "a2"]
"#,
        ))
        .unwrap();
        assert_eq!(m.builds[&Tag::Any], vec!["b"]);
        assert_eq!(m.builds[&Tag::Machine(MachineId::Fedora)], vec!["a1", "a2"]);
    }

    #[test]
    fn wrong_types_are_all_reported() {
        let err = validate(&doc(
            r#"
name = 5
priority = "high"
cleanup = "rm -rf"
"#,
        ))
        .unwrap_err();
        assert!(err.mentions("name"));
        assert!(err.mentions("priority"));
        assert!(err.mentions("cleanup"));
    }

    #[test]
    fn non_boolean_force_is_rejected() {
        let err = validate(&doc(
            r#"
name = "x"
[[configs]]
from = "a"
to = "b"
method = "copy"
force = "yes"
"#,
        ))
        .unwrap_err();
        assert!(err.mentions("configs[0].force"));
    }

    #[test]
    fn unknown_top_level_fields_are_ignored() {
        let m = validate(&doc("name = \"x\"\nhomepage = \"https://example.com\"")).unwrap();
        assert_eq!(m.name, "x");
    }

    #[test]
    fn config_tags_collects_union() {
        let m = validate(&doc(
            r#"
name = "x"
[[configs]]
from = "a"
to = "b"
method = "copy"
tags = ["arch"]
[[configs]]
from = "c"
to = "d"
method = "copy"
tags = ["fedora", "arch"]
"#,
        ))
        .unwrap();
        let tags: Vec<String> = m.config_tags().iter().map(ToString::to_string).collect();
        assert_eq!(tags, vec!["arch", "fedora"]);
    }

    #[test]
    fn entry_applies_to_matching_machine() {
        let entry = ConfigEntry {
            from: "a".to_string(),
            to: "b".to_string(),
            method: Method::Copy,
            force: false,
            tags: BTreeSet::from([Tag::Machine(MachineId::Ubuntu)]),
        };
        assert!(entry.applies_to(MachineId::Ubuntu));
        assert!(!entry.applies_to(MachineId::Debian));
    }
}
