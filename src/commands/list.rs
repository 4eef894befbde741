//! List command implementation.
use anyhow::{Context as _, Result};

use crate::cli::{GlobalOpts, ListOpts};
use crate::config::Component;
use crate::config::schema::ComponentManifest;
use crate::logging::{Log, terminal_columns};

const HEADERS: [&str; 5] = ["NAME", "PRIORITY", "TAGS", "CONFIGS", "DESCRIPTION"];
const GAP: &str = "  ";

/// Run the list command.
///
/// # Errors
///
/// Returns an error if setup fails or the JSON output cannot be produced.
#[allow(clippy::print_stdout)]
pub fn run(global: &GlobalOpts, opts: &ListOpts, log: &dyn Log) -> Result<()> {
    let setup = super::CommandSetup::init(global, &opts.selection, log)?;
    let out = if opts.json {
        render_json(&setup.components)?
    } else {
        render_table(&setup.components, terminal_columns())
    };
    println!("{out}");
    Ok(())
}

/// Render `components` as an aligned table no wider than `width` columns.
///
/// Only the trailing description column is shortened to fit.
#[must_use]
pub fn render_table(components: &[Component], width: usize) -> String {
    let rows: Vec<[String; 5]> = components.iter().map(|c| row(&c.manifest)).collect();

    let mut widths = HEADERS.map(str::len);
    for r in &rows {
        for (w, cell) in widths.iter_mut().zip(r.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let header = HEADERS.map(String::from);
    std::iter::once(&header)
        .chain(rows.iter())
        .map(|r| format_row(r, &widths, width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the manifests of `components` as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(components: &[Component]) -> Result<String> {
    let manifests: Vec<&ComponentManifest> = components.iter().map(|c| &c.manifest).collect();
    serde_json::to_string_pretty(&manifests).context("serializing component list")
}

fn row(manifest: &ComponentManifest) -> [String; 5] {
    let tags = manifest
        .config_tags()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    [
        manifest.name.clone(),
        manifest
            .priority
            .map_or_else(|| "-".to_string(), |p| p.to_string()),
        if tags.is_empty() { "-".to_string() } else { tags },
        manifest.configs.len().to_string(),
        manifest.description.clone().unwrap_or_default(),
    ]
}

fn format_row(cells: &[String; 5], widths: &[usize; 5], max_width: usize) -> String {
    let [name, priority, tags, configs, description] = cells;
    let [w_name, w_priority, w_tags, w_configs, _] = *widths;
    let prefix = format!(
        "{name:<w_name$}{GAP}{priority:>w_priority$}{GAP}{tags:<w_tags$}{GAP}{configs:>w_configs$}{GAP}"
    );
    let room = max_width.saturating_sub(prefix.chars().count());
    let line = format!("{prefix}{}", truncate(description, room));
    line.trim_end().to_string()
}

/// Shorten `s` to at most `max` characters, marking the cut with `…`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let Some(keep) = max.checked_sub(1) else {
        return String::new();
    };
    let kept: String = s.chars().take(keep).collect();
    format!("{kept}…")
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::schema::{ConfigEntry, Method};
    use crate::platform::{MachineId, Tag};
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::PathBuf;

    fn component(
        name: &str,
        priority: Option<i64>,
        description: Option<&str>,
        tags: &[Tag],
    ) -> Component {
        Component {
            dir_name: name.to_string(),
            dir: PathBuf::from(format!("/src/{name}")),
            manifest: ComponentManifest {
                name: name.to_string(),
                description: description.map(String::from),
                priority,
                builds: BTreeMap::new(),
                configs: tags
                    .iter()
                    .map(|t| ConfigEntry {
                        from: "f".to_string(),
                        to: "~/f".to_string(),
                        method: Method::Copy,
                        force: false,
                        tags: BTreeSet::from([*t]),
                    })
                    .collect(),
                cleanup: vec![],
            },
        }
    }

    #[test]
    fn table_aligns_columns() {
        let components = vec![
            component("zsh", Some(1), Some("shell"), &[Tag::Any]),
            component("neovim", None, None, &[]),
        ];
        let table = render_table(&components, 200);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "NAME    PRIORITY  TAGS  CONFIGS  DESCRIPTION");
        assert_eq!(lines[1], "zsh            1  *           1  shell");
        assert_eq!(lines[2], "neovim         -  -           0");
    }

    #[test]
    fn long_description_is_truncated_to_width() {
        let components = vec![component(
            "git",
            Some(10),
            Some("a very long description that will not fit"),
            &[Tag::Machine(MachineId::Arch)],
        )];
        let table = render_table(&components, 50);
        for line in table.lines() {
            assert!(line.chars().count() <= 50, "too wide: {line}");
        }
        assert!(table.lines().nth(1).unwrap().ends_with('…'));
    }

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("abc", 3), "abc");
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abcdef", 1), "…");
        assert_eq!(truncate("abcdef", 0), "");
    }

    #[test]
    fn narrow_terminal_drops_description() {
        let components = vec![component("git", Some(10), Some("Git configuration"), &[])];
        let table = render_table(&components, 10);
        assert_eq!(table.lines().nth(1).unwrap(), "git         10  -           0");
    }

    #[test]
    fn json_lists_manifests() {
        let components = vec![component(
            "zsh",
            Some(-3),
            None,
            &[Tag::Machine(MachineId::Void)],
        )];
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&components).unwrap()).unwrap();
        assert_eq!(json[0]["name"], "zsh");
        assert_eq!(json[0]["priority"], -3);
        assert_eq!(json[0]["configs"][0]["method"], "copy");
        assert_eq!(json[0]["configs"][0]["tags"][0], "void");
    }
}
