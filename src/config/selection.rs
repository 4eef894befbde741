//! Tag inclusion and name exclusion over a sorted catalog.
use crate::config::resolver::Component;
use crate::platform::Tag;

/// Keep the components selected by `tags` and not named in `exclude`.
///
/// An empty `tags` keeps everything; otherwise a component survives when any
/// of its config entries carries any of the given tags, so a component with
/// no configs is dropped.  Input order is preserved.
#[must_use]
pub fn filter(components: Vec<Component>, tags: &[Tag], exclude: &[String]) -> Vec<Component> {
    components
        .into_iter()
        .filter(|c| {
            tags.is_empty()
                || c.manifest
                    .configs
                    .iter()
                    .any(|entry| entry.tags.iter().any(|t| tags.contains(t)))
        })
        .filter(|c| !exclude.iter().any(|name| name == c.name()))
        .collect()
}
