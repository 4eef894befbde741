//! Manifest resolution and component selection.
//!
//! Data flows leaves-first: [`schema`] validates a parsed manifest,
//! [`resolver`] locates and checks one component on disk, [`catalog`]
//! enumerates and orders every component under a source root, and
//! [`selection`] narrows the catalog by tag and name.  [`paths`] and
//! [`builds`] derive the concrete destinations and commands that the install
//! and remove tasks act on.
pub mod builds;
pub mod catalog;
pub mod paths;
pub mod resolver;
pub mod schema;
pub mod selection;

pub use catalog::{Catalog, SortBy};
pub use resolver::Component;
