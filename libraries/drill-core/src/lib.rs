//! Drill Player Core
//!
//! Immutable practice material for the Drill Player engine.
//!
//! This crate provides:
//! - **Domain Types**: `Exercise`, `Playlist`, `PlaylistItem`, `ExerciseId`
//! - **Catalog**: validated, read-only storage with category filtering
//! - **Error Handling**: `CatalogError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use drill_core::{Catalog, CategorySelection, Exercise, FilterCriteria};
//!
//! let scales = Exercise::new("scales", "Major scales", 100)
//!     .with_categories(["warmup"]);
//! let arpeggios = Exercise::new("arps", "Arpeggios", 90)
//!     .with_categories(["technique"]);
//!
//! let catalog = Catalog::new(vec![scales, arpeggios], vec![]).unwrap();
//!
//! let selection = CategorySelection::named("warmup");
//! let visible = catalog.filter_exercises(&FilterCriteria::Category(&selection));
//! assert_eq!(visible.len(), 1);
//! assert_eq!(visible[0].id.as_str(), "scales");
//! ```

#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod types;

pub use catalog::{Catalog, FilterCriteria};
pub use error::{CatalogError, Result};
pub use types::{CategorySelection, Exercise, ExerciseId, Playlist, PlaylistItem};
