//! Read-only exercise and playlist storage
//!
//! The catalog is built once at startup and shared by reference. It owns the
//! only copy of every `Exercise` and `Playlist`.

use crate::error::{CatalogError, Result};
use crate::types::{CategorySelection, Exercise, ExerciseId, Playlist};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::Read;

/// Which exercises the picker should offer
///
/// The two policies are mutually exclusive: while a playlist is active only
/// the exercises it references are offered, regardless of category.
#[derive(Debug, Clone, Copy)]
pub enum FilterCriteria<'a> {
    /// Normal mode: category membership, or everything for `All`
    Category(&'a CategorySelection),

    /// Playlist mode: exercises referenced by the playlist
    Playlist(&'a Playlist),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    exercises: Vec<Exercise>,
    #[serde(default)]
    playlists: Vec<Playlist>,
}

/// Immutable in-memory catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    exercises: Vec<Exercise>,
    playlists: Vec<Playlist>,
    index: HashMap<ExerciseId, usize>,
}

impl Catalog {
    /// Build a catalog, validating ids and tempos
    ///
    /// Playlist items may reference ids that are not in the catalog; that gap
    /// is handled when the playlist is played.
    pub fn new(exercises: Vec<Exercise>, playlists: Vec<Playlist>) -> Result<Self> {
        let mut index = HashMap::with_capacity(exercises.len());
        for (i, exercise) in exercises.iter().enumerate() {
            if exercise.original_tempo_bpm == 0 {
                return Err(CatalogError::InvalidTempo {
                    context: format!("exercise {}", exercise.id),
                    bpm: 0,
                });
            }
            if index.insert(exercise.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateExercise(exercise.id.clone()));
            }
        }

        let mut names = HashSet::with_capacity(playlists.len());
        for playlist in &playlists {
            if !names.insert(playlist.name.as_str()) {
                return Err(CatalogError::DuplicatePlaylist(playlist.name.clone()));
            }
            for (item_index, item) in playlist.items.iter().enumerate() {
                if item.tempos.is_empty() {
                    return Err(CatalogError::EmptyTempos {
                        playlist: playlist.name.clone(),
                        item: item_index,
                    });
                }
                if let Some(&bpm) = item.tempos.iter().find(|&&bpm| bpm == 0) {
                    return Err(CatalogError::InvalidTempo {
                        context: format!("playlist '{}' item {}", playlist.name, item_index),
                        bpm,
                    });
                }
            }
        }

        Ok(Self {
            exercises,
            playlists,
            index,
        })
    }

    /// Parse and validate a catalog from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.exercises, file.playlists)
    }

    /// Parse and validate a catalog from a JSON stream
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let file: CatalogFile = serde_json::from_reader(reader)?;
        Self::new(file.exercises, file.playlists)
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    /// Look up an exercise by id
    pub fn exercise(&self, id: &ExerciseId) -> Option<&Exercise> {
        self.index.get(id).map(|&i| &self.exercises[i])
    }

    /// Look up an exercise, failing with `UnknownExercise`
    pub fn require_exercise(&self, id: &ExerciseId) -> Result<&Exercise> {
        self.exercise(id)
            .ok_or_else(|| CatalogError::UnknownExercise(id.clone()))
    }

    /// Look up a playlist by name
    pub fn playlist(&self, name: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.name == name)
    }

    /// Distinct category names across all exercises, sorted
    pub fn categories(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self
            .exercises
            .iter()
            .flat_map(|e| e.categories.iter().map(String::as_str))
            .collect();
        set.into_iter().collect()
    }

    /// Exercises matching the criteria, in catalog order
    pub fn filter_exercises(&self, criteria: &FilterCriteria<'_>) -> Vec<&Exercise> {
        match criteria {
            FilterCriteria::Category(CategorySelection::All) => self.exercises.iter().collect(),
            FilterCriteria::Category(CategorySelection::Named(category)) => self
                .exercises
                .iter()
                .filter(|e| e.in_category(category))
                .collect(),
            FilterCriteria::Playlist(playlist) => {
                let ids = playlist.exercise_ids();
                self.exercises
                    .iter()
                    .filter(|e| ids.contains(&e.id))
                    .collect()
            }
        }
    }

    /// First exercise under the "all categories" filter
    pub fn first_exercise(&self) -> Option<&Exercise> {
        self.exercises.first()
    }
}
