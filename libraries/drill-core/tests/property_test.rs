//! Property-based tests for catalog parsing and filtering

use drill_core::{Catalog, CategorySelection, Exercise, FilterCriteria, Playlist, PlaylistItem};
use proptest::prelude::*;

// ===== Helpers =====

const CATEGORIES: [&str; 4] = ["rudiments", "warmup", "grooves", "fills"];

/// Exercises with unique ids and a random subset of the known categories
fn arbitrary_exercises() -> impl Strategy<Value = Vec<Exercise>> {
    prop::collection::vec(
        (prop::collection::vec(0usize..CATEGORIES.len(), 0..3), 1u32..300),
        0..12,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (categories, bpm))| {
                Exercise::new(format!("ex-{i}"), format!("Exercise {i}"), bpm)
                    .with_categories(categories.into_iter().map(|c| CATEGORIES[c]))
            })
            .collect()
    })
}

// ===== Property Tests =====

proptest! {
    /// Property: any integer repetition count in JSON loads as at least 1
    #[test]
    fn json_repetitions_are_at_least_one(reps in any::<i64>()) {
        let json = format!(
            r#"{{ "exerciseId": "a", "tempos": [100], "repetitionsPerTempo": {reps} }}"#
        );
        let item: PlaylistItem = serde_json::from_str(&json).unwrap();

        prop_assert!(item.repetitions_per_tempo >= 1);
        if (1..=i64::from(u32::MAX)).contains(&reps) {
            prop_assert_eq!(i64::from(item.repetitions_per_tempo), reps);
        }
        prop_assert_eq!(item.plays(), item.repetitions_per_tempo as usize);
    }

    /// Property: a named category shows a subset of "all", in catalog order
    #[test]
    fn named_category_is_an_ordered_subset(
        exercises in arbitrary_exercises(),
        pick in 0usize..CATEGORIES.len(),
    ) {
        let catalog = Catalog::new(exercises, vec![]).unwrap();
        let all = catalog.filter_exercises(&FilterCriteria::Category(&CategorySelection::All));
        let selection = CategorySelection::named(CATEGORIES[pick]);
        let named = catalog.filter_exercises(&FilterCriteria::Category(&selection));

        prop_assert_eq!(all.len(), catalog.exercises().len());
        prop_assert!(named.iter().all(|e| e.in_category(CATEGORIES[pick])));

        // Walk "all" once; every named entry must appear in the same order
        let mut rest = all.iter();
        for exercise in &named {
            prop_assert!(rest.any(|candidate| candidate.id == exercise.id));
        }
        let expected = all.iter().filter(|e| e.in_category(CATEGORIES[pick])).count();
        prop_assert_eq!(named.len(), expected);
    }

    /// Property: playlist filtering only offers referenced exercises
    #[test]
    fn playlist_filter_matches_references(
        exercises in arbitrary_exercises(),
        referenced in prop::collection::vec(0usize..16, 1..6),
    ) {
        let items = referenced
            .iter()
            .map(|i| PlaylistItem::new(format!("ex-{i}"), vec![100], 1))
            .collect();
        let playlist = Playlist::new("P", items);
        let catalog = Catalog::new(exercises, vec![playlist.clone()]).unwrap();

        let offered = catalog.filter_exercises(&FilterCriteria::Playlist(&playlist));
        prop_assert!(offered.iter().all(|e| playlist.references(&e.id)));
        let known = catalog
            .exercises()
            .iter()
            .filter(|e| playlist.references(&e.id))
            .count();
        prop_assert_eq!(offered.len(), known);
    }
}
