//! Catalog loading from JSON documents

use drill_core::{Catalog, CatalogError, CategorySelection, ExerciseId, FilterCriteria};

const CATALOG: &str = r#"{
    "exercises": [
        {
            "id": "single-strokes",
            "name": "Single strokes",
            "categories": ["rudiments"],
            "audioRef": "audio/single.mp3",
            "scoreRef": "scores/single.svg",
            "originalTempoBpm": 100
        },
        {
            "id": "double-strokes",
            "name": "Double strokes",
            "categories": ["rudiments", "warmup"],
            "audioRef": "audio/double.mp3",
            "scoreRef": "scores/double.svg",
            "originalTempoBpm": 90
        },
        {
            "id": "groove-a",
            "name": "Groove A",
            "categories": ["grooves"],
            "audioRef": "audio/groove-a.mp3",
            "scoreRef": "scores/groove-a.svg",
            "originalTempoBpm": 120
        }
    ],
    "playlists": [
        {
            "name": "Rudiment ladder",
            "items": [
                { "exerciseId": "double-strokes", "tempos": [70, 90, 110], "repetitionsPerTempo": 2 },
                { "exerciseId": "single-strokes", "tempos": [100], "repetitionsPerTempo": 0 }
            ]
        }
    ]
}"#;

#[test]
fn loads_exercises_and_playlists() {
    let catalog = Catalog::from_json_str(CATALOG).unwrap();

    assert_eq!(catalog.exercises().len(), 3);
    assert_eq!(catalog.playlists().len(), 1);

    let playlist = catalog.playlist("Rudiment ladder").unwrap();
    assert_eq!(playlist.items[0].tempos, vec![70, 90, 110]);
    // Zero repetitions are raised to one on load
    assert_eq!(playlist.items[1].repetitions_per_tempo, 1);
    assert_eq!(playlist.total_plays(), 7);

    let groove = catalog.exercise(&ExerciseId::new("groove-a")).unwrap();
    assert_eq!(groove.original_tempo_bpm, 120);
}

#[test]
fn reader_and_str_agree() {
    let from_str = Catalog::from_json_str(CATALOG).unwrap();
    let from_reader = Catalog::from_json_reader(CATALOG.as_bytes()).unwrap();
    assert_eq!(from_str.exercises(), from_reader.exercises());
    assert_eq!(from_str.playlists(), from_reader.playlists());
}

#[test]
fn filtering_switches_policy_with_playlist() {
    let catalog = Catalog::from_json_str(CATALOG).unwrap();

    let grooves = CategorySelection::named("grooves");
    let normal = catalog.filter_exercises(&FilterCriteria::Category(&grooves));
    assert_eq!(normal.len(), 1);
    assert_eq!(normal[0].id.as_str(), "groove-a");

    let playlist = catalog.playlist("Rudiment ladder").unwrap();
    let in_playlist = catalog.filter_exercises(&FilterCriteria::Playlist(playlist));
    let ids: Vec<&str> = in_playlist.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["single-strokes", "double-strokes"]);
}

#[test]
fn malformed_json_is_an_error() {
    let result = Catalog::from_json_str("{ \"exercises\": [ { \"id\": 5 } ] }");
    assert!(matches!(result, Err(CatalogError::Json(_))));
}

#[test]
fn empty_document_gives_empty_catalog() {
    let catalog = Catalog::from_json_str("{}").unwrap();
    assert!(catalog.exercises().is_empty());
    assert!(catalog.first_exercise().is_none());
    assert!(catalog.categories().is_empty());
}
