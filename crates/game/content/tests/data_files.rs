use std::io::Write;
use std::path::Path;

use encounter_content::{ConfigLoader, DATA_DIR, RoomLoader, load_encounter};
use encounter_core::{EncounterConfig, RoomLayout};

#[test]
fn shipped_balance_matches_defaults() {
    let config = ConfigLoader::load(&Path::new(DATA_DIR).join("balance.toml")).unwrap();
    assert_eq!(config, EncounterConfig::default());
}

#[test]
fn shipped_room_matches_defaults() {
    let room = RoomLoader::load(&Path::new(DATA_DIR).join("room.ron")).unwrap();
    assert_eq!(room, RoomLayout::default());
}

#[test]
fn encounter_combines_both_files() {
    let config = load_encounter(Path::new(DATA_DIR)).unwrap();
    assert_eq!(config.room.entrance.len(), 5);
    assert_eq!(config.tick_rate, 30);
}

#[test]
fn custom_balance_file_overrides_fields() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "tick_rate = 20\n[green]\nmax_active = 1").unwrap();
    let config = ConfigLoader::load(file.path()).unwrap();
    assert_eq!(config.tick_rate, 20);
    assert_eq!(config.green.max_active, 1);
    assert_eq!(config.green.proj_speed, 60.0);
}

#[test]
fn missing_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.ron");
    let err = RoomLoader::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.ron"));
}

#[test]
fn inverted_walls_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("room.ron");
    let text = std::fs::read_to_string(Path::new(DATA_DIR).join("room.ron"))
        .unwrap()
        .replace("far_wall: 8371.0", "far_wall: 9900.0");
    std::fs::write(&path, text).unwrap();
    assert!(RoomLoader::load(&path).is_err());
}
