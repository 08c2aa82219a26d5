//! Level tests - loading level files into sessions

use block_gate::engine::{LevelConfig, LevelError, Session, ShapeConfig};
use block_gate::types::{Coord, Orientation, PieceId};

const CROSSING: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/levels/crossing.json");

#[test]
fn test_load_level_file() {
    let level = LevelConfig::load(CROSSING).unwrap();
    assert_eq!(level.name, "crossing");
    assert_eq!((level.width, level.height), (7, 5));
    assert!(matches!(level.pieces[2].shape, ShapeConfig::Custom(_)));

    let session = Session::from_level(&level).unwrap();
    assert_eq!(session.board().width(), 7);
    assert_eq!(session.pieces().len(), 4);
    assert_eq!(session.gates().len(), 4);
    assert_eq!(session.board().occupied_count(), 2 + 2 + 4 + 1);
    assert!(session.audit().is_ok());

    let green = session.piece(PieceId(2)).unwrap();
    assert_eq!(green.orientation(), Orientation::Deg180);
    assert_eq!(session.board().occupant_at(Coord::new(3, 2)), Some(PieceId(2)));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = LevelConfig::load("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, LevelError::Io(_)));
    assert!(err.to_string().starts_with("failed to read level file"));
}

#[test]
fn test_malformed_json_is_reported() {
    assert!(matches!(
        LevelConfig::from_json(r#"{"width": 3}"#),
        Err(LevelError::Json(_))
    ));
    assert!(matches!(
        LevelConfig::from_json(r#"{"width": 3, "height": 3, "pieces": [{"color": "red", "shape": 7, "pivot": [0, 0]}]}"#),
        Err(LevelError::Json(_))
    ));
}

#[test]
fn test_error_messages_name_the_entry() {
    let json = r#"{"width": 3, "height": 3, "pieces": [
        {"color": "red", "shape": "single", "pivot": [0, 0]},
        {"color": "blue", "shape": "horizontal2", "pivot": [2, 2]}
    ]}"#;
    let level = LevelConfig::from_json(json).unwrap();
    let err = Session::from_level(&level).unwrap_err();
    assert_eq!(
        err.to_string(),
        "piece 1: target would place piece out of bounds"
    );
}

#[test]
fn test_load_level_replaces_session() {
    let mut session = Session::from_level(&LevelConfig::demo()).unwrap();
    let level = LevelConfig::load(CROSSING).unwrap();
    session.load_level(&level).unwrap();
    assert_eq!(session.board().width(), 7);
    assert_eq!(session.pieces().len(), 4);
    assert!(session.audit().is_ok());
}
