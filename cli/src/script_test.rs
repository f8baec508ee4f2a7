#![allow(clippy::float_cmp)]

use moodboard_canvas::board::Board;
use moodboard_canvas::config::EngineConfig;
use moodboard_canvas::input::CommitPolicy;

use super::*;

const BOARD: &str = r##"{
    "backgroundColor": "#f5f0e8",
    "items": [
        { "id": "6f1c2a40-0000-4000-8000-000000000001", "type": "image", "content": "https://cdn/a.png",
          "x": 0, "y": 0, "width": 100, "height": 100 },
        { "id": "6f1c2a40-0000-4000-8000-000000000002", "type": "text", "content": "note",
          "x": 200, "y": 200, "width": 100, "height": 100 }
    ]
}"##;

fn controller(policy: CommitPolicy) -> BoardController {
    let mut ctl = BoardController::new(EngineConfig { commit_policy: policy, ..EngineConfig::default() });
    ctl.load_board(Board::from_json(BOARD).unwrap());
    ctl
}

fn run(ctl: &mut BoardController, script: &str) -> Vec<Action> {
    script
        .lines()
        .filter_map(|line| parse_line(line).unwrap())
        .flat_map(|event| apply(ctl, &event))
        .collect()
}

#[test]
fn blank_and_comment_lines_are_skipped() {
    assert_eq!(parse_line("   ").unwrap(), None);
    assert_eq!(parse_line("# drag the image").unwrap(), None);
    assert_eq!(parse_line(r#"{"event":"up"}"#).unwrap(), Some(ScriptEvent::Up));
}

#[test]
fn unknown_event_is_an_error() {
    assert!(parse_line(r#"{"event":"teleport"}"#).is_err());
}

#[test]
fn parses_explicit_target() {
    let event = parse_line(
        r#"{"event":"down","x":1,"y":2,"target":{"kind":"resizeHandle","id":"6f1c2a40-0000-4000-8000-000000000001"}}"#,
    )
    .unwrap();
    assert!(matches!(event, Some(ScriptEvent::Down { target: Some(ScriptTarget::ResizeHandle { .. }), .. })));
}

#[test]
fn hit_tested_drag_commits_on_release() {
    let mut ctl = controller(CommitPolicy::OnRelease);
    let actions = run(
        &mut ctl,
        r#"{"event":"down","x":50,"y":50}
{"event":"move","x":60,"y":70}
{"event":"up"}"#,
    );
    let moved: Vec<&Action> = actions.iter().filter(|a| matches!(a, Action::Moved { .. })).collect();
    assert_eq!(moved.len(), 1);
    assert!(matches!(moved[0], Action::Moved { x, y, .. } if *x == 10.0 && *y == 20.0));
}

#[test]
fn fit_then_zoom_reports_viewport() {
    let mut ctl = controller(CommitPolicy::OnRelease);
    let actions = run(
        &mut ctl,
        r#"{"event":"fit","width":600,"height":400}
{"event":"zoomOut"}"#,
    );
    assert_eq!(actions.len(), 2);
    assert!((ctl.viewport.scale - 0.8).abs() < 1e-9);
}

#[test]
fn escape_key_clears_selection() {
    let mut ctl = controller(CommitPolicy::OnRelease);
    let actions = run(
        &mut ctl,
        r#"{"event":"select","id":"6f1c2a40-0000-4000-8000-000000000002"}
{"event":"key","key":"Escape"}"#,
    );
    assert_eq!(actions.last(), Some(&Action::SelectionChanged { id: None }));
    assert_eq!(ctl.selected(), None);
}
