use uuid::Uuid;

use super::*;
use crate::geometry::ItemKind;

fn board_with(zs: &[i64]) -> (Board, Vec<ItemId>) {
    let mut board = Board::new();
    let ids = zs
        .iter()
        .map(|z| {
            let item = CanvasItem::new(Uuid::new_v4(), ItemKind::Image, "").with_z_index(*z);
            let id = item.id;
            board.insert(item);
            id
        })
        .collect();
    (board, ids)
}

fn order_ids(items: &[&CanvasItem]) -> Vec<ItemId> {
    items.iter().map(|item| item.id).collect()
}

// =============================================================
// Selection
// =============================================================

#[test]
fn new_selection_is_empty() {
    assert_eq!(Selection::new().selected(), None);
}

#[test]
fn select_reports_change() {
    let mut sel = Selection::new();
    let id = Uuid::new_v4();
    assert!(sel.select(id));
    assert!(!sel.select(id));
    assert!(sel.is_selected(&id));
}

#[test]
fn selecting_b_deselects_a() {
    let mut sel = Selection::new();
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    sel.select(a);
    sel.select(b);
    assert!(!sel.is_selected(&a));
    assert!(sel.is_selected(&b));
    let selected_count = [a, b].iter().filter(|id| sel.is_selected(id)).count();
    assert_eq!(selected_count, 1);
}

#[test]
fn clear_reports_change_once() {
    let mut sel = Selection::new();
    sel.select(Uuid::new_v4());
    assert!(sel.clear());
    assert!(!sel.clear());
    assert_eq!(sel.selected(), None);
}

#[test]
fn effective_z_lifts_only_selected() {
    let (board, ids) = board_with(&[3, 5]);
    let mut sel = Selection::new();
    sel.select(ids[0]);
    assert_eq!(sel.effective_z_index(board.get(&ids[0]).unwrap(), 100), 100);
    assert_eq!(sel.effective_z_index(board.get(&ids[1]).unwrap(), 100), 5);
}

#[test]
fn effective_z_keeps_higher_persisted_value() {
    let (board, ids) = board_with(&[250]);
    let mut sel = Selection::new();
    sel.select(ids[0]);
    assert_eq!(sel.effective_z_index(board.get(&ids[0]).unwrap(), 100), 250);
}

#[test]
fn selecting_does_not_mutate_persisted_z() {
    let (board, ids) = board_with(&[2]);
    let mut sel = Selection::new();
    sel.select(ids[0]);
    assert_eq!(board.get(&ids[0]).unwrap().z_index(), 2);
}

// =============================================================
// paint_order
// =============================================================

#[test]
fn paint_order_without_selection_follows_z() {
    let (board, ids) = board_with(&[5, 1, 3]);
    let order = order_ids(&paint_order(&board, &Selection::new()));
    assert_eq!(order, vec![ids[1], ids[2], ids[0]]);
}

#[test]
fn paint_order_higher_z_paints_later() {
    let (board, ids) = board_with(&[7, 2]);
    let order = order_ids(&paint_order(&board, &Selection::new()));
    let pos = |id: &ItemId| order.iter().position(|x| x == id).unwrap();
    assert!(pos(&ids[0]) > pos(&ids[1]));
}

#[test]
fn paint_order_selected_paints_last() {
    let (board, ids) = board_with(&[1, 500, 3]);
    let mut sel = Selection::new();
    sel.select(ids[0]);
    let order = order_ids(&paint_order(&board, &sel));
    assert_eq!(order, vec![ids[2], ids[1], ids[0]]);
}

#[test]
fn paint_order_selection_of_missing_item_is_ignored() {
    let (board, ids) = board_with(&[1, 2]);
    let mut sel = Selection::new();
    sel.select(Uuid::new_v4());
    let order = order_ids(&paint_order(&board, &sel));
    assert_eq!(order, ids);
}
