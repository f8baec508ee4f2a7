#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::geometry::{Point, TextAlign};

/// Records which entry point was called and with what.
#[derive(Default)]
struct Recorder {
    calls: Vec<String>,
}

impl ContentRenderer for Recorder {
    type Output = String;

    fn image(&mut self, url: &str, _opts: &DisplayOptions<'_>) -> String {
        self.log(format!("image:{url}"))
    }

    fn image_placeholder(&mut self, _opts: &DisplayOptions<'_>) -> String {
        self.log("image-placeholder".into())
    }

    fn broken_image(&mut self, _opts: &DisplayOptions<'_>) -> String {
        self.log("broken-image".into())
    }

    fn media(&mut self, kind: MediaKind, url: &str, title: &str, _opts: &DisplayOptions<'_>) -> String {
        self.log(format!("media:{kind:?}:{url}:{title}"))
    }

    fn pdf(&mut self, url: &str, open_on_click: bool, _opts: &DisplayOptions<'_>) -> String {
        self.log(format!("pdf:{url}:{open_on_click}"))
    }

    fn text(&mut self, body: &str, _style: &TextStyle, font_px: f64, _opts: &DisplayOptions<'_>) -> String {
        self.log(format!("text:{body}:{font_px}"))
    }

    fn link(&mut self, url: &str, interactive: bool, _opts: &DisplayOptions<'_>) -> String {
        self.log(format!("link:{url}:{interactive}"))
    }

    fn unknown(&mut self, type_name: &str, _opts: &DisplayOptions<'_>) -> String {
        self.log(format!("unknown:{type_name}"))
    }
}

impl Recorder {
    fn log(&mut self, entry: String) -> String {
        self.calls.push(entry.clone());
        entry
    }
}

fn item(kind: ItemKind, content: &str) -> CanvasItem {
    CanvasItem::new(Uuid::new_v4(), kind, content)
}

fn render_one(item: &CanvasItem, images: &ImageLoads, editable: bool) -> String {
    let mut board = Board::new();
    board.insert(item.clone());
    let views = plan(&board, &Viewport::default(), &Selection::new(), images, editable, None);
    let mut rec = Recorder::default();
    dispatch(&views[0], &mut rec)
}

// =============================================================
// Dispatch per type
// =============================================================

#[test]
fn image_shows_placeholder_until_loaded() {
    let img = item(ItemKind::Image, "https://cdn/a.png");
    let mut images = ImageLoads::new();
    assert_eq!(render_one(&img, &images, true), "image-placeholder");

    images.report(img.id, &img.content, ImageEvent::Loaded);
    assert_eq!(render_one(&img, &images, true), "image:https://cdn/a.png");
}

#[test]
fn image_error_shows_broken_affordance() {
    let img = item(ItemKind::Image, "https://cdn/missing.png");
    let mut images = ImageLoads::new();
    images.report(img.id, &img.content, ImageEvent::Error);
    assert_eq!(render_one(&img, &images, true), "broken-image");
}

#[test]
fn image_new_url_resets_to_loading() {
    let mut img = item(ItemKind::Image, "https://cdn/old.png");
    let mut images = ImageLoads::new();
    images.report(img.id, &img.content, ImageEvent::Error);
    img.content = "https://cdn/new.png".into();
    assert_eq!(images.status(&img), ImageStatus::Loading);
}

#[test]
fn image_report_detects_change() {
    let img = item(ItemKind::Image, "u");
    let mut images = ImageLoads::new();
    assert!(images.report(img.id, "u", ImageEvent::Loaded));
    assert!(!images.report(img.id, "u", ImageEvent::Loaded));
    assert!(images.report(img.id, "u", ImageEvent::Error));
    images.forget(&img.id);
    assert_eq!(images.status(&img), ImageStatus::Loading);
}

#[test]
fn video_delegates_with_title() {
    let video = item(ItemKind::Video, "https://cdn/clip.mp4").with_title("Teaser");
    assert_eq!(render_one(&video, &ImageLoads::new(), true), "media:Video:https://cdn/clip.mp4:Teaser");
}

#[test]
fn audio_title_falls_back_to_file_name() {
    let audio = item(ItemKind::Audio, "https://cdn/tracks/song.mp3?token=abc");
    assert_eq!(
        render_one(&audio, &ImageLoads::new(), true),
        "media:Audio:https://cdn/tracks/song.mp3?token=abc:song.mp3"
    );
}

#[test]
fn media_without_usable_url_is_untitled() {
    let audio = item(ItemKind::Audio, "");
    assert!(render_one(&audio, &ImageLoads::new(), true).ends_with(":Untitled"));
}

#[test]
fn pdf_opens_on_click_only_when_not_editable() {
    let pdf = item(ItemKind::Pdf, "https://cdn/doc.pdf");
    assert_eq!(render_one(&pdf, &ImageLoads::new(), true), "pdf:https://cdn/doc.pdf:false");
    assert_eq!(render_one(&pdf, &ImageLoads::new(), false), "pdf:https://cdn/doc.pdf:true");
}

#[test]
fn link_interactivity_is_inverse_of_editable() {
    let link = item(ItemKind::Link, "https://example.com");
    assert_eq!(render_one(&link, &ImageLoads::new(), true), "link:https://example.com:false");
    assert_eq!(render_one(&link, &ImageLoads::new(), false), "link:https://example.com:true");
}

#[test]
fn text_renders_body_with_scaled_font() {
    let text = item(ItemKind::Text, "hello board");
    let mut board = Board::new();
    board.insert(text);
    let vp = Viewport { scale: 0.5, ..Viewport::default() };
    let views = plan(&board, &vp, &Selection::new(), &ImageLoads::new(), true, None);
    let mut rec = Recorder::default();
    assert_eq!(dispatch(&views[0], &mut rec), "text:hello board:8");
}

#[test]
fn unknown_type_renders_placeholder() {
    let odd = item(ItemKind::parse("hologram"), "???");
    assert_eq!(render_one(&odd, &ImageLoads::new(), true), "unknown:hologram");
}

#[test]
fn every_kind_dispatches_without_failing() {
    let kinds = ["image", "video", "audio", "pdf", "text", "link", "", "gif", "IMAGE"];
    let mut board = Board::new();
    for tag in kinds {
        board.insert(item(ItemKind::parse(tag), "https://cdn/x"));
    }
    let views = plan(&board, &Viewport::default(), &Selection::new(), &ImageLoads::new(), true, None);
    let mut rec = Recorder::default();
    let out = render_all(&views, &mut rec);
    assert_eq!(out.len(), kinds.len());
    assert_eq!(rec.calls.iter().filter(|c| c.starts_with("unknown:")).count(), 2);
}

// =============================================================
// Display options
// =============================================================

#[test]
fn plan_transforms_frame_to_screen() {
    let img = item(ItemKind::Image, "u")
        .with_position(100.0, 50.0)
        .with_size(200.0, 100.0)
        .with_opacity(0.6);
    let mut board = Board::new();
    board.insert(img);
    let vp = Viewport { scale: 0.5, pan_x: 10.0, pan_y: 20.0 };
    let views = plan(&board, &vp, &Selection::new(), &ImageLoads::new(), true, None);
    let opts = &views[0].options;
    assert_eq!(opts.frame, Rect::new(60.0, 45.0, 100.0, 50.0));
    assert_eq!(opts.opacity, 0.6);
    assert_eq!(vp.canvas_to_screen(Point::new(100.0, 50.0)), Point::new(60.0, 45.0));
}

#[test]
fn plan_uses_staged_frame_for_active_item() {
    let a = item(ItemKind::Image, "a").with_size(100.0, 100.0);
    let b = item(ItemKind::Image, "b").with_size(100.0, 100.0);
    let a_id = a.id;
    let mut board = Board::new();
    board.insert(a);
    board.insert(b);

    let staged = Some((a_id, Rect::new(40.0, 40.0, 160.0, 120.0)));
    let views = plan(&board, &Viewport::default(), &Selection::new(), &ImageLoads::new(), true, staged);
    assert_eq!(views[0].options.frame, Rect::new(40.0, 40.0, 160.0, 120.0));
    assert_eq!(views[1].options.frame, Rect::new(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn plan_marks_selected_and_paints_it_last() {
    let a = item(ItemKind::Image, "a").with_z_index(1);
    let b = item(ItemKind::Image, "b").with_z_index(9);
    let a_id = a.id;
    let mut board = Board::new();
    board.insert(a);
    board.insert(b);
    let mut sel = Selection::new();
    sel.select(a_id);

    let views = plan(&board, &Viewport::default(), &sel, &ImageLoads::new(), true, None);
    assert_eq!(views.last().map(|v| v.id), Some(a_id));
    assert!(views.last().unwrap().options.selected);
    assert!(!views[0].options.selected);
}

#[test]
fn pointer_events_by_content() {
    let mut board = Board::new();
    let text = item(ItemKind::Text, "t");
    let video = item(ItemKind::Video, "v");
    let link = item(ItemKind::Link, "l");
    let (text_id, video_id, link_id) = (text.id, video.id, link.id);
    board.insert(text);
    board.insert(video);
    board.insert(link);

    let views = plan(&board, &Viewport::default(), &Selection::new(), &ImageLoads::new(), true, None);
    let events = |id: ItemId| views.iter().find(|v| v.id == id).unwrap().options.pointer_events;
    assert!(!events(text_id));
    assert!(events(video_id));
    assert!(!events(link_id));
}

#[test]
fn text_style_passes_through() {
    let style = TextStyle { text_align: TextAlign::Right, color: "#abc".into(), ..TextStyle::default() };
    let text = item(ItemKind::Text, "x").with_text_style(style.clone());
    let content = content_for(&text, &ImageLoads::new(), true, 1.0);
    assert!(matches!(content, ContentView::Text { style: s, .. } if *s == style));
}

#[test]
fn item_view_serializes_with_view_tag() {
    let link = item(ItemKind::Link, "https://example.com");
    let content = content_for(&link, &ImageLoads::new(), false, 1.0);
    let value = serde_json::to_value(&content).unwrap();
    assert_eq!(value["view"], "link");
    assert_eq!(value["interactive"], true);
}
