//! End-to-end editing scenarios through the public session API.

use std::io::Cursor;
use std::sync::mpsc::{channel, Receiver};

use image::{GrayImage, Luma};
use tiffany_core::canvas::ToolMode;
use tiffany_core::events::RecordingProgress;
use tiffany_core::{
    Color, EditError, EditorConfig, EditorEvent, LoadMode, MemoryDecoder, PointerEvent,
    RotateCommand, Session,
};

fn png(width: u32, height: u32, gray: u8) -> Vec<u8> {
    let img = GrayImage::from_pixel(width, height, Luma([gray]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

/// A session whose decoder has `names` staged as 100x100 pages, each a
/// distinct gray so tests can tell them apart.
fn session_with(names: &[&str], config: EditorConfig) -> (Session, Receiver<EditorEvent>) {
    let mut decoder = MemoryDecoder::new();
    for (i, name) in names.iter().enumerate() {
        decoder.insert(*name, png(100, 100, 10 * (i as u8 + 1)));
    }
    let mut session = Session::new(config, Box::new(decoder));
    let (tx, rx) = channel();
    session.add_observer(Box::new(move |event: &EditorEvent| {
        let _ = tx.send(event.clone());
    }));
    (session, rx)
}

fn square_view() -> EditorConfig {
    EditorConfig {
        viewport_width: 100.0,
        viewport_height: 100.0,
        ..EditorConfig::default()
    }
}

fn grays(session: &Session) -> Vec<u8> {
    session
        .pages()
        .iter()
        .map(|page| page.bitmap().pixels[0])
        .collect()
}

#[test]
fn test_load_insert_and_delete() {
    let (mut session, _rx) = session_with(&["a.png", "b.png", "c.png", "d.png", "e.png"], square_view());

    session
        .load(&["a.png", "b.png", "c.png"], LoadMode::Append, &[])
        .unwrap();
    assert_eq!(grays(&session), vec![10, 20, 30]);

    // Two pages before the second one
    session
        .load(&["d.png", "e.png"], LoadMode::InsertBeforeSelection, &[1])
        .unwrap();
    assert_eq!(grays(&session), vec![10, 40, 50, 20, 30]);
    assert_eq!(session.pages().labels(), vec![1, 2, 3, 4, 5]);
    assert_eq!(session.canvas().active_index(), Some(1));

    session.delete_selection(&[1, 3]).unwrap();
    assert_eq!(grays(&session), vec![10, 50, 30]);
    assert_eq!(session.pages().labels(), vec![1, 2, 3]);
    assert_eq!(session.canvas().active_index(), Some(1));
}

#[test]
fn test_replace_selection_then_missing_file() {
    let (mut session, rx) = session_with(&["a.png", "b.png", "c.png", "x.png"], square_view());
    session
        .load(&["a.png", "b.png", "c.png"], LoadMode::Append, &[])
        .unwrap();
    rx.try_iter().for_each(drop);

    // "a.png" was consumed by the first load
    let report = session
        .load(&["x.png", "a.png"], LoadMode::ReplaceSelection, &[0, 2])
        .unwrap();
    assert_eq!(report.loaded, 1);
    assert_eq!(report.failed.len(), 1);
    // x replaced the first page, the unconsumed selection was removed
    assert_eq!(grays(&session), vec![40, 20]);

    let events: Vec<EditorEvent> = rx.try_iter().collect();
    assert!(events
        .iter()
        .any(|e| matches!(e, EditorEvent::DecodeFailed { path, .. } if path == "a.png")));
}

#[test]
fn test_failed_replace_removes_selected_page() {
    let (mut session, _rx) = session_with(&["a.png", "b.png", "c.png"], square_view());
    session
        .load(&["a.png", "b.png", "c.png"], LoadMode::Append, &[])
        .unwrap();
    session.select(&[1]);

    let report = session
        .load(&["unknown.png"], LoadMode::ReplaceSelection, &[1])
        .unwrap();
    assert_eq!(report.loaded, 0);
    assert_eq!(grays(&session), vec![10, 30]);
    assert_eq!(session.pages().labels(), vec![1, 2]);
    assert_eq!(session.canvas().active_index(), Some(1));
}

#[test]
fn test_insert_without_selection_is_refused() {
    let (mut session, _rx) = session_with(&["a.png"], square_view());
    assert_eq!(
        session.load(&["a.png"], LoadMode::InsertBeforeSelection, &[]),
        Err(EditError::NoInsertionPoint)
    );
    assert!(session.pages().is_empty());
}

#[test]
fn test_draw_fill_undo_redo() {
    let (mut session, _rx) = session_with(&["a.png"], square_view());
    session.load(&["a.png"], LoadMode::Append, &[]).unwrap();
    let original = session.pages().get(0).unwrap().bitmap().clone();

    session.with_canvas(|canvas, _| canvas.set_tool(ToolMode::Draw));
    session.pointer_down(PointerEvent::primary(10.0, 50.0));
    session.pointer_move(PointerEvent::primary(60.0, 50.0));
    session.pointer_up(PointerEvent::primary(90.0, 50.0));
    let page = session.pages().get(0).unwrap();
    assert_eq!(page.bitmap().pixel(75, 50), Color::BLACK);
    assert_eq!(page.change_count(), 1);

    session.with_canvas(|canvas, _| canvas.set_tool(ToolMode::Fill));
    session.pointer_down(PointerEvent::primary(0.0, 0.0));
    session.pointer_up(PointerEvent::primary(20.0, 20.0));
    let page = session.pages().get(0).unwrap();
    assert_eq!(page.bitmap().pixel(5, 5), Color::WHITE);
    assert_eq!(page.change_count(), 2);
    let filled = page.bitmap().clone();

    assert_eq!(session.undo(), Ok(true));
    assert_eq!(session.undo(), Ok(true));
    assert_eq!(session.pages().get(0).unwrap().bitmap(), &original);
    assert!(!session.pages().get(0).unwrap().is_modified());
    assert_eq!(session.undo(), Ok(false));

    assert_eq!(session.redo(), Ok(true));
    assert_eq!(session.redo(), Ok(true));
    assert_eq!(session.pages().get(0).unwrap().bitmap(), &filled);
}

#[test]
fn test_seven_edits_keep_five_undo_steps() {
    let (mut session, _rx) = session_with(&["a.png"], square_view());
    session.load(&["a.png"], LoadMode::Append, &[]).unwrap();
    session.with_canvas(|canvas, _| canvas.set_tool(ToolMode::Draw));
    for i in 0..7 {
        let y = 10.0 * i as f64 + 5.0;
        session.pointer_down(PointerEvent::primary(5.0, y));
        session.pointer_up(PointerEvent::primary(50.0, y));
    }
    assert_eq!(session.canvas().history().undo_depth(), 5);

    let mut undone = 0;
    while session.undo().unwrap() {
        undone += 1;
    }
    assert_eq!(undone, 5);
    assert_eq!(session.pages().get(0).unwrap().change_count(), 2);
}

#[test]
fn test_switching_pages_restores_view_and_flushes_history() {
    let (mut session, _rx) = session_with(&["a.png", "b.png"], square_view());
    session
        .load(&["a.png", "b.png"], LoadMode::Append, &[])
        .unwrap();
    session.with_canvas(|canvas, _| canvas.set_tool(ToolMode::Draw));
    session.pointer_down(PointerEvent::primary(5.0, 5.0));
    session.pointer_up(PointerEvent::primary(5.0, 5.0));
    session.with_canvas(|canvas, _| canvas.zoom_in());
    let memo = session.canvas().view().memo();

    session.select(&[1]);
    assert!(!session.canvas().history().can_undo());
    assert_eq!(session.undo(), Ok(false));

    session.select(&[0]);
    assert_eq!(session.canvas().view().memo(), memo);
}

#[test]
fn test_rotate_marks_pages_and_thumbnails() {
    let config = EditorConfig {
        thumbnail_size: 40,
        ..square_view()
    };
    let (mut session, _rx) = session_with(&["a.png", "b.png"], config);
    session
        .load(&["a.png", "b.png"], LoadMode::Append, &[])
        .unwrap();

    let mut progress = RecordingProgress::default();
    session
        .with_canvas(|_, pages| pages.rotate_selection(&[1], 2, &mut progress))
        .unwrap();
    assert_eq!(progress.updates.len(), 3);

    session
        .rotate_selection(&[0], RotateCommand::CounterClockwise)
        .unwrap();
    let pages = session.pages();
    assert_eq!(pages.select_modified(), vec![0, 1]);
    assert_eq!(pages.get(0).unwrap().rotation(), 3);
    assert_eq!(pages.get(0).unwrap().thumbnail().dimensions(), (40, 40));
    assert_eq!(pages.get(0).unwrap().thumbnail().pixel(3, 3), Color::RED);
}

#[test]
fn test_zoom_events_reach_observers() {
    let (mut session, rx) = session_with(&["a.png"], square_view());
    session.load(&["a.png"], LoadMode::Append, &[]).unwrap();
    rx.try_iter().for_each(drop);

    session.with_canvas(|canvas, _| {
        canvas.zoom_in();
        canvas.zoom_out();
    });
    let factors: Vec<f64> = rx
        .try_iter()
        .filter_map(|e| match e {
            EditorEvent::ViewChanged { scale_factor, .. } => Some(scale_factor),
            _ => None,
        })
        .collect();
    assert_eq!(factors.len(), 2);
    assert!((factors[0] - 1.25).abs() < 1e-9);
    assert!((factors[1] - 1.0).abs() < 1e-9);
}
