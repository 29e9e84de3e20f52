// Host-side tests for pointer mapping, paint gestures, key bindings and the
// frame-loop scheduling state.

use app_core::*;

#[test]
fn cell_at_maps_by_geometry() {
    assert_eq!(cell_at(0.0, 0.0, 640.0, 640.0), Some((0, 0)));
    assert_eq!(cell_at(639.9, 639.9, 640.0, 640.0), Some((15, 15)));
    // x is the column, y is the row
    assert_eq!(cell_at(45.0, 85.0, 640.0, 640.0), Some((2, 1)));
    // Non-square surfaces scale per axis
    assert_eq!(cell_at(150.0, 10.0, 800.0, 160.0), Some((1, 3)));
}

#[test]
fn letterboxed_surface_centres_the_grid() {
    assert_eq!(grid_rect(800.0, 600.0), (100.0, 0.0, 600.0));
    assert_eq!(grid_rect(600.0, 800.0), (0.0, 100.0, 600.0));
    // Side bands are outside the grid
    assert_eq!(cell_in_surface(50.0, 300.0, 800.0, 600.0), None);
    assert_eq!(cell_in_surface(100.0, 0.0, 800.0, 600.0), Some((0, 0)));
    assert_eq!(cell_in_surface(699.0, 599.0, 800.0, 600.0), Some((15, 15)));
    assert_eq!(cell_in_surface(10.0, 10.0, 0.0, 0.0), None);
}

#[test]
fn cell_at_rejects_outside_and_degenerate_input() {
    assert_eq!(cell_at(-1.0, 10.0, 640.0, 640.0), None);
    assert_eq!(cell_at(10.0, 640.0, 640.0, 640.0), None);
    assert_eq!(cell_at(10.0, 10.0, 0.0, 640.0), None);
    assert_eq!(cell_at(f32::NAN, 10.0, 640.0, 640.0), None);
}

#[test]
fn press_toggles_and_drag_activates_new_cells() {
    let mut g = PaintGesture::default();
    assert!(!g.is_active());
    assert_eq!(g.drag(Some((1, 1))), None, "drag without press paints nothing");

    assert_eq!(
        g.press(Some((2, 3))),
        Some(PaintAction::Toggle { row: 2, col: 3 })
    );
    assert!(g.is_active());
    assert_eq!(g.drag(Some((2, 3))), None, "lingering on the pressed cell");
    assert_eq!(
        g.drag(Some((2, 4))),
        Some(PaintAction::Activate { row: 2, col: 4 })
    );
    assert_eq!(g.drag(Some((2, 4))), None);
    assert_eq!(g.drag(None), None);
    assert_eq!(
        g.drag(Some((2, 3))),
        Some(PaintAction::Activate { row: 2, col: 3 })
    );

    g.release();
    assert!(!g.is_active());
    assert_eq!(g.drag(Some((5, 5))), None);
}

#[test]
fn press_outside_grid_does_not_start_a_gesture() {
    let mut g = PaintGesture::default();
    assert_eq!(g.press(None), None);
    assert!(!g.is_active());
}

#[test]
fn keys_map_to_commands() {
    assert_eq!(command_for_key(" "), Some(Command::TogglePlay));
    for (key, layer) in [("1", 0), ("2", 1), ("3", 2), ("4", 3)] {
        assert_eq!(command_for_key(key), Some(Command::SelectLayer(layer)));
    }
    assert_eq!(command_for_key("ArrowRight"), Some(Command::TempoUp));
    assert_eq!(command_for_key("="), Some(Command::TempoUp));
    assert_eq!(command_for_key("ArrowLeft"), Some(Command::TempoDown));
    assert_eq!(command_for_key("ArrowUp"), Some(Command::MasterGainUp));
    assert_eq!(command_for_key("ArrowDown"), Some(Command::MasterGainDown));
    assert_eq!(command_for_key("E"), Some(Command::CycleArchetype));
    assert_eq!(command_for_key("]"), Some(Command::VolumeUp));
    assert_eq!(command_for_key("["), Some(Command::VolumeDown));
    assert_eq!(command_for_key("c"), Some(Command::ClearLayer));
    assert_eq!(command_for_key("h"), Some(Command::ToggleHint));
    assert_eq!(command_for_key("5"), None);
    assert_eq!(command_for_key("Enter"), None);
}

#[test]
fn frame_loop_runs_only_while_effects_live() {
    let mut frames = FrameLoop::new();
    assert!(!frames.is_running());
    assert!(frames.request(), "idle loop needs scheduling");
    assert!(!frames.request(), "already scheduled");
    assert!(frames.finish_frame(true));
    assert!(!frames.finish_frame(false));
    assert!(!frames.is_running());
    assert_eq!(frames.frames(), 2);
    assert!(frames.request());
    frames.cancel();
    assert!(!frames.is_running());
}

#[test]
fn stopwatch_is_monotonic() {
    let sw = Stopwatch::new();
    let a = sw.elapsed_ms();
    let b = sw.elapsed_ms();
    assert!(a >= 0.0 && b >= a);
}
