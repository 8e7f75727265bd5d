use mapscope::prelude::*;
use std::sync::Mutex;

/// Desktop scenarios: hovering, the magnifier zone, pointer lock and clicks
/// through the letterboxed map element.
#[cfg(test)]
mod desktop_scenarios {
    use super::*;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn catalog() -> Arc<RegionCatalog> {
        Arc::new(
            RegionCatalog::from_regions(vec![
                RegionDescriptor::from_bounds("mainland", "Mainland", Bounds::from_xywh(100.0, 100.0, 300.0, 200.0))
                    .unwrap(),
                RegionDescriptor::from_bounds("islet", "Islet", Bounds::from_xywh(600.0, 300.0, 2.0, 2.0)).unwrap(),
                RegionDescriptor::from_bounds("speck", "Speck", Bounds::from_xywh(410.0, 150.0, 0.2, 0.4)).unwrap(),
            ])
            .unwrap(),
        )
    }

    /// Content 1000x500 drawn 1:1 into a 1200x500 element at (50, 20):
    /// 100 px of letterbox on each side
    fn letterboxed() -> ViewportDescriptor {
        ViewportDescriptor::new(
            Bounds::parse_view_box("0 0 1000 500").unwrap(),
            Bounds::from_xywh(50.0, 20.0, 1200.0, 500.0),
        )
    }

    fn screen(content: Point) -> Point {
        letterboxed().to_screen_space(content)
    }

    fn settle(pointer: &mut PrecisionPointer) {
        let start = Instant::now();
        for frame in 0..300u64 {
            pointer.tick(Duration::from_millis(16), start + Duration::from_millis(16 * frame));
        }
    }

    fn selections(pointer: &mut PrecisionPointer) -> Arc<Mutex<Vec<String>>> {
        let selected = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&selected);
        pointer.on_select(move |region| sink.lock().unwrap().push(region.id.clone()));
        selected
    }

    /// A click lands on the region under the cursor despite the letterbox
    #[test]
    fn test_click_through_letterbox() {
        init_logging();
        let mut pointer = PrecisionPointer::new(catalog(), PointerOptions::default(), InputMode::Desktop);
        let selected = selections(&mut pointer);
        let viewport = letterboxed();

        let target = screen(Point::new(250.0, 200.0));
        assert_eq!(target, Point::new(400.0, 220.0));

        pointer.handle_pointer(PointerInput::moved(target), &viewport);
        pointer.handle_pointer(PointerInput::down(target), &viewport);
        pointer.handle_pointer(PointerInput::up(target), &viewport);

        assert_eq!(*selected.lock().unwrap(), vec!["mainland".to_string()]);
        let cursor = pointer.cursor().unwrap();
        assert!((cursor.content.x - 250.0).abs() < 0.01);
        assert!((cursor.content.y - 200.0).abs() < 0.01);
    }

    /// Dragging the map further than the tap threshold never selects
    #[test]
    fn test_drag_does_not_select() {
        let mut pointer = PrecisionPointer::new(catalog(), PointerOptions::default(), InputMode::Desktop);
        let selected = selections(&mut pointer);
        let viewport = letterboxed();

        let start = screen(Point::new(250.0, 200.0));
        pointer.handle_pointer(PointerInput::moved(start), &viewport);
        pointer.handle_pointer(PointerInput::down(start), &viewport);
        pointer.handle_pointer(PointerInput::moved(start.add(&Point::new(12.0, 0.0))), &viewport);
        pointer.handle_pointer(PointerInput::up(start.add(&Point::new(12.0, 0.0))), &viewport);

        assert!(selected.lock().unwrap().is_empty());
        assert_eq!(pointer.state().phase_name(), "hovering");
    }

    /// A sub-pixel region next to the cursor drives the zoom up to the target size
    #[test]
    fn test_very_small_region_gets_magnified() {
        let mut options = PointerOptions::default();
        options.zoom.max_zoom = 1000.0;
        let mut pointer = PrecisionPointer::new(catalog(), options, InputMode::Desktop);
        let viewport = letterboxed();

        pointer.handle_pointer(PointerInput::moved(screen(Point::new(405.0, 150.0))), &viewport);
        assert_eq!(pointer.state().phase_name(), "magnifier_active");

        let snapshot = pointer.debug_snapshot();
        let speck = snapshot
            .detection
            .detected_regions
            .iter()
            .find(|region| region.id == "speck")
            .unwrap();
        assert!(speck.is_very_small);
        assert!((speck.pixel_area - 0.08).abs() < 1e-9);

        let search = snapshot.zoom_search.unwrap();
        assert_eq!(search.accepted_region().unwrap().id, "speck");
        assert!(0.2 * search.zoom >= 40.0 - 1e-9);

        settle(&mut pointer);
        let view = pointer.magnifier_view().unwrap();
        assert!((view.zoom - search.zoom).abs() < 1e-9);
        assert!(view.view_box.contains(&Point::new(405.0, 150.0)));
    }

    /// Leaving the neighbourhood of tiny regions closes the magnifier again
    #[test]
    fn test_magnifier_closes_away_from_tiny_regions() {
        let mut pointer = PrecisionPointer::new(catalog(), PointerOptions::default(), InputMode::Desktop);
        let viewport = letterboxed();

        pointer.handle_pointer(PointerInput::moved(screen(Point::new(590.0, 300.0))), &viewport);
        assert!(pointer.state().is_magnifier_active());

        // Far enough that dampening cannot matter: the ratio is far below threshold
        pointer.handle_pointer(PointerInput::moved(screen(Point::new(800.0, 100.0))), &viewport);
        assert_eq!(pointer.state().phase_name(), "hovering");

        settle(&mut pointer);
        assert_eq!(pointer.magnifier_view().unwrap().opacity, 0.0);
    }

    /// Lock request, grant, dampened relative motion, lock-confirm click, escape
    #[test]
    fn test_pointer_lock_flow() {
        init_logging();
        let mut pointer = PrecisionPointer::new(catalog(), PointerOptions::default(), InputMode::Desktop);
        let selected = selections(&mut pointer);
        let viewport = letterboxed();

        pointer.handle_pointer(PointerInput::moved(screen(Point::new(601.0, 301.0))), &viewport);
        assert_eq!(pointer.hovered_region(), Some("islet"));

        assert_eq!(pointer.request_lock(), vec![Effect::RequestPointerLock]);
        assert_eq!(pointer.state().phase_name(), "lock_requested");
        assert!(pointer.lock_granted().is_empty());
        assert!(pointer.state().is_pointer_locked());

        // The 480x200 lens draws 0.4 px per map px at zoom 1, so the lock
        // floor is 20 / 0.4
        settle(&mut pointer);
        assert_eq!(pointer.current_zoom(), 50.0);

        // Absolute moves are ignored while locked
        pointer.handle_pointer(PointerInput::moved(Point::new(0.0, 0.0)), &viewport);
        assert_eq!(pointer.cursor().unwrap().content, Point::new(601.0, 301.0));

        pointer.handle_locked_motion(Point::new(2.0, 0.0), &viewport);
        let cursor = pointer.cursor().unwrap();
        assert!((cursor.content.x - 601.5).abs() < 1e-9);
        let assessment = pointer.debug_snapshot().precision.unwrap();
        assert_eq!(assessment.screen_pixel_ratio, 20.0);
        assert_eq!(assessment.movement_multiplier, 0.25);

        pointer.handle_pointer(PointerInput::down(Point::new(0.0, 0.0)), &viewport);
        assert_eq!(*selected.lock().unwrap(), vec!["islet".to_string()]);

        assert_eq!(pointer.escape(), vec![Effect::ReleasePointerLock]);
        assert_eq!(pointer.state().phase_name(), "magnifier_active");
    }

    /// A 0.05-unit grain in the middle of a plain 1000x500 map
    fn grain_catalog() -> Arc<RegionCatalog> {
        Arc::new(
            RegionCatalog::from_regions(vec![RegionDescriptor::from_bounds(
                "grain",
                "Grain",
                Bounds::from_xywh(500.0, 250.0, 0.05, 0.05),
            )
            .unwrap()])
            .unwrap(),
        )
    }

    fn plain() -> ViewportDescriptor {
        ViewportDescriptor::new(
            Bounds::from_xywh(0.0, 0.0, 1000.0, 500.0),
            Bounds::from_xywh(0.0, 0.0, 1000.0, 500.0),
        )
    }

    /// Opens the magnifier on the grain and lets the zoom run up to the cap
    fn at_max_zoom(start: Instant) -> PrecisionPointer {
        let mut pointer = PrecisionPointer::new(grain_catalog(), PointerOptions::default(), InputMode::Desktop);
        pointer.handle_pointer_at(PointerInput::moved(Point::new(500.5, 250.0)), &plain(), start);
        assert_eq!(pointer.state().phase_name(), "magnifier_active");
        settle(&mut pointer);
        assert_eq!(pointer.current_zoom(), 60.0);
        pointer
    }

    /// Default options reach precision mode on a desktop-sized map
    #[test]
    fn test_default_options_reach_precision_mode() {
        let start = Instant::now();
        let mut pointer = at_max_zoom(start);

        pointer.handle_pointer_at(
            PointerInput::moved(Point::new(504.5, 250.0)),
            &plain(),
            start + Duration::from_secs(1),
        );
        let assessment = pointer.debug_snapshot().precision.unwrap();
        assert_eq!(assessment.zone, PrecisionZone::Precision);
        assert!((assessment.screen_pixel_ratio - 24.0).abs() < 1e-9);
        assert!(assessment.movement_multiplier < 1.0);
        assert!(assessment.offer_lock);
        assert!(pointer.magnifier_view().unwrap().precision_hint_visible);

        // 4 px of mouse travel, dampened to 0.25 * 20 / 24
        let cursor = pointer.cursor().unwrap();
        assert!((cursor.content.x - (500.5 + 4.0 * 0.25 * 20.0 / 24.0)).abs() < 1e-9);
    }

    /// Dismiss cancels a running hint timer; the render clock does not revive it
    #[test]
    fn test_dismiss_clears_visible_hint() {
        let start = Instant::now();
        let mut pointer = at_max_zoom(start);
        pointer.handle_pointer_at(
            PointerInput::moved(Point::new(502.5, 250.0)),
            &plain(),
            start + Duration::from_secs(1),
        );
        assert!(pointer.debug_snapshot().precision_hint_visible);

        pointer.dismiss();
        assert!(!pointer.debug_snapshot().precision_hint_visible);

        pointer.tick(Duration::from_millis(16), start + Duration::from_millis(1500));
        pointer.tick(Duration::from_millis(16), start + Duration::from_secs(10));
        assert!(!pointer.debug_snapshot().precision_hint_visible);
    }

    /// A fast flick inside the magnifier moves the cursor by the full raw delta
    #[test]
    fn test_fast_move_escapes_dampening() {
        let start = Instant::now();
        let mut pointer = at_max_zoom(start);
        let slow_at = start + Duration::from_secs(1);
        pointer.handle_pointer_at(PointerInput::moved(Point::new(502.5, 250.0)), &plain(), slow_at);
        assert!(pointer.debug_snapshot().precision_hint_visible);
        let before = pointer.cursor().unwrap().container;

        // 40 px in 10 ms = 4000 px/s
        pointer.handle_pointer_at(
            PointerInput::moved(Point::new(542.5, 250.0)),
            &plain(),
            slow_at + Duration::from_millis(10),
        );
        let after = pointer.cursor().unwrap().container;
        assert!((after.x - before.x - 40.0).abs() < 1e-9);
        assert_eq!(after.y, before.y);

        let snapshot = pointer.debug_snapshot();
        let assessment = snapshot.precision.unwrap();
        assert!(assessment.escaping);
        assert_eq!(assessment.movement_multiplier, 1.0);
        assert!(!assessment.offer_lock);
        assert!(!snapshot.precision_hint_visible);
    }

    /// A denied lock request falls back to the plain magnifier
    #[test]
    fn test_pointer_lock_denied() {
        let mut pointer = PrecisionPointer::new(catalog(), PointerOptions::default(), InputMode::Desktop);
        let viewport = letterboxed();
        pointer.handle_pointer(PointerInput::moved(screen(Point::new(601.0, 301.0))), &viewport);

        pointer.request_lock();
        assert!(pointer.lock_denied().is_empty());
        assert_eq!(pointer.state().phase_name(), "magnifier_active");
        assert!(!pointer.state().is_pointer_locked());
    }

    /// Dismiss releases the lock and clears hover and timers in one step
    #[test]
    fn test_dismiss_while_locked() {
        let mut pointer = PrecisionPointer::new(catalog(), PointerOptions::default(), InputMode::Desktop);
        let viewport = letterboxed();
        pointer.handle_pointer(PointerInput::moved(screen(Point::new(601.0, 301.0))), &viewport);
        pointer.request_lock();
        pointer.lock_granted();

        let effects = pointer.dismiss();
        assert_eq!(
            effects,
            vec![Effect::ReleasePointerLock, Effect::Dismissed, Effect::CancelTimers]
        );
        assert!(pointer.state().is_idle());
        assert_eq!(pointer.hovered_region(), None);
        assert!(!pointer.debug_snapshot().precision_hint_visible);
    }

    /// Cursor listeners hear about hover changes
    #[test]
    fn test_cursor_updates_carry_hover() {
        let mut pointer = PrecisionPointer::new(catalog(), PointerOptions::default(), InputMode::Desktop);
        let updates = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&updates);
        pointer.on_cursor_update(move |update| sink.lock().unwrap().push(update.hovered_region.clone()));

        let viewport = letterboxed();
        pointer.handle_pointer(PointerInput::moved(screen(Point::new(250.0, 200.0))), &viewport);
        pointer.handle_pointer(PointerInput::moved(screen(Point::new(800.0, 50.0))), &viewport);

        let updates = updates.lock().unwrap();
        assert!(updates.contains(&Some("mainland".to_string())));
        assert_eq!(updates.last().unwrap(), &None);
    }
}
