mod support;

use std::time::{Duration, Instant};

use album_viewer::config::Configuration;
use album_viewer::events::SlotId;
use album_viewer::viewer::{OPAQUE, TRANSPARENT};
use support::*;

const DELAY: Duration = Duration::from_millis(1000);

fn show_config() -> Configuration {
    Configuration {
        fade_step: 50,
        fade_time: ms(10),
        slideshow_delay: DELAY,
        ..config()
    }
}

/// Completes the pending load, fades it in and fires the following advance.
/// Returns the instant the advance fired.
fn display_and_advance(viewer: &mut TestViewer, now: Instant) -> Instant {
    assert!(complete_latest(viewer, now));
    let settled = finish_fade(viewer, now);
    assert_eq!(viewer.next_deadline(), Some(settled + DELAY));
    let due = settled + DELAY;
    viewer.on_tick(due);
    due
}

#[test]
fn sequential_show_advances_and_wraps() {
    let mut viewer = viewer_with(show_config(), album(4));
    let mut now = Instant::now();
    assert_eq!(viewer.slideshow_start(false, None, now), Some(0));
    assert!(viewer.slideshow_running());

    let mut shown = vec![viewer.selected_index().unwrap()];
    for _ in 0..5 {
        now = display_and_advance(&mut viewer, now);
        shown.push(viewer.selected_index().unwrap());
    }
    assert_eq!(shown, [0, 1, 2, 3, 0, 1]);
}

#[test]
fn advance_waits_for_the_full_delay() {
    let mut viewer = viewer_with(show_config(), album(4));
    let now = Instant::now();
    viewer.slideshow_start(false, None, now);
    complete_latest(&mut viewer, now);
    let settled = finish_fade(&mut viewer, now);

    viewer.on_tick(settled + DELAY - ms(1));
    assert_eq!(viewer.selected_index(), Some(0));
    viewer.on_tick(settled + DELAY);
    assert_eq!(viewer.selected_index(), Some(1));
}

#[test]
fn bounded_show_stops_at_the_last_image() {
    let cfg = Configuration {
        endless_album: false,
        ..show_config()
    };
    let mut viewer = viewer_with(cfg, album(3));
    let mut now = Instant::now();
    viewer.slideshow_start(false, None, now);
    now = display_and_advance(&mut viewer, now);
    now = display_and_advance(&mut viewer, now);
    assert_eq!(viewer.selected_index(), Some(2));

    display_and_advance(&mut viewer, now);
    assert_eq!(viewer.selected_index(), Some(2));
    assert_eq!(viewer.next_deadline(), None);
}

#[test]
fn random_show_never_repeats() {
    let mut viewer = viewer_with(show_config(), album(6));
    let mut now = Instant::now();
    let first = viewer.slideshow_start(true, None, now).unwrap();
    assert!(first < 5);
    assert!(viewer.slideshow_random());

    for _ in 0..20 {
        let before = viewer.selected_index();
        now = display_and_advance(&mut viewer, now);
        assert_ne!(viewer.selected_index(), before);
    }
}

#[test]
fn start_restarts_from_first_image_at_the_end() {
    let mut viewer = viewer_with(show_config(), album(4));
    let now = Instant::now();
    viewer.switch_to(3, now);
    complete_latest(&mut viewer, now);
    let now = finish_fade(&mut viewer, now);
    assert_eq!(viewer.slideshow_start(false, Some(2), now), Some(0));
}

#[test]
fn start_at_jumps_to_requested_image() {
    let mut viewer = viewer_with(show_config(), album(4));
    assert_eq!(viewer.slideshow_start(false, Some(2), Instant::now()), Some(2));
}

#[test]
fn start_on_the_selected_image_still_schedules_an_advance() {
    let mut viewer = viewer_with(show_config(), album(4));
    let now = Instant::now();
    viewer.switch_to(1, now);
    complete_latest(&mut viewer, now);
    let now = finish_fade(&mut viewer, now);

    assert_eq!(viewer.slideshow_start(false, Some(1), now), Some(1));
    assert_eq!(viewer.next_deadline(), Some(now + DELAY));
    viewer.on_tick(now + DELAY);
    assert_eq!(viewer.selected_index(), Some(2));
}

#[test]
fn stop_cancels_timers_and_pending_loads() {
    let mut viewer = viewer_with(show_config(), album(4));
    let now = Instant::now();
    viewer.slideshow_start(false, None, now);
    viewer.slideshow_stop();
    assert!(!viewer.slideshow_running());
    assert_eq!(viewer.next_deadline(), None);
    assert!(!complete_latest(&mut viewer, now));
    assert!(!viewer.is_fading());
}

#[test]
fn toggle_flips_running_state() {
    let mut viewer = viewer_with(show_config(), album(4));
    let now = Instant::now();
    assert!(viewer.slideshow_toggle(now));
    assert_eq!(viewer.selected_index(), Some(0));
    assert!(!viewer.slideshow_toggle(now));
    assert_eq!(viewer.next_deadline(), None);
}

#[test]
fn fade_keeps_transparency_in_range() {
    let cfg = Configuration {
        fade_step: 3,
        ..show_config()
    };
    let mut viewer = viewer_with(cfg, album(3));
    let mut now = Instant::now();
    viewer.switch_to(0, now);
    complete_latest(&mut viewer, now);

    let mut ticks = 0;
    while viewer.is_fading() {
        for slot in SlotId::BOTH {
            assert!(viewer.surface().transparency(slot) <= OPAQUE);
        }
        now = viewer.next_deadline().unwrap();
        viewer.on_tick(now);
        ticks += 1;
    }
    assert_eq!(ticks, 33);
    assert_eq!(viewer.surface().transparency(SlotId::Second), OPAQUE);
    assert_eq!(viewer.surface().transparency(SlotId::First), TRANSPARENT);
    assert!(!viewer.surface().rendered(SlotId::First));
    assert!(viewer.surface().rendered(SlotId::Second));
    assert_eq!(viewer.slots().visible(), SlotId::Second);
}

#[test]
fn single_slot_fade_leaves_outgoing_untouched() {
    let cfg = Configuration {
        fade_both: false,
        fade_step: 10,
        ..show_config()
    };
    let mut viewer = viewer_with(cfg, album(3));
    let now = Instant::now();
    viewer.switch_to(0, now);
    complete_latest(&mut viewer, now);

    assert_eq!(viewer.surface().transparency(SlotId::Second), 10);
    assert_eq!(viewer.surface().transparency(SlotId::First), OPAQUE);
    assert_eq!(viewer.slots().get(SlotId::First).transparency, 90);
}

#[test]
fn slow_loads_signal_loading_started() {
    let mut viewer = viewer_with(show_config(), album(3));
    let now = Instant::now();
    viewer.switch_to(1, now);
    viewer.on_tick(now + ms(10));
    complete_latest(&mut viewer, now + ms(50));
    finish_fade(&mut viewer, now + ms(50));

    assert_eq!(
        viewer.hooks().signals,
        [
            Signal::Switched(1),
            Signal::LoadingStarted,
            Signal::LoadingComplete,
            Signal::Displayed(1),
        ]
    );
}

#[test]
fn fast_loads_skip_loading_started() {
    let mut viewer = viewer_with(show_config(), album(3));
    let now = Instant::now();
    viewer.switch_to(1, now);
    complete_latest(&mut viewer, now + ms(5));
    finish_fade(&mut viewer, now + ms(5));

    assert_eq!(
        viewer.hooks().signals,
        [
            Signal::Switched(1),
            Signal::LoadingComplete,
            Signal::Displayed(1),
        ]
    );
}

#[test]
fn shutdown_clears_everything() {
    let mut viewer = viewer_with(show_config(), album(3));
    let now = Instant::now();
    viewer.slideshow_start(false, None, now);
    viewer.shutdown();
    assert!(!viewer.slideshow_running());
    assert_eq!(viewer.next_deadline(), None);
}

#[test]
fn restart_on_the_selection_mid_fade_finishes_the_fade() {
    let cfg = Configuration {
        fade_step: 10,
        ..show_config()
    };
    let mut viewer = viewer_with(cfg, album(4));
    let now = Instant::now();
    viewer.switch_to(1, now);
    assert!(complete_latest(&mut viewer, now));
    assert_eq!(viewer.surface().transparency(SlotId::Second), 10);

    // the restart stops the show first, then lands on the image already fading in
    assert_eq!(viewer.slideshow_start(false, Some(1), now), Some(1));
    assert!(viewer.slideshow_running());
    assert!(viewer.is_fading());
    assert_eq!(viewer.next_deadline(), Some(now));

    let settled = finish_fade(&mut viewer, now);
    assert!(viewer.slots().is_at_rest());
    assert_eq!(viewer.slots().visible(), SlotId::Second);
    assert_eq!(viewer.surface().transparency(SlotId::First), TRANSPARENT);
    assert_eq!(viewer.next_deadline(), Some(settled + DELAY));

    viewer.on_tick(settled + DELAY);
    assert_eq!(viewer.selected_index(), Some(2));
    assert_eq!(
        viewer.hooks().signals,
        [
            Signal::Switched(1),
            Signal::LoadingComplete,
            Signal::Displayed(1),
            Signal::Switched(2),
        ]
    );
}

#[test]
fn single_image_show_started_mid_fade_still_settles() {
    let cfg = Configuration {
        fade_step: 10,
        ..show_config()
    };
    let mut viewer = viewer_with(cfg, album(1));
    let now = Instant::now();
    viewer.switch_to(0, now);
    assert!(complete_latest(&mut viewer, now));

    assert_eq!(viewer.slideshow_start(false, None, now), Some(0));
    let settled = finish_fade(&mut viewer, now);
    assert!(viewer.slots().is_at_rest());
    assert_eq!(viewer.next_deadline(), Some(settled + DELAY));
}

#[test]
fn stop_mid_fade_freezes_until_the_selection_is_requested() {
    let cfg = Configuration {
        fade_step: 10,
        ..show_config()
    };
    let mut viewer = viewer_with(cfg, album(4));
    let now = Instant::now();
    viewer.slideshow_start(false, None, now);
    assert!(complete_latest(&mut viewer, now));
    viewer.on_tick(viewer.next_deadline().unwrap());

    viewer.slideshow_stop();
    assert!(viewer.is_fading());
    assert_eq!(viewer.next_deadline(), None);
    assert!(!viewer.slots().get(SlotId::Second).is_pending());
    let frozen = (
        viewer.surface().transparency(SlotId::First),
        viewer.surface().transparency(SlotId::Second),
    );
    assert_eq!(frozen, (80, 20));

    let later = now + ms(500);
    let loads = viewer.surface().loads.len();
    assert_eq!(viewer.switch_to(0, later), Some(0));
    assert_eq!(viewer.surface().loads.len(), loads);
    assert_eq!(viewer.next_deadline(), Some(later));

    finish_fade(&mut viewer, later);
    assert!(viewer.slots().is_at_rest());
    assert_eq!(viewer.slots().visible(), SlotId::Second);
    assert!(!viewer.slideshow_running());
    assert_eq!(viewer.next_deadline(), None);
    assert_eq!(viewer.hooks().signals.last(), Some(&Signal::Displayed(0)));
}
