// Copyright (c) 2026 rezky_nightky

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info};

use crate::error::Result;
use crate::frame::Frame;
use crate::grid::ColumnGrid;
use crate::terminal::Screen;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    Reset,
    Resize(u16, u16),
}

pub fn action_for_key(k: &KeyEvent) -> Option<Action> {
    if k.kind != KeyEventKind::Press {
        return None;
    }
    match (k.code, k.modifiers) {
        (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => Some(Action::Quit),
        (KeyCode::Char('r'), _) => Some(Action::Reset),
        _ => None,
    }
}

pub fn action_for_event(ev: &Event) -> Option<Action> {
    match ev {
        Event::Key(k) => action_for_key(k),
        Event::Resize(w, h) => Some(Action::Resize(*w, *h)),
        _ => None,
    }
}

/// Simulation state shared by the frame timer and the event handlers.
/// Everything mutates it from one thread, one step at a time.
pub struct App {
    grid: ColumnGrid,
    frame: Frame,
    running: bool,
    pending_resize: Option<(u16, u16)>,
    reset_requested: bool,
}

/// What [`App::apply_pending`] did, so the loop knows what to draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Applied {
    pub resized: bool,
    pub reset: bool,
}

impl App {
    pub fn new(grid: ColumnGrid) -> Self {
        let frame = Frame::new(grid.cols(), grid.rows());
        Self {
            grid,
            frame,
            running: true,
            pending_resize: None,
            reset_requested: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    #[cfg(test)]
    pub fn grid(&self) -> &ColumnGrid {
        &self.grid
    }

    #[cfg(test)]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    pub fn has_pending(&self) -> bool {
        self.pending_resize.is_some() || self.reset_requested
    }

    pub fn handle_event(&mut self, ev: &Event) {
        match action_for_event(ev) {
            Some(Action::Quit) => self.quit(),
            Some(Action::Reset) => self.reset_requested = true,
            // Only the latest size matters.
            Some(Action::Resize(w, h)) => self.pending_resize = Some((w, h)),
            None => {}
        }
    }

    /// Apply a queued resize, then a queued reset.
    pub fn apply_pending(&mut self) -> Applied {
        let mut applied = Applied::default();

        if let Some((w, h)) = self.pending_resize.take() {
            debug!(cols = w, rows = h, "terminal resized");
            self.grid.resize(w, h);
            self.frame.resize(w, h);
            applied.resized = true;
        }

        if self.reset_requested {
            self.reset_requested = false;
            info!("rain reset");
            self.grid.reset();
            self.frame.clear();
            applied.reset = true;
        }

        applied
    }

    /// One animation tick: advance every droplet into the frame.
    pub fn tick(&mut self) {
        self.grid.render(&mut self.frame);
    }
}

/// Drive `app` at one frame per `period` until a quit key or `interrupted`.
///
/// Each iteration drains input first, then applies a pending resize or
/// reset, then renders if the frame deadline has passed. A frame always
/// finishes before the next event is looked at.
pub fn run<S: Screen>(
    app: &mut App,
    term: &mut S,
    period: Duration,
    interrupted: &AtomicBool,
) -> Result<()> {
    app.tick();
    term.draw(app.frame_mut())?;
    let mut next_frame = Instant::now() + period;

    while app.is_running() {
        loop {
            while term.poll_event(Duration::ZERO)? {
                let ev = term.read_event()?;
                app.handle_event(&ev);
            }
            if interrupted.load(Ordering::Relaxed) {
                info!("interrupted by signal");
                app.quit();
            }

            if !app.is_running() || app.has_pending() {
                break;
            }

            let now = Instant::now();
            if now >= next_frame {
                break;
            }
            let _ = term.poll_event(next_frame - now)?;
        }

        if !app.is_running() {
            break;
        }

        let applied = app.apply_pending();
        if applied.reset {
            app.tick();
            term.draw(app.frame_mut())?;
        } else if applied.resized {
            term.draw(app.frame_mut())?;
        }

        let now = Instant::now();
        if now >= next_frame {
            app.tick();
            term.draw(app.frame_mut())?;

            next_frame += period;
            let now = Instant::now();
            if now > next_frame {
                next_frame = now;
            }
        }
    }

    info!("rain stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use crossterm::event::KeyEventState;

    use super::*;
    use crate::droplet::tests::spawner;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn app(cols: u16, rows: u16) -> App {
        App::new(ColumnGrid::new(spawner(17), cols, rows))
    }

    #[test]
    fn quit_keys_stop_the_app() {
        for ev in [
            key(KeyCode::Char('q'), KeyModifiers::NONE),
            key(KeyCode::Esc, KeyModifiers::NONE),
            key(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut a = app(4, 4);
            a.handle_event(&ev);
            assert!(!a.is_running(), "{ev:?}");
        }
    }

    #[test]
    fn plain_c_and_releases_are_ignored() {
        let mut a = app(4, 4);
        a.handle_event(&key(KeyCode::Char('c'), KeyModifiers::NONE));
        a.handle_event(&Event::Key(KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        }));
        assert!(a.is_running());
        assert!(!a.has_pending());
    }

    #[test]
    fn resize_is_deferred_and_coalesced() {
        let mut a = app(5, 10);
        a.handle_event(&Event::Resize(8, 12));
        a.handle_event(&Event::Resize(3, 9));
        assert_eq!(a.grid().cols(), 5);
        assert!(a.has_pending());

        let applied = a.apply_pending();
        assert!(applied.resized && !applied.reset);
        assert_eq!((a.grid().cols(), a.grid().rows()), (3, 9));
        assert_eq!(a.grid().columns().len(), 3);
        assert_eq!((a.frame().width, a.frame().height), (3, 9));
        assert!(a.frame().is_dirty_all());
        assert!(!a.has_pending());
    }

    #[test]
    fn reset_key_rebuilds_the_grid() {
        let mut a = app(6, 20);
        for _ in 0..5 {
            a.tick();
        }
        a.handle_event(&key(KeyCode::Char('r'), KeyModifiers::NONE));
        let applied = a.apply_pending();
        assert!(applied.reset);
        assert!(a.frame().is_dirty_all());
        for column in a.grid().columns() {
            for d in column {
                assert_eq!(d.alive_ticks, 0);
            }
        }
    }

    #[test]
    fn tick_advances_every_droplet_once() {
        let mut a = app(3, 8);
        a.tick();
        for column in a.grid().columns() {
            for d in column {
                // Respawned droplets start over at zero.
                assert!(d.alive_ticks <= 1);
            }
        }
    }

    /// Scripted input; records `(width, height, full repaint)` per draw
    /// and presses `q` once `quit_after` frames went out.
    struct FakeScreen {
        events: VecDeque<Event>,
        draws: Vec<(u16, u16, bool)>,
        quit_after: usize,
    }

    impl FakeScreen {
        fn new(events: impl IntoIterator<Item = Event>, quit_after: usize) -> Self {
            Self {
                events: events.into_iter().collect(),
                draws: Vec::new(),
                quit_after,
            }
        }
    }

    impl Screen for FakeScreen {
        fn draw(&mut self, frame: &mut Frame) -> std::io::Result<()> {
            self.draws
                .push((frame.width, frame.height, frame.is_dirty_all()));
            frame.clear_dirty();
            if self.draws.len() == self.quit_after {
                self.events
                    .push_back(key(KeyCode::Char('q'), KeyModifiers::NONE));
            }
            Ok(())
        }

        fn poll_event(&mut self, _timeout: Duration) -> std::io::Result<bool> {
            Ok(!self.events.is_empty())
        }

        fn read_event(&mut self) -> std::io::Result<Event> {
            self.events
                .pop_front()
                .ok_or_else(|| std::io::Error::other("no scripted event"))
        }
    }

    #[test]
    fn queued_resize_is_applied_before_the_next_tick() {
        let mut a = app(5, 10);
        let mut screen = FakeScreen::new([Event::Resize(3, 6)], 3);
        let interrupted = AtomicBool::new(false);

        run(&mut a, &mut screen, Duration::ZERO, &interrupted).unwrap();

        assert_eq!(
            screen.draws,
            vec![(5, 10, true), (3, 6, true), (3, 6, false)]
        );
        assert_eq!(a.grid().columns().len(), 3);
        assert!(!a.is_running());
    }

    #[test]
    fn reset_redraws_from_a_cleared_frame() {
        let mut a = app(4, 8);
        let r = key(KeyCode::Char('r'), KeyModifiers::NONE);
        let mut screen = FakeScreen::new([r], 2);
        let interrupted = AtomicBool::new(false);

        run(&mut a, &mut screen, Duration::ZERO, &interrupted).unwrap();

        // Reset repaints in full, then the frame timer keeps diffing.
        assert_eq!(
            screen.draws,
            vec![(4, 8, true), (4, 8, true), (4, 8, false)]
        );
        for column in a.grid().columns() {
            for d in column {
                assert!(d.alive_ticks <= 2);
            }
        }
    }

    #[test]
    fn interrupt_flag_stops_after_the_first_frame() {
        let mut a = app(4, 4);
        let mut screen = FakeScreen::new(Vec::new(), usize::MAX);
        let interrupted = AtomicBool::new(true);

        run(&mut a, &mut screen, Duration::ZERO, &interrupted).unwrap();

        assert_eq!(screen.draws.len(), 1);
        assert!(!a.is_running());
    }
}
