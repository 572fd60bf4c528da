use std::io::stdout;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};
use log::{info, warn};

use crate::error::PollError;
use crate::synth::keyboard::{KeyMap, KeySource, KeyStates};

/// How long a key counts as held after an auto-repeat when the terminal
/// cannot report releases.
pub const DEFAULT_HOLD_TIMEOUT: Duration = Duration::from_millis(500);

/// How long a freshly pressed key counts as held while waiting for its first
/// auto-repeat. Covers the slowest common OS repeat delays (X11 660 ms,
/// Windows up to 1 s).
pub const DEFAULT_REPEAT_DELAY: Duration = Duration::from_millis(1100);

/// Default wait per poll (~60 polls per second).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Keyboard state read from terminal key events.
///
/// Terminals that support the keyboard enhancement protocol report key
/// releases, so held keys are tracked exactly. Elsewhere only presses and
/// auto-repeats arrive, and a key is considered released once nothing has
/// been heard from it for a while: the repeat delay until its first
/// auto-repeat, the hold timeout after that.
///
/// Expects the terminal to already be in raw mode.
pub struct TerminalKeyboard {
    map: KeyMap,
    held: KeyStates,
    /// Held keys that have auto-repeated at least once.
    repeating: KeyStates,
    last_seen: [Option<Instant>; KeyStates::CAPACITY],
    reports_releases: bool,
    enhanced: bool,
    poll_interval: Duration,
    hold_timeout: Duration,
    repeat_delay: Duration,
    quit: bool,
}

impl TerminalKeyboard {
    pub fn new(map: KeyMap) -> Self {
        let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false)
            && execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .is_ok();

        if enhanced {
            info!("terminal reports key releases");
        } else {
            warn!(
                "terminal cannot report key releases, keys are held for {:?} after the last repeat",
                DEFAULT_HOLD_TIMEOUT
            );
        }

        let mut keyboard = Self::detached(map, enhanced);
        keyboard.enhanced = enhanced;
        keyboard
    }

    /// A keyboard that never touches the terminal's protocol flags.
    fn detached(map: KeyMap, reports_releases: bool) -> Self {
        Self {
            map,
            held: KeyStates::NONE,
            repeating: KeyStates::NONE,
            last_seen: [None; KeyStates::CAPACITY],
            reports_releases,
            enhanced: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
            hold_timeout: DEFAULT_HOLD_TIMEOUT,
            repeat_delay: DEFAULT_REPEAT_DELAY,
            quit: false,
        }
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn hold_timeout(mut self, timeout: Duration) -> Self {
        self.hold_timeout = timeout;
        self
    }

    pub fn repeat_delay(mut self, delay: Duration) -> Self {
        self.repeat_delay = delay;
        self
    }

    /// Esc or Ctrl-C was pressed.
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn reports_releases(&self) -> bool {
        self.reports_releases
    }

    pub fn map(&self) -> &KeyMap {
        &self.map
    }

    fn handle_event(&mut self, event: Event, now: Instant) {
        match event {
            Event::Key(KeyEvent {
                code, modifiers, kind, ..
            }) => self.handle_key(code, modifiers, kind, now),
            // Releases that happen while unfocused are never delivered.
            Event::FocusLost => {
                self.held = KeyStates::NONE;
                self.repeating = KeyStates::NONE;
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind, now: Instant) {
        match code {
            KeyCode::Esc => self.quit = true,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => self.quit = true,
            KeyCode::Char(c) => {
                let Some(index) = self.map.index_of(c) else {
                    return;
                };
                match kind {
                    // Without release reporting, auto-repeats arrive as presses.
                    KeyEventKind::Repeat => self.repeated(index, now),
                    KeyEventKind::Press if self.held.is_down(index) => self.repeated(index, now),
                    KeyEventKind::Press => {
                        self.held.press(index);
                        self.repeating.release(index);
                        self.last_seen[index] = Some(now);
                    }
                    KeyEventKind::Release => {
                        self.held.release(index);
                        self.repeating.release(index);
                        self.last_seen[index] = None;
                    }
                }
            }
            _ => {}
        }
    }

    fn repeated(&mut self, index: usize, now: Instant) {
        self.held.press(index);
        self.repeating.press(index);
        self.last_seen[index] = Some(now);
    }

    fn expire(&mut self, now: Instant) {
        if self.reports_releases {
            return;
        }
        for index in self.held.iter() {
            let timeout = if self.repeating.is_down(index) {
                self.hold_timeout
            } else {
                self.repeat_delay
            };
            let stale = self.last_seen[index].map_or(true, |seen| now.duration_since(seen) >= timeout);
            if stale {
                self.held.release(index);
                self.repeating.release(index);
                self.last_seen[index] = None;
            }
        }
    }
}

impl KeySource for TerminalKeyboard {
    /// Waits up to the poll interval for the first event, then drains
    /// whatever else is queued.
    fn poll(&mut self) -> Result<KeyStates, PollError> {
        let mut timeout = self.poll_interval;
        while event::poll(timeout)? {
            timeout = Duration::ZERO;
            let event = event::read()?;
            self.handle_event(event, Instant::now());
        }

        self.expire(Instant::now());
        Ok(self.held)
    }
}

impl Drop for TerminalKeyboard {
    fn drop(&mut self) {
        if self.enhanced {
            let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
        }
    }
}
