use std::{cell::RefCell, rc::Rc};

use super::*;
use crate::{
    input::{
        InputEvent,
        buttons::{ButtonLevels, TwoButtonDecoder},
        mock::ScriptedInput,
    },
    render::testing::TextGrid,
    sequencer::testing::{RecordingPin, Timeline, VirtualDelay},
    storage::{MemoryStorage, RecordStore},
};

type Store = RecordStore<MemoryStorage<64>>;

const BUTTON_DEBOUNCE_POLLS: u8 = 2;

/// Counts `save` calls that reach the store.
struct CountingStore {
    inner: Store,
    saves: usize,
}

impl CountingStore {
    fn new(inner: Store) -> Self {
        Self { inner, saves: 0 }
    }
}

impl SettingsStore for CountingStore {
    type Error = <Store as SettingsStore>::Error;

    fn load(&mut self) -> Result<Option<WeldSettings>, Self::Error> {
        self.inner.load()
    }

    fn save(&mut self, settings: &WeldSettings) -> Result<(), Self::Error> {
        self.saves += 1;
        self.inner.save(settings)
    }
}

/// Feeds scripted button levels through the push-button decoder.
struct LevelInput {
    decoder: TwoButtonDecoder,
    levels: Vec<ButtonLevels>,
    cursor: usize,
}

impl LevelInput {
    fn new(levels: Vec<ButtonLevels>) -> Self {
        Self {
            decoder: TwoButtonDecoder::new(BUTTON_DEBOUNCE_POLLS),
            levels,
            cursor: 0,
        }
    }
}

/// `levels` held for `polls` consecutive samples.
fn held(levels: ButtonLevels, polls: usize) -> impl Iterator<Item = ButtonLevels> {
    core::iter::repeat_n(levels, polls)
}

impl InputSource for LevelInput {
    type Error = core::convert::Infallible;

    fn poll(&mut self, _now_ms: u64) -> Result<InputEvents, Self::Error> {
        let levels = self.levels.get(self.cursor).copied().unwrap_or_default();
        self.cursor += 1;
        Ok(self.decoder.decode(levels))
    }
}

fn controller<IN: InputSource>(
    input: IN,
    store: CountingStore,
    config: ControllerConfig,
) -> (
    Controller<IN, TextGrid, CountingStore, RecordingPin, VirtualDelay>,
    Rc<RefCell<Timeline>>,
) {
    let timeline = Timeline::shared();
    let sequencer = PulseSequencer::new(
        RecordingPin::new(timeline.clone()),
        VirtualDelay(timeline.clone()),
    );
    (
        Controller::new(input, TextGrid::new(), store, sequencer, config),
        timeline,
    )
}

fn blank_store() -> CountingStore {
    CountingStore::new(RecordStore::new(MemoryStorage::new(), 0))
}

#[test]
fn first_boot_persists_defaults_once_before_first_render() {
    let input = ScriptedInput::new(&[]);
    let (mut ctl, _) = controller(input, blank_store(), ControllerConfig::ENCODER);

    let mut state = ctl.boot();
    assert_eq!(state.settings, WeldSettings::default());
    assert_eq!(ctl.store().saves, 1);
    assert_eq!(ctl.display_mut().clears, 0);
    assert!(state.dirty);

    let report = ctl.poll_cycle(&mut state, 0).unwrap();
    assert!(report.redrawn && report.saved);
    assert!(!state.dirty);
    assert_eq!(ctl.display_mut().row(0), " Repeat  [5   ] ");
}

#[test]
fn saved_settings_survive_reboot() {
    let mut storage: Store = RecordStore::new(MemoryStorage::new(), 0);
    storage.save(&WeldSettings::new(42, 420)).unwrap();

    let input = ScriptedInput::new(&[]);
    let (mut ctl, _) = controller(input, CountingStore::new(storage), ControllerConfig::BUTTONS);
    let state = ctl.boot();

    assert_eq!(state.settings, WeldSettings::new(42, 420));
    assert_eq!(ctl.store().saves, 0);
}

#[test]
fn edit_then_fire_scenario() {
    let batches: &[&[InputEvent]] = &[
        &[],
        &[InputEvent::Increment],
        &[InputEvent::Increment],
        &[InputEvent::Increment],
        &[InputEvent::ToggleField],
        &[InputEvent::Decrement],
        &[InputEvent::Fire],
    ];
    let (mut ctl, timeline) = controller(
        ScriptedInput::new(batches),
        blank_store(),
        ControllerConfig::BUTTONS,
    );
    let mut state = ctl.boot();

    for now_ms in 0..batches.len() as u64 {
        ctl.poll_cycle(&mut state, now_ms).unwrap();
    }

    assert!(ctl.input.is_exhausted());
    assert_eq!(state.settings, WeldSettings::new(8, 49));
    assert_eq!(state.cursor, Field::Delay);
    assert!(state.dirty, "a completed fire forces a redraw");

    let timeline = timeline.borrow();
    assert_eq!(timeline.rising_edges(), 8);
    assert_eq!(timeline.edges.len(), 16);
    for pair in timeline.edges.windows(2) {
        assert_ne!(pair[0].1, pair[1].1);
        assert_eq!(pair[1].0 - pair[0].0, 49);
    }
    assert_eq!(timeline.now_ns / 1_000_000, 2 * 8 * 49);

    let report = ctl.poll_cycle(&mut state, 100).unwrap();
    assert!(report.redrawn && report.saved && !report.fired);
    assert_eq!(ctl.display_mut().row(1), " Delay   [49  ] ");
}

#[test]
fn edits_between_renders_coalesce_into_one_save() {
    let batches: &[&[InputEvent]] = &[
        &[],
        &[
            InputEvent::Increment,
            InputEvent::Increment,
            InputEvent::ToggleField,
            InputEvent::IncrementFast,
        ],
    ];
    let (mut ctl, _) = controller(
        ScriptedInput::new(batches),
        blank_store(),
        ControllerConfig::ENCODER,
    );
    let mut state = ctl.boot();
    ctl.poll_cycle(&mut state, 0).unwrap();
    let saves_before = ctl.store().saves;

    let report = ctl.poll_cycle(&mut state, 1).unwrap();
    assert!(report.saved);
    assert_eq!(ctl.store().saves, saves_before + 1);
    assert_eq!(state.settings, WeldSettings::new(7, 60));

    let report = ctl.poll_cycle(&mut state, 2).unwrap();
    assert_eq!(report, CycleReport::default());
    assert_eq!(ctl.store().saves, saves_before + 1);
}

#[test]
fn saturated_increment_does_not_redraw() {
    let mut storage: Store = RecordStore::new(MemoryStorage::new(), 0);
    storage.save(&WeldSettings::new(255, 50)).unwrap();
    let batches: &[&[InputEvent]] = &[&[], &[InputEvent::Increment]];
    let (mut ctl, _) = controller(
        ScriptedInput::new(batches),
        CountingStore::new(storage),
        ControllerConfig::ENCODER,
    );
    let mut state = ctl.boot();
    ctl.poll_cycle(&mut state, 0).unwrap();

    let report = ctl.poll_cycle(&mut state, 1).unwrap();
    assert_eq!(state.settings.repeat_count, 255);
    assert!(!report.redrawn);
}

#[test]
fn held_fire_button_fires_once_until_released() {
    let fire = ButtonLevels {
        fire: true,
        ..ButtonLevels::default()
    };
    let idle = ButtonLevels::default();
    let levels: Vec<_> = held(fire, 6)
        .chain(held(idle, 3))
        .chain(held(fire, 3))
        .collect();
    let cycles = levels.len() as u64;
    let (mut ctl, timeline) = controller(
        LevelInput::new(levels),
        blank_store(),
        ControllerConfig::BUTTONS,
    );
    let mut state = ctl.boot();

    let mut fires = 0;
    for now_ms in 0..cycles {
        if ctl.poll_cycle(&mut state, now_ms).unwrap().fired {
            fires += 1;
        }
    }

    assert_eq!(fires, 2);
    assert_eq!(
        timeline.borrow().rising_edges(),
        2 * WeldSettings::default().repeat_count as usize
    );
}

#[test]
fn fire_release_bounce_runs_one_sequence() {
    let fire = ButtonLevels {
        fire: true,
        ..ButtonLevels::default()
    };
    let idle = ButtonLevels::default();
    let levels = vec![fire, fire, fire, idle, fire, idle, idle, idle, idle];
    let cycles = levels.len() as u64;
    let (mut ctl, timeline) = controller(
        LevelInput::new(levels),
        blank_store(),
        ControllerConfig::BUTTONS,
    );
    let mut state = ctl.boot();

    let mut fires = 0;
    for now_ms in 0..cycles {
        if ctl.poll_cycle(&mut state, now_ms).unwrap().fired {
            fires += 1;
        }
    }

    assert_eq!(fires, 1);
    assert_eq!(timeline.borrow().rising_edges(), 5);
}

#[test]
fn button_chord_switches_field_without_editing() {
    let chord = ButtonLevels {
        increment: true,
        decrement: true,
        fire: false,
    };
    let idle = ButtonLevels::default();
    let levels: Vec<_> = held(idle, 2)
        .chain(held(chord, 4))
        .chain(held(idle, 3))
        .collect();
    let cycles = levels.len() as u64;
    let (mut ctl, _) = controller(
        LevelInput::new(levels),
        blank_store(),
        ControllerConfig::BUTTONS,
    );
    let mut state = ctl.boot();

    for now_ms in 0..cycles {
        ctl.poll_cycle(&mut state, now_ms).unwrap();
    }

    assert_eq!(state.cursor, Field::Delay);
    assert_eq!(state.settings, WeldSettings::default());
}

/// Text grid whose next `clear` calls fail.
struct FlakyDisplay {
    grid: TextGrid,
    failures_left: usize,
}

impl CharacterDisplay for FlakyDisplay {
    type Error = ();

    fn clear(&mut self) -> Result<(), Self::Error> {
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(());
        }
        self.grid.clear()
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), Self::Error> {
        self.grid.set_cursor(col, row)
    }

    fn write_str(&mut self, text: &str) -> Result<(), Self::Error> {
        self.grid.write_str(text)
    }
}

#[test]
fn failed_redraw_is_retried_next_cycle() {
    let batches: &[&[InputEvent]] = &[&[], &[InputEvent::Increment]];
    let timeline = Timeline::shared();
    let mut ctl = Controller::new(
        ScriptedInput::new(batches),
        FlakyDisplay {
            grid: TextGrid::new(),
            failures_left: 0,
        },
        blank_store(),
        PulseSequencer::new(
            RecordingPin::new(timeline.clone()),
            VirtualDelay(timeline.clone()),
        ),
        ControllerConfig::ENCODER,
    );
    let mut state = ctl.boot();
    ctl.poll_cycle(&mut state, 0).unwrap();

    ctl.display_mut().failures_left = 1;
    let result = ctl.poll_cycle(&mut state, 1);
    assert!(matches!(result, Err(ControllerError::Display(()))));
    assert!(state.dirty);
    assert_eq!(state.settings.repeat_count, 6);
    assert_eq!(ctl.display_mut().grid.row(0), " Repeat  [5   ] ");

    let report = ctl.poll_cycle(&mut state, 2).unwrap();
    assert!(report.redrawn);
    assert!(!state.dirty);
    assert_eq!(ctl.display_mut().grid.row(0), " Repeat  [6   ] ");

    let report = ctl.poll_cycle(&mut state, 3).unwrap();
    assert!(!report.redrawn);
}

#[test]
fn output_fault_is_reported_and_still_redraws() {
    let batches: &[&[InputEvent]] = &[&[InputEvent::Fire]];
    let timeline = Timeline::shared();
    let mut pin = RecordingPin::new(timeline.clone());
    pin.fail_after_highs = Some(1);
    let mut ctl = Controller::new(
        ScriptedInput::new(batches),
        TextGrid::new(),
        blank_store(),
        PulseSequencer::new(pin, VirtualDelay(timeline.clone())),
        ControllerConfig::ENCODER,
    );
    let mut state = ctl.boot();

    let result = ctl.poll_cycle(&mut state, 0);
    assert!(matches!(result, Err(ControllerError::Output(_))));
    assert!(state.dirty);
    assert_eq!(ctl.store().saves, 2);
    assert_eq!(timeline.borrow().rising_edges(), 1);
    assert_eq!(timeline.borrow().edges.last(), Some(&(100, false)));

    let report = ctl.poll_cycle(&mut state, 1).unwrap();
    assert!(report.redrawn);
}
