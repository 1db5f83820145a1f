//! Controller poll cycle: input, edit, redraw-and-persist, fire.

use embedded_hal::{delay::DelayNs, digital::OutputPin};
use log::warn;

use crate::{
    edit::{Field, ParameterEditor},
    input::{InputEvent, InputEvents, InputSource},
    render::{self, CharacterDisplay},
    sequencer::{PulsePlan, PulseSequencer},
    settings::{SettingsLimits, SettingsStore, WeldSettings},
    storage,
};

const COARSE_STEP: u16 = 10;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ControllerConfig {
    pub limits: SettingsLimits,
    pub coarse_step: u16,
}

impl ControllerConfig {
    pub const BUTTONS: Self = Self {
        limits: SettingsLimits::BUTTONS,
        coarse_step: COARSE_STEP,
    };

    pub const ENCODER: Self = Self {
        limits: SettingsLimits::ENCODER,
        coarse_step: COARSE_STEP,
    };
}

/// All mutable controller state, owned by the caller and threaded through
/// every [`Controller::poll_cycle`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ControllerState {
    pub settings: WeldSettings,
    pub cursor: Field,
    /// The screen is stale and must be redrawn (and the settings persisted).
    pub dirty: bool,
}

impl ControllerState {
    /// Fresh state; the first cycle draws the screen.
    pub const fn new(settings: WeldSettings) -> Self {
        Self {
            settings,
            cursor: Field::RepeatCount,
            dirty: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ControllerError<InErr, DispErr, StoreErr, OutErr> {
    Input(InErr),
    Display(DispErr),
    Store(StoreErr),
    Output(OutErr),
}

type CycleError<IN, DSP, ST, OUT> = ControllerError<
    <IN as InputSource>::Error,
    <DSP as CharacterDisplay>::Error,
    <ST as SettingsStore>::Error,
    <OUT as embedded_hal::digital::ErrorType>::Error,
>;

/// What one poll cycle did.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CycleReport {
    pub redrawn: bool,
    pub saved: bool,
    pub fired: bool,
}

/// Owns the collaborators; the state lives in [`ControllerState`].
pub struct Controller<IN, DSP, ST, OUT, D> {
    input: IN,
    display: DSP,
    store: ST,
    sequencer: PulseSequencer<OUT, D>,
    editor: ParameterEditor,
}

impl<IN, DSP, ST, OUT, D> Controller<IN, DSP, ST, OUT, D>
where
    IN: InputSource,
    DSP: CharacterDisplay,
    ST: SettingsStore,
    OUT: OutputPin,
    D: DelayNs,
{
    pub fn new(
        input: IN,
        display: DSP,
        store: ST,
        sequencer: PulseSequencer<OUT, D>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            input,
            display,
            store,
            sequencer,
            editor: ParameterEditor::new(config.limits, config.coarse_step),
        }
    }

    /// Loads settings (healing the store on first boot) and returns the
    /// initial state.
    pub fn boot(&mut self) -> ControllerState {
        let settings = storage::load_or_init(&mut self.store, self.editor.limits());
        ControllerState::new(settings)
    }

    pub fn display_mut(&mut self) -> &mut DSP {
        &mut self.display
    }

    pub fn store(&self) -> &ST {
        &self.store
    }

    /// Runs one cycle. A fault in one stage does not skip the others; the
    /// first fault is returned after the cycle completes.
    pub fn poll_cycle(
        &mut self,
        state: &mut ControllerState,
        now_ms: u64,
    ) -> Result<CycleReport, CycleError<IN, DSP, ST, OUT>> {
        let mut report = CycleReport::default();
        let mut fault = None;

        let events = match self.input.poll(now_ms) {
            Ok(events) => events,
            Err(err) => {
                fault = Some(ControllerError::Input(err));
                InputEvents::new()
            }
        };

        let mut fire_requested = false;
        for event in events {
            if event == InputEvent::Fire {
                fire_requested = true;
            } else if self
                .editor
                .apply(event, &mut state.settings, &mut state.cursor)
            {
                state.dirty = true;
            }
        }

        if state.dirty {
            // A failed draw leaves the screen stale, so it stays dirty and
            // the next cycle redraws.
            match render::draw_settings(&mut self.display, &state.settings, state.cursor) {
                Ok(()) => {
                    report.redrawn = true;
                    state.dirty = false;
                }
                Err(err) => {
                    fault = fault.or(Some(ControllerError::Display(err)));
                }
            }
            match self.store.save(&state.settings) {
                Ok(()) => report.saved = true,
                Err(err) => {
                    fault = fault.or(Some(ControllerError::Store(err)));
                }
            }
        }

        if fire_requested {
            match self.sequencer.fire(PulsePlan::from(&state.settings)) {
                Ok(()) => report.fired = true,
                Err(err) => {
                    warn!("fire aborted by output fault");
                    fault = fault.or(Some(ControllerError::Output(err)));
                }
            }
            state.dirty = true;
        }

        match fault {
            Some(err) => Err(err),
            None => Ok(report),
        }
    }
}

#[cfg(test)]
mod tests;
