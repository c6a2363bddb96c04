//! Per-vital state and the per-tick vital phase.
//!
//! Each vital carries its level, the user's activity for it, its distress
//! state, and its blink phase. [`Vitals::advance`] runs the drain/refill
//! step for all three vitals in tick order and then the distress update in
//! the same order, so distress always sees this tick's levels.

use tamagotchi_types::{Activity, MAX_LEVEL, PetRecord, Vital, VitalSnapshot, clamp_level};

use crate::blink::{Blinker, next_phase};
use crate::config::VitalsConfig;
use crate::distress::Distress;
use crate::resource;

/// State of a single vital.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VitalState {
    /// Level in `[0, 100]`.
    pub level: f64,
    /// Whether the replenishing action is engaged.
    pub activity: Activity,
    /// Time without the resource and the derived dying flag.
    pub distress: Distress,
    /// Cosmetic alternate-icon phase.
    pub blink: bool,
}

impl VitalState {
    /// A full, idle, untroubled vital.
    pub const fn full() -> Self {
        Self::at(MAX_LEVEL)
    }

    /// An idle vital at the given level with cleared counters.
    pub const fn at(level: f64) -> Self {
        Self {
            level,
            activity: Activity::Idle,
            distress: Distress::Sated,
            blink: false,
        }
    }

    /// Clear the activity, distress, and blink state, keeping the level.
    pub const fn reset_flags(&mut self) {
        self.activity = Activity::Idle;
        self.distress = Distress::Sated;
        self.blink = false;
    }
}

/// The three vitals of the pet.
#[derive(Debug, Clone, PartialEq)]
pub struct Vitals {
    /// Food, replenished by feeding.
    pub food: VitalState,
    /// Stamina, replenished by resting.
    pub stamina: VitalState,
    /// Water, replenished by drinking.
    pub water: VitalState,
    blinker: Blinker,
}

impl Default for Vitals {
    fn default() -> Self {
        Self::full()
    }
}

impl Vitals {
    /// All vitals full.
    pub const fn full() -> Self {
        Self {
            food: VitalState::full(),
            stamina: VitalState::full(),
            water: VitalState::full(),
            blinker: Blinker::new(),
        }
    }

    /// Vitals seeded from a stored record.
    pub fn from_record(record: &PetRecord) -> Self {
        Self {
            food: VitalState::at(clamp_level(record.food)),
            stamina: VitalState::at(clamp_level(record.stamina)),
            water: VitalState::at(clamp_level(record.water)),
            blinker: Blinker::new(),
        }
    }

    /// State of one vital.
    pub const fn get(&self, vital: Vital) -> &VitalState {
        match vital {
            Vital::Food => &self.food,
            Vital::Stamina => &self.stamina,
            Vital::Water => &self.water,
        }
    }

    /// Mutable state of one vital.
    pub const fn get_mut(&mut self, vital: Vital) -> &mut VitalState {
        match vital {
            Vital::Food => &mut self.food,
            Vital::Stamina => &mut self.stamina,
            Vital::Water => &mut self.water,
        }
    }

    /// Flip the activity of one vital. Returns the new activity.
    pub fn toggle(&mut self, vital: Vital) -> Activity {
        let state = self.get_mut(vital);
        state.activity = state.activity.toggled();
        state.activity
    }

    /// Clear every activity, distress counter, and blink phase.
    pub fn reset_flags(&mut self) {
        for vital in Vital::ALL {
            self.get_mut(vital).reset_flags();
        }
        self.blinker.reset();
    }

    /// Whether the pet is dying of any vital.
    pub fn any_dying(&self) -> bool {
        self.iter().any(|(_, state)| state.distress.is_dying())
    }

    /// Vitals in tick order.
    pub fn iter(&self) -> impl Iterator<Item = (Vital, &VitalState)> {
        Vital::ALL.into_iter().map(|vital| (vital, self.get(vital)))
    }

    /// Drain or refill every vital, then update every distress state.
    pub fn advance(&mut self, dt_ms: f64, config: &VitalsConfig) {
        for vital in Vital::ALL {
            let timings = config.get(vital);
            let state = self.get_mut(vital);
            state.level = resource::advance(state.level, state.activity, dt_ms, timings);
        }
        for vital in Vital::ALL {
            let grace_ms = config.get(vital).grace_ms;
            let state = self.get_mut(vital);
            state.distress = state.distress.update(state.level, dt_ms, grace_ms);
        }
    }

    /// Advance the shared blink timer and update each vital's phase.
    pub fn blink(&mut self, dt_ms: f64, period_ms: f64) {
        let flip = self.blinker.step(dt_ms, period_ms);
        for vital in Vital::ALL {
            let state = self.get_mut(vital);
            state.blink = next_phase(state.blink, state.level, flip);
        }
    }

    /// Observable view of every vital in tick order.
    pub fn snapshot(&self) -> Vec<VitalSnapshot> {
        self.iter()
            .map(|(vital, state)| VitalSnapshot {
                vital,
                level: state.level,
                active: state.activity.is_active(),
                dying: state.distress.is_dying(),
                blink: state.blink,
            })
            .collect()
    }
}
