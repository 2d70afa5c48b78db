//! A drill run wired to its countdown.
//!
//! [`DrillSession`] owns a [`DrillRun`] and keeps exactly one countdown alive
//! while the run is counting down. After every state change the countdown is
//! re-synced against [`DrillRun::timer_key`], so leaving a step, pausing,
//! finishing or resetting stops the old timer before anything else happens.

use std::sync::mpsc::Sender;
use std::time::Duration;

use tracing::trace;

use crate::content::DrillScenario;
use crate::countdown::{Countdown, TimerId};
use crate::drill::{DrillEvent, DrillRun};
use crate::runtime::AppEvent;

pub struct DrillSession {
    run: DrillRun,
    countdown: Countdown,
    events: Sender<AppEvent>,
}

impl DrillSession {
    pub fn new(scenario: DrillScenario, interval: Duration, events: Sender<AppEvent>) -> Self {
        Self {
            run: DrillRun::new(scenario),
            countdown: Countdown::new(interval),
            events,
        }
    }

    pub fn run(&self) -> &DrillRun {
        &self.run
    }

    pub fn start(&mut self) -> Vec<DrillEvent> {
        let events = self.run.start();
        self.sync_timer();
        events
    }

    pub fn pause(&mut self) -> Vec<DrillEvent> {
        let events = self.run.pause();
        self.sync_timer();
        events
    }

    pub fn resume(&mut self) -> Vec<DrillEvent> {
        let events = self.run.resume();
        self.sync_timer();
        events
    }

    pub fn toggle_pause(&mut self) -> Vec<DrillEvent> {
        let events = self.run.toggle_pause();
        self.sync_timer();
        events
    }

    pub fn submit_choice(&mut self, index: usize) -> Vec<DrillEvent> {
        let events = self.run.submit_choice(index);
        self.sync_timer();
        events
    }

    pub fn confirm_action(&mut self) -> Vec<DrillEvent> {
        let events = self.run.confirm_action();
        self.sync_timer();
        events
    }

    pub fn reset(&mut self) -> Vec<DrillEvent> {
        let events = self.run.reset();
        self.sync_timer();
        events
    }

    /// Apply one countdown tick. Ticks from a timer that is no longer armed
    /// are dropped.
    pub fn on_countdown(&mut self, id: TimerId) -> Vec<DrillEvent> {
        if !self.countdown.is_current(id) {
            trace!(timer = id.0, "stale countdown ignored");
            return vec![];
        }
        let events = self.run.tick();
        self.sync_timer();
        events
    }

    pub fn has_active_timer(&self) -> bool {
        self.countdown.active_id().is_some()
    }

    fn sync_timer(&mut self) {
        self.countdown.sync(self.run.timer_key(), &self.events);
    }
}
