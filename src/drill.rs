//! Timed drill state machine.
//!
//! A drill walks through the steps of a [`DrillScenario`]. Each step has a
//! countdown driven by [`DrillRun::tick`]; reaching zero records a timeout
//! and moves on. The run never touches a clock itself: whoever owns the run
//! calls `tick` once per second while [`DrillRun::timer_key`] is `Some`.

use tracing::{debug, info};

use crate::content::{DrillScenario, DrillStep, StepKind};
use crate::util::{mean, percent};

#[derive(Debug, Clone, PartialEq)]
pub enum DrillPhase {
    NotStarted,
    Running { step: usize, secs_left: u32 },
    Paused { step: usize, secs_left: u32 },
    Completed(DrillSummary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAnswer {
    Choice(usize),
    Confirmed,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub step_id: u32,
    pub answer: StepAnswer,
    pub correct: bool,
    pub points_awarded: u32,
    pub secs_used: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrillSummary {
    pub scenario_id: u32,
    pub score: u32,
    pub max_score: u32,
    pub percent: f64,
    pub steps_correct: u32,
    pub timeouts: u32,
    /// Mean seconds taken on steps that were answered before the timer ran out.
    pub avg_response_secs: Option<f64>,
}

/// Identity of one countdown: a particular step of a particular run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerKey {
    pub run_id: u64,
    pub step: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrillEvent {
    Started { steps: usize },
    Ticked { secs_left: u32 },
    StepTimedOut { step: usize },
    StepAnswered { step: usize, correct: bool, points: u32 },
    StepStarted { step: usize, secs: u32 },
    Paused { secs_left: u32 },
    Resumed { secs_left: u32 },
    Completed(DrillSummary),
    Reset,
}

#[derive(Debug, Clone)]
pub struct DrillRun {
    scenario: DrillScenario,
    run_id: u64,
    phase: DrillPhase,
    records: Vec<StepRecord>,
    score: u32,
}

impl DrillRun {
    pub fn new(scenario: DrillScenario) -> Self {
        Self {
            scenario,
            run_id: 0,
            phase: DrillPhase::NotStarted,
            records: Vec::new(),
            score: 0,
        }
    }

    /// Begin a fresh run. Any previous run state is discarded.
    pub fn start(&mut self) -> Vec<DrillEvent> {
        self.run_id += 1;
        self.records.clear();
        self.score = 0;

        info!(
            scenario = self.scenario.id,
            run = self.run_id,
            "drill started"
        );
        let mut events = vec![DrillEvent::Started {
            steps: self.scenario.steps.len(),
        }];
        self.enter_step(0, &mut events);
        events
    }

    pub fn tick(&mut self) -> Vec<DrillEvent> {
        let DrillPhase::Running { step, secs_left } = self.phase else {
            return vec![];
        };

        let secs_left = secs_left.saturating_sub(1);
        if secs_left > 0 {
            self.phase = DrillPhase::Running { step, secs_left };
            return vec![DrillEvent::Ticked { secs_left }];
        }

        debug!(scenario = self.scenario.id, step, "step timed out");
        self.phase = DrillPhase::Running { step, secs_left: 0 };
        let mut events = vec![
            DrillEvent::Ticked { secs_left: 0 },
            DrillEvent::StepTimedOut { step },
        ];
        self.finish_step(step, StepAnswer::TimedOut, false, 0, &mut events);
        events
    }

    pub fn pause(&mut self) -> Vec<DrillEvent> {
        match self.phase {
            DrillPhase::Running { step, secs_left } => {
                self.phase = DrillPhase::Paused { step, secs_left };
                vec![DrillEvent::Paused { secs_left }]
            }
            _ => vec![],
        }
    }

    pub fn resume(&mut self) -> Vec<DrillEvent> {
        match self.phase {
            DrillPhase::Paused { step, secs_left } => {
                self.phase = DrillPhase::Running { step, secs_left };
                vec![DrillEvent::Resumed { secs_left }]
            }
            _ => vec![],
        }
    }

    pub fn toggle_pause(&mut self) -> Vec<DrillEvent> {
        if self.is_paused() {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// Answer a decision step. Ignored on any other kind of step.
    pub fn submit_choice(&mut self, index: usize) -> Vec<DrillEvent> {
        let Some((step, step_def)) = self.open_step() else {
            return vec![];
        };
        if step_def.kind != StepKind::Decision || index >= step_def.options.len() {
            return vec![];
        }

        let correct = step_def.correct_option == Some(index);
        let points = if correct { step_def.points } else { 0 };

        let mut events = vec![];
        self.finish_step(step, StepAnswer::Choice(index), correct, points, &mut events);
        events
    }

    /// Confirm an action or evacuation step; always earns its points.
    pub fn confirm_action(&mut self) -> Vec<DrillEvent> {
        let Some((step, step_def)) = self.open_step() else {
            return vec![];
        };
        if !step_def.kind.is_confirmable() {
            return vec![];
        }

        let points = step_def.points;
        let mut events = vec![];
        self.finish_step(step, StepAnswer::Confirmed, true, points, &mut events);
        events
    }

    pub fn reset(&mut self) -> Vec<DrillEvent> {
        if self.phase == DrillPhase::NotStarted && self.records.is_empty() {
            return vec![];
        }
        self.phase = DrillPhase::NotStarted;
        self.records.clear();
        self.score = 0;
        info!(scenario = self.scenario.id, run = self.run_id, "drill reset");
        vec![DrillEvent::Reset]
    }

    /// The running step. Answering it moves the phase on in the same call,
    /// so a step is never open for a second answer.
    fn open_step(&self) -> Option<(usize, &DrillStep)> {
        match self.phase {
            DrillPhase::Running { step, .. } => Some((step, &self.scenario.steps[step])),
            _ => None,
        }
    }

    fn finish_step(
        &mut self,
        step: usize,
        answer: StepAnswer,
        correct: bool,
        points: u32,
        events: &mut Vec<DrillEvent>,
    ) {
        let (step_id, limit) = {
            let def = &self.scenario.steps[step];
            (def.id, def.time_limit_secs)
        };
        let secs_used = limit.saturating_sub(self.remaining_secs().unwrap_or(0));

        self.score += points;
        self.records.push(StepRecord {
            step_id,
            answer,
            correct,
            points_awarded: points,
            secs_used,
        });
        if answer != StepAnswer::TimedOut {
            debug!(step, correct, points, "step answered");
            events.push(DrillEvent::StepAnswered {
                step,
                correct,
                points,
            });
        }

        self.enter_step(step + 1, events);
    }

    fn enter_step(&mut self, step: usize, events: &mut Vec<DrillEvent>) {
        match self.scenario.steps.get(step) {
            Some(next) => {
                self.phase = DrillPhase::Running {
                    step,
                    secs_left: next.time_limit_secs,
                };
                events.push(DrillEvent::StepStarted {
                    step,
                    secs: next.time_limit_secs,
                });
            }
            None => {
                let summary = self.summarize();
                info!(
                    scenario = summary.scenario_id,
                    score = summary.score,
                    max = summary.max_score,
                    timeouts = summary.timeouts,
                    "drill completed"
                );
                self.phase = DrillPhase::Completed(summary.clone());
                events.push(DrillEvent::Completed(summary));
            }
        }
    }

    fn summarize(&self) -> DrillSummary {
        let max_score = self.scenario.max_points();
        let response_times: Vec<f64> = self
            .records
            .iter()
            .filter(|r| r.answer != StepAnswer::TimedOut)
            .map(|r| r.secs_used as f64)
            .collect();

        DrillSummary {
            scenario_id: self.scenario.id,
            score: self.score,
            max_score,
            percent: percent(self.score, max_score),
            steps_correct: self.records.iter().filter(|r| r.correct).count() as u32,
            timeouts: self
                .records
                .iter()
                .filter(|r| r.answer == StepAnswer::TimedOut)
                .count() as u32,
            avg_response_secs: mean(&response_times),
        }
    }

    /// Countdown identity while a step is actively counting down.
    pub fn timer_key(&self) -> Option<TimerKey> {
        match self.phase {
            DrillPhase::Running { step, .. } => Some(TimerKey {
                run_id: self.run_id,
                step,
            }),
            _ => None,
        }
    }

    pub fn scenario(&self) -> &DrillScenario {
        &self.scenario
    }

    pub fn phase(&self) -> &DrillPhase {
        &self.phase
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.phase {
            DrillPhase::Running { step, .. } | DrillPhase::Paused { step, .. } => Some(step),
            _ => None,
        }
    }

    pub fn current_step(&self) -> Option<&DrillStep> {
        self.current_index().map(|i| &self.scenario.steps[i])
    }

    pub fn remaining_secs(&self) -> Option<u32> {
        match self.phase {
            DrillPhase::Running { secs_left, .. } | DrillPhase::Paused { secs_left, .. } => {
                Some(secs_left)
            }
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, DrillPhase::Running { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.phase, DrillPhase::Paused { .. })
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.phase, DrillPhase::Completed(_))
    }

    pub fn summary(&self) -> Option<&DrillSummary> {
        match &self.phase {
            DrillPhase::Completed(summary) => Some(summary),
            _ => None,
        }
    }

    /// Share of steps already finished, as a percentage.
    pub fn progress_percent(&self) -> f64 {
        percent(self.records.len() as u32, self.scenario.steps.len() as u32)
    }
}
