//! The ordered progress steps shown for an order.
//!
//! A timeline is a walk over a fixed list: steps before the cursor are completed,
//! the step under it is current, the ones after it are pending. The last step is
//! terminal and is marked completed as soon as the cursor reaches it.

use super::status::StepState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineStep {
    pub label: String,
    pub description: String,
    pub state: StepState,
    pub time: Option<DateTime<Utc>>,
}

impl TimelineStep {
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            state: StepState::Pending,
            time: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    steps: Vec<TimelineStep>,
    current: usize,
}

impl Timeline {
    /// Builds a timeline whose first step is current, stamped `started_at`.
    /// Returns `None` for an empty step list.
    pub fn new(steps: Vec<TimelineStep>, started_at: DateTime<Utc>) -> Option<Self> {
        if steps.is_empty() {
            return None;
        }
        Some(Self::build(steps, started_at))
    }

    /// The six-step delivery timeline, one step per non-cancelled status.
    pub fn delivery(started_at: DateTime<Utc>) -> Self {
        let steps = vec![
            TimelineStep::new("Order received", "Your order has been received and is being processed"),
            TimelineStep::new("Order confirmed", "We have confirmed your order and payment"),
            TimelineStep::new("Preparing order", "We are carefully preparing your products"),
            TimelineStep::new("Ready for dispatch", "Your order is ready and assigned to a driver"),
            TimelineStep::new("On the way", "The driver is heading to your address"),
            TimelineStep::new("Delivered", "Your order was delivered to your door"),
        ];
        Self::build(steps, started_at)
    }

    // `steps` must not be empty.
    fn build(mut steps: Vec<TimelineStep>, started_at: DateTime<Utc>) -> Self {
        for step in steps.iter_mut() {
            step.state = StepState::Pending;
            step.time = None;
        }
        let mut timeline = Self { steps, current: 0 };
        timeline.enter(0, started_at);
        timeline
    }

    fn enter(&mut self, index: usize, at: DateTime<Utc>) {
        let last = self.steps.len() - 1;
        let step = &mut self.steps[index];
        step.state = if index == last {
            StepState::Completed
        } else {
            StepState::Current
        };
        step.time = Some(at);
    }

    /// Moves one step forward. Returns `false` (and changes nothing) once the
    /// terminal step has been reached.
    pub fn advance(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_finished() {
            return false;
        }
        let step = &mut self.steps[self.current];
        step.state = StepState::Completed;
        step.time = Some(at);
        self.current += 1;
        self.enter(self.current, at);
        true
    }

    pub fn is_finished(&self) -> bool {
        self.current + 1 >= self.steps.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_step(&self) -> &TimelineStep {
        &self.steps[self.current]
    }

    pub fn steps(&self) -> &[TimelineStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Share of the walk already done, 0.0 to 100.0.
    pub fn progress_percent(&self) -> f64 {
        if self.steps.len() == 1 {
            return 100.0;
        }
        self.current as f64 / (self.steps.len() - 1) as f64 * 100.0
    }

    /// Checks the completed / current / pending layout around the cursor.
    pub fn is_consistent(&self) -> bool {
        self.steps.iter().enumerate().all(|(i, step)| {
            let expected = if i < self.current || (i == self.current && self.is_finished()) {
                StepState::Completed
            } else if i == self.current {
                StepState::Current
            } else {
                StepState::Pending
            };
            step.state == expected
        })
    }
}
