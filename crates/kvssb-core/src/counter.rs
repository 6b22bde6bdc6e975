use tracing::warn;

use crate::trigger::OneShot;

/// Number of increments a counter takes to climb to its target
pub const DEFAULT_STEPS: f64 = 200.0;

/// How a counter renders its final value, keyed on the raw `data-target`
/// attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterFormat {
    Plain,
    /// Rating-style value, e.g. `4.9`
    OneDecimal,
    /// Lower bound, e.g. `500+`
    PlusSuffix,
}

impl CounterFormat {
    pub fn for_attribute(raw: &str) -> Self {
        match raw {
            "4.9" => CounterFormat::OneDecimal,
            "500" => CounterFormat::PlusSuffix,
            _ => CounterFormat::Plain,
        }
    }

    pub fn render(self, target: f64) -> String {
        match self {
            CounterFormat::Plain => format!("{target}"),
            CounterFormat::OneDecimal => format!("{target:.1}"),
            CounterFormat::PlusSuffix => format!("{target}+"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterPhase {
    Idle,
    Running,
    Done,
}

/// Outcome of one animation tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterStep {
    /// Show this text and tick again
    Continue(String),
    /// Show this text; the animation is over
    Finished(String),
}

impl CounterStep {
    pub fn text(&self) -> &str {
        match self {
            CounterStep::Continue(text) | CounterStep::Finished(text) => text,
        }
    }
}

/// A numeric counter that climbs from its initial value to a target once.
#[derive(Debug, Clone, PartialEq)]
pub struct Counter {
    raw_target: String,
    target: f64,
    current: f64,
    text: String,
    format: CounterFormat,
    phase: CounterPhase,
    trigger: OneShot,
}

impl Counter {
    /// Parse a counter from its `data-target` attribute.
    ///
    /// Surrounding whitespace is ignored and an empty attribute means zero.
    /// Returns `None` for anything that isn't a finite number.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let target = if trimmed.is_empty() {
            0.0
        } else {
            trimmed.parse::<f64>().ok()?
        };
        if !target.is_finite() {
            return None;
        }

        Some(Self {
            raw_target: raw.to_string(),
            target,
            current: 0.0,
            text: "0".to_string(),
            format: CounterFormat::for_attribute(raw),
            phase: CounterPhase::Idle,
            trigger: OneShot::Pending,
        })
    }

    /// Start from whatever the element displayed before animating. Values
    /// outside `0..=target` are ignored and the count starts from zero.
    pub fn starting_at(mut self, text: &str) -> Self {
        if let Ok(value) = text.trim().parse::<f64>() {
            if (0.0..=self.target).contains(&value) {
                self.current = value;
                self.text = text.trim().to_string();
            }
        }
        self
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Text currently displayed
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn phase(&self) -> CounterPhase {
        self.phase
    }

    /// Begin the animation. Only the first call has any effect.
    pub fn start(&mut self) -> bool {
        if !self.trigger.fire() {
            return false;
        }
        self.phase = CounterPhase::Running;
        true
    }

    /// Advance one tick. `None` when the counter isn't running.
    ///
    /// Each tick adds `target / steps`, rounded up to a whole number. Once
    /// the displayed value reaches the target the exact, formatted target
    /// is shown and the counter stops.
    pub fn step(&mut self, steps: f64) -> Option<CounterStep> {
        if self.phase != CounterPhase::Running {
            return None;
        }

        if self.target <= 0.0 {
            warn!(raw = %self.raw_target, "counter target is not positive, finishing immediately");
            return Some(self.finish());
        }

        if self.current < self.target {
            self.current = (self.current + self.target / steps.max(1.0)).ceil();
            self.text = format!("{}", self.current);
            return Some(CounterStep::Continue(self.text.clone()));
        }

        Some(self.finish())
    }

    fn finish(&mut self) -> CounterStep {
        self.phase = CounterPhase::Done;
        self.current = self.target;
        self.text = self.format.render(self.target);
        CounterStep::Finished(self.text.clone())
    }
}
