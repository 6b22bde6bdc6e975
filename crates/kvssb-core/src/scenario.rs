//! Headless replay of synthetic scroll and visibility streams.
//!
//! A scenario describes a static page layout plus a list of events. The
//! replay owns a virtual clock so counter timers fire deterministically
//! between events.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::counter::Counter;
use crate::layout::{NavLink, Section};
use crate::reveal::{RevealId, RevealKind};
use crate::sync::{
    CounterId, IntersectionSource, ScrollSample, ScrollSource, SyncConfig, SyncEffect, SyncEvent,
    Synchronizer,
};

/// Upper bound on counter ticks in one replay
pub const DEFAULT_MAX_TICKS: usize = 100_000;

fn default_viewport_height() -> f64 {
    900.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
    #[serde(default)]
    pub counters: Vec<CounterSpec>,
    #[serde(default)]
    pub reveals: Vec<RevealSpec>,
    #[serde(default)]
    pub events: Vec<ScenarioEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkSpec {
    pub href: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CounterSpec {
    /// Raw `data-target` attribute
    pub target: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RevealSpec {
    pub kind: RevealKind,
    /// Document offset of the target's top edge
    pub top: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioEvent {
    /// Virtual milliseconds to let pass before this event
    #[serde(default)]
    pub after_ms: u64,
    pub scroll: Option<f64>,
    pub visible: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Scroll(f64),
    Visible(f64),
}

impl ScenarioEvent {
    pub fn action(&self) -> Result<Action> {
        match (self.scroll, self.visible) {
            (Some(offset), None) => Ok(Action::Scroll(offset)),
            (None, Some(ratio)) => Ok(Action::Visible(ratio)),
            (Some(_), Some(_)) => bail!("event sets both `scroll` and `visible`"),
            (None, None) => bail!("event sets neither `scroll` nor `visible`"),
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse scenario file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(contents)?;
        for (index, event) in scenario.events.iter().enumerate() {
            event
                .action()
                .with_context(|| format!("Invalid event #{}", index + 1))?;
        }
        Ok(scenario)
    }

    pub fn synchronizer(&self, config: SyncConfig) -> Result<Synchronizer> {
        let counters = self
            .counters
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                Counter::parse(&spec.target).with_context(|| {
                    format!("Counter #{} has a non-numeric target: {:?}", index + 1, spec.target)
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let links = self.links.iter().map(|link| NavLink::new(&link.href)).collect();
        let reveals = self.reveals.iter().map(|reveal| reveal.kind);
        Ok(Synchronizer::new(config, links, counters, reveals))
    }
}

/// A static page scrolled by the replay
#[derive(Debug, Clone)]
pub struct StaticPage {
    pub offset: f64,
    pub viewport_height: f64,
    pub sections: Vec<Section>,
    pub reveal_tops: Vec<f64>,
}

impl ScrollSource for StaticPage {
    fn scroll_offset(&self) -> f64 {
        self.offset
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn sections(&self) -> Vec<Section> {
        self.sections.clone()
    }

    fn reveal_top(&self, target: RevealId) -> Option<f64> {
        self.reveal_tops.get(target.0).map(|top| top - self.offset)
    }
}

#[derive(Debug, Default)]
struct Observation {
    threshold: Option<f64>,
}

impl IntersectionSource for Observation {
    fn observe(&mut self, threshold: f64) {
        self.threshold = Some(threshold);
    }

    fn unobserve(&mut self) {
        self.threshold = None;
    }
}

/// One effect and the virtual time it happened at
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub at_ms: u64,
    #[serde(flatten)]
    pub effect: SyncEffect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub at_ms: u64,
    pub offset: f64,
    pub active: Option<String>,
    pub back_to_top: bool,
    pub counters: Vec<String>,
    pub revealed: usize,
    pub pending_reveals: usize,
    pub ticks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub frames: Vec<Frame>,
    pub summary: Summary,
}

pub struct Replay {
    sync: Synchronizer,
    page: StaticPage,
    observation: Observation,
    clock_ms: u64,
    timers: BinaryHeap<Reverse<(u64, u64, CounterId)>>,
    seq: u64,
    ticks: usize,
    max_ticks: usize,
    frames: Vec<Frame>,
}

impl Replay {
    pub fn new(scenario: &Scenario, config: SyncConfig, max_ticks: usize) -> Result<Self> {
        let sync = scenario.synchronizer(config)?;
        let mut observation = Observation::default();
        sync.attach(&mut observation);
        Ok(Self {
            sync,
            page: StaticPage {
                offset: 0.0,
                viewport_height: scenario.viewport_height,
                sections: scenario.sections.clone(),
                reveal_tops: scenario.reveals.iter().map(|reveal| reveal.top).collect(),
            },
            observation,
            clock_ms: 0,
            timers: BinaryHeap::new(),
            seq: 0,
            ticks: 0,
            max_ticks,
            frames: Vec::new(),
        })
    }

    /// Play every event of the scenario, then let pending timers run out.
    pub fn run(scenario: &Scenario, config: SyncConfig, max_ticks: usize) -> Result<ReplayReport> {
        let mut replay = Self::new(scenario, config, max_ticks)?;
        for event in &scenario.events {
            replay.advance(event.after_ms)?;
            replay.apply(event.action()?);
        }
        replay.settle()?;
        Ok(replay.report())
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Scroll(offset) => {
                self.page.offset = offset;
                let sample = ScrollSample::capture(&self.page, self.sync.reveals().len());
                self.dispatch(SyncEvent::Scroll(sample));
            }
            Action::Visible(ratio) => {
                // the browser stops delivering once the host is unobserved
                let Some(threshold) = self.observation.threshold else {
                    debug!(ratio, "host not observed, visibility dropped");
                    return;
                };
                if ratio >= threshold {
                    self.dispatch(SyncEvent::Intersection { ratio });
                }
            }
        }
    }

    /// Move the virtual clock forward, firing timers that fall due.
    pub fn advance(&mut self, ms: u64) -> Result<()> {
        let until = self.clock_ms.saturating_add(ms);
        while let Some(&Reverse((due, _, _))) = self.timers.peek() {
            if due > until {
                break;
            }
            self.fire_next()?;
        }
        self.clock_ms = until;
        Ok(())
    }

    /// Fire timers until none remain.
    pub fn settle(&mut self) -> Result<()> {
        while !self.timers.is_empty() {
            self.fire_next()?;
        }
        Ok(())
    }

    pub fn synchronizer(&self) -> &Synchronizer {
        &self.sync
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn report(self) -> ReplayReport {
        let scroll = self.sync.scroll_state();
        let reveals = self.sync.reveals();
        let summary = Summary {
            at_ms: self.clock_ms,
            offset: scroll.offset,
            active: scroll.active.clone(),
            back_to_top: scroll.back_to_top,
            counters: self.sync.counters().iter().map(|c| c.text().to_string()).collect(),
            revealed: reveals.len() - reveals.pending(),
            pending_reveals: reveals.pending(),
            ticks: self.ticks,
        };
        ReplayReport {
            frames: self.frames,
            summary,
        }
    }

    fn fire_next(&mut self) -> Result<()> {
        let Some(Reverse((due, _, counter))) = self.timers.pop() else {
            return Ok(());
        };
        self.ticks += 1;
        if self.ticks > self.max_ticks {
            bail!(
                "Counter timers still pending after {} ticks (counter #{})",
                self.max_ticks,
                counter.0 + 1
            );
        }
        self.clock_ms = self.clock_ms.max(due);
        self.dispatch(SyncEvent::CounterTick(counter));
        Ok(())
    }

    fn dispatch(&mut self, event: SyncEvent) {
        for effect in self.sync.handle(event) {
            match &effect {
                SyncEffect::ScheduleCounterTick { counter, delay_ms } => {
                    self.seq += 1;
                    let due = self.clock_ms.saturating_add(*delay_ms);
                    self.timers.push(Reverse((due, self.seq, *counter)));
                }
                SyncEffect::StopObservingCounters => self.observation.unobserve(),
                _ => {}
            }
            self.frames.push(Frame {
                at_ms: self.clock_ms,
                effect,
            });
        }
    }
}
