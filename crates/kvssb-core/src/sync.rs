//! The scroll state synchronizer.
//!
//! All scroll-driven page state lives in one [`Synchronizer`]. The host
//! feeds it [`SyncEvent`]s and applies the [`SyncEffect`]s it returns; the
//! browser runtime and the headless replay drive the same code through the
//! capability traits below.

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, trace};

use crate::counter::{Counter, CounterStep, DEFAULT_STEPS};
use crate::layout::{NavLink, Section};
use crate::reveal::{REVEAL_START, RevealAnimator, RevealId, RevealKind};
use crate::scroll::{self, BACK_TO_TOP_AFTER, NAV_OFFSET, ScrollState};
use crate::trigger::OneShot;
use crate::tween::Tween;

/// Visibility ratio of the counter host that starts the counters
pub const COUNTER_VISIBILITY: f64 = 0.5;

/// Delay between counter ticks
pub const COUNTER_TICK: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    pub nav_offset: f64,
    pub back_to_top_after: f64,
    pub counter_steps: f64,
    pub counter_tick: Duration,
    pub counter_visibility: f64,
    pub reveal_start: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            nav_offset: NAV_OFFSET,
            back_to_top_after: BACK_TO_TOP_AFTER,
            counter_steps: DEFAULT_STEPS,
            counter_tick: COUNTER_TICK,
            counter_visibility: COUNTER_VISIBILITY,
            reveal_start: REVEAL_START,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CounterId(pub usize);

/// Page geometry at the moment of a scroll event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollSample {
    pub offset: f64,
    pub viewport_height: f64,
    pub sections: Vec<Section>,
    /// Viewport-relative top edge of each reveal target
    pub reveal_tops: Vec<Option<f64>>,
}

impl ScrollSample {
    pub fn capture(source: &impl ScrollSource, reveals: usize) -> Self {
        Self {
            offset: source.scroll_offset(),
            viewport_height: source.viewport_height(),
            sections: source.sections(),
            reveal_tops: (0..reveals).map(|i| source.reveal_top(RevealId(i))).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Scroll(ScrollSample),
    /// The counter host's visibility ratio changed; `0.0` when it left the
    /// viewport
    Intersection { ratio: f64 },
    CounterTick(CounterId),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum SyncEffect {
    SetLinkActive { link: usize, href: String, active: bool },
    SetBackToTop { visible: bool },
    SetCounterText { counter: CounterId, text: String },
    ScheduleCounterTick { counter: CounterId, delay_ms: u64 },
    Reveal { target: RevealId, tween: Tween },
    StopObservingCounters,
}

/// Where scroll geometry is read from.
pub trait ScrollSource {
    fn scroll_offset(&self) -> f64;
    fn viewport_height(&self) -> f64;
    fn sections(&self) -> Vec<Section>;
    fn reveal_top(&self, target: RevealId) -> Option<f64>;
}

/// Delivers [`SyncEvent::Intersection`] for the counter host while observed.
pub trait IntersectionSource {
    fn observe(&mut self, threshold: f64);
    fn unobserve(&mut self);
}

/// Applies effects to whatever is displaying the page.
pub trait EffectSink {
    fn apply(&mut self, effect: SyncEffect);
}

impl EffectSink for Vec<SyncEffect> {
    fn apply(&mut self, effect: SyncEffect) {
        self.push(effect);
    }
}

#[derive(Debug, Clone)]
pub struct Synchronizer {
    config: SyncConfig,
    links: Vec<NavLink>,
    scroll: ScrollState,
    counters: Vec<Counter>,
    counter_gate: OneShot,
    reveals: RevealAnimator,
}

impl Synchronizer {
    pub fn new(
        config: SyncConfig,
        links: Vec<NavLink>,
        counters: Vec<Counter>,
        reveals: impl IntoIterator<Item = RevealKind>,
    ) -> Self {
        let reveals = RevealAnimator::new(reveals, config.reveal_start);
        Self {
            config,
            links,
            scroll: ScrollState::default(),
            counters,
            counter_gate: OneShot::Pending,
            reveals,
        }
    }

    /// Start watching the counter host. Nothing is observed when the page
    /// has no counters.
    pub fn attach(&self, source: &mut impl IntersectionSource) {
        if !self.counters.is_empty() && !self.counter_gate.is_triggered() {
            source.observe(self.config.counter_visibility);
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    pub fn scroll_state(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn counters(&self) -> &[Counter] {
        &self.counters
    }

    pub fn reveals(&self) -> &RevealAnimator {
        &self.reveals
    }

    /// Reduce one event into the effects the page should show.
    pub fn handle(&mut self, event: SyncEvent) -> Vec<SyncEffect> {
        let mut effects = Vec::new();
        match event {
            SyncEvent::Scroll(sample) => self.on_scroll(sample, &mut effects),
            SyncEvent::Intersection { ratio } => self.on_intersection(ratio, &mut effects),
            SyncEvent::CounterTick(id) => self.step_counter(id, &mut effects),
        }
        effects
    }

    pub fn dispatch(&mut self, event: SyncEvent, sink: &mut impl EffectSink) {
        for effect in self.handle(event) {
            sink.apply(effect);
        }
    }

    fn on_scroll(&mut self, sample: ScrollSample, effects: &mut Vec<SyncEffect>) {
        self.scroll.offset = sample.offset;

        let active = scroll::active_section(&sample.sections, sample.offset, self.config.nav_offset)
            .map(str::to_string);
        for (index, link) in self.links.iter_mut().enumerate() {
            let want = active.as_deref().is_some_and(|id| link.targets(id));
            if link.active != want {
                link.active = want;
                effects.push(SyncEffect::SetLinkActive {
                    link: index,
                    href: link.href.clone(),
                    active: want,
                });
            }
        }
        if self.scroll.active != active {
            trace!(offset = sample.offset, active = ?active, "active section changed");
            self.scroll.active = active;
        }

        let visible = scroll::back_to_top_visible(sample.offset, self.config.back_to_top_after);
        if visible != self.scroll.back_to_top {
            self.scroll.back_to_top = visible;
            effects.push(SyncEffect::SetBackToTop { visible });
        }

        for (target, tween) in self.reveals.observe(&sample.reveal_tops, sample.viewport_height) {
            debug!(reveal = target.0, "revealing target");
            effects.push(SyncEffect::Reveal { target, tween });
        }
    }

    fn on_intersection(&mut self, ratio: f64, effects: &mut Vec<SyncEffect>) {
        if self.counters.is_empty() || ratio < self.config.counter_visibility {
            return;
        }
        if !self.counter_gate.fire() {
            trace!(ratio, "duplicate counter trigger ignored");
            return;
        }

        debug!(ratio, counters = self.counters.len(), "starting counters");
        effects.push(SyncEffect::StopObservingCounters);
        for index in 0..self.counters.len() {
            if self.counters[index].start() {
                self.step_counter(CounterId(index), effects);
            }
        }
    }

    fn step_counter(&mut self, id: CounterId, effects: &mut Vec<SyncEffect>) {
        let Some(counter) = self.counters.get_mut(id.0) else {
            return;
        };
        let Some(step) = counter.step(self.config.counter_steps) else {
            return;
        };

        effects.push(SyncEffect::SetCounterText {
            counter: id,
            text: step.text().to_string(),
        });
        match step {
            CounterStep::Continue(_) => effects.push(SyncEffect::ScheduleCounterTick {
                counter: id,
                delay_ms: self.config.counter_tick.as_millis() as u64,
            }),
            CounterStep::Finished(text) => {
                debug!(counter = id.0, %text, "counter finished");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::CounterPhase;

    struct FakeObserver {
        observed: Option<f64>,
        unobserved: bool,
    }

    impl IntersectionSource for FakeObserver {
        fn observe(&mut self, threshold: f64) {
            self.observed = Some(threshold);
        }

        fn unobserve(&mut self) {
            self.unobserved = true;
        }
    }

    struct FixedPage {
        offset: f64,
        reveal_tops: Vec<f64>,
    }

    impl ScrollSource for FixedPage {
        fn scroll_offset(&self) -> f64 {
            self.offset
        }

        fn viewport_height(&self) -> f64 {
            1000.0
        }

        fn sections(&self) -> Vec<Section> {
            sections()
        }

        fn reveal_top(&self, target: RevealId) -> Option<f64> {
            self.reveal_tops.get(target.0).map(|top| top - self.offset)
        }
    }

    fn sections() -> Vec<Section> {
        vec![
            Section::new("home", 0.0, 800.0),
            Section::new("about", 800.0, 900.0),
            Section::new("team", 1700.0, 900.0),
        ]
    }

    fn links() -> Vec<NavLink> {
        vec![NavLink::new("#home"), NavLink::new("#about"), NavLink::new("#team")]
    }

    fn sync_with_counters(targets: &[&str]) -> Synchronizer {
        Synchronizer::new(
            SyncConfig::default(),
            links(),
            targets.iter().filter_map(|t| Counter::parse(t)).collect(),
            [RevealKind::Section, RevealKind::Element],
        )
    }

    fn scroll_to(offset: f64) -> SyncEvent {
        SyncEvent::Scroll(ScrollSample {
            offset,
            viewport_height: 1000.0,
            sections: sections(),
            reveal_tops: vec![Some(800.0 - offset), Some(2000.0 - offset)],
        })
    }

    fn active_hrefs(sync: &Synchronizer) -> Vec<&str> {
        sync.links()
            .iter()
            .filter(|link| link.active)
            .map(|link| link.href.as_str())
            .collect()
    }

    /// Run counter ticks until none are scheduled.
    fn drain_ticks(sync: &mut Synchronizer, mut effects: Vec<SyncEffect>) -> Vec<SyncEffect> {
        let mut all = Vec::new();
        let mut guard = 0;
        while !effects.is_empty() {
            let ticks: Vec<CounterId> = effects
                .iter()
                .filter_map(|e| match e {
                    SyncEffect::ScheduleCounterTick { counter, .. } => Some(*counter),
                    _ => None,
                })
                .collect();
            all.append(&mut effects);
            for id in ticks {
                effects.extend(sync.handle(SyncEvent::CounterTick(id)));
            }
            guard += 1;
            assert!(guard < 10_000, "counters never settled");
        }
        all
    }

    #[test]
    fn test_scroll_activates_exactly_one_link() {
        let mut sync = sync_with_counters(&[]);

        let effects = sync.handle(scroll_to(650.0));
        assert_eq!(active_hrefs(&sync), vec!["#about"]);
        assert!(effects.contains(&SyncEffect::SetLinkActive {
            link: 1,
            href: "#about".to_string(),
            active: true,
        }));
        assert_eq!(sync.scroll_state().active.as_deref(), Some("about"));

        let effects = sync.handle(scroll_to(1600.0));
        assert_eq!(active_hrefs(&sync), vec!["#team"]);
        let link_changes: Vec<_> = effects
            .iter()
            .filter(|e| matches!(e, SyncEffect::SetLinkActive { .. }))
            .collect();
        assert_eq!(link_changes.len(), 2);
    }

    #[test]
    fn test_repeated_scroll_emits_nothing_new() {
        let mut sync = sync_with_counters(&[]);
        sync.handle(scroll_to(650.0));
        let effects = sync.handle(scroll_to(660.0));
        assert!(effects.is_empty(), "{effects:?}");
    }

    #[test]
    fn test_no_link_active_above_sections() {
        let mut sync = Synchronizer::new(
            SyncConfig::default(),
            vec![NavLink::new("#about"), NavLink::new("#")],
            Vec::new(),
            [],
        );
        let sample = ScrollSample {
            offset: 0.0,
            viewport_height: 1000.0,
            sections: vec![Section::new("about", 900.0, 100.0)],
            reveal_tops: Vec::new(),
        };
        let effects = sync.handle(SyncEvent::Scroll(sample));
        assert!(active_hrefs(&sync).is_empty());
        assert!(effects.is_empty());
    }

    #[test]
    fn test_back_to_top_toggles_on_threshold() {
        let mut sync = sync_with_counters(&[]);
        let visible = |effects: &[SyncEffect]| {
            effects.iter().find_map(|e| match e {
                SyncEffect::SetBackToTop { visible } => Some(*visible),
                _ => None,
            })
        };

        assert_eq!(visible(&sync.handle(scroll_to(299.0))), None);
        assert_eq!(visible(&sync.handle(scroll_to(300.0))), None);
        assert_eq!(visible(&sync.handle(scroll_to(301.0))), Some(true));
        assert!(sync.scroll_state().back_to_top);
        assert_eq!(visible(&sync.handle(scroll_to(300.0))), Some(false));
        assert!(!sync.scroll_state().back_to_top);
    }

    #[test]
    fn test_reveal_fires_once_per_target() {
        let mut sync = sync_with_counters(&[]);
        let reveals = |effects: &[SyncEffect]| {
            effects
                .iter()
                .filter_map(|e| match e {
                    SyncEffect::Reveal { target, .. } => Some(*target),
                    _ => None,
                })
                .collect::<Vec<_>>()
        };

        assert_eq!(reveals(&sync.handle(scroll_to(0.0))), vec![RevealId(0)]);
        assert!(reveals(&sync.handle(scroll_to(0.0))).is_empty());
        assert_eq!(reveals(&sync.handle(scroll_to(1300.0))), vec![RevealId(1)]);
        assert!(reveals(&sync.handle(scroll_to(0.0))).is_empty());
        assert!(reveals(&sync.handle(scroll_to(1300.0))).is_empty());
        assert_eq!(sync.reveals().pending(), 0);
    }

    #[test]
    fn test_capture_reads_source() {
        let page = FixedPage {
            offset: 500.0,
            reveal_tops: vec![600.0],
        };
        let sample = ScrollSample::capture(&page, 2);
        assert_eq!(sample.offset, 500.0);
        assert_eq!(sample.viewport_height, 1000.0);
        assert_eq!(sample.sections.len(), 3);
        assert_eq!(sample.reveal_tops, vec![Some(100.0), None]);
    }

    #[test]
    fn test_attach_observes_only_with_counters() {
        let mut observer = FakeObserver {
            observed: None,
            unobserved: false,
        };
        sync_with_counters(&[]).attach(&mut observer);
        assert_eq!(observer.observed, None);

        sync_with_counters(&["100"]).attach(&mut observer);
        assert_eq!(observer.observed, Some(COUNTER_VISIBILITY));
    }

    #[test]
    fn test_partial_visibility_does_not_start_counters() {
        let mut sync = sync_with_counters(&["100"]);
        assert!(sync.handle(SyncEvent::Intersection { ratio: 0.49 }).is_empty());
        assert!(sync.handle(SyncEvent::Intersection { ratio: 0.0 }).is_empty());
        assert_eq!(sync.counters()[0].phase(), CounterPhase::Idle);
    }

    #[test]
    fn test_counters_run_to_formatted_targets() {
        let mut sync = sync_with_counters(&["100", "4.9", "500"]);
        let first = sync.handle(SyncEvent::Intersection { ratio: 0.5 });
        assert_eq!(first[0], SyncEffect::StopObservingCounters);
        assert!(first.contains(&SyncEffect::ScheduleCounterTick {
            counter: CounterId(0),
            delay_ms: 1,
        }));

        let all = drain_ticks(&mut sync, first);
        let texts: Vec<&str> = sync.counters().iter().map(|c| c.text()).collect();
        assert_eq!(texts, vec!["100", "4.9", "500+"]);
        assert!(sync.counters().iter().all(|c| c.phase() == CounterPhase::Done));

        let last_for = |id: usize| {
            all.iter().rev().find_map(|e| match e {
                SyncEffect::SetCounterText { counter, text } if counter.0 == id => Some(text.clone()),
                _ => None,
            })
        };
        assert_eq!(last_for(0).as_deref(), Some("100"));
        assert_eq!(last_for(2).as_deref(), Some("500+"));

        // settled counters ignore stray ticks
        assert!(sync.handle(SyncEvent::CounterTick(CounterId(0))).is_empty());
    }

    #[test]
    fn test_duplicate_intersection_does_not_restart() {
        let mut sync = sync_with_counters(&["100"]);
        let first = sync.handle(SyncEvent::Intersection { ratio: 0.9 });
        assert!(!first.is_empty());
        assert!(sync.handle(SyncEvent::Intersection { ratio: 1.0 }).is_empty());

        drain_ticks(&mut sync, first);
        assert!(sync.handle(SyncEvent::Intersection { ratio: 1.0 }).is_empty());
        assert_eq!(sync.counters()[0].text(), "100");

        let mut observer = FakeObserver {
            observed: None,
            unobserved: false,
        };
        sync.attach(&mut observer);
        assert_eq!(observer.observed, None);
        assert!(!observer.unobserved);
    }

    #[test]
    fn test_dispatch_into_sink() {
        let mut sync = sync_with_counters(&[]);
        let mut sink: Vec<SyncEffect> = Vec::new();
        sync.dispatch(scroll_to(400.0), &mut sink);
        assert!(sink.contains(&SyncEffect::SetBackToTop { visible: true }));
    }

    #[test]
    fn test_unknown_counter_tick_is_ignored() {
        let mut sync = sync_with_counters(&["5"]);
        assert!(sync.handle(SyncEvent::CounterTick(CounterId(7))).is_empty());
    }
}
