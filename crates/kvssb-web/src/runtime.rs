//! Browser host for the scroll synchronizer.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use kvssb_core::counter::Counter;
use kvssb_core::layout::{NavLink, Section};
use kvssb_core::reveal::{RevealId, RevealKind};
use kvssb_core::sync::{
    EffectSink, IntersectionSource, ScrollSample, ScrollSource, SyncConfig, SyncEffect, SyncEvent,
    Synchronizer,
};
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
};

use crate::{dom, ffi};

const ACTIVE_CLASS: &str = "active";

/// Live page geometry
struct DomPage {
    sections: Vec<HtmlElement>,
    reveals: Vec<Element>,
}

impl ScrollSource for DomPage {
    fn scroll_offset(&self) -> f64 {
        dom::scroll_offset()
    }

    fn viewport_height(&self) -> f64 {
        dom::viewport_height()
    }

    fn sections(&self) -> Vec<Section> {
        self.sections
            .iter()
            .map(|section| Section {
                id: section.get_attribute("id"),
                top: f64::from(section.offset_top()),
                height: f64::from(section.client_height()),
            })
            .collect()
    }

    fn reveal_top(&self, target: RevealId) -> Option<f64> {
        self.reveals
            .get(target.0)
            .map(|element| element.get_bounding_client_rect().top())
    }
}

/// Watches the counter host section.
struct CounterObserver {
    host: Element,
    runtime: Weak<Runtime>,
    observer: Option<IntersectionObserver>,
}

impl IntersectionSource for CounterObserver {
    fn observe(&mut self, threshold: f64) {
        let runtime = self.runtime.clone();
        let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                let Some(runtime) = runtime.upgrade() else {
                    return;
                };
                for entry in entries.iter() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    let ratio = if entry.is_intersecting() {
                        entry.intersection_ratio()
                    } else {
                        0.0
                    };
                    runtime.dispatch(SyncEvent::Intersection { ratio });
                }
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold));
        match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
            Ok(observer) => {
                observer.observe(&self.host);
                self.observer = Some(observer);
            }
            Err(_) => debug!("IntersectionObserver unavailable, counters disabled"),
        }
        callback.forget();
    }

    fn unobserve(&mut self) {
        if let Some(observer) = &self.observer {
            observer.unobserve(&self.host);
        }
    }
}

pub struct Runtime {
    sync: RefCell<Synchronizer>,
    page: DomPage,
    links: Vec<Element>,
    back_to_top: Option<Element>,
    counters: Vec<Element>,
    observer: RefCell<Option<CounterObserver>>,
}

impl Runtime {
    /// Collect the page's scroll-driven elements and start listening.
    pub fn install(config: SyncConfig) -> Option<Rc<Self>> {
        let window = dom::window()?;

        let links = dom::query_all(".nav-link");
        let nav = links
            .iter()
            .map(|link| NavLink::new(&link.get_attribute("href").unwrap_or_default()))
            .collect();

        let mut counter_elements = Vec::new();
        let mut counters = Vec::new();
        for element in dom::query_all(".counter") {
            let raw = element.get_attribute("data-target").unwrap_or_default();
            let Some(counter) = Counter::parse(&raw) else {
                debug!(raw = %raw, "skipping counter with non-numeric target");
                continue;
            };
            let shown = element.text_content().unwrap_or_default();
            counters.push(counter.starting_at(&shown));
            counter_elements.push(element);
        }

        let mut reveals = Vec::new();
        let mut kinds = Vec::new();
        let groups = [
            (".section", RevealKind::Section),
            (".animate-on-scroll", RevealKind::Element),
        ];
        for (selector, kind) in groups {
            for element in dom::query_all(selector) {
                reveals.push(element);
                kinds.push(kind);
            }
        }

        let runtime = Rc::new(Self {
            sync: RefCell::new(Synchronizer::new(config, nav, counters, kinds)),
            page: DomPage {
                sections: dom::query_all_as::<HtmlElement>("section"),
                reveals,
            },
            links,
            back_to_top: dom::query(".back-to-top"),
            counters: counter_elements,
            observer: RefCell::new(None),
        });

        if let Some(host) = dom::query(".about-section") {
            let mut observer = CounterObserver {
                host,
                runtime: Rc::downgrade(&runtime),
                observer: None,
            };
            runtime.sync.borrow().attach(&mut observer);
            *runtime.observer.borrow_mut() = Some(observer);
        } else {
            debug!("no .about-section, counters disabled");
        }

        let on_scroll = Rc::clone(&runtime);
        dom::listen(&window, "scroll", move |_| on_scroll.sample());

        // reveal whatever is already on screen
        runtime.sample();
        Some(runtime)
    }

    fn sample(self: &Rc<Self>) {
        let reveals = self.page.reveals.len();
        let sample = ScrollSample::capture(&self.page, reveals);
        self.dispatch(SyncEvent::Scroll(sample));
    }

    /// Reduce an event, then apply its effects outside the borrow.
    pub fn dispatch(self: &Rc<Self>, event: SyncEvent) {
        let effects = self.sync.borrow_mut().handle(event);
        let mut sink = DomSink { runtime: self };
        for effect in effects {
            sink.apply(effect);
        }
    }
}

struct DomSink<'a> {
    runtime: &'a Rc<Runtime>,
}

impl EffectSink for DomSink<'_> {
    fn apply(&mut self, effect: SyncEffect) {
        let runtime = self.runtime;
        match effect {
            SyncEffect::SetLinkActive { link, active, .. } => {
                if let Some(element) = runtime.links.get(link) {
                    dom::set_class(element, ACTIVE_CLASS, active);
                }
            }
            SyncEffect::SetBackToTop { visible } => {
                if let Some(button) = &runtime.back_to_top {
                    dom::set_class(button, ACTIVE_CLASS, visible);
                }
            }
            SyncEffect::SetCounterText { counter, text } => {
                if let Some(element) = runtime.counters.get(counter.0) {
                    element.set_text_content(Some(&text));
                }
            }
            SyncEffect::ScheduleCounterTick { counter, delay_ms } => {
                let runtime = Rc::clone(runtime);
                dom::after(std::time::Duration::from_millis(delay_ms), move || {
                    runtime.dispatch(SyncEvent::CounterTick(counter));
                });
            }
            SyncEffect::Reveal { target, tween } => {
                if let Some(element) = runtime.page.reveals.get(target.0) {
                    ffi::tween_from(element, &tween);
                }
            }
            SyncEffect::StopObservingCounters => {
                if let Some(observer) = runtime.observer.borrow_mut().as_mut() {
                    observer.unobserve();
                }
            }
        }
    }
}
