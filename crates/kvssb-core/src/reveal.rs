use serde::{Deserialize, Serialize};

use crate::trigger::OneShot;
use crate::tween::Tween;

/// Fraction of the viewport height an element's top must rise above
/// before it reveals.
pub const REVEAL_START: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealKind {
    /// A whole `.section`
    Section,
    /// An element marked `.animate-on-scroll`
    Element,
}

impl RevealKind {
    /// Entrance tween, played *from* these values to the element's natural
    /// style.
    pub fn entrance(self) -> Tween {
        match self {
            RevealKind::Section => Tween::new(1.0).num("opacity", 0.0).num("y", 50.0),
            RevealKind::Element => Tween::new(0.8).num("opacity", 0.0).num("y", 30.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RevealId(pub usize);

#[derive(Debug, Clone)]
struct RevealTarget {
    kind: RevealKind,
    trigger: OneShot,
}

/// Plays each target's entrance once, the first time it scrolls into the
/// reveal band.
#[derive(Debug, Clone)]
pub struct RevealAnimator {
    targets: Vec<RevealTarget>,
    start: f64,
}

impl RevealAnimator {
    pub fn new(kinds: impl IntoIterator<Item = RevealKind>, start: f64) -> Self {
        Self {
            targets: kinds
                .into_iter()
                .map(|kind| RevealTarget {
                    kind,
                    trigger: OneShot::Pending,
                })
                .collect(),
            start,
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Targets still waiting for their entrance
    pub fn pending(&self) -> usize {
        self.targets
            .iter()
            .filter(|target| !target.trigger.is_triggered())
            .count()
    }

    /// Check every pending target against the viewport.
    ///
    /// `tops[i]` is target `i`'s top edge relative to the viewport, or
    /// `None` when it can't be measured (detached element); missing
    /// entries are skipped.
    pub fn observe(&mut self, tops: &[Option<f64>], viewport_height: f64) -> Vec<(RevealId, Tween)> {
        let line = viewport_height * self.start;
        let mut revealed = Vec::new();
        for (index, target) in self.targets.iter_mut().enumerate() {
            let Some(Some(top)) = tops.get(index) else {
                continue;
            };
            if *top <= line && target.trigger.fire() {
                revealed.push((RevealId(index), target.kind.entrance()));
            }
        }
        revealed
    }
}
