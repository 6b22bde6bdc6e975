//! Property transitions handed to the page's tween engine.
//!
//! A [`Tween`] serializes to the vars object gsap expects, e.g.
//! `{"y": -10, "color": "#3b82f6", "duration": 0.3}`.

use serde::Serialize;
use std::collections::BTreeMap;

/// Duration of every hover transition, in seconds
pub const HOVER_DURATION: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TweenValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tween {
    #[serde(flatten)]
    pub props: BTreeMap<String, TweenValue>,
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
    /// `-1` repeats forever
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ease: Option<String>,
}

impl Tween {
    pub fn new(duration: f64) -> Self {
        Self {
            props: BTreeMap::new(),
            duration,
            delay: None,
            repeat: None,
            ease: None,
        }
    }

    pub fn num(mut self, prop: &str, value: f64) -> Self {
        self.props.insert(prop.to_string(), TweenValue::Number(value));
        self
    }

    pub fn text(mut self, prop: &str, value: &str) -> Self {
        self.props
            .insert(prop.to_string(), TweenValue::Text(value.to_string()));
        self
    }

    pub fn delay(mut self, seconds: f64) -> Self {
        self.delay = Some(seconds);
        self
    }

    pub fn repeat_forever(mut self) -> Self {
        self.repeat = Some(-1);
        self
    }

    pub fn ease(mut self, ease: &str) -> Self {
        self.ease = Some(ease.to_string());
        self
    }

    pub fn get(&self, prop: &str) -> Option<&TweenValue> {
        self.props.get(prop)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Endless spin for the hero cubes.
///
/// `rolls` are four uniform samples in `[0, 1)`: three starting angles and
/// one duration jitter. Each cube turns a full revolution on every axis
/// over 3-6 seconds, staggered half a second per cube.
pub fn cube_spin(index: usize, rolls: [f64; 4]) -> Tween {
    let [x, y, z, jitter] = rolls;
    Tween::new(3.0 + jitter * 3.0)
        .num("rotationX", x * 360.0 + 360.0)
        .num("rotationY", y * 360.0 + 360.0)
        .num("rotationZ", z * 360.0 + 360.0)
        .delay(index as f64 * 0.5)
        .repeat_forever()
        .ease("none")
}
