//! Card flips and hover lifts.

use crate::tween::{HOVER_DURATION, Tween};

const LIFTED_SHADOW: &str =
    "0 20px 25px -5px rgba(0, 0, 0, 0.1), 0 10px 10px -5px rgba(0, 0, 0, 0.04)";
const ACCENT: &str = "#3b82f6";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CardFace {
    #[default]
    Front,
    /// Contact details on the reverse of a team member card
    Back,
}

impl CardFace {
    pub fn transform(self) -> &'static str {
        match self {
            CardFace::Front => "rotateY(0deg)",
            CardFace::Back => "rotateY(180deg)",
        }
    }
}

/// Elements that lift while hovered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTarget {
    Letter,
    ServiceCard,
    ProjectCard,
    TechItem,
}

/// Which node of a hover target a tween applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverPart {
    Itself,
    /// The `<i>` icon inside a tech item
    Icon,
}

impl HoverTarget {
    pub const ALL: [HoverTarget; 4] = [
        HoverTarget::Letter,
        HoverTarget::ServiceCard,
        HoverTarget::ProjectCard,
        HoverTarget::TechItem,
    ];

    pub fn selector(self) -> &'static str {
        match self {
            HoverTarget::Letter => ".letter",
            HoverTarget::ServiceCard => ".service-card",
            HoverTarget::ProjectCard => ".project-card",
            HoverTarget::TechItem => ".tech-item",
        }
    }

    pub fn enter(self) -> Vec<(HoverPart, Tween)> {
        let tween = Tween::new(HOVER_DURATION);
        match self {
            HoverTarget::Letter => vec![(HoverPart::Itself, tween.num("y", -10.0).text("color", ACCENT))],
            HoverTarget::ServiceCard => vec![(
                HoverPart::Itself,
                tween.num("y", -10.0).text("boxShadow", LIFTED_SHADOW),
            )],
            HoverTarget::ProjectCard => vec![(
                HoverPart::Itself,
                tween.num("y", -5.0).text("boxShadow", LIFTED_SHADOW),
            )],
            HoverTarget::TechItem => vec![
                (
                    HoverPart::Itself,
                    tween
                        .clone()
                        .num("y", -5.0)
                        .text("backgroundColor", ACCENT)
                        .text("color", "#ffffff"),
                ),
                (HoverPart::Icon, tween.text("color", "#ffffff")),
            ],
        }
    }

    pub fn leave(self) -> Vec<(HoverPart, Tween)> {
        let tween = Tween::new(HOVER_DURATION).num("y", 0.0);
        match self {
            HoverTarget::Letter => vec![(HoverPart::Itself, tween.text("color", "var(--dark-color)"))],
            HoverTarget::ServiceCard | HoverTarget::ProjectCard => {
                vec![(HoverPart::Itself, tween.text("boxShadow", "var(--shadow)"))]
            }
            HoverTarget::TechItem => vec![
                (
                    HoverPart::Itself,
                    tween
                        .text("backgroundColor", "var(--card-bg)")
                        .text("color", "var(--text-color)"),
                ),
                (
                    HoverPart::Icon,
                    Tween::new(HOVER_DURATION).text("color", "var(--primary-color)"),
                ),
            ],
        }
    }
}
