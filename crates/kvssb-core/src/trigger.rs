/// A trigger that fires at most once.
///
/// Visibility signals can arrive more than once for the same element (a
/// browser may deliver a batch before `unobserve` takes effect), so every
/// one-shot animation on the page gates on one of these instead of on
/// listener removal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OneShot {
    #[default]
    Pending,
    Triggered,
}

impl OneShot {
    /// Fire the trigger. Returns `true` only on the pending -> triggered
    /// transition; every later call is a no-op returning `false`.
    pub fn fire(&mut self) -> bool {
        match self {
            OneShot::Pending => {
                *self = OneShot::Triggered;
                true
            }
            OneShot::Triggered => false,
        }
    }

    pub fn is_triggered(&self) -> bool {
        matches!(self, OneShot::Triggered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once() {
        let mut trigger = OneShot::default();
        assert!(!trigger.is_triggered());
        assert!(trigger.fire());
        assert!(trigger.is_triggered());
        assert!(!trigger.fire());
        assert!(!trigger.fire());
        assert_eq!(trigger, OneShot::Triggered);
    }
}
