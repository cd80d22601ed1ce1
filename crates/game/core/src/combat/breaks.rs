//! Per-element break gauges.

use std::collections::BTreeMap;

use crate::state::{BreakGauge, Element};

/// Effect of one damaging hit on a target's break gauge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakProgress {
    /// Target has no gauge for this element.
    Unaffected,
    Chipped { remaining: i32 },
    /// Gauge emptied: deal `damage` as a break hit. The gauge is already reset.
    Triggered { damage: u32 },
}

/// Counts one hit of `element` against `gauges`.
///
/// Hit damage is irrelevant; every hit takes exactly one off `remaining`.
pub fn register_break_hit(
    gauges: &mut BTreeMap<Element, BreakGauge>,
    element: Element,
    reset_hits: i32,
) -> BreakProgress {
    let Some(gauge) = gauges.get_mut(&element) else {
        return BreakProgress::Unaffected;
    };

    gauge.remaining -= 1;
    if gauge.remaining > 0 {
        return BreakProgress::Chipped {
            remaining: gauge.remaining,
        };
    }

    gauge.remaining = reset_hits;
    BreakProgress::Triggered {
        damage: gauge.damage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gauges(remaining: i32) -> BTreeMap<Element, BreakGauge> {
        BTreeMap::from([(
            Element::Fire,
            BreakGauge {
                remaining,
                damage: 30,
            },
        )])
    }

    #[test]
    fn last_hit_triggers_and_resets() {
        let mut g = gauges(1);
        assert_eq!(
            register_break_hit(&mut g, Element::Fire, 10),
            BreakProgress::Triggered { damage: 30 }
        );
        assert_eq!(g[&Element::Fire].remaining, 10);
    }

    #[test]
    fn earlier_hits_only_chip() {
        let mut g = gauges(3);
        assert_eq!(
            register_break_hit(&mut g, Element::Fire, 10),
            BreakProgress::Chipped { remaining: 2 }
        );
        assert_eq!(
            register_break_hit(&mut g, Element::Fire, 10),
            BreakProgress::Chipped { remaining: 1 }
        );
    }

    #[test]
    fn missing_gauge_is_unaffected() {
        let mut g = gauges(1);
        assert_eq!(
            register_break_hit(&mut g, Element::Water, 10),
            BreakProgress::Unaffected
        );
        assert_eq!(g[&Element::Fire].remaining, 1);
    }

    #[test]
    fn exhausted_gauge_triggers_immediately() {
        let mut g = gauges(-2);
        assert_eq!(
            register_break_hit(&mut g, Element::Fire, 10),
            BreakProgress::Triggered { damage: 30 }
        );
    }
}
