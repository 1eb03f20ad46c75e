//! Suggesting keyframe durations from entity gaits

use super::playback::Interpolator;
use crate::core::settings::TimingSettings;
use crate::data::Keyframe;

/// Suggest how long the move from `from` to `to` should take.
///
/// Every entity present in both keyframes needs `path length / gait speed`
/// seconds; the slowest one sets the pace. The result is rounded up to the
/// configured step and never drops below the configured minimum.
pub fn suggest_duration(
    interpolator: &Interpolator,
    timing: &TimingSettings,
    from: &Keyframe,
    to: &Keyframe,
) -> f64 {
    let needed = from
        .entities
        .iter()
        .filter_map(|entity| {
            let target = to.by_label(&entity.label)?;
            let length = interpolator
                .transition(entity.pose(), target.pose())
                .length();
            Some(length / entity.speed_class.meters_per_second())
        })
        .fold(0.0_f64, f64::max);

    let step = timing.duration_step;
    let rounded = (needed / step).ceil() * step;
    rounded.max(timing.min_auto_duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Entity, EntityId, SpeedClass};

    fn frame(entities: Vec<Entity>) -> Keyframe {
        Keyframe {
            index: 0,
            timestamp: 0.0,
            duration: 1.0,
            entities,
        }
    }

    #[test]
    fn slowest_entity_sets_duration() {
        let from = frame(vec![
            Entity::new(EntityId(0), "walker", (0.0, 0.0), 0.0),
            Entity::new(EntityId(1), "galloper", (0.0, 5.0), 0.0)
                .with_speed_class(SpeedClass::Gallop),
        ]);
        let to = frame(vec![
            Entity::new(EntityId(2), "walker", (5.5, 0.0), 0.0),
            Entity::new(EntityId(3), "galloper", (30.0, 5.0), 0.0),
        ]);
        let duration = suggest_duration(
            &Interpolator::default(),
            &TimingSettings::default(),
            &from,
            &to,
        );
        // 5.5 m at 1.5 m/s beats 30 m at 10 m/s, rounded up to 4 s
        assert_eq!(duration, 4.0);
    }

    #[test]
    fn stationary_entities_get_minimum() {
        let from = frame(vec![Entity::new(EntityId(0), "a", (1.0, 1.0), 0.0)]);
        let to = frame(vec![Entity::new(EntityId(1), "a", (1.0, 1.0), 2.0)]);
        let timing = TimingSettings::default();
        let duration =
            suggest_duration(&Interpolator::default(), &timing, &from, &to);
        assert_eq!(duration, timing.min_auto_duration);
    }
}
