//! Sparse keyframe curves with looping evaluation

use super::types::Lerp;

/// A value at a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyframe<T> {
    pub time: f32,
    pub value: T,
}

/// Keys sorted by time, sampled with linear or spherical interpolation.
///
/// The curve loops with a period equal to the time of its last key. Keys are
/// kept in insertion order; callers add them in non-decreasing time order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyframeCurve<T> {
    keys: Vec<Keyframe<T>>,
}

impl<T> Default for KeyframeCurve<T> {
    fn default() -> Self {
        Self { keys: Vec::new() }
    }
}

impl<T: Lerp> KeyframeCurve<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A curve holding one key at time zero
    pub fn constant(value: T) -> Self {
        let mut curve = Self::new();
        curve.add(0.0, value);
        curve
    }

    /// Append a key
    pub fn add(&mut self, time: f32, value: T) {
        self.keys.push(Keyframe { time, value });
    }

    pub fn keys(&self) -> &[Keyframe<T>] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Loop period, the time of the last key
    pub fn duration(&self) -> f32 {
        self.keys.last().map_or(0.0, |key| key.time)
    }

    /// Sample the curve at `time`.
    ///
    /// `time` wraps modulo the last key's time. Before the first key the first
    /// value is returned, at or past the last key the last value. An empty
    /// curve yields `default`.
    pub fn evaluate(&self, time: f32, default: T) -> T {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return default;
        };

        // A zero period would wrap every time to NaN
        if self.keys.len() == 1 || last.time == 0.0 || !time.is_finite() {
            return first.value;
        }

        let time = time % last.time;

        let Some(index) = find_key_index(&self.keys, time) else {
            return first.value;
        };

        let current = &self.keys[index];
        let Some(next) = self.keys.get(index + 1) else {
            return current.value;
        };

        let delta = next.time - current.time;
        if delta > 0.0 {
            let fraction = ((time - current.time) / delta).clamp(0.0, 1.0);
            current.value.lerp(&next.value, fraction)
        } else {
            current.value
        }
    }
}

impl<T: Lerp> FromIterator<(f32, T)> for KeyframeCurve<T> {
    fn from_iter<I: IntoIterator<Item = (f32, T)>>(iter: I) -> Self {
        Self {
            keys: iter
                .into_iter()
                .map(|(time, value)| Keyframe { time, value })
                .collect(),
        }
    }
}

/// Find the greatest key index whose time is `<= time`.
///
/// Returns `None` when there are no keys or `time` is before the first key.
/// Times at or past the last key return the last index.
pub fn find_key_index<T>(keys: &[Keyframe<T>], time: f32) -> Option<usize> {
    let first = keys.first()?;
    if time < first.time {
        return None;
    }

    let last_index = keys.len() - 1;
    if time >= keys[last_index].time {
        return Some(last_index);
    }

    let mut min = 0;
    let mut max = keys.len();
    while max - min > 1 {
        let mid = (min + max) / 2;
        if keys[mid].time <= time {
            min = mid;
        } else {
            max = mid;
        }
    }

    Some(min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use test_case::test_case;

    fn ramp() -> KeyframeCurve<Vec3> {
        [
            (0.0, Vec3::new(0.0, 0.0, 0.0)),
            (1.0, Vec3::new(1.0, 0.0, 0.0)),
            (2.0, Vec3::new(2.0, 0.0, 0.0)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_find_key_index_empty() {
        let keys: Vec<Keyframe<f32>> = vec![];
        assert_eq!(find_key_index(&keys, 0.0), None);
    }

    #[test]
    fn test_find_key_index_multiple() {
        let curve: KeyframeCurve<f32> = [(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0)]
            .into_iter()
            .collect();
        let keys = curve.keys();

        assert_eq!(find_key_index(keys, -1.0), None);
        assert_eq!(find_key_index(keys, 0.0), Some(0));
        assert_eq!(find_key_index(keys, 5.0), Some(0));
        assert_eq!(find_key_index(keys, 10.0), Some(1));
        assert_eq!(find_key_index(keys, 25.0), Some(2));
        assert_eq!(find_key_index(keys, 30.0), Some(3));
        assert_eq!(find_key_index(keys, 99.0), Some(3));
    }

    #[test]
    fn test_find_key_index_duplicate_times_picks_last() {
        let curve: KeyframeCurve<f32> = [(0.0, 0.0), (1.0, 1.0), (1.0, 2.0), (2.0, 3.0)]
            .into_iter()
            .collect();
        assert_eq!(find_key_index(curve.keys(), 1.0), Some(2));
    }

    #[test_case(0.5, 0.5; "interior")]
    #[test_case(1.5, 1.5; "second segment")]
    #[test_case(2.5, 0.5; "wraps past the end")]
    #[test_case(2.0, 0.0; "last key wraps to first")]
    #[test_case(4.25, 0.25; "several loops")]
    #[test_case(-0.5, 0.0; "negative clamps to first")]
    fn test_evaluate_ramp(time: f32, expected_x: f32) {
        let value = ramp().evaluate(time, Vec3::ZERO);
        assert!((value.x - expected_x).abs() < 1e-5, "got {value}");
        assert_eq!(value.y, 0.0);
    }

    #[test]
    fn test_empty_curve_returns_default() {
        let curve = KeyframeCurve::<Vec3>::new();
        assert_eq!(curve.evaluate(1.0, Vec3::ONE), Vec3::ONE);
    }

    #[test_case(0.0)]
    #[test_case(3.7)]
    #[test_case(-2.0)]
    #[test_case(f32::NAN)]
    fn test_single_key_is_constant(time: f32) {
        let curve = KeyframeCurve::constant(Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(curve.evaluate(time, Vec3::ZERO), Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_coincident_keys_return_earlier_value() {
        let curve: KeyframeCurve<f32> = [(1.0, 5.0), (1.0, 7.0), (3.0, 9.0)]
            .into_iter()
            .collect();
        // Both leading keys sit at 1.0, so the search lands on the second one
        assert_eq!(curve.evaluate(1.0, 0.0), 7.0);
        assert_eq!(curve.evaluate(0.5, 0.0), 5.0);
    }

    #[test]
    fn test_rotation_curve_slerps() {
        let curve: KeyframeCurve<Quat> = [
            (0.0, Quat::IDENTITY),
            (10.0, Quat::from_rotation_x(1.0)),
            (20.0, Quat::IDENTITY),
        ]
        .into_iter()
        .collect();

        let q = curve.evaluate(5.0, Quat::IDENTITY);
        assert!(q.angle_between(Quat::from_rotation_x(0.5)) < 1e-4);
    }
}
