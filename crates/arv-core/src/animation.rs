//! Fades and tweens driven by a single animation clock
//!
//! Every animated scalar is addressed by a key. Starting a tween on a key
//! replaces whatever is running on it, including its completion
//! continuation, which is then never delivered.

use std::collections::HashMap;
use std::hash::Hash;

/// Easing curve applied to tween progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    QuadOut,
    CubicInOut,
    /// Overshoots slightly before settling; used for the model pop-in.
    BackOut,
}

impl Easing {
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::BackOut => {
                const C1: f32 = 1.70158;
                const C3: f32 = C1 + 1.0;
                1.0 + C3 * (t - 1.0).powi(3) + C1 * (t - 1.0).powi(2)
            }
        }
    }
}

/// Time-driven interpolation of a scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    /// Seconds.
    pub duration: f32,
    pub elapsed: f32,
    pub easing: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing,
        }
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= f32::EPSILON {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }

    pub fn value(&self) -> f32 {
        let eased = self.easing.apply(self.progress());
        self.from + (self.to - self.from) * eased
    }

    /// Advance by `dt` seconds. Returns true once finished.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt.max(0.0);
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }
}

struct Track<C> {
    tween: Tween,
    on_complete: Option<C>,
    /// Start order across all keys.
    sequence: u64,
}

/// Keyed tween scheduler.
///
/// `K` names an animated property, `C` is the continuation delivered when a
/// tween completes.
pub struct Animator<K, C> {
    tracks: HashMap<K, Track<C>>,
    values: HashMap<K, f32>,
    next_sequence: u64,
}

impl<K, C> Default for Animator<K, C> {
    fn default() -> Self {
        Self {
            tracks: HashMap::new(),
            values: HashMap::new(),
            next_sequence: 0,
        }
    }
}

impl<K: Copy + Eq + Hash + std::fmt::Debug, C> Animator<K, C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value immediately, cancelling any running tween on it.
    pub fn set(&mut self, key: K, value: f32) {
        self.tracks.remove(&key);
        self.values.insert(key, value);
    }

    /// Current value of `key`, or `default` if it was never set.
    pub fn value_or(&self, key: K, default: f32) -> f32 {
        self.values.get(&key).copied().unwrap_or(default)
    }

    pub fn is_animating(&self, key: K) -> bool {
        self.tracks.contains_key(&key)
    }

    /// Tween `key` from its current value to `to` (last writer wins).
    pub fn animate(&mut self, key: K, to: f32, duration: f32, easing: Easing) {
        self.start(key, to, duration, easing, None);
    }

    /// Tween `key` and deliver `on_complete` when it finishes.
    pub fn animate_then(&mut self, key: K, to: f32, duration: f32, easing: Easing, on_complete: C) {
        self.start(key, to, duration, easing, Some(on_complete));
    }

    fn start(&mut self, key: K, to: f32, duration: f32, easing: Easing, on_complete: Option<C>) {
        let from = self.value_or(key, to);
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        if self
            .tracks
            .insert(
                key,
                Track {
                    tween: Tween::new(from, to, duration, easing),
                    on_complete,
                    sequence,
                },
            )
            .is_some()
        {
            tracing::trace!(?key, "Replaced in-flight tween");
        }
    }

    /// Advance every tween by `dt` seconds.
    ///
    /// Returns the continuations of tweens that finished on this tick, in
    /// the order the tweens were started.
    pub fn tick(&mut self, dt: f32) -> Vec<C> {
        let mut finished = Vec::new();
        for (key, track) in self.tracks.iter_mut() {
            let done = track.tween.advance(dt);
            self.values.insert(*key, track.tween.value());
            if done {
                finished.push((track.sequence, *key));
            }
        }
        finished.sort_unstable_by_key(|(sequence, _)| *sequence);

        finished
            .into_iter()
            .filter_map(|(_, key)| self.tracks.remove(&key).and_then(|track| track.on_complete))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Key {
        Opacity,
        Scale,
        Grid,
        Shadow,
    }

    #[test]
    fn test_tween_reaches_target() {
        let mut tween = Tween::new(0.0, 2.0, 1.0, Easing::Linear);
        assert!(!tween.advance(0.5));
        assert_relative_eq!(tween.value(), 1.0);
        assert!(tween.advance(0.6));
        assert_relative_eq!(tween.value(), 2.0);
    }

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::QuadOut, Easing::CubicInOut, Easing::BackOut] {
            assert_relative_eq!(easing.apply(0.0), 0.0, epsilon = 1e-6);
            assert_relative_eq!(easing.apply(1.0), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_completion_delivered_once() {
        let mut animator: Animator<Key, &str> = Animator::new();
        animator.set(Key::Opacity, 0.0);
        animator.animate_then(Key::Opacity, 1.0, 0.2, Easing::Linear, "shown");

        assert!(animator.tick(0.1).is_empty());
        assert_eq!(animator.tick(0.1), vec!["shown"]);
        assert!(animator.tick(0.1).is_empty());
        assert_relative_eq!(animator.value_or(Key::Opacity, -1.0), 1.0);
    }

    #[test]
    fn test_new_tween_replaces_in_flight_one() {
        let mut animator: Animator<Key, &str> = Animator::new();
        animator.set(Key::Scale, 1.0);
        animator.animate_then(Key::Scale, 0.0, 1.0, Easing::Linear, "hidden");
        animator.tick(0.5);
        animator.animate_then(Key::Scale, 1.0, 0.5, Easing::Linear, "shown");

        let mut delivered = Vec::new();
        for _ in 0..10 {
            delivered.extend(animator.tick(0.1));
        }
        assert_eq!(delivered, vec!["shown"]);
        assert_relative_eq!(animator.value_or(Key::Scale, 0.0), 1.0);
    }

    #[test]
    fn test_completions_follow_start_order() {
        let starts = [Key::Shadow, Key::Opacity, Key::Grid, Key::Scale];
        for rotation in 0..starts.len() {
            let mut animator: Animator<Key, Key> = Animator::new();
            let mut order = starts.to_vec();
            order.rotate_left(rotation);
            for key in &order {
                animator.animate_then(*key, 1.0, 0.3, Easing::Linear, *key);
            }
            assert_eq!(animator.tick(0.5), order);
        }
    }
}
