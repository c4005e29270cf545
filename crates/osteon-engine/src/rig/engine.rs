use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::skeleton::{AnimationEngine, AnimationEvent, EventKind, EventListener};

use super::{RigSkeleton, SkeletonData};

#[derive(Debug, Clone)]
struct Entry {
    animation: usize,
    looping: bool,
    time: f32,
    /// Track time at which this entry starts once queued; `<= 0` means "after the
    /// previous entry's duration".
    delay: f32,
    completed_loops: u32,
}

#[derive(Debug, Clone)]
struct Mix {
    from: Entry,
    elapsed: f32,
    duration: f32,
}

#[derive(Debug, Default)]
struct Track {
    current: Option<Entry>,
    mixing: Option<Mix>,
    queue: VecDeque<Entry>,
}

impl Track {
    fn is_active(&self) -> bool {
        self.current.is_some() || !self.queue.is_empty()
    }
}

/// Track-based animation state for [`RigSkeleton`].
///
/// Supports queued entries with delays, crossfades (`set_mix` / default mix) and the
/// usual lifecycle events. Events are delivered to the listener after each control
/// call or tick.
pub struct RigEngine {
    data: Arc<SkeletonData>,
    tracks: Vec<Track>,
    mixes: HashMap<(String, String), f32>,
    default_mix: f32,
    listener: Option<EventListener>,
    pending: Vec<AnimationEvent>,
}

impl RigEngine {
    pub fn new(data: Arc<SkeletonData>) -> Self {
        Self {
            data,
            tracks: Vec::new(),
            mixes: HashMap::new(),
            default_mix: 0.0,
            listener: None,
            pending: Vec::new(),
        }
    }

    fn name(&self, animation: usize) -> String {
        self.data.animations[animation].name.clone()
    }

    fn emit(&mut self, kind: EventKind, track: usize, animation: usize) {
        let animation = self.name(animation);
        self.pending.push(AnimationEvent { kind, track, animation });
    }

    fn flush(&mut self) {
        match self.listener.as_mut() {
            Some(listener) => {
                for event in self.pending.drain(..) {
                    listener(&event);
                }
            }
            None => self.pending.clear(),
        }
    }

    fn track_mut(&mut self, track: usize) -> &mut Track {
        if self.tracks.len() <= track {
            self.tracks.resize_with(track + 1, Track::default);
        }
        &mut self.tracks[track]
    }

    fn mix_duration(&self, from: usize, to: usize) -> f32 {
        let key = (self.name(from), self.name(to));
        self.mixes.get(&key).copied().unwrap_or(self.default_mix)
    }

    /// Replaces the current entry of `track`, crossfading from the old one.
    fn set_current(&mut self, track: usize, entry: Entry) {
        let previous = self.track_mut(track).current.take();
        if let Some(old) = self.track_mut(track).mixing.take() {
            self.emit(EventKind::End, track, old.from.animation);
            self.emit(EventKind::Dispose, track, old.from.animation);
        }

        if let Some(old) = previous {
            self.emit(EventKind::Interrupt, track, old.animation);
            let duration = self.mix_duration(old.animation, entry.animation);
            if duration > 0.0 {
                self.track_mut(track).mixing = Some(Mix { from: old, elapsed: 0.0, duration });
            } else {
                self.emit(EventKind::End, track, old.animation);
                self.emit(EventKind::Dispose, track, old.animation);
            }
        }

        self.emit(EventKind::Start, track, entry.animation);
        self.track_mut(track).current = Some(entry);
    }

    fn advance(&mut self, track: usize, dt: f32) {
        let mut events = Vec::new();
        let mut promote = false;
        {
            let data = &self.data;
            let t = &mut self.tracks[track];

            if let Some(mix) = t.mixing.as_mut() {
                mix.from.time += dt;
                mix.elapsed += dt;
                if mix.elapsed >= mix.duration {
                    events.push((EventKind::End, mix.from.animation));
                    events.push((EventKind::Dispose, mix.from.animation));
                    t.mixing = None;
                }
            }

            if let Some(cur) = t.current.as_mut() {
                cur.time += dt;
                let duration = data.animations[cur.animation].duration;
                let loops = if duration > 0.0 { (cur.time / duration) as u32 } else { 1 };
                let done = if cur.looping { loops } else { loops.min(1) };
                if done > cur.completed_loops {
                    cur.completed_loops = done;
                    events.push((EventKind::Complete, cur.animation));
                }

                if let Some(next) = t.queue.front() {
                    let start_at = if next.delay > 0.0 { next.delay } else { duration };
                    promote = cur.time >= start_at;
                }
            } else {
                promote = !t.queue.is_empty();
            }
        }

        for (kind, animation) in events {
            self.emit(kind, track, animation);
        }
        if promote {
            if let Some(next) = self.tracks[track].queue.pop_front() {
                self.set_current(track, Entry { delay: 0.0, ..next });
            }
        }
    }

    fn entry(&self, name: &str, looping: bool, delay: f32) -> Option<Entry> {
        let animation = self.data.find_animation(name)?;
        Some(Entry {
            animation,
            looping,
            time: 0.0,
            delay,
            completed_loops: 0,
        })
    }
}

impl AnimationEngine for RigEngine {
    type Skeleton = RigSkeleton;

    fn tick(&mut self, delta_seconds: f32) {
        for track in 0..self.tracks.len() {
            self.advance(track, delta_seconds);
        }
        self.flush();
    }

    fn apply(&mut self, skeleton: &mut RigSkeleton) {
        for track in &self.tracks {
            if let Some(mix) = &track.mixing {
                let anim = &self.data.animations[mix.from.animation];
                anim.apply(skeleton, mix.from.time, mix.from.looping, 1.0);
            }
            if let Some(cur) = &track.current {
                let alpha = match &track.mixing {
                    Some(mix) if mix.duration > 0.0 => (mix.elapsed / mix.duration).clamp(0.0, 1.0),
                    _ => 1.0,
                };
                let anim = &self.data.animations[cur.animation];
                anim.apply(skeleton, cur.time, cur.looping, alpha);
            }
        }
    }

    fn active_track_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_active()).count()
    }

    fn set_listener(&mut self, listener: Option<EventListener>) {
        self.listener = listener;
    }

    fn animation_names(&self) -> Vec<String> {
        self.data.animations.iter().map(|a| a.name.clone()).collect()
    }

    fn set_animation(&mut self, track: usize, name: &str, looping: bool) -> bool {
        let Some(entry) = self.entry(name, looping, 0.0) else { return false };
        let queued: Vec<usize> = self.track_mut(track).queue.drain(..).map(|e| e.animation).collect();
        for animation in queued {
            self.emit(EventKind::Dispose, track, animation);
        }
        self.set_current(track, entry);
        self.flush();
        true
    }

    fn add_animation(&mut self, track: usize, name: &str, looping: bool, delay: f32) -> bool {
        let Some(entry) = self.entry(name, looping, delay) else { return false };
        let t = self.track_mut(track);
        if t.current.is_none() && t.queue.is_empty() && delay <= 0.0 {
            self.set_current(track, entry);
        } else {
            t.queue.push_back(entry);
        }
        self.flush();
        true
    }

    fn clear_track(&mut self, track: usize) {
        let Some(t) = self.tracks.get_mut(track) else { return };
        let current = t.current.take();
        let mixing = t.mixing.take();
        let queued: Vec<usize> = t.queue.drain(..).map(|e| e.animation).collect();

        if let Some(cur) = current {
            self.emit(EventKind::End, track, cur.animation);
            self.emit(EventKind::Dispose, track, cur.animation);
        }
        if let Some(mix) = mixing {
            self.emit(EventKind::End, track, mix.from.animation);
            self.emit(EventKind::Dispose, track, mix.from.animation);
        }
        for animation in queued {
            self.emit(EventKind::Dispose, track, animation);
        }
        self.flush();
    }

    fn clear_tracks(&mut self) {
        for track in 0..self.tracks.len() {
            self.clear_track(track);
        }
        self.tracks.clear();
    }

    fn set_mix(&mut self, from: &str, to: &str, duration: f32) {
        self.mixes.insert((from.to_owned(), to.to_owned()), duration.max(0.0));
    }

    fn set_default_mix(&mut self, duration: f32) {
        self.default_mix = duration.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::rig::{Animation, BoneData, SlotData, Timeline};
    use crate::skeleton::Skeleton;

    fn data() -> Arc<SkeletonData> {
        let mut data = SkeletonData::new(
            vec![BoneData::new("root", None)],
            vec![SlotData::new("s", 0)],
        );
        data.add_animation(
            Animation::new("spin", 1.0)
                .with(Timeline::Rotate { bone: 0, keys: vec![(0.0, 0.0), (1.0, 90.0)] }),
        );
        data.add_animation(Animation::new("idle", 0.5));
        Arc::new(data)
    }

    fn recorder(engine: &mut RigEngine) -> Arc<Mutex<Vec<(EventKind, String)>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        engine.set_listener(Some(Box::new(move |e: &AnimationEvent| {
            sink.lock().unwrap().push((e.kind, e.animation.clone()));
        })));
        log
    }

    #[test]
    fn unknown_animation_is_rejected() {
        let mut engine = RigEngine::new(data());
        assert!(!engine.set_animation(0, "nope", true));
        assert!(!engine.add_animation(0, "nope", true, 0.0));
        assert_eq!(engine.active_track_count(), 0);
    }

    #[test]
    fn apply_poses_the_skeleton() {
        let data = data();
        let mut engine = RigEngine::new(Arc::clone(&data));
        let mut skeleton = RigSkeleton::new(data);
        engine.set_animation(0, "spin", false);
        engine.tick(0.5);
        engine.apply(&mut skeleton);
        skeleton.update_world_transform();
        let bone = skeleton.bone(0);
        // 45 degrees: a == c.
        assert!((bone.a - bone.c).abs() < 1e-5);
    }

    #[test]
    fn events_follow_the_track_lifecycle() {
        let mut engine = RigEngine::new(data());
        let log = recorder(&mut engine);

        engine.set_animation(0, "spin", false);
        engine.tick(1.0);
        engine.set_animation(0, "idle", true);
        engine.clear_tracks();

        let kinds: Vec<EventKind> = log.lock().unwrap().iter().map(|e| e.0).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Start,
                EventKind::Complete,
                EventKind::Interrupt,
                EventKind::End,
                EventKind::Dispose,
                EventKind::Start,
                EventKind::End,
                EventKind::Dispose,
            ]
        );
        assert_eq!(engine.active_track_count(), 0);
    }

    #[test]
    fn queued_entry_starts_after_current_duration() {
        let mut engine = RigEngine::new(data());
        let log = recorder(&mut engine);
        engine.set_animation(0, "idle", false);
        engine.add_animation(0, "spin", true, 0.0);
        engine.tick(0.25);
        assert_eq!(log.lock().unwrap().len(), 1);
        engine.tick(0.3);
        let names: Vec<String> = log.lock().unwrap().iter().map(|e| e.1.clone()).collect();
        assert_eq!(names.last().map(String::as_str), Some("spin"));
    }

    #[test]
    fn mix_keeps_previous_entry_until_faded() {
        let mut engine = RigEngine::new(data());
        engine.set_default_mix(0.2);
        engine.set_animation(0, "spin", true);
        engine.set_animation(0, "idle", true);
        assert!(engine.tracks[0].mixing.is_some());
        engine.tick(0.25);
        assert!(engine.tracks[0].mixing.is_none());
    }
}
