use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::bounded;
use osteon_engine::cache::Command;
use osteon_engine::coords::Vec2;
use osteon_engine::handoff::{FrameToken, Handoff, HandoffState};

const FRAMES: u64 = 400;

/// xorshift, good enough to shuffle thread timing.
fn next(seed: &mut u64) -> u64 {
    *seed ^= *seed << 13;
    *seed ^= *seed >> 7;
    *seed ^= *seed << 17;
    *seed
}

fn jitter(seed: &mut u64) {
    for _ in 0..next(seed) % 4 {
        thread::yield_now();
    }
}

/// Frame `n` carries a point count marker followed by exactly that many points.
fn points_for(frame: u64) -> usize {
    (frame % 7 + 1) as usize
}

#[test]
fn replay_never_sees_a_partial_frame() {
    let handoff = Arc::new(Handoff::new());
    let done = Arc::new(AtomicBool::new(false));
    let replayed = Arc::new(AtomicU64::new(0));

    let worker = thread::spawn({
        let handoff = handoff.clone();
        let done = done.clone();
        move || {
            let mut seed = 0x9e37_79b9_7f4a_7c15;
            let mut published = 0;
            while published < FRAMES {
                if !handoff.wait_idle(Duration::from_millis(50)) {
                    continue;
                }
                let Ok(mut cache) = handoff.begin_compiling() else { continue };
                let n = points_for(handoff.frame() + 1);
                cache.point_size(n as f32);
                for i in 0..n {
                    jitter(&mut seed);
                    cache.draw_point(Vec2::new(i as f32, 0.0));
                }
                cache.publish().unwrap();
                published += 1;
            }
            done.store(true, Ordering::Release);
        }
    });

    let render = thread::spawn({
        let handoff = handoff.clone();
        let done = done.clone();
        let replayed = replayed.clone();
        move || {
            let mut seed = 0x2545_f491_4f6c_dd1d;
            while !done.load(Ordering::Acquire) || !handoff.mailbox().is_empty() {
                // Probe with a guessed token regardless of state; a refused probe is fine,
                // an accepted one must still see a complete frame.
                let token = handoff
                    .mailbox()
                    .recv_timeout(Duration::from_millis(1))
                    .unwrap_or(FrameToken { frame: handoff.frame() });
                jitter(&mut seed);

                let Some(cache) = handoff.try_begin_replay(token) else { continue };
                let commands = cache.commands();
                let Command::SetPointSize(n) = commands[0] else {
                    panic!("frame {} starts with {:?}", token.frame, commands[0]);
                };
                assert_eq!(n as usize, points_for(token.frame));
                assert_eq!(commands.len(), 1 + n as usize);
                replayed.fetch_add(1, Ordering::AcqRel);
            }
        }
    });

    worker.join().unwrap();
    render.join().unwrap();
    assert_eq!(replayed.load(Ordering::Acquire), FRAMES);
    assert_eq!(handoff.state(), HandoffState::Idle);
}

#[test]
fn replay_refused_while_other_thread_compiles() {
    let handoff = Arc::new(Handoff::new());
    let (compiling_tx, compiling_rx) = bounded::<()>(0);
    let (probed_tx, probed_rx) = bounded::<()>(0);

    let worker = thread::spawn({
        let handoff = handoff.clone();
        move || {
            let mut cache = handoff.begin_compiling().unwrap();
            cache.draw_point(Vec2::zero());
            compiling_tx.send(()).unwrap();
            probed_rx.recv().unwrap();
            cache.publish().unwrap()
        }
    });

    compiling_rx.recv().unwrap();
    assert_eq!(handoff.state(), HandoffState::Compiling);
    assert!(handoff.try_begin_replay(FrameToken { frame: 0 }).is_none());
    assert!(handoff.try_begin_replay(FrameToken { frame: 1 }).is_none());
    probed_tx.send(()).unwrap();

    let token = worker.join().unwrap();
    let cache = handoff.try_begin_replay(token).unwrap();
    assert_eq!(cache.commands(), &[Command::DrawPoint(Vec2::zero())]);
}

#[test]
fn teardown_wakes_a_waiting_worker() {
    let handoff = Arc::new(Handoff::new());
    handoff.begin_compiling().unwrap().publish().unwrap();

    let waiter = thread::spawn({
        let handoff = handoff.clone();
        move || handoff.wait_idle(Duration::from_secs(10))
    });

    thread::sleep(Duration::from_millis(20));
    handoff.request_destroy();
    assert!(!waiter.join().unwrap());
    assert!(handoff.begin_compiling().is_err());
    assert!(handoff.mailbox().is_empty());
    assert!(handoff.clear_when_quiescent(Duration::from_millis(10)));
}
