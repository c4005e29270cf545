mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use osteon_engine::player::{PlayerConfig, Scene, SkeletonPlayer};
use osteon_engine::rig::reference::{self, ATLAS_PAGE};
use osteon_engine::rig::{RigEngine, RigResolver, RigSkeleton};

type Player = SkeletonPlayer<RigEngine, RigResolver>;

fn spawn() -> Player {
    let player = Player::spawn(PlayerConfig { fps: 200, ..PlayerConfig::default() }).unwrap();
    let data = Arc::new(reference::reference_rig());
    let scene = Scene::new(
        RigSkeleton::new(data.clone()),
        RigEngine::new(data),
        RigResolver,
        common::textures(&[ATLAS_PAGE]),
    );
    player.load(scene).unwrap();
    player
}

/// Plays the render thread for `window`, replaying whatever gets published.
fn render_for(player: &Player, window: Duration) {
    let deadline = Instant::now() + window;
    while Instant::now() < deadline {
        if let Some(token) = player.recv_frame_timeout(Duration::from_millis(5)) {
            drop(player.handoff().try_begin_replay(token));
        }
    }
}

#[test]
fn hidden_player_stops_after_tracks_clear() {
    let player = spawn();
    player.set_animation(0, "wave", true).unwrap();
    render_for(&player, Duration::from_millis(100));
    assert!(player.frames_produced() > 0);

    player.set_visible(false);
    player.clear_tracks().unwrap();
    let before = player.frames_produced();
    render_for(&player, Duration::from_millis(200));

    assert!(player.frames_produced() - before <= 1);
}

#[test]
fn visible_player_fades_out_then_idles() {
    let player = spawn();
    player.set_animation(0, "wave", true).unwrap();
    render_for(&player, Duration::from_millis(80));

    player.clear_tracks().unwrap();
    render_for(&player, Duration::from_millis(100));
    let settled = player.frames_produced();
    render_for(&player, Duration::from_millis(150));
    assert_eq!(player.frames_produced(), settled);

    player.set_animation(0, "pulse", true).unwrap();
    render_for(&player, Duration::from_millis(100));
    assert!(player.frames_produced() > settled);
}

#[test]
fn config_changes_reach_the_worker() {
    let player = spawn();
    player.set_animation(0, "wave", true).unwrap();
    render_for(&player, Duration::from_millis(60));
    let unscaled = player.last_bounds();

    player.set_skeleton_scale(2.0);
    render_for(&player, Duration::from_millis(100));
    let scaled = player.last_bounds();

    assert!(scaled.width() > unscaled.width() * 1.5);
    assert_eq!(player.config().skeleton_scale, 2.0);
}
