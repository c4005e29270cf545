mod common;

use std::sync::Arc;

use osteon_engine::batch::BatchCompiler;
use osteon_engine::cache::{Command, CommandCache, DebugOverlay, ShaderKind};
use osteon_engine::clip::Clipper;
use osteon_engine::paint::{BlendFunc, BlendMode, Color};
use osteon_engine::rig::reference::{self, ATLAS_PAGE, SLOT_ARM, SLOT_BODY, SLOT_GLOW};
use osteon_engine::rig::{RigEngine, RigResolver, RigSkeleton};
use osteon_engine::skeleton::{AnimationEngine, Skeleton};

use common::{PAGE, SLOT_MESH, SLOT_REGION};

fn blend_count(cache: &CommandCache) -> usize {
    cache
        .commands()
        .iter()
        .filter(|c| matches!(c, Command::SetBlendFunc(_)))
        .count()
}

#[test]
fn region_and_fully_masked_mesh_make_two_batches() {
    let skeleton = common::skeleton(common::masked_rig());
    let textures = common::textures(&[PAGE]);
    let mut compiler = BatchCompiler::new();
    let mut clipper = Clipper::new();

    let batches = compiler.compile(&skeleton, &RigResolver, &textures, &mut clipper);

    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].slot, SLOT_REGION);
    assert_eq!(batches[0].vertices.len(), 4);
    assert_eq!(batches[0].indices, vec![0, 1, 2, 2, 3, 0]);

    assert_eq!(batches[1].slot, SLOT_MESH);
    assert!(batches[1].vertices.len() <= common::quad_mesh().vertices.len() / 2);
    assert_eq!(batches[1].indices.len(), 6);
    assert!(!clipper.is_clipping());
}

#[test]
fn fully_masked_mesh_is_untouched() {
    let skeleton = common::skeleton(common::masked_rig());
    let textures = common::textures(&[PAGE]);
    let mut clipper = Clipper::new();

    let clipped = BatchCompiler::new()
        .compile(&skeleton, &RigResolver, &textures, &mut clipper)[1]
        .clone();

    let mut unclipped_rig = common::masked_rig();
    unclipped_rig.slots[common::SLOT_MASK].attachment = None;
    let skeleton = common::skeleton(unclipped_rig);
    let plain = BatchCompiler::new()
        .compile(&skeleton, &RigResolver, &textures, &mut clipper)[1]
        .clone();

    assert_eq!(clipped, plain);
}

#[test]
fn one_blend_command_between_each_pair_of_batches() {
    let data = Arc::new(reference::reference_rig());
    let mut skeleton = RigSkeleton::new(data.clone());
    let mut engine = RigEngine::new(data);
    let textures = common::textures(&[ATLAS_PAGE]);
    let mut compiler = BatchCompiler::new();
    let mut clipper = Clipper::new();
    let mut cache = CommandCache::new();

    assert!(engine.set_animation(0, "wave", true));
    assert!(engine.set_animation(1, "pulse", true));

    for _ in 0..12 {
        engine.tick(0.07);
        engine.apply(&mut skeleton);
        skeleton.update_world_transform();

        let batches = compiler.compile(&skeleton, &RigResolver, &textures, &mut clipper);
        let real = batches.iter().filter(|b| !b.is_empty()).count();
        assert!(real >= 2);

        cache.clear();
        cache.record_batches(batches);
        assert_eq!(blend_count(&cache), real - 1);
    }
}

#[test]
fn draw_order_is_preserved_and_skipped_slots_vanish() {
    let mut skeleton = RigSkeleton::new(Arc::new(reference::reference_rig()));
    let textures = common::textures(&[ATLAS_PAGE]);
    let mut compiler = BatchCompiler::new();
    let mut clipper = Clipper::new();

    skeleton.set_draw_order(vec![SLOT_GLOW, 4, SLOT_ARM, 1, SLOT_BODY]);
    let slots: Vec<usize> = compiler
        .compile(&skeleton, &RigResolver, &textures, &mut clipper)
        .iter()
        .map(|b| b.slot)
        .collect();
    // The mask comes after the arm in this order, so the arm draws unclipped.
    assert_eq!(slots, vec![SLOT_GLOW, SLOT_ARM, SLOT_BODY]);

    skeleton.set_slot_color(SLOT_ARM, Color::new(1.0, 1.0, 1.0, 0.0));
    let batches = compiler.compile(&skeleton, &RigResolver, &textures, &mut clipper);
    let slots: Vec<usize> = batches.iter().map(|b| b.slot).collect();
    assert_eq!(slots, vec![SLOT_GLOW, SLOT_BODY]);
    assert_eq!(batches[0].blend_mode, BlendMode::Additive);
}

#[test]
fn transparent_skeleton_records_nothing() {
    let mut skeleton = RigSkeleton::new(Arc::new(reference::reference_rig()));
    skeleton.set_color(Color::new(1.0, 1.0, 1.0, 0.0));
    let textures = common::textures(&[ATLAS_PAGE]);
    let mut clipper = Clipper::new();
    let mut cache = CommandCache::new();

    let mut compiler = BatchCompiler::new();
    let batches = compiler.compile(&skeleton, &RigResolver, &textures, &mut clipper);
    assert!(batches.is_empty());

    cache.record_batches(batches);
    assert!(cache.is_empty());
    assert!(cache.vertices().is_empty());
}

#[test]
fn unregistered_page_skips_every_textured_slot() {
    let skeleton = RigSkeleton::new(Arc::new(reference::reference_rig()));
    let textures = common::textures(&["somewhere/else.png"]);
    let mut clipper = Clipper::new();

    let mut compiler = BatchCompiler::new();
    let batches = compiler.compile(&skeleton, &RigResolver, &textures, &mut clipper);
    assert!(batches.is_empty());
    assert!(!clipper.is_clipping());
}

#[test]
fn region_and_mesh_vertex_counts() {
    let mut data = common::masked_rig();
    data.slots[common::SLOT_MASK].attachment = None;
    let skeleton = common::skeleton(data);
    let textures = common::textures(&[PAGE]);
    let mut clipper = Clipper::new();

    let mut compiler = BatchCompiler::new();
    let batches = compiler.compile(&skeleton, &RigResolver, &textures, &mut clipper);
    let mesh = common::quad_mesh();

    assert_eq!(batches[0].vertices.len(), 4);
    assert_eq!(batches[0].indices.len(), 6);
    assert_eq!(batches[1].vertices.len(), mesh.vertices.len() / 2);
    assert_eq!(batches[1].indices, mesh.triangles);
}

#[test]
fn debug_overlay_draws_after_textured_batches() {
    let skeleton = RigSkeleton::new(Arc::new(reference::reference_rig()));
    let textures = common::textures(&[ATLAS_PAGE]);
    let mut clipper = Clipper::new();
    let mut cache = CommandCache::new();

    let mut compiler = BatchCompiler::new();
    let batches = compiler.compile(&skeleton, &RigResolver, &textures, &mut clipper);
    cache.record_batches(batches);
    let textured_len = cache.len();
    cache.record_debug(&skeleton, &RigResolver, DebugOverlay { bones: true, slots: true });

    let overlay = &cache.commands()[textured_len..];
    assert!(matches!(overlay[0], Command::BindShader { kind: ShaderKind::Flat, .. }));
    assert_eq!(overlay[1], Command::SetBlendFunc(BlendFunc::DISABLED));
    assert_eq!(overlay[2], Command::SetUniformColor(Color::from_rgba_u8(0, 100, 0, 255)));
    assert_eq!(overlay[3], Command::SetLineWidth(1.0));

    // Body and glow are the only regions.
    let outlines = overlay
        .iter()
        .filter(|c| matches!(c, Command::DrawPolygonOutline { .. }))
        .count();
    assert_eq!(outlines, 2);

    let points = overlay.iter().filter(|c| matches!(c, Command::DrawPoint(_))).count();
    assert_eq!(points, skeleton.bone_count());
    assert!(overlay.contains(&Command::SetPointSize(4.0)));
    assert!(overlay.contains(&Command::SetUniformColor(Color::from_rgba_u8(0, 255, 0, 255))));
}
