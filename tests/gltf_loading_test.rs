use campfire_ngin::{
    camera::FixedControls,
    effects::FrameUpdater,
    error::EffectError,
    resources::{AssetLoader, GltfLoader, LoadedAsset, decode_glb},
    settings::Settings,
};

use crate::common::test_utils::{
    CountingScheduler, ManualClock, RecordingGraphics, campfire_context, named,
};

mod common;

fn forest() -> LoadedAsset {
    let bytes = std::fs::read(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/forest.glb"))
        .expect("forest fixture");
    decode_glb("forest.glb", &bytes).expect("valid glb")
}

#[test]
fn forest_carries_both_fire_targets() {
    let asset = forest();
    let root = asset.scene.roots()[0];
    assert_eq!(asset.scene.node(root).unwrap().name, "Campfire");
    for name in ["FireA", "FireB"] {
        let id = asset.scene.find_child(root, name).unwrap();
        assert!(asset.scene.node(id).unwrap().is_mesh());
    }
    assert_eq!(asset.clips.len(), 1);
    assert_eq!(asset.clips[0].name, "Sway");
    assert_eq!(asset.clips[0].duration(), 4.0);
}

#[test]
fn shared_glb_meshes_share_geometry() {
    let asset = forest();
    let root = asset.scene.roots()[0];
    let a = asset.scene.find_child(root, "FireA").unwrap();
    let b = asset.scene.find_child(root, "FireB").unwrap();
    assert!(std::sync::Arc::ptr_eq(
        asset.scene.node(a).unwrap().geometry().unwrap(),
        asset.scene.node(b).unwrap().geometry().unwrap(),
    ));
}

#[test]
fn loaded_forest_burns_and_sways() {
    let mut ctx = campfire_context();
    ctx.attach_scene_asset(forest(), &Settings::default())
        .expect("fire targets exist");
    assert_eq!(ctx.mixers.len(), 1);

    let root = ctx.root();
    let tree = named(&ctx.scene, root, "Tree0")[0];
    let at_rest = ctx.scene.node(tree).unwrap().local.rotation;

    let clock = ManualClock::new();
    let mut updater = FrameUpdater::new(clock.clone());
    let mut graphics = RecordingGraphics::new();
    let mut scheduler = CountingScheduler::default();
    clock.set(1.0);
    updater.tick(&mut ctx, &mut FixedControls, &mut graphics, &mut scheduler);

    assert_ne!(ctx.scene.node(tree).unwrap().local.rotation, at_rest);
    // every mesh of the forest has a material, plus the fireflies
    assert_eq!(graphics.last_draws, ctx.scene.count_meshes() + 1);
}

#[test]
fn garbage_is_an_error_not_a_panic() {
    assert!(decode_glb("noise.glb", b"definitely not a glb").is_err());
}

#[tokio::test]
async fn loader_reads_from_the_asset_directory() {
    let asset = GltfLoader.load("stump.glb").await.expect("stump loads");
    assert_eq!(asset.scene.count_meshes(), 3);

    let missing = GltfLoader.load("does-not-exist.glb").await;
    assert!(matches!(missing, Err(EffectError::AssetDecode(_))));
}
