use std::sync::Arc;

use campfire_ngin::{
    data_structures::scene_graph::{Node, SceneGraph},
    effects::{OutlineOptions, apply_outline},
    materials::MaterialBank,
    resources::LoadedAsset,
    settings::Settings,
};

use crate::common::test_utils::{asset_with_meshes, campfire_context, mesh, named};

mod common;

#[test]
fn three_meshes_become_six() {
    let mut ctx = campfire_context();
    let before = ctx.scene.count_meshes();

    let pairs = ctx
        .attach_outlined_asset(
            asset_with_meshes("stump", &["Stump", "Top", "Handle"]),
            &Settings::default(),
        )
        .expect("toon materials exist");

    assert_eq!(pairs.len(), 3);
    assert_eq!(ctx.scene.count_meshes(), before + 6);
    for pair in &pairs {
        let source = ctx.scene.node(pair.source).unwrap();
        let outline = ctx.scene.node(pair.outline).unwrap();
        assert_eq!(source.parent(), outline.parent());
        assert!(Arc::ptr_eq(
            source.geometry().unwrap(),
            outline.geometry().unwrap()
        ));
        assert_eq!(source.local, outline.local);
        assert_eq!(source.material(), ctx.effects.toon_fill);
        assert_eq!(outline.material(), ctx.effects.outline);
        assert_eq!(outline.name, format!("{}.outline", source.name));
    }
}

#[test]
fn outline_scale_multiplier_grows_the_copy() {
    let mut ctx = campfire_context();
    let asset = asset_with_meshes("rock", &["Rock"]);
    let holder = ctx.attach_asset(asset, 0.0);
    let fill = ctx.effects.toon_fill.unwrap();
    let edge = ctx.effects.outline.unwrap();

    let pairs = apply_outline(
        &mut ctx.scene,
        holder,
        fill,
        edge,
        &OutlineOptions {
            scale_multiplier: 1.05,
        },
    );

    let source = ctx.scene.node(pairs[0].source).unwrap();
    let outline = ctx.scene.node(pairs[0].outline).unwrap();
    assert_eq!(outline.local.position, source.local.position);
    assert_eq!(outline.local.rotation, source.local.rotation);
    assert_eq!(outline.local.scale, source.local.scale * 1.05);
}

#[test]
fn subtree_without_meshes_is_untouched() {
    let mut ctx = campfire_context();
    let holder = ctx.attach_asset(asset_with_meshes("empty", &[]), 0.0);
    let len = ctx.scene.len();
    let mut bank = MaterialBank::new();
    let fill = bank.toon_fill([1.0, 1.0, 1.0], [0.5, 0.5, 0.5]).unwrap();
    let edge = bank.outline([1.0, 1.0, 1.0], [0.0, 0.0, 0.0], 0.015).unwrap();

    let pairs = apply_outline(&mut ctx.scene, holder, fill, edge, &OutlineOptions::default());

    assert!(pairs.is_empty());
    assert_eq!(ctx.scene.len(), len);
}

#[test]
fn outlines_are_not_outlined_again() {
    let mut ctx = campfire_context();
    ctx.attach_outlined_asset(asset_with_meshes("stump", &["Stump"]), &Settings::default())
        .unwrap();
    let root = ctx.root();
    assert_eq!(named(&ctx.scene, root, "Stump").len(), 1);
    assert_eq!(named(&ctx.scene, root, "Stump.outline").len(), 1);
    assert!(named(&ctx.scene, root, "Stump.outline.outline").is_empty());
}

#[test]
fn nested_meshes_get_outlines_next_to_themselves() {
    let mut ctx = campfire_context();
    let mut scene = SceneGraph::new();
    let stump = scene.add_root(Node::group("stump"));
    let trunk = scene.add_child(stump, mesh("Trunk"));
    let branch = scene.add_child(trunk, mesh("Branch"));
    scene.add_child(branch, mesh("Twig"));
    let roots = scene.add_child(stump, Node::group("Roots"));
    scene.add_child(roots, mesh("Root"));
    let asset = LoadedAsset {
        name: "stump".to_string(),
        scene,
        clips: Vec::new(),
    };
    let before = ctx.scene.count_meshes();

    let pairs = ctx
        .attach_outlined_asset(asset, &Settings::default())
        .expect("toon materials exist");

    assert_eq!(pairs.len(), 4);
    assert_eq!(ctx.scene.count_meshes(), before + 8);
    for pair in &pairs {
        let source = ctx.scene.node(pair.source).unwrap();
        let outline = ctx.scene.node(pair.outline).unwrap();
        assert_eq!(source.parent(), outline.parent());
        assert!(outline.children().is_empty());
        assert_eq!(source.material(), ctx.effects.toon_fill);
    }
    let root = ctx.root();
    for name in ["Trunk", "Branch", "Twig", "Root"] {
        assert_eq!(named(&ctx.scene, root, &format!("{}.outline", name)).len(), 1);
    }
}
