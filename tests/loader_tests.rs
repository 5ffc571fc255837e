//! glTF loader tests

#![cfg(feature = "gltf")]

use glam::Vec3;

use rigport::document::{MagFilter, MinFilter, WrappingMode};
use rigport::errors::ImportIssue;
use rigport::host::MemoryHost;
use rigport::loaders::from_gltf;
use rigport::rig::RigImporter;
use rigport::settings::ImportSettings;

const RIG_JSON: &str = r#"{
    "asset": { "version": "2.0" },
    "nodes": [
        { "name": "hips", "children": [1] },
        { "name": "spine", "translation": [0.0, 1.0, 0.0] },
        { "name": "prop" }
    ],
    "skins": [ { "name": "Rig", "joints": [1, 0] } ],
    "images": [ { "name": "albedo", "uri": "albedo.png" } ],
    "samplers": [ { "magFilter": 9728, "minFilter": 9984, "wrapS": 33071 } ],
    "textures": [ { "source": 0, "sampler": 0 } ]
}"#;

fn load_rig() -> anyhow::Result<rigport::Document> {
    let gltf = gltf::Gltf::from_slice(RIG_JSON.as_bytes())?;
    Ok(from_gltf(&gltf.document, &[])?)
}

#[test]
fn loads_hierarchy_and_skin() -> anyhow::Result<()> {
    let doc = load_rig()?;

    assert_eq!(doc.nodes.len(), 3);
    assert_eq!(doc.nodes[1].parent(), Some(0));
    assert_eq!(doc.nodes[0].children(), &[1]);
    assert_eq!(doc.nodes[2].parent(), None);
    assert_eq!(doc.nodes[1].transform.translation, Vec3::new(0.0, 1.0, 0.0));

    let skin = &doc.skins[0];
    assert_eq!(skin.joints, vec![1, 0]);
    assert!(skin.inverse_bind_matrices.is_empty());
    assert_eq!(skin.armature_name(), "Rig");
    assert!(doc.nodes[0].is_joint && doc.nodes[1].is_joint && !doc.nodes[2].is_joint);
    Ok(())
}

#[test]
fn loads_sampler_state() -> anyhow::Result<()> {
    let doc = load_rig()?;

    let sampler = &doc.samplers[0];
    assert_eq!(sampler.mag_filter, Some(MagFilter::Nearest));
    assert_eq!(sampler.min_filter, Some(MinFilter::NearestMipmapNearest));
    assert_eq!(sampler.wrap_s, WrappingMode::ClampToEdge);
    assert_eq!(sampler.wrap_t, WrappingMode::Repeat);
    assert_eq!(doc.image_name(doc.textures[0].source), "albedo");
    Ok(())
}

#[test]
fn skin_without_inverse_bind_matrices_still_imports() -> anyhow::Result<()> {
    let mut doc = load_rig()?;
    let mut host = MemoryHost::new();
    let report = RigImporter::new(&mut host, ImportSettings::default()).import(&mut doc)?;

    assert_eq!(report.bones, 2);
    assert!(report
        .issues
        .contains(&ImportIssue::MissingBindData { skin: 0, node: 0 }));
    assert!(report
        .issues
        .contains(&ImportIssue::MissingBindData { skin: 0, node: 1 }));
    Ok(())
}
