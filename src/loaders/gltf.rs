//! glTF 2.0 loader
//!
//! Reads the parts of a glTF asset that rig import consumes: node hierarchy
//! and local transforms, skins with their inverse-bind matrices, animation
//! channels, skinning attributes of mesh primitives, and texture metadata.
//! Values stay in glTF axis space; conversion happens during import.

use std::path::Path;

use glam::{Mat4, Quat, Vec3};

use crate::document::{
    Animation, Channel, ChannelData, Document, Image, Interpolation, KeyframeTrack, MagFilter,
    Mesh, MinFilter, Primitive, Sampler, Skin, Texture, WrappingMode,
};
use crate::errors::Result;
use crate::math::Trs;

/// Imports a `.gltf` / `.glb` file with its buffers and converts it.
pub fn load(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let (gltf, buffers, _images) = ::gltf::import(path)?;
    let buffers: Vec<Vec<u8>> = buffers.into_iter().map(|b| b.0).collect();

    log::info!("Loaded glTF {} ({} buffers)", path.display(), buffers.len());
    from_gltf(&gltf, &buffers)
}

/// Converts a parsed glTF document. `buffers` are indexed by buffer index.
pub fn from_gltf(gltf: &::gltf::Document, buffers: &[Vec<u8>]) -> Result<Document> {
    let mut document = Document::new();

    load_nodes(&mut document, gltf);
    load_meshes(&mut document, gltf, buffers);
    load_skins(&mut document, gltf, buffers);
    load_animations(&mut document, gltf, buffers);
    load_textures(&mut document, gltf);

    log::debug!(
        "glTF document: {} nodes, {} skins, {} meshes, {} animations, {} textures",
        document.nodes.len(),
        document.skins.len(),
        document.meshes.len(),
        document.animations.len(),
        document.textures.len()
    );

    document.validate()?;
    Ok(document)
}

fn load_nodes(document: &mut Document, gltf: &::gltf::Document) {
    for node in gltf.nodes() {
        let (translation, rotation, scale) = node.transform().decomposed();
        document.add_node(node.name(), Trs::from_arrays(translation, rotation, scale));
    }

    // glTF only stores child lists.
    for node in gltf.nodes() {
        for child in node.children() {
            document.attach(child.index(), node.index());
        }
    }
}

fn load_meshes(document: &mut Document, gltf: &::gltf::Document, buffers: &[Vec<u8>]) {
    for mesh in gltf.meshes() {
        let primitives = mesh
            .primitives()
            .map(|primitive| {
                let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
                let vertex_count = primitive
                    .get(&::gltf::Semantic::Positions)
                    .map_or(0, |accessor| accessor.count());

                let mut out = Primitive::new(vertex_count);
                out.joints = reader.read_joints(0).map(|r| r.into_u16().collect());
                out.weights = reader.read_weights(0).map(|r| r.into_f32().collect());
                out
            })
            .collect();

        let mut out = Mesh::new(primitives);
        out.name = mesh.name().map(str::to_string);
        document.add_mesh(out, None);
    }

    for node in gltf.nodes() {
        if let Some(mesh) = node.mesh() {
            document.nodes[node.index()].mesh = Some(mesh.index());
        }
    }
}

fn load_skins(document: &mut Document, gltf: &::gltf::Document, buffers: &[Vec<u8>]) {
    for skin in gltf.skins() {
        let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
        let inverse_bind_matrices: Vec<Mat4> = reader
            .read_inverse_bind_matrices()
            .map(|iter| iter.map(|m| Mat4::from_cols_array_2d(&m)).collect())
            .unwrap_or_default();

        let joints: Vec<usize> = skin.joints().map(|node| node.index()).collect();
        if inverse_bind_matrices.len() < joints.len() {
            log::debug!(
                "Skin {}: {} inverse bind matrices for {} joints",
                skin.index(),
                inverse_bind_matrices.len(),
                joints.len()
            );
        }

        let mut out = Skin::new(skin.index(), joints, inverse_bind_matrices);
        out.name = skin.name().map(str::to_string);
        out.skeleton = skin.skeleton().map(|node| node.index());
        out.meshes = gltf
            .nodes()
            .filter(|node| node.skin().is_some_and(|s| s.index() == skin.index()))
            .map(|node| node.index())
            .collect();

        document.add_skin(out);
    }
}

fn load_animations(document: &mut Document, gltf: &::gltf::Document, buffers: &[Vec<u8>]) {
    use ::gltf::animation::Property;
    use ::gltf::animation::util::ReadOutputs;

    for anim in gltf.animations() {
        let mut channels = Vec::new();

        for channel in anim.channels() {
            let node = channel.target().node().index();
            if channel.target().property() == Property::MorphTargetWeights {
                log::debug!("Animation {}: skipping morph weights on node {node}", anim.index());
                continue;
            }

            let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
            let (Some(inputs), Some(outputs)) = (reader.read_inputs(), reader.read_outputs()) else {
                log::warn!("Animation {}: channel on node {node} has no data", anim.index());
                continue;
            };
            let times: Vec<f32> = inputs.collect();

            let interpolation = match channel.sampler().interpolation() {
                ::gltf::animation::Interpolation::Linear => Interpolation::Linear,
                ::gltf::animation::Interpolation::Step => Interpolation::Step,
                ::gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
            };

            let data = match outputs {
                ReadOutputs::Translations(iter) => ChannelData::Translation(KeyframeTrack::new(
                    times,
                    iter.map(Vec3::from_array).collect(),
                    interpolation,
                )),
                ReadOutputs::Rotations(iter) => ChannelData::Rotation(KeyframeTrack::new(
                    times,
                    iter.into_f32().map(Quat::from_array).collect(),
                    interpolation,
                )),
                ReadOutputs::Scales(iter) => ChannelData::Scale(KeyframeTrack::new(
                    times,
                    iter.map(Vec3::from_array).collect(),
                    interpolation,
                )),
                ReadOutputs::MorphTargetWeights(_) => continue,
            };

            channels.push(Channel::new(node, data));
        }

        document.add_animation(Animation::new(
            anim.index(),
            anim.name().map(str::to_string),
            channels,
        ));
    }
}

fn load_textures(document: &mut Document, gltf: &::gltf::Document) {
    for image in gltf.images() {
        let uri = match image.source() {
            ::gltf::image::Source::Uri { uri, .. } => Some(uri.to_string()),
            ::gltf::image::Source::View { .. } => None,
        };
        document.images.push(Image {
            name: image.name().map(str::to_string),
            uri,
        });
    }

    for sampler in gltf.samplers() {
        document.samplers.push(Sampler {
            mag_filter: sampler.mag_filter().and_then(|f| MagFilter::from_gl(f.as_gl_enum())),
            min_filter: sampler.min_filter().and_then(|f| MinFilter::from_gl(f.as_gl_enum())),
            wrap_s: WrappingMode::from_gl(sampler.wrap_s().as_gl_enum()).unwrap_or_default(),
            wrap_t: WrappingMode::from_gl(sampler.wrap_t().as_gl_enum()).unwrap_or_default(),
        });
    }

    for texture in gltf.textures() {
        document.textures.push(Texture {
            source: texture.source().index(),
            sampler: texture.sampler().index(),
        });
    }
}
