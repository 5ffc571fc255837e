use crate::document::{Document, MagFilter, Sampler, WrappingMode};
use crate::host::{SceneHost, TextureExtension, TextureInterpolation, TextureNodeSettings};

/// Texture node settings for a sampler.
///
/// Filtering is `Closest` only when both filters are nearest-neighbour;
/// clamping on either axis selects `Extend`. No sampler means defaults.
#[must_use]
pub fn texture_settings(sampler: Option<&Sampler>, label: Option<&str>) -> TextureNodeSettings {
    let mut settings = TextureNodeSettings {
        label: label.map(str::to_string),
        ..TextureNodeSettings::default()
    };
    let Some(sampler) = sampler else {
        return settings;
    };

    let min_nearest = sampler.min_filter.is_some_and(|f| f.is_nearest());
    if min_nearest && sampler.mag_filter == Some(MagFilter::Nearest) {
        settings.interpolation = TextureInterpolation::Closest;
    }

    if sampler.wrap_s == WrappingMode::ClampToEdge || sampler.wrap_t == WrappingMode::ClampToEdge {
        settings.extension = TextureExtension::Extend;
    }

    settings
}

/// Creates an image texture node for `document.textures[texture]` inside
/// `material` and configures it from the texture's sampler.
///
/// Returns `None` only when the texture index is out of range.
pub fn wire_texture<H: SceneHost>(
    host: &mut H,
    document: &Document,
    texture: usize,
    material: H::Material,
    label: Option<&str>,
) -> Option<H::TextureNode> {
    let Some(tex) = document.textures.get(texture) else {
        log::warn!("Texture {texture} does not exist");
        return None;
    };

    let image = document.image_name(tex.source);
    let node = host.create_image_texture_node(material, &image);

    let sampler = tex.sampler.and_then(|s| document.samplers.get(s));
    if sampler.is_none() {
        log::debug!("Texture {texture} has no sampler; using default settings");
    }
    host.configure_texture_node(node, &texture_settings(sampler, label));

    Some(node)
}
