//====================================================================

use std::sync::atomic::{AtomicU32, Ordering};

use image::GenericImageView;

use crate::shared::SharedRenderResources;

//====================================================================

static CURRENT_TEXTURE_ID: AtomicU32 = AtomicU32::new(0);

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct TextureId(pub u32);

//====================================================================

#[derive(Debug)]
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// Nearest filtering with repeating edges.
    pub fn image_sampler() -> wgpu::SamplerDescriptor<'static> {
        wgpu::SamplerDescriptor {
            label: Some("Image Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        }
    }

    /// Create a wgpu Texture from an existing image::DynamicImage
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &image::DynamicImage,
        label: Option<&str>,
        sampler: Option<&wgpu::SamplerDescriptor>,
    ) -> Self {
        // Convert from generic dynamic image format to usable rgba8 format
        let rgba = image.to_rgba8();
        let dimensions = image.dimensions();

        let size = wgpu::Extent3d {
            width: dimensions.0,
            height: dimensions.1,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * dimensions.0),
                rows_per_image: None,
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(sampler.unwrap_or(&Self::image_sampler()));

        Self {
            texture,
            view,
            sampler,
        }
    }
}

//====================================================================

/// A texture living on the gpu together with the bind group used to attach
/// it to a texture slot.
pub struct LoadedTexture {
    id: TextureId,
    _texture: Texture,
    bind_group: wgpu::BindGroup,
}

impl LoadedTexture {
    pub fn load_texture(
        device: &wgpu::Device,
        shared: &SharedRenderResources,
        texture: Texture,
        label: Option<&str>,
    ) -> Self {
        let id = TextureId(CURRENT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed));
        let bind_group = shared.create_bind_group(device, &texture, label);
        Self {
            id,
            _texture: texture,
            bind_group,
        }
    }

    #[inline]
    pub fn id(&self) -> TextureId {
        self.id
    }

    #[inline]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

impl PartialEq for LoadedTexture {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

//====================================================================
