//====================================================================

use std::path::{Path, PathBuf};

use image::DynamicImage;
use renderer::{Renderer, TextureId};
use rustc_hash::FxHashMap;

use crate::error::EngineError;

use super::ImageHandle;

//====================================================================

const IMAGE_EXTENSION: &str = "png";

pub fn image_file(directory: &Path, name: &str) -> PathBuf {
    directory.join(format!("{}.{}", name, IMAGE_EXTENSION))
}

struct StoredImage {
    name: String,
    cpu: Option<DynamicImage>,
    gpu: Option<TextureId>,
}

/// Images by handle. Each one may have a copy in host memory, a copy on the
/// gpu, or both.
pub struct ImageStore {
    path: PathBuf,
    images: FxHashMap<ImageHandle, StoredImage>,
    next_image: u32,
}

impl ImageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            images: FxHashMap::default(),
            next_image: 0,
        }
    }

    fn image(&self, handle: ImageHandle) -> Result<&StoredImage, EngineError> {
        self.images
            .get(&handle)
            .ok_or(EngineError::UnknownImage(handle))
    }

    fn image_mut(&mut self, handle: ImageHandle) -> Result<&mut StoredImage, EngineError> {
        self.images
            .get_mut(&handle)
            .ok_or(EngineError::UnknownImage(handle))
    }

    /// Decode `<path>/<name>.png` into host memory.
    pub fn load_to_cpu(&mut self, name: &str) -> Result<ImageHandle, EngineError> {
        let path = image_file(&self.path, name);
        let image = image::open(&path).map_err(|source| EngineError::ImageLoad {
            path: path.clone(),
            source,
        })?;

        log::debug!(
            "Loaded image '{}' ({}x{}) from {:?}",
            name,
            image.width(),
            image.height(),
            path
        );

        let handle = ImageHandle(self.next_image);
        self.next_image += 1;

        self.images.insert(
            handle,
            StoredImage {
                name: name.to_string(),
                cpu: Some(image),
                gpu: None,
            },
        );

        Ok(handle)
    }

    pub fn cpu_image(&self, handle: ImageHandle) -> Result<Option<&DynamicImage>, EngineError> {
        Ok(self.image(handle)?.cpu.as_ref())
    }

    pub fn free_cpu(&mut self, handle: ImageHandle) -> Result<(), EngineError> {
        self.image_mut(handle)?.cpu = None;
        Ok(())
    }

    /// Upload the host copy, replacing any earlier gpu copy in the slots it
    /// was bound to.
    pub fn load_to_gpu(
        &mut self,
        handle: ImageHandle,
        renderer: &mut Renderer,
    ) -> Result<(), EngineError> {
        let stored = self.image_mut(handle)?;
        let image = stored
            .cpu
            .as_ref()
            .ok_or_else(|| EngineError::ImageNotOnCpu(stored.name.clone()))?;

        let texture = renderer.create_texture(image, &stored.name);

        if let Some(old) = stored.gpu.replace(texture) {
            let slots = renderer.texture_slots(old);
            renderer.release_texture(old)?;

            for slot in slots {
                renderer.bind_texture(slot, texture)?;
            }
        }

        Ok(())
    }

    pub fn bind(
        &mut self,
        handle: ImageHandle,
        slot: u32,
        renderer: &mut Renderer,
    ) -> Result<(), EngineError> {
        let stored = self.image(handle)?;
        let texture = stored
            .gpu
            .ok_or_else(|| EngineError::ImageNotOnGpu(stored.name.clone()))?;

        renderer.bind_texture(slot, texture)?;
        Ok(())
    }

    /// Empty every slot this image is still bound to. Slots another image
    /// was bound over since are kept.
    pub fn unbind(&mut self, handle: ImageHandle, renderer: &mut Renderer) -> Result<(), EngineError> {
        let stored = self.image(handle)?;

        let unbound = stored
            .gpu
            .map(|texture| renderer.unbind_texture(texture))
            .unwrap_or(0);

        if unbound == 0 {
            log::warn!("Image '{}' is not bound to a texture slot", stored.name);
        }

        Ok(())
    }

    /// Forget the image, unbinding it and freeing its gpu copy.
    pub fn release(&mut self, handle: ImageHandle, renderer: &mut Renderer) -> Result<(), EngineError> {
        let stored = self
            .images
            .remove(&handle)
            .ok_or(EngineError::UnknownImage(handle))?;

        if let Some(texture) = stored.gpu {
            renderer.release_texture(texture)?;
        }

        log::debug!("Released image '{}'", stored.name);
        Ok(())
    }
}

//====================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(directory: &Path, name: &str, width: u32, height: u32) {
        image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]))
            .save(image_file(directory, name))
            .unwrap();
    }

    #[test]
    fn test_image_file_appends_extension() {
        assert_eq!(
            image_file(Path::new("assets/images"), "COGFImage"),
            PathBuf::from("assets/images/COGFImage.png")
        );
    }

    #[test]
    fn test_load_to_cpu_decodes_png() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "red", 4, 2);

        let mut store = ImageStore::new(dir.path());
        let handle = store.load_to_cpu("red").unwrap();

        let image = store.cpu_image(handle).unwrap().unwrap();
        assert_eq!((image.width(), image.height()), (4, 2));
    }

    #[test]
    fn test_free_cpu_drops_host_copy() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "red", 1, 1);

        let mut store = ImageStore::new(dir.path());
        let handle = store.load_to_cpu("red").unwrap();
        store.free_cpu(handle).unwrap();

        assert!(store.cpu_image(handle).unwrap().is_none());
    }

    #[test]
    fn test_missing_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ImageStore::new(dir.path());

        let result = store.load_to_cpu("nothing");
        assert!(matches!(result, Err(EngineError::ImageLoad { .. })));
    }

    #[test]
    fn test_unknown_handle_is_an_error() {
        let mut store = ImageStore::new("assets/images");
        assert!(matches!(
            store.free_cpu(ImageHandle(42)),
            Err(EngineError::UnknownImage(ImageHandle(42)))
        ));
    }

    #[test]
    fn test_each_load_gets_a_new_handle() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "red", 1, 1);

        let mut store = ImageStore::new(dir.path());
        let first = store.load_to_cpu("red").unwrap();
        let second = store.load_to_cpu("red").unwrap();
        assert_ne!(first, second);
    }
}

//====================================================================
