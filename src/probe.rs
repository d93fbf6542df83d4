use std::path::Path;

use anyhow::{Result, ensure};
use tracing::debug;

use crate::finder::RenderProbe;
use crate::pool::PhotoRef;

/// Checks that a photo on disk can be read as an image.
///
/// By default only the header is parsed for dimensions; `decode` forces a
/// full decode. Remote URIs are never fetched and count as not renderable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageProbe {
    decode: bool,
}

impl ImageProbe {
    pub fn new(decode: bool) -> Self {
        Self { decode }
    }

    fn check(&self, path: &Path) -> Result<(u32, u32)> {
        let reader = image::ImageReader::open(path)?.with_guessed_format()?;
        let (width, height) = if self.decode {
            let img = reader.decode()?;
            (img.width(), img.height())
        } else {
            reader.into_dimensions()?
        };
        ensure!(width > 0 && height > 0, "image has no pixels");
        Ok((width, height))
    }
}

impl RenderProbe for ImageProbe {
    fn try_render(&mut self, photo: &PhotoRef) -> bool {
        if photo.is_remote() {
            debug!(photo = %photo, "remote photos are not fetched");
            return false;
        }
        match self.check(photo.as_path()) {
            Ok((width, height)) => {
                debug!(photo = %photo, width, height, "photo renders");
                true
            }
            Err(err) => {
                debug!(photo = %photo, "photo does not render: {err:#}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_real_images_and_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        image::RgbaImage::new(3, 2).save(&good).unwrap();
        let bad = dir.path().join("bad.jpg");
        std::fs::write(&bad, b"definitely not a jpeg").unwrap();

        for decode in [false, true] {
            let mut probe = ImageProbe::new(decode);
            assert!(probe.try_render(&PhotoRef::from(good.clone())));
            assert!(!probe.try_render(&PhotoRef::from(bad.clone())));
            assert!(!probe.try_render(&PhotoRef::from(dir.path().join("missing.png"))));
        }
    }

    #[test]
    fn remote_photos_are_not_renderable() {
        let mut probe = ImageProbe::default();
        assert!(!probe.try_render(&PhotoRef::new("https://example.com/a.jpg")));
    }
}
