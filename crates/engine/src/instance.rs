//! Engine services handed to node callbacks
//!
//! `Instance` is a cheap clone handle over the asset cache, the audio output
//! and the scratch canvases. It lives on the frame loop's thread.

use std::cell::RefCell;
use std::rc::Rc;

use easel_render::{FontCache, Raster};
use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::assets::{AssetCache, AssetState, ImageHandle, MemoryFetcher};
use crate::audio::AudioOutput;

/// Options for building an `Instance`
#[derive(Clone)]
pub struct InstanceOptions {
    /// Face used by scratch canvases for text
    pub font: Option<Rc<RefCell<FontCache>>>,
    /// Open an audio device on first `play`
    pub audio: bool,
}

impl Default for InstanceOptions {
    fn default() -> Self {
        Self {
            font: None,
            audio: true,
        }
    }
}

enum AudioSlot {
    Unopened,
    Open(AudioOutput),
    Unavailable,
}

struct InstanceInner {
    assets: RefCell<AssetCache>,
    canvases: RefCell<FxHashMap<String, Rc<RefCell<Raster>>>>,
    audio: RefCell<AudioSlot>,
    font: Option<Rc<RefCell<FontCache>>>,
}

/// Shared engine services
#[derive(Clone)]
pub struct Instance {
    inner: Rc<InstanceInner>,
}

impl Instance {
    pub fn new(assets: AssetCache) -> Self {
        Self::with_options(assets, InstanceOptions::default())
    }

    pub fn with_options(assets: AssetCache, options: InstanceOptions) -> Self {
        let audio = if options.audio {
            AudioSlot::Unopened
        } else {
            AudioSlot::Unavailable
        };
        Self {
            inner: Rc::new(InstanceInner {
                assets: RefCell::new(assets),
                canvases: RefCell::new(FxHashMap::default()),
                audio: RefCell::new(audio),
                font: options.font,
            }),
        }
    }

    /// An instance with no assets, no audio and no font
    pub fn headless() -> Self {
        Self::with_options(
            AssetCache::new(MemoryFetcher::new()),
            InstanceOptions {
                font: None,
                audio: false,
            },
        )
    }

    /// A ready image, requesting it when first seen
    pub fn image(&self, src: &str) -> Option<ImageHandle> {
        self.inner.assets.borrow_mut().image(src).ready().cloned()
    }

    /// Play an audio clip at `volume` (0.0 to 1.0), fire and forget
    ///
    /// Clips that are still loading are skipped; the load keeps going so a
    /// later call can play it.
    pub fn play(&self, src: &str, volume: f32) {
        let clip = match self.inner.assets.borrow_mut().audio(src) {
            AssetState::Ready(clip) => clip.clone(),
            _ => return,
        };

        let mut slot = self.inner.audio.borrow_mut();
        if matches!(*slot, AudioSlot::Unopened) {
            *slot = match AudioOutput::open() {
                Ok(output) => AudioSlot::Open(output),
                Err(e) => {
                    warn!("Audio disabled: {}", e);
                    AudioSlot::Unavailable
                }
            };
        }
        if let AudioSlot::Open(output) = &*slot {
            if let Err(e) = output.play(&clip, volume) {
                debug!("Failed to play '{}': {}", src, e);
            }
        }
    }

    /// Scratch canvas for `key`, created empty on first use
    pub fn get_canvas(&self, key: &str) -> Rc<RefCell<Raster>> {
        self.inner
            .canvases
            .borrow_mut()
            .entry(key.to_string())
            .or_insert_with(|| {
                debug!("Allocating scratch canvas '{}'", key);
                let mut raster = Raster::new(0, 0);
                raster.set_font(self.inner.font.clone());
                Rc::new(RefCell::new(raster))
            })
            .clone()
    }

    pub fn canvas_count(&self) -> usize {
        self.inner.canvases.borrow().len()
    }

    /// Settle finished asset loads
    pub fn poll_assets(&self) -> usize {
        self.inner.assets.borrow_mut().poll()
    }

    /// Direct access to the asset cache
    pub fn with_assets<R>(&self, f: impl FnOnce(&mut AssetCache) -> R) -> R {
        f(&mut self.inner.assets.borrow_mut())
    }

    pub fn font(&self) -> Option<Rc<RefCell<FontCache>>> {
        self.inner.font.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_render::ImagePixels;

    #[test]
    fn test_get_canvas_is_cached_per_key() {
        let instance = Instance::headless();
        let a = instance.get_canvas("panel");
        let b = instance.get_canvas("panel");
        let c = instance.get_canvas("other");
        assert!(Rc::ptr_eq(&a, &b));
        assert!(!Rc::ptr_eq(&a, &c));
        assert_eq!(instance.canvas_count(), 2);
    }

    #[test]
    fn test_image_ready_after_poll() {
        let fetcher = MemoryFetcher::new().with_image("/tile.png", ImagePixels::new(2, 2, vec![0; 16]));
        let instance = Instance::with_options(
            AssetCache::new(fetcher),
            InstanceOptions {
                font: None,
                audio: false,
            },
        );
        assert!(instance.image("/tile.png").is_none());
        instance.poll_assets();
        assert_eq!(instance.image("/tile.png").map(|i| i.width), Some(2));
    }

    #[test]
    fn test_play_without_device_is_silent() {
        let fetcher = MemoryFetcher::new().with_audio("/boom.wav", vec![0u8; 4]);
        let instance = Instance::with_options(
            AssetCache::new(fetcher),
            InstanceOptions {
                font: None,
                audio: false,
            },
        );
        instance.play("/boom.wav", 0.5);
        instance.poll_assets();
        instance.play("/boom.wav", 0.5);
        instance.play("/missing.wav", 1.0);
        instance.with_assets(|assets| assert_eq!(assets.len(), 2));
    }
}
