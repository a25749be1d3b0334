//! Asset cache
//!
//! Images and audio clips keyed by source string. Entries are created on
//! first reference, start out `Loading`, and settle once the fetcher replies.
//! Nothing is ever evicted.

use std::sync::Arc;

use easel_net::{AssetLoader, NetError};
use easel_render::ImagePixels;
use image::GenericImageView;
use log::{debug, warn};
use rustc_hash::FxHashMap;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::error::AssetError;

/// Decoded image shared by every node that references it
pub type ImageHandle = Arc<ImagePixels>;

/// Encoded audio bytes, decoded per playback
pub type AudioClip = Arc<[u8]>;

/// Kind of asset being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Image,
    Audio,
}

/// Cache entry state
#[derive(Debug, Clone)]
pub enum AssetState<T> {
    Loading,
    Ready(T),
    Failed(AssetError),
}

impl<T> AssetState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            AssetState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AssetState::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, AssetState::Failed(_))
    }
}

/// A loaded asset
#[derive(Debug, Clone)]
pub enum AssetPayload {
    Image(ImageHandle),
    Audio(AudioClip),
}

/// A load request handed to a fetcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub src: String,
    pub kind: AssetKind,
}

/// A completed load
#[derive(Debug)]
pub struct AssetReply {
    pub src: String,
    pub kind: AssetKind,
    pub result: Result<AssetPayload, AssetError>,
}

/// Loads assets in the background
///
/// `request` must not block; results are collected by `completed`, which the
/// cache calls once per frame.
pub trait AssetFetcher {
    fn request(&mut self, request: AssetRequest);

    fn completed(&mut self) -> Vec<AssetReply>;
}

/// Decode image bytes to RGBA pixels
pub fn decode_image(bytes: &[u8]) -> Result<ImagePixels, AssetError> {
    let img = image::load_from_memory(bytes).map_err(|e| AssetError::Decode(e.to_string()))?;
    let (width, height) = img.dimensions();
    let data = img.to_rgba8().into_raw();
    debug!("Decoded image: {}x{}", width, height);
    Ok(ImagePixels::new(width, height, data))
}

fn fetch_error(error: NetError) -> AssetError {
    match error {
        NetError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => AssetError::NotFound(e.to_string()),
        other => AssetError::Fetch(other.to_string()),
    }
}

/// Fetches through `easel-net` on a tokio runtime
///
/// Images are decoded on the blocking pool so decoding never stalls the
/// frame loop.
pub struct TokioFetcher {
    loader: AssetLoader,
    runtime: Handle,
    sender: UnboundedSender<AssetReply>,
    receiver: UnboundedReceiver<AssetReply>,
}

impl TokioFetcher {
    pub fn new(loader: AssetLoader, runtime: Handle) -> Self {
        let (sender, receiver) = unbounded_channel();
        Self {
            loader,
            runtime,
            sender,
            receiver,
        }
    }

    async fn load(loader: AssetLoader, src: String, kind: AssetKind) -> Result<AssetPayload, AssetError> {
        let bytes = loader.fetch(&src).await.map_err(fetch_error)?;
        match kind {
            AssetKind::Image => {
                let image = tokio::task::spawn_blocking(move || decode_image(&bytes))
                    .await
                    .map_err(|_| AssetError::Cancelled)??;
                Ok(AssetPayload::Image(Arc::new(image)))
            }
            AssetKind::Audio => Ok(AssetPayload::Audio(Arc::from(bytes))),
        }
    }
}

impl AssetFetcher for TokioFetcher {
    fn request(&mut self, request: AssetRequest) {
        let loader = self.loader.clone();
        let sender = self.sender.clone();
        self.runtime.spawn(async move {
            let AssetRequest { src, kind } = request;
            let result = Self::load(loader, src.clone(), kind).await;
            // The receiver only goes away with the cache itself.
            let _ = sender.send(AssetReply { src, kind, result });
        });
    }

    fn completed(&mut self) -> Vec<AssetReply> {
        let mut replies = Vec::new();
        while let Ok(reply) = self.receiver.try_recv() {
            replies.push(reply);
        }
        replies
    }
}

/// Serves preloaded in-memory assets
///
/// Replies arrive on the next `completed` call, like a real fetcher. Unknown
/// sources fail with `NotFound`.
#[derive(Default)]
pub struct MemoryFetcher {
    assets: FxHashMap<String, AssetPayload>,
    queued: Vec<AssetReply>,
    requests: usize,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, src: impl Into<String>, image: ImagePixels) -> Self {
        self.assets.insert(src.into(), AssetPayload::Image(Arc::new(image)));
        self
    }

    pub fn with_audio(mut self, src: impl Into<String>, bytes: impl Into<AudioClip>) -> Self {
        self.assets.insert(src.into(), AssetPayload::Audio(bytes.into()));
        self
    }

    /// Number of requests received so far
    pub fn requests(&self) -> usize {
        self.requests
    }
}

impl AssetFetcher for MemoryFetcher {
    fn request(&mut self, request: AssetRequest) {
        self.requests += 1;
        let result = match self.assets.get(&request.src) {
            Some(AssetPayload::Image(image)) if request.kind == AssetKind::Image => {
                Ok(AssetPayload::Image(image.clone()))
            }
            Some(AssetPayload::Audio(clip)) if request.kind == AssetKind::Audio => {
                Ok(AssetPayload::Audio(clip.clone()))
            }
            _ => Err(AssetError::NotFound(request.src.clone())),
        };
        self.queued.push(AssetReply {
            src: request.src,
            kind: request.kind,
            result,
        });
    }

    fn completed(&mut self) -> Vec<AssetReply> {
        std::mem::take(&mut self.queued)
    }
}

/// Process-lifetime image and audio cache
pub struct AssetCache {
    fetcher: Box<dyn AssetFetcher>,
    images: FxHashMap<String, AssetState<ImageHandle>>,
    audio: FxHashMap<String, AssetState<AudioClip>>,
}

impl AssetCache {
    pub fn new(fetcher: impl AssetFetcher + 'static) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            images: FxHashMap::default(),
            audio: FxHashMap::default(),
        }
    }

    /// Current state of an image, requesting it on first reference
    pub fn image(&mut self, src: &str) -> &AssetState<ImageHandle> {
        if !self.images.contains_key(src) {
            debug!("Requesting image: {}", src);
            self.fetcher.request(AssetRequest {
                src: src.to_string(),
                kind: AssetKind::Image,
            });
        }
        self.images.entry(src.to_string()).or_insert(AssetState::Loading)
    }

    /// Current state of an audio clip, requesting it on first reference
    pub fn audio(&mut self, src: &str) -> &AssetState<AudioClip> {
        if !self.audio.contains_key(src) {
            debug!("Requesting audio: {}", src);
            self.fetcher.request(AssetRequest {
                src: src.to_string(),
                kind: AssetKind::Audio,
            });
        }
        self.audio.entry(src.to_string()).or_insert(AssetState::Loading)
    }

    /// Move finished loads into the cache; returns how many settled
    pub fn poll(&mut self) -> usize {
        let replies = self.fetcher.completed();
        let settled = replies.len();
        for reply in replies {
            match reply.result {
                Ok(AssetPayload::Image(image)) => {
                    debug!("Image ready: {} ({}x{})", reply.src, image.width, image.height);
                    self.images.insert(reply.src, AssetState::Ready(image));
                }
                Ok(AssetPayload::Audio(clip)) => {
                    debug!("Audio ready: {} ({} bytes)", reply.src, clip.len());
                    self.audio.insert(reply.src, AssetState::Ready(clip));
                }
                Err(error) => {
                    warn!("Failed to load asset '{}': {}", reply.src, error);
                    match reply.kind {
                        AssetKind::Image => {
                            self.images.insert(reply.src, AssetState::Failed(error));
                        }
                        AssetKind::Audio => {
                            self.audio.insert(reply.src, AssetState::Failed(error));
                        }
                    }
                }
            }
        }
        settled
    }

    /// Entries still waiting on the fetcher
    pub fn pending(&self) -> usize {
        self.images.values().filter(|s| s.is_loading()).count()
            + self.audio.values().filter(|s| s.is_loading()).count()
    }

    pub fn len(&self) -> usize {
        self.images.len() + self.audio.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel() -> ImagePixels {
        ImagePixels::new(1, 1, vec![255, 0, 0, 255])
    }

    #[test]
    fn test_image_loading_then_ready() {
        let mut cache = AssetCache::new(MemoryFetcher::new().with_image("/a.png", pixel()));
        assert!(cache.image("/a.png").is_loading());
        assert_eq!(cache.pending(), 1);

        assert_eq!(cache.poll(), 1);
        let image = cache.image("/a.png").ready().cloned().unwrap();
        assert_eq!(image.width, 1);
        assert_eq!(cache.pending(), 0);
    }

    #[test]
    fn test_requested_once_per_source() {
        let mut cache = AssetCache::new(MemoryFetcher::new().with_image("/a.png", pixel()));
        cache.image("/a.png");
        cache.image("/a.png");
        cache.poll();
        cache.image("/a.png");
        assert_eq!(cache.len(), 1);

        let handle_a = cache.image("/a.png").ready().cloned().unwrap();
        let handle_b = cache.image("/a.png").ready().cloned().unwrap();
        assert!(Arc::ptr_eq(&handle_a, &handle_b));
    }

    #[test]
    fn test_missing_asset_fails() {
        let mut cache = AssetCache::new(MemoryFetcher::new());
        cache.image("/missing.png");
        cache.audio("/missing.wav");
        cache.poll();
        assert!(matches!(
            cache.image("/missing.png"),
            AssetState::Failed(AssetError::NotFound(_))
        ));
        assert!(cache.audio("/missing.wav").is_failed());
    }

    #[test]
    fn test_kind_mismatch_fails() {
        let mut cache = AssetCache::new(MemoryFetcher::new().with_audio("/boom.wav", vec![1u8, 2, 3]));
        cache.image("/boom.wav");
        cache.audio("/boom.wav");
        cache.poll();
        assert!(cache.image("/boom.wav").is_failed());
        assert_eq!(cache.audio("/boom.wav").ready().map(|clip| clip.len()), Some(3));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_image(b"not an image"), Err(AssetError::Decode(_))));
    }

    #[tokio::test]
    async fn test_tokio_fetcher_reports_missing_file() {
        let loader = AssetLoader::new("/nonexistent-easel-assets", None).unwrap();
        let mut fetcher = TokioFetcher::new(loader, Handle::current());
        fetcher.request(AssetRequest {
            src: "/nope.png".to_string(),
            kind: AssetKind::Image,
        });

        let mut replies = Vec::new();
        for _ in 0..200 {
            replies = fetcher.completed();
            if !replies.is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(replies.len(), 1);
        assert!(matches!(replies[0].result, Err(AssetError::NotFound(_))));
    }
}
