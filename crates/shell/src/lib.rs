//! Easel Shell
//!
//! Game window, event handling and the frame loop.

mod error;
mod event;

pub use error::{ShellError, ShellResult};
pub use event::{button_released, key_from_sdl, mouse_button, poll_events, ShellEvent};

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

use log::{debug, info, warn};
use tokio::runtime::Handle;
use url::Url;

use easel_engine::{AssetCache, Engine, GameState, Instance, InstanceOptions, StartConfig, TokioFetcher};
use easel_net::AssetLoader;
use easel_render::{DisplayList, FontCache, RenderBackend, RenderColor, SdlBackend};

/// Faces tried when no font path is configured
const FALLBACK_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/Library/Fonts/Courier New.ttf",
    "/System/Library/Fonts/Supplemental/Courier New.ttf",
    "C:\\Windows\\Fonts\\cour.ttf",
];

/// Window configuration
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub title: String,
    /// Directory that relative asset sources resolve against
    pub asset_root: PathBuf,
    /// Resolve relative asset sources against this URL instead
    pub asset_base_url: Option<Url>,
    pub font_path: Option<PathBuf>,
    /// Physical pixels per logical pixel
    pub scale: f32,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            title: String::from("Easel"),
            asset_root: PathBuf::from("."),
            asset_base_url: None,
            font_path: None,
            scale: 1.0,
        }
    }
}

/// Hosts an engine in an SDL window
pub struct Shell {
    config: ShellConfig,
    runtime: Handle,
    font: Option<Rc<RefCell<FontCache>>>,
}

impl Shell {
    /// Create a shell; asset loads run on `runtime`
    pub fn new(config: ShellConfig, runtime: Handle) -> ShellResult<Self> {
        let font = load_font(config.font_path.as_deref())?;
        Ok(Self { config, runtime, font })
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Engine services backed by the asset loader and this shell's font
    pub fn instance(&self) -> ShellResult<Instance> {
        let loader = AssetLoader::new(&self.config.asset_root, self.config.asset_base_url.clone())?;
        let fetcher = TokioFetcher::new(loader, self.runtime.clone());
        Ok(Instance::with_options(
            AssetCache::new(fetcher),
            InstanceOptions {
                font: self.font.clone(),
                audio: true,
            },
        ))
    }

    /// Run a game until the window closes or Escape is pressed
    pub fn run<S: GameState>(&self, start: StartConfig<S>) -> ShellResult<()> {
        let start = match start.instance {
            Some(_) => start,
            None => start.instance(self.instance()?),
        };
        let mut engine = Engine::start(start)?;

        let mut backend = SdlBackend::new(&self.config.title, engine.width(), engine.height(), self.config.scale)?;
        backend.set_font(self.font.clone());

        let mut display_list = DisplayList::new();
        let started = Instant::now();
        info!("Running '{}' at {}x{}", self.config.title, engine.width(), engine.height());

        'running: loop {
            for event in poll_events() {
                match event {
                    ShellEvent::Quit => break 'running,
                    ShellEvent::Input(input) => engine.handle_input(input),
                }
            }

            display_list.clear();
            engine.frame(started.elapsed(), &mut display_list);

            backend.clear(RenderColor::WHITE);
            backend.render(&display_list);
            backend.present();
        }

        info!(
            "Stopped after {} frames ({} textures cached)",
            engine.frames(),
            backend.cached_textures()
        );
        Ok(())
    }
}

/// Load the configured face, or the first fallback found
///
/// A configured path that fails to load is an error. With no path and no
/// fallback, text is skipped.
fn load_font(path: Option<&Path>) -> ShellResult<Option<Rc<RefCell<FontCache>>>> {
    if let Some(path) = path {
        let font = FontCache::from_file(path).map_err(|source| ShellError::Font {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded font {}", path.display());
        return Ok(Some(Rc::new(RefCell::new(font))));
    }

    for candidate in FALLBACK_FONTS {
        let candidate = Path::new(candidate);
        if !candidate.exists() {
            continue;
        }
        match FontCache::from_file(candidate) {
            Ok(font) => {
                debug!("Using fallback font {}", candidate.display());
                return Ok(Some(Rc::new(RefCell::new(font))));
            }
            Err(e) => debug!("Skipping font {}: {}", candidate.display(), e),
        }
    }

    warn!("No font found, text will not be drawn");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ShellConfig::default();
        assert_eq!(config.title, "Easel");
        assert_eq!(config.scale, 1.0);
        assert!(config.font_path.is_none());
    }

    #[test]
    fn test_missing_font_path_is_an_error() {
        let result = load_font(Some(Path::new("/nonexistent-easel-font.ttf")));
        assert!(matches!(result, Err(ShellError::Font { .. })));
    }

    #[tokio::test]
    async fn test_instance_starts_without_window() {
        let shell = Shell::new(
            ShellConfig {
                font_path: None,
                ..Default::default()
            },
            Handle::current(),
        )
        .unwrap();
        let instance = shell.instance().unwrap();
        assert!(instance.image("/public/missing.png").is_none());
    }
}
