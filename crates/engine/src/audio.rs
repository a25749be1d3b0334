//! Sound effect playback over rodio

use std::io::Cursor;

use log::debug;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use crate::assets::AudioClip;
use crate::error::AudioError;

/// An open audio output device
///
/// The stream must stay alive for as long as sounds play through `handle`.
pub struct AudioOutput {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl AudioOutput {
    /// Open the default output device
    pub fn open() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        debug!("Opened audio output");
        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    /// Decode and play a clip on a detached sink
    pub fn play(&self, clip: &AudioClip, volume: f32) -> Result<(), AudioError> {
        let sink = Sink::try_new(&self.handle)?;
        sink.set_volume(volume.max(0.0));
        let source = Decoder::new(Cursor::new(clip.clone()))?;
        sink.append(source);
        sink.detach();
        Ok(())
    }
}
