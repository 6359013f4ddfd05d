//! Default audio output via rodio

use super::AudioSink;
use crate::error::{Error, Result};
use crate::remote::AudioPayload;
use async_trait::async_trait;
use std::io::Cursor;

/// Plays payloads through the system's default output device.
///
/// rodio owns format detection, decoding, and the output stream; the
/// blocking playback runs on the blocking thread pool so the async loops
/// stay responsive.
pub struct RodioSink;

#[async_trait]
impl AudioSink for RodioSink {
    async fn play(&self, audio: AudioPayload) -> Result<()> {
        tokio::task::spawn_blocking(move || -> Result<()> {
            let (_stream, handle) = rodio::OutputStream::try_default()
                .map_err(|e| Error::Playback(format!("no audio output device: {}", e)))?;

            let sink = rodio::Sink::try_new(&handle)
                .map_err(|e| Error::Playback(format!("failed to open audio sink: {}", e)))?;

            let source = rodio::Decoder::new(Cursor::new(audio.bytes))
                .map_err(|e| Error::Playback(format!("failed to decode audio: {}", e)))?;

            sink.append(source);
            sink.sleep_until_end();
            Ok(())
        })
        .await
        .map_err(|e| Error::Internal(format!("playback task failed: {}", e)))?
    }
}
