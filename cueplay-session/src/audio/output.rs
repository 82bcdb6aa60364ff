//! Rodio audio output
//!
//! Real [`AudioBackend`] over rodio. The `OutputStream` is not `Send`,
//! so it lives on a dedicated thread that parks for the life of the
//! process; the backend only ever hands out work through the
//! `OutputStreamHandle`, which is shareable.

use crate::audio::backend::{AudioBackend, SoundBytes, Voice};
use crate::error::{Error, Result};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::io::Cursor;
use std::sync::{mpsc, Mutex};
use tracing::info;

/// Rodio-backed audio output
#[derive(Default)]
pub struct RodioBackend {
    handle: Mutex<Option<OutputStreamHandle>>,
}

impl RodioBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioBackend for RodioBackend {
    fn unlock(&self) -> Result<()> {
        let mut guard = self
            .handle
            .lock()
            .map_err(|_| Error::Backend("output handle poisoned".into()))?;
        if guard.is_some() {
            return Ok(());
        }

        let (tx, rx) = mpsc::channel();
        std::thread::Builder::new()
            .name("cueplay-output".into())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    if tx.send(Ok(handle)).is_err() {
                        return;
                    }
                    // The stream must outlive every sink; park here for
                    // the life of the process.
                    let _stream = stream;
                    loop {
                        std::thread::park();
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(Error::Backend(format!("open output device: {e}"))));
                }
            })
            .map_err(|e| Error::Backend(format!("spawn output thread: {e}")))?;

        let handle = rx
            .recv()
            .map_err(|_| Error::Backend("output thread exited before reporting".into()))??;
        info!("audio output device opened");
        *guard = Some(handle);
        Ok(())
    }

    fn start(&self, bytes: SoundBytes, gain: f32, looped: bool) -> Result<Box<dyn Voice>> {
        let guard = self
            .handle
            .lock()
            .map_err(|_| Error::Backend("output handle poisoned".into()))?;
        let handle = guard
            .as_ref()
            .ok_or_else(|| Error::InvalidState("audio output not opened".into()))?;

        let sink = Sink::try_new(handle).map_err(|e| Error::Backend(format!("create sink: {e}")))?;
        sink.set_volume(gain);

        let decoder = Decoder::new(Cursor::new(bytes))
            .map_err(|e| Error::Backend(format!("decode sound: {e}")))?;
        if looped {
            sink.append(decoder.repeat_infinite());
        } else {
            sink.append(decoder);
        }

        Ok(Box::new(RodioVoice { sink }))
    }
}

/// One rodio sink per live handle
struct RodioVoice {
    sink: Sink,
}

impl Voice for RodioVoice {
    fn set_gain(&self, gain: f32) {
        self.sink.set_volume(gain);
    }

    fn pause(&self) {
        self.sink.pause();
    }

    fn resume(&self) {
        self.sink.play();
    }

    fn stop(&self) {
        self.sink.stop();
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}
