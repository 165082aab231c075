// Audible toggle cue: `on.wav` when the trigger is enabled, `off.wav` when it
// is disabled. Both files are read up front so a missing one shows at startup.

use anyhow::{Context, Result};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use zone_trigger::core_modules::interfaces::{CollaboratorError, StateNotifier};

const CUE_VOLUME: f32 = 0.1;

pub struct SoundNotifier {
    // Dropping the stream silences every sink created from the handle.
    _stream: OutputStream,
    handle: OutputStreamHandle,
    on: Arc<[u8]>,
    off: Arc<[u8]>,
}

impl SoundNotifier {
    pub fn load(dir: &Path) -> Result<Self> {
        let read = |name: &str| -> Result<Arc<[u8]>> {
            let path = dir.join(name);
            let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            Ok(bytes.into())
        };
        let on = read("on.wav")?;
        let off = read("off.wav")?;
        let (stream, handle) = OutputStream::try_default().context("no audio output device")?;

        Ok(Self {
            _stream: stream,
            handle,
            on,
            off,
        })
    }
}

impl StateNotifier for SoundNotifier {
    fn notify(&mut self, enabled: bool) -> Result<(), CollaboratorError> {
        let clip = if enabled { &self.on } else { &self.off };
        let source = Decoder::new(Cursor::new(Arc::clone(clip)))?;

        let sink = Sink::try_new(&self.handle)?;
        sink.set_volume(CUE_VOLUME);
        sink.append(source);
        sink.detach();
        Ok(())
    }
}
