use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::sync::Arc;

use fragment_maze::core::audio::AudioCue;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, warn};

fn load_bytes(path: &str) -> Option<Vec<u8>> {
    let mut f = File::open(path).ok()?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf).ok()?;
    Some(buf)
}

fn load_bytes_any(paths: &[String]) -> Option<Vec<u8>> {
    paths.iter().find_map(|p| load_bytes(p))
}

/// Plays the core's sound cues. Missing files leave that cue silent.
pub struct AudioManager {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    foot_sink: Sink,
    clips: HashMap<AudioCue, Arc<Vec<u8>>>,
}

impl AudioManager {
    pub fn new() -> Option<Self> {
        let (_stream, handle) = OutputStream::try_default().ok()?;
        let foot_sink = Sink::try_new(&handle).ok()?;
        Some(Self { _stream, handle, foot_sink, clips: HashMap::new() })
    }

    pub fn load_cues(&mut self, dir: &str) {
        for cue in AudioCue::ALL {
            let name = cue.name();
            let candidates = [format!("{dir}/{name}.wav"), format!("{dir}/{name}.mp3")];
            match load_bytes_any(&candidates) {
                Some(bytes) => {
                    self.clips.insert(cue, Arc::new(bytes));
                }
                None => warn!(cue = name, dir, "no sound file for cue"),
            }
        }
        debug!(loaded = self.clips.len(), "audio cues loaded");
    }

    pub fn play(&self, cue: AudioCue) {
        let Some(data) = self.clips.get(&cue) else {
            return;
        };
        let Ok(dec) = Decoder::new(BufReader::new(Cursor::new(data.as_ref().clone()))) else {
            return;
        };
        match cue {
            // Footsteps queue on one sink so they never pile up.
            AudioCue::Footstep => {
                if self.foot_sink.len() < 2 {
                    self.foot_sink.append(dec.amplify(0.5));
                }
            }
            _ => {
                // Own sink so overlapping pickups all sound immediately.
                if let Ok(sink) = Sink::try_new(&self.handle) {
                    sink.append(dec);
                    sink.detach();
                }
            }
        }
    }
}
