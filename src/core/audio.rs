//! Fire-and-forget sound cues and footstep pacing.
//!
//! The simulation only decides *when* a sound plays; loading and mixing belong
//! to whichever front-end drains the session events.

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AudioCue {
    Footstep,
    Collect,
    KeyCollect,
    Victory,
}

impl AudioCue {
    pub const ALL: [AudioCue; 4] = [
        AudioCue::Footstep,
        AudioCue::Collect,
        AudioCue::KeyCollect,
        AudioCue::Victory,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AudioCue::Footstep => "footstep",
            AudioCue::Collect => "collect",
            AudioCue::KeyCollect => "key_collect",
            AudioCue::Victory => "victory",
        }
    }
}

/// Emits a footstep every `threshold` world units walked.
#[derive(Clone, Debug)]
pub struct FootstepTracker {
    threshold: f32,
    travelled: f32,
}

impl FootstepTracker {
    pub fn new(threshold: f32) -> Self {
        Self { threshold, travelled: 0.0 }
    }

    pub fn advance(&mut self, distance: f32, moving: bool) -> Option<AudioCue> {
        if !moving {
            self.travelled = 0.0;
            return None;
        }
        self.travelled += distance;
        if self.travelled >= self.threshold {
            self.travelled = 0.0;
            Some(AudioCue::Footstep)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.travelled = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cue_names() {
        let names: Vec<_> = AudioCue::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["footstep", "collect", "key_collect", "victory"]);
    }

    #[test]
    fn footsteps_fire_by_distance() {
        let mut steps = FootstepTracker::new(0.8);
        assert_eq!(steps.advance(0.5, true), None);
        assert_eq!(steps.advance(0.5, true), Some(AudioCue::Footstep));
        assert_eq!(steps.advance(0.5, true), None);
        // Stopping throws away the partial stride.
        assert_eq!(steps.advance(0.0, false), None);
        assert_eq!(steps.advance(0.5, true), None);
        // Pushing into a wall while holding a key never fires.
        for _ in 0..10 {
            assert_eq!(steps.advance(0.0, true), None);
        }
    }
}
