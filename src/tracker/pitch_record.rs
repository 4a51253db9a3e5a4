use crate::common::freq_to_midi_note;

/// The pitch estimate for one pitch block.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PitchRecord {
    /// The index of the pitch block since the last reset.
    pub index: u64,
    /// The absolute input sample position where the analyzed window starts.
    pub sample_position: i64,
    /// The detected fundamental frequency in Hz, or 0 if no stable pitch was found.
    pub frequency: f32,
}

impl PitchRecord {
    pub fn has_pitch(&self) -> bool {
        self.frequency > 0.0
    }

    /// The [MIDI note number](https://newt.phys.unsw.edu.au/jw/notes.html), with a fractional part,
    /// of the detected frequency.
    pub fn midi_note_number(&self) -> Option<f32> {
        if self.has_pitch() {
            Some(freq_to_midi_note(self.frequency))
        } else {
            None
        }
    }
}
