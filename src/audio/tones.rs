//! Tone recipes and PCM rendering
//!
//! Each [`SoundCategory`] is bound to a fixed short tone sequence used
//! purely as a perceptual identity: a descending three-tone warning, an
//! ascending three-tone celebration, and a single subtle blip. Rendering
//! is pure; the same category always yields the same samples.

use crate::thresholds::SoundCategory;

/// Samples per second of rendered clips (mono, f32).
pub const SAMPLE_RATE: u32 = 44_100;

/// Attack time of the loudness envelope, seconds.
const ATTACK_SECS: f32 = 0.01;

/// Envelope floor; ramps are exponential so they never reach true zero.
const ENVELOPE_FLOOR: f32 = 0.0001;

/// Silent tail appended after the last tone, seconds.
const TAIL_SECS: f32 = 0.02;

/// One sine tone within a sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Pitch in Hz
    pub frequency: f32,
    /// Audible length in seconds
    pub duration: f32,
    /// Start offset from the beginning of the sequence, seconds
    pub offset: f32,
    /// Peak amplitude, 0.0..=1.0
    pub gain: f32,
}

const WARNING: [Tone; 3] = [
    Tone { frequency: 800.0, duration: 0.12, offset: 0.0, gain: 0.06 },
    Tone { frequency: 640.0, duration: 0.12, offset: 0.14, gain: 0.06 },
    Tone { frequency: 520.0, duration: 0.18, offset: 0.30, gain: 0.05 },
];

const CELEBRATION: [Tone; 3] = [
    Tone { frequency: 660.0, duration: 0.12, offset: 0.0, gain: 0.06 },
    Tone { frequency: 780.0, duration: 0.14, offset: 0.14, gain: 0.06 },
    Tone { frequency: 920.0, duration: 0.18, offset: 0.30, gain: 0.07 },
];

const SUBTLE: [Tone; 1] = [Tone { frequency: 520.0, duration: 0.18, offset: 0.0, gain: 0.05 }];

/// The fixed tone sequence for a category.
pub fn recipe(category: SoundCategory) -> &'static [Tone] {
    match category {
        SoundCategory::Warning => &WARNING,
        SoundCategory::Celebration => &CELEBRATION,
        SoundCategory::Subtle => &SUBTLE,
    }
}

/// A rendered tone sequence, ready for an audio backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl RenderedClip {
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Render a category's tone sequence to mono PCM samples.
///
/// Each tone is a sine with an exponential attack over [`ATTACK_SECS`]
/// and an exponential decay over the rest of its duration; overlapping
/// tones sum.
pub fn render(category: SoundCategory) -> RenderedClip {
    let tones = recipe(category);

    let total_secs = tones
        .iter()
        .map(|t| t.offset + t.duration)
        .fold(0.0f32, f32::max)
        + TAIL_SECS;
    let total_samples = (total_secs * SAMPLE_RATE as f32).ceil() as usize;

    let mut samples = vec![0.0f32; total_samples];
    for tone in tones {
        mix_tone(&mut samples, tone);
    }

    RenderedClip {
        samples,
        sample_rate: SAMPLE_RATE,
    }
}

fn mix_tone(samples: &mut [f32], tone: &Tone) {
    let start = (tone.offset * SAMPLE_RATE as f32) as usize;
    let count = (tone.duration * SAMPLE_RATE as f32) as usize;
    let decay_secs = (tone.duration - ATTACK_SECS).max(ATTACK_SECS);

    for i in 0..count {
        let Some(slot) = samples.get_mut(start + i) else {
            break;
        };

        let t = i as f32 / SAMPLE_RATE as f32;
        let envelope = if t < ATTACK_SECS {
            ENVELOPE_FLOOR * (tone.gain / ENVELOPE_FLOOR).powf(t / ATTACK_SECS)
        } else {
            tone.gain * (ENVELOPE_FLOOR / tone.gain).powf((t - ATTACK_SECS) / decay_secs)
        };

        let phase = std::f32::consts::TAU * tone.frequency * t;
        *slot += envelope * phase.sin();
    }
}
