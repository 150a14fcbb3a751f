/// Sound engine: procedural 8-bit style sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

use crate::sim::event::{GameEvent, HitCause};

/// Effect to play for an event, if any.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sfx {
    Chip,
    Mine,
    Arm,
    Explosion,
    Lava,
    Heal,
    LevelUp,
    Die,
}

pub fn sfx_for(event: &GameEvent) -> Option<Sfx> {
    match event {
        GameEvent::MineralChipped { .. } => Some(Sfx::Chip),
        GameEvent::MineralMined { .. } => Some(Sfx::Mine),
        GameEvent::BombArmed { .. } => Some(Sfx::Arm),
        GameEvent::BombExploded { .. } => Some(Sfx::Explosion),
        GameEvent::PlayerHit { cause: HitCause::Lava, .. } => Some(Sfx::Lava),
        GameEvent::Healed { .. } => Some(Sfx::Heal),
        GameEvent::LeveledUp { .. } => Some(Sfx::LevelUp),
        GameEvent::PlayerDied => Some(Sfx::Die),
        _ => None,
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        chip: Arc<Vec<u8>>,
        mine: Arc<Vec<u8>>,
        arm: Arc<Vec<u8>>,
        explosion: Arc<Vec<u8>>,
        lava: Arc<Vec<u8>>,
        heal: Arc<Vec<u8>>,
        level_up: Arc<Vec<u8>>,
        die: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output, sound disabled: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                chip: Arc::new(make_wav(&gen_chip())),
                mine: Arc::new(make_wav(&gen_mine())),
                arm: Arc::new(make_wav(&gen_arm())),
                explosion: Arc::new(make_wav(&gen_explosion())),
                lava: Arc::new(make_wav(&gen_lava())),
                heal: Arc::new(make_wav(&gen_heal())),
                level_up: Arc::new(make_wav(&gen_level_up())),
                die: Arc::new(make_wav(&gen_die())),
            })
        }

        pub fn play(&self, sfx: Sfx) {
            let buf = match sfx {
                Sfx::Chip => &self.chip,
                Sfx::Mine => &self.mine,
                Sfx::Arm => &self.arm,
                Sfx::Explosion => &self.explosion,
                Sfx::Lava => &self.lava,
                Sfx::Heal => &self.heal,
                Sfx::LevelUp => &self.level_up,
                Sfx::Die => &self.die,
            };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn samples_for(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    /// Simple LCG noise in [-1, 1].
    fn noise(state: &mut u32) -> f32 {
        *state = state.wrapping_mul(1103515245).wrapping_add(12345);
        (*state as f32 / u32::MAX as f32) * 2.0 - 1.0
    }

    /// Sequence of short notes with a sine + 3rd harmonic timbre.
    fn arpeggio(notes: &[f32], note_dur: f32, volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in notes {
            let n = samples_for(note_dur);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 3.0 * TAU).sin() * 0.3;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Chip: very short tick, mostly noise
    fn gen_chip() -> Vec<f32> {
        let n = samples_for(0.05);
        let mut rng: u32 = 777;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let tone = (ti * 900.0 * TAU).sin();
                (tone * 0.3 + noise(&mut rng) * 0.7) * (1.0 - t) * 0.2
            })
            .collect()
    }

    /// Mine: noise burst with descending pitch
    fn gen_mine() -> Vec<f32> {
        let n = samples_for(0.12);
        let mut rng: u32 = 12345;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 200.0 + (1.0 - t) * 300.0;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let tone = (ti * freq * TAU).sin();
                let env = (1.0 - t).powf(0.8);
                (tone * 0.4 + noise(&mut rng) * 0.6) * env * 0.3
            })
            .collect()
    }

    /// Arm: two quick high beeps
    fn gen_arm() -> Vec<f32> {
        let mut samples = Vec::new();
        for _ in 0..2 {
            let n = samples_for(0.04);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let square = if (t * 1760.0 * TAU).sin() >= 0.0 { 1.0 } else { -1.0 };
                samples.push(square * 0.12);
            }
            samples.extend(std::iter::repeat(0.0).take(samples_for(0.03)));
        }
        samples
    }

    /// Explosion: long low rumble of filtered noise
    fn gen_explosion() -> Vec<f32> {
        let n = samples_for(0.5);
        let mut rng: u32 = 4242;
        let mut low = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                // One-pole low-pass: smooth noise into a rumble.
                low += (noise(&mut rng) - low) * 0.08;
                let env = (1.0 - t).powf(1.5);
                (low * 3.0).clamp(-1.0, 1.0) * env * 0.5
            })
            .collect()
    }

    /// Lava: short sizzle, rising hiss
    fn gen_lava() -> Vec<f32> {
        let n = samples_for(0.2);
        let mut rng: u32 = 99;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let tone = (ti * (150.0 + t * 250.0) * TAU).sin();
                let env = (t * 8.0).min(1.0) * (1.0 - t);
                (tone * 0.5 + noise(&mut rng) * 0.5) * env * 0.3
            })
            .collect()
    }

    /// Heal: soft ascending pair
    fn gen_heal() -> Vec<f32> {
        arpeggio(&[659.0, 988.0], 0.08, 0.22) // E5, B5
    }

    /// Level up: ascending fanfare C5→E5→G5→C6
    fn gen_level_up() -> Vec<f32> {
        arpeggio(&[523.0, 659.0, 784.0, 1047.0], 0.09, 0.28)
    }

    /// Death: sad descending tone A4→F#4→Eb4→C4 with a final fade
    fn gen_die() -> Vec<f32> {
        let notes = [440.0_f32, 370.0, 311.0, 261.0];
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = samples_for(0.12);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                samples.push((t * freq * TAU).sin() * env * 0.3);
            }
        }
        let total = samples.len();
        let fade_len = total / 4;
        for (k, s) in samples[total - fade_len..].iter_mut().enumerate() {
            *s *= (fade_len - k) as f32 / fade_len as f32;
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: 16-bit mono PCM
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let bits_per_sample: u16 = 16;
        let block_align: u16 = bits_per_sample / 8;
        let byte_rate = SAMPLE_RATE * block_align as u32;
        let data_size = samples.len() as u32 * block_align as u32;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM
        buf.extend_from_slice(&1u16.to_le_bytes());  // mono
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_matches_payload() {
            let wav = make_wav(&[0.0, 1.0, -1.0]);
            assert_eq!(wav.len(), 44 + 6);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[36..40], b"data");
            assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 6);
            assert_eq!(i16::from_le_bytes([wav[46], wav[47]]), 32767);
        }

        #[test]
        fn effects_are_audible_and_bounded() {
            for samples in [gen_chip(), gen_mine(), gen_arm(), gen_explosion(), gen_lava(),
                            gen_heal(), gen_level_up(), gen_die()] {
                assert!(!samples.is_empty());
                assert!(samples.iter().all(|s| s.abs() <= 1.0));
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API, compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::MineralKind;

    #[test]
    fn events_map_to_effects() {
        let mined = GameEvent::MineralMined { x: 0, y: 0, kind: MineralKind::Gold, xp: 4 };
        assert_eq!(sfx_for(&mined), Some(Sfx::Mine));
        assert_eq!(sfx_for(&GameEvent::PlayerHit { cause: HitCause::Lava, health: 2 }), Some(Sfx::Lava));
        // The explosion itself is the blast sound.
        assert_eq!(sfx_for(&GameEvent::PlayerHit { cause: HitCause::Blast, health: 2 }), None);
        assert_eq!(sfx_for(&GameEvent::RowsGenerated { count: 1 }), None);
    }
}
