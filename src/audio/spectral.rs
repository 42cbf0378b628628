use super::features::BandEnergy;
use super::stft::TOP_DB;

pub const BASS_UPPER_HZ: f32 = 150.0;
pub const MID_UPPER_HZ: f32 = 2000.0;

pub const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Band {
    Bass,
    Mid,
    Treble,
}

impl Band {
    /// Half-open partition of the frequency axis: [0, 150), [150, 2000), [2000, inf).
    pub fn of(freq_hz: f32) -> Band {
        if freq_hz < BASS_UPPER_HZ {
            Band::Bass
        } else if freq_hz < MID_UPPER_HZ {
            Band::Mid
        } else {
            Band::Treble
        }
    }
}

/// Mean dB level of each band over every (frame, bin) cell that falls in it.
/// A band without bins reports the dB floor.
pub fn band_energy(spectrogram_db: &[Vec<f32>], freqs: &[f32]) -> BandEnergy {
    let mut sums = [0.0f64; 3];
    let mut counts = [0usize; 3];

    for frame in spectrogram_db {
        for (&db, &freq) in frame.iter().zip(freqs.iter()) {
            let idx = Band::of(freq) as usize;
            sums[idx] += db as f64;
            counts[idx] += 1;
        }
    }

    let mean = |i: usize| {
        if counts[i] == 0 {
            -TOP_DB
        } else {
            (sums[i] / counts[i] as f64) as f32
        }
    };

    BandEnergy {
        bass: mean(Band::Bass as usize),
        mid: mean(Band::Mid as usize),
        treble: mean(Band::Treble as usize),
    }
}

/// Magnitude-weighted mean frequency per frame; 0 for silent frames.
pub fn spectral_centroid(magnitudes: &[Vec<f32>], freqs: &[f32]) -> Vec<f32> {
    magnitudes
        .iter()
        .map(|frame| {
            let total: f32 = frame.iter().sum();
            if total > 1e-10 {
                frame.iter().zip(freqs.iter()).map(|(m, f)| m * f).sum::<f32>() / total
            } else {
                0.0
            }
        })
        .collect()
}

/// Fold power spectra onto 12 pitch classes (C = 0, A4 = 440 Hz), weighting
/// octaves around C5, then scale each frame so its strongest class is 1.
pub fn chroma(power: &[Vec<f32>], freqs: &[f32]) -> Vec<Vec<f32>> {
    let mapping: Vec<Option<(usize, f32)>> = freqs
        .iter()
        .map(|&f| {
            if f <= 0.0 {
                return None;
            }
            let midi = 69.0 + 12.0 * (f / 440.0).log2();
            let class = (midi.round() as i64).rem_euclid(12) as usize;
            let octave = midi / 12.0 - 1.0;
            let weight = (-0.5 * ((octave - 5.0) / 2.0).powi(2)).exp();
            Some((class, weight))
        })
        .collect();

    power
        .iter()
        .map(|frame| {
            let mut bins = vec![0.0f32; 12];
            for (&p, slot) in frame.iter().zip(mapping.iter()) {
                if let Some((class, weight)) = *slot {
                    bins[class] += p * weight;
                }
            }
            let peak = bins.iter().copied().fold(0.0f32, f32::max);
            if peak > 0.0 {
                bins.iter_mut().for_each(|b| *b /= peak);
            }
            bins
        })
        .collect()
}

/// Fraction of sign changes per centered frame. The signal is edge-padded so
/// the frame count matches a centered STFT with the same sizes.
pub fn zero_crossing_rate(samples: &[f32], frame_length: usize, hop: usize) -> Vec<f32> {
    if samples.is_empty() {
        return vec![0.0];
    }

    let pad = frame_length / 2;
    let first = samples[0];
    let last = samples[samples.len() - 1];
    let padded: Vec<f32> = std::iter::repeat(first)
        .take(pad)
        .chain(samples.iter().copied())
        .chain(std::iter::repeat(last).take(pad))
        .collect();

    let signs: Vec<bool> = padded.iter().map(|&s| s >= 0.0).collect();
    let n_frames = 1 + (padded.len() - frame_length) / hop;

    (0..n_frames)
        .map(|t| {
            let frame = &signs[t * hop..t * hop + frame_length];
            let crossings = frame.windows(2).filter(|w| w[0] != w[1]).count();
            crossings as f32 / frame_length as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::stft::fft_frequencies;

    #[test]
    fn bands_partition_every_bin() {
        for sr in [8000, 11025, 22050, 44100, 48000, 96000] {
            let freqs = fft_frequencies(sr, 2048);
            let mut counts = [0usize; 3];
            for &f in &freqs {
                counts[Band::of(f) as usize] += 1;
            }
            assert_eq!(counts.iter().sum::<usize>(), freqs.len(), "sr={}", sr);
            assert!(counts[0] > 0, "DC belongs to bass");
        }
        assert_eq!(Band::of(0.0), Band::Bass);
        assert_eq!(Band::of(149.99), Band::Bass);
        assert_eq!(Band::of(150.0), Band::Mid);
        assert_eq!(Band::of(1999.9), Band::Mid);
        assert_eq!(Band::of(2000.0), Band::Treble);
    }

    #[test]
    fn empty_band_reports_floor() {
        // 3 kHz sample rate: Nyquist is 1.5 kHz, so there is no treble.
        let freqs = fft_frequencies(3000, 64);
        let db = vec![vec![-10.0; freqs.len()]; 4];
        let energy = band_energy(&db, &freqs);
        assert!((energy.bass + 10.0).abs() < 1e-5);
        assert!((energy.mid + 10.0).abs() < 1e-5);
        assert_eq!(energy.treble, -TOP_DB);
    }

    #[test]
    fn centroid_of_single_bin_is_its_frequency() {
        let freqs = vec![0.0, 100.0, 200.0, 300.0];
        let c = spectral_centroid(&[vec![0.0, 0.0, 3.0, 0.0], vec![0.0; 4]], &freqs);
        assert_eq!(c, vec![200.0, 0.0]);
    }

    #[test]
    fn chroma_of_a440_peaks_at_a() {
        let freqs = fft_frequencies(22050, 2048);
        let bin = (440.0f32 / (22050.0 / 2048.0)).round() as usize;
        let mut frame = vec![0.0; freqs.len()];
        frame[bin] = 1.0;
        let c = chroma(&[frame, vec![0.0; freqs.len()]], &freqs);
        assert_eq!(c[0].len(), 12);
        assert_eq!(c[0][9], 1.0);
        assert_eq!(PITCH_CLASSES[9], "A");
        assert!(c[1].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn zcr_of_alternating_and_constant_signals() {
        let alternating: Vec<f32> = (0..4096).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let zcr = zero_crossing_rate(&alternating, 2048, 512);
        assert_eq!(zcr.len(), 1 + 4096 / 512);
        let middle = zcr[zcr.len() / 2];
        assert!((middle - 2047.0 / 2048.0).abs() < 1e-6);

        let constant = vec![0.3f32; 4096];
        assert!(zero_crossing_rate(&constant, 2048, 512).iter().all(|&z| z == 0.0));
    }
}
