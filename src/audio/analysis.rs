use anyhow::Result;

use super::decode::AudioData;
use super::features::FeatureSet;
use super::stft::{amplitude_to_db, power_to_db, Spectrogram};
use super::{mel, spectral, tempo};
use crate::config::AnalysisConfig;

pub fn analyze(audio: &AudioData, config: &AnalysisConfig) -> Result<FeatureSet> {
    config.validate()?;
    if audio.sample_rate == 0 {
        anyhow::bail!("Sample rate must be positive");
    }

    let samples = &audio.samples;
    let sr = audio.sample_rate;

    log::info!(
        "STFT: n_fft={}, hop={} ({:.1}s of audio)",
        config.n_fft,
        config.hop_length,
        audio.duration()
    );
    let spec = Spectrogram::compute(samples, sr, config.n_fft, config.hop_length);
    let frequencies = spec.frequencies();
    let frame_times = spec.times();
    let power = spec.power();

    let spectrogram_db = amplitude_to_db(&spec.frames, spec.peak());
    log::debug!("Spectrogram: {} frames x {} bins", spec.n_frames(), spec.n_bins());

    log::info!("Mel features: {} bands, {} coefficients", config.n_mels, config.n_mfcc);
    let filterbank = mel::mel_filterbank(sr, config.n_fft, config.n_mels);
    let mel_db = power_to_db(&mel::apply_filterbank(&power, &filterbank), 1.0);
    let mfcc = mel::mfcc(&mel_db, config.n_mfcc);

    let onset_strength = tempo::onset_strength(&mel_db);
    let tempo_bpm = tempo::estimate_tempo(&onset_strength, sr, config.hop_length);
    log::info!("Tempo: {:.2} BPM", tempo_bpm);

    let chroma = spectral::chroma(&power, &frequencies);
    let zero_crossing_rate =
        spectral::zero_crossing_rate(samples, config.n_fft, config.hop_length);
    let spectral_centroid = spectral::spectral_centroid(&spec.frames, &frequencies);
    let band_energy = spectral::band_energy(&spectrogram_db, &frequencies);
    log::info!(
        "Frequency balance: bass={:.1} dB, mid={:.1} dB, treble={:.1} dB",
        band_energy.bass,
        band_energy.mid,
        band_energy.treble
    );

    Ok(FeatureSet {
        sample_rate: sr,
        duration: audio.duration(),
        waveform: samples.clone(),
        spectrogram_db,
        frequencies,
        frame_times,
        tempo_bpm,
        mfcc,
        chroma,
        zero_crossing_rate,
        onset_strength,
        band_energy,
        spectral_centroid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f32, sample_rate: u32, seconds: f32) -> AudioData {
        let n = (sample_rate as f32 * seconds) as usize;
        let samples = (0..n)
            .map(|i| {
                0.5 * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin()
            })
            .collect();
        AudioData {
            samples,
            sample_rate,
        }
    }

    #[test]
    fn frame_wise_features_share_one_grid() {
        let features = analyze(&tone(440.0, 22050, 2.0), &AnalysisConfig::default()).unwrap();
        let n = features.n_frames();
        assert_eq!(features.spectrogram_db.len(), n);
        assert_eq!(features.mfcc.len(), n);
        assert_eq!(features.chroma.len(), n);
        assert_eq!(features.zero_crossing_rate.len(), n);
        assert_eq!(features.onset_strength.len(), n);
        assert_eq!(features.spectral_centroid.len(), n);
        assert!(features.mfcc.iter().all(|f| f.len() == 13));
        assert!(features.chroma.iter().all(|f| f.len() == 12));
        assert_eq!(features.frequencies.len(), 1025);
    }

    #[test]
    fn pure_tone_at_440_hz() {
        let features = analyze(&tone(440.0, 22050, 5.0), &AnalysisConfig::default()).unwrap();

        // Skip the partially padded frames at either end.
        let n = features.n_frames();
        let inner = &features.spectral_centroid[4..n - 4];
        let mean = inner.iter().sum::<f32>() / inner.len() as f32;
        assert!((mean - 440.0).abs() < 30.0, "centroid mean {}", mean);

        assert!(features.tempo_bpm.is_finite());
        assert!(features.tempo_bpm >= 0.0);

        let bands = features.band_energy;
        assert!(bands.bass.is_finite() && bands.mid.is_finite() && bands.treble.is_finite());
        assert!(bands.treble < -60.0, "treble {}", bands.treble);
        assert!(bands.mid > bands.treble);

        let middle = &features.chroma[n / 2];
        assert_eq!(middle[9], 1.0, "A should dominate: {:?}", middle);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = AnalysisConfig {
            n_mfcc: 200,
            ..AnalysisConfig::default()
        };
        assert!(analyze(&tone(440.0, 8000, 0.5), &config).is_err());
    }
}
