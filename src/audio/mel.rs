//! Slaney-style mel filterbank and cepstral coefficients.

const F_SP: f32 = 200.0 / 3.0;
const MIN_LOG_HZ: f32 = 1000.0;
const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;

fn log_step() -> f32 {
    6.4f32.ln() / 27.0
}

/// Linear below 1 kHz, logarithmic above.
pub fn hz_to_mel(hz: f32) -> f32 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

pub fn mel_to_hz(mel: f32) -> f32 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// Triangular filters spaced evenly on the mel scale between 0 Hz and Nyquist,
/// each scaled to unit area. Returns `weights[mel][bin]`.
pub fn mel_filterbank(sample_rate: u32, n_fft: usize, n_mels: usize) -> Vec<Vec<f32>> {
    let fft_freqs = super::stft::fft_frequencies(sample_rate, n_fft);
    let mel_max = hz_to_mel(sample_rate as f32 / 2.0);

    let edges: Vec<f32> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_max * i as f32 / (n_mels + 1) as f32))
        .collect();

    (0..n_mels)
        .map(|m| {
            let (lo, center, hi) = (edges[m], edges[m + 1], edges[m + 2]);
            let enorm = 2.0 / (hi - lo);
            fft_freqs
                .iter()
                .map(|&f| {
                    let lower = (f - lo) / (center - lo);
                    let upper = (hi - f) / (hi - center);
                    lower.min(upper).max(0.0) * enorm
                })
                .collect()
        })
        .collect()
}

/// Project frame-major power spectra onto the filterbank: `out[frame][mel]`.
pub fn apply_filterbank(power: &[Vec<f32>], filterbank: &[Vec<f32>]) -> Vec<Vec<f32>> {
    power
        .iter()
        .map(|frame| {
            filterbank
                .iter()
                .map(|weights| weights.iter().zip(frame.iter()).map(|(w, p)| w * p).sum())
                .collect()
        })
        .collect()
}

/// Orthonormal DCT-II, truncated to the first `n_out` coefficients.
pub fn dct_ortho(input: &[f32], n_out: usize) -> Vec<f32> {
    let n = input.len() as f32;
    (0..n_out)
        .map(|k| {
            let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
            let sum: f32 = input
                .iter()
                .enumerate()
                .map(|(i, &x)| {
                    x * (std::f32::consts::PI * k as f32 * (2 * i + 1) as f32 / (2.0 * n)).cos()
                })
                .sum();
            scale * sum
        })
        .collect()
}

/// Cepstral coefficients from a frame-major dB mel spectrogram: `out[frame][coef]`.
pub fn mfcc(mel_db: &[Vec<f32>], n_mfcc: usize) -> Vec<Vec<f32>> {
    mel_db.iter().map(|frame| dct_ortho(frame, n_mfcc)).collect()
}
