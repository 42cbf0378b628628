use rayon::prelude::*;
use rustfft::{num_complex::Complex, FftPlanner};

/// Dynamic range kept below the peak by the dB conversions.
pub const TOP_DB: f32 = 80.0;

const AMPLITUDE_AMIN: f32 = 1e-5;
const POWER_AMIN: f32 = 1e-10;

/// Magnitude short-time Fourier transform, stored frame-major.
#[derive(Clone, Debug)]
pub struct Spectrogram {
    /// `frames[t][k]` is the magnitude of bin `k` in frame `t`.
    pub frames: Vec<Vec<f32>>,
    pub n_fft: usize,
    pub hop: usize,
    pub sample_rate: u32,
}

impl Spectrogram {
    /// Centered STFT: the signal is zero-padded by `n_fft / 2` on both sides so
    /// that frame `t` is centered on sample `t * hop`.
    pub fn compute(samples: &[f32], sample_rate: u32, n_fft: usize, hop: usize) -> Self {
        let padded = center_pad(samples, n_fft / 2);
        let window = hann_window(n_fft);
        let n_frames = 1 + (padded.len() - n_fft) / hop;

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(n_fft);
        let half = n_fft / 2;

        let frames = (0..n_frames)
            .into_par_iter()
            .map(|t| {
                let start = t * hop;
                let mut buffer: Vec<Complex<f32>> = padded[start..start + n_fft]
                    .iter()
                    .zip(window.iter())
                    .map(|(&s, &w)| Complex::new(s * w, 0.0))
                    .collect();
                fft.process(&mut buffer);
                buffer[..=half].iter().map(|c| c.norm()).collect()
            })
            .collect();

        Self {
            frames,
            n_fft,
            hop,
            sample_rate,
        }
    }

    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn n_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Squared magnitudes.
    pub fn power(&self) -> Vec<Vec<f32>> {
        self.frames
            .iter()
            .map(|frame| frame.iter().map(|m| m * m).collect())
            .collect()
    }

    pub fn frequencies(&self) -> Vec<f32> {
        fft_frequencies(self.sample_rate, self.n_fft)
    }

    pub fn times(&self) -> Vec<f32> {
        frames_to_time(self.n_frames(), self.sample_rate, self.hop)
    }

    /// Largest magnitude over all frames and bins.
    pub fn peak(&self) -> f32 {
        self.frames
            .iter()
            .flat_map(|frame| frame.iter().copied())
            .fold(0.0f32, f32::max)
    }
}

/// Periodic Hann window, the form used for spectral analysis.
pub fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / size as f32).cos()))
        .collect()
}

pub fn fft_frequencies(sample_rate: u32, n_fft: usize) -> Vec<f32> {
    let resolution = sample_rate as f32 / n_fft as f32;
    (0..=n_fft / 2).map(|k| k as f32 * resolution).collect()
}

pub fn frames_to_time(n_frames: usize, sample_rate: u32, hop: usize) -> Vec<f32> {
    (0..n_frames)
        .map(|t| (t * hop) as f32 / sample_rate as f32)
        .collect()
}

/// `20 * log10(S / reference)`, floored at `TOP_DB` below the result's peak.
pub fn amplitude_to_db(values: &[Vec<f32>], reference: f32) -> Vec<Vec<f32>> {
    to_db(values, 20.0, reference, AMPLITUDE_AMIN)
}

/// `10 * log10(S / reference)`, floored at `TOP_DB` below the result's peak.
pub fn power_to_db(values: &[Vec<f32>], reference: f32) -> Vec<Vec<f32>> {
    to_db(values, 10.0, reference, POWER_AMIN)
}

fn to_db(values: &[Vec<f32>], multiplier: f32, reference: f32, amin: f32) -> Vec<Vec<f32>> {
    let ref_db = multiplier * reference.abs().max(amin).log10();
    let mut db: Vec<Vec<f32>> = values
        .iter()
        .map(|row| {
            row.iter()
                .map(|&v| multiplier * v.max(amin).log10() - ref_db)
                .collect()
        })
        .collect();

    let peak = db
        .iter()
        .flat_map(|row| row.iter().copied())
        .fold(f32::NEG_INFINITY, f32::max);
    if peak.is_finite() {
        let floor = peak - TOP_DB;
        for v in db.iter_mut().flat_map(|row| row.iter_mut()) {
            *v = v.max(floor);
        }
    }
    db
}

fn center_pad(samples: &[f32], pad: usize) -> Vec<f32> {
    let mut padded = Vec::with_capacity(samples.len() + 2 * pad);
    padded.resize(pad, 0.0);
    padded.extend_from_slice(samples);
    padded.resize(samples.len() + 2 * pad, 0.0);
    padded
}
