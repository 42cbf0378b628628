/// Mean dB level of the three fixed frequency bands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandEnergy {
    /// [0, 150) Hz
    pub bass: f32,
    /// [150, 2000) Hz
    pub mid: f32,
    /// [2000, Nyquist] Hz
    pub treble: f32,
}

/// Everything the figure draws. Matrices are frame-major (`m[frame][row]`),
/// and every frame-wise feature shares the STFT frame grid.
#[derive(Clone, Debug)]
pub struct FeatureSet {
    pub sample_rate: u32,
    pub duration: f32,
    /// Decoded mono samples
    pub waveform: Vec<f32>,
    /// Magnitude spectrogram in dB relative to its peak
    pub spectrogram_db: Vec<Vec<f32>>,
    /// Center frequency of each spectrogram bin (Hz)
    pub frequencies: Vec<f32>,
    /// Center time of each frame (s)
    pub frame_times: Vec<f32>,
    pub tempo_bpm: f32,
    pub mfcc: Vec<Vec<f32>>,
    /// 12 pitch classes per frame, max-normalised
    pub chroma: Vec<Vec<f32>>,
    pub zero_crossing_rate: Vec<f32>,
    pub onset_strength: Vec<f32>,
    pub band_energy: BandEnergy,
    /// Hz per frame
    pub spectral_centroid: Vec<f32>,
}

impl FeatureSet {
    pub fn n_frames(&self) -> usize {
        self.frame_times.len()
    }

    /// Seconds between consecutive frames.
    pub fn frame_step(&self) -> f32 {
        match self.frame_times.as_slice() {
            [first, second, ..] => second - first,
            _ => self.duration.max(f32::EPSILON),
        }
    }
}
