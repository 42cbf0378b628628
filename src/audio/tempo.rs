//! Onset envelope and global tempo estimation.

const PRIOR_BPM: f32 = 120.0;
const MIN_BPM: f32 = 30.0;
const MAX_BPM: f32 = 300.0;
const MAX_LAG_SECONDS: f32 = 8.0;

/// Spectral flux of a frame-major dB mel spectrogram: the mean positive
/// change per band between consecutive frames. The first frame is 0.
pub fn onset_strength(mel_db: &[Vec<f32>]) -> Vec<f32> {
    let mut envelope = Vec::with_capacity(mel_db.len());
    if mel_db.is_empty() {
        return envelope;
    }
    envelope.push(0.0);

    for pair in mel_db.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        let n = cur.len().max(1) as f32;
        let rise: f32 = cur
            .iter()
            .zip(prev.iter())
            .map(|(c, p)| (c - p).max(0.0))
            .sum();
        envelope.push(rise / n);
    }
    envelope
}

/// Pick the autocorrelation lag of the onset envelope that best explains its
/// periodicity, weighted by a log-normal prior around 120 BPM. Returns 0.0
/// when the envelope carries no energy.
pub fn estimate_tempo(onset: &[f32], sample_rate: u32, hop: usize) -> f32 {
    if onset.len() < 2 || onset.iter().all(|&v| v <= 0.0) {
        return 0.0;
    }

    let frame_rate = sample_rate as f32 / hop as f32;
    let mean = onset.iter().sum::<f32>() / onset.len() as f32;
    let centered: Vec<f32> = onset.iter().map(|v| v - mean).collect();

    let max_lag = ((MAX_LAG_SECONDS * frame_rate).round() as usize).min(centered.len() - 1);

    let mut best: Option<(f32, f32)> = None;
    for lag in 1..=max_lag {
        let bpm = 60.0 * frame_rate / lag as f32;
        if !(MIN_BPM..=MAX_BPM).contains(&bpm) {
            continue;
        }
        let ac: f32 = centered
            .iter()
            .zip(centered[lag..].iter())
            .map(|(a, b)| a * b)
            .sum();
        let prior = (-0.5 * (bpm / PRIOR_BPM).log2().powi(2)).exp();
        let score = ac * prior;
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((bpm, score));
        }
    }

    match best {
        Some((bpm, score)) if score > 0.0 => bpm,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click_envelope(bpm: f32, frame_rate: f32, n_frames: usize) -> Vec<f32> {
        let period = 60.0 * frame_rate / bpm;
        let mut env = vec![0.0f32; n_frames + 2];
        let mut t = 1.0f32;
        while (t as usize) < n_frames {
            // A click smears across neighbouring frames.
            let i = t as usize;
            env[i - 1] += 4.0;
            env[i] += 10.0;
            env[i + 1] += 4.0;
            t += period;
        }
        env.truncate(n_frames);
        env
    }

    #[test]
    fn onset_strength_tracks_rises_only() {
        let mel_db = vec![vec![-80.0, -80.0], vec![0.0, -40.0], vec![-80.0, -80.0]];
        let env = onset_strength(&mel_db);
        assert_eq!(env, vec![0.0, 60.0, 0.0]);
    }

    #[test]
    fn finds_tempo_of_regular_clicks() {
        let frame_rate = 22050.0 / 512.0;
        for target in [100.0f32, 120.0, 140.0] {
            let env = click_envelope(target, frame_rate, 600);
            let bpm = estimate_tempo(&env, 22050, 512);
            assert!((bpm - target).abs() < 8.0, "expected ~{}, got {}", target, bpm);
        }
    }

    #[test]
    fn silent_envelope_has_zero_tempo() {
        assert_eq!(estimate_tempo(&vec![0.0; 300], 22050, 512), 0.0);
        assert_eq!(estimate_tempo(&[], 22050, 512), 0.0);
    }
}
