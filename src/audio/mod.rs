pub mod analysis;
pub mod decode;
pub mod features;
pub mod mel;
pub mod spectral;
pub mod stft;
pub mod tempo;
