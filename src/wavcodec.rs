//! Minimal RIFF/WAVE container for mono 16-bit PCM.
//!
//! The encoder always writes the canonical 44-byte header:
//!
//! | offset | field                       |
//! |--------|-----------------------------|
//! | 0      | `RIFF`                      |
//! | 4      | 36 + data length (u32)      |
//! | 8      | `WAVE`                      |
//! | 12     | `fmt `                      |
//! | 16     | 16 (u32)                    |
//! | 20     | 1, PCM (u16)                |
//! | 22     | 1 channel (u16)             |
//! | 24     | sample rate (u32)           |
//! | 28     | sample rate * 2 (u32)       |
//! | 32     | 2, block align (u16)        |
//! | 34     | 16 bits per sample (u16)    |
//! | 36     | `data`                      |
//! | 40     | data length (u32)           |
//!
//! All multi-byte fields are little endian.

use thiserror::Error;

use crate::synth::SynthesizedWaveform;

pub const HEADER_LEN: usize = 44;

const PCM_FORMAT: u16 = 1;
const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = CHANNELS * BITS_PER_SAMPLE / 8;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ContainerError {
    #[error("container is truncated ({0} bytes)")]
    Truncated(usize),
    #[error("missing {0} tag")]
    MissingTag(&'static str),
    #[error("unsupported format code {0}, only PCM is supported")]
    UnsupportedFormat(u16),
    #[error("unsupported channel count {0}, only mono is supported")]
    UnsupportedChannels(u16),
    #[error("unsupported sample width of {0} bits, only 16 is supported")]
    UnsupportedBitDepth(u16),
    #[error("{0} samples do not fit in a WAV container")]
    TooLong(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedContainer {
    pub sample_rate: u32,
    pub samples: Vec<i16>,
}

/// Clamps to [-1, 1] and scales onto the i16 range, truncating toward zero.
pub fn quantize(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Byte length of the data chunk, such that the RIFF size field
/// (36 + data length) still fits in a u32.
fn data_len(sample_count: usize) -> Result<u32, ContainerError> {
    sample_count
        .checked_mul(BLOCK_ALIGN as usize)
        .and_then(|len| u32::try_from(len).ok())
        .filter(|len| len.checked_add(36).is_some())
        .ok_or(ContainerError::TooLong(sample_count))
}

pub fn encode(waveform: &SynthesizedWaveform) -> Result<Vec<u8>, ContainerError> {
    let data_len = data_len(waveform.samples.len())?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + data_len as usize);

    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&PCM_FORMAT.to_le_bytes());
    bytes.extend_from_slice(&CHANNELS.to_le_bytes());
    bytes.extend_from_slice(&waveform.sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(waveform.sample_rate * BLOCK_ALIGN as u32).to_le_bytes());
    bytes.extend_from_slice(&BLOCK_ALIGN.to_le_bytes());
    bytes.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());

    for sample in &waveform.samples {
        bytes.extend_from_slice(&quantize(*sample).to_le_bytes());
    }

    Ok(bytes)
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Decodes mono 16-bit PCM. Chunks other than `fmt ` and `data` are skipped.
pub fn decode(bytes: &[u8]) -> Result<DecodedContainer, ContainerError> {
    if bytes.len() < 12 {
        return Err(ContainerError::Truncated(bytes.len()));
    }
    if &bytes[0..4] != b"RIFF" {
        return Err(ContainerError::MissingTag("RIFF"));
    }
    if &bytes[8..12] != b"WAVE" {
        return Err(ContainerError::MissingTag("WAVE"));
    }

    let mut sample_rate = None;
    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let tag = &bytes[pos..pos + 4];
        let chunk_len = read_u32(bytes, pos + 4) as usize;
        let body = pos + 8;

        if tag == b"fmt " {
            if chunk_len < 16 || body + 16 > bytes.len() {
                return Err(ContainerError::Truncated(bytes.len()));
            }
            let format = read_u16(bytes, body);
            if format != PCM_FORMAT {
                return Err(ContainerError::UnsupportedFormat(format));
            }
            let channels = read_u16(bytes, body + 2);
            if channels != CHANNELS {
                return Err(ContainerError::UnsupportedChannels(channels));
            }
            let bits = read_u16(bytes, body + 14);
            if bits != BITS_PER_SAMPLE {
                return Err(ContainerError::UnsupportedBitDepth(bits));
            }
            sample_rate = Some(read_u32(bytes, body + 4));
        } else if tag == b"data" {
            let sample_rate = sample_rate.ok_or(ContainerError::MissingTag("fmt "))?;
            if body + chunk_len > bytes.len() {
                return Err(ContainerError::Truncated(bytes.len()));
            }
            let samples = bytes[body..body + chunk_len]
                .chunks_exact(2)
                .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            return Ok(DecodedContainer {
                sample_rate,
                samples,
            });
        }

        // Chunks are padded to an even length
        pos = body + chunk_len + (chunk_len & 1);
    }

    Err(ContainerError::MissingTag("data"))
}
