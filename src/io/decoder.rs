//! Audio decoding using Symphonia
//!
//! Decodes the first audio track of any container/codec enabled in
//! Symphonia's default registry (WAV, FLAC, ...) to `f32` samples. The
//! detectors work on one channel: for multi-channel input channel 0 is kept
//! and a warning is logged.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::DetectionError;
use crate::signal::Signal;

fn decoding_error(path: &Path, err: impl std::fmt::Display) -> DetectionError {
    DetectionError::DecodingError(format!("{}: {}", path.display(), err))
}

/// Decode an audio file into a mono [`Signal`]
///
/// # Errors
///
/// `IoFailure` if the file cannot be opened, `DecodingError` if no audio track
/// can be decoded, `DegenerateSignal` if it decodes to no samples.
pub fn decode_audio(path: impl AsRef<Path>) -> Result<Signal, DetectionError> {
    let path = path.as_ref();
    log::debug!("Decoding audio file: {}", path.display());

    let src = File::open(path)
        .map_err(|e| DetectionError::IoFailure(format!("{}: {}", path.display(), e)))?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| decoding_error(path, e))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| decoding_error(path, "no supported audio track"))?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| decoding_error(path, "unknown sample rate"))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| decoding_error(path, e))?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut warned_channels = false;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(decoding_error(path, e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                // corrupted packet, keep going
                log::warn!("{}: skipping undecodable packet: {}", path.display(), e);
                continue;
            }
            Err(e) => return Err(decoding_error(path, e)),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);
        if channels > 1 && !warned_channels {
            log::warn!(
                "{}: {} channels, analyzing channel 0 only",
                path.display(),
                channels
            );
            warned_channels = true;
        }

        let buf = sample_buf
            .get_or_insert_with(|| SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
        if buf.capacity() < decoded.capacity() * channels {
            *buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        }
        buf.copy_interleaved_ref(decoded);
        samples.extend(buf.samples().iter().step_by(channels).copied());
    }

    log::debug!(
        "Decoded {} samples at {} Hz from {}",
        samples.len(),
        sample_rate,
        path.display()
    );

    Signal::new(samples, sample_rate)
}
