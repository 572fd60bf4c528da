//! Realtime output stream.
//!
//! The audio thread owns the [`SampleSource`] and a frame clock. Each frame
//! it asks the source for one mono sample at `frame / sample_rate` seconds
//! and copies it to every device channel. The clock is atomic so the input
//! thread can timestamp key events on the same timeline.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{
    BufferSize, FromSample, SampleFormat, SizedSample, StreamConfig, SupportedBufferSize,
    SupportedStreamConfigRange,
};
use log::{error, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::io::device::OutputDevice;
use crate::synth::SampleSource;

/// Stream parameters requested from the device.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Buffers queued ahead of the device. Together with `buffer_size` this
    /// is the latency budget.
    pub buffer_count: u32,
    /// Frames per device buffer.
    pub buffer_size: u32,
}

impl SinkConfig {
    pub fn validate(&self) -> Result<()> {
        if !(8_000..=192_000).contains(&self.sample_rate) {
            return Err(Error::config(format!(
                "sample rate must be within 8000..=192000 Hz, got {}",
                self.sample_rate
            )));
        }
        if self.channels == 0 {
            return Err(Error::config("channel count must be at least 1"));
        }
        if self.buffer_count == 0 || self.buffer_size == 0 {
            return Err(Error::config(format!(
                "buffer count and size must be non-zero, got {} x {}",
                self.buffer_count, self.buffer_size
            )));
        }
        Ok(())
    }

    /// Worst-case delay between producing a sample and hearing it.
    pub fn latency(&self) -> Duration {
        let frames = u64::from(self.buffer_count) * u64::from(self.buffer_size);
        Duration::from_secs_f64(frames as f64 / f64::from(self.sample_rate.max(1)))
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channels: 1,
            buffer_count: 8,
            buffer_size: 512,
        }
    }
}

/// A running output stream. Dropping it stops playback.
pub struct AudioSink {
    _stream: cpal::Stream,
    clock: Arc<AtomicU64>,
    config: SinkConfig,
    device: OutputDevice,
}

impl AudioSink {
    /// Open `device` with `config` and start pulling samples from `source`.
    pub fn open<S>(
        device: &cpal::Device,
        info: OutputDevice,
        config: SinkConfig,
        source: S,
    ) -> Result<Self>
    where
        S: SampleSource + 'static,
    {
        config.validate()?;

        let ranges: Vec<_> = device
            .supported_output_configs()
            .map_err(Error::backend)?
            .collect();
        let Negotiated {
            format,
            config,
            buffer_size,
        } = negotiate(&ranges, &info, config)?;
        let stream_config = StreamConfig {
            channels: config.channels,
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size,
        };

        let clock = Arc::new(AtomicU64::new(0));
        let callback_clock = Arc::clone(&clock);

        let stream = match format {
            SampleFormat::F32 => build_stream::<f32, S>(device, &stream_config, source, callback_clock),
            SampleFormat::I16 => build_stream::<i16, S>(device, &stream_config, source, callback_clock),
            SampleFormat::U16 => build_stream::<u16, S>(device, &stream_config, source, callback_clock),
            other => Err(Error::config(format!("unsupported sample format {other:?}"))),
        }?;

        stream.play().map_err(Error::backend)?;

        info!(
            "stream started on {}: {} Hz, {} ch, {:?}, {} x {} frames (~{:.1} ms)",
            info.name,
            config.sample_rate,
            config.channels,
            format,
            config.buffer_count,
            config.buffer_size,
            config.latency().as_secs_f64() * 1000.0
        );

        Ok(Self {
            _stream: stream,
            clock,
            config,
            device: info,
        })
    }

    /// Seconds of audio produced since the stream started, at the negotiated
    /// sample rate.
    pub fn time(&self) -> f64 {
        self.frames() as f64 / f64::from(self.config.sample_rate)
    }

    /// Frames produced since the stream started.
    pub fn frames(&self) -> u64 {
        self.clock.load(Ordering::Acquire)
    }

    /// The stream parameters actually in use, which differ from the requested
    /// ones when the device fell back to its own format.
    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    pub fn device(&self) -> &OutputDevice {
        &self.device
    }
}

/// What the device agreed to play.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Negotiated {
    format: SampleFormat,
    config: SinkConfig,
    buffer_size: BufferSize,
}

const FORMAT_PREFERENCE: [SampleFormat; 3] = [SampleFormat::F32, SampleFormat::I16, SampleFormat::U16];

/// Pick a sample format the device supports at the requested rate and
/// channel count, preferring float. Devices that only offer their mix format
/// (shared-mode WASAPI, most CoreAudio outputs) get their default rate and
/// channel count instead; the mono signal is copied to every channel anyway.
fn negotiate(
    ranges: &[SupportedStreamConfigRange],
    info: &OutputDevice,
    requested: SinkConfig,
) -> Result<Negotiated> {
    let (range, config) = match find_range(ranges, requested.channels, requested.sample_rate) {
        Some(range) => (range, requested),
        None => {
            let fallback = SinkConfig {
                sample_rate: info.default_sample_rate,
                channels: info.default_channels,
                ..requested
            };
            let range = find_range(ranges, fallback.channels, fallback.sample_rate).ok_or_else(|| {
                Error::config(format!(
                    "{} supports neither {} ch @ {} Hz nor its default {} ch @ {} Hz",
                    info.name,
                    requested.channels,
                    requested.sample_rate,
                    fallback.channels,
                    fallback.sample_rate
                ))
            })?;
            warn!(
                "{} does not support {} ch @ {} Hz, using its default {} ch @ {} Hz",
                info.name, requested.channels, requested.sample_rate, fallback.channels, fallback.sample_rate
            );
            (range, fallback)
        }
    };

    let buffer_size = match *range.buffer_size() {
        SupportedBufferSize::Range { min, max } if !(min..=max).contains(&config.buffer_size) => {
            warn!(
                "buffer size {} outside device range {}..={}, using device default",
                config.buffer_size, min, max
            );
            BufferSize::Default
        }
        _ => BufferSize::Fixed(config.buffer_size),
    };

    Ok(Negotiated {
        format: range.sample_format(),
        config,
        buffer_size,
    })
}

fn find_range(
    ranges: &[SupportedStreamConfigRange],
    channels: u16,
    sample_rate: u32,
) -> Option<&SupportedStreamConfigRange> {
    let rate = cpal::SampleRate(sample_rate);
    FORMAT_PREFERENCE.into_iter().find_map(|format| {
        ranges.iter().find(|range| {
            range.sample_format() == format
                && range.channels() == channels
                && range.min_sample_rate() <= rate
                && rate <= range.max_sample_rate()
        })
    })
}

fn build_stream<T, S>(
    device: &cpal::Device,
    stream_config: &StreamConfig,
    mut source: S,
    clock: Arc<AtomicU64>,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
    S: SampleSource + 'static,
{
    let channels = usize::from(stream_config.channels);
    let sample_rate = f64::from(stream_config.sample_rate.0);

    device
        .build_output_stream(
            stream_config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let mut frame = clock.load(Ordering::Relaxed);
                for out in data.chunks_mut(channels) {
                    let value = T::from_sample(source.sample(frame as f64 / sample_rate));
                    out.fill(value);
                    frame += 1;
                }
                clock.store(frame, Ordering::Release);
            },
            |err| error!("audio stream error: {err}"),
            None,
        )
        .map_err(Error::backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_reference_stream() {
        let config = SinkConfig::default();
        assert_eq!(config.sample_rate, 44_100);
        assert_eq!(config.channels, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn latency_covers_all_buffers() {
        let config = SinkConfig {
            sample_rate: 48_000,
            channels: 2,
            buffer_count: 4,
            buffer_size: 240,
        };
        assert_eq!(config.latency(), Duration::from_millis(20));
    }

    #[test]
    fn rejects_bad_stream_parameters() {
        let base = SinkConfig::default();
        for bad in [
            SinkConfig { sample_rate: 0, ..base },
            SinkConfig { channels: 0, ..base },
            SinkConfig { buffer_count: 0, ..base },
            SinkConfig { buffer_size: 0, ..base },
        ] {
            assert!(matches!(bad.validate(), Err(Error::InvalidConfiguration(_))));
        }
    }

    fn speakers() -> OutputDevice {
        OutputDevice {
            name: "Speakers".into(),
            is_default: true,
            default_sample_rate: 48_000,
            default_channels: 2,
            index: 0,
        }
    }

    fn range(channels: u16, min: u32, max: u32, format: SampleFormat) -> SupportedStreamConfigRange {
        SupportedStreamConfigRange::new(
            channels,
            cpal::SampleRate(min),
            cpal::SampleRate(max),
            SupportedBufferSize::Range { min: 64, max: 4096 },
            format,
        )
    }

    #[test]
    fn prefers_float_at_the_requested_format() {
        let ranges = [
            range(1, 8_000, 96_000, SampleFormat::I16),
            range(1, 8_000, 96_000, SampleFormat::F32),
            range(2, 48_000, 48_000, SampleFormat::F32),
        ];
        let negotiated = negotiate(&ranges, &speakers(), SinkConfig::default()).unwrap();

        assert_eq!(negotiated.format, SampleFormat::F32);
        assert_eq!(negotiated.config, SinkConfig::default());
        assert_eq!(negotiated.buffer_size, BufferSize::Fixed(512));
    }

    #[test]
    fn mix_format_only_device_falls_back_to_its_default() {
        // Shared-mode outputs expose a single stereo 48 kHz range.
        let ranges = [range(2, 48_000, 48_000, SampleFormat::F32)];
        let negotiated = negotiate(&ranges, &speakers(), SinkConfig::default()).unwrap();

        assert_eq!(negotiated.format, SampleFormat::F32);
        assert_eq!(negotiated.config.channels, 2);
        assert_eq!(negotiated.config.sample_rate, 48_000);
        assert_eq!(negotiated.config.buffer_count, 8);
        assert_eq!(negotiated.config.buffer_size, 512);
    }

    #[test]
    fn fails_when_even_the_default_format_is_missing() {
        let ranges = [range(6, 96_000, 96_000, SampleFormat::F32)];
        let result = negotiate(&ranges, &speakers(), SinkConfig::default());
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn out_of_range_buffer_uses_device_default() {
        let ranges = [range(1, 8_000, 96_000, SampleFormat::F32)];
        let config = SinkConfig {
            buffer_size: 16,
            ..SinkConfig::default()
        };
        let negotiated = negotiate(&ranges, &speakers(), config).unwrap();
        assert_eq!(negotiated.buffer_size, BufferSize::Default);
    }
}
