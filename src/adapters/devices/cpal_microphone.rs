//! Microphone via cpal, encoded to 16-bit mono WAV with hound.
//!
//! `cpal::Stream` is not `Send`, so each recording owns a dedicated thread
//! that builds the stream, parks until told to stop, then drops the stream
//! (releasing the device) and hands back the encoded clip.

use crate::domain::{DeviceKind, DomainError};
use crate::ports::{AudioStream, MicrophonePort, RecordedAudio};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc as std_mpsc;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

pub const WAV_MIME_TYPE: &str = "audio/wav";
pub const WAV_FILE_NAME: &str = "recording.wav";

/// Longest clip kept. The ring buffer is sized to this, later samples are dropped.
pub const MAX_CLIP_SECS: u32 = 120;

/// cpal input device. `device_name = None` uses the host default.
pub struct CpalMicrophone {
    device_name: Option<String>,
}

impl CpalMicrophone {
    pub fn new(device_name: Option<String>) -> Self {
        Self { device_name }
    }
}

#[async_trait::async_trait]
impl MicrophonePort for CpalMicrophone {
    async fn acquire(&self) -> Result<Box<dyn AudioStream>, DomainError> {
        let device_name = self.device_name.clone();
        let (ready_tx, ready_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = std_mpsc::channel::<()>();
        let (done_tx, done_rx) = oneshot::channel();

        std::thread::Builder::new()
            .name("mic-capture".to_string())
            .spawn(move || run_capture(device_name, ready_tx, stop_rx, done_tx))
            .map_err(|e| DomainError::Device(format!("spawn capture thread: {}", e)))?;

        match ready_rx.await {
            Ok(Ok(sample_rate)) => {
                info!(sample_rate, "microphone opened");
                Ok(Box::new(CpalAudioStream {
                    stop_tx: Some(stop_tx),
                    done_rx: Some(done_rx),
                }))
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(DomainError::Device("capture thread exited".into())),
        }
    }
}

/// Handle to a running capture thread. Dropping it closes the stop channel,
/// which makes the thread drop the cpal stream.
struct CpalAudioStream {
    stop_tx: Option<std_mpsc::Sender<()>>,
    done_rx: Option<oneshot::Receiver<Result<Option<Vec<u8>>, DomainError>>>,
}

#[async_trait::async_trait]
impl AudioStream for CpalAudioStream {
    async fn finish(self: Box<Self>) -> Result<RecordedAudio, DomainError> {
        let mut this = *self;
        if let Some(stop) = this.stop_tx.take() {
            let _ = stop.send(());
        }
        let done = this
            .done_rx
            .take()
            .ok_or_else(|| DomainError::Device("recording already finished".into()))?;
        let wav = done
            .await
            .map_err(|_| DomainError::Device("capture thread exited".into()))??;

        Ok(RecordedAudio {
            chunks: wav.into_iter().collect(),
            mime_type: WAV_MIME_TYPE.to_string(),
            file_name: WAV_FILE_NAME.to_string(),
        })
    }
}

/// Stream plus the consuming half of its sample ring.
struct OpenedInput {
    stream: cpal::Stream,
    sample_rate: u32,
    samples: HeapCons<i16>,
    dropped: Arc<AtomicU64>,
}

fn run_capture(
    device_name: Option<String>,
    ready_tx: oneshot::Sender<Result<u32, DomainError>>,
    stop_rx: std_mpsc::Receiver<()>,
    done_tx: oneshot::Sender<Result<Option<Vec<u8>>, DomainError>>,
) {
    let OpenedInput {
        stream,
        sample_rate,
        mut samples,
        dropped,
    } = match open_stream(device_name.as_deref()) {
        Ok(opened) => opened,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };
    if ready_tx.send(Ok(sample_rate)).is_err() {
        return;
    }

    // Returns on explicit stop or when the handle is dropped.
    let _ = stop_rx.recv();
    drop(stream);
    debug!("microphone released");

    let dropped = dropped.load(Ordering::Relaxed);
    if dropped > 0 {
        warn!(
            dropped,
            max_secs = MAX_CLIP_SECS,
            "recording exceeded maximum length, tail discarded"
        );
    }
    let pcm: Vec<i16> = samples.pop_iter().collect();
    let result = if pcm.is_empty() {
        Ok(None)
    } else {
        encode_wav(&pcm, sample_rate).map(Some)
    };
    let _ = done_tx.send(result);
}

fn denied(reason: impl std::fmt::Display) -> DomainError {
    warn!(reason = %reason, "microphone unavailable");
    DomainError::DeviceAccessDenied {
        device: DeviceKind::Microphone,
    }
}

fn open_stream(device_name: Option<&str>) -> Result<OpenedInput, DomainError> {
    let host = cpal::default_host();
    let device = match device_name {
        Some(name) if name != "default" => host
            .input_devices()
            .map_err(denied)?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| denied(format!("device not found: {}", name)))?,
        _ => host
            .default_input_device()
            .ok_or_else(|| denied("no default input device"))?,
    };

    let supported = device.default_input_config().map_err(denied)?;
    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();
    let sample_rate = config.sample_rate.0;
    debug!(
        sample_rate,
        channels = config.channels,
        format = ?sample_format,
        "building input stream"
    );

    let capacity = (sample_rate as usize) * (MAX_CLIP_SECS as usize);
    let (producer, samples) = HeapRb::<i16>::new(capacity.max(1)).split();
    let dropped = Arc::new(AtomicU64::new(0));
    let sink = Arc::clone(&dropped);

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, producer, sink),
        SampleFormat::I16 => build_stream::<i16>(&device, &config, producer, sink),
        SampleFormat::U16 => build_stream::<u16>(&device, &config, producer, sink),
        other => {
            return Err(DomainError::Device(format!(
                "unsupported sample format {:?}",
                other
            )));
        }
    }
    .map_err(denied)?;
    stream.play().map_err(denied)?;
    Ok(OpenedInput {
        stream,
        sample_rate,
        samples,
        dropped,
    })
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut producer: HeapProd<i16>,
    dropped: Arc<AtomicU64>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    i16: FromSample<T>,
{
    let channels = usize::from(config.channels.max(1));
    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            push_frames(data, channels, &mut producer, &dropped);
        },
        |err| error!(error = %err, "microphone stream error"),
        None,
    )
}

/// Downmix interleaved frames to mono i16 and push them without blocking.
/// Frames that do not fit are counted in `dropped`.
fn push_frames<T>(data: &[T], channels: usize, producer: &mut HeapProd<i16>, dropped: &AtomicU64)
where
    T: SizedSample,
    i16: FromSample<T>,
{
    for frame in data.chunks(channels) {
        let sum: i32 = frame
            .iter()
            .map(|&s| i32::from(s.to_sample::<i16>()))
            .sum();
        let mono = (sum / frame.len() as i32) as i16;
        if producer.try_push(mono).is_err() {
            dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Encode mono 16-bit PCM as a RIFF/WAV file in memory.
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, DomainError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| DomainError::Encode(format!("wav: {}", e)))?;
        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| DomainError::Encode(format!("wav: {}", e)))?;
        }
        writer
            .finalize()
            .map_err(|e| DomainError::Encode(format!("wav: {}", e)))?;
    }
    Ok(cursor.into_inner())
}
