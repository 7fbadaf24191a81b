use crate::analysis::{AnalysisFrame, AnalysisSource, FFT_SIZE, SharedAnalysis, SpectrumAnalyzer};
use anyhow::{Context, anyhow};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat};
use ringbuf::HeapRb;
use ringbuf::traits::{Consumer as _, Producer as _, Split as _};
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

const HOP: usize = 512;

pub fn list_input_devices() -> anyhow::Result<()> {
    let host = cpal::default_host();
    let devices = host.input_devices().context("enumerate input devices")?;

    let mut out = io::stdout();
    writeln!(out, "Input devices:")?;
    for dev in devices {
        let name = dev.name().unwrap_or_else(|_| "<unknown>".to_string());
        writeln!(out, "  - {}", name)?;
    }
    Ok(())
}

/// Live microphone capture with a background analysis thread.
pub struct AudioSystem {
    // Held for its lifetime; dropping the stream stops capture.
    _stream: cpal::Stream,
    stop: Arc<AtomicBool>,
    analyzer_handle: Option<thread::JoinHandle<()>>,
    shared: Arc<SharedAnalysis>,
    pub sample_rate_hz: u32,
}

impl AudioSystem {
    pub fn new(device_query: Option<&str>) -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = select_input_device(&host, device_query)?;
        let supported = device
            .default_input_config()
            .context("get default input config")?;
        let sample_rate_hz = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        let config: cpal::StreamConfig = supported.clone().into();
        info!(
            device = %device.name().unwrap_or_else(|_| "<unknown>".to_string()),
            sample_rate_hz,
            channels,
            "opening input stream"
        );

        let rb_capacity = (sample_rate_hz as usize).saturating_mul(2);
        let rb = HeapRb::<f32>::new(rb_capacity);
        let (mut prod, mut cons) = rb.split();

        let stop = Arc::new(AtomicBool::new(false));
        let shared = Arc::new(SharedAnalysis::new());
        let shared_for_thread = Arc::clone(&shared);
        let stop_for_thread = Arc::clone(&stop);

        let err_fn = |err| warn!("audio stream error: {err}");

        let stream = match supported.sample_format() {
            SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            SampleFormat::U16 => device.build_input_stream(
                &config,
                move |data: &[u16], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            fmt => return Err(anyhow!("unsupported sample format: {fmt:?}")),
        };

        stream.play().context("start input stream")?;

        let analyzer_handle = thread::Builder::new()
            .name("analysis".to_string())
            .spawn(move || {
                analyze_loop(&mut cons, sample_rate_hz, &stop_for_thread, &shared_for_thread)
            })
            .context("spawn analysis thread")?;

        Ok(Self {
            _stream: stream,
            stop,
            analyzer_handle: Some(analyzer_handle),
            shared,
            sample_rate_hz,
        })
    }
}

impl AnalysisSource for AudioSystem {
    fn name(&self) -> &'static str {
        "mic"
    }

    fn read(&mut self, frame: &mut AnalysisFrame) -> bool {
        self.shared.load_into(frame)
    }

    fn age_ms(&self) -> Option<f32> {
        self.shared.age_ms()
    }
}

impl Drop for AudioSystem {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(h) = self.analyzer_handle.take() {
            let _ = h.join();
        }
        debug!("audio system stopped");
    }
}

fn select_input_device(
    host: &cpal::Host,
    device_query: Option<&str>,
) -> anyhow::Result<cpal::Device> {
    let devices = host
        .input_devices()
        .context("enumerate input devices")?
        .collect::<Vec<_>>();

    let want = device_query.map(|s| s.to_lowercase());
    if let Some(want) = want.as_deref() {
        if let Some(dev) = devices.iter().find(|d| {
            d.name()
                .map(|n| n.to_lowercase().contains(want))
                .unwrap_or(false)
        }) {
            return Ok(dev.clone());
        }
        return Err(anyhow!("no input device matching: {want}"));
    }

    host.default_input_device()
        .ok_or_else(|| anyhow!("no default input device found"))
}

fn push_interleaved<T: Sample<Float = f32> + Copy>(
    data: &[T],
    channels: usize,
    prod: &mut ringbuf::HeapProd<f32>,
) {
    let channels = channels.max(1);
    for frame in data.chunks(channels) {
        let mut acc = 0.0f32;
        for s in frame {
            acc += (*s).to_float_sample();
        }
        let mono = (acc / channels as f32).clamp(-1.0, 1.0);
        let _ = prod.try_push(mono);
    }
}

fn analyze_loop(
    cons: &mut ringbuf::HeapCons<f32>,
    sample_rate_hz: u32,
    stop: &AtomicBool,
    shared: &SharedAnalysis,
) {
    let n = FFT_SIZE;
    let mut ring = vec![0.0f32; n];
    let mut write_pos = 0usize;
    let mut filled = 0usize;
    let mut since_last = 0usize;

    let mut analyzer = SpectrumAnalyzer::new(sample_rate_hz);
    let mut frame = AnalysisFrame::silent(analyzer.nyquist_hz());

    while !stop.load(Ordering::Relaxed) {
        let mut got_any = false;
        while let Some(s) = cons.try_pop() {
            got_any = true;
            ring[write_pos] = s;
            write_pos = (write_pos + 1) % n;
            if filled < n {
                filled += 1;
            }
            since_last += 1;
            if filled == n && since_last >= HOP {
                since_last = 0;
                analyzer.analyze(&ring, write_pos, &mut frame);
                shared.store(&frame);
            }
        }

        if !got_any {
            thread::sleep(Duration::from_millis(1));
        }
    }
}
