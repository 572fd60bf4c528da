//! Spectrum analyzer widget
//!
//! FFT of the scope buffer, plotted against log10(frequency) so each octave
//! of the keyboard gets the same width.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Points plotted across the frequency axis
const SPECTRUM_POINTS: usize = 64;
const MIN_FREQ: f64 = 20.0;
const FLOOR_DB: f64 = -100.0;

pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    /// Hann window coefficients
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    /// FFT bin read for each plotted point
    bins: Vec<usize>,
    /// (log10 Hz, dB) per plotted point
    points: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(size: usize, sample_rate: f32) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(size);

        let denom = size.saturating_sub(1).max(1) as f32;
        let window = (0..size)
            .map(|i| 0.5 - 0.5 * (std::f32::consts::TAU * i as f32 / denom).cos())
            .collect();

        let nyquist = f64::from(sample_rate) / 2.0;
        let (lo, hi) = (MIN_FREQ.log10(), nyquist.max(MIN_FREQ * 2.0).log10());
        let last_bin = (size / 2).saturating_sub(1);

        let mut bins = Vec::with_capacity(SPECTRUM_POINTS);
        let mut points = Vec::with_capacity(SPECTRUM_POINTS);
        for i in 0..SPECTRUM_POINTS {
            let log_freq = lo + (hi - lo) * i as f64 / (SPECTRUM_POINTS - 1) as f64;
            let hz = 10f64.powf(log_freq);
            let bin = (hz * size as f64 / f64::from(sample_rate)).round() as usize;
            bins.push(bin.min(last_bin));
            points.push((log_freq, FLOOR_DB));
        }

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); size],
            bins,
            points,
        }
    }

    /// Recompute from the latest samples. Ignored unless `buffer` is exactly
    /// one FFT frame long.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        for (point, &bin) in self.points.iter_mut().zip(&self.bins) {
            let power = f64::from(self.scratch[bin].norm_sqr()).max(1e-12);
            point.1 = (10.0 * power.log10()).max(FLOOR_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.points
    }
}

/// Render the spectrum, with a marker at the sounding note's fundamental
pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)], fundamental: f64) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let x_min = spectrum.first().map_or(MIN_FREQ.log10(), |p| p.0);
    let x_max = spectrum.last().map_or(4.0, |p| p.0).max(x_min + 1.0);
    let y_max = spectrum.iter().map(|p| p.1).fold(0.0, f64::max) + 10.0;

    let marker: Vec<(f64, f64)> = if fundamental > 0.0 {
        let x = fundamental.log10();
        vec![(x, FLOOR_DB), (x, y_max)]
    } else {
        Vec::new()
    };

    let datasets = vec![
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(spectrum),
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Yellow))
            .data(&marker),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([x_min, x_max])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, y_max])
                .labels(vec!["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
