//! monosynth - play a monophonic synthesizer from the computer keyboard
//!
//! Run with: cargo run
//!
//! Optional arguments: a waveform name (sine, square, triangle, analog-saw,
//! digital-saw, noise) followed by an output device name.

mod app;
mod ui;

use app::Monosynth;
use color_eyre::eyre::WrapErr;
use monosynth::dsp::WaveformKind;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    app::init_logging();

    let mut args = std::env::args().skip(1);
    let mut synth = Monosynth::new();

    if let Some(waveform) = args.next() {
        let waveform: WaveformKind = waveform.parse().wrap_err("invalid waveform argument")?;
        synth = synth.waveform(waveform);
    }
    if let Some(device) = args.next() {
        synth = synth.device(device);
    }

    synth.run()
}
