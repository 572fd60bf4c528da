//! Monosynth - application builder and runner

use std::fs::File;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use log::info;

use monosynth::{
    dsp::WaveformKind,
    io::{enumerate_output_devices, open_output_device, AudioSink, ScopeTap, SinkConfig, TerminalKeyboard},
    synth::{KeyMap, NoteController, SynthConfig},
};

use super::ui::{UiApp, UiStatic, VIS_BUFFER_SIZE};

/// Main application builder
pub struct Monosynth {
    device: Option<String>,
    synth: SynthConfig,
    sink: SinkConfig,
    keys: KeyMap,
}

impl Monosynth {
    pub fn new() -> Self {
        Self {
            device: None,
            synth: SynthConfig::default(),
            sink: SinkConfig::default(),
            keys: KeyMap::default(),
        }
    }

    /// Play through the output device with this name instead of the first one
    pub fn device(mut self, name: impl Into<String>) -> Self {
        self.device = Some(name.into());
        self
    }

    pub fn waveform(mut self, waveform: WaveformKind) -> Self {
        self.synth.waveform = waveform;
        self
    }

    /// Run the application (takes over the terminal, plays audio)
    pub fn run(self) -> EyreResult<()> {
        self.synth.validate().wrap_err("invalid synth configuration")?;
        self.sink.validate().wrap_err("invalid stream configuration")?;

        let devices = enumerate_output_devices().wrap_err("failed to enumerate output devices")?;
        for device in &devices {
            info!("found output device: {device}");
        }

        let (device, device_info) = open_output_device(self.device.as_deref())?;

        let (mut controller, producer) = NoteController::new(self.synth)?;
        let (tap, scope_rx) = ScopeTap::new(producer, VIS_BUFFER_SIZE * 8);

        let sink = AudioSink::open(&device, device_info.clone(), self.sink, tap)
            .wrap_err("failed to start audio output")?;

        let ui_static = UiStatic {
            devices,
            device: device_info,
            sink: *sink.config(),
            synth: self.synth,
            keys: self.keys.clone(),
        };

        let mut terminal = ratatui::init();
        let result = {
            let mut keyboard = TerminalKeyboard::new(self.keys);
            let mut ui = UiApp::new(scope_rx, ui_static, keyboard.reports_releases());

            let mut result = Ok(());
            while !keyboard.quit_requested() {
                if let Some(change) = controller.poll(&mut keyboard, sink.time()) {
                    ui.note_changed(change);
                }
                ui.update(&controller, sink.time());

                if let Err(err) = terminal.draw(|frame| ui.render(frame)) {
                    result = Err(err).wrap_err("failed to draw terminal");
                    break;
                }
            }
            result
        };
        ratatui::restore();

        info!("stopped after {:.1}s", sink.time());
        result
    }
}

impl Default for Monosynth {
    fn default() -> Self {
        Self::new()
    }
}

/// The terminal belongs to the UI, so log lines go to a file instead.
///
/// Honors `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    let path = std::env::temp_dir().join("monosynth.log");
    let Ok(file) = File::create(&path) else {
        return;
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}
