use std::f64::consts::{FRAC_2_PI, FRAC_PI_2, PI, TAU};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/*
Waveform Generator
==================

Every waveform here is a pure function of (frequency, time). There is no
phase accumulator: the caller hands us absolute playback time in seconds and
we compute where in the cycle that lands.

    angular velocity  ω     = frequency · 2π       (radians / second)
    phase             φ(t)  = ω · t

Waveforms
---------

  Sine        sin φ
  Square      +1 when sin φ > 0, otherwise -1. Never 0: the zero crossing
              resolves to -1.
  Triangle    asin(sin φ) · 2/π. asin folds the sine back into straight
              lines, giving a piecewise-linear triangle.
  AnalogSaw   Additive synthesis: Σ sin(nφ)/n for n = 1..=99, scaled by 2/π.
              Only partials we explicitly add exist, so the result is
              band-limited and sounds "warm". Costs 99 sines per sample.
  DigitalSaw  Closed form ramp (2/π)·(f·π·(t mod 1/f) − π/2). One fmod,
              bright and aliased ("harsh"), very cheap.
  Noise       Uniform random in [-1, 1]. Ignores frequency and time.

Noise needs a random source. It is passed in explicitly so tests and
benchmarks can run against a seeded or scripted sequence.
*/

/// Number of partials summed by [`WaveformKind::AnalogSaw`].
///
/// Trades CPU for brightness. Callers that need a cheap saw should use
/// [`WaveformKind::DigitalSaw`].
pub const ANALOG_SAW_HARMONICS: u32 = 99;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaveformKind {
    Sine,
    Square,
    Triangle,
    #[default]
    AnalogSaw,
    DigitalSaw,
    Noise,
}

impl WaveformKind {
    pub const ALL: [WaveformKind; 6] = [
        WaveformKind::Sine,
        WaveformKind::Square,
        WaveformKind::Triangle,
        WaveformKind::AnalogSaw,
        WaveformKind::DigitalSaw,
        WaveformKind::Noise,
    ];

    /// Look up a waveform by its numeric index (0 = Sine .. 5 = Noise).
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            WaveformKind::Sine => "sine",
            WaveformKind::Square => "square",
            WaveformKind::Triangle => "triangle",
            WaveformKind::AnalogSaw => "analog-saw",
            WaveformKind::DigitalSaw => "digital-saw",
            WaveformKind::Noise => "noise",
        }
    }

    /// Instantaneous amplitude of this waveform. See [`amplitude`].
    #[inline]
    pub fn amplitude<R: RandomSource + ?Sized>(self, frequency: f64, time: f64, rng: &mut R) -> f64 {
        amplitude(frequency, time, self, rng)
    }
}

impl fmt::Display for WaveformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WaveformKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| Error::config(format!("unknown waveform '{s}'")))
    }
}

/// Source of uniformly distributed values in `[0, 1)` for noise.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

impl RandomSource for fastrand::Rng {
    #[inline]
    fn next_unit(&mut self) -> f64 {
        self.f64()
    }
}

/// Adapts a closure into a [`RandomSource`], handy for scripted sequences.
pub struct FromFn<F>(pub F);

impl<F: FnMut() -> f64> RandomSource for FromFn<F> {
    #[inline]
    fn next_unit(&mut self) -> f64 {
        (self.0)()
    }
}

/// Converts a frequency in Hz into angular velocity (radians per second).
#[inline]
pub fn angular_velocity(frequency: f64) -> f64 {
    frequency * TAU
}

/// Instantaneous amplitude in `[-1, 1]` of `kind` at `time` seconds.
pub fn amplitude<R: RandomSource + ?Sized>(
    frequency: f64,
    time: f64,
    kind: WaveformKind,
    rng: &mut R,
) -> f64 {
    let phase = angular_velocity(frequency) * time;

    match kind {
        WaveformKind::Sine => phase.sin(),
        WaveformKind::Square => {
            if phase.sin() > 0.0 {
                1.0
            } else {
                -1.0
            }
        }
        WaveformKind::Triangle => phase.sin().asin() * FRAC_2_PI,
        WaveformKind::AnalogSaw => {
            let mut sum = 0.0;
            for n in 1..=ANALOG_SAW_HARMONICS {
                let n = n as f64;
                sum += (n * phase).sin() / n;
            }
            // Partial sums overshoot near the jump (Gibbs), keep the contract.
            (sum * FRAC_2_PI).clamp(-1.0, 1.0)
        }
        WaveformKind::DigitalSaw => {
            if frequency <= 0.0 {
                return 0.0;
            }
            let period = 1.0 / frequency;
            FRAC_2_PI * (frequency * PI * time.rem_euclid(period) - FRAC_PI_2)
        }
        WaveformKind::Noise => 2.0 * rng.next_unit() - 1.0,
    }
}

/// Same as [`amplitude`] but selects the waveform by numeric index.
/// Unknown indices are silent.
pub fn amplitude_by_index<R: RandomSource + ?Sized>(
    frequency: f64,
    time: f64,
    index: u8,
    rng: &mut R,
) -> f64 {
    match WaveformKind::from_index(index) {
        Some(kind) => amplitude(frequency, time, kind, rng),
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> fastrand::Rng {
        fastrand::Rng::with_seed(7)
    }

    fn sweep() -> impl Iterator<Item = (f64, f64)> {
        [27.5, 110.0, 261.63, 440.0, 1234.5, 8000.0]
            .into_iter()
            .flat_map(|f| (0..500).map(move |i| (f, i as f64 * 0.000_731)))
    }

    #[test]
    fn periodic_waveforms_stay_in_range() {
        let mut rng = rng();
        for kind in [
            WaveformKind::Sine,
            WaveformKind::Square,
            WaveformKind::Triangle,
            WaveformKind::AnalogSaw,
            WaveformKind::DigitalSaw,
        ] {
            for (f, t) in sweep() {
                let a = amplitude(f, t, kind, &mut rng);
                assert!((-1.0..=1.0).contains(&a), "{kind} out of range: {a} at f={f} t={t}");
            }
        }
    }

    #[test]
    fn square_is_strictly_bipolar() {
        let mut rng = rng();
        for (f, t) in sweep() {
            let a = amplitude(f, t, WaveformKind::Square, &mut rng);
            assert!(a == 1.0 || a == -1.0);
        }
        // sin(0) is not greater than zero
        assert_eq!(amplitude(440.0, 0.0, WaveformKind::Square, &mut rng), -1.0);
    }

    #[test]
    fn sine_quarter_period_peaks() {
        let a = amplitude(1.0, 0.25, WaveformKind::Sine, &mut rng());
        assert!((a - 1.0).abs() < 1e-12);
    }

    #[test]
    fn triangle_is_linear_between_peaks() {
        let mut rng = rng();
        // 1 Hz: rises from 0 at t=0 to 1 at t=0.25
        let a = amplitude(1.0, 0.125, WaveformKind::Triangle, &mut rng);
        assert!((a - 0.5).abs() < 1e-9, "got {a}");
        let peak = amplitude(1.0, 0.25, WaveformKind::Triangle, &mut rng);
        assert!((peak - 1.0).abs() < 1e-6, "got {peak}");
    }

    #[test]
    fn digital_saw_ramps_over_one_period() {
        let mut rng = rng();
        let start = amplitude(100.0, 0.0, WaveformKind::DigitalSaw, &mut rng);
        let mid = amplitude(100.0, 0.005, WaveformKind::DigitalSaw, &mut rng);
        let late = amplitude(100.0, 0.0099, WaveformKind::DigitalSaw, &mut rng);
        assert!((start + 1.0).abs() < 1e-9);
        assert!(mid.abs() < 1e-9);
        assert!(late > 0.95 && late < 1.0);
    }

    #[test]
    fn digital_saw_is_silent_without_frequency() {
        assert_eq!(amplitude(0.0, 1.3, WaveformKind::DigitalSaw, &mut rng()), 0.0);
    }

    #[test]
    fn analog_saw_approximates_a_ramp() {
        let mut rng = rng();
        // Mid-cycle the ideal saw (π - φ)/2 · 2/π is 1 - φ/π.
        let a = amplitude(1.0, 0.25, WaveformKind::AnalogSaw, &mut rng);
        assert!((a - 0.5).abs() < 0.02, "got {a}");
    }

    #[test]
    fn noise_follows_the_random_source() {
        let mut values = [0.0, 0.5, 0.999_999].into_iter();
        let mut scripted = FromFn(move || values.next().unwrap_or(0.5));
        assert_eq!(amplitude(440.0, 0.1, WaveformKind::Noise, &mut scripted), -1.0);
        assert_eq!(amplitude(440.0, 0.1, WaveformKind::Noise, &mut scripted), 0.0);
        assert!(amplitude(440.0, 0.1, WaveformKind::Noise, &mut scripted) > 0.999);
    }

    #[test]
    fn seeded_noise_is_reproducible_and_bounded() {
        let mut a = fastrand::Rng::with_seed(42);
        let mut b = fastrand::Rng::with_seed(42);
        for _ in 0..1000 {
            let x = amplitude(0.0, 0.0, WaveformKind::Noise, &mut a);
            let y = amplitude(0.0, 0.0, WaveformKind::Noise, &mut b);
            assert_eq!(x, y);
            assert!((-1.0..=1.0).contains(&x));
        }
    }

    #[test]
    fn unknown_index_is_silent() {
        let mut rng = rng();
        assert_eq!(amplitude_by_index(440.0, 0.3, 6, &mut rng), 0.0);
        assert_eq!(amplitude_by_index(440.0, 0.3, 255, &mut rng), 0.0);
        assert_eq!(
            amplitude_by_index(1.0, 0.25, 0, &mut rng),
            amplitude(1.0, 0.25, WaveformKind::Sine, &mut rng)
        );
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for kind in WaveformKind::ALL {
            assert_eq!(kind.name().parse::<WaveformKind>().unwrap(), kind);
        }
        assert_eq!("Analog_Saw".parse::<WaveformKind>().unwrap(), WaveformKind::AnalogSaw);
        assert!("pulse".parse::<WaveformKind>().is_err());
    }
}
