use std::fmt;

use cpal::traits::{DeviceTrait, HostTrait};
use log::{debug, info};

use crate::error::{Error, Result};

/// An output device as seen at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputDevice {
    pub name: String,
    pub is_default: bool,
    pub default_sample_rate: u32,
    pub default_channels: u16,
    pub(crate) index: usize,
}

impl OutputDevice {
    /// Position in the host's enumeration order.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for OutputDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}ch @ {}Hz{}]",
            self.name,
            self.default_channels,
            self.default_sample_rate,
            if self.is_default { " (default)" } else { "" }
        )
    }
}

/// All output devices of the default host, in host order.
///
/// Fails with [`Error::NoDeviceAvailable`] when the host reports none.
pub fn enumerate_output_devices() -> Result<Vec<OutputDevice>> {
    Ok(scan_output_devices()?
        .into_iter()
        .map(|(_, info)| info)
        .collect())
}

/// Open the output device called `name`, or the first enumerated device when
/// `name` is `None`.
pub fn open_output_device(name: Option<&str>) -> Result<(cpal::Device, OutputDevice)> {
    let mut devices = scan_output_devices()?;

    let position = match name {
        Some(wanted) => devices
            .iter()
            .position(|(_, info)| info.name == wanted)
            .ok_or_else(|| Error::DeviceNotFound(wanted.to_string()))?,
        None => 0,
    };

    let (device, info) = devices.swap_remove(position);
    info!("using output device {info}");
    Ok((device, info))
}

fn scan_output_devices() -> Result<Vec<(cpal::Device, OutputDevice)>> {
    let host = cpal::default_host();
    let default_name = host.default_output_device().and_then(|d| d.name().ok());

    let mut found = Vec::new();
    for device in host.output_devices().map_err(Error::backend)? {
        let name = device.name().unwrap_or_else(|_| "Unknown Device".to_string());

        // Devices that cannot report a default config cannot be opened either.
        let config = match device.default_output_config() {
            Ok(config) => config,
            Err(err) => {
                debug!("skipping output device {name}: {err}");
                continue;
            }
        };

        let info = OutputDevice {
            is_default: default_name.as_deref() == Some(name.as_str()),
            name,
            default_sample_rate: config.sample_rate().0,
            default_channels: config.channels(),
            index: found.len(),
        };
        found.push((device, info));
    }

    if found.is_empty() {
        return Err(Error::NoDeviceAvailable);
    }

    info!("found {} output device(s) on {:?}", found.len(), host.id());
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_marks_default_device() {
        let device = OutputDevice {
            name: "Speakers".to_string(),
            is_default: true,
            default_sample_rate: 48_000,
            default_channels: 2,
            index: 0,
        };
        assert_eq!(device.to_string(), "Speakers [2ch @ 48000Hz (default)]");
    }
}
