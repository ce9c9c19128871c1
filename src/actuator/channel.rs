// Actuator channels - byte sinks for output codes
//
// The external device only has to accept one byte at a time. Hardware is
// reached through a serial port (9600 8N1 unless configured otherwise);
// dry runs write to a plain file and tests use MemoryChannel.

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::ActuatorError;

/// How the configured device path is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// Serial port with the configured line settings
    #[default]
    Serial,
    /// Plain file or device node, no line settings
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
}

/// Serial line settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    pub baud_rate: u32,
    /// 5 to 8
    pub data_bits: u8,
    /// 1 or 2
    pub stop_bits: u8,
    pub parity: Parity,
    /// Write timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: 8,
            stop_bits: 1,
            parity: Parity::None,
            timeout_ms: 1000,
        }
    }
}

impl SerialSettings {
    fn data_bits(&self) -> Option<serialport::DataBits> {
        match self.data_bits {
            5 => Some(serialport::DataBits::Five),
            6 => Some(serialport::DataBits::Six),
            7 => Some(serialport::DataBits::Seven),
            8 => Some(serialport::DataBits::Eight),
            _ => None,
        }
    }

    fn stop_bits(&self) -> Option<serialport::StopBits> {
        match self.stop_bits {
            1 => Some(serialport::StopBits::One),
            2 => Some(serialport::StopBits::Two),
            _ => None,
        }
    }

    fn parity(&self) -> serialport::Parity {
        match self.parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        }
    }

    /// Short form such as `9600 8N1`
    pub fn describe(&self) -> String {
        let parity = match self.parity {
            Parity::None => 'N',
            Parity::Odd => 'O',
            Parity::Even => 'E',
        };
        format!(
            "{} {}{}{}",
            self.baud_rate, self.data_bits, parity, self.stop_bits
        )
    }
}

/// Byte-oriented output channel
pub trait ActuatorChannel: Send {
    /// Write and flush exactly one code
    fn write_code(&mut self, code: u8) -> Result<(), ActuatorError>;

    /// Human-readable channel name for logs
    fn describe(&self) -> String;
}

/// Channel over any writer
pub struct WriterChannel<W: Write + Send> {
    name: String,
    writer: W,
}

impl<W: Write + Send> WriterChannel<W> {
    pub fn new(name: impl Into<String>, writer: W) -> Self {
        Self {
            name: name.into(),
            writer,
        }
    }
}

impl<W: Write + Send> ActuatorChannel for WriterChannel<W> {
    fn write_code(&mut self, code: u8) -> Result<(), ActuatorError> {
        self.writer
            .write_all(&[code])
            .and_then(|()| self.writer.flush())
            .map_err(|err| ActuatorError::ChannelWriteFailure {
                code,
                reason: err.to_string(),
            })
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Channel writing to a device node or file
pub type DeviceChannel = WriterChannel<File>;

/// Open a device path for writing, once per session
///
/// # Errors
/// `ChannelUnavailable` if the path cannot be opened.
pub fn open_device<P: AsRef<Path>>(path: P) -> Result<DeviceChannel, ActuatorError> {
    let path: PathBuf = path.as_ref().to_path_buf();
    let file = OpenOptions::new()
        .write(true)
        .open(&path)
        .map_err(|err| ActuatorError::ChannelUnavailable {
            device: path.display().to_string(),
            reason: err.to_string(),
        })?;

    log::info!("[Actuator] Opened output channel {:?}", path);
    Ok(WriterChannel::new(path.display().to_string(), file))
}

/// Channel over an open serial port
pub type SerialChannel = WriterChannel<Box<dyn serialport::SerialPort>>;

/// Open a serial port with the given line settings
///
/// # Errors
/// `ChannelUnavailable` if the settings are out of range or the port cannot
/// be opened.
pub fn open_serial<P: AsRef<Path>>(
    path: P,
    settings: &SerialSettings,
) -> Result<SerialChannel, ActuatorError> {
    let device = path.as_ref().display().to_string();
    let unavailable = |reason: String| ActuatorError::ChannelUnavailable {
        device: device.clone(),
        reason,
    };

    let data_bits = settings
        .data_bits()
        .ok_or_else(|| unavailable(format!("unsupported data bits {}", settings.data_bits)))?;
    let stop_bits = settings
        .stop_bits()
        .ok_or_else(|| unavailable(format!("unsupported stop bits {}", settings.stop_bits)))?;

    let port = serialport::new(device.as_str(), settings.baud_rate)
        .data_bits(data_bits)
        .stop_bits(stop_bits)
        .parity(settings.parity())
        .flow_control(serialport::FlowControl::None)
        .timeout(Duration::from_millis(settings.timeout_ms))
        .open()
        .map_err(|err| unavailable(err.to_string()))?;

    log::info!(
        "[Actuator] Opened serial channel {} at {}",
        device,
        settings.describe()
    );
    Ok(WriterChannel::new(device.clone(), port))
}

/// Open the configured kind of channel on `path`
pub fn open_channel<P: AsRef<Path>>(
    path: P,
    kind: ChannelKind,
    settings: &SerialSettings,
) -> Result<Box<dyn ActuatorChannel>, ActuatorError> {
    match kind {
        ChannelKind::Serial => Ok(Box::new(open_serial(path, settings)?)),
        ChannelKind::File => Ok(Box::new(open_device(path)?)),
    }
}

/// In-memory channel recording every code written
///
/// Clones share the same record, so a test can keep one clone and hand the
/// other to a sink.
#[derive(Debug, Clone, Default)]
pub struct MemoryChannel {
    written: Arc<Mutex<Vec<u8>>>,
    fail_writes: bool,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A channel whose every write fails
    pub fn failing() -> Self {
        Self {
            written: Arc::default(),
            fail_writes: true,
        }
    }

    /// Codes written so far, oldest first
    pub fn written(&self) -> Vec<u8> {
        self.written
            .lock()
            .map(|codes| codes.clone())
            .unwrap_or_default()
    }
}

impl ActuatorChannel for MemoryChannel {
    fn write_code(&mut self, code: u8) -> Result<(), ActuatorError> {
        if self.fail_writes {
            return Err(ActuatorError::ChannelWriteFailure {
                code,
                reason: "channel configured to fail".to_string(),
            });
        }
        let mut codes = self
            .written
            .lock()
            .map_err(|_| ActuatorError::ChannelWriteFailure {
                code,
                reason: "memory channel lock poisoned".to_string(),
            })?;
        codes.push(code);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
