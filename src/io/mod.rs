// Purpose - external interfaces: audio devices, the output stream, and the
// terminal keyboard

pub mod device;
pub mod keyboard;
#[cfg(feature = "rtrb")]
pub mod scope;
pub mod sink;

pub use device::{enumerate_output_devices, open_output_device, OutputDevice};
pub use keyboard::TerminalKeyboard;
#[cfg(feature = "rtrb")]
pub use scope::ScopeTap;
pub use sink::{AudioSink, SinkConfig};
