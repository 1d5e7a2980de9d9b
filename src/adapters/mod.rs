//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements                  | Connects to                |
//! |---------------|-----------------------------|----------------------------|
//! | `hardware`    | RangePort, AcousticPort     | HC-SR04 GPIO, ADC1         |
//! |               | ActuatorPort                | LEDC buzzer, indicator LED |
//! | `serial_sink` | EventSink                   | UART console (stdout)      |
//! | `time`        | Clock                       | ESP32 high-res timer       |

pub mod hardware;
pub mod serial_sink;
pub mod time;
