//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements    | Connects to               |
//! |-----------------|---------------|---------------------------|
//! | `hardware`      | SensorPort    | I²C power monitors        |
//! |                 | ActuatorPort  | LEDC PWM rail switches    |
//! | `command_queue` | CommandSource | Console / bus command RX  |
//! | `log_sink`      | EventSink     | Serial log output         |
//! | `nvs`           | ConfigPort    | NVS / in-memory store     |
//! | `time`          | TickSource    | ESP32 system timer        |

pub mod command_queue;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
