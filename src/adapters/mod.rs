//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements             | Connects to                  |
//! |------------|------------------------|------------------------------|
//! | `console`  | (command source)       | stdin → embassy-sync channel |
//! | `host`     | HapticPort             | log output (simulated)       |
//! |            | NotificationDispatcher | log output (simulated)       |
//! |            | LocationPort           | fixed position from config   |
//! |            | SpeechPort             | log output (simulated)       |
//! | `log_sink` | EventSink              | `log` facade                 |
//! | `store`    | ProfileStore           | postcard file / in-memory    |
//! |            | StoragePort            |                              |
//! | `time`     | (clock)                | `std::time::Instant`         |

pub mod console;
pub mod host;
pub mod log_sink;
pub mod store;
pub mod time;
