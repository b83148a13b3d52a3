//! Host control loop.
//!
//! Runs due work through [`GuardianService::advance`], then sleeps until the
//! next timer deadline or console command, whichever comes first.

use std::time::Duration;

use futures_lite::future;
use log::warn;

use crate::adapters::console::{self, ConsoleCommand, HELP};
use crate::adapters::host::HostDevice;
use crate::adapters::log_sink::LogEventSink;
use crate::adapters::store::KvStore;
use crate::adapters::time::HostClock;
use crate::app::service::GuardianService;
use crate::hazard::HazardSource;

/// Everything the control loop owns.
pub struct Runtime<S> {
    pub service: GuardianService<S>,
    pub device: HostDevice,
    pub store: KvStore,
    pub sink: LogEventSink,
    pub clock: HostClock,
    /// Upper bound on a single sleep.
    pub idle: Duration,
}

enum Wake {
    Command(ConsoleCommand),
    Timer,
}

/// Drive the runtime on a local executor until `Quit` arrives.
pub fn run<S: HazardSource>(rt: Runtime<S>) -> Runtime<S> {
    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
    future::block_on(executor.run(control_loop(rt)))
}

async fn control_loop<S: HazardSource>(mut rt: Runtime<S>) -> Runtime<S> {
    loop {
        let now = rt.clock.now_ms();
        rt.service
            .advance(now, &mut rt.device, &mut rt.store, &mut rt.sink);

        let wait = rt.service.next_due().map_or(rt.idle, |due| {
            Duration::from_millis(due.saturating_sub(now)).min(rt.idle)
        });

        let wake = future::or(async { Wake::Command(console::receive().await) }, async {
            async_io_mini::Timer::after(wait).await;
            Wake::Timer
        })
        .await;

        let Wake::Command(cmd) = wake else { continue };
        match cmd {
            ConsoleCommand::Quit => break,
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Status => match serde_json::to_string_pretty(&rt.service.snapshot()) {
                Ok(json) => println!("{json}"),
                Err(e) => warn!("Status not serialisable: {e}"),
            },
            ConsoleCommand::App(cmd) => {
                let now = rt.clock.now_ms();
                if let Err(e) =
                    rt.service
                        .handle_command(cmd, now, &mut rt.device, &mut rt.store, &mut rt.sink)
                {
                    warn!("Command failed: {e}");
                }
            }
        }
    }
    rt
}
