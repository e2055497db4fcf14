#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod firmware {
    use defmt::{error, info};
    use defmt_rtt as _;
    use edge_sampler::config::{BUFFER_BYTES, END_OF_BLOCK_US, SESSION_PAUSE_MS};
    use edge_sampler::edge::{watch_edges, CONTROLLER};
    use edge_sampler::session::run_session;
    use embassy_executor::{InterruptExecutor, Spawner};
    use embassy_rp::gpio::{Input, Level, Output, Pull};
    use embassy_rp::interrupt;
    use embassy_rp::interrupt::{InterruptExt, Priority};
    use embassy_time::{Duration, Timer};

    #[cfg(feature = "dev-panic")]
    use panic_probe as _;
    #[cfg(feature = "prod-panic")]
    use panic_reset as _;

    /// High priority executor for the edge task. It preempts the thread
    /// executor, standing in for a raw GPIO interrupt handler.
    static EDGE_EXECUTOR: InterruptExecutor = InterruptExecutor::new();

    #[interrupt]
    unsafe fn SWI_IRQ_1() {
        // SAFETY: only this interrupt vector drives the executor.
        unsafe { EDGE_EXECUTOR.on_interrupt() }
    }

    #[embassy_executor::main]
    async fn main(spawner: Spawner) {
        info!("edge-sampler starting...");

        let p = embassy_rp::init(embassy_rp::config::Config::default());

        // --- Input Setup ---
        let input = Input::new(p.PIN_3, Pull::None);

        // Optional: LED toggled per session (on-board LED on Pico)
        let led = Output::new(p.PIN_25, Level::Low);

        // --- Edge executor ---
        interrupt::SWI_IRQ_1.set_priority(Priority::P1);
        let edge_spawner = EDGE_EXECUTOR.start(interrupt::SWI_IRQ_1);

        // Spawn tasks (unwrap the SpawnToken, then spawn)
        edge_spawner.spawn(edge_task(input).unwrap());
        spawner.spawn(session_task(led).unwrap());

        info!(
            "edge-sampler initialized: {} bit buffer, end of block > {}us",
            BUFFER_BYTES * 8,
            END_OF_BLOCK_US
        );
    }

    /// Edge task - delivers pin edges to the shared controller.
    #[embassy_executor::task]
    async fn edge_task(mut input: Input<'static>) {
        watch_edges(&mut input, &CONTROLLER).await
    }

    /// Session task - runs capture sessions back to back.
    #[embassy_executor::task]
    async fn session_task(mut led: Output<'static>) {
        loop {
            led.toggle();
            if let Err(e) = run_session().await {
                error!("session failed: {}", e);
            }
            Timer::after(Duration::from_millis(SESSION_PAUSE_MS)).await;
        }
    }
}

#[cfg(not(target_os = "none"))]
fn main() {}
