//! Runs a [`PulseMonitor`] on real peripherals.

use crate::{
    actuator::ActuatorSync,
    display::{self, Frame, Screen},
    hal::*,
    time::*,
    PulseMonitor, Tick,
};

/// The board capabilities used by [`PulseDevice`].
pub struct Peripherals<S, C, L, B, D, G> {
    pub sensor: S,
    pub clock: C,
    pub leds: L,
    pub buzzer: B,
    pub display: D,
    pub log: G,
}

/// Owns the pipeline together with the peripherals it reads from and drives.
///
/// # Type parameters:
///
/// - `W` - moving average window buffer, see [`PulseMonitor`]
/// - `S`, `C`, `L`, `B`, `D`, `G` - sensor, clock, indicators, buzzer, display and log sink
pub struct PulseDevice<W, S, C, L, B, D, G>
where
    W: AsRef<[u16]> + AsMut<[u16]>,
{
    monitor: PulseMonitor<W>,
    actuator: ActuatorSync,
    screen: Screen,
    io: Peripherals<S, C, L, B, D, G>,
}

impl<W, S, C, L, B, D, G> PulseDevice<W, S, C, L, B, D, G>
where
    W: AsRef<[u16]> + AsMut<[u16]>,
    S: Sensor,
    C: Clock,
    L: Indicators,
    B: Tone,
    D: TextDisplay,
    G: LogSink,
{
    pub fn new(monitor: PulseMonitor<W>, io: Peripherals<S, C, L, B, D, G>) -> Self {
        Self {
            actuator: ActuatorSync::new(monitor.config().actuator, Timestamp::ZERO),
            monitor,
            screen: Screen::new(),
            io,
        }
    }

    pub fn monitor(&self) -> &PulseMonitor<W> {
        &self.monitor
    }

    pub fn actuator(&self) -> &ActuatorSync {
        &self.actuator
    }

    pub fn peripherals(&self) -> &Peripherals<S, C, L, B, D, G> {
        &self.io
    }

    pub fn release(self) -> Peripherals<S, C, L, B, D, G> {
        self.io
    }

    /// Startup sequence: silence the indicators, chirp, let the sensor settle, prime the moving
    /// average and start calibrating.
    pub fn start(&mut self) {
        let config = self.monitor.config().startup;
        let actuator = self.monitor.config().actuator;
        let io = &mut self.io;

        self.screen.show(&mut io.display, Frame::startup());

        for index in 0..io.leds.len() {
            io.leds.set_indicator(index, false);
        }

        io.buzzer.set_tone(true, actuator.buzzer_frequency_hz);
        io.clock.pause(config.chirp);
        io.buzzer.set_tone(false, actuator.buzzer_frequency_hz);

        for _ in 0..config.warmup_samples {
            io.sensor.read_sample();
            io.clock.pause(config.warmup_pause);
        }

        let window = self.monitor.window_len();
        let sensor = &mut io.sensor;
        let clock = &mut io.clock;
        let samples = (0..window).map(|_| {
            let sample = sensor.read_sample();
            clock.pause(config.prime_pause);
            sample
        });
        self.monitor.prime(samples);

        let now = io.clock.now();
        self.monitor.start_calibration(now);
        self.actuator = ActuatorSync::new(actuator, now);

        log::info!("started at {}ms", now.raw());
    }

    /// Runs one pass of the pipeline and updates every output.
    pub fn tick(&mut self) -> Tick {
        let io = &mut self.io;
        let now = io.clock.now();
        let sample = io.sensor.read_sample();

        let tick = self.monitor.process(now, sample);

        self.actuator.update(
            now,
            tick.bpm,
            self.monitor.last_beat(),
            &mut io.leds,
            &mut io.buzzer,
        );

        let scheduler = self.monitor.scheduler();
        let frame = Frame::for_state(
            scheduler.state(),
            scheduler.elapsed(now),
            scheduler.phase_duration(),
            tick.bpm,
        );
        self.screen.show(&mut io.display, frame);

        io.log.log_line(&display::telemetry(
            tick.raw,
            tick.filtered,
            tick.threshold,
            tick.bpm,
        ));

        tick
    }

    /// Starts the device and runs it forever.
    pub fn run(&mut self) -> ! {
        self.start();
        let pause = self.monitor.config().startup.tick_pause;
        loop {
            self.tick();
            self.io.clock.pause(pause);
        }
    }
}
