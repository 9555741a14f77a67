use std::{sync::Arc, time::Duration};

use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    journal::Journal,
    timer::display::StatusRenderer,
    utils::{
        clock::Clock,
        time::{format_duration, TimeOfDay},
    },
};

/// Length of a plain workday in hours. Breaks, overtime and freetime are
/// applied on top of it.
pub const DEFAULT_SHIFT_HOURS: i32 = 8;

pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(10);

/// Validated timer inputs, handed over by the CLI layer.
#[derive(Debug, Clone, Copy)]
pub struct TimerConfig {
    /// Moment the workday started. Defaults to the current time.
    pub start: TimeOfDay,
    /// Total break length, added to the timer.
    pub breaktime: TimeOfDay,
    /// Overtime to work off, added to the timer.
    pub overtime: TimeOfDay,
    /// Accumulated credit, subtracted from the timer.
    pub freetime: TimeOfDay,
    pub verbose: bool,
}

impl TimerConfig {
    /// End of the workday: start plus the default shift, plus breaks and
    /// overtime, minus freetime. Wraps around midnight.
    pub fn end_time(&self) -> TimeOfDay {
        self.start.add_offset(
            DEFAULT_SHIFT_HOURS + self.breaktime.hour() as i32 + self.overtime.hour() as i32
                - self.freetime.hour() as i32,
            self.breaktime.minute() as i32 + self.overtime.minute() as i32
                - self.freetime.minute() as i32,
        )
    }
}

/// Drives the countdown: one status line per tick until cancelled.
///
/// The engine only transitions to its terminal state through the
/// cancellation token; left alone it keeps ticking past the end time and
/// reports how far overdue the timer is.
pub struct TimerEngine {
    config: TimerConfig,
    end_time: TimeOfDay,
    crosses_midnight: bool,
    current_overtime_minutes: u32,
    update_interval: Duration,
    journal: Arc<Journal>,
    renderer: Box<dyn StatusRenderer>,
    clock: Box<dyn Clock>,
    shutdown: CancellationToken,
}

impl TimerEngine {
    pub fn new(
        config: TimerConfig,
        journal: Arc<Journal>,
        renderer: Box<dyn StatusRenderer>,
        clock: Box<dyn Clock>,
        shutdown: CancellationToken,
    ) -> TimerEngine {
        let end_time = config.end_time();
        let crosses_midnight = end_time < config.start;
        if crosses_midnight {
            journal.info("Ending time is at the next day.");
        }

        TimerEngine {
            config,
            end_time,
            crosses_midnight,
            current_overtime_minutes: 0,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            journal,
            renderer,
            clock,
            shutdown,
        }
    }

    pub fn end_time(&self) -> TimeOfDay {
        self.end_time
    }

    pub fn crosses_midnight(&self) -> bool {
        self.crosses_midnight
    }

    pub fn current_overtime_minutes(&self) -> u32 {
        self.current_overtime_minutes
    }

    /// Runs the display loop until the shutdown token fires.
    pub async fn run(mut self) {
        self.journal
            .info(&format!("Started timer for configuration {:?}.", self.config));
        let now = TimeOfDay::from_datetime(self.clock.now());
        self.journal.info(&format!(
            "Timer runs out at {} in {}.",
            self.end_time,
            format_duration(now, self.end_time)
        ));

        loop {
            let now = TimeOfDay::from_datetime(self.clock.now());
            let line = self.tick(now);
            self.renderer.render(&line);
            debug!("Tick at {now}: {line}");

            if self.suspend(&line).await.is_err() {
                break;
            }
        }

        self.journal.info("Exited timer.");
        self.renderer.finish();
    }

    /// Computes the status line for `now` and updates the rollover and
    /// overtime state.
    fn tick(&mut self, now: TimeOfDay) -> String {
        if now < self.end_time || self.crosses_midnight {
            format!(
                "Timer runs out at {} in {}.",
                self.end_time,
                format_duration(now, self.end_time)
            )
        } else if now > self.end_time {
            // Overwritten with a fresh value every tick, not accumulated.
            self.current_overtime_minutes = now.minute_of_day() - self.end_time.minute_of_day();
            format!(
                "Timer already ran out at {}, {} ago.",
                self.end_time,
                format_duration(self.end_time, now)
            )
        } else {
            self.crosses_midnight = false;
            "Timer is over right now!".to_string()
        }
    }

    /// Waits out the update interval, racing the shutdown token. Verbose
    /// mode re-renders the line once per second with a sub-countdown.
    async fn suspend(&mut self, line: &str) -> Result<(), Stopped> {
        if self.config.verbose {
            let seconds = self.update_interval.as_secs();
            for elapsed in 0..seconds {
                self.renderer
                    .render(&format!("{line} Sleeping for {} seconds.", seconds - elapsed));
                select! {
                    _ = self.shutdown.cancelled() => return Err(Stopped),
                    _ = self.clock.sleep(Duration::from_secs(1)) => {}
                }
            }
        } else {
            select! {
                _ = self.shutdown.cancelled() => return Err(Stopped),
                _ = self.clock.sleep(self.update_interval) => {}
            }
        }
        Ok(())
    }
}

struct Stopped;
