//! Focus command: a terminal focus/break timer.
//!
//! The timer loop runs on a current-thread tokio runtime, so every session
//! mutation happens on one thread. A 1 Hz interval wakes the loop; the number
//! of seconds to apply comes from a [`Metronome`] over a monotonic clock, so
//! late or coalesced wakeups neither drop nor repeat seconds.

use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::time::MissedTickBehavior;

use fr_core::{FocusEvent, FocusSession, FocusState, Metronome, Notifier};

/// Drives a session through a fixed number of focus intervals.
///
/// The command line guarantees at least one cycle.
pub struct FocusRunner<N> {
    session: FocusSession<N>,
    cycles: u32,
    metronome: Metronome,
}

impl<N: Notifier> FocusRunner<N> {
    pub fn new(session: FocusSession<N>, cycles: u32) -> Self {
        Self {
            session,
            cycles,
            metronome: Metronome::new(Duration::from_secs(1)),
        }
    }

    pub const fn session(&self) -> &FocusSession<N> {
        &self.session
    }

    /// Starts the first focus interval at monotonic offset `at`.
    pub fn start<W: Write>(&mut self, writer: &mut W, at: Duration) -> Result<()> {
        self.session.start_focus();
        self.metronome.start(at);
        writeln!(
            writer,
            "Focus 1/{} started ({})",
            self.cycles,
            self.session.formatted_remaining()
        )?;
        Ok(())
    }

    /// Applies the seconds elapsed up to `at`. Returns `true` once every
    /// requested cycle (and its break) is done.
    pub fn on_elapsed<W: Write>(&mut self, writer: &mut W, at: Duration) -> Result<bool> {
        let due = self.metronome.poll(at);
        let mut remaining = due;
        while remaining > 0 {
            let before = self.session.remaining();
            let step = remaining.min(u64::from(before.max(1)));
            remaining -= step;
            for event in self.session.advance(step) {
                self.report(writer, event)?;
            }
            if self.session.state() == FocusState::Idle {
                if self.session.completed_cycles() >= self.cycles {
                    self.metronome.stop();
                    writeln!(writer, "Done: {} focus interval(s) completed", self.cycles)?;
                    return Ok(true);
                }
                self.session.start_focus();
                writeln!(
                    writer,
                    "Focus {}/{} started ({})",
                    self.session.completed_cycles() + 1,
                    self.cycles,
                    self.session.formatted_remaining()
                )?;
            }
        }
        Ok(false)
    }

    /// Stops the session immediately. Idempotent.
    pub fn cancel(&mut self) {
        self.session.stop();
        self.metronome.stop();
    }

    fn report<W: Write>(&self, writer: &mut W, event: FocusEvent) -> Result<()> {
        match event {
            FocusEvent::FocusCompleted { completed_cycles } => writeln!(
                writer,
                "Focus {completed_cycles}/{} complete, break started ({})",
                self.cycles,
                self.session.formatted_remaining()
            )?,
            FocusEvent::RestCompleted => writeln!(writer, "Break over")?,
        }
        Ok(())
    }
}

/// Runs the timer until all cycles finish or Ctrl-C is pressed.
pub fn run<W: Write, N: Notifier>(writer: &mut W, session: FocusSession<N>, cycles: u32) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start timer runtime")?;

    let mut runner = FocusRunner::new(session, cycles);
    runtime.block_on(drive(writer, &mut runner))
}

async fn drive<W: Write, N: Notifier>(writer: &mut W, runner: &mut FocusRunner<N>) -> Result<()> {
    let origin = Instant::now();
    runner.start(writer, origin.elapsed())?;

    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if runner.on_elapsed(writer, origin.elapsed())? {
                    return Ok(());
                }
                let session = runner.session();
                eprint!(
                    "\r{:<8} {} {:>3.0}%  ",
                    session.state(),
                    session.formatted_remaining(),
                    session.progress() * 100.0
                );
            }
            result = &mut ctrl_c => {
                result.context("failed to listen for Ctrl-C")?;
                runner.cancel();
                eprintln!();
                writeln!(writer, "Stopped after {} focus interval(s)", runner.session().completed_cycles())?;
                return Ok(());
            }
        }
    }
}
