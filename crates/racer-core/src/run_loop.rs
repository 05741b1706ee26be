//! Fixed-timestep run loop with cooperative cancellation.
//!
//! The host reports how much wall-clock time passed since the last frame and
//! the loop turns that into a whole number of fixed physics ticks. Tests can
//! bypass the clock entirely with [`RunLoop::step`].

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use crate::{
    Error, Result,
    backend::GameWorld,
    config::{DEFAULT_TIMESTEP, SessionConfig},
    input::ControlState,
    session::Session,
};

/// Shared flag that stops a [`RunLoop`].
///
/// Clones observe the same flag, so any holder can request shutdown.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Accumulates frame time and hands out fixed-size steps.
#[derive(Clone, Debug)]
pub struct FixedTimestep {
    step: Duration,
    accumulated: Duration,
    max_steps: u32,
}

impl FixedTimestep {
    /// `max_steps` bounds the catch-up work done for a single frame.
    ///
    /// A `step_secs` that is not a positive, representable duration falls back
    /// to [`DEFAULT_TIMESTEP`].
    pub fn new(step_secs: f32, max_steps: u32) -> Self {
        let step = match Duration::try_from_secs_f32(step_secs) {
            Ok(step) if !step.is_zero() => step,
            _ => {
                tracing::warn!(
                    "Unusable timestep {step_secs}s, falling back to {DEFAULT_TIMESTEP}s"
                );
                Duration::from_secs_f32(DEFAULT_TIMESTEP)
            }
        };
        Self {
            step,
            accumulated: Duration::ZERO,
            max_steps: max_steps.max(1),
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn step_secs(&self) -> f32 {
        self.step.as_secs_f32()
    }

    /// Time carried over to the next frame (always less than one step).
    pub fn overstep(&self) -> Duration {
        self.accumulated
    }

    /// Add `elapsed` and return how many steps should run now.
    ///
    /// Whole steps beyond `max_steps` are dropped; the fractional remainder is kept.
    pub fn accumulate(&mut self, elapsed: Duration) -> u32 {
        self.accumulated = self.accumulated.saturating_add(elapsed);

        let mut steps = 0;
        while self.accumulated >= self.step && steps < self.max_steps {
            self.accumulated -= self.step;
            steps += 1;
        }

        if self.accumulated >= self.step {
            let step_nanos = self.step.as_nanos();
            let dropped = self.accumulated.as_nanos() / step_nanos;
            let remainder = self.accumulated.as_nanos() % step_nanos;
            // Remainder is below one step, which always fits in u64 nanoseconds.
            self.accumulated = Duration::from_nanos(u64::try_from(remainder).unwrap_or(0));
            tracing::debug!("Frame overran by {dropped} physics steps, dropping them");
        }

        steps
    }
}

/// Drives a [`Session`] at a fixed timestep until cancelled.
pub struct RunLoop {
    timestep: FixedTimestep,
    token: CancellationToken,
    ticks: u64,
}

impl RunLoop {
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_token(config, CancellationToken::new())
    }

    pub fn with_token(config: &SessionConfig, token: CancellationToken) -> Self {
        Self {
            timestep: FixedTimestep::new(config.timestep, config.max_steps_per_frame),
            token,
            ticks: 0,
        }
    }

    /// A handle that can stop this loop.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Total ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn timestep(&self) -> &FixedTimestep {
        &self.timestep
    }

    /// Run exactly one tick, ignoring the clock.
    pub fn step<V, B, W>(
        &mut self,
        session: &mut Session<V, B>,
        world: &mut W,
        controls: ControlState,
    ) -> Result<()>
    where
        V: Copy,
        B: Copy,
        W: GameWorld<Visual = V, Body = B>,
    {
        if self.token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        session.tick(world, self.timestep.step_secs(), controls);
        self.ticks += 1;
        Ok(())
    }

    /// Account for `elapsed` frame time and run the ticks it covers.
    ///
    /// Returns the number of ticks run. The same control snapshot is used for
    /// every tick of the frame.
    pub fn advance<V, B, W>(
        &mut self,
        session: &mut Session<V, B>,
        world: &mut W,
        elapsed: Duration,
        controls: ControlState,
    ) -> Result<u32>
    where
        V: Copy,
        B: Copy,
        W: GameWorld<Visual = V, Body = B>,
    {
        if self.token.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let steps = self.timestep.accumulate(elapsed);
        for _ in 0..steps {
            self.step(session, world, controls)?;
        }
        Ok(steps)
    }

    /// Drive frames from `frames` until it runs out or the loop is cancelled.
    ///
    /// Returns the total number of ticks run by this loop.
    pub fn run<V, B, W, I>(
        &mut self,
        session: &mut Session<V, B>,
        world: &mut W,
        frames: I,
    ) -> u64
    where
        V: Copy,
        B: Copy,
        W: GameWorld<Visual = V, Body = B>,
        I: IntoIterator<Item = (Duration, ControlState)>,
    {
        for (elapsed, controls) in frames {
            if self.advance(session, world, elapsed, controls).is_err() {
                tracing::info!("Run loop cancelled after {} ticks", self.ticks);
                break;
            }
        }
        self.ticks
    }
}
