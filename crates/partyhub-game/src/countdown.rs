//! The game clock, counted in whole steps.
//!
//! Remaining time is derived from an integer step count so repeated
//! subtraction never accumulates float error: 30.0 with a 0.5 step is
//! exactly 60 steps, and the last snapshot reports exactly `0.0`.

/// What the timer should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Time was left; publish a snapshot with this much remaining.
    Snapshot(f32),
    /// The clock was already at zero; publish `Finish`.
    Finish,
    /// `Finish` has already been produced.
    Done,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    step: f32,
    steps_left: u32,
    finished: bool,
}

impl Countdown {
    /// A clock starting at `start_time` and losing `step` per tick.
    ///
    /// `start_time` is rounded to a whole number of steps. A non-positive
    /// `step` yields a clock that is already at zero.
    pub fn new(start_time: f32, step: f32) -> Self {
        let steps_left = if step > 0.0 && start_time > 0.0 {
            (start_time / step).round() as u32
        } else {
            0
        };
        Self {
            step,
            steps_left,
            finished: false,
        }
    }

    /// Seconds left on the clock.
    pub fn remaining(&self) -> f32 {
        self.steps_left as f32 * self.step
    }

    pub fn steps_left(&self) -> u32 {
        self.steps_left
    }

    /// Advances the clock by one tick.
    pub fn tick(&mut self) -> Step {
        if self.finished {
            return Step::Done;
        }
        if self.steps_left > 0 {
            self.steps_left -= 1;
            Step::Snapshot(self.remaining())
        } else {
            self.finished = true;
            Step::Finish
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_clock_produces_sixty_snapshots_then_finish() {
        let mut clock = Countdown::new(30.0, 0.5);
        let mut remaining = Vec::new();
        loop {
            match clock.tick() {
                Step::Snapshot(r) => remaining.push(r),
                Step::Finish => break,
                Step::Done => panic!("Done before Finish"),
            }
        }
        assert_eq!(remaining.len(), 60);
        assert_eq!(remaining[0], 29.5);
        assert_eq!(remaining[59], 0.0);
        assert!(remaining.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(clock.tick(), Step::Done);
    }

    #[test]
    fn test_remaining_is_exact() {
        let mut clock = Countdown::new(30.0, 0.5);
        for _ in 0..20 {
            clock.tick();
        }
        assert_eq!(clock.remaining(), 20.0);
        assert_eq!(clock.steps_left(), 40);
    }

    #[test]
    fn test_zero_start_finishes_immediately() {
        let mut clock = Countdown::new(0.0, 0.5);
        assert_eq!(clock.tick(), Step::Finish);
        assert_eq!(clock.tick(), Step::Done);
    }

    #[test]
    fn test_non_positive_step_is_already_expired() {
        let mut clock = Countdown::new(30.0, 0.0);
        assert_eq!(clock.remaining(), 0.0);
        assert_eq!(clock.tick(), Step::Finish);
    }
}
