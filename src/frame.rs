//! Frame driver: the per-tick draw sequence and the loop's lifecycle.
//!
//! The browser side owns scheduling (`requestAnimationFrame`); this module only
//! decides what a tick draws and whether another tick should be requested.

use log::{debug, info};

use crate::error::RenderError;
use crate::quad::VERTEX_COUNT;
use crate::viewport::Viewport;

/// Values written to the shader's uniform slots for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    /// Seconds, from the animation-frame timestamp.
    pub time: f32,
    /// Canvas size in device pixels.
    pub resolution: [f32; 2],
}

impl FrameUniforms {
    pub fn at(now_ms: f64, viewport: Viewport) -> Self {
        Self {
            time: (now_ms * 0.001) as f32,
            resolution: viewport.resolution(),
        }
    }
}

/// GPU operations a tick needs. Implemented by the WebGL2 renderer.
pub trait FrameTarget {
    fn clear(&self);
    fn bind(&self);
    fn set_uniforms(&self, uniforms: &FrameUniforms);
    fn draw_triangles(&self, vertex_count: i32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

/// What the scheduler should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Request the next animation frame.
    Continue,
    /// Do not reschedule; the loop is over.
    Halt,
}

#[derive(Debug)]
pub struct FrameDriver {
    state: LoopState,
    frames: u64,
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDriver {
    pub fn new() -> Self {
        Self {
            state: LoopState::Idle,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Frames drawn since start.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Idle -> Running. Starting twice is a no-op; a stopped loop stays stopped.
    pub fn start(&mut self) -> Result<(), RenderError> {
        match self.state {
            LoopState::Idle => {
                info!("frame loop started");
                self.state = LoopState::Running;
                Ok(())
            }
            LoopState::Running => Ok(()),
            LoopState::Stopped => Err(RenderError::AlreadyStopped),
        }
    }

    pub fn stop(&mut self) {
        if self.state != LoopState::Stopped {
            info!("frame loop stopped after {} frames", self.frames);
            self.state = LoopState::Stopped;
        }
    }

    /// Draws one frame if running.
    pub fn tick<T: FrameTarget + ?Sized>(
        &mut self,
        target: &T,
        now_ms: f64,
        viewport: Viewport,
    ) -> TickOutcome {
        if self.state != LoopState::Running {
            debug!("tick ignored in state {:?}", self.state);
            return TickOutcome::Halt;
        }

        target.clear();
        target.bind();
        target.set_uniforms(&FrameUniforms::at(now_ms, viewport));
        target.draw_triangles(VERTEX_COUNT);

        self.frames += 1;
        TickOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Clear,
        Bind,
        Uniforms(FrameUniforms),
        Draw(i32),
    }

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<Call>>,
    }

    impl FrameTarget for Recorder {
        fn clear(&self) {
            self.calls.borrow_mut().push(Call::Clear);
        }
        fn bind(&self) {
            self.calls.borrow_mut().push(Call::Bind);
        }
        fn set_uniforms(&self, uniforms: &FrameUniforms) {
            self.calls.borrow_mut().push(Call::Uniforms(*uniforms));
        }
        fn draw_triangles(&self, vertex_count: i32) {
            self.calls.borrow_mut().push(Call::Draw(vertex_count));
        }
    }

    #[test]
    fn idle_driver_draws_nothing() {
        let target = Recorder::default();
        let mut driver = FrameDriver::new();
        assert_eq!(
            driver.tick(&target, 0.0, Viewport::new(10, 10)),
            TickOutcome::Halt
        );
        assert!(target.calls.borrow().is_empty());
    }

    #[test]
    fn tick_runs_the_draw_sequence_in_order() {
        let target = Recorder::default();
        let mut driver = FrameDriver::new();
        driver.start().unwrap();

        let outcome = driver.tick(&target, 1500.0, Viewport::new(800, 600));
        assert_eq!(outcome, TickOutcome::Continue);
        assert_eq!(
            *target.calls.borrow(),
            vec![
                Call::Clear,
                Call::Bind,
                Call::Uniforms(FrameUniforms {
                    time: 1.5,
                    resolution: [800.0, 600.0],
                }),
                Call::Draw(6),
            ]
        );
    }

    #[test]
    fn every_frame_is_one_six_vertex_draw() {
        let target = Recorder::default();
        let mut driver = FrameDriver::new();
        driver.start().unwrap();

        for (i, size) in [(1, 1), (1920, 1080), (3840, 2160)].into_iter().enumerate() {
            driver.tick(&target, i as f64 * 16.7, Viewport::new(size.0, size.1));
        }
        let draws: Vec<_> = target
            .calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Draw(n) => Some(*n),
                _ => None,
            })
            .collect();
        assert_eq!(draws, vec![6, 6, 6]);
        assert_eq!(driver.frames(), 3);
    }

    #[test]
    fn running_loop_keeps_rescheduling_until_stopped() {
        let target = Recorder::default();
        let mut driver = FrameDriver::new();
        driver.start().unwrap();

        let mut now = 0.0;
        for _ in 0..1000 {
            assert_eq!(
                driver.tick(&target, now, Viewport::new(4, 4)),
                TickOutcome::Continue
            );
            now += 16.0;
        }
        assert_eq!(driver.state(), LoopState::Running);

        driver.stop();
        assert_eq!(driver.tick(&target, now, Viewport::new(4, 4)), TickOutcome::Halt);
        assert_eq!(driver.frames(), 1000);
    }

    #[test]
    fn stopped_driver_cannot_restart() {
        let mut driver = FrameDriver::new();
        driver.start().unwrap();
        driver.start().unwrap();
        driver.stop();
        assert!(matches!(driver.start(), Err(RenderError::AlreadyStopped)));
        assert!(!driver.is_running());
    }
}
