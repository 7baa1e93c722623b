use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState
{
        #[default]
        Idle,
        Running,
        Stopped,
}

/// Frame scheduler. Each drawn frame asks for the next one while running;
/// once stopped, no further frames are scheduled.
#[derive(Debug, Default)]
pub struct RenderLoop
{
        state: LoopState,
        frames: u64,
        elapsed: Duration,
}

impl RenderLoop
{
        pub fn new() -> Self
        {
                Self::default()
        }

        /// Starts the loop. Returns `false` if it was already started or has
        /// been stopped.
        pub fn start(&mut self) -> bool
        {
                if self.state != LoopState::Idle
                {
                        return false;
                }

                self.state = LoopState::Running;
                true
        }

        /// Advances one frame. Returns whether the frame should be drawn and
        /// the next one scheduled.
        pub fn tick(
                &mut self,
                dt: Duration,
        ) -> bool
        {
                if self.state != LoopState::Running
                {
                        return false;
                }

                self.frames += 1;
                self.elapsed += dt;
                true
        }

        pub fn stop(&mut self)
        {
                self.state = LoopState::Stopped;
        }

        pub fn state(&self) -> LoopState
        {
                self.state
        }

        pub fn is_running(&self) -> bool
        {
                self.state == LoopState::Running
        }

        pub fn frames(&self) -> u64
        {
                self.frames
        }

        pub fn elapsed(&self) -> Duration
        {
                self.elapsed
        }
}

#[cfg(test)]
mod tests
{
        use super::*;

        const FRAME: Duration = Duration::from_millis(16);

        #[test]
        fn idle_loop_does_not_tick()
        {
                let mut render_loop = RenderLoop::new();

                assert!(!render_loop.tick(FRAME));
                assert_eq!(render_loop.frames(), 0);
        }

        #[test]
        fn running_loop_counts_frames()
        {
                let mut render_loop = RenderLoop::new();
                assert!(render_loop.start());
                assert!(!render_loop.start());

                for _ in 0..3
                {
                        assert!(render_loop.tick(FRAME));
                }

                assert_eq!(render_loop.frames(), 3);
                assert_eq!(render_loop.elapsed(), FRAME * 3);
        }

        #[test]
        fn stopped_loop_stays_stopped()
        {
                let mut render_loop = RenderLoop::new();
                render_loop.start();
                render_loop.stop();

                assert!(!render_loop.tick(FRAME));
                assert!(!render_loop.start());
                assert_eq!(render_loop.state(), LoopState::Stopped);
        }
}
