use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

const WINDOW: Duration = Duration::from_secs(1);

/// Frame-rate bookkeeping for the render loop.
///
/// Frames are counted in one-second windows; each closed window becomes the
/// displayed FPS and one sample in a bounded history used for plotting.
/// Durations are passed in rather than read from a clock.
#[derive(Clone, Debug)]
pub struct FrameStats {
    window_elapsed: Duration,
    window_frames: u32,
    displayed_fps: u32,

    total_frames: u64,
    total_time: Duration,
    total_tick_time: Duration,
    ticked_frames: u64,

    history: VecDeque<u32>,
    history_len: usize,
}

impl FrameStats {
    pub fn new(history_len: usize) -> Self {
        let history_len = history_len.max(1);
        Self {
            window_elapsed: Duration::ZERO,
            window_frames: 0,
            displayed_fps: 0,
            total_frames: 0,
            total_time: Duration::ZERO,
            total_tick_time: Duration::ZERO,
            ticked_frames: 0,
            history: VecDeque::with_capacity(history_len),
            history_len,
        }
    }

    /// Records one frame that took `frame_time` wall-clock time. `tick_time`
    /// is the time spent in the simulation, or `None` if the frame did not
    /// tick (paused); those frames count for FPS but not for tick averages.
    ///
    /// Returns the frame count of the window when this frame closes it.
    pub fn record_frame(&mut self, frame_time: Duration, tick_time: Option<Duration>) -> Option<u32> {
        self.window_frames += 1;
        self.window_elapsed += frame_time;
        self.total_frames += 1;
        self.total_time += frame_time;
        if let Some(tick_time) = tick_time {
            self.total_tick_time += tick_time;
            self.ticked_frames += 1;
        }

        if self.window_elapsed < WINDOW {
            return None;
        }

        let fps = self.window_frames;
        self.displayed_fps = fps;
        if self.history.len() == self.history_len {
            self.history.pop_front();
        }
        self.history.push_back(fps);
        self.window_frames = 0;
        self.window_elapsed = Duration::ZERO;
        Some(fps)
    }

    /// FPS of the last closed window; 0 until the first second has passed.
    pub fn displayed_fps(&self) -> u32 {
        self.displayed_fps
    }

    pub fn history(&self) -> impl ExactSizeIterator<Item = u32> + '_ {
        self.history.iter().copied()
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn average_fps(&self) -> Option<f64> {
        if self.total_time.is_zero() {
            return None;
        }
        Some(self.total_frames as f64 / self.total_time.as_secs_f64())
    }

    pub fn average_tick_time(&self) -> Option<Duration> {
        if self.ticked_frames == 0 {
            return None;
        }
        let frames = u32::try_from(self.ticked_frames).unwrap_or(u32::MAX);
        Some(self.total_tick_time / frames)
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            frames: self.total_frames,
            elapsed: self.total_time,
            average_fps: self.average_fps(),
            average_tick_time: self.average_tick_time(),
        }
    }
}

/// End-of-run report.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatsSummary {
    pub frames: u64,
    pub elapsed: Duration,
    pub average_fps: Option<f64>,
    pub average_tick_time: Option<Duration>,
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.average_fps {
            Some(fps) => write!(f, "Average FPS: {fps:.2}")?,
            None => return write!(f, "No frames were rendered."),
        }
        if let Some(tick) = self.average_tick_time {
            write!(f, ", average tick time: {:.3} ms", tick.as_secs_f64() * 1000.0)?;
        }
        write!(f, " ({} frames in {:.2} s)", self.frames, self.elapsed.as_secs_f64())
    }
}
