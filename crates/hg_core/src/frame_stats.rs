use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct FrameStats {
    /// Frames completed so far
    pub frames: u64,
    /// Last frame work time in milliseconds
    pub last_frame_work_time_ms: f64,
    /// Last frame idle time in milliseconds
    pub last_frame_idle_time_ms: f64,
    /// Last frame total time in milliseconds
    pub last_frame_total_time_ms: f64,
    /// Highest arena usage seen at the end of a frame, in bytes
    pub peak_arena_usage: usize,
}

impl FrameStats {
    pub fn record(&mut self, work: Duration, idle: Duration, arena_usage: usize) {
        self.frames += 1;
        self.last_frame_work_time_ms = work.as_secs_f64() * 1000.0;
        self.last_frame_idle_time_ms = idle.as_secs_f64() * 1000.0;
        self.last_frame_total_time_ms = (work + idle).as_secs_f64() * 1000.0;
        self.peak_arena_usage = self.peak_arena_usage.max(arena_usage);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_record() {
        let mut stats = FrameStats::default();
        stats.record(Duration::from_millis(4), Duration::from_millis(12), 512);
        stats.record(Duration::from_millis(10), Duration::from_millis(6), 128);

        assert_eq!(stats.frames, 2);
        assert_eq!(stats.last_frame_total_time_ms, 16.0);
        assert_eq!(stats.last_frame_work_time_ms, 10.0);
        assert_eq!(stats.peak_arena_usage, 512);
    }
}
