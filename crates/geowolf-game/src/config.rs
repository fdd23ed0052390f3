//! Tunable game parameters.

use std::time::Duration;

/// Parameters of one game session. Defaults match the cadence of the live
/// game: 90-minute task deadlines, 30 m chat radius, 5-minute report
/// meetings, 1-minute auto meetings every 10 minutes.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Time a player has to finish a task after assignment.
    pub task_deadline: chrono::Duration,
    /// Missions assigned in a fresh batch.
    pub fresh_task_count: usize,
    /// Missions assigned to replace one expired task.
    pub replacement_task_count: usize,
    /// Default chat radius in meters when the sender supplies none.
    pub chat_radius_m: f64,
    /// Duration of a meeting opened by a report.
    pub report_meeting_secs: i64,
    /// Duration of auto and startup meetings.
    pub auto_meeting_secs: i64,
    /// Cadence of the recurring auto-meeting check.
    pub auto_meeting_interval: Duration,
    /// Delay after process start before the one-shot startup meeting.
    pub startup_meeting_delay: Duration,
    /// Minimum living players for an auto or startup meeting to fire.
    pub min_alive_for_meeting: usize,
    /// Cadence of the task-expiry sweep.
    pub task_sweep_interval: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            task_deadline: chrono::Duration::minutes(90),
            fresh_task_count: 3,
            replacement_task_count: 1,
            chat_radius_m: 30.0,
            report_meeting_secs: 300,
            auto_meeting_secs: 60,
            auto_meeting_interval: Duration::from_secs(600),
            startup_meeting_delay: Duration::from_secs(30),
            min_alive_for_meeting: 2,
            task_sweep_interval: Duration::from_secs(5),
        }
    }
}
