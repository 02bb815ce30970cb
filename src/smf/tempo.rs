//! Tempo timeline — the single seconds↔ticks conversion used by every
//! track.
//!
//! The map is a sorted list of (time, tempo, tick-at-that-time) points.
//! Converting in either direction walks to the enclosing segment and
//! applies `ticks = seconds · 10⁶ · tpq / µs-per-quarter` within it. The
//! writer and reader both go through one map instance, which keeps tick
//! values aligned across the tempo track and every channel track.

use crate::midi::event::{TempoChange, DEFAULT_US_PER_QUARTER};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoPoint {
    pub time: f64,
    pub us_per_quarter: u32,
    /// Accumulated (unrounded) tick position of this point.
    pub tick: f64,
}

#[derive(Debug, Clone)]
pub struct TempoMap {
    ticks_per_quarter: u16,
    points: Vec<TempoPoint>,
}

impl TempoMap {
    /// Build from generator output (tempo changes in seconds).
    pub fn from_changes(ticks_per_quarter: u16, changes: &[TempoChange]) -> Self {
        let mut sorted: Vec<TempoChange> = changes.to_vec();
        sorted.sort_by(|a, b| a.time.total_cmp(&b.time));

        let mut points = Vec::new();
        let mut time = 0.0;
        let mut tick = 0.0;
        let mut us_per_quarter = DEFAULT_US_PER_QUARTER;

        for change in &sorted {
            if change.time > time {
                tick += ticks_for(change.time - time, ticks_per_quarter, us_per_quarter);
                time = change.time;
            }
            us_per_quarter = change.us_per_quarter;
            points.push(TempoPoint {
                time,
                us_per_quarter,
                tick,
            });
        }

        if points.first().is_none_or(|p| p.time > 0.0) {
            points.insert(
                0,
                TempoPoint {
                    time: 0.0,
                    us_per_quarter: DEFAULT_US_PER_QUARTER,
                    tick: 0.0,
                },
            );
        }

        Self {
            ticks_per_quarter,
            points,
        }
    }

    /// Build from SMF tempo meta events (ticks, as read from track 0).
    pub fn from_tick_changes(ticks_per_quarter: u16, changes: &[(u64, u32)]) -> Self {
        let mut sorted: Vec<(u64, u32)> = changes.to_vec();
        sorted.sort_by_key(|&(tick, _)| tick);

        let mut points = Vec::new();
        let mut time = 0.0;
        let mut tick = 0u64;
        let mut us_per_quarter = DEFAULT_US_PER_QUARTER;

        for &(change_tick, change_us) in &sorted {
            if change_tick > tick {
                time += seconds_for(change_tick - tick, ticks_per_quarter, us_per_quarter);
                tick = change_tick;
            }
            us_per_quarter = change_us;
            points.push(TempoPoint {
                time,
                us_per_quarter,
                tick: tick as f64,
            });
        }

        if points.first().is_none_or(|p| p.tick > 0.0) {
            points.insert(
                0,
                TempoPoint {
                    time: 0.0,
                    us_per_quarter: DEFAULT_US_PER_QUARTER,
                    tick: 0.0,
                },
            );
        }

        Self {
            ticks_per_quarter,
            points,
        }
    }

    /// Absolute seconds → absolute tick, rounded to nearest.
    pub fn seconds_to_ticks(&self, seconds: f64) -> u64 {
        if seconds <= 0.0 {
            return 0;
        }
        let point = self.segment_at_time(seconds);
        let ticks = point.tick
            + ticks_for(seconds - point.time, self.ticks_per_quarter, point.us_per_quarter);
        ticks.round().max(0.0) as u64
    }

    /// Absolute tick → absolute seconds.
    pub fn ticks_to_seconds(&self, tick: u64) -> f64 {
        let point = self.segment_at_tick(tick as f64);
        point.time
            + seconds_for_f64(
                tick as f64 - point.tick,
                self.ticks_per_quarter,
                point.us_per_quarter,
            )
    }

    pub fn points(&self) -> &[TempoPoint] {
        &self.points
    }

    /// Last point at or before `seconds`; a later point at the exact same
    /// time wins, so a tempo change at t overrides earlier ones at t.
    fn segment_at_time(&self, seconds: f64) -> &TempoPoint {
        let mut current = &self.points[0];
        for point in &self.points {
            if point.time > seconds {
                break;
            }
            current = point;
        }
        current
    }

    fn segment_at_tick(&self, tick: f64) -> &TempoPoint {
        let mut current = &self.points[0];
        for point in &self.points {
            if point.tick > tick {
                break;
            }
            current = point;
        }
        current
    }
}

fn ticks_for(seconds: f64, ticks_per_quarter: u16, us_per_quarter: u32) -> f64 {
    seconds * 1_000_000.0 * ticks_per_quarter as f64 / us_per_quarter as f64
}

fn seconds_for(ticks: u64, ticks_per_quarter: u16, us_per_quarter: u32) -> f64 {
    seconds_for_f64(ticks as f64, ticks_per_quarter, us_per_quarter)
}

fn seconds_for_f64(ticks: f64, ticks_per_quarter: u16, us_per_quarter: u32) -> f64 {
    ticks * us_per_quarter as f64 / (1_000_000.0 * ticks_per_quarter as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_tempo_conversion() {
        let map = TempoMap::from_changes(480, &[TempoChange::from_bpm(0.0, 120.0)]);
        // At 120 BPM a quarter is 0.5 s = 480 ticks
        assert_eq!(map.seconds_to_ticks(0.5), 480);
        assert_eq!(map.seconds_to_ticks(1.0), 960);
        assert_eq!(map.seconds_to_ticks(0.0), 0);
    }

    #[test]
    fn no_changes_means_default_120() {
        let map = TempoMap::from_changes(480, &[]);
        assert_eq!(map.seconds_to_ticks(0.5), 480);
    }

    #[test]
    fn tempo_change_mid_score() {
        // 120 BPM for 1 s (960 ticks), then 60 BPM
        let changes = [
            TempoChange::from_bpm(0.0, 120.0),
            TempoChange::from_bpm(1.0, 60.0),
        ];
        let map = TempoMap::from_changes(480, &changes);
        assert_eq!(map.seconds_to_ticks(1.0), 960);
        // One second at 60 BPM is one quarter = 480 ticks
        assert_eq!(map.seconds_to_ticks(2.0), 1440);
    }

    #[test]
    fn change_not_at_zero_gets_default_head() {
        let changes = [TempoChange::from_bpm(2.0, 60.0)];
        let map = TempoMap::from_changes(480, &changes);
        // First 2 s at default 120 BPM = 1920 ticks
        assert_eq!(map.seconds_to_ticks(2.0), 1920);
        assert_eq!(map.seconds_to_ticks(3.0), 2400);
    }

    #[test]
    fn later_change_at_same_time_wins() {
        let changes = [
            TempoChange::from_bpm(0.0, 120.0),
            TempoChange::from_bpm(0.0, 60.0),
        ];
        let map = TempoMap::from_changes(480, &changes);
        assert_eq!(map.seconds_to_ticks(1.0), 480);
    }

    #[test]
    fn round_trip_seconds_ticks_seconds() {
        let changes = [
            TempoChange::from_bpm(0.0, 120.0),
            TempoChange::from_bpm(1.5, 90.0),
            TempoChange::from_bpm(4.0, 200.0),
        ];
        let map = TempoMap::from_changes(480, &changes);
        for &t in &[0.0, 0.3, 1.5, 2.0, 3.99, 4.0, 7.25] {
            let tick = map.seconds_to_ticks(t);
            let back = map.ticks_to_seconds(tick);
            assert!((back - t).abs() < 1e-3, "t={t} tick={tick} back={back}");
        }
    }

    #[test]
    fn tick_constructed_map_matches() {
        // 960 ticks at 120 BPM then 60 BPM
        let map = TempoMap::from_tick_changes(480, &[(0, 500_000), (960, 1_000_000)]);
        assert!((map.ticks_to_seconds(960) - 1.0).abs() < 1e-9);
        assert!((map.ticks_to_seconds(1440) - 2.0).abs() < 1e-9);
        assert_eq!(map.seconds_to_ticks(2.0), 1440);
    }

    #[test]
    fn monotone_in_time() {
        let changes = [
            TempoChange::from_bpm(0.0, 120.0),
            TempoChange::from_bpm(1.0, 240.0),
            TempoChange::from_bpm(2.0, 30.0),
        ];
        let map = TempoMap::from_changes(480, &changes);
        let mut last = 0;
        for i in 0..100 {
            let tick = map.seconds_to_ticks(i as f64 * 0.05);
            assert!(tick >= last);
            last = tick;
        }
    }
}
