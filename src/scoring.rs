//! Score, line count, level and gravity pacing.

use std::time::Duration;

/// Base points for clearing 1, 2, 3 or 4 lines at once; multiplied by the level.
pub const LINE_POINTS: [u32; 4] = [40, 100, 300, 1200];

/// Lines needed to advance one level.
pub const LINES_PER_LEVEL: u32 = 10;

/// Gravity interval at level 1.
pub const BASE_DROP_INTERVAL: Duration = Duration::from_millis(1000);

/// Interval multiplier per level gained.
const SPEEDUP: f64 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub struct Scoring {
    score: u32,
    lines: u32,
    level: u32,
    drop_interval: Duration,
}

impl Scoring {
    pub fn new() -> Self {
        Self {
            score: 0,
            lines: 0,
            level: 1,
            drop_interval: BASE_DROP_INTERVAL,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn drop_interval(&self) -> Duration {
        self.drop_interval
    }

    /// Apply a clear of `n` lines. The level is recomputed first, so the clear that
    /// crosses a level boundary already scores at the new level. Returns the points awarded.
    pub fn on_lines_cleared(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.lines = self.lines.saturating_add(n);
        self.level = self.lines / LINES_PER_LEVEL + 1;
        let base = LINE_POINTS[(n.min(4) - 1) as usize];
        let points = base.saturating_mul(self.level);
        self.score = self.score.saturating_add(points);
        self.drop_interval = drop_interval_for_level(self.level);
        points
    }
}

impl Default for Scoring {
    fn default() -> Self {
        Self::new()
    }
}

/// 1000 ms * 0.8^(level-1), no lower clamp.
pub fn drop_interval_for_level(level: u32) -> Duration {
    let exp = level.saturating_sub(1).min(i32::MAX as u32) as i32;
    BASE_DROP_INTERVAL.mul_f64(SPEEDUP.powi(exp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_scoring() {
        let s = Scoring::new();
        assert_eq!((s.score(), s.lines(), s.level()), (0, 0, 1));
        assert_eq!(s.drop_interval(), Duration::from_millis(1000));
    }

    #[test]
    fn test_zero_lines_is_noop() {
        let mut s = Scoring::new();
        assert_eq!(s.on_lines_cleared(0), 0);
        assert_eq!(s, Scoring::new());
    }

    #[test]
    fn test_single_at_level_one() {
        let mut s = Scoring::new();
        assert_eq!(s.on_lines_cleared(1), 40);
        assert_eq!(s.score(), 40);
        assert_eq!(s.lines(), 1);
    }

    #[test]
    fn test_tetris_at_level_one() {
        let mut s = Scoring::new();
        assert_eq!(s.on_lines_cleared(4), 1200);
        assert_eq!(s.score(), 1200);
    }

    #[test]
    fn test_double_and_triple() {
        let mut s = Scoring::new();
        assert_eq!(s.on_lines_cleared(2), 100);
        assert_eq!(s.on_lines_cleared(3), 300);
        assert_eq!(s.score(), 400);
        assert_eq!(s.lines(), 5);
    }

    #[test]
    fn test_level_up_applies_before_multiplier() {
        let mut s = Scoring::new();
        s.on_lines_cleared(4);
        s.on_lines_cleared(4);
        assert_eq!(s.level(), 1);
        // 8 -> 11 lines crosses into level 2: 300 * 2.
        assert_eq!(s.on_lines_cleared(3), 600);
        assert_eq!(s.level(), 2);
        assert_eq!(s.score(), 1200 + 1200 + 600);
    }

    #[test]
    fn test_drop_interval_shrinks_with_level() {
        let mut s = Scoring::new();
        for _ in 0..5 {
            s.on_lines_cleared(2);
        }
        assert_eq!(s.level(), 2);
        assert_eq!(s.drop_interval(), Duration::from_millis(800));
        assert_eq!(drop_interval_for_level(3), Duration::from_millis(640));
        let mut prev = drop_interval_for_level(1);
        for level in 2..40 {
            let next = drop_interval_for_level(level);
            assert!(next < prev);
            assert!(next > Duration::ZERO);
            prev = next;
        }
    }
}
