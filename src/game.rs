//! Game state: active piece, session phases, gravity and locking.

use crate::GameConfig;
use crate::grid::Grid;
use crate::piece::{Matrix, PieceKind, Rotation};
use crate::scoring::Scoring;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::time::Duration;

/// Current falling piece: its (possibly rotated) matrix and the grid offset of its top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub matrix: Matrix,
    pub x: i32,
    pub y: i32,
}

impl ActivePiece {
    /// Spawn orientation on row 0, horizontally centred.
    pub fn spawn(kind: PieceKind, cols: usize) -> Self {
        let matrix = kind.shape();
        let x = (cols / 2) as i32 - (matrix.size() / 2) as i32;
        Self {
            kind,
            matrix,
            x,
            y: 0,
        }
    }

    #[inline]
    pub fn collides(&self, grid: &Grid) -> bool {
        grid.collides(&self.matrix, self.x, self.y)
    }

    /// Move `dx` columns; reverted when blocked.
    pub fn shift(&mut self, grid: &Grid, dx: i32) -> bool {
        self.x += dx;
        if self.collides(grid) {
            self.x -= dx;
            return false;
        }
        true
    }

    /// Move one row down. `false` means the piece rests on something and must lock.
    pub fn step_down(&mut self, grid: &Grid) -> bool {
        self.y += 1;
        if self.collides(grid) {
            self.y -= 1;
            return false;
        }
        true
    }

    /// Fall until resting. Returns rows travelled.
    pub fn drop_to_floor(&mut self, grid: &Grid) -> u32 {
        let start = self.y;
        while !self.collides(grid) {
            self.y += 1;
        }
        self.y -= 1;
        (self.y - start).max(0) as u32
    }

    /// Rotate a quarter turn. When the new orientation is blocked, kick sideways by
    /// +1, -2, +3, -4, ... (net x+1, x-1, x+2, x-2, ...) and give up once the next
    /// offset would exceed the matrix width, restoring orientation and column.
    pub fn rotate(&mut self, grid: &Grid, dir: Rotation) -> bool {
        let original_x = self.x;
        let mut offset: i32 = 1;
        self.matrix.rotate(dir);
        while self.collides(grid) {
            self.x += offset;
            offset = -(offset + offset.signum());
            if offset > self.matrix.size() as i32 {
                self.matrix.rotate(dir.inverse());
                self.x = original_x;
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unstarted,
    Running,
    Paused,
    GameOver,
}

/// Input events dispatched into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Start,
    TogglePause,
    Restart,
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateCw,
    RotateCcw,
}

/// Notifications for the presentation layer, collected with [`Game::drain_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    PieceLocked(PieceKind),
    LinesCleared(u32),
    ScoreChanged { score: u32, lines: u32, level: u32 },
    GameOver { final_score: u32 },
}

/// Read-only view of everything a renderer needs.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub grid: &'a Grid,
    pub active: &'a ActivePiece,
    pub next: PieceKind,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub drop_interval: Duration,
    pub phase: Phase,
}

/// One play session. Owns all mutable state; every mutation goes through its methods.
#[derive(Debug)]
pub struct Game {
    grid: Grid,
    active: ActivePiece,
    next: PieceKind,
    scoring: Scoring,
    phase: Phase,
    /// Time since the last gravity step.
    drop_accumulator: Duration,
    rng: Pcg32,
    rows: usize,
    cols: usize,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(config: &GameConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        log::debug!("new session seed={seed} grid={}x{}", config.rows, config.cols);
        let mut rng = Pcg32::seed_from_u64(seed);
        let first = PieceKind::random(&mut rng);
        let next = PieceKind::random(&mut rng);
        Self {
            grid: Grid::new(config.rows, config.cols),
            active: ActivePiece::spawn(first, config.cols),
            next,
            scoring: Scoring::new(),
            phase: Phase::Unstarted,
            drop_accumulator: Duration::ZERO,
            rng,
            rows: config.rows,
            cols: config.cols,
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            grid: &self.grid,
            active: &self.active,
            next: self.next,
            score: self.scoring.score(),
            lines: self.scoring.lines(),
            level: self.scoring.level(),
            drop_interval: self.scoring.drop_interval(),
            phase: self.phase,
        }
    }

    /// Take all events raised since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn apply(&mut self, input: Input) {
        match input {
            Input::Start => self.start(),
            Input::TogglePause => self.toggle_pause(),
            Input::Restart => self.restart(),
            Input::MoveLeft => self.move_left(),
            Input::MoveRight => self.move_right(),
            Input::SoftDrop => {
                self.soft_drop();
            }
            Input::HardDrop => self.hard_drop(),
            Input::RotateCw => self.rotate_cw(),
            Input::RotateCcw => self.rotate_ccw(),
        }
    }

    pub fn start(&mut self) {
        if self.phase == Phase::Unstarted {
            log::info!("game started");
            self.phase = Phase::Running;
            self.drop_accumulator = Duration::ZERO;
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            Phase::Running => {
                log::info!("paused");
                self.phase = Phase::Paused;
            }
            Phase::Paused => {
                log::info!("resumed");
                self.phase = Phase::Running;
            }
            Phase::Unstarted | Phase::GameOver => {}
        }
    }

    /// Fresh board, score and pieces; goes straight to `Running`. No-op before the first start.
    pub fn restart(&mut self) {
        if self.phase == Phase::Unstarted {
            return;
        }
        log::info!("restart (previous score {})", self.scoring.score());
        self.grid = Grid::new(self.rows, self.cols);
        self.scoring = Scoring::new();
        self.drop_accumulator = Duration::ZERO;
        self.next = PieceKind::random(&mut self.rng);
        self.phase = Phase::Running;
        self.events.push(GameEvent::ScoreChanged {
            score: self.scoring.score(),
            lines: self.scoring.lines(),
            level: self.scoring.level(),
        });
        self.spawn_next();
    }

    pub fn move_left(&mut self) {
        if self.phase == Phase::Running {
            self.active.shift(&self.grid, -1);
        }
    }

    pub fn move_right(&mut self) {
        if self.phase == Phase::Running {
            self.active.shift(&self.grid, 1);
        }
    }

    pub fn rotate_cw(&mut self) {
        if self.phase == Phase::Running {
            self.active.rotate(&self.grid, Rotation::Clockwise);
        }
    }

    pub fn rotate_ccw(&mut self) {
        if self.phase == Phase::Running {
            self.active.rotate(&self.grid, Rotation::CounterClockwise);
        }
    }

    /// One row down now. Returns true if the piece locked instead.
    pub fn soft_drop(&mut self) -> bool {
        self.phase == Phase::Running && self.gravity_step()
    }

    pub fn hard_drop(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        let rows = self.active.drop_to_floor(&self.grid);
        log::trace!("hard drop {rows} rows");
        self.lock_piece();
        self.drop_accumulator = Duration::ZERO;
    }

    /// Advance the gravity clock by `elapsed`; drops one row once the drop interval is exceeded.
    pub fn tick(&mut self, elapsed: Duration) {
        if self.phase != Phase::Running {
            return;
        }
        self.drop_accumulator += elapsed;
        if self.drop_accumulator > self.scoring.drop_interval() {
            self.gravity_step();
        }
    }

    /// One row down, or lock when blocked. Resets the gravity clock either way.
    fn gravity_step(&mut self) -> bool {
        let locked = !self.active.step_down(&self.grid);
        if locked {
            self.lock_piece();
        }
        self.drop_accumulator = Duration::ZERO;
        locked
    }

    fn lock_piece(&mut self) {
        self.grid
            .merge(&self.active.matrix, self.active.x, self.active.y);
        self.events.push(GameEvent::PieceLocked(self.active.kind));

        let cleared = self.grid.clear_completed_lines();
        if cleared > 0 {
            let points = self.scoring.on_lines_cleared(cleared);
            log::debug!(
                "cleared {cleared} lines for {points} points (level {})",
                self.scoring.level()
            );
            self.events.push(GameEvent::LinesCleared(cleared));
            self.events.push(GameEvent::ScoreChanged {
                score: self.scoring.score(),
                lines: self.scoring.lines(),
                level: self.scoring.level(),
            });
        }
        self.spawn_next();
    }

    /// Promote the next piece, draw a new one, and end the game if the spawn is blocked.
    fn spawn_next(&mut self) {
        let kind = self.next;
        self.next = PieceKind::random(&mut self.rng);
        self.active = ActivePiece::spawn(kind, self.cols);
        if self.active.collides(&self.grid) {
            let final_score = self.scoring.score();
            log::info!("game over: score {final_score}, lines {}", self.scoring.lines());
            self.phase = Phase::GameOver;
            self.events.push(GameEvent::GameOver { final_score });
        }
    }

    #[cfg(test)]
    fn set_active_for_test(&mut self, kind: PieceKind, x: i32, y: i32) {
        self.active = ActivePiece {
            kind,
            matrix: kind.shape(),
            x,
            y,
        };
    }

    #[cfg(test)]
    fn grid_mut_for_test(&mut self) -> &mut Grid {
        &mut self.grid
    }
}
