//! Piece catalog: the seven tetromino shapes, their ids and colours.

use rand::Rng;
use ratatui::style::Color;

/// Tetromino kinds (I, J, L, O, S, T, Z). Cell id is the 1-based position in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    pub const ALL: [Self; 7] = [Self::I, Self::J, Self::L, Self::O, Self::S, Self::T, Self::Z];

    /// Cell value written into the grid for this kind (1..=7).
    pub fn id(&self) -> u8 {
        match self {
            Self::I => 1,
            Self::J => 2,
            Self::L => 3,
            Self::O => 4,
            Self::S => 5,
            Self::T => 6,
            Self::Z => 7,
        }
    }

    /// Uniform pick over all seven kinds.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Fresh copy of the spawn orientation. I is 4x4, O is 2x2, the rest 3x3.
    pub fn shape(&self) -> Matrix {
        let n = self.id();
        let rows: Vec<Vec<u8>> = match self {
            Self::I => vec![
                vec![0, 0, 0, 0],
                vec![n, n, n, n],
                vec![0, 0, 0, 0],
                vec![0, 0, 0, 0],
            ],
            Self::J => vec![vec![n, 0, 0], vec![n, n, n], vec![0, 0, 0]],
            Self::L => vec![vec![0, 0, n], vec![n, n, n], vec![0, 0, 0]],
            Self::O => vec![vec![n, n], vec![n, n]],
            Self::S => vec![vec![0, n, n], vec![n, n, 0], vec![0, 0, 0]],
            Self::T => vec![vec![0, n, 0], vec![n, n, n], vec![0, 0, 0]],
            Self::Z => vec![vec![n, n, 0], vec![0, n, n], vec![0, 0, 0]],
        };
        Matrix { rows }
    }

    pub fn color(&self) -> Color {
        PALETTE[usize::from(self.id())].unwrap_or(Color::Reset)
    }
}

/// Colour per cell id. Index 0 is the empty cell and has no colour.
pub const PALETTE: [Option<Color>; 8] = [
    None,
    Some(Color::Rgb(0xFF, 0x0D, 0x72)), // I
    Some(Color::Rgb(0x0D, 0xC2, 0xFF)), // J
    Some(Color::Rgb(0x0D, 0xFF, 0x72)), // L
    Some(Color::Rgb(0xF5, 0x38, 0xFF)), // O
    Some(Color::Rgb(0xFF, 0x8E, 0x0D)), // S
    Some(Color::Rgb(0xFF, 0xE1, 0x38)), // T
    Some(Color::Rgb(0x38, 0x77, 0xFF)), // Z
];

/// Colour for a grid or piece cell value; `None` for empty (or unknown) cells.
#[inline]
pub fn cell_color(id: u8) -> Option<Color> {
    PALETTE.get(usize::from(id)).copied().flatten()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    pub fn inverse(self) -> Self {
        match self {
            Self::Clockwise => Self::CounterClockwise,
            Self::CounterClockwise => Self::Clockwise,
        }
    }
}

/// Square bounding box of a piece. Same cell encoding as the grid: 0 empty, 1..=7 kind id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: Vec<Vec<u8>>,
}

impl Matrix {
    /// Side length of the bounding box.
    #[inline]
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.rows[y][x]
    }

    /// Occupied cells as (x, y, id), row-major.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &v)| v != 0)
                .map(move |(x, &v)| (x, y, v))
        })
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    #[cfg(test)]
    pub fn from_rows_for_test(rows: Vec<Vec<u8>>) -> Self {
        Self { rows }
    }

    /// Quarter turn in place: transpose, then mirror rows (CW) or flip row order (CCW).
    pub fn rotate(&mut self, dir: Rotation) {
        let n = self.size();
        for y in 0..n {
            for x in 0..y {
                let tmp = self.rows[y][x];
                self.rows[y][x] = self.rows[x][y];
                self.rows[x][y] = tmp;
            }
        }
        match dir {
            Rotation::Clockwise => self.rows.iter_mut().for_each(|row| row.reverse()),
            Rotation::CounterClockwise => self.rows.reverse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_ids_follow_catalog_order() {
        for (i, kind) in PieceKind::ALL.iter().enumerate() {
            assert_eq!(usize::from(kind.id()), i + 1);
        }
    }

    #[test]
    fn test_every_shape_has_four_cells_of_its_own_id() {
        for kind in PieceKind::ALL {
            let m = kind.shape();
            assert!(m.rows().iter().all(|r| r.len() == m.size()));
            let cells: Vec<_> = m.cells().collect();
            assert_eq!(cells.len(), 4, "{kind:?}");
            assert!(cells.iter().all(|&(_, _, v)| v == kind.id()));
        }
        assert_eq!(PieceKind::I.shape().size(), 4);
        assert_eq!(PieceKind::O.shape().size(), 2);
        assert_eq!(PieceKind::T.shape().size(), 3);
    }

    #[test]
    fn test_rotate_cw_t_piece() {
        let mut m = PieceKind::T.shape();
        m.rotate(Rotation::Clockwise);
        assert_eq!(m.rows(), &[vec![0, 6, 0], vec![0, 6, 6], vec![0, 6, 0]]);
    }

    #[test]
    fn test_rotate_ccw_t_piece() {
        let mut m = PieceKind::T.shape();
        m.rotate(Rotation::CounterClockwise);
        assert_eq!(m.rows(), &[vec![0, 6, 0], vec![6, 6, 0], vec![0, 6, 0]]);
    }

    #[test]
    fn test_four_turns_restore_orientation() {
        for kind in PieceKind::ALL {
            for dir in [Rotation::Clockwise, Rotation::CounterClockwise] {
                let original = kind.shape();
                let mut m = original.clone();
                for _ in 0..4 {
                    m.rotate(dir);
                }
                assert_eq!(m, original, "{kind:?} {dir:?}");
            }
        }
    }

    #[test]
    fn test_o_piece_is_fixed_under_rotation() {
        let mut m = PieceKind::O.shape();
        m.rotate(Rotation::Clockwise);
        assert_eq!(m, PieceKind::O.shape());
    }

    #[test]
    fn test_inverse_rotation_undoes_turn() {
        let mut m = PieceKind::L.shape();
        m.rotate(Rotation::Clockwise);
        m.rotate(Rotation::Clockwise.inverse());
        assert_eq!(m, PieceKind::L.shape());
    }

    #[test]
    fn test_palette_empty_cell_has_no_colour() {
        assert_eq!(cell_color(0), None);
        assert_eq!(cell_color(1), Some(Color::Rgb(0xFF, 0x0D, 0x72)));
        assert_eq!(cell_color(9), None);
        assert_eq!(PieceKind::Z.color(), Color::Rgb(0x38, 0x77, 0xFF));
    }

    #[test]
    fn test_random_covers_all_kinds() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(PieceKind::random(&mut rng));
        }
        assert_eq!(seen.len(), 7);
    }
}
