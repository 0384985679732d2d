//! Cube state representation.
//!
//! Pieces live in a flat arena indexed by grid position. Only surface cubies
//! are stored; interior positions of large cubes are skipped entirely. Each
//! cubie carries its stickers as (facing, color) pairs, so orientation falls
//! out of sticker directions instead of a hand-maintained twist table.

use crate::error::{CubeError, Result};
use crate::moves::Move;
use serde::{Deserialize, Serialize};

/// Minimum supported cube size.
pub const MIN_SIZE: usize = 2;
/// Maximum supported cube size.
pub const MAX_SIZE: usize = 10;

// ==================== Faces and axes ====================

/// One of the six outer faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    U,
    D,
    L,
    R,
    F,
    B,
}

/// Rotation axis. X runs L→R, Y runs D→U, Z runs B→F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Face {
    /// All faces in the canonical export order.
    pub const EXPORT_ORDER: [Face; 6] = [Face::U, Face::R, Face::F, Face::D, Face::L, Face::B];

    /// The four side faces in clockwise order when viewed from above.
    pub const SIDE_CYCLE: [Face; 4] = [Face::F, Face::R, Face::B, Face::L];

    pub fn axis(self) -> Axis {
        match self {
            Face::L | Face::R => Axis::X,
            Face::U | Face::D => Axis::Y,
            Face::F | Face::B => Axis::Z,
        }
    }

    pub fn opposite(self) -> Face {
        match self {
            Face::U => Face::D,
            Face::D => Face::U,
            Face::L => Face::R,
            Face::R => Face::L,
            Face::F => Face::B,
            Face::B => Face::F,
        }
    }

    /// The side face to the right of `self` when looking at `self` from
    /// outside the cube. Only defined for side faces.
    pub fn right_side(self) -> Face {
        match self {
            Face::F => Face::R,
            Face::R => Face::B,
            Face::B => Face::L,
            Face::L => Face::F,
            _ => self,
        }
    }

    /// The side face to the left of `self`; inverse of [`Face::right_side`].
    pub fn left_side(self) -> Face {
        match self {
            Face::F => Face::L,
            Face::L => Face::B,
            Face::B => Face::R,
            Face::R => Face::F,
            _ => self,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Face::U => 'U',
            Face::D => 'D',
            Face::L => 'L',
            Face::R => 'R',
            Face::F => 'F',
            Face::B => 'B',
        }
    }
}

impl std::fmt::Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

// ==================== Colors ====================

/// Sticker color. The six values mirror the standard scheme; conversions to
/// RGB are provided for rendering collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Yellow,
    Red,
    Orange,
    Green,
    Blue,
}

impl Color {
    pub const ALL: [Color; 6] = [
        Color::White,
        Color::Yellow,
        Color::Red,
        Color::Orange,
        Color::Green,
        Color::Blue,
    ];

    /// Standard scheme: White up, Yellow down, Green front, Blue back,
    /// Red right, Orange left.
    pub fn scheme(face: Face) -> Color {
        match face {
            Face::U => Color::White,
            Face::D => Color::Yellow,
            Face::R => Color::Red,
            Face::L => Color::Orange,
            Face::F => Color::Green,
            Face::B => Color::Blue,
        }
    }

    /// The color on the opposite face in the standard scheme.
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Yellow,
            Color::Yellow => Color::White,
            Color::Red => Color::Orange,
            Color::Orange => Color::Red,
            Color::Green => Color::Blue,
            Color::Blue => Color::Green,
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Color::White => (255, 255, 255),
            Color::Yellow => (255, 255, 0),
            Color::Red => (255, 0, 0),
            Color::Orange => (255, 165, 0),
            Color::Green => (0, 255, 0),
            Color::Blue => (0, 0, 255),
        }
    }

    pub fn hex(self) -> String {
        let (r, g, b) = self.rgb();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    pub fn letter(self) -> char {
        match self {
            Color::White => 'W',
            Color::Yellow => 'Y',
            Color::Red => 'R',
            Color::Orange => 'O',
            Color::Green => 'G',
            Color::Blue => 'B',
        }
    }

    pub fn from_letter(c: char) -> Option<Color> {
        match c {
            'W' => Some(Color::White),
            'Y' => Some(Color::Yellow),
            'R' => Some(Color::Red),
            'O' => Some(Color::Orange),
            'G' => Some(Color::Green),
            'B' => Some(Color::Blue),
            _ => None,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Color::White => "White",
            Color::Yellow => "Yellow",
            Color::Red => "Red",
            Color::Orange => "Orange",
            Color::Green => "Green",
            Color::Blue => "Blue",
        };
        write!(f, "{}", name)
    }
}

// ==================== Positions and pieces ====================

/// Grid position of a cubie. Coordinates run 0..n on each axis:
/// x from L to R, y from D to U, z from B to F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Position {
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        Position { x, y, z }
    }

    pub(crate) fn flat_index(self, n: usize) -> usize {
        (self.x * n + self.y) * n + self.z
    }

    /// Faces this position touches on an n-sized cube.
    pub fn faces(self, n: usize) -> Vec<Face> {
        let m = n - 1;
        let mut out = Vec::with_capacity(3);
        if self.y == m {
            out.push(Face::U);
        } else if self.y == 0 {
            out.push(Face::D);
        }
        if self.x == m {
            out.push(Face::R);
        } else if self.x == 0 {
            out.push(Face::L);
        }
        if self.z == m {
            out.push(Face::F);
        } else if self.z == 0 {
            out.push(Face::B);
        }
        out
    }

    pub fn is_surface(self, n: usize) -> bool {
        !self.faces(n).is_empty()
    }

    pub fn touches(self, face: Face, n: usize) -> bool {
        let m = n - 1;
        match face {
            Face::U => self.y == m,
            Face::D => self.y == 0,
            Face::R => self.x == m,
            Face::L => self.x == 0,
            Face::F => self.z == m,
            Face::B => self.z == 0,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Piece classification by number of visible stickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Corner,
    Edge,
    Center,
}

impl PieceKind {
    fn from_sticker_count(count: usize) -> Option<PieceKind> {
        match count {
            3 => Some(PieceKind::Corner),
            2 => Some(PieceKind::Edge),
            1 => Some(PieceKind::Center),
            _ => None,
        }
    }
}

/// One colored facelet of a cubie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sticker {
    pub facing: Face,
    pub color: Color,
}

/// A physical piece: corner, edge (including wings on 4x4+), or center
/// facelet (including x-centers). Each is tracked independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cubie {
    pub home: Position,
    pub pos: Position,
    pub kind: PieceKind,
    pub stickers: Vec<Sticker>,
}

impl Cubie {
    /// Color shown on `face`, if this piece has a sticker facing it.
    pub fn sticker_on(&self, face: Face) -> Option<Color> {
        self.stickers
            .iter()
            .find(|s| s.facing == face)
            .map(|s| s.color)
    }

    /// Face the sticker of `color` currently points at.
    pub fn facing_of(&self, color: Color) -> Option<Face> {
        self.stickers
            .iter()
            .find(|s| s.color == color)
            .map(|s| s.facing)
    }

    pub fn has_color(&self, color: Color) -> bool {
        self.stickers.iter().any(|s| s.color == color)
    }

    /// Sorted color list, used to identify pieces.
    pub fn color_key(&self) -> Vec<Color> {
        let mut colors: Vec<Color> = self.stickers.iter().map(|s| s.color).collect();
        colors.sort_by_key(|c| c.letter());
        colors
    }

    pub fn is_home(&self) -> bool {
        self.pos == self.home
    }
}

// ==================== Cube state ====================

/// Complete state of an n×n×n cube: the cubie arena, the position index,
/// and the applied-move history with an undo cursor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CubeState {
    size: usize,
    cubies: Vec<Cubie>,
    occupancy: Vec<Option<usize>>,
    history: Vec<Move>,
    cursor: usize,
}

impl CubeState {
    /// Create a solved cube of the given size (2..=10).
    pub fn new(size: usize) -> Result<CubeState> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(CubeError::invalid_state(format!(
                "cube size must be between {} and {}, got {}",
                MIN_SIZE, MAX_SIZE, size
            )));
        }
        let mut cubies = Vec::new();
        let mut occupancy = vec![None; size * size * size];
        for x in 0..size {
            for y in 0..size {
                for z in 0..size {
                    let pos = Position::new(x, y, z);
                    let faces = pos.faces(size);
                    let kind = match PieceKind::from_sticker_count(faces.len()) {
                        Some(k) => k,
                        None => continue, // interior
                    };
                    let stickers = faces
                        .iter()
                        .map(|&f| Sticker {
                            facing: f,
                            color: Color::scheme(f),
                        })
                        .collect();
                    occupancy[pos.flat_index(size)] = Some(cubies.len());
                    cubies.push(Cubie {
                        home: pos,
                        pos,
                        kind,
                        stickers,
                    });
                }
            }
        }
        Ok(CubeState {
            size,
            cubies,
            occupancy,
            history: Vec::new(),
            cursor: 0,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cubies(&self) -> &[Cubie] {
        &self.cubies
    }

    /// The piece currently occupying `pos`, if any.
    pub fn cubie_at(&self, pos: Position) -> Option<&Cubie> {
        if pos.x >= self.size || pos.y >= self.size || pos.z >= self.size {
            return None;
        }
        self.occupancy[pos.flat_index(self.size)].map(|i| &self.cubies[i])
    }

    /// Number of moves currently applied (undo moves the cursor back).
    pub fn move_count(&self) -> usize {
        self.cursor
    }

    /// Full applied-move log, including any undone tail.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn piece_counts(&self) -> PieceCounts {
        let mut counts = PieceCounts::default();
        for c in &self.cubies {
            match c.kind {
                PieceKind::Corner => counts.corners += 1,
                PieceKind::Edge => counts.edges += 1,
                PieceKind::Center => counts.centers += 1,
            }
        }
        counts
    }

    // ---- internal accessors used by the move engine ----

    pub(crate) fn arena_mut(&mut self) -> &mut Vec<Cubie> {
        &mut self.cubies
    }

    pub(crate) fn rebuild_occupancy(&mut self) {
        let n = self.size;
        for slot in self.occupancy.iter_mut() {
            *slot = None;
        }
        for (i, c) in self.cubies.iter().enumerate() {
            self.occupancy[c.pos.flat_index(n)] = Some(i);
        }
    }

    pub(crate) fn record_move(&mut self, mv: Move) {
        self.history.truncate(self.cursor);
        self.history.push(mv);
        self.cursor += 1;
    }

    pub(crate) fn history_cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn set_history_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    // ==================== Face views ====================

    /// Grid position of cell (row, col) of `face`, viewed from outside the
    /// cube in the standard unfolded orientation.
    pub fn face_cell(&self, face: Face, row: usize, col: usize) -> Position {
        let m = self.size - 1;
        match face {
            Face::U => Position::new(col, m, row),
            Face::D => Position::new(col, 0, m - row),
            Face::F => Position::new(col, m - row, m),
            Face::B => Position::new(m - col, m - row, 0),
            Face::R => Position::new(m, m - row, m - col),
            Face::L => Position::new(0, m - row, col),
        }
    }

    /// 2D color grid of one face, row-major top to bottom.
    pub fn face_colors(&self, face: Face) -> Vec<Vec<Color>> {
        let n = self.size;
        let mut grid = Vec::with_capacity(n);
        for row in 0..n {
            let mut cells = Vec::with_capacity(n);
            for col in 0..n {
                let pos = self.face_cell(face, row, col);
                let color = self
                    .cubie_at(pos)
                    .and_then(|c| c.sticker_on(face))
                    .expect("surface cell must hold a sticker facing its face");
                cells.push(color);
            }
            grid.push(cells);
        }
        grid
    }

    /// Color grids for all six faces in export order.
    pub fn all_face_colors(&self) -> Vec<(Face, Vec<Vec<Color>>)> {
        Face::EXPORT_ORDER
            .iter()
            .map(|&f| (f, self.face_colors(f)))
            .collect()
    }

    /// A cube is solved when every face shows a single uniform color. This
    /// holds after whole-cube rotations as well.
    pub fn is_solved(&self) -> bool {
        Face::EXPORT_ORDER.iter().all(|&face| {
            let grid = self.face_colors(face);
            let first = grid[0][0];
            grid.iter().all(|row| row.iter().all(|&c| c == first))
        })
    }

    // ==================== State string ====================

    /// Canonical export: one letter per sticker, faces in U,R,F,D,L,B order,
    /// each face row-major.
    pub fn to_state_string(&self) -> String {
        let n = self.size;
        let mut out = String::with_capacity(6 * n * n);
        for &face in Face::EXPORT_ORDER.iter() {
            for row in self.face_colors(face) {
                for color in row {
                    out.push(color.letter());
                }
            }
        }
        out
    }

    /// Import a state string. Fails with `InvalidState` on wrong length,
    /// invalid characters, impossible pieces, or a configuration that is
    /// unreachable from solved by legal moves.
    pub fn from_state_string(text: &str) -> Result<CubeState> {
        let chars: Vec<char> = text.trim().chars().collect();
        if chars.len() % 6 != 0 {
            return Err(CubeError::invalid_state(format!(
                "state string length {} is not divisible by 6",
                chars.len()
            )));
        }
        let per_face = chars.len() / 6;
        let size = (1..=MAX_SIZE)
            .find(|n| n * n == per_face)
            .ok_or_else(|| {
                CubeError::invalid_state(format!(
                    "face area {} is not a square of a supported size",
                    per_face
                ))
            })?;
        if size < MIN_SIZE {
            return Err(CubeError::invalid_state("cube size must be at least 2"));
        }

        let mut colors = Vec::with_capacity(chars.len());
        for c in &chars {
            match Color::from_letter(*c) {
                Some(color) => colors.push(color),
                None => {
                    return Err(CubeError::invalid_state(format!(
                        "invalid sticker character '{}'",
                        c
                    )))
                }
            }
        }

        // Color balance: n^2 stickers of each color.
        for color in Color::ALL {
            let count = colors.iter().filter(|&&c| c == color).count();
            if count != size * size {
                return Err(CubeError::invalid_state(format!(
                    "expected {} {} stickers, found {}",
                    size * size,
                    color,
                    count
                )));
            }
        }

        let reference = CubeState::new(size)?;

        // Gather observed stickers per position.
        let mut observed: Vec<Vec<Sticker>> = vec![Vec::new(); size * size * size];
        let mut idx = 0;
        for &face in Face::EXPORT_ORDER.iter() {
            for row in 0..size {
                for col in 0..size {
                    let pos = reference.face_cell(face, row, col);
                    observed[pos.flat_index(size)].push(Sticker {
                        facing: face,
                        color: colors[idx],
                    });
                    idx += 1;
                }
            }
        }

        // Match each observed piece to an unused home piece by color set.
        let mut used = vec![false; reference.cubies.len()];
        let mut cubies = Vec::with_capacity(reference.cubies.len());
        let mut occupancy = vec![None; size * size * size];
        for ref_cubie in &reference.cubies {
            let pos = ref_cubie.pos;
            let stickers = observed[pos.flat_index(size)].clone();
            let kind = match PieceKind::from_sticker_count(stickers.len()) {
                Some(k) => k,
                None => {
                    return Err(CubeError::invalid_state(format!(
                        "position {} has {} stickers",
                        pos,
                        stickers.len()
                    )))
                }
            };
            let mut key: Vec<Color> = stickers.iter().map(|s| s.color).collect();
            key.sort_by_key(|c| c.letter());
            let home_idx = reference
                .cubies
                .iter()
                .enumerate()
                .position(|(i, c)| !used[i] && c.kind == kind && c.color_key() == key)
                .ok_or_else(|| {
                    CubeError::invalid_state(format!(
                        "no piece with colors {:?} exists at {} on a {}x{} cube",
                        key, pos, size, size
                    ))
                })?;
            used[home_idx] = true;
            occupancy[pos.flat_index(size)] = Some(cubies.len());
            cubies.push(Cubie {
                home: reference.cubies[home_idx].home,
                pos,
                kind,
                stickers,
            });
        }

        let state = CubeState {
            size,
            cubies,
            occupancy,
            history: Vec::new(),
            cursor: 0,
        };
        state.validate_invariants()?;
        Ok(state)
    }

    // ==================== Orientation indices ====================

    /// Ordered facelet triple of a corner slot, clockwise when viewed from
    /// outside the corner, starting at the U/D face. Matches the canonical
    /// convention (URF=(U,R,F), UFL=(U,F,L), ..., DRB=(D,R,B)).
    pub(crate) fn corner_triple(&self, pos: Position) -> [Face; 3] {
        let m = self.size - 1;
        let yf = if pos.y == m { Face::U } else { Face::D };
        let xf = if pos.x == m { Face::R } else { Face::L };
        let zf = if pos.z == m { Face::F } else { Face::B };
        let sx = if pos.x == m { 1i32 } else { -1 };
        let sz = if pos.z == m { 1i32 } else { -1 };
        let positive = sx * sz > 0;
        match (yf, positive) {
            (Face::U, true) => [yf, xf, zf],
            (Face::U, false) => [yf, zf, xf],
            (Face::D, true) => [yf, zf, xf],
            (Face::D, false) => [yf, xf, zf],
            _ => unreachable!(),
        }
    }

    /// Twist index 0..2 of a corner: where its White/Yellow sticker sits in
    /// the slot's facelet triple.
    pub(crate) fn corner_twist(&self, cubie: &Cubie) -> Option<u8> {
        let marked = cubie
            .stickers
            .iter()
            .find(|s| s.color == Color::White || s.color == Color::Yellow)?;
        let triple = self.corner_triple(cubie.pos);
        triple
            .iter()
            .position(|&f| f == marked.facing)
            .map(|i| i as u8)
    }

    /// Flip index 0..1 of an edge: primary color (White/Yellow if present,
    /// else Green/Blue) against the slot's primary facelet (U/D if touched,
    /// else F/B).
    pub(crate) fn edge_flip(&self, cubie: &Cubie) -> Option<u8> {
        let primary_color = cubie
            .stickers
            .iter()
            .find(|s| s.color == Color::White || s.color == Color::Yellow)
            .or_else(|| {
                cubie
                    .stickers
                    .iter()
                    .find(|s| s.color == Color::Green || s.color == Color::Blue)
            })?
            .color;
        let n = self.size;
        let primary_face = [Face::U, Face::D, Face::F, Face::B]
            .into_iter()
            .find(|&f| cubie.pos.touches(f, n))?;
        let shown = cubie.sticker_on(primary_face)?;
        Some(if shown == primary_color { 0 } else { 1 })
    }

    // ==================== Invariants ====================

    /// Check the group-theoretic reachability constraints. Corner twists
    /// must sum to 0 mod 3 on every size; on 3x3 edge flips must sum to
    /// 0 mod 2 and corner permutation parity must equal the combined edge
    /// and center permutation parity (slice moves and rotations permute
    /// centers, which the parity ledger has to account for).
    pub fn validate_invariants(&self) -> Result<()> {
        // Corner chirality: sticker arrangement must be a rotation, never a
        // mirror, of the home piece.
        for cubie in self.cubies.iter().filter(|c| c.kind == PieceKind::Corner) {
            self.check_corner_chirality(cubie)?;
        }

        let twist_sum: u32 = self
            .cubies
            .iter()
            .filter(|c| c.kind == PieceKind::Corner)
            .map(|c| {
                self.corner_twist(c)
                    .map(u32::from)
                    .ok_or_else(|| CubeError::invalid_state("corner lacks a White/Yellow sticker"))
            })
            .collect::<Result<Vec<u32>>>()?
            .iter()
            .sum();
        if twist_sum % 3 != 0 {
            return Err(CubeError::invalid_state(format!(
                "corner twists sum to {} mod 3; a reachable state sums to 0",
                twist_sum % 3
            )));
        }

        if self.size == 3 {
            let flip_sum: u32 = self
                .cubies
                .iter()
                .filter(|c| c.kind == PieceKind::Edge)
                .map(|c| {
                    self.edge_flip(c)
                        .map(u32::from)
                        .ok_or_else(|| CubeError::invalid_state("edge has no orientable sticker"))
                })
                .collect::<Result<Vec<u32>>>()?
                .iter()
                .sum();
            if flip_sum % 2 != 0 {
                return Err(CubeError::invalid_state(
                    "an odd number of edges is flipped; a reachable state flips evenly",
                ));
            }

            let corner_parity = self.permutation_parity(PieceKind::Corner);
            let edge_parity = self.permutation_parity(PieceKind::Edge);
            let center_parity = self.permutation_parity(PieceKind::Center);
            if corner_parity != (edge_parity ^ center_parity) {
                return Err(CubeError::invalid_state(
                    "corner and edge permutation parities disagree",
                ));
            }
        }
        Ok(())
    }

    fn check_corner_chirality(&self, cubie: &Cubie) -> Result<()> {
        let triple = self.corner_triple(cubie.pos);
        let shown: Vec<Color> = triple
            .iter()
            .map(|&f| {
                cubie
                    .sticker_on(f)
                    .ok_or_else(|| CubeError::invalid_state("corner sticker missing on its slot"))
            })
            .collect::<Result<Vec<Color>>>()?;
        let home_triple = self.corner_triple(cubie.home);
        // The home colors in clockwise order follow the scheme of the home
        // slot's faces.
        let home: Vec<Color> = home_triple.iter().map(|&f| Color::scheme(f)).collect();
        let matches_rotation = (0..3).any(|r| {
            (0..3).all(|i| shown[i] == home[(i + r) % 3])
        });
        if !matches_rotation {
            return Err(CubeError::invalid_state(format!(
                "corner at {} is mirrored; its colors cannot occur on a real piece",
                cubie.pos
            )));
        }
        Ok(())
    }

    /// Permutation parity of one piece class: false = even, true = odd.
    pub(crate) fn permutation_parity(&self, kind: PieceKind) -> bool {
        // Map each piece of the class to the arena slot its position's
        // occupant came from, then count cycles. For centers with identical
        // colors the assignment is canonical and parity is well defined per
        // assignment, which is all the ledger needs on 3x3 (all centers are
        // distinct there).
        let members: Vec<&Cubie> = self
            .cubies
            .iter()
            .filter(|c| c.kind == kind)
            .collect();
        let homes: Vec<Position> = members.iter().map(|c| c.home).collect();
        let mut perm = Vec::with_capacity(members.len());
        for c in &members {
            let target = homes
                .iter()
                .position(|&h| h == c.pos)
                .expect("piece position must be a home slot of its class");
            perm.push(target);
        }
        let mut seen = vec![false; perm.len()];
        let mut parity = false;
        for start in 0..perm.len() {
            if seen[start] {
                continue;
            }
            let mut len = 0;
            let mut i = start;
            while !seen[i] {
                seen[i] = true;
                i = perm[i];
                len += 1;
            }
            if len % 2 == 0 {
                parity = !parity;
            }
        }
        parity
    }
}

/// Per-kind piece totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceCounts {
    pub corners: usize,
    pub edges: usize,
    pub centers: usize,
}

impl PieceCounts {
    pub fn total(&self) -> usize {
        self.corners + self.edges + self.centers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solved_piece_counts() {
        let c2 = CubeState::new(2).unwrap().piece_counts();
        assert_eq!(c2, PieceCounts { corners: 8, edges: 0, centers: 0 });

        let c3 = CubeState::new(3).unwrap().piece_counts();
        assert_eq!(c3, PieceCounts { corners: 8, edges: 12, centers: 6 });

        let c5 = CubeState::new(5).unwrap().piece_counts();
        assert_eq!(c5.corners, 8);
        assert_eq!(c5.edges, 12 * 3);
        assert_eq!(c5.centers, 6 * 9);
    }

    #[test]
    fn rejects_bad_sizes() {
        assert!(CubeState::new(1).is_err());
        assert!(CubeState::new(11).is_err());
    }

    #[test]
    fn solved_faces_are_uniform() {
        let state = CubeState::new(3).unwrap();
        assert!(state.is_solved());
        for &face in Face::EXPORT_ORDER.iter() {
            let grid = state.face_colors(face);
            let expected = Color::scheme(face);
            assert!(grid.iter().all(|row| row.iter().all(|&c| c == expected)));
        }
    }

    #[test]
    fn state_string_round_trip_solved() {
        for size in [2, 3, 4, 5] {
            let state = CubeState::new(size).unwrap();
            let text = state.to_state_string();
            assert_eq!(text.len(), 6 * size * size);
            let back = CubeState::from_state_string(&text).unwrap();
            assert_eq!(back.to_state_string(), text);
            assert!(back.is_solved());
        }
    }

    #[test]
    fn import_rejects_wrong_length() {
        assert!(CubeState::from_state_string("WWWW").is_err());
    }

    #[test]
    fn import_rejects_bad_characters() {
        let mut text = CubeState::new(3).unwrap().to_state_string();
        text.replace_range(0..1, "Q");
        assert!(CubeState::from_state_string(&text).is_err());
    }

    #[test]
    fn import_rejects_unbalanced_colors() {
        let mut text = CubeState::new(3).unwrap().to_state_string();
        // Turn one White sticker Yellow: color counts break.
        text.replace_range(0..1, "Y");
        assert!(CubeState::from_state_string(&text).is_err());
    }

    #[test]
    fn import_rejects_flipped_edge() {
        let state = CubeState::new(3).unwrap();
        let mut chars: Vec<char> = state.to_state_string().chars().collect();
        // Swap the two stickers of the UF edge: U cell (2,1) and F cell (0,1).
        chars.swap(7, 19);
        let text: String = chars.iter().collect();
        let err = CubeState::from_state_string(&text).unwrap_err();
        assert!(matches!(err, CubeError::InvalidState { .. }));
    }

    #[test]
    fn import_rejects_twisted_corner() {
        let state = CubeState::new(3).unwrap();
        let mut chars: Vec<char> = state.to_state_string().chars().collect();
        // Rotate the three stickers of the URF corner: U(2,2), R(0,0), F(0,2).
        let (a, b, c) = (8, 9, 20);
        let tmp = chars[a];
        chars[a] = chars[c];
        chars[c] = chars[b];
        chars[b] = tmp;
        let text: String = chars.iter().collect();
        let err = CubeState::from_state_string(&text).unwrap_err();
        assert!(matches!(err, CubeError::InvalidState { .. }));
    }

    #[test]
    fn import_rejects_swapped_edge_pair() {
        let state = CubeState::new(3).unwrap();
        let mut chars: Vec<char> = state.to_state_string().chars().collect();
        // Swap the UF and UB edge pieces without flipping either:
        // UF stickers at U(2,1)=7 and F(0,1)=19; UB at U(0,1)=1 and B(0,1)=46.
        chars.swap(7, 1);
        chars.swap(19, 46);
        let text: String = chars.iter().collect();
        let err = CubeState::from_state_string(&text).unwrap_err();
        assert!(matches!(err, CubeError::InvalidState { .. }));
    }

    #[test]
    fn clone_is_deep() {
        let state = CubeState::new(3).unwrap();
        let copy = state.clone();
        assert_eq!(state.to_state_string(), copy.to_state_string());
    }

    #[test]
    fn serde_round_trip() {
        let state = CubeState::new(3).unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let back: CubeState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_state_string(), state.to_state_string());
    }

    #[test]
    fn corner_triples_match_convention() {
        let state = CubeState::new(3).unwrap();
        assert_eq!(
            state.corner_triple(Position::new(2, 2, 2)),
            [Face::U, Face::R, Face::F]
        );
        assert_eq!(
            state.corner_triple(Position::new(0, 2, 2)),
            [Face::U, Face::F, Face::L]
        );
        assert_eq!(
            state.corner_triple(Position::new(2, 0, 2)),
            [Face::D, Face::F, Face::R]
        );
        assert_eq!(
            state.corner_triple(Position::new(0, 0, 0)),
            [Face::D, Face::B, Face::L]
        );
    }
}
