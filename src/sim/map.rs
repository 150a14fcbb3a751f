/// TileMap: the append-only row store.
///
/// Row 0 is the topmost (oldest) row. Rows are only ever appended at
/// the bottom, and every row has exactly `width` cells.
///
/// Reads outside the generated area return `None` ("not generated yet"),
/// never a fault. Writes outside it are ignored.

use crate::domain::tile::Tile;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    rows: Vec<Vec<Tile>>,
    width: usize,
}

impl TileMap {
    pub fn new(width: usize) -> Self {
        TileMap { rows: Vec::new(), width }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of generated rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Tile> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, tile: Tile) {
        if let Some(cell) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = tile;
        }
    }

    /// Append a row at the bottom. Short rows are padded with `Empty`,
    /// long rows truncated, so the width invariant always holds.
    pub fn push_row(&mut self, mut row: Vec<Tile>) {
        row.resize(self.width, Tile::Empty);
        self.rows.push(row);
    }

    pub fn row(&self, y: usize) -> Option<&[Tile]> {
        self.rows.get(y).map(|r| r.as_slice())
    }

    /// Iterate `(x, y, tile)` over every generated cell, top to bottom.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter().enumerate().map(move |(x, &t)| (x, y, t))
        })
    }

    /// Build a map from a string diagram (tests only).
    /// Legend: ' '=Empty  '~'=Lava  'b'=inactive bomb  '0'..'9'=armed bomb
    ///         'd'=dirt 'c'=copper 's'=silver 'g'=gold 'D'=diamond 'p'=sweet potato
    #[cfg(test)]
    pub fn from_rows(rows: &[&str]) -> Self {
        use crate::domain::tile::{Fuse, MineralKind};

        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut map = TileMap::new(width);
        for row in rows {
            let tiles = row.chars().map(|ch| match ch {
                '~' => Tile::Lava,
                'b' => Tile::inactive_bomb(),
                '0'..='9' => Tile::Bomb { fuse: Fuse::Armed(ch as u32 - '0' as u32) },
                'd' => Tile::mineral(MineralKind::Dirt),
                'c' => Tile::mineral(MineralKind::Copper),
                's' => Tile::mineral(MineralKind::Silver),
                'g' => Tile::mineral(MineralKind::Gold),
                'D' => Tile::mineral(MineralKind::Diamond),
                'p' => Tile::mineral(MineralKind::SweetPotato),
                _ => Tile::Empty,
            }).collect();
            map.push_row(tiles);
        }
        map
    }
}
