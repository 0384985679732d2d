//! Named algorithm database.
//!
//! Holds the canonical last-layer case sets (57 OLL, 21 PLL) plus common
//! triggers and F2L inserts, parsed once at construction. The pattern
//! matcher builds its lookup tables from these entries.

use crate::moves::MoveSequence;
use serde::{Deserialize, Serialize};

/// Algorithm category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Oll,
    Pll,
    F2l,
    Trigger,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Oll => "OLL",
            Category::Pll => "PLL",
            Category::F2l => "F2L",
            Category::Trigger => "Trigger",
        };
        write!(f, "{}", name)
    }
}

/// A named solving algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Algorithm {
    pub name: &'static str,
    pub category: Category,
    pub description: &'static str,
    pub moves: MoveSequence,
}

/// Queryable collection of named algorithms.
pub struct AlgorithmDb {
    algorithms: Vec<Algorithm>,
}

impl Default for AlgorithmDb {
    fn default() -> Self {
        Self::standard()
    }
}

impl AlgorithmDb {
    /// Build the standard database. Every notation string in the tables is
    /// static and covered by the integrity test below.
    pub fn standard() -> AlgorithmDb {
        let mut algorithms = Vec::with_capacity(TABLE.len());
        for &(category, name, notation, description) in TABLE {
            let moves = MoveSequence::from_notation(notation)
                .expect("static algorithm table entries parse");
            algorithms.push(Algorithm {
                name,
                category,
                description,
                moves,
            });
        }
        AlgorithmDb { algorithms }
    }

    /// Look up one algorithm by category and name.
    pub fn get(&self, category: Category, name: &str) -> Option<&Algorithm> {
        self.algorithms
            .iter()
            .find(|a| a.category == category && a.name == name)
    }

    /// All algorithms of a category, in table order.
    pub fn by_category(&self, category: Category) -> Vec<&Algorithm> {
        self.algorithms
            .iter()
            .filter(|a| a.category == category)
            .collect()
    }

    /// Case-insensitive search over names and descriptions.
    pub fn search(&self, query: &str) -> Vec<&Algorithm> {
        let query = query.to_lowercase();
        self.algorithms
            .iter()
            .filter(|a| {
                a.name.to_lowercase().contains(&query)
                    || a.description.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Number of algorithms per category.
    pub fn count(&self, category: Category) -> usize {
        self.algorithms
            .iter()
            .filter(|a| a.category == category)
            .count()
    }

    pub fn len(&self) -> usize {
        self.algorithms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.algorithms.is_empty()
    }
}

type Entry = (Category, &'static str, &'static str, &'static str);

#[rustfmt::skip]
const TABLE: &[Entry] = &[
    // ==================== Triggers ====================
    (Category::Trigger, "Sexy Move", "R U R' U'", "Most common trigger"),
    (Category::Trigger, "Sledgehammer", "R' F R F'", "Insert trigger"),
    (Category::Trigger, "Left Hand", "L' U' L U", "Left-hand trigger"),
    (Category::Trigger, "Sune", "R U R' U R U2 R'", "Corner orientation trigger"),
    (Category::Trigger, "Anti-Sune", "R U2 R' U' R U' R'", "Reverse Sune"),
    (Category::Trigger, "Niklas", "R U' L' U R' U' L", "Corner 3-cycle commutator"),

    // ==================== F2L ====================
    (Category::F2l, "F2L-1", "R U' R'", "Pair made, slot in front right"),
    (Category::F2l, "F2L-2", "F' U F", "Pair made, mirrored insert"),
    (Category::F2l, "F2L-3", "R U R' U' R U R'", "Split pair, corner on top"),
    (Category::F2l, "F2L-27", "R U2 R' U' R U R'", "Corner and edge separated"),
    (Category::F2l, "F2L-32", "R U R' U2 R U' R'", "Edge pointing away"),
    (Category::F2l, "F2L-37", "R U' R' U R U' R'", "Corner twisted in slot"),

    // ==================== OLL (57 cases) ====================
    (Category::Oll, "OLL 1", "R U2 R2 F R F' U2 R' F R F'", "Dot, no edges oriented"),
    (Category::Oll, "OLL 2", "F R U R' U' F' Fw R U R' U' Fw'", "Dot with back bar"),
    (Category::Oll, "OLL 3", "Fw R U R' U' Fw' U' F R U R' U' F'", "Dot, corner at back left"),
    (Category::Oll, "OLL 4", "Fw R U R' U' Fw' U F R U R' U' F'", "Dot, corner at back right"),
    (Category::Oll, "OLL 5", "Rw' U2 R U R' U Rw", "Right square"),
    (Category::Oll, "OLL 6", "Rw U2 R' U' R U' Rw'", "Left square"),
    (Category::Oll, "OLL 7", "Rw U R' U R U2 Rw'", "Small lightning"),
    (Category::Oll, "OLL 8", "Rw' U' R U' R' U2 Rw", "Mirrored small lightning"),
    (Category::Oll, "OLL 9", "R U R' U' R' F R2 U R' U' F'", "Kite, left"),
    (Category::Oll, "OLL 10", "R U R' U R' F R F' R U2 R'", "Kite, right"),
    (Category::Oll, "OLL 11", "Rw U R' U R' F R F' R U2 Rw'", "Lightning, left"),
    (Category::Oll, "OLL 12", "F R U R' U' F' U F R U R' U' F'", "Lightning, right"),
    (Category::Oll, "OLL 13", "F U R U' R2 F' R U R U' R'", "Knight, gun left"),
    (Category::Oll, "OLL 14", "R' F R U R' F' R F U' F'", "Knight, gun right"),
    (Category::Oll, "OLL 15", "Rw' U' Rw R' U' R U Rw' U Rw", "Knight, squeegee left"),
    (Category::Oll, "OLL 16", "Rw U Rw' R U R' U' Rw U' Rw'", "Knight, squeegee right"),
    (Category::Oll, "OLL 17", "R U R' U R' F R F' U2 R' F R F'", "Diagonal dot"),
    (Category::Oll, "OLL 18", "Rw U R' U R U2 Rw2 U' R U' R' U2 Rw", "Crowned dot"),
    (Category::Oll, "OLL 19", "M U R U R' U' M' R' F R F'", "Crowned dot, bars"),
    (Category::Oll, "OLL 20", "Rw U R' U' M2 U R U' R' U' M'", "All corners oriented dot"),
    (Category::Oll, "OLL 21", "R U2 R' U' R U R' U' R U' R'", "Cross, double headlights"),
    (Category::Oll, "OLL 22", "R U2 R2 U' R2 U' R2 U2 R", "Cross, Pi"),
    (Category::Oll, "OLL 23", "R2 D' R U2 R' D R U2 R", "Cross, headlights"),
    (Category::Oll, "OLL 24", "Rw U R' U' Rw' F R F'", "Cross, T"),
    (Category::Oll, "OLL 25", "F' Rw U R' U' Rw' F R", "Cross, diagonal corners"),
    (Category::Oll, "OLL 26", "R U2 R' U' R U' R'", "Cross, Anti-Sune"),
    (Category::Oll, "OLL 27", "R U R' U R U2 R'", "Cross, Sune"),
    (Category::Oll, "OLL 28", "Rw U R' U' M U R U' R'", "Corners done, arrow"),
    (Category::Oll, "OLL 29", "R U R' U' R U' R' F' U' F R U R'", "Awkward, left"),
    (Category::Oll, "OLL 30", "F U R U2 R' U' R U2 R' U' F'", "Awkward, right"),
    (Category::Oll, "OLL 31", "R' U' F U R U' R' F' R", "P, left"),
    (Category::Oll, "OLL 32", "R U B' U' R' U R B R'", "P, right"),
    (Category::Oll, "OLL 33", "R U R' U' R' F R F'", "T, front bar"),
    (Category::Oll, "OLL 34", "R U R2 U' R' F R U R U' F'", "C, top bar"),
    (Category::Oll, "OLL 35", "R U2 R2 F R F' R U2 R'", "Fish, salmon"),
    (Category::Oll, "OLL 36", "L' U' L U' L' U L U L F' L' F", "W, left"),
    (Category::Oll, "OLL 37", "F R' F' R U R U' R'", "Fish, mounted"),
    (Category::Oll, "OLL 38", "R U R' U R U' R' U' R' F R F'", "W, right"),
    (Category::Oll, "OLL 39", "L F' L' U' L U F U' L'", "Big lightning, left"),
    (Category::Oll, "OLL 40", "R' F R U R' U' F' U R", "Big lightning, right"),
    (Category::Oll, "OLL 41", "R U R' U R U2 R' F R U R' U' F'", "Awkward fish, left"),
    (Category::Oll, "OLL 42", "R' U' R U' R' U2 R F R U R' U' F'", "Awkward fish, right"),
    (Category::Oll, "OLL 43", "F' U' L' U L F", "P, back left"),
    (Category::Oll, "OLL 44", "F U R U' R' F'", "P, back right"),
    (Category::Oll, "OLL 45", "F R U R' U' F'", "T, front"),
    (Category::Oll, "OLL 46", "R' U' R' F R F' U R", "C, side bar"),
    (Category::Oll, "OLL 47", "R' U' R' F R F' R' F R F' U R", "Small L, double sexy"),
    (Category::Oll, "OLL 48", "F R U R' U' R U R' U' F'", "Small L, front"),
    (Category::Oll, "OLL 49", "R B' R2 F R2 B R2 F' R", "Small L, back"),
    (Category::Oll, "OLL 50", "R' F R2 B' R2 F' R2 B R'", "Small L, side"),
    (Category::Oll, "OLL 51", "F U R U' R' U R U' R' F'", "I, bottom bar"),
    (Category::Oll, "OLL 52", "R U R' U R U' B U' B' R'", "I, vertical bar"),
    (Category::Oll, "OLL 53", "Rw' U' R U' R' U R U' R' U2 Rw", "Small L, frozen right"),
    (Category::Oll, "OLL 54", "Rw U R' U R U' R' U R U2 Rw'", "Small L, frozen left"),
    (Category::Oll, "OLL 55", "R U2 R2 U' R U' R' U2 F R F'", "I, highway"),
    (Category::Oll, "OLL 56", "Rw' U' Rw U' R' U R U' R' U R Rw' U Rw", "I, streetlights"),
    (Category::Oll, "OLL 57", "R U R' U' M' U R U' Rw'", "Corners done, H"),

    // ==================== PLL (21 cases) ====================
    (Category::Pll, "Aa", "R' F R' B2 R F' R' B2 R2", "Corner 3-cycle, clockwise"),
    (Category::Pll, "Ab", "R B' R F2 R' B R F2 R2", "Corner 3-cycle, counterclockwise"),
    (Category::Pll, "E", "R B' R' F R B R' F' R B R' F R B' R' F'", "Corner double swap, columns"),
    (Category::Pll, "F", "R' U' F' R U R' U' R' F R2 U' R' U' R U R' U R", "Opposite edge swap plus corners"),
    (Category::Pll, "Ga", "R2 U R' U R' U' R U' R2 U' D R' U R D'", "Double cycle, headlights left"),
    (Category::Pll, "Gb", "R' U' R U D' R2 U R' U R U' R U' R2 D", "Double cycle, headlights back"),
    (Category::Pll, "Gc", "R2 U' R U' R U R' U R2 U D' R U' R' D", "Double cycle, headlights right"),
    (Category::Pll, "Gd", "R U R' U' D R2 U' R U' R' U R' U R2 D'", "Double cycle, headlights front"),
    (Category::Pll, "H", "M2 U M2 U2 M2 U M2", "Opposite edge swaps"),
    (Category::Pll, "Ja", "R' U L' U2 R U' R' U2 R L", "Adjacent corner and edge swap, left"),
    (Category::Pll, "Jb", "R U R' F' R U R' U' R' F R2 U' R'", "Adjacent corner and edge swap, right"),
    (Category::Pll, "Na", "R U R' U R U R' F' R U R' U' R' F R2 U' R' U2 R U' R'", "Diagonal swap, right lane"),
    (Category::Pll, "Nb", "R' U R U' R' F' U' F R U R' F R' F' R U' R", "Diagonal swap, left lane"),
    (Category::Pll, "Ra", "R U' R' U' R U R D R' U' R D' R' U2 R'", "Adjacent corner swap, edge cycle a"),
    (Category::Pll, "Rb", "R2 F R U R U' R' F' R U2 R' U2 R", "Adjacent corner swap, edge cycle b"),
    (Category::Pll, "T", "R U R' U' R' F R2 U' R' U' R U R' F'", "Adjacent corner and edge swap"),
    (Category::Pll, "Ua", "R U' R U R U R U' R' U' R2", "Edge 3-cycle, counterclockwise"),
    (Category::Pll, "Ub", "R2 U R U R' U' R' U' R' U R'", "Edge 3-cycle, clockwise"),
    (Category::Pll, "V", "R' U R' U' B' R' B2 U' B' U B' R B R", "Diagonal swap, V lane"),
    (Category::Pll, "Y", "F R U' R' U' R U R' F' R U R' U' R' F R F'", "Diagonal swap, Y lane"),
    (Category::Pll, "Z", "M' U M2 U M2 U M' U2 M2", "Adjacent edge swaps"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_case_counts() {
        let db = AlgorithmDb::standard();
        assert_eq!(db.count(Category::Oll), 57);
        assert_eq!(db.count(Category::Pll), 21);
        assert!(db.count(Category::Trigger) >= 4);
        assert!(db.count(Category::F2l) >= 4);
    }

    #[test]
    fn every_entry_parses_and_inverts() {
        let db = AlgorithmDb::standard();
        for alg in db.by_category(Category::Oll) {
            assert!(!alg.moves.is_empty(), "{} is empty", alg.name);
            assert_eq!(alg.moves.inverse().inverse(), alg.moves);
        }
        for alg in db.by_category(Category::Pll) {
            assert!(!alg.moves.is_empty(), "{} is empty", alg.name);
        }
    }

    #[test]
    fn names_are_unique_per_category() {
        let db = AlgorithmDb::standard();
        for category in [Category::Oll, Category::Pll, Category::F2l, Category::Trigger] {
            let names: Vec<&str> = db.by_category(category).iter().map(|a| a.name).collect();
            let mut dedup = names.clone();
            dedup.sort();
            dedup.dedup();
            assert_eq!(names.len(), dedup.len(), "duplicate name in {}", category);
        }
    }

    #[test]
    fn lookup_and_search() {
        let db = AlgorithmDb::standard();
        let t_perm = db.get(Category::Pll, "T").unwrap();
        assert_eq!(t_perm.moves.len(), 14);

        let sune = db.search("sune");
        assert!(sune.iter().any(|a| a.name == "Sune"));
        assert!(sune.iter().any(|a| a.name == "Anti-Sune"));
    }
}
