//! The gene vector: every tunable evaluation and search-ordering constant
//! in one flat array of integers, so a trainer can adjust play without
//! recompilation.
//!
//! All values are stored positive; whether a slot is a bonus or a penalty
//! is visible at the use site. A gene can be loaded from a small
//! version-tagged text file ("white.gen"/"black.gen" by convention); an
//! absent or malformed file falls back to the compiled defaults.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

pub const GENE_COUNT: usize = 82;

/// File format marker; bump when slots are added or renumbered.
const GENE_FILE_VERSION: u32 = 1;

/// Named slot indices. Search slots first, then evaluation slots in the
/// order the evaluator consumes them.
#[allow(dead_code)]
pub mod slot {
    // Search shape.
    pub const ESCAPE_CHECK_DEPTH: usize = 0;
    pub const MAX_CHECK_DEPTH: usize = 1;
    pub const HASH_HIST_MAX: usize = 2;
    pub const HASH_HIST_INCREMENT: usize = 3;

    // Evaluator pruning and nudges.
    pub const SAFE_EVAL_PRUNE_MARGIN: usize = 4;
    pub const CHECK_BONUS: usize = 5;
    pub const TEMPO_BONUS: usize = 6;

    // King-position attack/protection.
    pub const KNIGHT_ATTACK_KPOS: usize = 7;
    pub const BISHOP_ATTACK_KPOS: usize = 8;
    pub const ROOK_ATTACK_KPOS: usize = 9;
    pub const QUEEN_ATTACK_KPOS: usize = 10;
    pub const KNIGHT_PROTECT_KPOS: usize = 11;
    pub const BISHOP_PROTECT_KPOS: usize = 12;
    pub const ROOK_PROTECT_KPOS: usize = 13;
    pub const QUEEN_PROTECT_KPOS: usize = 14;

    // Castling and king shelter.
    pub const ROOK_TRAPPED_BY_KING: usize = 15;
    pub const PAWN_PROTECTS_KING1: usize = 16;
    pub const PAWN_PROTECTS_KING2: usize = 17;
    pub const PAWN_PROTECTS_KING3: usize = 18;
    pub const CASTLE_KNIGHT_GUARD: usize = 19;
    pub const CASTLE_HOLE1: usize = 20;
    pub const CASTLE_HOLE2: usize = 21;
    pub const CASTLE_HOLE3: usize = 22;
    pub const CASTLE_HOLE_DANGER: usize = 23;
    pub const KING_OPPOSITION: usize = 24;
    pub const CAN_KCASTLE_BONUS: usize = 25;
    pub const CAN_QCASTLE_BONUS: usize = 26;
    pub const CAN_KQCASTLE_BONUS: usize = 27;
    pub const KCASTLE_PATH_EMPTY: usize = 28;
    pub const QCASTLE_PATH_EMPTY: usize = 29;

    // Close-to-enemy-king bonuses.
    pub const CTEK_HOLE: usize = 30;
    pub const CTEK_HOLE_Q: usize = 31;
    pub const CTEK_PAWN1: usize = 32;
    pub const CTEK_PAWN2: usize = 33;
    pub const CTEK_KNIGHT: usize = 34;
    pub const CTEK_BISHOP: usize = 35;
    pub const CTEK_ROOK: usize = 36;
    pub const CTEK_QUEEN3: usize = 37;
    pub const CTEK_QUEEN2: usize = 38;

    // Bishops.
    pub const BISHOP_IMMOBILE: usize = 39;
    pub const CENTER_BLOCK_BISHOP1: usize = 40;
    pub const CENTER_BLOCK_BISHOP2: usize = 41;
    pub const TWO_BISHOP_SYNERGY: usize = 42;
    pub const BISHOP_PIN_K: usize = 43;
    pub const BISHOP_PIN_Q: usize = 44;
    pub const BISHOP_PIN_R: usize = 45;

    // Pawns.
    pub const PAWN_FORK: usize = 46;
    pub const PAWN_SIDE_FILE: usize = 47;
    pub const PAWN_DOUBLED: usize = 48;
    pub const PAWN_SPLIT: usize = 49;
    pub const PAWN_PROTECT1: usize = 50;
    pub const PAWN_PROTECT2: usize = 51;
    pub const BISHOP_PROTECT_PAWN: usize = 52;
    pub const PASSED_PAWN_PROTECT1: usize = 53;
    pub const PASSED_PAWN_PROTECT2: usize = 54;
    pub const PASSED_PAWN_ALONE: usize = 55;
    pub const PASSED_PAWN_VULNERABLE: usize = 56;
    pub const PASSED_3_FROM_PROM: usize = 57;
    pub const PASSED_2_FROM_PROM: usize = 58;
    pub const PASSED_1_FROM_PROM: usize = 59;
    pub const PASSED_PIECE_BLOCK: usize = 60;
    pub const BLOCKED_2_FROM_PROM: usize = 61;

    // Rooks.
    pub const ROOK_PIN_Q: usize = 62;
    pub const ROOK_PIN_K: usize = 63;
    pub const ROOK_OPEN_FILE: usize = 64;
    pub const ROOK_CAN_REACH_7TH_RANK: usize = 65;
    pub const ROOK_ON_7TH_RANK: usize = 66;
    pub const ROOK_CONNECT_VERT: usize = 67;
    pub const ROOK_CONNECT_HOR: usize = 68;
    pub const ROOK_IMMOBILE_HORIZ: usize = 69;
    pub const ROOK_IMMOBILE: usize = 70;
    pub const ROOK_BACKS_PASSED_PAWN1: usize = 71;
    pub const ROOK_BACKS_PASSED_PAWN2: usize = 72;

    // Move ordering.
    pub const PREV_SQUARE_BONUS: usize = 73;
    pub const ORDER_CHECK_BONUS: usize = 74;
    pub const KILLER_MOVE_BONUS: usize = 75;
    pub const HASH_HIST_SHIFT: usize = 76;
    pub const PAWN_CAPTURE_PENALTY: usize = 77;
    pub const PAWN_DANGER_PENALTY: usize = 78;
    pub const FORWARD_BONUS: usize = 79;
    pub const CASTLE_BONUS: usize = 80;

    // Knights.
    pub const KNIGHT_FORK_UNCERTAINTY: usize = 81;
}

const DEFAULTS: [i32; GENE_COUNT] = [
    2,     // ESCAPE_CHECK_DEPTH
    2,     // MAX_CHECK_DEPTH
    10000, // HASH_HIST_MAX
    4,     // HASH_HIST_INCREMENT
    180,   // SAFE_EVAL_PRUNE_MARGIN
    10,    // CHECK_BONUS
    4,     // TEMPO_BONUS
    4,     // KNIGHT_ATTACK_KPOS
    4,     // BISHOP_ATTACK_KPOS
    6,     // ROOK_ATTACK_KPOS
    8,     // QUEEN_ATTACK_KPOS
    2,     // KNIGHT_PROTECT_KPOS
    2,     // BISHOP_PROTECT_KPOS
    3,     // ROOK_PROTECT_KPOS
    3,     // QUEEN_PROTECT_KPOS
    12,    // ROOK_TRAPPED_BY_KING
    10,    // PAWN_PROTECTS_KING1
    8,     // PAWN_PROTECTS_KING2
    4,     // PAWN_PROTECTS_KING3
    6,     // CASTLE_KNIGHT_GUARD
    12,    // CASTLE_HOLE1
    14,    // CASTLE_HOLE2
    10,    // CASTLE_HOLE3
    6,     // CASTLE_HOLE_DANGER
    8,     // KING_OPPOSITION
    8,     // CAN_KCASTLE_BONUS
    6,     // CAN_QCASTLE_BONUS
    12,    // CAN_KQCASTLE_BONUS
    3,     // KCASTLE_PATH_EMPTY
    2,     // QCASTLE_PATH_EMPTY
    10,    // CTEK_HOLE
    50,    // CTEK_HOLE_Q
    20,    // CTEK_PAWN1
    10,    // CTEK_PAWN2
    8,     // CTEK_KNIGHT
    6,     // CTEK_BISHOP
    10,    // CTEK_ROOK
    12,    // CTEK_QUEEN3
    20,    // CTEK_QUEEN2
    8,     // BISHOP_IMMOBILE
    12,    // CENTER_BLOCK_BISHOP1
    8,     // CENTER_BLOCK_BISHOP2
    12,    // TWO_BISHOP_SYNERGY
    10,    // BISHOP_PIN_K
    12,    // BISHOP_PIN_Q
    6,     // BISHOP_PIN_R
    15,    // PAWN_FORK
    3,     // PAWN_SIDE_FILE
    6,     // PAWN_DOUBLED
    6,     // PAWN_SPLIT
    3,     // PAWN_PROTECT1
    5,     // PAWN_PROTECT2
    2,     // BISHOP_PROTECT_PAWN
    12,    // PASSED_PAWN_PROTECT1
    16,    // PASSED_PAWN_PROTECT2
    6,     // PASSED_PAWN_ALONE
    8,     // PASSED_PAWN_VULNERABLE
    15,    // PASSED_3_FROM_PROM
    30,    // PASSED_2_FROM_PROM
    60,    // PASSED_1_FROM_PROM
    8,     // PASSED_PIECE_BLOCK
    10,    // BLOCKED_2_FROM_PROM
    8,     // ROOK_PIN_Q
    10,    // ROOK_PIN_K
    8,     // ROOK_OPEN_FILE
    4,     // ROOK_CAN_REACH_7TH_RANK
    12,    // ROOK_ON_7TH_RANK
    4,     // ROOK_CONNECT_VERT
    3,     // ROOK_CONNECT_HOR
    4,     // ROOK_IMMOBILE_HORIZ
    8,     // ROOK_IMMOBILE
    20,    // ROOK_BACKS_PASSED_PAWN1
    28,    // ROOK_BACKS_PASSED_PAWN2
    30,    // PREV_SQUARE_BONUS
    25,    // ORDER_CHECK_BONUS
    100,   // KILLER_MOVE_BONUS
    3,     // HASH_HIST_SHIFT
    10,    // PAWN_CAPTURE_PENALTY
    10,    // PAWN_DANGER_PENALTY
    2,     // FORWARD_BONUS
    20,    // CASTLE_BONUS
    1,     // KNIGHT_FORK_UNCERTAINTY
];

#[derive(Clone, PartialEq, Eq)]
pub struct Gene {
    pub v: [i32; GENE_COUNT],
}

impl Gene {
    #[must_use]
    pub fn new() -> Gene {
        Gene { v: DEFAULTS }
    }

    /// Reset every slot to the compiled defaults.
    pub fn reset(&mut self) {
        self.v = DEFAULTS;
    }

    /// Load a gene from a file. Returns `Ok(true)` when the file existed
    /// and parsed, `Ok(false)` when it did not exist (defaults are left
    /// in place), and an error for a present-but-malformed file.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> io::Result<bool> {
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err),
        };

        let mut numbers = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .flat_map(str::split_whitespace);

        let version: u32 = numbers
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| bad_gene("missing version"))?;
        if version != GENE_FILE_VERSION {
            return Err(bad_gene("unsupported gene file version"));
        }

        let mut values = [0i32; GENE_COUNT];
        for value in &mut values {
            *value = numbers
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or_else(|| bad_gene("too few gene values"))?;
        }
        if numbers.next().is_some() {
            return Err(bad_gene("too many gene values"));
        }

        self.v = values;
        Ok(true)
    }

    /// Write the gene in the textual format `load` reads.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut out = Vec::with_capacity(GENE_COUNT * 6 + 16);
        writeln!(out, "{GENE_FILE_VERSION}")?;
        for value in &self.v {
            writeln!(out, "{value}")?;
        }
        fs::write(path, out)
    }
}

fn bad_gene(reason: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("gene file: {reason}"))
}

impl Default for Gene {
    fn default() -> Self {
        Gene::new()
    }
}

impl fmt::Debug for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gene([{} slots])", GENE_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_every_slot() {
        let gene = Gene::new();
        assert_eq!(gene.v.len(), GENE_COUNT);
        assert_eq!(gene.v[slot::KILLER_MOVE_BONUS], 100);
        assert_eq!(gene.v[slot::KNIGHT_FORK_UNCERTAINTY], 1);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = std::env::temp_dir().join("caissa-gene-test");
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("test.gen");

        let mut gene = Gene::new();
        gene.v[slot::TEMPO_BONUS] = 9;
        gene.save(&path).expect("save");

        let mut loaded = Gene::new();
        assert!(loaded.load(&path).expect("load"));
        assert_eq!(loaded, gene);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_keeps_defaults() {
        let mut gene = Gene::new();
        let loaded = gene
            .load("definitely/not/a/real/path.gen")
            .expect("missing file is not an error");
        assert!(!loaded);
        assert_eq!(gene, Gene::new());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = std::env::temp_dir().join("caissa-gene-test");
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("bad.gen");
        std::fs::write(&path, "not a number\n").expect("write");
        let mut gene = Gene::new();
        assert!(gene.load(&path).is_err());
        std::fs::remove_file(&path).ok();
    }
}
