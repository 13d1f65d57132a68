//! Transposition table: memoized search results keyed by board hash.
//!
//! Two open-addressed tables, one for positions with White to move and
//! one for Black, sized from a megabyte budget split equally. Lookups
//! probe a short run of consecutive slots; stores use a three-pass
//! replacement scheme that prefers fresh or matching slots, then stale
//! entries from earlier searches, then the weakest live entry.

use crate::board::Move;
use crate::score::Score;

/// Probe-chain length before giving up on a lookup or store pass.
const COLLISION_RESOLVE: usize = 16;

/// Fallback slot count when no memory budget is given (about 800K per
/// side).
const DEFAULT_POOL_SIZE: usize = 49_663;

const XF_STALE: u8 = 0x01;

/// One memoized position: what was searched below it, with what window,
/// and the best reply found.
#[derive(Clone, Copy, Debug)]
pub struct TransEntry {
    pub(crate) board_hash: u32,
    /// Plies searched below the node when this was stored.
    pub(crate) searched_depth: u8,
    /// Plies from the root at store time; tiebreaker only.
    pub(crate) future: u8,
    pub(crate) flags: u8,
    /// Best reply; its `score` field carries the search result.
    pub best_reply: Move,
    pub(crate) alpha: Score,
    pub(crate) beta: Score,
}

impl TransEntry {
    const fn empty() -> TransEntry {
        TransEntry {
            board_hash: 0,
            searched_depth: 0,
            future: 0,
            flags: 0,
            best_reply: Move::null(),
            alpha: 0,
            beta: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn searched_depth(&self) -> i32 {
        self.searched_depth as i32
    }

    #[inline]
    #[must_use]
    pub fn future(&self) -> i32 {
        self.future as i32
    }

    /// The stored score was a true minimax value, not a window-clipped
    /// bound.
    #[inline]
    #[must_use]
    pub fn score_is_inside_window(&self) -> bool {
        self.alpha <= self.best_reply.score && self.best_reply.score <= self.beta
    }

    /// The stored window encloses the asking window, so the stored score
    /// is valid for the asker.
    #[inline]
    #[must_use]
    pub fn compatible_window(&self, alpha: Score, beta: Score) -> bool {
        self.alpha <= alpha && beta <= self.beta
    }
}

/// Counters for table behavior; reported through the host statistics.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransStats {
    pub tries: u64,
    pub hits: u64,
    pub stores: u64,
    /// Stores into an empty or same-position slot.
    pub fresh: u64,
    /// Stores that kept an existing better entry instead.
    pub inferior: u64,
    /// Stores into a stale slot.
    pub stales: u64,
    /// Stores that overwrote a live but weaker entry.
    pub stomps: u64,
    /// Stores that found nowhere to go.
    pub failures: u64,
}

pub struct TranspositionTable {
    white_table: Vec<TransEntry>,
    black_table: Vec<TransEntry>,
    entries_per_side: usize,
    stats: TransStats,
}

impl TranspositionTable {
    /// Build with a memory budget in megabytes (clamped to 1..=1024),
    /// split equally between the two sides' tables.
    #[must_use]
    pub fn new(memory_megabytes: usize) -> TranspositionTable {
        let entries_per_side = if memory_megabytes == 0 {
            DEFAULT_POOL_SIZE
        } else {
            let megabytes = memory_megabytes.min(1024);
            let entry_size = std::mem::size_of::<TransEntry>();
            (megabytes * 1024 * 1024 / 2) / entry_size
        };

        TranspositionTable {
            white_table: vec![TransEntry::empty(); entries_per_side],
            black_table: vec![TransEntry::empty(); entries_per_side],
            entries_per_side,
            stats: TransStats::default(),
        }
    }

    #[must_use]
    pub fn entries_per_side(&self) -> usize {
        self.entries_per_side
    }

    #[must_use]
    pub fn stats(&self) -> TransStats {
        self.stats
    }

    /// Wipe both tables. Used for new games and explicit cache clears.
    pub fn reset(&mut self) {
        self.white_table.fill(TransEntry::empty());
        self.black_table.fill(TransEntry::empty());
        self.stats = TransStats::default();
    }

    /// Mark every occupied entry stale. Stale entries remain usable as
    /// ordering hints but are the first to be replaced; storing into one
    /// refreshes it.
    pub fn start_new_search(&mut self) {
        for entry in &mut self.white_table {
            entry.flags |= XF_STALE;
        }
        for entry in &mut self.black_table {
            entry.flags |= XF_STALE;
        }
    }

    /// Find the entry for `hash`, if present.
    #[must_use]
    pub fn locate(&mut self, white_to_move: bool, hash: u32) -> Option<&TransEntry> {
        self.stats.tries += 1;
        let n = self.entries_per_side;
        let mut index = hash as usize % n;
        let mut found = None;

        let table = if white_to_move {
            &self.white_table
        } else {
            &self.black_table
        };
        for _ in 0..COLLISION_RESOLVE {
            let entry = &table[index];
            if entry.board_hash == hash {
                found = Some(index);
                break;
            }
            if entry.board_hash == 0 {
                // An empty slot terminates the probe chain.
                break;
            }
            index += 1;
            if index >= n {
                index = 0;
            }
        }

        let hit = found?;
        self.stats.hits += 1;
        let table = if white_to_move {
            &self.white_table
        } else {
            &self.black_table
        };
        Some(&table[hit])
    }

    /// Remember a searched node. `level` is the iteration depth, `depth`
    /// the node's ply from the root; the remaining depth below the node
    /// is what makes an entry valuable.
    #[allow(clippy::too_many_arguments)]
    pub fn remember(
        &mut self,
        white_to_move: bool,
        hash: u32,
        level: i32,
        depth: i32,
        best_reply: Move,
        alpha: Score,
        beta: Score,
    ) {
        let searched_depth = (level - depth).max(0).min(255) as u8;
        let future = depth.clamp(0, 255) as u8;
        self.stats.stores += 1;

        let n = self.entries_per_side;
        let ideal = hash as usize % n;
        let table = if white_to_move {
            &mut self.white_table
        } else {
            &mut self.black_table
        };

        let new_entry = TransEntry {
            board_hash: hash,
            searched_depth,
            future,
            flags: 0,
            best_reply,
            alpha,
            beta,
        };

        // Pass 1: an unused slot, or an older copy of this position that
        // the new result beats.
        let mut index = ideal;
        for _ in 0..COLLISION_RESOLVE {
            let existing = &table[index];
            let mut better = false;

            if existing.board_hash == hash {
                if searched_depth > existing.searched_depth {
                    better = true;
                } else if searched_depth == existing.searched_depth
                    && !existing.score_is_inside_window()
                {
                    let new_inside = alpha <= best_reply.score && best_reply.score <= beta;
                    better = new_inside || future < existing.future;
                }
            } else if existing.board_hash == 0 {
                better = true;
            }

            if better {
                self.stats.fresh += 1;
                table[index] = new_entry;
                return;
            }
            if existing.board_hash == hash {
                // Same position already stored with a better result.
                self.stats.inferior += 1;
                return;
            }

            index += 1;
            if index >= n {
                index = 0;
            }
        }

        // Pass 2: a slot left stale by start_new_search.
        let mut index = ideal;
        for _ in 0..COLLISION_RESOLVE {
            if table[index].flags & XF_STALE != 0 {
                self.stats.stales += 1;
                table[index] = new_entry;
                return;
            }
            index += 1;
            if index >= n {
                index = 0;
            }
        }

        // Pass 3: stomp the weakest live entry in the chain. Continues
        // from where pass 2 left off, matching the original scheme.
        for _ in 0..COLLISION_RESOLVE {
            let existing = &table[index];
            let mut new_better = searched_depth > existing.searched_depth;
            if !new_better && searched_depth == existing.searched_depth {
                if future < existing.future {
                    // Positions nearer the root recur more often.
                    new_better = true;
                } else if future == existing.future {
                    // Final tiebreak: the score likelier to cause
                    // cutoffs for this side.
                    new_better = if white_to_move {
                        best_reply.score > existing.best_reply.score
                    } else {
                        best_reply.score < existing.best_reply.score
                    };
                }
            }

            if new_better {
                self.stats.stomps += 1;
                table[index] = new_entry;
                return;
            }
            index += 1;
            if index >= n {
                index = 0;
            }
        }

        self.stats.failures += 1;
    }
}
