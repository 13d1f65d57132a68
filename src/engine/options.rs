//! Engine configuration.

use std::path::PathBuf;

use crate::score::Score;
use crate::search::ComputerPlayer;

/// Everything a host can configure about the core. Field defaults give a
/// casual fixed-depth player with pondering off.
#[derive(Clone, Debug)]
pub struct EngineOptions {
    /// Fixed-depth search in plies. Ignored when a time limit is set.
    pub search_depth: Option<i32>,
    /// Timed search budget in centiseconds; values below 10 are raised
    /// to 10.
    pub time_limit_cs: Option<i64>,
    /// Stop after this many evaluated positions (0 = unlimited).
    pub max_nodes: u64,
    /// Shuffle root moves before sorting, randomizing play among equal
    /// moves.
    pub search_bias: bool,
    /// Convert to fixed depth when the score collapses at the deadline.
    pub extend_search: bool,
    /// Consult the opening book.
    pub opening_book: bool,
    /// Consult and update the experience tree.
    pub training: bool,
    /// Permit `get_move` to resign.
    pub allow_resign: bool,
    /// Centipawns against the mover before resigning (clamped to
    /// 400..=20000).
    pub resign_threshold: Score,
    /// Think on the opponent's time.
    pub ponder: bool,
    /// Transposition table budget in megabytes (1..=1024), split across
    /// the two side-to-move tables.
    pub tt_megabytes: usize,
    /// Evaluation gene file; `None` means the per-side default names.
    pub gene_file: Option<PathBuf>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            search_depth: Some(3),
            time_limit_cs: None,
            max_nodes: 0,
            search_bias: true,
            extend_search: false,
            opening_book: true,
            training: true,
            allow_resign: false,
            resign_threshold: 1200,
            ponder: false,
            tt_megabytes: 1,
            gene_file: None,
        }
    }
}

impl EngineOptions {
    /// Push these options into a player. Called once at engine
    /// construction; hosts can adjust the player afterwards.
    pub(crate) fn apply_to(&self, player: &mut ComputerPlayer) {
        if let Some(cs) = self.time_limit_cs {
            player.set_time_limit(cs);
        } else if let Some(depth) = self.search_depth {
            player.set_search_depth(depth);
        }
        if self.max_nodes > 0 {
            player.set_max_nodes_evaluated(self.max_nodes.max(100));
        }
        player.set_search_bias(self.search_bias);
        player.set_extend_search(self.extend_search);
        player.set_opening_book_enabled(self.opening_book);
        player.set_training_enabled(self.training);
        player.set_gene_file(self.gene_file.clone());
    }

    /// The resign threshold with its documented clamp applied.
    #[must_use]
    pub fn clamped_resign_threshold(&self) -> Score {
        self.resign_threshold.clamp(400, 20000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let options = EngineOptions::default();
        assert_eq!(options.search_depth, Some(3));
        assert!(!options.ponder);
        assert_eq!(options.clamped_resign_threshold(), 1200);
    }

    #[test]
    fn resign_threshold_clamps() {
        let mut options = EngineOptions::default();
        options.resign_threshold = 10;
        assert_eq!(options.clamped_resign_threshold(), 400);
        options.resign_threshold = 50_000;
        assert_eq!(options.clamped_resign_threshold(), 20000);
    }
}
