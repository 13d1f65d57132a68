//! Cooperative time control.
//!
//! The search has no suspension points; it polls `check_time_limit`
//! every `time_check_limit` visited nodes. The poll interval tunes
//! itself: when a whole interval took more than a tenth of a second of
//! wall time the limit halves, when it took less than a twentieth it
//! grows. Abort requests from outside land in the shared `SearchControl`
//! and are latched here.

use std::time::{Duration, Instant};

use super::{ComputerPlayer, SearchType};

#[inline]
#[must_use]
pub(crate) fn centis(cs: i64) -> Duration {
    Duration::from_millis((cs.max(0) as u64) * 10)
}

#[inline]
#[must_use]
pub(crate) fn centis_since(start: Instant) -> i64 {
    (start.elapsed().as_millis() / 10) as i64
}

impl ComputerPlayer {
    /// Ask the running search to stop at its next poll. Callable from
    /// any thread via `search_control()`.
    pub fn abort_search(&self) {
        self.control.abort();
    }

    /// Returns true when the search must unwind. Called at every node
    /// entry; cheap unless the node counter trips the poll interval.
    pub(crate) fn check_time_limit(&mut self) -> bool {
        if self.search_aborted {
            return true;
        }
        if self.control.is_aborted() {
            self.search_aborted = true;
            return true;
        }

        match self.search_type {
            SearchType::MaxEval => {
                if self.eval.evaluated >= self.max_nodes_evaluated {
                    self.search_aborted = true;
                    return true;
                }
                false
            }
            SearchType::Timed => {
                self.time_check_counter += 1;
                if self.time_check_counter < self.time_check_limit {
                    return false;
                }
                self.time_check_counter = 0;
                let now = Instant::now();

                if self.control.deadline_expired(now) {
                    if self.extend_search_flag {
                        // Did the expected score drop sharply since the
                        // previous completed level? Then finishing this
                        // level matters more than the clock: convert to
                        // a fixed-depth search and restore the time
                        // limit afterwards.
                        let mut drop = self.expected_score_now - self.expected_score_prev;
                        if self.computer_playing_white {
                            drop = -drop;
                        }
                        if drop > 60 {
                            self.revert_time_limit_cs = self.time_limit_cs;
                            self.set_search_depth(self.level);
                            log::debug!(
                                "score dropped {drop}; extending search at level {}",
                                self.level
                            );
                            return false;
                        }
                    }

                    if now.duration_since(self.prev_check_time) > Duration::from_millis(100) {
                        self.time_check_limit = (self.time_check_limit / 2).max(1);
                    }
                    self.search_aborted = true;
                    return true;
                }

                if now.duration_since(self.prev_check_time) < Duration::from_millis(50) {
                    self.time_check_limit += 100;
                }
                self.prev_check_time = now;
                false
            }
            SearchType::Depth => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centis_round_trip() {
        assert_eq!(centis(150), Duration::from_millis(1500));
        assert_eq!(centis(-5), Duration::ZERO);
    }

    #[test]
    fn external_abort_latches() {
        let mut player = ComputerPlayer::detached(1);
        player.set_search_depth(6);
        assert!(!player.check_time_limit());
        player.search_control().abort();
        assert!(player.check_time_limit());
        // Latched even after the control clears.
        player.control.clear_abort();
        assert!(player.check_time_limit());
    }

    #[test]
    fn expired_deadline_aborts_a_timed_search() {
        let mut player = ComputerPlayer::detached(1);
        player.set_time_limit(10);
        player.control.set_deadline(Some(Instant::now() - Duration::from_millis(1)));
        player.time_check_limit = 1;
        assert!(player.check_time_limit());
        assert!(player.search_aborted);
    }
}
