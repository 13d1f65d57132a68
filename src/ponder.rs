//! Thinking on the opponent's time.
//!
//! A long-lived worker thread owns a private `ComputerPlayer` (quiet, its
//! own transposition table and history) and waits for work. When the
//! engine commits to a move and has a predicted reply, the host hands the
//! worker a copy of the board plus the two moves; the worker applies
//! both, remembers the hash of the position it is speculating on, and
//! searches it on a generous clock. When the opponent actually moves,
//! `finish_thinking` either converts the speculative search into the real
//! one (prediction hit: grant the remaining budget, or take the result
//! immediately) or aborts it.
//!
//! The handshake preserves the original semantics with modern
//! primitives: the request is *moved* into the worker under a mutex, and
//! `start_thinking` blocks on a condvar until the worker has taken it, so
//! the host can never mutate a board the worker is still reading. The
//! canceller keeps re-asserting the abort flag while waiting, because a
//! search clears the flag when a new top-level call begins.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use parking_lot::{Condvar, Mutex};

use crate::board::{Board, Move};
use crate::search::{ComputerPlayer, SearchReport};
use crate::sync::SearchControl;
use crate::ui::UiHandle;

/// Initial speculative budget: effectively "until told otherwise".
const PONDER_TIME_LIMIT_CS: i64 = 360_000;

/// A prediction hit must leave at least this much budget to be worth
/// continuing; less and the worker's answer is taken as-is.
const MIN_EXTRA_TIME_CS: i64 = 20;

struct PonderRequest {
    board: Board,
    my_move: Move,
    predicted_reply: Move,
}

#[derive(Default)]
struct PonderState {
    request: Option<PonderRequest>,
    /// Set by the worker once it owns the request's board.
    acknowledged: bool,
    /// Set by the worker when its search concluded (or was aborted).
    finished: bool,
    /// Hash of the position the worker is searching, for hit detection.
    expected_hash: u32,
    started_at: Option<Instant>,
    outcome: Option<SearchReport>,
    shutdown: bool,
}

struct PonderShared {
    state: Mutex<PonderState>,
    changed: Condvar,
}

/// Host-side handle to the ponder worker.
pub struct Ponderer {
    shared: Arc<PonderShared>,
    control: SearchControl,
    handle: Option<JoinHandle<()>>,
    active: bool,
}

impl Ponderer {
    /// Spawn the worker with its own player instance.
    #[must_use]
    pub fn new(ui: UiHandle, tt_megabytes: usize) -> Ponderer {
        let mut player = ComputerPlayer::new(ui, tt_megabytes);
        player.mark_ponder_instance();
        player.set_search_bias(true);
        player.set_opening_book_enabled(false);
        player.set_training_enabled(false);

        let control = player.search_control();
        let shared = Arc::new(PonderShared {
            state: Mutex::new(PonderState {
                finished: true,
                ..PonderState::default()
            }),
            changed: Condvar::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let handle = std::thread::Builder::new()
            .name("ponder".to_string())
            .spawn(move || worker_loop(&worker_shared, player))
            .expect("failed to spawn ponder thread");

        Ponderer {
            shared,
            control,
            handle: Some(handle),
            active: false,
        }
    }

    /// Begin speculating: `board` is the position *before* our move.
    /// Blocks only until the worker acknowledges taking the inputs.
    pub fn start_thinking(&mut self, board: &Board, my_move: Move, predicted_reply: Move) {
        let mut state = self.shared.state.lock();
        state.request = Some(PonderRequest {
            board: board.clone(),
            my_move,
            predicted_reply,
        });
        state.acknowledged = false;
        state.finished = false;
        state.outcome = None;
        state.expected_hash = 0;
        state.started_at = Some(Instant::now());
        self.changed_notify();
        while !state.acknowledged {
            self.shared.changed.wait(&mut state);
        }
        self.active = true;
        log::debug!("pondering started on predicted reply {predicted_reply:?}");
    }

    /// The opponent has moved and it is our turn in `new_board`.
    ///
    /// Returns the move to play (with the next prediction) when the
    /// worker's speculation matched and produced a legal move; `None`
    /// means the caller must run a fresh search. On a hit, pondering on
    /// the following position starts immediately.
    pub fn finish_thinking(
        &mut self,
        new_board: &mut Board,
        time_budget_cs: i64,
    ) -> Option<(Move, Option<Move>, i64)> {
        if !self.active {
            return None;
        }
        self.active = false;

        let (hit, started_at) = {
            let state = self.shared.state.lock();
            (
                state.expected_hash != 0 && state.expected_hash == new_board.hash(),
                state.started_at,
            )
        };

        let already_spent_cs = started_at.map_or(0, |t| (t.elapsed().as_millis() / 10) as i64);

        if hit {
            let extra = time_budget_cs - already_spent_cs;
            if extra < MIN_EXTRA_TIME_CS {
                self.abort_and_wait();
            } else {
                self.control
                    .set_deadline(Some(Instant::now() + std::time::Duration::from_millis(
                        extra as u64 * 10,
                    )));
                self.wait_finished();
            }
        } else {
            self.abort_and_wait();
        }

        if !hit {
            return None;
        }

        let outcome = {
            let state = self.shared.state.lock();
            state.outcome
        }?;
        let my_response = outcome.best_move?;
        if !new_board.is_legal(my_response) {
            return None;
        }

        let time_spent_cs = started_at.map_or(0, |t| (t.elapsed().as_millis() / 10) as i64);

        // Still on a roll: keep thinking about the next position.
        if let Some(next_prediction) = outcome.predicted_reply {
            self.start_thinking(new_board, my_response, next_prediction);
        }

        Some((my_response, outcome.predicted_reply, time_spent_cs))
    }

    /// Abort any speculation in progress (opponent resigned, game over,
    /// pondering switched off).
    pub fn abort_search(&mut self) {
        if self.active {
            self.abort_and_wait();
            self.active = false;
        }
    }

    fn wait_finished(&self) {
        let mut state = self.shared.state.lock();
        while !state.finished {
            self.shared.changed.wait(&mut state);
        }
    }

    fn abort_and_wait(&self) {
        let mut state = self.shared.state.lock();
        while !state.finished {
            // Re-assert every pass: the worker clears the abort flag
            // when its search call starts, so one shot can be lost.
            self.control.abort();
            let timeout = std::time::Duration::from_millis(50);
            let _ = self
                .shared
                .changed
                .wait_for(&mut state, timeout);
        }
    }

    fn changed_notify(&self) {
        self.shared.changed.notify_all();
    }
}

impl Drop for Ponderer {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.shutdown = true;
        }
        // Keep aborting until the worker reports finished; a single
        // abort can be consumed by a search that is just starting.
        self.abort_and_wait();
        self.shared.changed.notify_all();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop(shared: &PonderShared, mut player: ComputerPlayer) {
    loop {
        // Wait state: idle until the host posts a request.
        let request = {
            let mut state = shared.state.lock();
            loop {
                if state.shutdown {
                    state.finished = true;
                    shared.changed.notify_all();
                    return;
                }
                if let Some(request) = state.request.take() {
                    // Taking ownership of the board copy IS the
                    // acknowledgment; the host may now touch its own
                    // board again.
                    state.acknowledged = true;
                    state.finished = false;
                    shared.changed.notify_all();
                    break request;
                }
                shared.changed.wait(&mut state);
            }
        };

        let PonderRequest {
            mut board,
            my_move,
            predicted_reply,
        } = request;

        let mut outcome = None;
        let mut expected_hash = 0;

        if board.is_legal(my_move) {
            let mut mine = my_move;
            board.make_move(&mut mine, true, true);
            if board.is_legal(predicted_reply) {
                let mut reply = predicted_reply;
                board.make_move(&mut reply, true, true);
                expected_hash = board.hash();
                {
                    let mut state = shared.state.lock();
                    state.expected_hash = expected_hash;
                }

                player.set_time_limit(PONDER_TIME_LIMIT_CS);
                let report = player.find_move(&mut board);
                outcome = Some(report);
            }
        }

        let mut state = shared.state.lock();
        state.outcome = outcome;
        state.expected_hash = expected_hash;
        state.finished = true;
        shared.changed.notify_all();
        log::debug!("ponder worker finished (hit hash {expected_hash:08x})");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::NullUi;

    fn quick_position() -> Board {
        Board::new()
    }

    #[test]
    fn miss_falls_back_to_fresh_search() {
        let mut ponderer = Ponderer::new(Arc::new(NullUi), 1);
        let mut board = quick_position();

        let my_move = board.scan_move("e4").expect("e4");
        let predicted = {
            let mut after = board.clone();
            let mut mv = my_move;
            after.make_move(&mut mv, true, true);
            after.scan_move("e5").expect("e5")
        };

        ponderer.start_thinking(&board, my_move, predicted);

        // The opponent plays something else entirely.
        let mut actual = board.clone();
        let mut mv = actual.scan_move("e4").expect("e4");
        actual.make_move(&mut mv, true, true);
        let mut reply = actual.scan_move("c5").expect("c5");
        actual.make_move(&mut reply, true, true);

        let result = ponderer.finish_thinking(&mut actual, 500);
        assert!(result.is_none(), "a miss must not return a move");
    }

    #[test]
    fn hit_returns_a_legal_move() {
        let mut ponderer = Ponderer::new(Arc::new(NullUi), 1);
        let mut board = quick_position();

        let my_move = board.scan_move("e4").expect("e4");
        let predicted = {
            let mut after = board.clone();
            let mut mv = my_move;
            after.make_move(&mut mv, true, true);
            after.scan_move("e5").expect("e5")
        };

        ponderer.start_thinking(&board, my_move, predicted);

        // Give the worker a moment to get going, then play into the
        // prediction.
        std::thread::sleep(std::time::Duration::from_millis(120));
        let mut actual = board.clone();
        let mut mv = actual.scan_move("e4").expect("e4");
        actual.make_move(&mut mv, true, true);
        let mut reply = actual.scan_move("e5").expect("e5");
        actual.make_move(&mut reply, true, true);

        // A tiny budget forces the "take the answer now" path.
        if let Some((mv, _prediction, _spent)) = ponderer.finish_thinking(&mut actual, 1) {
            assert!(actual.is_legal(mv));
        }
        ponderer.abort_search();
    }

    #[test]
    fn abort_is_safe_when_idle() {
        let mut ponderer = Ponderer::new(Arc::new(NullUi), 1);
        ponderer.abort_search();
    }
}
