use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use super::{question_id, QuizQuestion};

pub const DEFAULT_DRAW_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct DeckDraw {
    /// Indices into the bank, in presentation order.
    pub deck: Vec<usize>,
    pub updated_seen: HashSet<String>,
    /// The unseen pool was too small and the whole bank was reshuffled.
    pub reset_seen: bool,
}

pub fn build_deck(bank: &[QuizQuestion], draw_count: usize, seen: &HashSet<String>) -> DeckDraw {
    build_deck_with(bank, draw_count, seen, &mut rand::thread_rng())
}

/// Draws `min(draw_count, bank.len())` questions nobody has seen this session.
/// When too few unseen questions remain, the seen set starts over from the
/// fresh draw alone.
pub fn build_deck_with<R: Rng + ?Sized>(
    bank: &[QuizQuestion],
    draw_count: usize,
    seen: &HashSet<String>,
    rng: &mut R,
) -> DeckDraw {
    let n = draw_count.min(bank.len());

    let unseen: Vec<usize> = (0..bank.len())
        .filter(|&i| !seen.contains(&question_id(bank, i)))
        .collect();

    let reset_seen = unseen.len() < n;
    let mut candidates = if reset_seen {
        (0..bank.len()).collect()
    } else {
        unseen
    };

    candidates.shuffle(rng);
    candidates.truncate(n);

    let mut updated_seen = if reset_seen {
        HashSet::new()
    } else {
        seen.clone()
    };
    updated_seen.extend(candidates.iter().map(|&i| question_id(bank, i)));

    DeckDraw {
        deck: candidates,
        updated_seen,
        reset_seen,
    }
}
