#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Compact string codec for a room's terrain knowledge.
//!
//! Compression walks the row-major code sequence and emits one token per run
//! of identical symbols: the bare symbol for a single cell, the symbol doubled
//! for two cells, and the symbol followed by its decimal length otherwise. A
//! second pass folds stretches where a short group of tokens repeats at least
//! three times back to back into `(group)count`. Decompression expands the
//! folds and then replays the run tokens.
//!
//! The fold pass is a greedy single sweep. It produces reasonable output for
//! periodic terrain, not the shortest possible string.

use std::iter::Peekable;
use std::str::CharIndices;

use terrain_knowledge_core::{TerrainCode, ROOM_AREA};
use thiserror::Error;

/// Longest token group the fold pass tries to repeat.
const MAX_FOLD_WIDTH: usize = 8;

/// Fewest back-to-back occurrences worth folding.
const MIN_FOLD_REPEATS: usize = 3;

/// Upper bound on the fold-expanded token stream, in bytes.
const MAX_EXPANDED_LEN: usize = ROOM_AREA * 8;

/// Reasons a persisted terrain string could not be restored.
///
/// Positions are byte offsets: into the raw string for fold errors, and into
/// the fold-expanded token stream for run errors.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecompressError {
    /// A character outside the terrain alphabet was found.
    #[error("unexpected terrain map character '{symbol}' at offset {position}")]
    UnknownSymbol {
        /// Offending character.
        symbol: char,
        /// Offset of the character.
        position: usize,
    },
    /// A run length appeared without a symbol before it.
    #[error("run length at offset {position} has no preceding symbol")]
    DanglingLength {
        /// Offset of the first digit.
        position: usize,
    },
    /// A run declared a length of zero.
    #[error("run at offset {position} has zero length")]
    ZeroRunLength {
        /// Offset of the run symbol.
        position: usize,
    },
    /// A fold was opened but never closed.
    #[error("fold opened at offset {position} is never closed")]
    UnclosedFold {
        /// Offset of the opening parenthesis.
        position: usize,
    },
    /// A closing parenthesis appeared without an open fold.
    #[error("unbalanced ')' at offset {position}")]
    UnbalancedFold {
        /// Offset of the closing parenthesis.
        position: usize,
    },
    /// A fold was opened inside another fold.
    #[error("nested fold at offset {position}")]
    NestedFold {
        /// Offset of the inner opening parenthesis.
        position: usize,
    },
    /// A fold contained no tokens.
    #[error("empty fold at offset {position}")]
    EmptyFold {
        /// Offset of the opening parenthesis.
        position: usize,
    },
    /// A fold was not followed by its repeat count.
    #[error("fold at offset {position} is missing its repeat count")]
    MissingFoldFactor {
        /// Offset of the opening parenthesis.
        position: usize,
    },
    /// A fold declared a repeat count of zero.
    #[error("fold at offset {position} repeats zero times")]
    ZeroFoldFactor {
        /// Offset of the opening parenthesis.
        position: usize,
    },
    /// The string describes more cells than a room holds.
    #[error("terrain map describes more than 2500 cells")]
    TooManyCells,
    /// The string ended before every cell was described.
    #[error("terrain map ended after {cells} of 2500 cells")]
    Truncated {
        /// Number of cells that were described.
        cells: usize,
    },
}

/// Compresses a row-major code sequence into its persisted string form.
#[must_use]
pub fn compress(codes: &[TerrainCode]) -> String {
    let runs = run_length(codes);
    let compressed = fold_repeats(&runs);
    log::trace!(
        "compressed {} cells into {} runs and {} characters",
        codes.len(),
        runs.len(),
        compressed.len()
    );
    compressed
}

/// Restores the full room code sequence from its persisted string form.
pub fn decompress(compressed: &str) -> Result<Vec<TerrainCode>, DecompressError> {
    let expanded = expand_folds(compressed)?;
    let mut codes = Vec::with_capacity(ROOM_AREA);
    let mut chars = expanded.char_indices().peekable();

    while let Some((position, symbol)) = chars.next() {
        if symbol.is_ascii_digit() {
            return Err(DecompressError::DanglingLength { position });
        }
        let code = TerrainCode::from_symbol(symbol)
            .ok_or(DecompressError::UnknownSymbol { symbol, position })?;
        let length = take_number(&mut chars).unwrap_or(1);
        if length == 0 {
            return Err(DecompressError::ZeroRunLength { position });
        }
        if length > ROOM_AREA - codes.len() {
            return Err(DecompressError::TooManyCells);
        }
        codes.extend(std::iter::repeat(code).take(length));
    }

    if codes.len() < ROOM_AREA {
        return Err(DecompressError::Truncated { cells: codes.len() });
    }
    Ok(codes)
}

/// Restores a room in place.
///
/// On failure every cell is reset to unknown so no partially decoded state is
/// left behind.
pub fn decompress_into(
    compressed: &str,
    cells: &mut [TerrainCode; ROOM_AREA],
) -> Result<(), DecompressError> {
    match decompress(compressed) {
        Ok(codes) => {
            cells.copy_from_slice(&codes);
            Ok(())
        }
        Err(error) => {
            cells.fill(TerrainCode::UNKNOWN);
            Err(error)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Run {
    symbol: char,
    length: usize,
}

impl Run {
    fn write_to(self, out: &mut String) {
        out.push(self.symbol);
        match self.length {
            1 => {}
            2 => out.push(self.symbol),
            length => out.push_str(&length.to_string()),
        }
    }
}

fn run_length(codes: &[TerrainCode]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for code in codes {
        let symbol = code.symbol();
        match runs.last_mut() {
            Some(run) if run.symbol == symbol => run.length += 1,
            _ => runs.push(Run { symbol, length: 1 }),
        }
    }
    runs
}

fn fold_repeats(runs: &[Run]) -> String {
    let mut out = String::new();
    let mut index = 0;
    while index < runs.len() {
        let remaining = &runs[index..];
        match find_repeat(remaining) {
            Some((width, repeats)) => {
                out.push('(');
                for run in &remaining[..width] {
                    run.write_to(&mut out);
                }
                out.push(')');
                out.push_str(&repeats.to_string());
                index += width * repeats;
            }
            None => {
                remaining[0].write_to(&mut out);
                index += 1;
            }
        }
    }
    out
}

/// Finds the narrowest token group at the head of `runs` that repeats often
/// enough to fold, returning its width and total occurrence count.
fn find_repeat(runs: &[Run]) -> Option<(usize, usize)> {
    (1..=MAX_FOLD_WIDTH).find_map(|width| {
        let group = runs.get(..width)?;
        let repeats = runs
            .chunks_exact(width)
            .take_while(|chunk| *chunk == group)
            .count();
        (repeats >= MIN_FOLD_REPEATS).then_some((width, repeats))
    })
}

fn expand_folds(compressed: &str) -> Result<String, DecompressError> {
    let mut out = String::with_capacity(compressed.len());
    let mut cells = 0;
    let mut chars = compressed.char_indices().peekable();

    while let Some((position, ch)) = chars.next() {
        match ch {
            '(' => {
                let mut group = String::new();
                loop {
                    match chars.next() {
                        Some((_, ')')) => break,
                        Some((inner, '(')) => {
                            return Err(DecompressError::NestedFold { position: inner })
                        }
                        Some((_, inner)) => group.push(inner),
                        None => return Err(DecompressError::UnclosedFold { position }),
                    }
                }
                if group.is_empty() {
                    return Err(DecompressError::EmptyFold { position });
                }
                let factor = take_number(&mut chars)
                    .ok_or(DecompressError::MissingFoldFactor { position })?;
                if factor == 0 {
                    return Err(DecompressError::ZeroFoldFactor { position });
                }
                let group_cells = count_cells(&group);
                if group_cells == 0 {
                    return Err(DecompressError::DanglingLength {
                        position: position + 1,
                    });
                }
                // every token describes at least one cell
                cells += group_cells.saturating_mul(factor);
                let expanded = out.len().saturating_add(group.len().saturating_mul(factor));
                if cells > ROOM_AREA || expanded > MAX_EXPANDED_LEN {
                    return Err(DecompressError::TooManyCells);
                }
                for _ in 0..factor {
                    out.push_str(&group);
                }
            }
            ')' => return Err(DecompressError::UnbalancedFold { position }),
            _ => {
                cells += usize::from(!ch.is_ascii_digit());
                out.push(ch);
            }
        }
    }

    Ok(out)
}

/// Lower bound on the cells a fragment describes, one per non-digit character.
fn count_cells(fragment: &str) -> usize {
    fragment.chars().filter(|ch| !ch.is_ascii_digit()).count()
}

/// Consumes a run of decimal digits, saturating on overflow.
fn take_number(chars: &mut Peekable<CharIndices<'_>>) -> Option<usize> {
    let mut value: Option<usize> = None;
    while let Some(digit) = chars.peek().and_then(|(_, ch)| ch.to_digit(10)) {
        let _ = chars.next();
        let current = value.unwrap_or(0);
        value = Some(current.saturating_mul(10).saturating_add(digit as usize));
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrain_knowledge_core::TerrainClass;

    fn plain() -> TerrainCode {
        TerrainCode::encode(TerrainClass::Plain, false, false, false)
    }

    fn swamp() -> TerrainCode {
        TerrainCode::encode(TerrainClass::Swamp, false, false, false)
    }

    #[test]
    fn runs_use_bare_doubled_and_counted_forms() {
        let codes = [plain(), swamp(), swamp(), plain(), plain(), plain()];
        let runs = run_length(&codes);
        let mut out = String::new();
        for run in runs {
            run.write_to(&mut out);
        }
        assert_eq!(out, "pssp3");
    }

    #[test]
    fn fold_counts_every_occurrence() {
        let runs = run_length(&[plain(), swamp(), plain(), swamp(), plain(), swamp()]);
        assert_eq!(fold_repeats(&runs), "(ps)3");
    }

    #[test]
    fn two_repeats_are_left_unfolded() {
        let runs = run_length(&[plain(), swamp(), plain(), swamp()]);
        assert_eq!(fold_repeats(&runs), "psps");
    }

    #[test]
    fn fold_prefers_the_narrowest_group() {
        let mut codes = Vec::new();
        for _ in 0..4 {
            codes.extend([plain(), swamp(), swamp()]);
        }
        let runs = run_length(&codes);
        assert_eq!(find_repeat(&runs), Some((2, 4)));
        assert_eq!(fold_repeats(&runs), "(pss)4");
    }

    #[test]
    fn expand_folds_repeats_literal_groups() {
        assert_eq!(expand_folds("u(p5s)3w").expect("expands"), "up5sp5sp5sw");
    }

    #[test]
    fn oversized_folds_are_rejected_before_expanding() {
        let wide = format!("({})2500", "p1".repeat(200_000));
        assert_eq!(expand_folds(&wide), Err(DecompressError::TooManyCells));

        let padded = format!("(p{}1)2500", "0".repeat(100_000));
        assert_eq!(expand_folds(&padded), Err(DecompressError::TooManyCells));

        let spread = format!("{}(p)2", "p".repeat(ROOM_AREA - 1));
        assert_eq!(expand_folds(&spread), Err(DecompressError::TooManyCells));
    }

    #[test]
    fn folds_without_a_symbol_are_dangling_lengths() {
        assert_eq!(
            expand_folds("p(12)3"),
            Err(DecompressError::DanglingLength { position: 2 })
        );
    }

    #[test]
    fn take_number_stops_at_the_next_symbol() {
        let mut chars = "2499p".char_indices().peekable();
        assert_eq!(take_number(&mut chars), Some(2499));
        assert_eq!(chars.next(), Some((4, 'p')));

        let mut chars = "p".char_indices().peekable();
        assert_eq!(take_number(&mut chars), None);
    }
}
