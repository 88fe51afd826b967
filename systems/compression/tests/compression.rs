use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use terrain_knowledge_core::{TerrainClass, TerrainCode, ROOM_AREA};
use terrain_knowledge_system_compression::{
    compress, decompress, decompress_into, DecompressError,
};

fn alphabet() -> Vec<TerrainCode> {
    TerrainCode::alphabet().collect()
}

fn uniform(code: TerrainCode) -> Vec<TerrainCode> {
    vec![code; ROOM_AREA]
}

fn plain() -> TerrainCode {
    TerrainCode::encode(TerrainClass::Plain, false, false, false)
}

fn swamp() -> TerrainCode {
    TerrainCode::encode(TerrainClass::Swamp, false, false, false)
}

fn noisy_room(rng: &mut ChaCha8Rng) -> Vec<TerrainCode> {
    let alphabet = alphabet();
    (0..ROOM_AREA)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect()
}

fn patchy_room(rng: &mut ChaCha8Rng) -> Vec<TerrainCode> {
    let alphabet = alphabet();
    let mut codes = Vec::with_capacity(ROOM_AREA);
    while codes.len() < ROOM_AREA {
        let code = alphabet[rng.gen_range(0..alphabet.len())];
        let length = rng.gen_range(1..=120).min(ROOM_AREA - codes.len());
        codes.extend(std::iter::repeat(code).take(length));
    }
    codes
}

fn periodic_room(rng: &mut ChaCha8Rng) -> Vec<TerrainCode> {
    let alphabet = alphabet();
    let width = rng.gen_range(1..=6);
    let pattern: Vec<(TerrainCode, usize)> = (0..width)
        .map(|_| {
            (
                alphabet[rng.gen_range(0..alphabet.len())],
                rng.gen_range(1..=4),
            )
        })
        .collect();
    let mut codes = Vec::with_capacity(ROOM_AREA);
    'fill: loop {
        for (code, length) in &pattern {
            for _ in 0..*length {
                if codes.len() == ROOM_AREA {
                    break 'fill;
                }
                codes.push(*code);
            }
        }
    }
    codes
}

fn assert_round_trip(codes: &[TerrainCode]) {
    let compressed = compress(codes);
    let restored = decompress(&compressed).expect("compressed terrain decodes");
    assert_eq!(restored.as_slice(), codes, "round trip through {compressed}");
}

#[test]
fn uniform_rooms_round_trip_for_every_symbol() {
    for code in alphabet() {
        assert_round_trip(&uniform(code));
    }
}

#[test]
fn random_rooms_round_trip() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x7e44_a1e5);
    for _ in 0..32 {
        assert_round_trip(&noisy_room(&mut rng));
        assert_round_trip(&patchy_room(&mut rng));
        assert_round_trip(&periodic_room(&mut rng));
    }
}

#[test]
fn uniform_room_compresses_below_one_character_per_cell() {
    let compressed = compress(&uniform(plain()));
    assert_eq!(compressed, "p2500");
    assert!(compressed.len() < ROOM_AREA);
}

#[test]
fn alternating_pattern_uses_the_fold_form() {
    let mut codes = Vec::with_capacity(ROOM_AREA);
    for _ in 0..100 {
        codes.push(plain());
        codes.push(swamp());
    }
    codes.resize(ROOM_AREA, TerrainCode::UNKNOWN);

    let compressed = compress(&codes);
    assert_eq!(compressed, "(ps)100u2300");
    assert_round_trip(&codes);
}

#[test]
fn fold_factor_counts_the_first_occurrence() {
    let mut codes = Vec::with_capacity(ROOM_AREA);
    for _ in 0..3 {
        codes.extend(std::iter::repeat(plain()).take(5));
        codes.push(swamp());
    }
    codes.resize(ROOM_AREA, TerrainCode::UNKNOWN);

    let compressed = compress(&codes);
    assert_eq!(compressed, "(p5s)3u2482");
    assert_round_trip(&codes);
}

#[test]
fn fold_never_splits_a_run_length() {
    // the repeated group is "p12s", never a prefix of the digits
    let mut codes = Vec::with_capacity(ROOM_AREA);
    for _ in 0..3 {
        codes.extend(std::iter::repeat(plain()).take(12));
        codes.push(swamp());
    }
    codes.resize(ROOM_AREA, plain());

    let compressed = compress(&codes);
    assert_eq!(compressed, "(p12s)3p2461");
    assert_round_trip(&codes);
}

#[test]
fn decompresses_hand_written_strings() {
    let codes = decompress("ppsw2497").expect("valid string");
    assert_eq!(codes[0], plain());
    assert_eq!(codes[1], plain());
    assert_eq!(codes[2], swamp());
    assert_eq!(codes[3].symbol(), 'w');
    assert_eq!(codes[ROOM_AREA - 1].symbol(), 'w');
}

#[test]
fn unknown_symbol_is_reported() {
    assert_eq!(
        decompress("p10x5p2485"),
        Err(DecompressError::UnknownSymbol {
            symbol: 'x',
            position: 3,
        })
    );
}

#[test]
fn short_strings_are_rejected() {
    assert_eq!(
        decompress("p100"),
        Err(DecompressError::Truncated { cells: 100 })
    );
    assert_eq!(decompress(""), Err(DecompressError::Truncated { cells: 0 }));
}

#[test]
fn oversized_strings_are_rejected() {
    assert_eq!(decompress("p2500s"), Err(DecompressError::TooManyCells));
    assert_eq!(
        decompress("(p)99999999999999999999999"),
        Err(DecompressError::TooManyCells)
    );
}

#[test]
fn malformed_folds_are_rejected() {
    assert_eq!(
        decompress("(ps"),
        Err(DecompressError::UnclosedFold { position: 0 })
    );
    assert_eq!(
        decompress("ps)3"),
        Err(DecompressError::UnbalancedFold { position: 2 })
    );
    assert_eq!(
        decompress("((ps)2)3"),
        Err(DecompressError::NestedFold { position: 1 })
    );
    assert_eq!(
        decompress("()3p2500"),
        Err(DecompressError::EmptyFold { position: 0 })
    );
    assert_eq!(
        decompress("(ps)p2500"),
        Err(DecompressError::MissingFoldFactor { position: 0 })
    );
    assert_eq!(
        decompress("(ps)0p2500"),
        Err(DecompressError::ZeroFoldFactor { position: 0 })
    );
}

#[test]
fn malformed_runs_are_rejected() {
    assert_eq!(
        decompress("12p2500"),
        Err(DecompressError::DanglingLength { position: 0 })
    );
    assert_eq!(
        decompress("p0p2500"),
        Err(DecompressError::ZeroRunLength { position: 0 })
    );
}

#[test]
fn failed_decompress_into_leaves_every_cell_unknown() {
    let mut cells = [plain(); ROOM_AREA];
    let result = decompress_into("p10?", &mut cells);
    assert!(result.is_err());
    assert!(cells.iter().all(|code| code.is_unknown()));
}

#[test]
fn decompress_into_overwrites_every_cell() {
    let mut cells = [TerrainCode::UNKNOWN; ROOM_AREA];
    decompress_into("s2500", &mut cells).expect("valid string");
    assert!(cells.iter().all(|code| *code == swamp()));
}
