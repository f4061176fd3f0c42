//! Behavioural tests for the matcher: coverage, statistics and fast paths.

use matching::{
    BlockId, DiscardSink, EngineOptions, MatchEngine, MatchError, MemorySink,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use signature::{DigestLayout, generate_digest_table};

fn random_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.r#gen()).collect()
}

fn engine(target: &[u8], block_size: usize, rsum_bits: u8, checksum_bytes: u8) -> MatchEngine {
    let layout = DigestLayout::new(block_size, target.len() as u64, rsum_bits, checksum_bytes);
    let table = generate_digest_table(target, layout).expect("table");
    MatchEngine::new(table).expect("engine")
}

#[test]
fn swapped_halves_are_both_found() {
    let target = random_bytes(1, 8192);
    let (a, b) = target.split_at(4096);
    let mut stream = b.to_vec();
    stream.extend_from_slice(a);

    let mut engine = engine(&target, 4096, 32, 16);
    let mut sink = MemorySink::new(target.len());
    let outcome = engine.submit(&stream, &mut sink).expect("submit");

    assert_eq!(outcome.consumed, stream.len());
    assert_eq!(outcome.matched, 2);
    assert_eq!(engine.covered_ranges(), &[0..2]);
    let stats = engine.stats();
    assert_eq!(stats.stronghit, 2);
    assert!(stats.hashhit >= 2);
    assert_eq!(sink.as_slice(), target.as_slice());
}

#[test]
fn sequential_stream_matches_through_hint() {
    let target = random_bytes(2, 32 * 256);
    let mut engine = engine(&target, 256, 32, 16);

    engine.submit(&target, &mut DiscardSink).expect("submit");

    let stats = engine.stats();
    assert!(engine.is_complete());
    assert_eq!(stats.stronghit, 32);
    assert_eq!(stats.hashhit, 1);
    assert_eq!(stats.weakhit, 0);
}

#[test]
fn equal_weak_checksum_with_different_content_is_only_a_weak_hit() {
    let block: Vec<u8> = (0..64).map(|k| 100 + (k % 7) as u8).collect();
    let mut forged = block.clone();
    // +1 at i, -1 at i+1, -1 at j, +1 at j+1 keeps both rolling sums.
    forged[10] += 1;
    forged[11] -= 1;
    forged[40] -= 1;
    forged[41] += 1;
    assert_ne!(forged, block);

    let mut engine = engine(&block, 64, 32, 16);
    engine.submit(&forged, &mut DiscardSink).expect("submit");

    let stats = engine.stats();
    assert_eq!(stats.hashhit, 1);
    assert_eq!(stats.weakhit, 1);
    assert_eq!(stats.checksummed, 1);
    assert_eq!(stats.stronghit, 0);
    assert!(engine.covered_ranges().is_empty());
}

#[test]
fn identical_blocks_are_accepted_from_one_window() {
    let shared = random_bytes(3, 128);
    let mut target = shared.clone();
    target.extend(random_bytes(4, 128));
    target.extend_from_slice(&shared);

    let mut engine = engine(&target, 128, 32, 16);
    let mut sink = MemorySink::new(target.len());
    let outcome = engine.submit(&shared, &mut sink).expect("submit");

    assert_eq!(outcome.matched, 2);
    assert_eq!(engine.covered_ranges(), &[0..1, 2..3]);
    assert_eq!(engine.missing_ranges(0..3), vec![1..2]);
    assert_eq!(&sink.as_slice()[256..], shared.as_slice());
}

#[test]
fn hinted_match_also_fills_identical_blocks() {
    let a = random_bytes(20, 128);
    let b = random_bytes(21, 128);
    let c = random_bytes(22, 128);
    let target = [a.as_slice(), b.as_slice(), c.as_slice(), b.as_slice()].concat();
    let mut stream = a.clone();
    stream.extend_from_slice(&b);

    let mut engine = engine(&target, 128, 32, 16);
    let mut sink = MemorySink::new(target.len());
    let outcome = engine.submit(&stream, &mut sink).expect("submit");

    assert_eq!(outcome.matched, 3);
    assert_eq!(engine.covered_ranges(), &[0..2, 3..4]);
    assert_eq!(&sink.as_slice()[384..], b.as_slice());
    let stats = engine.stats();
    assert_eq!(stats.stronghit, 3);
    assert_eq!(stats.hashhit, 1);
    assert_eq!(stats.checksummed, 2);
    let hint = engine.hint().expect("sequential hint kept");
    assert_eq!(hint.next_match(), 2);
}

#[test]
fn identical_blocks_cover_the_same_whether_or_not_hinted() {
    let a = random_bytes(23, 128);
    let b = random_bytes(24, 128);
    let c = random_bytes(25, 128);
    let target = [a.as_slice(), b.as_slice(), c.as_slice(), b.as_slice()].concat();

    let mut hinted = engine(&target, 128, 32, 16);
    hinted.submit(&[a.as_slice(), b.as_slice()].concat(), &mut DiscardSink).expect("submit");

    let mut cold = engine(&target, 128, 32, 16);
    cold.submit(&a, &mut DiscardSink).expect("submit");
    cold.reset_stream();
    cold.submit(&b, &mut DiscardSink).expect("submit");

    assert_eq!(hinted.covered_ranges(), cold.covered_ranges());
}

#[test]
fn padded_final_block_matches_at_end_of_stream() {
    let target = random_bytes(5, 3 * 512 + 77);
    let mut engine = engine(&target, 512, 32, 16);
    let mut sink = MemorySink::new(target.len());

    let mut stream = random_bytes(6, 33);
    stream.extend_from_slice(&target[3 * 512..]);
    engine.submit(&stream, &mut sink).expect("submit");
    assert!(engine.covered_ranges().is_empty());

    let matched = engine.finish_stream(&mut sink).expect("finish");
    assert_eq!(matched, 1);
    assert_eq!(engine.covered_ranges(), &[3..4]);
    assert_eq!(&sink.as_slice()[3 * 512..], &target[3 * 512..]);
}

#[test]
fn odd_block_size_and_short_checksums_reconstruct() {
    let target = random_bytes(7, 10 * 1000 + 1);
    let mut engine = engine(&target, 1000, 20, 5);
    let mut sink = MemorySink::new(target.len());

    let mut stream = random_bytes(8, 517);
    stream.extend_from_slice(&target);
    engine.submit_reader(stream.as_slice(), &mut sink).expect("submit");

    assert!(engine.is_complete());
    assert_eq!(sink.into_inner(), target);
}

#[test]
fn unrelated_streams_are_separated_by_reset() {
    let target = random_bytes(9, 2 * 256);
    let mut engine = engine(&target, 256, 32, 16);

    // The halves of block 0 arrive in different streams and must not join.
    engine.submit(&target[..128], &mut DiscardSink).expect("submit");
    engine.reset_stream();
    engine.submit(&target[128..256], &mut DiscardSink).expect("submit");
    assert!(engine.covered_ranges().is_empty());

    engine.reset_stream();
    engine.submit(&target[..128], &mut DiscardSink).expect("submit");
    engine.submit(&target[128..256], &mut DiscardSink).expect("submit");
    assert_eq!(engine.covered_ranges(), &[0..1]);
}

#[test]
fn fetched_blocks_are_verified() {
    let target = random_bytes(10, 4 * 128);
    let mut engine = engine(&target, 128, 32, 16);
    let mut sink = MemorySink::new(target.len());

    let mut fetched = target[128..384].to_vec();
    fetched[200] ^= 0xff;
    let err = engine
        .submit_blocks(1, &fetched, &mut sink)
        .expect_err("second block corrupted");
    assert!(matches!(err, MatchError::BlockMismatch { block: 2 }));
    assert_eq!(engine.covered_ranges(), &[1..2]);

    let err = engine
        .submit_blocks(3, &target[384..400], &mut sink)
        .expect_err("truncated block");
    assert!(matches!(
        err,
        MatchError::ShortBlock {
            block: 3,
            len: 16,
            expected: 128
        }
    ));

    let added = engine
        .submit_blocks(0, &target, &mut sink)
        .expect("all blocks verify");
    assert_eq!(added, 3);
    assert!(engine.is_complete());
    assert_eq!(sink.as_slice(), target.as_slice());
}

#[test]
fn denser_filter_keeps_results() {
    let target = random_bytes(11, 16 * 64);
    let layout = DigestLayout::new(64, target.len() as u64, 32, 16);
    let table = generate_digest_table(target.as_slice(), layout).expect("table");
    let options = EngineOptions::new().with_filter_density_bits(6);
    let mut engine = MatchEngine::with_options(table, options).expect("engine");

    assert_eq!(
        engine.index().filter_bits(),
        engine.index().bucket_count() << 6
    );
    engine.submit(&target, &mut DiscardSink).expect("submit");
    assert!(engine.is_complete());
}

#[test]
fn empty_target_is_immediately_complete() {
    let mut engine = engine(&[], 2048, 16, 3);
    assert!(engine.is_complete());
    let outcome = engine.submit(b"anything", &mut DiscardSink).expect("submit");
    assert_eq!(outcome.matched, 0);
    assert_eq!(outcome.consumed, 8);
}

#[test]
fn every_declared_block_passes_the_filter() {
    let target = random_bytes(12, 300 * 32);
    let engine = engine(&target, 32, 24, 8);
    let config = engine.config();
    for block in engine.table().blocks() {
        let key = config.weak_key(block.rolling());
        assert!(engine.index().might_contain(config.rhash(key)));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn block_is_found_at_any_offset(
        prefix in prop::collection::vec(any::<u8>(), 0..400),
        block in 0u32..8,
    ) {
        let target = random_bytes(13, 8 * 128);
        let mut engine = engine(&target, 128, 32, 16);
        let start = block as usize * 128;

        let mut stream = prefix;
        stream.extend_from_slice(&target[start..start + 128]);
        engine.submit(&stream, &mut DiscardSink).expect("submit");

        prop_assert!(engine.coverage().is_covered(block));
    }

    #[test]
    fn split_submissions_match_single_submission(
        cuts in prop::collection::vec(1usize..700, 1..12),
    ) {
        let target = random_bytes(14, 12 * 100 + 40);
        let mut stream = random_bytes(15, 61);
        stream.extend_from_slice(&target);

        let mut engine = engine(&target, 100, 32, 16);
        let mut sink = MemorySink::new(target.len());
        let mut rest = stream.as_slice();
        for cut in cuts {
            let (piece, tail) = rest.split_at(cut.min(rest.len()));
            engine.submit(piece, &mut sink).expect("submit");
            rest = tail;
        }
        engine.submit(rest, &mut sink).expect("submit");
        engine.finish_stream(&mut sink).expect("finish");

        prop_assert!(engine.is_complete());
        prop_assert_eq!(sink.into_inner(), target);
    }

    #[test]
    fn coverage_stays_consistent(order in prop::collection::vec(0u32..20, 0..40)) {
        let target = random_bytes(16, 20 * 32);
        let mut engine = engine(&target, 32, 32, 16);

        for block in order {
            let start = block as usize * 32;
            engine
                .submit_blocks(block, &target[start..start + 32], &mut DiscardSink)
                .expect("verified");
        }

        let ranges = engine.covered_ranges();
        for pair in ranges.windows(2) {
            prop_assert!(pair[0].end < pair[1].start);
        }
        let covered: BlockId = ranges.iter().map(|r| r.end - r.start).sum();
        prop_assert_eq!(covered + engine.blocks_todo(), 20);
        prop_assert_eq!(engine.coverage().gotblocks(), covered);
        prop_assert_eq!(engine.index().len(), engine.blocks_todo() as usize);
    }
}
