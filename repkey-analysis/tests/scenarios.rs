//! End-to-end recovery scenarios on generated ciphertexts
//!
//! Plaintexts are drawn from the built-in English byte distribution with a
//! fixed seed, so every run sees the same text.

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;

use repkey_analysis::search::ColumnScorer;
use repkey_analysis::{
    estimate_key_length, find_repeats, Alphabet, Combiner, CorpusRegistry, ExhaustiveSearch,
    GreedySearch, KeyElimination, KeySpace, LogMonitor, Metric,
};

fn english_sample(len: usize, seed: u64) -> Vec<u8> {
    let english = CorpusRegistry::builtin().get("english").unwrap();
    let weights = WeightedIndex::new(english.vector().counts()).unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| weights.sample(&mut rng) as u8).collect()
}

#[test]
fn test_key_length_then_greedy_then_exhaustive() {
    let alphabet = Alphabet::default();
    let key = b"Pa$$w0r";
    let plain = english_sample(3000, 7);
    let cipher = Combiner::Subtract.encipher(&plain, key, alphabet);

    // 1. key length
    let lengths = estimate_key_length(&cipher, 1..=10).unwrap();
    let best = lengths.best().unwrap();
    assert_eq!(best.key_length, 7);

    // 2. greedy column ranking, decoding by subtraction
    let english = CorpusRegistry::builtin().get("english").unwrap();
    let greedy = GreedySearch::new(best.key_length, alphabet)
        .with_scorer(ColumnScorer::Similarity {
            metric: Metric::VectorAngle,
            corpus: english,
        })
        .with_top_k(3)
        .run(&cipher)
        .unwrap();
    assert_eq!(greedy.keys[0].bytes(), key);

    // 3. exhaustive search decodes by addition, so feed it the negated offsets
    let specs: Vec<String> = greedy
        .columns
        .iter()
        .map(|column| {
            column
                .candidates
                .iter()
                .map(|c| alphabet.sub(0, c.offset).to_string())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    let space = KeySpace::parse(&specs).unwrap();
    let outcome = ExhaustiveSearch::new(english, alphabet)
        .run(&cipher, &space, &LogMonitor::default())
        .unwrap();

    let negated: Vec<u8> = key.iter().map(|&k| alphabet.sub(0, k)).collect();
    assert!(outcome.completed);
    assert_eq!(outcome.checked, 3u64.pow(7));
    assert_eq!(outcome.best.unwrap().key.bytes(), negated.as_slice());
}

#[test]
fn test_kasiski_distances_share_the_key_length() {
    let alphabet = Alphabet::default();
    let key = b"QUARTZ";
    let phrase = b"the quick brown fox ";
    // 20-byte phrase over a 6-byte key realigns every 3 repetitions
    let plain = phrase.repeat(9);
    let cipher = Combiner::Subtract.encipher(&plain, key, alphabet);

    let report = find_repeats(&cipher, 5).unwrap();
    assert!(!report.records.is_empty());
    assert_eq!(report.distance_gcd(), Some(60));
    for record in &report.records {
        assert!(record.distances.iter().all(|d| d % key.len() == 0));
    }
    assert!(report.length_tally(12).iter().any(|&(l, _)| l == 6));
}

#[test]
fn test_key_elimination_on_generated_text() {
    let alphabet = Alphabet::default();
    let mut plain = english_sample(1500, 99);
    let crib = b"attack at dawn";
    plain[777..777 + crib.len()].copy_from_slice(crib);
    let key = [0x11u8, 0x80, 0xfe, 0x42, 0x07];

    for combiner in [Combiner::Subtract, Combiner::Xor] {
        let cipher = combiner.encipher(&plain, &key, alphabet);
        let report = KeyElimination::new(key.len(), combiner).run(&cipher, crib).unwrap();
        let hit = report.matches.iter().find(|m| m.offset == 777).unwrap();
        assert_eq!(hit.key, key.to_vec());
    }
}
