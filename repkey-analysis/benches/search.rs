use criterion::{black_box, criterion_group, criterion_main, Criterion};
use repkey_analysis::{
    find_repeats, Alphabet, Combiner, CorpusRegistry, ExhaustiveSearch, KeySpace, Silent,
};

const PLAIN: &[u8] = b"There is a tide in the affairs of men, which taken at the flood, \
leads on to fortune; omitted, all the voyage of their life is bound in shallows and in miseries. \
On such a full sea are we now afloat, and we must take the current when it serves, or lose our ventures.";

fn ciphertext(copies: usize) -> Vec<u8> {
    Combiner::Subtract.encipher(&PLAIN.repeat(copies), b"BRUTUS", Alphabet::default())
}

fn bench_exhaustive(c: &mut Criterion) {
    let english = CorpusRegistry::builtin().get("english").unwrap();
    let cipher = ciphertext(4);
    let space = KeySpace::parse(&["1/2/3/4", "5/6/7/8", "9/10/11", "12/13", "14/15/16", "17/18"]).unwrap();
    let search = ExhaustiveSearch::new(english, Alphabet::default());

    c.bench_function("exhaustive_576_keys", |b| {
        b.iter(|| search.run(black_box(&cipher), &space, &Silent).unwrap())
    });
}

fn bench_kasiski(c: &mut Criterion) {
    let cipher = ciphertext(16);

    c.bench_function("kasiski_s4", |b| {
        b.iter(|| find_repeats(black_box(&cipher), 4).unwrap())
    });
}

criterion_group!(benches, bench_exhaustive, bench_kasiski);
criterion_main!(benches);
