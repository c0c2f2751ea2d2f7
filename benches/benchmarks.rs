//! Performance benchmarks for Paillier vote operations

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use paillier_vote::{
    deserialize_ciphertext, serialize_ciphertext, HomomorphicOperations, KeyPair, Paillier,
};

fn benchmark_key_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_generation");
    group.sample_size(10);

    for bits in [1024u64, 2048].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(bits), bits, |b, &bits| {
            b.iter(|| KeyPair::generate(bits).expect("Failed to generate keys"));
        });
    }

    group.finish();
}

fn benchmark_encryption(c: &mut Criterion) {
    let mut group = c.benchmark_group("encryption");

    for bits in [1024u64, 2048].iter() {
        let keypair = KeyPair::generate(*bits).expect("Failed to generate keys");
        let paillier = Paillier::new(keypair.public_key.clone());

        group.bench_with_input(BenchmarkId::from_parameter(bits), bits, |b, _| {
            b.iter(|| {
                paillier
                    .encrypt_vote(black_box(true))
                    .expect("Encryption failed")
            });
        });
    }

    group.finish();
}

fn benchmark_decryption(c: &mut Criterion) {
    let keypair = KeyPair::generate(2048).expect("Failed to generate keys");
    let paillier = Paillier::new(keypair.public_key.clone());
    let ciphertext = paillier.encrypt_vote(true).expect("Encryption failed");

    c.bench_function("decryption", |b| {
        b.iter(|| {
            keypair
                .private_key
                .decrypt(black_box(&ciphertext))
                .expect("Decryption failed")
        });
    });
}

fn benchmark_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");

    let keypair = KeyPair::generate(2048).expect("Failed to generate keys");
    let paillier = Paillier::new(keypair.public_key.clone());

    for voters in [10usize, 100, 1000].iter() {
        let ballots: Vec<_> = (0..*voters)
            .map(|i| paillier.encrypt_vote(i % 2 == 0).expect("Encryption failed"))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(voters), voters, |b, _| {
            b.iter(|| {
                paillier
                    .aggregate(black_box(&ballots))
                    .expect("Aggregation failed")
            });
        });
    }

    group.finish();
}

fn benchmark_serialization(c: &mut Criterion) {
    let keypair = KeyPair::generate(2048).expect("Failed to generate keys");
    let paillier = Paillier::new(keypair.public_key.clone());
    let ciphertext = paillier.encrypt_vote(false).expect("Encryption failed");
    let encoded = serialize_ciphertext(&ciphertext);

    c.bench_function("serialize_ciphertext", |b| {
        b.iter(|| serialize_ciphertext(black_box(&ciphertext)));
    });

    c.bench_function("deserialize_ciphertext", |b| {
        b.iter(|| deserialize_ciphertext(black_box(&encoded)).expect("Deserialization failed"));
    });
}

criterion_group!(
    benches,
    benchmark_key_generation,
    benchmark_encryption,
    benchmark_decryption,
    benchmark_aggregation,
    benchmark_serialization
);

criterion_main!(benches);
