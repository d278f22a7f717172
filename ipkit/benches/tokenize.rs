// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use criterion::{criterion_group, criterion_main, Criterion};
use ipkit::token::{Direction, Radix, TokenKind, Tokenizer};
use ipkit::AddressBits;
use std::hint::black_box;

fn drain(text: &[u8], direction: Direction, radix: Radix) -> usize {
    let mut tokens = Tokenizer::new(text);
    let mut count = 0;
    while !tokens.next(direction, radix).is(TokenKind::End) {
        count += 1;
    }
    count
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let v4 = b"192.168.114.255/32";
    let v6 = b"2001:dff:44ff::1744:ffff/64";

    c.bench_function("tokenize-v4-front", |b| {
        b.iter(|| drain(black_box(v4), Direction::Front, Radix::Decimal))
    });
    c.bench_function("tokenize-v6-front", |b| {
        b.iter(|| drain(black_box(v6), Direction::Front, Radix::Hexadecimal))
    });
    c.bench_function("tokenize-v6-back", |b| {
        b.iter(|| drain(black_box(v6), Direction::Back, Radix::Hexadecimal))
    });

    c.bench_function("common-prefix-32", |b| {
        b.iter(|| black_box(0x6464_ca1cu32).common_prefix_len(black_box(0x6464_ca1d)))
    });
    c.bench_function("common-prefix-128", |b| {
        b.iter(|| {
            black_box(0x2001_0db8_0000_0000_0000_8a2e_0370_7334u128)
                .common_prefix_len(black_box(0x2001_0db8_0000_0000_0000_8a2e_0370_0000))
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
