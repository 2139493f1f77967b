// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use fortuna_core::LuckyNumbers;
use rand::Rng;
use rand::seq::index;

/// Draw six distinct numbers in `[1, 99]`, sorted ascending.
pub fn generate_lucky_numbers() -> LuckyNumbers {
    generate_with(&mut rand::thread_rng())
}

pub(crate) fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> LuckyNumbers {
    let mut numbers: Vec<u8> = index::sample(rng, LuckyNumbers::MAX as usize, LuckyNumbers::COUNT)
        .into_iter()
        .map(|i| i as u8 + 1)
        .collect();
    numbers.sort_unstable();
    LuckyNumbers::new(numbers)
}
