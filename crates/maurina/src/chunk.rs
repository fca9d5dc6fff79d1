// Copyright 2025-Present Maurina contributors http://www.maurina.org
// SPDX-License-Identifier: Apache-2.0

use std::num::NonZeroUsize;

/// Splits `text` into consecutive pieces of at most `max_size` characters.
///
/// The pieces cover `text` exactly once, in order. An empty input yields a single empty piece so
/// that logging an empty string still produces one record.
#[must_use]
pub fn split_into_chunks(text: &str, max_size: NonZeroUsize) -> Chunks<'_> {
    Chunks {
        rest: Some(text),
        max_size: max_size.get(),
    }
}

/// Iterator returned by [`split_into_chunks`].
#[derive(Debug)]
pub struct Chunks<'a> {
    rest: Option<&'a str>,
    max_size: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest?;
        let split_at = rest
            .char_indices()
            .nth(self.max_size)
            .map_or(rest.len(), |(index, _)| index);
        let (chunk, tail) = rest.split_at(split_at);
        self.rest = if tail.is_empty() { None } else { Some(tail) };
        Some(chunk)
    }
}

impl std::iter::FusedIterator for Chunks<'_> {}
