//! Greedy word wrapping for fixed-width text columns.

/// Wrap `text` into lines of at most `width` characters, breaking on word
/// boundaries. A word longer than `width` is kept whole and overflows its own
/// line. Empty or whitespace-only input yields no lines at all.
pub fn wrap(text: &str, width: usize) -> WordWrap<'_> {
    WordWrap {
        words: text.split_whitespace(),
        pending: None,
        width: width.max(1),
    }
}

#[derive(Debug, Clone)]
pub struct WordWrap<'a> {
    words: std::str::SplitWhitespace<'a>,
    pending: Option<&'a str>,
    width: usize,
}

impl Iterator for WordWrap<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let first = match self.pending.take() {
            Some(word) => word,
            None => self.words.next()?,
        };
        let mut line = String::from(first);
        let mut count = first.chars().count();

        for word in self.words.by_ref() {
            let word_len = word.chars().count();
            if count + 1 + word_len > self.width {
                // Carry the word that did not fit into the next line.
                self.pending = Some(word);
                return Some(line);
            }
            line.push(' ');
            line.push_str(word);
            count += 1 + word_len;
        }
        Some(line)
    }
}
