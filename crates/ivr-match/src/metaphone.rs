//! Metaphone phonetic encoder.
//!
//! Classic Metaphone (Philips, 1990) over ASCII letters, used as the
//! phonetic term of the composite similarity score. Non-letters are
//! ignored; the empty input encodes to an empty key.
//!
//! The encoding only has to be deterministic and discriminating for field
//! names; the handful of exotic English spellings the full algorithm
//! covers ("-GNED", "CAESAR") are not worth the extra branches here.

/// Encodes a word into its Metaphone key.
pub fn metaphone(word: &str) -> String {
    let mut chars: Vec<char> = word
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    apply_initial_exceptions(&mut chars);

    let len = chars.len();
    let mut out = String::new();
    let mut i = 0;
    while i < len {
        let c = chars[i];
        // Duplicate adjacent letters encode once (except C, per the
        // original algorithm).
        if i > 0 && c == chars[i - 1] && c != 'C' {
            i += 1;
            continue;
        }
        let prev = if i > 0 { Some(chars[i - 1]) } else { None };
        let next = chars.get(i + 1).copied();
        let after_next = chars.get(i + 2).copied();

        match c {
            'A' | 'E' | 'I' | 'O' | 'U' => {
                // Vowels survive only at the start of the word.
                if i == 0 {
                    out.push(c);
                }
            }
            'B' => {
                // Silent terminal B after M ("lamb", "comb").
                if !(i + 1 == len && prev == Some('M')) {
                    out.push('B');
                }
            }
            'C' => {
                if next == Some('I') && after_next == Some('A') {
                    out.push('X');
                } else if next == Some('H') {
                    // "SCH" hardens to K, plain "CH" is X.
                    out.push(if prev == Some('S') { 'K' } else { 'X' });
                    i += 1;
                } else if matches!(next, Some('I' | 'E' | 'Y')) {
                    // Silent in "SCI"/"SCE"/"SCY".
                    if prev != Some('S') {
                        out.push('S');
                    }
                } else {
                    out.push('K');
                }
            }
            'D' => {
                if next == Some('G') && matches!(after_next, Some('E' | 'I' | 'Y')) {
                    out.push('J');
                } else {
                    out.push('T');
                }
            }
            'F' => out.push('F'),
            'G' => {
                if prev == Some('D') && matches!(next, Some('E' | 'I' | 'Y')) {
                    // Already encoded by the D in "DGE"/"DGI"/"DGY".
                } else if next == Some('H') {
                    if after_next.is_some_and(is_vowel) {
                        out.push('K');
                    }
                    // Silent "GH" otherwise ("night", "weight").
                    i += 1;
                } else if next == Some('N') {
                    // Silent in "GN" ("sign").
                } else if matches!(next, Some('I' | 'E' | 'Y')) {
                    out.push('J');
                } else {
                    out.push('K');
                }
            }
            'H' => {
                // Silent after a vowel with no vowel following.
                let silent = prev.is_some_and(is_vowel) && !next.is_some_and(is_vowel);
                if !silent {
                    out.push('H');
                }
            }
            'J' => out.push('J'),
            'K' => {
                if prev != Some('C') {
                    out.push('K');
                }
            }
            'L' => out.push('L'),
            'M' => out.push('M'),
            'N' => out.push('N'),
            'P' => {
                if next == Some('H') {
                    out.push('F');
                    i += 1;
                } else {
                    out.push('P');
                }
            }
            'Q' => out.push('K'),
            'R' => out.push('R'),
            'S' => {
                if next == Some('H') {
                    out.push('X');
                    i += 1;
                } else if next == Some('I') && matches!(after_next, Some('O' | 'A')) {
                    out.push('X');
                } else {
                    out.push('S');
                }
            }
            'T' => {
                if next == Some('H') {
                    out.push('0');
                    i += 1;
                } else if next == Some('I') && matches!(after_next, Some('O' | 'A')) {
                    out.push('X');
                } else {
                    out.push('T');
                }
            }
            'V' => out.push('F'),
            'W' => {
                if next.is_some_and(is_vowel) {
                    out.push('W');
                }
            }
            'X' => out.push_str("KS"),
            'Y' => {
                if next.is_some_and(is_vowel) {
                    out.push('Y');
                }
            }
            'Z' => out.push('S'),
            _ => {}
        }
        i += 1;
    }
    out
}

fn apply_initial_exceptions(chars: &mut Vec<char>) {
    if chars.len() >= 2 {
        match (chars[0], chars[1]) {
            ('A', 'E') | ('G', 'N') | ('K', 'N') | ('P', 'N') | ('W', 'R') => {
                chars.remove(0);
                return;
            }
            ('W', 'H') => {
                chars.remove(1);
                return;
            }
            _ => {}
        }
    }
    if chars.first() == Some(&'X') {
        chars[0] = 'S';
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'A' | 'E' | 'I' | 'O' | 'U')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn homophones_share_keys() {
        assert_eq!(metaphone("phone"), metaphone("fone"));
        assert_eq!(metaphone("knight"), metaphone("nite"));
        assert_eq!(metaphone("smith"), metaphone("smyth"));
    }

    #[test]
    fn expected_keys() {
        assert_eq!(metaphone("phone"), "FN");
        assert_eq!(metaphone("night"), "NT");
        assert_eq!(metaphone("address"), "ATRS");
        assert_eq!(metaphone("patient"), "PTNT");
    }

    #[test]
    fn distinct_words_differ() {
        assert_ne!(metaphone("patient"), metaphone("provider"));
        assert_ne!(metaphone("insurance"), metaphone("facility"));
    }

    #[test]
    fn ignores_non_letters_and_case() {
        assert_eq!(metaphone("Date of Birth"), metaphone("date_of_birth"));
        assert_eq!(metaphone(""), "");
        assert_eq!(metaphone("123"), "");
    }
}
