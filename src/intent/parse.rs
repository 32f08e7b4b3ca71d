// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Utterance text helpers: normalization, number and delay extraction.

use lazy_static::lazy_static;
use regex::Regex;

const ARTICLES: [&str; 3] = ["a", "an", "the"];

lazy_static! {
    static ref DELAY_RE: Regex =
        Regex::new(r"(?P<duration>\d+) (?P<interval>seconds|minutes|hours)").unwrap();
    static ref INTEGER_RE: Regex = Regex::new(r"\d+").unwrap();
}

/// Extract a delay in seconds from a phrase like `5 seconds`, `2 minutes` or `1 hours`.
///
/// Only the first match is used. Singular units are not matched.
pub fn delay_seconds(text: &str) -> Option<u64> {
    let caps = DELAY_RE.captures(text)?;
    let duration: u64 = caps.name("duration")?.as_str().parse().ok()?;
    let factor = match caps.name("interval")?.as_str() {
        "seconds" => 1,
        "minutes" => 60,
        "hours" => 3600,
        _ => return None,
    };
    duration.checked_mul(factor)
}

/// Return the first decimal integer in the text.
///
/// Values which don't fit into an `u64` saturate.
pub fn first_integer(text: &str) -> Option<u64> {
    INTEGER_RE
        .find(text)
        .map(|m| m.as_str().parse().unwrap_or(u64::MAX))
}

enum NumberWord {
    Unit(u64),
    Tens(u64),
    Hundred,
}

fn number_word(word: &str) -> Option<NumberWord> {
    const UNITS: [&str; 20] = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
        "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
        "nineteen",
    ];
    const TENS: [&str; 8] = [
        "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
    ];

    if let Some(n) = UNITS.iter().position(|w| *w == word) {
        return Some(NumberWord::Unit(n as u64));
    }
    if let Some(n) = TENS.iter().position(|w| *w == word) {
        return Some(NumberWord::Tens((n as u64 + 2) * 10));
    }
    if word == "hundred" {
        return Some(NumberWord::Hundred);
    }
    None
}

/// Normalize an utterance: lower case, remove articles, convert spelled-out numbers to digits
/// and collapse whitespace.
///
/// `"Set the light to twenty five percent"` becomes `"set light to 25 percent"`.
pub fn normalize(text: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut number: Option<u64> = None;

    for word in text.to_lowercase().split_whitespace() {
        if ARTICLES.contains(&word) {
            continue;
        }
        number = match (number_word(word), number) {
            (Some(NumberWord::Unit(n)), Some(c)) if c >= 100 && c % 100 == 0 => Some(c + n),
            (Some(NumberWord::Unit(n)), Some(c)) if n < 10 && c >= 20 && c % 10 == 0 => {
                Some(c + n)
            }
            (Some(NumberWord::Tens(n)), Some(c)) if c >= 100 && c % 100 == 0 => Some(c + n),
            (Some(NumberWord::Hundred), Some(c)) if (1..10).contains(&c) => Some(c * 100),
            (Some(NumberWord::Unit(n) | NumberWord::Tens(n)), current) => {
                if let Some(c) = current {
                    words.push(c.to_string());
                }
                Some(n)
            }
            (Some(NumberWord::Hundred), current) => {
                if let Some(c) = current {
                    words.push(c.to_string());
                }
                Some(100)
            }
            (None, current) => {
                if let Some(c) = current {
                    words.push(c.to_string());
                }
                words.push(word.to_string());
                None
            }
        };
    }
    if let Some(c) = number {
        words.push(c.to_string());
    }

    words.join(" ")
}

/// Remove all whole-word occurrences of the given phrases and normalize the result.
pub fn remove_phrases<'a>(text: &str, phrases: impl IntoIterator<Item = &'a str>) -> String {
    let mut text = normalize(text);
    for phrase in phrases {
        let phrase = phrase.trim().to_lowercase();
        if phrase.is_empty() {
            continue;
        }
        match Regex::new(&format!(r"\b{}\b", regex::escape(&phrase))) {
            Ok(re) => text = re.replace_all(&text, "").into_owned(),
            Err(e) => log::warn!("Invalid phrase '{phrase}': {e}"),
        }
    }
    normalize(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("in 5 seconds", Some(5))]
    #[case("turn off in 2 minutes", Some(120))]
    #[case("1 hours", Some(3600))]
    #[case("after 10 minutes and 5 seconds", Some(600))]
    #[case("1 hour", None)]
    #[case("in five seconds", None)]
    #[case("now", None)]
    fn delay_seconds_from_text(#[case] text: &str, #[case] expected: Option<u64>) {
        assert_eq!(expected, delay_seconds(text));
    }

    #[rstest]
    #[case("set brightness to 42 percent", Some(42))]
    #[case("to 7 or 8", Some(7))]
    #[case("level 050", Some(50))]
    #[case("to 99999999999999999999999", Some(u64::MAX))]
    #[case("brightness to half", None)]
    #[case("", None)]
    fn first_integer_from_text(#[case] text: &str, #[case] expected: Option<u64>) {
        assert_eq!(expected, first_integer(text));
    }

    #[rstest]
    #[case("Set the light to twenty five percent", "set light to 25 percent")]
    #[case("one hundred", "100")]
    #[case("a hundred percent", "100 percent")]
    #[case("two hundred thirty one", "231")]
    #[case("ninety   nine  ", "99")]
    #[case("thirty forty", "30 40")]
    #[case("five seven", "5 7")]
    #[case("Turn On An Light", "turn on light")]
    #[case("set to 42%", "set to 42%")]
    fn normalize_utterance(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(expected, normalize(text));
    }

    #[test]
    fn remove_phrases_keeps_partial_words() {
        assert_eq!(
            "to 40 percent",
            remove_phrases("set the decora light to forty percent", ["set", "decora", "light"])
        );
        assert_eq!(
            "settings lights",
            remove_phrases("settings lights", ["set", "light"]),
            "only whole words must be removed"
        );
    }
}
