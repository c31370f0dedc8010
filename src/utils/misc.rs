use crate::config::lib_config::LibConfig;
use crate::domain::model::Pair;
use crate::utils::text::cleanup;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;
use std::str::FromStr;
use std::thread::JoinHandle;

fn parse<T: FromStr>(value: Option<&str>) -> Option<T> {
    let cleaned = cleanup(value)?;
    match cleaned.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::debug!("Cannot parse '{}' as {}", cleaned, std::any::type_name::<T>());
            None
        }
    }
}

pub fn parse_int(value: Option<&str>) -> Option<i32> {
    parse(value)
}

pub fn parse_long(value: Option<&str>) -> Option<i64> {
    parse(value)
}

pub fn parse_float(value: Option<&str>) -> Option<f32> {
    parse(value)
}

pub fn parse_double(value: Option<&str>) -> Option<f64> {
    parse(value)
}

/// Uses the default boolean words of [`LibConfig`].
pub fn parse_boolean(value: Option<&str>) -> Option<bool> {
    let cleaned = cleanup(value)?;
    LibConfig::default().parse_boolean(&cleaned)
}

/// Greatest common divisor of the magnitudes. `gcd(0, 0)` is `0`.
pub fn gcd(a: i64, b: i64) -> u64 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

pub fn is_leap_year(year: i32) -> bool {
    if year % 400 == 0 {
        true
    } else if year % 100 == 0 {
        false
    } else {
        year % 4 == 0
    }
}

pub fn is_leap_year_of(date: &NaiveDate) -> bool {
    is_leap_year(date.year())
}

/// Groups consecutive entries into pairs. An odd trailing entry is dropped.
pub fn to_pairs<T: Clone>(entries: &[T]) -> Vec<Pair<T, T>> {
    entries
        .chunks_exact(2)
        .map(|chunk| Pair::new(chunk[0].clone(), chunk[1].clone()))
        .collect()
}

pub fn trim_leading<T>(mut input: Vec<Option<T>>) -> Vec<Option<T>> {
    let leading = input.iter().take_while(|v| v.is_none()).count();
    input.drain(..leading);
    input
}

pub fn trim_trailing<T>(mut input: Vec<Option<T>>) -> Vec<Option<T>> {
    while matches!(input.last(), Some(None)) {
        input.pop();
    }
    input
}

pub fn trim<T>(input: Vec<Option<T>>) -> Vec<Option<T>> {
    trim_trailing(trim_leading(input))
}

/// Negative indices count from the end. An end index of `0` stands for
/// `length`.
pub fn adjust_index(length: i64, index: i64, is_end: bool) -> i64 {
    if index < 0 {
        length + index
    } else if index == 0 && is_end {
        length
    } else {
        index
    }
}

/// Sorted without duplicates.
pub fn to_unique_list<T: Ord + Clone>(list: &[T]) -> Vec<T> {
    list.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect()
}

pub fn repeat_element<T: Clone>(count: usize, element: T) -> Vec<T> {
    vec![element; count]
}

/// Waits for the thread. A panic inside the thread is logged and yields
/// `None`.
pub fn join_thread<T>(handle: Option<JoinHandle<T>>) -> Option<T> {
    match handle?.join() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Joined thread panicked");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_int(Some(" 42 ")), Some(42));
        assert_eq!(parse_int(Some("4x")), None);
        assert_eq!(parse_int(Some("   ")), None);
        assert_eq!(parse_int(None), None);
        assert_eq!(parse_long(Some("-9000000000")), Some(-9_000_000_000));
        assert_eq!(parse_float(Some("1.5")), Some(1.5));
        assert_eq!(parse_double(Some("2.25")), Some(2.25));
    }

    #[test]
    fn test_parse_boolean() {
        assert_eq!(parse_boolean(Some("Yes")), Some(true));
        assert_eq!(parse_boolean(Some("nein")), Some(false));
        assert_eq!(parse_boolean(Some("perhaps")), None);
        assert_eq!(parse_boolean(None), None);
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(17, 5), 1);
        assert_eq!(gcd(7, 0), 7);
        assert_eq!(gcd(0, 0), 0);
    }

    #[test]
    fn test_gcd_negative_and_extreme() {
        assert_eq!(gcd(4, -6), 2);
        assert_eq!(gcd(-4, -6), 2);
        assert_eq!(gcd(i64::MIN, -1), 1);
        assert_eq!(gcd(i64::MIN, 0), 1u64 << 63);
        assert_eq!(gcd(i64::MIN, i64::MIN), 1u64 << 63);
        assert_eq!(gcd(i64::MAX, i64::MIN), 1);
    }

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2023));
        let date = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        assert!(is_leap_year_of(&date));
    }

    #[test]
    fn test_to_pairs() {
        let pairs = to_pairs(&["a", "b", "c", "d", "e"]);
        assert_eq!(pairs, vec![Pair::new("a", "b"), Pair::new("c", "d")]);
        assert!(to_pairs::<i32>(&[]).is_empty());
    }

    #[test]
    fn test_trim_options() {
        let input = vec![None, Some(1), None, Some(2), None, None];
        assert_eq!(trim_leading(input.clone()), vec![Some(1), None, Some(2), None, None]);
        assert_eq!(trim_trailing(input.clone()), vec![None, Some(1), None, Some(2)]);
        assert_eq!(trim(input), vec![Some(1), None, Some(2)]);
        assert!(trim::<i32>(vec![None, None]).is_empty());
    }

    #[test]
    fn test_adjust_index() {
        assert_eq!(adjust_index(10, -2, false), 8);
        assert_eq!(adjust_index(10, 0, true), 10);
        assert_eq!(adjust_index(10, 0, false), 0);
        assert_eq!(adjust_index(10, 3, true), 3);
    }

    #[test]
    fn test_collections() {
        assert_eq!(to_unique_list(&[3, 1, 3, 2, 1]), vec![1, 2, 3]);
        assert_eq!(repeat_element(3, "x"), vec!["x", "x", "x"]);
    }

    #[test]
    fn test_join_thread() {
        assert_eq!(join_thread(Some(std::thread::spawn(|| 5))), Some(5));
        assert_eq!(join_thread::<i32>(None), None);
    }
}
