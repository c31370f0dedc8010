use crate::utils::error::{KclError, Result};
use crate::utils::validation::validate_range;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Pair<A, B> {
    pub first: A,
    pub second: B,
}

impl<A, B> Pair<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub fn swap(self) -> Pair<B, A> {
        Pair::new(self.second, self.first)
    }

    pub fn into_tuple(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A, B> From<(A, B)> for Pair<A, B> {
    fn from((first, second): (A, B)) -> Self {
        Self::new(first, second)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Triple<A, B, C> {
    pub first: A,
    pub second: B,
    pub third: C,
}

impl<A, B, C> Triple<A, B, C> {
    pub fn new(first: A, second: B, third: C) -> Self {
        Self {
            first,
            second,
            third,
        }
    }

    pub fn into_tuple(self) -> (A, B, C) {
        (self.first, self.second, self.third)
    }
}

impl<A, B, C> From<(A, B, C)> for Triple<A, B, C> {
    fn from((first, second, third): (A, B, C)) -> Self {
        Self::new(first, second, third)
    }
}

/// Holder for any number of values of the same type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tupel<T> {
    values: Vec<T>,
}

impl<T> Tupel<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self { values }
    }

    pub fn first(&self) -> Option<&T> {
        self.values.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.values.last()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }
}

impl<T> FromIterator<T> for Tupel<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        validate_range("latitude", latitude, -90.0, 90.0)?;
        validate_range("longitude", longitude, -180.0, 180.0)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

impl FromStr for GeoLocation {
    type Err = KclError;

    fn from_str(s: &str) -> Result<Self> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| KclError::parse(s, "expected 'latitude,longitude'"))?;
        let latitude = lat
            .trim()
            .parse::<f64>()
            .map_err(|e| KclError::parse(s, e.to_string()))?;
        let longitude = lon
            .trim()
            .parse::<f64>()
            .map_err(|e| KclError::parse(s, e.to_string()))?;
        Self::new(latitude, longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct KSize {
    pub width: u32,
    pub height: u32,
}

impl KSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl fmt::Display for KSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for KSize {
    type Err = KclError;

    fn from_str(s: &str) -> Result<Self> {
        let (width, height) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| KclError::parse(s, "expected 'WIDTHxHEIGHT'"))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|e| KclError::parse(s, e.to_string()))
        };
        Ok(Self::new(parse(width)?, parse(height)?))
    }
}
