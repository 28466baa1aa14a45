//! Customer arrival schedules.
//!
//! The text format is a sequence of whitespace separated
//! `customer_id arrival_time party_size` records, terminated by a record whose
//! id is `-1`. Anything after the sentinel is ignored.

use crate::core::types::{CustomerId, Minutes};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Id that ends a schedule file
pub const SENTINEL_ID: i64 = -1;

/// One scheduled customer party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub customer: CustomerId,
    pub arrival: Minutes,
    pub party_size: u32,
}

/// Errors that can occur while reading a schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The schedule file could not be read
    Io(String),
    /// A record is truncated or holds a non-numeric field
    Malformed { line: usize, reason: String },
    /// Customer ids are positive; only the sentinel may be negative
    InvalidCustomerId { line: usize, value: i64 },
    /// A party needs at least one guest
    EmptyParty { line: usize, customer: CustomerId },
    /// The same customer id appears twice
    DuplicateCustomer(CustomerId),
}

impl std::fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleError::Io(msg) => write!(f, "cannot read schedule: {}", msg),
            ScheduleError::Malformed { line, reason } => {
                write!(f, "line {}: malformed record: {}", line, reason)
            }
            ScheduleError::InvalidCustomerId { line, value } => {
                write!(f, "line {}: invalid customer id {}", line, value)
            }
            ScheduleError::EmptyParty { line, customer } => {
                write!(f, "line {}: customer {} has an empty party", line, customer)
            }
            ScheduleError::DuplicateCustomer(id) => {
                write!(f, "customer {} is scheduled more than once", id)
            }
        }
    }
}

impl std::error::Error for ScheduleError {}

/// Parameters for generating a random schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleProfile {
    /// Number of customer parties to generate
    pub customers: usize,
    /// Mean gap between consecutive arrivals, in minutes
    pub mean_gap_minutes: f64,
    /// Largest party size; sizes are drawn uniformly from `1..=max_party_size`
    pub max_party_size: u32,
    /// Arrival time of the first party
    pub first_arrival: Minutes,
}

impl Default for ScheduleProfile {
    fn default() -> Self {
        Self {
            customers: 40,
            mean_gap_minutes: 6.0,
            max_party_size: 4,
            first_arrival: 0,
        }
    }
}

/// An ordered list of customer arrivals.
///
/// Entries keep the order they were given in. The runtime paces arrivals
/// assuming the list is sorted by arrival time but does not enforce it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    /// Build a schedule, rejecting repeated customer ids
    pub fn new(entries: Vec<ScheduleEntry>) -> Result<Self, ScheduleError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.customer) {
                return Err(ScheduleError::DuplicateCustomer(entry.customer));
            }
        }
        Ok(Self { entries })
    }

    /// Build a schedule from `(customer_id, arrival_time, party_size)` records
    pub fn from_records(records: &[(u32, Minutes, u32)]) -> Result<Self, ScheduleError> {
        let entries = records
            .iter()
            .enumerate()
            .map(|(index, &(id, arrival, party_size))| {
                let line = index + 1;
                let customer = CustomerId::new(id).ok_or(ScheduleError::InvalidCustomerId {
                    line,
                    value: i64::from(id),
                })?;
                if party_size == 0 {
                    return Err(ScheduleError::EmptyParty { line, customer });
                }
                Ok(ScheduleEntry { customer, arrival, party_size })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(entries)
    }

    /// Parse the whitespace separated text format
    pub fn parse(text: &str) -> Result<Self, ScheduleError> {
        let mut tokens = text
            .lines()
            .enumerate()
            .flat_map(|(index, line)| line.split_whitespace().map(move |token| (index + 1, token)));

        let mut entries = Vec::new();
        while let Some((line, id_token)) = tokens.next() {
            let id = parse_field::<i64>(line, id_token, "customer id")?;
            if id == SENTINEL_ID {
                break;
            }
            let mut next_field = |name: &str| {
                tokens.next().ok_or_else(|| ScheduleError::Malformed {
                    line,
                    reason: format!("record for customer {} is missing its {}", id, name),
                })
            };
            let (arrival_line, arrival_token) = next_field("arrival time")?;
            let (party_line, party_token) = next_field("party size")?;

            let customer = u32::try_from(id)
                .ok()
                .and_then(CustomerId::new)
                .ok_or(ScheduleError::InvalidCustomerId { line, value: id })?;
            let arrival = parse_field::<Minutes>(arrival_line, arrival_token, "arrival time")?;
            let party_size = parse_field::<u32>(party_line, party_token, "party size")?;
            if party_size == 0 {
                return Err(ScheduleError::EmptyParty { line: party_line, customer });
            }
            entries.push(ScheduleEntry { customer, arrival, party_size });
        }
        Self::new(entries)
    }

    /// Read and parse a schedule file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScheduleError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| ScheduleError::Io(format!("{}: {}", path.display(), err)))?;
        Self::parse(&text)
    }

    /// Generate a reproducible random schedule.
    ///
    /// Gaps between arrivals are exponentially distributed with the profile's
    /// mean; party sizes are uniform. The same seed always yields the same
    /// schedule.
    pub fn generate(seed: u64, profile: &ScheduleProfile) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let gaps = (profile.mean_gap_minutes > 0.0)
            .then(|| Exp::new(1.0 / profile.mean_gap_minutes).ok())
            .flatten();
        let max_party = profile.max_party_size.max(1);

        let mut clock = f64::from(profile.first_arrival);
        let entries = (1..=profile.customers)
            .map(|index| {
                if index > 1 {
                    if let Some(gaps) = &gaps {
                        clock += gaps.sample(&mut rng);
                    }
                }
                ScheduleEntry {
                    customer: CustomerId(u32::try_from(index).unwrap_or(u32::MAX)),
                    arrival: clock.floor().min(f64::from(Minutes::MAX)) as Minutes,
                    party_size: rng.gen_range(1..=max_party),
                }
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render back into the text format, sentinel included
    pub fn to_text(&self) -> String {
        let mut text: String = self
            .entries
            .iter()
            .map(|e| format!("{} {} {}\n", e.customer, e.arrival, e.party_size))
            .collect();
        text.push_str(&format!("{}\n", SENTINEL_ID));
        text
    }
}

fn parse_field<T: std::str::FromStr>(line: usize, token: &str, name: &str) -> Result<T, ScheduleError> {
    token.parse::<T>().map_err(|_| ScheduleError::Malformed {
        line,
        reason: format!("{} '{}' is not a valid number", name, token),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stops_at_sentinel() {
        let schedule = Schedule::parse("1 0 2\n2 5 3\n-1\n3 9 1\n").unwrap();
        assert_eq!(schedule.len(), 2);
        assert_eq!(
            schedule.entries()[1],
            ScheduleEntry { customer: CustomerId(2), arrival: 5, party_size: 3 }
        );
    }

    #[test]
    fn test_parse_accepts_missing_sentinel_and_free_whitespace() {
        let schedule = Schedule::parse("1 0\n 2\n\n2\t7 1").unwrap();
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.entries()[0].party_size, 2);
        assert_eq!(schedule.entries()[1].arrival, 7);
    }

    #[test]
    fn test_parse_rejects_truncated_record() {
        let err = Schedule::parse("1 0 2\n2 5\n").unwrap_err();
        assert!(matches!(err, ScheduleError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(matches!(
            Schedule::parse("0 5 1\n-1").unwrap_err(),
            ScheduleError::InvalidCustomerId { value: 0, .. }
        ));
        assert!(matches!(
            Schedule::parse("-3 5 1\n-1").unwrap_err(),
            ScheduleError::InvalidCustomerId { value: -3, .. }
        ));
        assert!(matches!(
            Schedule::parse("1 -5 1\n-1").unwrap_err(),
            ScheduleError::Malformed { .. }
        ));
        assert!(matches!(
            Schedule::parse("4 5 0\n-1").unwrap_err(),
            ScheduleError::EmptyParty { line: 1, .. }
        ));
        assert_eq!(
            Schedule::parse("1 0 1 1 3 2 -1").unwrap_err(),
            ScheduleError::DuplicateCustomer(CustomerId(1))
        );
    }

    #[test]
    fn test_text_round_trip() {
        let schedule = Schedule::from_records(&[(1, 0, 2), (2, 3, 4)]).unwrap();
        assert_eq!(schedule.to_text(), "1 0 2\n2 3 4\n-1\n");
        assert_eq!(Schedule::parse(&schedule.to_text()).unwrap(), schedule);
    }

    #[test]
    fn test_generate_is_reproducible_and_sorted() {
        let profile = ScheduleProfile { customers: 25, ..ScheduleProfile::default() };
        let a = Schedule::generate(7, &profile);
        let b = Schedule::generate(7, &profile);
        assert_eq!(a, b);
        assert_eq!(a.len(), 25);
        assert!(a.entries().windows(2).all(|w| w[0].arrival <= w[1].arrival));
        assert!(a.entries().iter().all(|e| (1..=4).contains(&e.party_size)));
        let ids: Vec<u32> = a.entries().iter().map(|e| e.customer.get()).collect();
        assert_eq!(ids, (1..=25).collect::<Vec<_>>());
    }

    #[test]
    fn test_generate_without_gaps() {
        let profile = ScheduleProfile {
            customers: 3,
            mean_gap_minutes: 0.0,
            max_party_size: 1,
            first_arrival: 12,
        };
        let schedule = Schedule::generate(1, &profile);
        assert!(schedule.entries().iter().all(|e| e.arrival == 12 && e.party_size == 1));
    }
}
