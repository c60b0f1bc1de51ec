use serde::Serialize;
use std::collections::HashSet;

use crate::error::DomainError;
use crate::models::VenueAssignable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueBucket<T> {
    pub venue: String,
    pub entries: Vec<T>,
}

/// Venue buckets in the order the venues were given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueAssignment<T> {
    pub buckets: Vec<VenueBucket<T>>,
}

impl<T> VenueAssignment<T> {
    pub fn bucket(&self, venue: &str) -> Option<&[T]> {
        self.buckets
            .iter()
            .find(|b| b.venue == venue)
            .map(|b| b.entries.as_slice())
    }

    pub fn total_entries(&self) -> usize {
        self.buckets.iter().map(|b| b.entries.len()).sum()
    }

    /// Reads the buckets back in round-robin order, which yields the original
    /// submission order.
    pub fn interleave(self) -> Vec<T> {
        let total = self.total_entries();
        let mut iters: Vec<_> = self.buckets.into_iter().map(|b| b.entries.into_iter()).collect();
        let mut out = Vec::with_capacity(total);

        while out.len() < total {
            for it in iters.iter_mut() {
                if let Some(entry) = it.next() {
                    out.push(entry);
                }
            }
        }
        out
    }
}

/// Round-robin split: entry `i` goes to `venues[i % venues.len()]`.
pub fn distribute<T>(entries: Vec<T>, venues: &[String]) -> Result<VenueAssignment<T>, DomainError> {
    if venues.is_empty() {
        return Err(DomainError::NoVenues);
    }

    let mut seen = HashSet::new();
    for venue in venues {
        if !seen.insert(venue.as_str()) {
            return Err(DomainError::DuplicateVenue(venue.clone()));
        }
    }

    let mut buckets: Vec<VenueBucket<T>> = venues
        .iter()
        .map(|v| VenueBucket {
            venue: v.clone(),
            entries: Vec::with_capacity(entries.len() / venues.len() + 1),
        })
        .collect();

    let count = buckets.len();
    for (i, entry) in entries.into_iter().enumerate() {
        buckets[i % count].entries.push(entry);
    }

    Ok(VenueAssignment { buckets })
}

/// Like [`distribute`], also writing the venue onto each entry.
pub fn distribute_and_assign<T: VenueAssignable>(
    entries: Vec<T>,
    venues: &[String],
) -> Result<VenueAssignment<T>, DomainError> {
    let mut assignment = distribute(entries, venues)?;
    for bucket in assignment.buckets.iter_mut() {
        for entry in bucket.entries.iter_mut() {
            entry.assign_venue(&bucket.venue);
        }
    }
    Ok(assignment)
}

/// Parses the operator's comma-separated venue list.
pub fn parse_venue_list(input: &str) -> Result<Vec<String>, DomainError> {
    let venues: Vec<String> = input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    if venues.is_empty() {
        return Err(DomainError::NoVenues);
    }
    Ok(venues)
}
