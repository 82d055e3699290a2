//! Per-hour headcount store

use parkgate_config::SimulationSettings;
use parkgate_util::{DOMAIN_HOUR_MAX, DOMAIN_HOUR_MIN, Hour, ParkgateError, Result};

/// Hour range and capacity of one simulated day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationParams {
    pub hour_start: Hour,
    pub hour_end: Hour,
    pub capacity: u32,
}

impl SimulationParams {
    pub fn new(hour_start: Hour, hour_end: Hour, capacity: u32) -> Result<Self> {
        if hour_start < DOMAIN_HOUR_MIN || hour_end > DOMAIN_HOUR_MAX {
            return Err(ParkgateError::validation(format!(
                "hours {}..{} outside {}..={}",
                hour_start, hour_end, DOMAIN_HOUR_MIN, DOMAIN_HOUR_MAX
            )));
        }
        if hour_start >= hour_end {
            return Err(ParkgateError::validation(format!(
                "hour_start {} must be before hour_end {}",
                hour_start, hour_end
            )));
        }
        if capacity == 0 {
            return Err(ParkgateError::validation("capacity must be positive"));
        }

        Ok(Self {
            hour_start,
            hour_end,
            capacity,
        })
    }
}

impl From<&SimulationSettings> for SimulationParams {
    fn from(settings: &SimulationSettings) -> Self {
        Self {
            hour_start: settings.hour_start,
            hour_end: settings.hour_end,
            capacity: settings.capacity,
        }
    }
}

/// Headcount per hour over `hour_start..=hour_end + 1`.
///
/// A reservation at hour `h` occupies buckets `h` and `h + 1`. `add` does
/// not check capacity; callers check with [`fits`](Self::fits) first.
#[derive(Debug, Clone)]
pub struct OccupancyTable {
    params: SimulationParams,
    counts: Vec<u32>,
}

impl OccupancyTable {
    pub fn new(params: SimulationParams) -> Self {
        let len = (params.hour_end - params.hour_start + 2) as usize;
        Self {
            params,
            counts: vec![0; len],
        }
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn capacity(&self) -> u32 {
        self.params.capacity
    }

    fn index(&self, hour: Hour) -> Option<usize> {
        if hour < self.params.hour_start {
            return None;
        }
        let idx = (hour - self.params.hour_start) as usize;
        (idx < self.counts.len()).then_some(idx)
    }

    /// Headcount at `hour`; zero outside the tracked range
    pub fn get(&self, hour: Hour) -> u32 {
        self.index(hour).map(|i| self.counts[i]).unwrap_or(0)
    }

    /// Add `n` people to `hour`. Hours outside the tracked range are ignored.
    pub fn add(&mut self, hour: Hour, n: u32) {
        if let Some(i) = self.index(hour) {
            self.counts[i] += n;
        }
    }

    /// Whether a party of `n` can stay for the block starting at `hour`
    pub fn fits(&self, hour: Hour, n: u32) -> bool {
        if hour < self.params.hour_start || hour >= self.params.hour_end {
            return false;
        }
        let cap = u64::from(self.params.capacity);
        u64::from(self.get(hour)) + u64::from(n) <= cap
            && u64::from(self.get(hour + 1)) + u64::from(n) <= cap
    }

    /// `(hour, headcount)` pairs over the simulated day, `hour_start..=hour_end`
    pub fn iter(&self) -> impl Iterator<Item = (Hour, u32)> + '_ {
        (self.params.hour_start..=self.params.hour_end).map(|h| (h, self.get(h)))
    }

    /// Hours tied for the highest headcount, with that headcount
    pub fn peak_hours(&self) -> (Vec<Hour>, u32) {
        self.extreme_hours(|candidate, best| candidate > best)
    }

    /// Hours tied for the lowest headcount, with that headcount
    pub fn valley_hours(&self) -> (Vec<Hour>, u32) {
        self.extreme_hours(|candidate, best| candidate < best)
    }

    fn extreme_hours(&self, better: impl Fn(u32, u32) -> bool) -> (Vec<Hour>, u32) {
        let mut hours = Vec::new();
        let mut best: Option<u32> = None;

        for (hour, count) in self.iter() {
            match best {
                Some(b) if count == b => hours.push(hour),
                Some(b) if !better(count, b) => {}
                _ => {
                    best = Some(count);
                    hours.clear();
                    hours.push(hour);
                }
            }
        }

        (hours, best.unwrap_or(0))
    }
}
