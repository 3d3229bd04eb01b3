use std::thread;

use chrono::{DateTime, Duration, Utc};

use crate::predict::error::PredictError;
use crate::predict::frames::{geodetic_to_fixed, inertial_to_fixed, inertial_to_geodetic};
use crate::predict::propagation::Propagate;
use crate::predict::types::{ClosestApproach, FixedPosition, GeodeticCoordinate, InertialPosition};

/// Lazy sequence of `(index, t0 + index * step)` over a bounded window.
#[derive(Debug, Clone)]
pub struct SampleTimes {
    t0: DateTime<Utc>,
    step_millis: u64,
    next: usize,
    end: usize,
}

impl SampleTimes {
    pub fn new(t0: DateTime<Utc>, step_millis: u64, count: usize) -> Result<Self, PredictError> {
        if step_millis == 0 {
            return Err(PredictError::InvalidParameters(
                "step must be at least 1 ms".into(),
            ));
        }
        if count == 0 {
            return Err(PredictError::InvalidParameters(
                "at least one step is required".into(),
            ));
        }

        // every offset below is bounded by the last one
        let last = step_millis
            .checked_mul((count - 1) as u64)
            .and_then(|ms| i64::try_from(ms).ok())
            .and_then(Duration::try_milliseconds)
            .and_then(|offset| t0.checked_add_signed(offset));
        if last.is_none() {
            return Err(PredictError::InvalidParameters(format!(
                "{} steps of {} ms overflow the time range",
                count, step_millis
            )));
        }

        Ok(Self {
            t0,
            step_millis,
            next: 0,
            end: count,
        })
    }

    pub fn t0(&self) -> DateTime<Utc> {
        self.t0
    }

    /// Splits the remaining samples into at most `parts` contiguous runs.
    pub fn split(self, parts: usize) -> Vec<SampleTimes> {
        let total = self.end - self.next;
        let parts = parts.clamp(1, total.max(1));
        let base = total / parts;
        let extra = total % parts;

        let mut start = self.next;
        (0..parts)
            .map(|k| {
                let len = base + usize::from(k < extra);
                let chunk = SampleTimes {
                    next: start,
                    end: start + len,
                    ..self.clone()
                };
                start += len;
                chunk
            })
            .collect()
    }

    fn time_at(&self, index: usize) -> DateTime<Utc> {
        self.t0 + Duration::milliseconds(self.step_millis as i64 * index as i64)
    }
}

impl Iterator for SampleTimes {
    type Item = (usize, DateTime<Utc>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some((index, self.time_at(index)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SampleTimes {}

/// One evaluated sample. Keeps the inertial position and the sidereal angle so
/// the geodetic projection of the winner uses the same rotation as its distance.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    time: DateTime<Utc>,
    distance_km: f64,
    position: InertialPosition,
    sidereal: f64,
}

impl Candidate {
    /// Smaller distance wins, equal distances go to the earlier sample.
    fn closer(self, other: Candidate) -> Candidate {
        if other.distance_km < self.distance_km
            || (other.distance_km == self.distance_km && other.index < self.index)
        {
            other
        } else {
            self
        }
    }

    fn into_approach(self) -> ClosestApproach {
        ClosestApproach {
            time: self.time,
            sample_index: self.index,
            position: inertial_to_geodetic(&self.position, self.sidereal),
            distance_km: self.distance_km,
        }
    }
}

fn merge(best: Option<Candidate>, candidate: Option<Candidate>) -> Option<Candidate> {
    match (best, candidate) {
        (Some(a), Some(b)) => Some(a.closer(b)),
        (a, b) => a.or(b),
    }
}

fn evaluate<P: Propagate + ?Sized>(
    propagator: &P,
    target: &FixedPosition,
    index: usize,
    time: DateTime<Utc>,
) -> Result<Candidate, PredictError> {
    let state = propagator
        .propagate(time)
        .map_err(|e| PredictError::ScanAborted {
            index,
            source: Box::new(e),
        })?;
    let sidereal = propagator.sidereal_time(time);
    let fixed = inertial_to_fixed(&state.position, sidereal);
    let distance_km = fixed.distance_km(target);
    if !distance_km.is_finite() {
        return Err(PredictError::ScanAborted {
            index,
            source: Box::new(PredictError::Propagation {
                time,
                message: format!("non-finite position {:?}", state.position.0),
            }),
        });
    }

    Ok(Candidate {
        index,
        time,
        distance_km,
        position: state.position,
        sidereal,
    })
}

fn scan<P: Propagate + ?Sized>(
    propagator: &P,
    target: &FixedPosition,
    mut samples: SampleTimes,
) -> Result<Option<Candidate>, PredictError> {
    samples.try_fold(None, |best, (index, time)| {
        let candidate = evaluate(propagator, target, index, time)?;
        Ok(merge(best, Some(candidate)))
    })
}

fn finish(best: Option<Candidate>) -> Result<ClosestApproach, PredictError> {
    best.map(Candidate::into_approach)
        .ok_or_else(|| PredictError::InvalidParameters("no samples evaluated".into()))
}

/// Scans `max_steps` samples spaced `step_millis` apart starting at `t0` and
/// returns the one closest to `target`.
pub fn find_closest_approach<P: Propagate + ?Sized>(
    propagator: &P,
    target: &GeodeticCoordinate,
    step_millis: u64,
    max_steps: usize,
    t0: DateTime<Utc>,
) -> Result<ClosestApproach, PredictError> {
    let samples = SampleTimes::new(t0, step_millis, max_steps)?;
    let target_fixed = geodetic_to_fixed(target);
    finish(scan(propagator, &target_fixed, samples)?)
}

/// Same result as [`find_closest_approach`], with the window split across
/// `workers` scoped threads.
pub fn find_closest_approach_parallel<P: Propagate + Sync + ?Sized>(
    propagator: &P,
    target: &GeodeticCoordinate,
    step_millis: u64,
    max_steps: usize,
    t0: DateTime<Utc>,
    workers: usize,
) -> Result<ClosestApproach, PredictError> {
    if workers == 0 {
        return Err(PredictError::InvalidParameters(
            "at least one worker is required".into(),
        ));
    }
    let samples = SampleTimes::new(t0, step_millis, max_steps)?;
    let target_fixed = geodetic_to_fixed(target);
    let target_fixed = &target_fixed;

    let results: Vec<Result<Option<Candidate>, PredictError>> = thread::scope(|s| {
        let handles: Vec<_> = samples
            .split(workers)
            .into_iter()
            .map(|chunk| s.spawn(move || scan(propagator, target_fixed, chunk)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    });

    // chunks are in index order, so the first error is the earliest failing sample
    let mut best = None;
    for result in results {
        best = merge(best, result?);
    }
    finish(best)
}

/// Parameters of one closest-approach scan.
#[derive(Debug, Clone, Copy)]
pub struct ApproachSearch {
    pub target: GeodeticCoordinate,
    pub step_millis: u64,
    pub max_steps: usize,
    pub workers: usize,
}

impl ApproachSearch {
    pub fn window_end(&self, t0: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let ms = self.step_millis.checked_mul(self.max_steps.checked_sub(1)? as u64)?;
        let offset = Duration::try_milliseconds(i64::try_from(ms).ok()?)?;
        t0.checked_add_signed(offset)
    }

    pub fn run<P: Propagate + Sync + ?Sized>(
        &self,
        propagator: &P,
        t0: DateTime<Utc>,
    ) -> Result<ClosestApproach, PredictError> {
        log::info!(
            "scanning {} samples every {} ms from {} ({} worker(s))",
            self.max_steps,
            self.step_millis,
            t0,
            self.workers
        );

        let result = if self.workers <= 1 {
            find_closest_approach(propagator, &self.target, self.step_millis, self.max_steps, t0)
        } else {
            find_closest_approach_parallel(
                propagator,
                &self.target,
                self.step_millis,
                self.max_steps,
                t0,
                self.workers,
            )
        }?;

        log::debug!(
            "closest sample {} at {}: {:.3} km",
            result.sample_index,
            result.time,
            result.distance_km
        );
        Ok(result)
    }
}
