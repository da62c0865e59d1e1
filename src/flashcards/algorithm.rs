//! SM-2 Spaced Repetition Algorithm
//!
//! Implementation of the SuperMemo 2 algorithm for calculating
//! review intervals based on user performance.
//!
//! Ratings map to SM-2 quality as: Again = 0, Hard = 3, Good = 4, Easy = 5.
//! Intervals are rounded half away from zero (`f64::round`).

use chrono::{DateTime, Duration, Utc};

use super::models::Rating;

/// Minimum ease factor allowed
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor given to new cards
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Longest interval the scheduler hands out (about a century)
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// The subset of card fields the scheduler reads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulingState {
    pub interval: u32,
    pub repetitions: u32,
    pub ease_factor: f64,
}

impl Default for SchedulingState {
    fn default() -> Self {
        Self {
            interval: 0,
            repetitions: 0,
            ease_factor: DEFAULT_EASE_FACTOR,
        }
    }
}

/// Fields to overwrite on a card after a review
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewUpdate {
    pub interval: u32,
    pub repetitions: u32,
    pub ease_factor: f64,
    pub next_review_date: DateTime<Utc>,
    pub last_review_date: DateTime<Utc>,
    pub is_new: bool,
}

/// Calculate the next scheduling state using the SM-2 algorithm
///
/// # Arguments
/// * `state` - Current scheduling fields of the card
/// * `rating` - Recall quality reported by the user
/// * `now` - The review instant; used for both due and last-review dates
pub fn compute_next_review(state: &SchedulingState, rating: Rating, now: DateTime<Utc>) -> ReviewUpdate {
    let quality = rating.quality();

    // A stored ease below the floor (or NaN) is corrupt; heal it before use
    let ease_factor = state.ease_factor.max(MIN_EASE_FACTOR);

    let (interval, repetitions) = next_interval(state, quality, ease_factor);

    // EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02))
    let distance = f64::from(5 - quality);
    let ease_factor = (ease_factor + (0.1 - distance * (0.08 + distance * 0.02))).max(MIN_EASE_FACTOR);

    ReviewUpdate {
        interval,
        repetitions,
        ease_factor,
        next_review_date: now
            .checked_add_signed(Duration::days(i64::from(interval)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
        last_review_date: now,
        is_new: false,
    }
}

/// Interval and repetition count after a review of the given quality
fn next_interval(state: &SchedulingState, quality: u8, ease_factor: f64) -> (u32, u32) {
    if quality < 3 {
        // Lapse: the streak is discarded entirely
        return (1, 0);
    }

    let interval = match state.repetitions {
        0 => 1,
        1 => 6,
        // Clamped so a corrupt zero or huge interval can't stick
        _ => ((f64::from(state.interval) * ease_factor).round() as u32).clamp(1, MAX_INTERVAL_DAYS),
    };

    (interval, state.repetitions.saturating_add(1))
}

/// Intervals each rating would produce, in `Rating::ALL` order.
/// Used to show users what each choice schedules.
pub fn preview_intervals(state: &SchedulingState) -> [u32; 4] {
    let ease_factor = state.ease_factor.max(MIN_EASE_FACTOR);
    Rating::ALL.map(|rating| next_interval(state, rating.quality(), ease_factor).0)
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: u32) -> String {
    if days == 0 {
        "now".to_string()
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const DAY_MS: i64 = 86_400_000;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    fn state(interval: u32, repetitions: u32, ease_factor: f64) -> SchedulingState {
        SchedulingState {
            interval,
            repetitions,
            ease_factor,
        }
    }

    fn after(update: &ReviewUpdate) -> SchedulingState {
        SchedulingState {
            interval: update.interval,
            repetitions: update.repetitions,
            ease_factor: update.ease_factor,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_first_review_good() {
        let result = compute_next_review(&SchedulingState::default(), Rating::Good, now());

        assert_eq!(result.interval, 1);
        assert_eq!(result.repetitions, 1);
        assert!(!result.is_new);
    }

    #[test]
    fn test_good_ladder() {
        let first = compute_next_review(&SchedulingState::default(), Rating::Good, now());
        assert_eq!((first.interval, first.repetitions), (1, 1));

        let s = after(&first);
        let second = compute_next_review(&s, Rating::Good, now());
        assert_eq!((second.interval, second.repetitions), (6, 2));

        let s = after(&second);
        let third = compute_next_review(&s, Rating::Good, now());
        assert_eq!((third.interval, third.repetitions), (15, 3));
    }

    #[test]
    fn test_good_leaves_ease_unchanged() {
        let mut s = SchedulingState::default();
        for _ in 0..20 {
            let result = compute_next_review(&s, Rating::Good, now());
            assert_eq!(result.ease_factor, 2.5);
            s = after(&result);
        }
    }

    #[test]
    fn test_easy_raises_hard_lowers_ease() {
        let easy = compute_next_review(&SchedulingState::default(), Rating::Easy, now());
        assert!(easy.ease_factor > 2.5);
        assert_close(easy.ease_factor, 2.6);

        let hard = compute_next_review(&SchedulingState::default(), Rating::Hard, now());
        assert!(hard.ease_factor < 2.5);
        assert_close(hard.ease_factor, 2.36);
    }

    #[test]
    fn test_again_on_new_card() {
        let result = compute_next_review(&SchedulingState::default(), Rating::Again, now());

        assert_eq!(result.interval, 1);
        assert_eq!(result.repetitions, 0);
        assert_close(result.ease_factor, 1.7);
        assert!(!result.is_new);
    }

    #[test]
    fn test_again_resets_streak() {
        for reps in [1, 2, 3, 10, 250] {
            let result = compute_next_review(&state(120, reps, 2.8), Rating::Again, now());
            assert_eq!(result.repetitions, 0);
            assert_eq!(result.interval, 1);
        }
    }

    #[test]
    fn test_again_hits_floor_from_low_ease() {
        for ease in [1.3, 1.5, 1.8, 2.0] {
            let result = compute_next_review(&state(10, 4, ease), Rating::Again, now());
            assert_eq!(result.ease_factor, MIN_EASE_FACTOR);
        }
    }

    #[test]
    fn test_ease_factor_never_below_floor() {
        let mut s = state(30, 5, 2.5);
        for _ in 0..10 {
            let result = compute_next_review(&s, Rating::Again, now());
            assert!(result.ease_factor >= MIN_EASE_FACTOR);
            s = after(&result);
        }
        for _ in 0..10 {
            let result = compute_next_review(&s, Rating::Hard, now());
            assert!(result.ease_factor >= MIN_EASE_FACTOR);
            assert!(result.interval >= 1);
            s = after(&result);
        }
    }

    #[test]
    fn test_easy_from_second_repetition() {
        let result = compute_next_review(&state(6, 2, 2.5), Rating::Easy, now());

        assert_eq!(result.interval, 15);
        assert_eq!(result.repetitions, 3);
        assert_close(result.ease_factor, 2.6);
    }

    #[test]
    fn test_subsequent_review_multiplies_by_ease() {
        let result = compute_next_review(&state(10, 5, 2.5), Rating::Good, now());
        // 10 * 2.5 = 25
        assert_eq!(result.interval, 25);
    }

    #[test]
    fn test_interval_rounds_half_away_from_zero() {
        // 5 * 2.5 = 12.5 -> 13
        let result = compute_next_review(&state(5, 3, 2.5), Rating::Good, now());
        assert_eq!(result.interval, 13);
        // 7 * 1.3 = 9.1 -> 9
        let result = compute_next_review(&state(7, 3, 1.3), Rating::Good, now());
        assert_eq!(result.interval, 9);
    }

    #[test]
    fn test_corrupt_ease_is_clamped_on_read() {
        let result = compute_next_review(&state(10, 3, 0.4), Rating::Good, now());
        // Interval uses the healed ease: 10 * 1.3 = 13
        assert_eq!(result.interval, 13);
        assert_eq!(result.ease_factor, MIN_EASE_FACTOR);

        let result = compute_next_review(&state(10, 3, f64::NAN), Rating::Easy, now());
        assert_close(result.ease_factor, 1.4);
    }

    #[test]
    fn test_huge_interval_is_capped() {
        let result = compute_next_review(&state(100_000_000, 5, 2.5), Rating::Good, now());
        assert_eq!(result.interval, MAX_INTERVAL_DAYS);
        assert_eq!(result.repetitions, 6);
        assert_eq!(
            result.next_review_date,
            now() + Duration::days(i64::from(MAX_INTERVAL_DAYS))
        );

        let result = compute_next_review(&state(u32::MAX, 5, 2.5), Rating::Easy, now());
        assert_eq!(result.interval, MAX_INTERVAL_DAYS);
        assert_eq!(preview_intervals(&state(u32::MAX, 5, 2.5))[2], MAX_INTERVAL_DAYS);
    }

    #[test]
    fn test_next_review_saturates_at_latest_date() {
        let result = compute_next_review(&state(6, 2, 2.5), Rating::Good, DateTime::<Utc>::MAX_UTC);
        assert_eq!(result.next_review_date, DateTime::<Utc>::MAX_UTC);
        assert_eq!(result.interval, 15);
    }

    #[test]
    fn test_dates_use_single_instant() {
        let result = compute_next_review(&state(6, 2, 2.5), Rating::Good, now());

        assert_eq!(result.last_review_date, now());
        assert_eq!(
            result.next_review_date.timestamp_millis(),
            now().timestamp_millis() + 15 * DAY_MS
        );
    }

    #[test]
    fn test_preview_intervals() {
        assert_eq!(preview_intervals(&SchedulingState::default()), [1, 1, 1, 1]);
        assert_eq!(preview_intervals(&state(1, 1, 2.5)), [1, 6, 6, 6]);
        assert_eq!(preview_intervals(&state(6, 2, 2.5)), [1, 15, 15, 15]);
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(0), "now");
        assert_eq!(format_interval(1), "1d");
        assert_eq!(format_interval(5), "5d");
        assert_eq!(format_interval(7), "1w");
        assert_eq!(format_interval(14), "2w");
        assert_eq!(format_interval(30), "1mo");
        assert_eq!(format_interval(90), "3mo");
        assert_eq!(format_interval(365), "1y");
        assert_eq!(format_interval(730), "2y");
    }
}
