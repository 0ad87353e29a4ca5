use chrono::{DateTime, Local, TimeZone, Utc};
use lazy_static::lazy_static;

lazy_static! {
    /// Instant the counter measures from, midnight local time
    pub static ref LAUNCH: DateTime<Local> = Local
        .with_ymd_and_hms(2025, 5, 11, 0, 0, 0)
        .earliest()
        .unwrap();
}

pub const LABEL: &str = "Time since launch: ";

/// Anything the counter can write its text into
pub trait TextSink {
    fn set_text(&mut self, text: &str);
}

impl TextSink for String {
    fn set_text(&mut self, text: &str) {
        self.clear();
        self.push_str(text);
    }
}

/// Whole seconds from `start` to `now`, zero if `now` is earlier
pub fn elapsed_seconds<Tz: TimeZone>(start: &DateTime<Tz>, now: &DateTime<Utc>) -> u64 {
    let diff = now.signed_duration_since(start.with_timezone(&Utc));
    diff.num_seconds().max(0) as u64
}

/// Format a duration as `DDd HHh MMm SSs`, each part zero-padded to two digits
pub fn format_elapsed(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let rest = total_seconds % 86_400;
    let hours = rest / 3_600;
    let rest = rest % 3_600;
    let minutes = rest / 60;
    let seconds = rest % 60;

    format!("{:02}d {:02}h {:02}m {:02}s", days, hours, minutes, seconds)
}

/// Full counter text for `now`
pub fn render<Tz: TimeZone>(start: &DateTime<Tz>, now: &DateTime<Utc>) -> String {
    format!("{}{}", LABEL, format_elapsed(elapsed_seconds(start, now)))
}

/// Render into `sink` right away and then once per second, forever
#[cfg(feature = "web")]
pub async fn run_counter<Tz: TimeZone, S: TextSink>(start: DateTime<Tz>, mut sink: S) {
    use tokio::time::{Duration, interval};

    let mut ticker = interval(Duration::from_millis(1000));
    loop {
        // The first tick completes immediately
        ticker.tick().await;
        sink.set_text(&render(&start, &Utc::now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn one_of_each_unit() {
        let start = Utc.with_ymd_and_hms(2025, 5, 11, 0, 0, 0).unwrap();
        let now = start + Duration::seconds(90_061);
        assert_eq!(format_elapsed(elapsed_seconds(&start, &now)), "01d 01h 01m 01s");
    }

    #[test]
    fn pads_zero_and_grows_past_two_digit_days() {
        assert_eq!(format_elapsed(0), "00d 00h 00m 00s");
        assert_eq!(format_elapsed(59), "00d 00h 00m 59s");
        assert_eq!(format_elapsed(86_400 * 123 + 3_599), "123d 00h 59m 59s");
    }

    #[test]
    fn future_start_clamps_to_zero() {
        let now = Utc.with_ymd_and_hms(2025, 5, 11, 0, 0, 0).unwrap();
        let start = now + Duration::seconds(30);
        assert_eq!(elapsed_seconds(&start, &now), 0);
    }

    #[test]
    fn render_adds_label() {
        let start = Utc.with_ymd_and_hms(2025, 5, 11, 0, 0, 0).unwrap();
        let now = start + Duration::seconds(61);
        assert_eq!(render(&start, &now), "Time since launch: 00d 00h 01m 01s");
    }

    #[test]
    fn string_sink_keeps_latest_text() {
        let mut sink = String::from("old");
        sink.set_text("new");
        assert_eq!(sink, "new");
    }

    #[cfg(feature = "web")]
    #[tokio::test(start_paused = true)]
    async fn counter_renders_immediately_then_every_second() {
        use std::sync::{Arc, Mutex};

        struct Recorder(Arc<Mutex<Vec<String>>>);

        impl TextSink for Recorder {
            fn set_text(&mut self, text: &str) {
                self.0.lock().unwrap().push(text.to_string());
            }
        }

        let seen = Arc::new(Mutex::new(Vec::new()));
        let counter = run_counter(*LAUNCH, Recorder(seen.clone()));
        let _ = tokio::time::timeout(std::time::Duration::from_millis(3500), counter).await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert!(seen.iter().all(|text| text.starts_with(LABEL)));
    }
}
