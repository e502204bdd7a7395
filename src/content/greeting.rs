//! Time of day greeting, always the first fragment of an alarm

use super::{ContentGenerator, ContentHandler};
use crate::config::Section;
use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDateTime, NaiveTime, Timelike};

const ORDINALS: [&str; 31] = [
    "first",
    "second",
    "third",
    "fourth",
    "fifth",
    "sixth",
    "seventh",
    "eighth",
    "ninth",
    "tenth",
    "eleventh",
    "twelfth",
    "thirteenth",
    "fourteenth",
    "fifteenth",
    "sixteenth",
    "seventeenth",
    "eighteenth",
    "nineteenth",
    "twentieth",
    "twenty-first",
    "twenty-second",
    "twenty-third",
    "twenty-fourth",
    "twenty-fifth",
    "twenty-sixth",
    "twenty-seventh",
    "twenty-eighth",
    "twenty-ninth",
    "thirtieth",
    "thirty-first",
];

/// Spoken ordinal for a day of month ("sixteenth")
pub fn ordinal_word(day: u32) -> String {
    match day {
        1..=31 => ORDINALS[day as usize - 1].to_string(),
        _ => day.to_string(),
    }
}

/// Part of the day used in the greeting
pub fn period_of_day(hour: u32) -> &'static str {
    match hour {
        0..=11 => "morning",
        12..=16 => "afternoon",
        _ => "evening",
    }
}

#[derive(Debug, Clone)]
pub struct Greeting {
    name: String,
    alarm_time: Option<NaiveTime>,
}

impl Greeting {
    /// `alarm_time` is the time announced; the current time is used when unset
    pub fn new(name: impl Into<String>, alarm_time: Option<NaiveTime>) -> Self {
        Self {
            name: name.into(),
            alarm_time,
        }
    }

    pub fn from_section(section: &Section<ContentHandler>, alarm_time: Option<NaiveTime>) -> Self {
        Self::new(section.get_str_or("name", ""), alarm_time)
    }

    /// Greeting text as spoken at `now`
    pub fn compose(&self, now: NaiveDateTime) -> String {
        let time = self.alarm_time.unwrap_or_else(|| now.time());
        let addressee = if self.name.is_empty() {
            String::new()
        } else {
            format!(", {}", self.name)
        };

        format!(
            "Good {}{}. It's {} {} {}. The time is {}.\n\n",
            period_of_day(now.hour()),
            addressee,
            now.format("%A"),
            now.format("%B"),
            ordinal_word(now.day()),
            time.format("%I:%M %p")
        )
    }
}

#[async_trait]
impl ContentGenerator for Greeting {
    async fn generate(&self) -> String {
        self.compose(Local::now().naive_local())
    }

    fn name(&self) -> &str {
        "greeting"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_current_time_when_alarm_time_unset() {
        let text = Greeting::new("Ada", None).compose(at(7, 2));
        assert!(text.to_lowercase().contains("the time is 07:02"), "{}", text);
        assert!(text.starts_with("Good morning, Ada. It's Friday October sixteenth."));
    }

    #[test]
    fn test_alarm_time_override_in_twelve_hour_format() {
        let alarm_time = NaiveTime::from_hms_opt(20, 21, 0);
        let text = Greeting::new("Ada", alarm_time).compose(at(7, 2));
        assert!(text.contains("08:21"), "{}", text);
        assert!(text.contains("PM"), "{}", text);
    }

    #[test]
    fn test_period_boundaries() {
        assert_eq!(period_of_day(0), "morning");
        assert_eq!(period_of_day(11), "morning");
        assert_eq!(period_of_day(12), "afternoon");
        assert_eq!(period_of_day(16), "afternoon");
        assert_eq!(period_of_day(17), "evening");
        assert_eq!(period_of_day(23), "evening");
    }

    #[test]
    fn test_ordinals() {
        assert_eq!(ordinal_word(1), "first");
        assert_eq!(ordinal_word(22), "twenty-second");
        assert_eq!(ordinal_word(31), "thirty-first");
    }

    #[test]
    fn test_empty_name_is_omitted() {
        let text = Greeting::new("", None).compose(at(18, 30));
        assert!(text.starts_with("Good evening. It's"));
    }
}
