use chrono::{DateTime, Datelike, Timelike, Utc};

/// Locales supported for the human-readable dates embedded in
/// booking notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    EnUs,
    PtBr,
}

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTHS_PT: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

impl Locale {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "en-US" | "en" => Some(Locale::EnUs),
            "pt-BR" | "pt" => Some(Locale::PtBr),
            _ => None,
        }
    }
}

/// Renders a booking date as day-of-month, localized month name and
/// hour:minute with the locale's time suffix.
pub fn format_booking_date(date: DateTime<Utc>, locale: Locale) -> String {
    let month = date.month0() as usize;
    match locale {
        Locale::EnUs => format!(
            "{} {} at {}:{:02}",
            MONTHS_EN[month],
            date.day(),
            date.hour(),
            date.minute()
        ),
        Locale::PtBr => format!(
            "{:02} de {}, às {}:{:02}h",
            date.day(),
            MONTHS_PT[month],
            date.hour(),
            date.minute()
        ),
    }
}
