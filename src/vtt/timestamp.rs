//! Модуль для преобразования временных меток VTT
//!
//! Разбор `HH:MM:SS.mmm` / `MM:SS.mmm` в секунды и обратное форматирование
//! для подписи под миниатюрой.

/// Парсинг строки времени в формате HH:MM:SS.mmm или MM:SS.mmm
///
/// Возвращает `None` при нечисловых компонентах, неверном числе сегментов или
/// значении, не помещающемся в `u64` секунд.
pub fn parse_timestamp(time_str: &str) -> Option<f64> {
    let parts: Vec<&str> = time_str.trim().split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }

    let (hours, minutes, seconds_part) = if parts.len() == 3 {
        (parse_digits(parts[0])?, parse_digits(parts[1])?, parts[2])
    } else {
        (0, parse_digits(parts[0])?, parts[1])
    };

    let (whole, fraction) = match seconds_part.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (seconds_part, None),
    };
    let seconds = parse_digits(whole)?;

    let fraction = match fraction {
        Some(ms_str) => {
            let ms = parse_digits(ms_str)?;
            ms as f64 / 10_f64.powi(ms_str.len() as i32)
        }
        None => 0.0,
    };

    let whole_seconds = hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)?;

    Some(whole_seconds as f64 + fraction)
}

/// Только ASCII-цифры: `str::parse` пропустил бы знак `+`
fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u64>().ok()
}

/// Форматирует секунды как `MM:SS` или `HH:MM:SS`
///
/// Доли секунды отбрасываются. Отрицательное или нечисловое значение даёт `"00:00"`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }

    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        // Формат MM:SS.mmm
        assert_eq!(parse_timestamp("01:30.500"), Some(90.5));

        // Формат HH:MM:SS.mmm
        assert_eq!(parse_timestamp("01:01:30.500"), Some(3690.5));

        // Без долей секунды
        assert_eq!(parse_timestamp("00:00:05"), Some(5.0));

        // Короткая дробная часть
        assert_eq!(parse_timestamp("00:02.5"), Some(2.5));
    }

    #[test]
    fn test_parse_timestamp_invalid() {
        assert_eq!(parse_timestamp("invalid"), None);
        assert_eq!(parse_timestamp("12"), None);
        assert_eq!(parse_timestamp("1:2:3:4.000"), None);
        assert_eq!(parse_timestamp("aa:10.000"), None);
        assert_eq!(parse_timestamp("00:-1.000"), None);
        assert_eq!(parse_timestamp("00:10.x"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_parse_timestamp_overflow() {
        assert_eq!(parse_timestamp("9999999999999999999:00:00.000"), None);
        assert_eq!(parse_timestamp("00:99999999999999999999.000"), None);
        assert_eq!(parse_timestamp("5124095576030432:00:00.000"), None);
        assert_eq!(parse_timestamp("1000000:00:00"), Some(3_600_000_000.0));
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(59.999), "00:59");
        assert_eq!(format_time(90.5), "01:30");
        assert_eq!(format_time(3690.5), "01:01:30");
        assert_eq!(format_time(-3.0), "00:00");
        assert_eq!(format_time(f64::NAN), "00:00");
        assert_eq!(format_time(f64::INFINITY), "00:00");
    }

    #[test]
    fn test_round_trip_drops_milliseconds() {
        for (input, expected) in [
            ("00:00:07.999", "00:07"),
            ("00:12:34.567", "12:34"),
            ("02:03:04.005", "02:03:04"),
            ("59:59.999", "59:59"),
        ] {
            let seconds = parse_timestamp(input).unwrap();
            assert_eq!(format_time(seconds), expected, "input {}", input);
        }
    }
}
