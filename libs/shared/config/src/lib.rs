use std::env;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub clinic_open_hour: u32,
    pub clinic_close_hour: u32,
    pub slot_minutes: u32,
    pub consultation_fee: f64,
    pub hourly_start_hour: u32,
    pub hourly_end_hour: u32,
    pub daily_window_days: u32,
    pub booking_week_days: u32,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            clinic_open_hour: 9,
            clinic_close_hour: 17,
            slot_minutes: 30,
            consultation_fee: 150.0,
            hourly_start_hour: 8,
            hourly_end_hour: 18,
            daily_window_days: 7,
            booking_week_days: 7,
            port: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            clinic_open_hour: env_or("CLINIC_OPEN_HOUR", defaults.clinic_open_hour),
            clinic_close_hour: env_or("CLINIC_CLOSE_HOUR", defaults.clinic_close_hour),
            slot_minutes: env_or("SLOT_MINUTES", defaults.slot_minutes),
            consultation_fee: env_or("CONSULTATION_FEE", defaults.consultation_fee),
            hourly_start_hour: env_or("HOURLY_START_HOUR", defaults.hourly_start_hour),
            hourly_end_hour: env_or("HOURLY_END_HOUR", defaults.hourly_end_hour),
            daily_window_days: env_or("DAILY_WINDOW_DAYS", defaults.daily_window_days),
            booking_week_days: env_or("BOOKING_WEEK_DAYS", defaults.booking_week_days),
            port: env_or("PORT", defaults.port),
        };

        if !config.is_valid() {
            warn!("Clinic hours or reporting ranges are inconsistent - falling back to defaults");
            return Self { port: config.port, ..defaults };
        }

        config
    }

    /// Working-hours window and reporting ranges are usable as given.
    pub fn is_valid(&self) -> bool {
        self.clinic_open_hour < self.clinic_close_hour
            && self.clinic_close_hour <= 24
            && self.slot_minutes > 0
            && 60 % self.slot_minutes == 0
            && self.hourly_start_hour <= self.hourly_end_hour
            && self.hourly_end_hour < 24
            && self.daily_window_days > 0
            && self.consultation_fee >= 0.0
    }
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has unparsable value {:?}, using default {}", key, raw, default);
            default
        }),
        Err(_) => {
            warn!("{} not set, using default {}", key, default);
            default
        }
    }
}
