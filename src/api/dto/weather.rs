/*
 * Responsibility
 * - Weather request/response DTOs
 * - validate() rejects bodies missing any reading (→ 400)
 */
use serde::{Deserialize, Serialize};

use crate::repos::weather_repo::WeatherRow;

#[derive(Debug, Serialize)]
pub struct WeatherResponse {
    pub location: LocationDto,
    pub weather: WeatherDto,
}

#[derive(Debug, Serialize)]
pub struct LocationDto {
    pub city: String,
    pub country: String,
    pub region: String,
}

#[derive(Debug, Serialize)]
pub struct WeatherDto {
    pub temp: f64,
    pub pressure: f64,
    pub humidity: i32,
}

impl From<WeatherRow> for WeatherResponse {
    fn from(row: WeatherRow) -> Self {
        Self {
            location: LocationDto {
                city: row.city,
                country: row.country,
                region: row.region,
            },
            weather: WeatherDto {
                temp: row.temp,
                pressure: row.pressure,
                humidity: row.humidity,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateWeatherRequest {
    pub weather: Option<WeatherReading>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherReading {
    pub temp: Option<f64>,
    pub pressure: Option<f64>,
    pub humidity: Option<i32>,
}

/// A reading with every field present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidReading {
    pub temp: f64,
    pub pressure: f64,
    pub humidity: i32,
}

impl UpdateWeatherRequest {
    pub fn validate(&self) -> Result<ValidReading, &'static str> {
        let Some(weather) = &self.weather else {
            return Err("weather is required");
        };
        let temp = weather.temp.ok_or("weather.temp is required")?;
        let pressure = weather.pressure.ok_or("weather.pressure is required")?;
        let humidity = weather.humidity.ok_or("weather.humidity is required")?;

        if !temp.is_finite() {
            return Err("weather.temp must be a finite number");
        }
        if !pressure.is_finite() {
            return Err("weather.pressure must be a finite number");
        }

        Ok(ValidReading {
            temp,
            pressure,
            humidity,
        })
    }
}
