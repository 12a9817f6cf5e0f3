//! OpenWeatherMap client
//!
//! Current conditions via `/data/2.5/weather` in metric units. Without an
//! API key the router uses `DemoWeather`, which answers with a fixed sample
//! for any city.

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::collaborators::WeatherService;
use crate::config::WeatherSettings;
use crate::types::WeatherInfo;

pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl OpenWeatherClient {
    pub fn new(client: Client, settings: &WeatherSettings, api_key: &str) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            language: settings.language.clone(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct CurrentWeatherResponse {
    name: String,
    main: MainReadings,
    #[serde(default)]
    weather: Vec<Condition>,
    wind: Wind,
}

#[derive(Deserialize, Debug)]
struct MainReadings {
    temp: f64,
    feels_like: f64,
    humidity: u32,
    pressure: u32,
}

#[derive(Deserialize, Debug)]
struct Condition {
    description: String,
}

#[derive(Deserialize, Debug)]
struct Wind {
    speed: f64,
}

impl From<CurrentWeatherResponse> for WeatherInfo {
    fn from(data: CurrentWeatherResponse) -> Self {
        WeatherInfo {
            city: data.name,
            temperature: data.main.temp.round() as i32,
            feels_like: data.main.feels_like.round() as i32,
            description: data
                .weather
                .into_iter()
                .next()
                .map(|c| c.description)
                .unwrap_or_default(),
            humidity: data.main.humidity,
            wind_speed: data.wind.speed,
            pressure: data.main.pressure,
        }
    }
}

impl WeatherService for OpenWeatherClient {
    fn fetch_weather(&self, city: &str) -> Result<WeatherInfo> {
        let url = format!("{}/data/2.5/weather", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", self.language.as_str()),
            ])
            .send()
            .context("Weather request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(anyhow!("Weather API error {}: {}", status, body));
        }

        let data: CurrentWeatherResponse = response
            .json()
            .context("Failed to parse weather response")?;

        Ok(data.into())
    }
}

/// Fixed sample conditions, echoing the requested city
pub struct DemoWeather;

impl WeatherService for DemoWeather {
    fn fetch_weather(&self, city: &str) -> Result<WeatherInfo> {
        Ok(WeatherInfo {
            city: city.to_string(),
            temperature: 22,
            feels_like: 24,
            description: "ясно".to_string(),
            humidity: 65,
            wind_speed: 3.2,
            pressure: 1013,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn settings_for(url: String) -> WeatherSettings {
        WeatherSettings {
            base_url: url,
            ..Default::default()
        }
    }

    #[test]
    fn test_fetch_weather_parses_response() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/data/2.5/weather")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "Казань".into()),
                Matcher::UrlEncoded("appid".into(), "secret".into()),
                Matcher::UrlEncoded("units".into(), "metric".into()),
                Matcher::UrlEncoded("lang".into(), "ru".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "name": "Казань",
                    "main": {"temp": 18.6, "feels_like": 17.4, "humidity": 71, "pressure": 1009},
                    "weather": [{"description": "облачно"}],
                    "wind": {"speed": 4.1}
                }"#,
            )
            .create();

        let client = OpenWeatherClient::new(Client::new(), &settings_for(server.url()), "secret");
        let info = client.fetch_weather("Казань").unwrap();

        mock.assert();
        assert_eq!(info.city, "Казань");
        assert_eq!(info.temperature, 19);
        assert_eq!(info.feels_like, 17);
        assert_eq!(info.description, "облачно");
        assert_eq!(info.humidity, 71);
        assert_eq!(info.pressure, 1009);
    }

    #[test]
    fn test_unknown_city_is_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/data/2.5/weather")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"cod":"404","message":"city not found"}"#)
            .create();

        let client = OpenWeatherClient::new(Client::new(), &settings_for(server.url()), "secret");
        let err = client.fetch_weather("Атлантида").unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_demo_weather_echoes_city() {
        let info = DemoWeather.fetch_weather("Пермь").unwrap();
        assert_eq!(info.city, "Пермь");
        assert_eq!(info.description, "ясно");
    }
}
