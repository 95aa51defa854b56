use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tracing::info;

use crate::{
    config::Config,
    error::tool_error::ToolError,
    tools::{HttpFetcher, Tool, ToolFunction, ToolName, ToolPayload, param_f64, param_str},
};

const API_BASE: &str = "https://api.openweathermap.org/data/2.5";

/// OpenWeatherMap integration: current weather by city name or coordinates.
pub struct WeatherTool {
    fetcher: HttpFetcher,
    api_key: Option<String>,
}

impl WeatherTool {
    pub fn new(config: &Config) -> Self {
        Self {
            fetcher: HttpFetcher::new(API_BASE, config.request_timeout, config.cache_ttl),
            api_key: config.openweather_api_key.clone(),
        }
    }

    fn api_key(&self) -> Result<&str, ToolError> {
        self.api_key.as_deref().ok_or_else(|| {
            ToolError::Permanent(
                "OpenWeatherMap API key not configured. Set OPENWEATHER_API_KEY in your .env file."
                    .to_string(),
            )
        })
    }

    async fn current_weather(&self, city: &str) -> Result<ToolPayload, ToolError> {
        info!(city, "getting current weather");
        let params = [
            ("q", city.to_string()),
            ("units", "standard".to_string()),
            ("appid", self.api_key()?.to_string()),
        ];
        // City lookups carry substitute data so a timeout still yields an
        // answer, disclosed downstream as degraded.
        let fallback = json!({
            "success": false,
            "error": format!("Weather service unavailable for {city}"),
            "fallback": true,
            "message": "Please try again later or check weather.com",
        });
        let payload = self
            .fetcher
            .get_json("weather", &params, &[], Some(fallback))
            .await?;
        Ok(Self::normalize(payload))
    }

    async fn weather_by_coords(&self, lat: f64, lon: f64) -> Result<ToolPayload, ToolError> {
        info!(lat, lon, "getting weather by coordinates");
        let params = [
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("units", "standard".to_string()),
            ("appid", self.api_key()?.to_string()),
        ];
        let payload = self.fetcher.get_json("weather", &params, &[], None).await?;
        Ok(Self::normalize(payload))
    }

    /// Reshape the raw API response; fallback payloads pass through as-is.
    fn normalize(payload: ToolPayload) -> ToolPayload {
        if payload.fallback {
            return payload;
        }
        let data = &payload.data;
        let main = &data["main"];
        let weather = &data["weather"][0];
        let wind = &data["wind"];
        let sys = &data["sys"];

        let normalized = json!({
            "success": true,
            "location": {
                "city": data["name"],
                "country": sys["country"],
                "coordinates": {
                    "latitude": data["coord"]["lat"],
                    "longitude": data["coord"]["lon"],
                },
            },
            "weather": {
                "condition": weather["main"],
                "description": weather["description"],
                "icon": weather["icon"],
            },
            "temperature": {
                "current": temps(main["temp"].as_f64()),
                "feels_like": temps(main["feels_like"].as_f64()),
                "min": temps(main["temp_min"].as_f64()),
                "max": temps(main["temp_max"].as_f64()),
            },
            "humidity": main["humidity"],
            "pressure": main["pressure"],
            "visibility": data["visibility"],
            "wind": {
                "speed_ms": wind["speed"],
                "speed_mph": wind["speed"].as_f64().map(|s| round1(s * 2.237)),
                "direction_degrees": wind["deg"],
                "gust_ms": wind["gust"],
            },
            "clouds": { "coverage_percent": data["clouds"]["all"] },
            "sun": {
                "sunrise_utc": sys["sunrise"],
                "sunset_utc": sys["sunset"],
            },
            "timezone_offset": data["timezone"],
        });
        ToolPayload::live(normalized)
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> ToolName {
        ToolName::Weather
    }

    async fn invoke(
        &self,
        function: ToolFunction,
        params: &Map<String, Value>,
    ) -> Result<ToolPayload, ToolError> {
        match function {
            ToolFunction::GetCurrentWeather => {
                let city = param_str(params, "city").ok_or_else(|| {
                    ToolError::Permanent("City parameter required".to_string())
                })?;
                self.current_weather(city).await
            }
            ToolFunction::GetWeatherByCoordinates => {
                let lat = param_f64(params, "lat");
                let lon = param_f64(params, "lon");
                match (lat, lon) {
                    (Some(lat), Some(lon)) => self.weather_by_coords(lat, lon).await,
                    _ => Err(ToolError::Permanent(
                        "Latitude and longitude parameters required".to_string(),
                    )),
                }
            }
            other => Err(ToolError::UnknownFunction {
                tool: self.name().to_string(),
                function: other.to_string(),
            }),
        }
    }
}

fn kelvin_to_celsius(kelvin: f64) -> f64 {
    round1(kelvin - 273.15)
}

fn kelvin_to_fahrenheit(kelvin: f64) -> f64 {
    round1((kelvin - 273.15) * 9.0 / 5.0 + 32.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn temps(kelvin: Option<f64>) -> Value {
    match kelvin {
        Some(k) => json!({
            "celsius": kelvin_to_celsius(k),
            "fahrenheit": kelvin_to_fahrenheit(k),
        }),
        None => json!({ "celsius": null, "fahrenheit": null }),
    }
}
