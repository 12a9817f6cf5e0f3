//! Human-readable rendering of dispatch results

use std::fmt::Write;

use crate::types::{
    Calculation, Conversion, EncyclopediaEntry, Envelope, NewsArticle, Payload, Translation,
    WeatherInfo,
};

/// Render an envelope as the message shown to the user
///
/// Error envelopes render as their error detail. Deferred envelopes and
/// envelopes without a payload render as an empty string.
pub fn format(envelope: &Envelope) -> String {
    if envelope.is_error {
        return envelope.error_detail.clone().unwrap_or_default();
    }

    match &envelope.payload {
        Some(Payload::Weather(info)) => format_weather(info),
        Some(Payload::News(articles)) => format_news(articles),
        Some(Payload::Encyclopedia(entry)) => format_encyclopedia(entry),
        Some(Payload::Calculation(calc)) => format_calculation(calc),
        Some(Payload::Conversion(conv)) => format_conversion(conv),
        Some(Payload::Translation(tr)) => format_translation(tr),
        None => String::new(),
    }
}

/// Integral values print without a fractional part (`4`, not `4.0`)
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn format_weather(info: &WeatherInfo) -> String {
    format!(
        "🌤️ Прогноз погоды для {}:\n\
         🌡️ Температура: {}°C\n\
         🌡️ Ощущается как: {}°C\n\
         ☁️ Описание: {}\n\
         💧 Влажность: {}%\n\
         💨 Ветер: {} м/с\n\
         🌡️ Давление: {} гПа",
        info.city,
        info.temperature,
        info.feels_like,
        info.description,
        info.humidity,
        format_number(info.wind_speed),
        info.pressure
    )
}

fn format_news(articles: &[NewsArticle]) -> String {
    let mut out = String::from("📰 Последние новости:\n\n");

    for (i, article) in articles.iter().enumerate() {
        let date: String = article.published_at.chars().take(10).collect();
        let _ = writeln!(out, "{}. {}", i + 1, article.title);
        let _ = writeln!(out, "   {}", article.description.as_deref().unwrap_or(""));
        let _ = writeln!(out, "   📅 {}\n", date);
    }

    out
}

fn format_encyclopedia(entry: &EncyclopediaEntry) -> String {
    format!(
        "📚 {}\n\n{}\n\n🔗 Подробнее: {}",
        entry.title, entry.summary, entry.url
    )
}

fn format_calculation(calc: &Calculation) -> String {
    format!(
        "🧮 Калькулятор:\n{} = {}",
        calc.expression,
        format_number(calc.result)
    )
}

fn format_conversion(conv: &Conversion) -> String {
    format!(
        "💱 Конвертация валют:\n{} {} = {} {}",
        format_number(conv.amount),
        conv.from,
        format_number(conv.result),
        conv.to
    )
}

fn format_translation(tr: &Translation) -> String {
    format!("🌐 Перевод:\n{} → {}", tr.original, tr.translation)
}
