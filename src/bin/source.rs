use chrono::{Duration, Utc};
use rand::Rng;
use rocket::{
    FromForm,
    figment::Figment,
    get,
    http::Status,
    launch,
    request::{FromRequest, Outcome},
    routes,
    serde::json::Json,
};
use tracing::trace;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};
use wallboard::{
    Direction, MetricSample, SourcePayload, TrendPoint,
    util::{get_addr, get_port, get_secret},
};

/// Base values the mock source jitters around, with unit and direction.
const BOARD: [(&str, f64, u32, &str, Direction); 9] = [
    ("conversations_today", 2847.0, 5, "", Direction::HigherIsBetter),
    ("eval_completion_pct", 84.0, 5, "%", Direction::HigherIsBetter),
    ("instascore_pct", 92.0, 4, "%", Direction::HigherIsBetter),
    ("aht_seconds", 360.0, 5, "s", Direction::LowerIsBetter),
    ("frt_seconds", 40.0, 6, "s", Direction::LowerIsBetter),
    ("crt_minutes", 72.0, 6, "m", Direction::LowerIsBetter),
    ("icsat_pct", 78.0, 5, "%", Direction::HigherIsBetter),
    ("manual_qa_pct", 83.0, 5, "%", Direction::HigherIsBetter),
    ("coaching_today", 12.0, 50, "", Direction::HigherIsBetter),
];

/// Jitter a base value by up to ±pct/2 percent, never below zero.
/// Percentage metrics keep one decimal, counts are whole.
fn jittered(base: f64, pct: u32, decimal: bool) -> f64 {
    let mut rng = rand::rng();
    let delta = base * (rng.random_range(0.0..1.0) * pct as f64 / 100.0 - pct as f64 / 200.0);
    let value = (base + delta).max(0.0);
    if decimal {
        (value * 10.0).round() / 10.0
    } else {
        value.round()
    }
}

#[get("/metrics")]
fn metrics(_secret: SecretKey) -> Json<SourcePayload> {
    let metrics = BOARD
        .iter()
        .map(|(id, base, pct, unit, direction)| MetricSample {
            id: id.to_string(),
            value: jittered(*base, *pct, *unit == "%"),
            unit: unit.to_string(),
            direction: Some(*direction),
        })
        .collect();

    Json(SourcePayload {
        metrics,
        timestamp: Utc::now(),
        tenant: "acme".to_string(),
    })
}

#[derive(Debug, FromForm)]
struct TrendQuery {
    #[field(name = "metricId")]
    metric_id: String,
    range: Option<String>,
}

#[derive(Debug, serde::Serialize)]
struct TrendPayload {
    points: Vec<TrendPoint>,
}

#[get("/trend?<q..>")]
fn trend(_secret: SecretKey, q: TrendQuery) -> Json<TrendPayload> {
    let range = q.range.as_deref().unwrap_or("today");
    trace!("trend requested for {} over {range}", q.metric_id);
    let (min, max) = trend_bounds(&q.metric_id);

    let mut rng = rand::rng();
    let now = Utc::now();
    let mut current = (min + max) / 2.0;

    let points = (0..=12i64)
        .rev()
        .map(|i| {
            let variation = (rng.random_range(0.0..1.0) - 0.5) * (max - min) * 0.1;
            current = (current + variation).clamp(min, max);
            TrendPoint {
                time: (now - Duration::minutes(i * 5)).format("%H:%M").to_string(),
                value: (current * 10.0).round() / 10.0,
            }
        })
        .collect();

    Json(TrendPayload { points })
}

fn trend_bounds(metric_id: &str) -> (f64, f64) {
    let id = metric_id.to_lowercase();
    if id.contains("aht") || id.contains("frt") || id.contains("crt") {
        (1.0, 10.0)
    } else if id.contains("coaching") {
        (0.0, 20.0)
    } else if id.contains("conversation") {
        (80.0, 400.0)
    } else if id.contains("pct") {
        (60.0, 95.0)
    } else {
        (0.0, 100.0)
    }
}

#[get("/ping")]
fn ping() {}

fn init() {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter::LevelFilter::DEBUG)
        .init();
}

fn get_config() -> Figment {
    rocket::Config::figment()
        .merge(("port", get_port()))
        .merge(("address", get_addr()))
        .merge(("workers", 1))
}

#[launch]
fn rocket() -> _ {
    init();
    let figment = get_config();

    rocket::custom(figment).mount("/", routes![metrics, trend, ping])
}

#[derive(Debug)]
struct SecretKey;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SecretKey {
    type Error = ();

    async fn from_request(
        request: &'r rocket::Request<'_>,
    ) -> rocket::request::Outcome<Self, Self::Error> {
        let header = request.headers().get_one("X-WALLBOARD-SECRET");
        let secret = get_secret();
        if let Some(secret) = secret {
            if let Some(passed_secret) = header
                && passed_secret == secret
            {
                Outcome::Success(SecretKey)
            } else {
                Outcome::Error((Status::Unauthorized, ()))
            }
        } else {
            Outcome::Success(SecretKey)
        }
    }
}
