//! Writes a synthetic collisions table for trying the dashboard out.
//!
//! ```text
//! cargo run --bin generate_sample                  # sample_collisions.csv
//! cargo run --bin generate_sample -- out.parquet   # Parquet instead
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const ROWS: usize = 20_000;

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// (label, relative weight, extra injury probability)
const WEATHER: [(&str, f64, f64); 4] = [
    ("Clear", 0.62, 0.00),
    ("Rain", 0.18, 0.04),
    ("Snow", 0.14, 0.06),
    ("Fog/Other", 0.06, 0.03),
];
const LIGHTING: [(&str, f64, f64); 4] = [
    ("Daylight", 0.64, 0.00),
    ("Dark - lit", 0.24, 0.05),
    ("Dark - unlit", 0.05, 0.12),
    ("Dawn/Dusk", 0.07, 0.03),
];
const SURFACE: [(&str, f64, f64); 4] = [
    ("Dry", 0.60, 0.00),
    ("Wet", 0.22, 0.03),
    ("Snow/Ice", 0.15, 0.05),
    ("Other", 0.03, 0.02),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Pick from a weighted table, returning the label and its injury bump.
    fn weighted(&mut self, table: &[(&'static str, f64, f64)]) -> (&'static str, f64) {
        let mut roll = self.next_f64() * table.iter().map(|(_, w, _)| w).sum::<f64>();
        for &(label, weight, bump) in table {
            if roll < weight {
                return (label, bump);
            }
            roll -= weight;
        }
        let (label, _, bump) = table[table.len() - 1];
        (label, bump)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Column-oriented buffer of generated rows; `None` is a missing cell.
#[derive(Default)]
struct Columns {
    year: Vec<Option<i64>>,
    month: Vec<Option<i64>>,
    hour: Vec<Option<i64>>,
    weekday: Vec<Option<&'static str>>,
    weather: Vec<Option<&'static str>>,
    lighting: Vec<Option<&'static str>>,
    surface: Vec<Option<&'static str>>,
    severity: Vec<&'static str>,
    latitude: Vec<Option<f64>>,
    longitude: Vec<Option<f64>>,
}

fn generate(rng: &mut SimpleRng) -> Columns {
    let mut cols = Columns::default();

    for _ in 0..ROWS {
        let year = 2012 + rng.below(10) as i64;
        let month = 1 + rng.below(12) as i64;
        // Rush hours are busier.
        let hour = if rng.chance(0.35) {
            [8, 16, 17][rng.below(3)]
        } else {
            rng.below(24) as i64
        };
        let weekday = WEEKDAYS[rng.below(7)];

        let winter = matches!(month, 12 | 1 | 2 | 3);
        let (weather, w_bump) = if winter && rng.chance(0.3) {
            ("Snow", 0.06)
        } else {
            rng.weighted(&WEATHER)
        };
        let (lighting, l_bump) = rng.weighted(&LIGHTING);
        let (surface, s_bump) = if weather == "Snow" {
            ("Snow/Ice", 0.05)
        } else {
            rng.weighted(&SURFACE)
        };

        let injury = rng.chance(0.18 + w_bump + l_bump + s_bump);

        // Downtown Montreal, with a long tail towards the island's edges.
        let lat = rng.gauss(45.52, 0.045);
        let lon = rng.gauss(-73.62, 0.07);

        cols.year.push(Some(year));
        cols.month.push(Some(month));
        cols.hour.push((!rng.chance(0.01)).then_some(hour));
        cols.weekday.push(Some(weekday));
        cols.weather.push((!rng.chance(0.03)).then_some(weather));
        cols.lighting.push((!rng.chance(0.02)).then_some(lighting));
        cols.surface.push((!rng.chance(0.02)).then_some(surface));
        cols.severity.push(if injury { "Yes" } else { "No" });
        let geocoded = !rng.chance(0.015);
        cols.latitude.push(geocoded.then_some(lat));
        cols.longitude.push(geocoded.then_some(lon));
    }

    cols
}

fn write_csv(cols: &Columns, path: &Path) -> Result<()> {
    fn cell<T: ToString>(v: Option<T>) -> String {
        v.map(|v| v.to_string()).unwrap_or_default()
    }

    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record([
        "year",
        "month",
        "hour",
        "accident_day_of_week",
        "weather_group",
        "lighting_group",
        "road_surface_group",
        "accident_severity",
        "latitude",
        "longitude",
    ])?;
    for i in 0..cols.severity.len() {
        writer.write_record([
            cell(cols.year[i]),
            cell(cols.month[i]),
            cell(cols.hour[i]),
            cell(cols.weekday[i]),
            cell(cols.weather[i]),
            cell(cols.lighting[i]),
            cell(cols.surface[i]),
            cols.severity[i].to_string(),
            cell(cols.latitude[i].map(|v| format!("{v:.6}"))),
            cell(cols.longitude[i].map(|v| format!("{v:.6}"))),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(cols: &Columns, path: &Path) -> Result<()> {
    let text = |name: &str, nullable: bool| Field::new(name, DataType::Utf8, nullable);
    let schema = Arc::new(Schema::new(vec![
        Field::new("year", DataType::Int64, true),
        Field::new("month", DataType::Int64, true),
        Field::new("hour", DataType::Int64, true),
        text("accident_day_of_week", true),
        text("weather_group", true),
        text("lighting_group", true),
        text("road_surface_group", true),
        text("accident_severity", false),
        Field::new("latitude", DataType::Float64, true),
        Field::new("longitude", DataType::Float64, true),
    ]));

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(cols.year.clone())),
        Arc::new(Int64Array::from(cols.month.clone())),
        Arc::new(Int64Array::from(cols.hour.clone())),
        Arc::new(StringArray::from(cols.weekday.clone())),
        Arc::new(StringArray::from(cols.weather.clone())),
        Arc::new(StringArray::from(cols.lighting.clone())),
        Arc::new(StringArray::from(cols.surface.clone())),
        Arc::new(StringArray::from(cols.severity.clone())),
        Arc::new(Float64Array::from(cols.latitude.clone())),
        Arc::new(Float64Array::from(cols.longitude.clone())),
    ];

    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_collisions.csv".to_string());
    let path = Path::new(&output);

    let mut rng = SimpleRng::new(42);
    let cols = generate(&mut rng);

    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => write_csv(&cols, path)?,
        Some("parquet") | Some("pq") => write_parquet(&cols, path)?,
        _ => bail!("output must end in .csv or .parquet"),
    }

    let injuries = cols.severity.iter().filter(|s| **s == "Yes").count();
    println!("Wrote {ROWS} collisions ({injuries} with injuries) to {output}");
    Ok(())
}
