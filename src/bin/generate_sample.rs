use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use launch_dashboard::data::loader::{
    COL_BOOSTER_CATEGORY, COL_CLASS, COL_FLIGHT_NUMBER, COL_LAUNCH_SITE, COL_PAYLOAD_MASS,
};
use launch_dashboard::data::model::{LaunchRecord, Outcome};
use parquet::arrow::ArrowWriter;

const CSV_PATH: &str = "sample_launches.csv";
const PARQUET_PATH: &str = "sample_launches.parquet";

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// Booster eras: (category, launches, success probability, max payload kg).
const ERAS: [(&str, usize, f64, f64); 5] = [
    ("v1.0", 5, 0.4, 700.0),
    ("v1.1", 15, 0.35, 4500.0),
    ("FT", 24, 0.75, 6800.0),
    ("B4", 11, 0.55, 9600.0),
    ("B5", 1, 1.0, 3600.0),
];

const SITES: [&str; 4] = ["CCAFS LC-40", "VAFB SLC-4E", "KSC LC-39A", "CCAFS SLC-40"];

fn generate(rng: &mut SimpleRng) -> Vec<LaunchRecord> {
    let mut records = Vec::new();
    let mut flight = 1;
    for (era, &(category, launches, p_success, max_payload)) in ERAS.iter().enumerate() {
        // Early flights only flew from the Cape.
        let sites: &[&str] = if era == 0 { &SITES[..1] } else { &SITES };
        for _ in 0..launches {
            let payload = (rng.next_f64() * max_payload).round();
            let outcome = if rng.next_f64() < p_success {
                Outcome::Success
            } else {
                Outcome::Failure
            };
            records.push(LaunchRecord {
                flight_number: Some(flight),
                launch_site: rng.pick(sites).to_string(),
                payload_mass_kg: payload,
                outcome,
                booster_version_category: category.to_string(),
            });
            flight += 1;
        }
    }
    records
}

fn write_csv(records: &[LaunchRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(CSV_PATH).context("creating CSV")?;
    writer.write_record([
        COL_FLIGHT_NUMBER,
        COL_LAUNCH_SITE,
        COL_CLASS,
        COL_PAYLOAD_MASS,
        COL_BOOSTER_CATEGORY,
    ])?;
    for r in records {
        writer.write_record([
            r.flight_number.map(|n| n.to_string()).unwrap_or_default(),
            r.launch_site.clone(),
            r.outcome.to_string(),
            format!("{:.1}", r.payload_mass_kg),
            r.booster_version_category.clone(),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(records: &[LaunchRecord]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new(COL_FLIGHT_NUMBER, DataType::Int64, true),
        Field::new(COL_LAUNCH_SITE, DataType::Utf8, false),
        Field::new(COL_CLASS, DataType::Int64, false),
        Field::new(COL_PAYLOAD_MASS, DataType::Float64, false),
        Field::new(COL_BOOSTER_CATEGORY, DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(
                records.iter().map(|r| r.flight_number).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                records.iter().map(|r| r.launch_site.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                records
                    .iter()
                    .map(|r| i64::from(r.outcome.class()))
                    .collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                records.iter().map(|r| r.payload_mass_kg).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                records
                    .iter()
                    .map(|r| r.booster_version_category.as_str())
                    .collect::<Vec<_>>(),
            )),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(PARQUET_PATH).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);
    let records = generate(&mut rng);

    write_csv(&records)?;
    write_parquet(&records)?;

    let successes = records.iter().filter(|r| r.outcome.is_success()).count();
    log::info!("{successes} of {} generated launches succeeded", records.len());
    println!(
        "Wrote {} launches to {CSV_PATH} and {PARQUET_PATH}",
        records.len()
    );
    Ok(())
}
