//! Writes demo inputs for the dashboard into the working directory:
//! `meteor_data.csv`, `artifacts/clusters.parquet` and
//! `artifacts/anomaly_scores.parquet`.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const N_METEORS: usize = 600;

/// Fall sites are drawn around these (lat, lon, spread) regions, one per
/// k-means cluster.
const REGIONS: [(f64, f64, f64); 5] = [
    (-76.0, 160.0, 4.0), // Antarctica, Victoria Land
    (25.0, 10.0, 6.0),   // Sahara
    (23.0, 56.0, 3.0),   // Oman
    (40.0, -100.0, 8.0), // North America
    (50.0, 15.0, 6.0),   // Europe
];

const CLASSES: [&str; 6] = ["L6", "H5", "L5", "H4", "LL5", "CM2"];

/// One row of `meteor_data.csv`.
#[derive(Debug, Serialize)]
struct Meteor {
    name: String,
    id: i64,
    nametype: &'static str,
    recclass: &'static str,
    mass: f64,
    fall: &'static str,
    year: i64,
    reclat: f64,
    reclong: f64,
}

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
        (self.next_u64() % n as u64) as usize
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn generate_meteors(rng: &mut SimpleRng) -> (Vec<Meteor>, Vec<i64>) {
    let mut meteors = Vec::with_capacity(N_METEORS);
    let mut clusters = Vec::with_capacity(N_METEORS);

    for i in 0..N_METEORS {
        let cluster = rng.below(REGIONS.len());
        let (lat, lon, spread) = REGIONS[cluster];
        let fell = rng.next_f64() < 0.1;

        meteors.push(Meteor {
            name: format!("Sample {:04}", i + 1),
            id: 1000 + i as i64,
            nametype: "Valid",
            recclass: CLASSES[rng.below(CLASSES.len())],
            // Log-normal masses in grams, a few of them huge.
            mass: (rng.gauss(3.0, 1.6).exp() * 10.0).round() / 10.0,
            fall: if fell { "Fell" } else { "Found" },
            year: 1800 + rng.below(214) as i64,
            reclat: (lat + rng.gauss(0.0, spread)).clamp(-89.0, 89.0),
            reclong: ((lon + rng.gauss(0.0, spread * 1.5)) + 540.0) % 360.0 - 180.0,
        });
        clusters.push(cluster as i64);
    }

    (meteors, clusters)
}

fn write_csv(path: &Path, meteors: &[Meteor]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    for meteor in meteors {
        writer.serialize(meteor).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &Path, columns: Vec<(&str, ArrayRef)>) -> Result<()> {
    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, array)| Field::new(*name, array.data_type().clone(), false))
            .collect::<Vec<_>>(),
    ));
    let batch = RecordBatch::try_new(
        schema.clone(),
        columns.into_iter().map(|(_, array)| array).collect(),
    )
    .context("building record batch")?;

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let (meteors, kmeans) = generate_meteors(&mut rng);
    write_csv(Path::new("meteor_data.csv"), &meteors)?;
    log::info!("Wrote meteor_data.csv ({} rows)", meteors.len());

    std::fs::create_dir_all("artifacts").context("creating artifacts directory")?;

    let ids: Vec<i64> = meteors.iter().map(|m| m.id).collect();
    let lats: Vec<f64> = meteors.iter().map(|m| m.reclat).collect();
    let lons: Vec<f64> = meteors.iter().map(|m| m.reclong).collect();

    write_parquet(
        Path::new("artifacts/clusters.parquet"),
        vec![
            ("id", Arc::new(Int64Array::from(ids.clone())) as ArrayRef),
            ("reclat", Arc::new(Float64Array::from(lats)) as ArrayRef),
            ("reclong", Arc::new(Float64Array::from(lons)) as ArrayRef),
            ("cluster_kmeans", Arc::new(Int64Array::from(kmeans)) as ArrayRef),
        ],
    )?;
    log::info!("Wrote artifacts/clusters.parquet");

    // Scores grow with how far log-mass is from the bulk.
    let (iso, recon): (Vec<f64>, Vec<f64>) = meteors
        .iter()
        .map(|m| {
            let z = ((m.mass.max(0.1).ln() - 3.0) / 1.6).abs();
            let iso = (0.35 + 0.08 * z + rng.gauss(0.0, 0.03)).clamp(0.0, 1.0);
            let recon = (0.02 * z * z + rng.gauss(0.05, 0.01)).max(0.0);
            (iso, recon)
        })
        .unzip();

    write_parquet(
        Path::new("artifacts/anomaly_scores.parquet"),
        vec![
            ("id", Arc::new(Int64Array::from(ids)) as ArrayRef),
            ("year", Arc::new(Int64Array::from_iter_values(meteors.iter().map(|m| m.year))) as ArrayRef),
            ("mass", Arc::new(Float64Array::from_iter_values(meteors.iter().map(|m| m.mass))) as ArrayRef),
            ("iso_anomaly_score", Arc::new(Float64Array::from(iso)) as ArrayRef),
            ("ae_recon_error", Arc::new(Float64Array::from(recon)) as ArrayRef),
        ],
    )?;
    log::info!("Wrote artifacts/anomaly_scores.parquet");

    println!("Sample data written. Run `cargo run` to open the dashboard.");
    Ok(())
}
