//! Example: Generate a city
//!
//! Demonstrates the generation pipeline and what the model exposes.
//! Run with `RUST_LOG=debug` to see the per-stage log lines.

use rust_voronoi_city::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Voronoi City Generation Example");
    println!("===============================\n");

    let seed: u32 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);

    // Seeds whose citadel comes out misshapen are skipped
    let mut model = None;
    for seed in seed..seed + 20 {
        let config = CityConfigBuilder::new()
            .seed(seed)?
            .size(CitySize::Medium)
            .build()?;
        match Model::generate(config) {
            Ok(m) => {
                model = Some(m);
                break;
            }
            Err(CityError::BadCitadelShape { compactness, .. }) => {
                println!("Seed {}: citadel compactness {:.3}, retrying", seed, compactness);
            }
            Err(e) => return Err(e),
        }
    }
    let Some(model) = model else {
        println!("No seed produced a city");
        return Ok(());
    };

    let config = model.config();
    println!("Configuration:");
    println!("  Seed: {}", config.seed);
    println!("  Size: {} ({} patches)", config.size.name(), config.patch_count());
    println!("  Plaza: {}", model.plaza_needed());
    println!("  Citadel: {}", model.citadel_needed());
    println!("  Walls: {}", model.walls_needed());
    println!();

    println!("Statistics:");
    println!("  Patches: {}", model.patches().len());
    println!("  City radius: {:.1}", model.city_radius());
    println!("  Gates: {}", model.gates().len());
    println!("  Streets: {}, roads: {}, arteries: {}", model.streets().len(), model.roads().len(), model.arteries().len());
    if !model.route_failures().is_empty() {
        println!("  Unroutable: {:?}", model.route_failures());
    }
    println!();

    println!("Districts:");
    let mut tally: Vec<(WardType, usize, usize)> = Vec::new();
    for (_, patch) in model.patches().iter() {
        let Some(ward) = &patch.ward else { continue };
        match tally.iter_mut().find(|(t, _, _)| *t == ward.ward_type()) {
            Some((_, count, buildings)) => {
                *count += 1;
                *buildings += ward.geometry.len();
            }
            None => tally.push((ward.ward_type(), 1, ward.geometry.len())),
        }
    }
    for (ward_type, count, buildings) in tally {
        println!(
            "  {:<16} {:>3} patches, {:>4} buildings",
            ward_type.label().unwrap_or("Countryside"),
            count,
            buildings
        );
    }

    Ok(())
}
