//! Example: Named-option village layout
//!
//! Generates a small village from a seed string, without farmland, and
//! prints the flattened layout. With the `serde` feature the layout is also
//! written as JSON.

use rust_voronoi_city::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let seed = std::env::args().nth(1).unwrap_or_else(|| "Oakhollow".to_string());
    let options = LayoutOptions {
        seed: seed.clone(),
        include_farmland: false,
        ..LayoutOptions::default()
    };

    let layout = generate_layout(&options)?;

    println!("Village '{}' (seed {})", seed, layout.seed);
    println!("  Buildings: {}", layout.buildings.len());
    println!("  Streets: {}", layout.streets.len());
    println!("  Roads: {}", layout.roads.len());
    match &layout.wall {
        Some(wall) => println!(
            "  Wall: {} vertices, {} gates, {} towers",
            wall.shape.len(),
            wall.gates.len(),
            wall.towers.len()
        ),
        None => println!("  Wall: none"),
    }

    println!("\nSample buildings:");
    for building in layout.buildings.iter().take(5) {
        println!(
            "  {}: {} vertices, entry ({:.1}, {:.1})",
            building.tag,
            building.polygon.len(),
            building.entry_point.x,
            building.entry_point.y
        );
    }

    #[cfg(feature = "serde")]
    {
        let json = serde_json::to_string_pretty(&layout).expect("layout serializes");
        std::fs::write("village_layout.json", json).expect("write village_layout.json");
        println!("\nWrote village_layout.json");
    }

    Ok(())
}
