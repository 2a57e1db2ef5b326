//! # LevelQuote CLI
//!
//! Terminal front end for the foam leveling calculator. Prompts for slab
//! geometry and material selection, prints the price range, and can save
//! the result as an estimate in a local store directory (`./quotes`).

use std::io::{self, BufRead, Write};

use quote_core::document::{CustomerInfo, Document};
use quote_core::money::Dollars;
use quote_core::pipeline::SavePipeline;
use quote_core::pricing::foam::{
    calculate, ApplicationType, FoamLevelingInput, FoamType, MoistureLevel, SoilType,
    WeatherConditions,
};
use quote_core::pricing::PricingItem;
use quote_core::store::DocumentStore;

const STORE_DIR: &str = "quotes";

fn prompt_f64(prompt: &str, default: f64) -> f64 {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return default;
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return default;
    }

    input.trim().parse().unwrap_or(default)
}

fn prompt_string(prompt: &str, default: &str) -> String {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return default.to_string();
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return default.to_string();
    }

    let trimmed = input.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("LevelQuote CLI - Concrete Leveling Estimator");
    println!("============================================");
    println!();

    let length_ft = prompt_f64("Slab length (ft) [10.0]: ", 10.0);
    let width_ft = prompt_f64("Slab width (ft) [20.0]: ", 20.0);
    let inches_settled = prompt_f64("Settlement (in) [1.0]: ", 1.0);
    let sides_settled = prompt_f64("Sides settled (1-3) [1]: ", 1.0).max(0.0) as u8;
    let foam_type = FoamType::from_str_flexible(&prompt_string("Foam type (RR201/RR401) [RR201]: ", "RR201"));
    let application =
        ApplicationType::from_str_flexible(&prompt_string("Application (lift/void) [lift]: ", "lift"));
    let soil_type = SoilType::from_str_flexible(&prompt_string("Soil type [mixed]: ", "mixed"));
    let weather =
        WeatherConditions::from_str_flexible(&prompt_string("Weather [normal]: ", "normal"));
    let moisture = MoistureLevel::from_str_flexible(&prompt_string("Moisture [normal]: ", "normal"));
    let travel_distance_miles = prompt_f64("Travel distance (mi) [0]: ", 0.0);

    let input = FoamLevelingInput {
        length_ft,
        width_ft,
        inches_settled,
        sides_settled,
        soil_type,
        weather,
        moisture,
        travel_distance_miles,
        foam_type,
        application,
    };

    let result = calculate(&input);

    println!();
    if !result.is_priceable() {
        println!("Cannot price yet: slab length and width must be positive.");
        return;
    }

    println!("═══════════════════════════════════════");
    println!("  FOAM LEVELING ESTIMATE");
    println!("═══════════════════════════════════════");
    println!();
    println!("Input:");
    println!("  Slab:       {:.1} ft x {:.1} ft ({:.0} sq ft)", length_ft, width_ft, result.square_footage.0);
    println!("  Settlement: {:.2}\" on {} side(s)", inches_settled, sides_settled);
    println!("  Material:   {} / {:?}", foam_type, application);
    println!();
    println!("Material:");
    println!("  Void volume: {:.2} ft³ ({:.3} yd³)", result.void_volume_cu_ft.0, result.void_volume_cu_yd.0);
    println!("  Foam needed: {:.1} lbs", result.material_weight_lbs.0);
    println!();
    println!("Price:");
    println!("  Low:  {}", result.estimated_price_low);
    println!("  Mid:  {}", result.price_mid());
    println!("  High: {}", result.estimated_price_high);
    println!(
        "  Per sq ft: {} - {}",
        result.price_per_sq_ft_low, result.price_per_sq_ft_high
    );
    println!();
    println!("═══════════════════════════════════════");

    println!();
    println!("JSON Output (for API use):");
    if let Ok(json) = serde_json::to_string_pretty(&result) {
        println!("{}", json);
    }

    println!();
    let save = prompt_string("Save as estimate? (y/N): ", "n");
    if !save.eq_ignore_ascii_case("y") {
        return;
    }

    let customer = prompt_string("Customer name: ", "");
    if customer.is_empty() {
        eprintln!("A customer name is required to save an estimate.");
        return;
    }

    let description = format!(
        "Foam leveling, {:.0}x{:.0} slab, {:.1}\" settled ({} {:?})",
        length_ft, width_ft, inches_settled, foam_type, application
    );

    let mut doc = Document::new_estimate(CustomerInfo::named(customer));
    if doc
        .add_priced_item(PricingItem::FoamLeveling(input), description)
        .is_none()
    {
        eprintln!("The job cannot be priced with these inputs.");
        return;
    }

    let store = match DocumentStore::open(STORE_DIR) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error opening store: {}", e);
            return;
        }
    };

    match SavePipeline::standard().run(&mut doc, &store) {
        Ok(()) => {
            println!();
            println!(
                "Saved {} for {} ({}).",
                doc.number_or_draft(),
                doc.customer.name,
                Dollars(doc.subtotal())
            );
        }
        Err(e) => {
            eprintln!("Error saving estimate: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
        }
    }
}
