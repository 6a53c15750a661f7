use std::path::PathBuf;

use coin_counter::config::CoinCounterConfig;
use coin_counter::pipeline;
#[cfg(feature = "tracing")]
use tracing_log::LogTracer;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let Some(arg) = std::env::args().nth(1) else {
        eprintln!("Usage: count_coins <image.png | config.json>");
        return Ok(());
    };
    let path = PathBuf::from(arg);

    let cfg = if path.extension().is_some_and(|e| e == "json") {
        CoinCounterConfig::load_json(&path)?
    } else {
        CoinCounterConfig {
            image_path: Some(path.to_string_lossy().into_owned()),
            overlay_path: Some("coins_overlay.png".to_string()),
            ..CoinCounterConfig::default()
        }
    };

    let result = pipeline::run(&cfg)?;
    print!("{}", result.report.to_text());

    for record in &result.records {
        let denom = result
            .classification
            .denomination_of(record.id)
            .map(|d| d.label())
            .unwrap_or("?");
        println!(
            "coin {} at ({:.0}, {:.0}) r={:.1}px -> {}",
            record.id, record.center.x, record.center.y, record.raw_radius, denom
        );
    }
    Ok(())
}

fn init_logging() {
    #[cfg(feature = "tracing")]
    {
        let _ = LogTracer::init();
        coin_counter::core::init_tracing(false);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = coin_counter::core::init_with_level(log::LevelFilter::Info);
    }
}
