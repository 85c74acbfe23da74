//! Plan a safety-classified route between two places and print the segments.
//!
//! Run with:
//! AZURE_MAPS_KEY=... cargo run --example plan_route --features http -- "Chennai Central" "Guindy"

use std::sync::Arc;

use route_safety::{
    AzureMapsClient, OverlayConfig, PredictionClient, RenderFrame, RouteOverlaySession, ServiceConfig,
};

fn print_frame(title: &str, frame: &RenderFrame) {
    println!("{}", title);
    println!(
        "  {} -> {} (camera at {:.5}, {:.5})",
        frame.markers[0].title, frame.markers[1].title, frame.camera_center.lat, frame.camera_center.lon
    );
    for (i, s) in frame.segments.iter().enumerate() {
        println!(
            "  #{:<3} {:<9} ({:.5}, {:.5}) -> ({:.5}, {:.5}) {} {:<8} incidents={}",
            i,
            s.kind.as_str(),
            s.start.lat,
            s.start.lon,
            s.end.lat,
            s.end.lon,
            s.color,
            s.label.level,
            s.label.incident_count
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let source = args.next().unwrap_or_else(|| "Chennai Central".to_string());
    let destination = args.next().unwrap_or_else(|| "Guindy".to_string());

    let services = ServiceConfig::from_env();
    let maps = Arc::new(AzureMapsClient::new(services.clone())?);
    let predictor = Arc::new(PredictionClient::new(&services)?);

    let mut session = RouteOverlaySession::new(maps.clone(), OverlayConfig::default())
        .with_geocoder(maps)
        .with_predictor(predictor);

    let frame = session.plan_route(&source, &destination).await?;
    print_frame("Primary route", &frame);

    if let Some(frame) = session.set_classification_enabled(true).await {
        print_frame("Primary route (safety classified)", &frame);
    }

    match session.plan_alternate().await? {
        Some(frame) => print_frame("With alternate route", &frame),
        None => println!("No alternate route available"),
    }

    Ok(())
}
