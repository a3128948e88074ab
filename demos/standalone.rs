use dragon_standalone::logging::init_tracing;
use dragon_standalone::{entry_point, Bootstrap, Defaults, RoutingRef, Value};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct Settings {
    debug: bool,
    port: u16,
    allowed_hosts: Vec<String>,
}

fn routes() -> Vec<&'static str> {
    vec!["^$"]
}

fn main() -> Result<(), dragon_standalone::Error> {
    init_tracing();

    // Try: DEBUG=false PORT=9000 ALLOWED_HOSTS=a.example,b.example
    let app = Bootstrap::builder()
        .with_entry_point(entry_point!(main))
        .with_routing(RoutingRef::deferred("routes", routes))
        .with_defaults(
            Defaults::new()
                .with("DEBUG", true)
                .with("PORT", 8000)
                .with("ALLOWED_HOSTS", Value::from(vec!["localhost"]))
                .with("SECRET_KEY", ""),
        )
        .build()?;

    let settings: Settings = app.config().deserialize()?;
    println!(
        "{} on port {} (debug={}, hosts={:?})",
        app.config().routing(),
        settings.port,
        settings.debug,
        settings.allowed_hosts
    );
    println!("boundary monitor installed: {}", app.monitor().is_some());

    Ok(())
}
