use schemata_common::record::Person;
use schemata_harness::{Config, Harness, Registry, Report};
use tracing::Level;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

#[snafu::report]
fn main() -> Result<(), schemata_harness::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .and_then(
                    filter::targets::Targets::new()
                        .with_target("schemata_harness", Level::DEBUG)
                        .with_target("schemata_common", Level::DEBUG),
                ),
        )
        .init();

    // codec names on the command line pick and order what runs
    let codecs: Vec<String> = std::env::args().skip(1).collect();
    let config = if codecs.is_empty() {
        Config::default()
    } else {
        Config::default().with_codecs(codecs)
    };

    let harness = Harness::new(config, Registry::standard());
    let comparison = harness.run(&Person::sample())?;
    print!("{}", Report::new(&comparison, harness.config()));
    Ok(())
}
