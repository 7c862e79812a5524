use crate::{config::Config, harness::Comparison};

/// Renders a [`Comparison`] as one block per codec.
pub struct Report<'a> {
    comparison: &'a Comparison,
    string_form: bool,
}

impl<'a> Report<'a> {
    pub fn new(comparison: &'a Comparison, config: &Config) -> Self {
        Self {
            comparison,
            string_form: config.string_form,
        }
    }
}

impl std::fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "data: {}", self.comparison.record())?;
        for report in self.comparison.reports() {
            writeln!(
                f,
                "-------------- {} ------------------",
                report.name().to_uppercase()
            )?;
            match report.outcome() {
                Ok(result) => {
                    writeln!(f, "Hex Format: {}", result.hex())?;
                    if self.string_form {
                        writeln!(f, "String Format: {}", result.string_form())?;
                    }
                    writeln!(f, "Length: {}", result.byte_length())?;
                    writeln!(f, "Round Trip: {}", report.round_trip())?;
                }
                Err(failure) => writeln!(f, "Error: {failure}")?,
            }
        }
        if let Some(smallest) = self.comparison.smallest() {
            writeln!(
                f,
                "Smallest: {} ({} bytes)",
                smallest.codec_name(),
                smallest.byte_length()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use schemata_common::record::Person;

    use crate::{run_comparison, CodecDescriptor, Registry};

    use super::*;

    #[test]
    fn blocks_in_order() {
        let registry = Registry::standard().select(["protobuf", "json"]).unwrap();
        let comparison = run_comparison(&Person::sample(), &registry).unwrap();
        let text = Report::new(&comparison, &Config::default()).to_string();

        let protobuf = text.find("-------------- PROTOBUF").unwrap();
        let json = text.find("-------------- JSON").unwrap();
        assert!(protobuf < json);
        assert!(text.starts_with("data: username: Martin"));
        assert!(text.contains("Length: 33\n"));
        assert!(text.contains(r#"String Format: {"userName":"Martin""#));
        assert!(text.contains("Round Trip: exact\n"));
        assert!(text.ends_with("Smallest: protobuf (33 bytes)\n"));
    }

    #[test]
    fn string_form_can_be_disabled() {
        let registry = Registry::standard().select(["msgpack"]).unwrap();
        let comparison = run_comparison(&Person::sample(), &registry).unwrap();
        let config = Config {
            string_form: false,
            ..Config::default()
        };
        let text = Report::new(&comparison, &config).to_string();
        assert!(!text.contains("String Format"));
        assert!(text.contains("Hex Format: 83a8"));
    }

    #[test]
    fn failures_are_reported() {
        let mut registry = Registry::new();
        registry.register(CodecDescriptor::new("avro")).unwrap();
        let comparison = run_comparison(&Person::sample(), &registry).unwrap();
        let text = Report::new(&comparison, &Config::default()).to_string();
        assert!(text.contains("-------------- AVRO ------------------\nError: codec avro has no encoder\n"));
        assert!(!text.contains("Smallest"));
    }
}
