use std::borrow::Cow;

use bytes::Bytes;
use schemata_common::{adapter, record::Person};
use snafu::{ensure, Location, OptionExt, ResultExt, Snafu};
use tracing::{debug, info, warn};

use crate::{
    config::Config, descriptor::CodecDescriptor, Error, IncompleteRecordSnafu, NoCodecsSnafu,
    Registry,
};

/// A failure that belongs to one codec and never stops the others.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CodecFailure {
    #[snafu(display("encode failed: {source}"))]
    Encode {
        source: adapter::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("decode failed: {source}"))]
    Decode {
        source: adapter::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("codec {name} has no encoder"))]
    MissingEncoder {
        name: String,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("codec {name} has no decoder"))]
    MissingDecoder {
        name: String,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("codec {name} is not registered"))]
    NotRegistered {
        name: String,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("round trip changed the record: {decoded}"))]
    RoundTripMismatch {
        decoded: Person,
        #[snafu(implicit)]
        location: Location,
    },
}

/// The payload one codec produced, with its size and hex form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeResult {
    codec_name: String,
    bytes: Bytes,
    byte_length: usize,
    hex: String,
}

impl EncodeResult {
    pub fn new<S: Into<String>>(codec_name: S, bytes: Bytes) -> Self {
        Self {
            codec_name: codec_name.into(),
            byte_length: bytes.len(),
            hex: hex::encode(&bytes),
            bytes,
        }
    }

    pub fn codec_name(&self) -> &str {
        &self.codec_name
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    /// Lowercase hex of [`bytes`](Self::bytes).
    pub fn hex(&self) -> &str {
        &self.hex
    }

    /// The payload read as UTF-8, with invalid sequences replaced.
    pub fn string_form(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

#[derive(Debug)]
pub enum RoundTrip {
    /// The codec has no decoder.
    NoDecoder,
    /// Verification was turned off, or there was nothing to decode.
    Skipped,
    Exact(Person),
    /// Text fields survived but the number did not, on a codec that decodes
    /// into a narrower type.
    Narrowed(Person),
    Failed(CodecFailure),
}

impl RoundTrip {
    pub fn is_failed(&self) -> bool {
        matches!(self, RoundTrip::Failed(_))
    }

    pub fn decoded(&self) -> Option<&Person> {
        match self {
            RoundTrip::Exact(person) | RoundTrip::Narrowed(person) => Some(person),
            _ => None,
        }
    }
}

impl std::fmt::Display for RoundTrip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundTrip::NoDecoder => write!(f, "no decoder"),
            RoundTrip::Skipped => write!(f, "skipped"),
            RoundTrip::Exact(_) => write!(f, "exact"),
            RoundTrip::Narrowed(person) => write!(f, "narrowed ({person})"),
            RoundTrip::Failed(failure) => write!(f, "failed: {failure}"),
        }
    }
}

#[derive(Debug)]
pub struct CodecReport {
    name: String,
    outcome: Result<EncodeResult, CodecFailure>,
    round_trip: RoundTrip,
}

impl CodecReport {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn outcome(&self) -> Result<&EncodeResult, &CodecFailure> {
        self.outcome.as_ref()
    }

    pub fn round_trip(&self) -> &RoundTrip {
        &self.round_trip
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Every codec's report for one record, in registration order.
#[derive(Debug)]
pub struct Comparison {
    record: Person,
    reports: Vec<CodecReport>,
}

impl Comparison {
    pub fn record(&self) -> &Person {
        &self.record
    }

    pub fn reports(&self) -> &[CodecReport] {
        &self.reports
    }

    pub fn get(&self, name: &str) -> Option<&CodecReport> {
        self.reports.iter().find(|report| report.name == name)
    }

    pub fn successes(&self) -> impl Iterator<Item = &EncodeResult> {
        self.reports
            .iter()
            .filter_map(|report| report.outcome.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &CodecFailure)> {
        self.reports.iter().filter_map(|report| match &report.outcome {
            Err(failure) => Some((report.name(), failure)),
            Ok(_) => None,
        })
    }

    /// The first codec with the fewest bytes.
    pub fn smallest(&self) -> Option<&EncodeResult> {
        self.successes().min_by_key(|result| result.byte_length())
    }
}

/// Encode `record` with every codec in `codecs`, decoding again wherever a
/// decoder is registered.
pub fn run_comparison(record: &Person, codecs: &Registry) -> Result<Comparison, Error> {
    compare(record, codecs, true)
}

fn compare(record: &Person, codecs: &Registry, verify: bool) -> Result<Comparison, Error> {
    ensure!(!codecs.is_empty(), NoCodecsSnafu);
    ensure!(
        record.is_complete(),
        IncompleteRecordSnafu {
            record: record.to_string()
        }
    );

    let reports: Vec<CodecReport> = codecs
        .iter()
        .map(|codec| run_codec(record, codec, verify))
        .collect();
    let comparison = Comparison {
        record: record.clone(),
        reports,
    };
    info!(
        codecs = comparison.reports.len(),
        failures = comparison.failures().count(),
        "comparison finished"
    );
    Ok(comparison)
}

fn run_codec(record: &Person, codec: &CodecDescriptor, verify: bool) -> CodecReport {
    let outcome = encode(record, codec);
    let round_trip = match &outcome {
        Ok(result) if verify => round_trip(record, codec, result.bytes().clone()),
        Ok(_) => RoundTrip::Skipped,
        Err(e) => {
            warn!(codec = codec.name(), error = %e, "encode failed");
            RoundTrip::Skipped
        }
    };
    if let RoundTrip::Failed(e) = &round_trip {
        warn!(codec = codec.name(), error = %e, "round trip failed");
    }
    CodecReport {
        name: codec.name().to_string(),
        outcome,
        round_trip,
    }
}

fn encode(record: &Person, codec: &CodecDescriptor) -> Result<EncodeResult, CodecFailure> {
    let encoder = codec
        .encoder()
        .context(MissingEncoderSnafu { name: codec.name() })?;
    let bytes = encoder(record).context(EncodeSnafu)?;
    let result = EncodeResult::new(codec.name(), bytes);
    debug!(
        codec = codec.name(),
        len = result.byte_length(),
        hex = result.hex(),
        "encoded"
    );
    Ok(result)
}

fn round_trip(record: &Person, codec: &CodecDescriptor, bytes: Bytes) -> RoundTrip {
    let Some(decoder) = codec.decoder() else {
        return RoundTrip::NoDecoder;
    };
    let decoded = match decoder(bytes).context(DecodeSnafu) {
        Ok(decoded) => decoded,
        Err(e) => return RoundTrip::Failed(e),
    };
    if decoded == *record {
        RoundTrip::Exact(decoded)
    } else if codec.allows_narrowing()
        && decoded.username == record.username
        && decoded.interests == record.interests
    {
        debug!(codec = codec.name(), decoded = %decoded, "number changed in round trip");
        RoundTrip::Narrowed(decoded)
    } else {
        RoundTrip::Failed(RoundTripMismatchSnafu { decoded }.build())
    }
}

/// A [`Registry`] paired with the [`Config`] that decides what to run.
#[derive(Debug, Clone)]
pub struct Harness {
    config: Config,
    registry: Registry,
}

impl Harness {
    pub fn new(config: Config, registry: Registry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn run(&self, record: &Person) -> Result<Comparison, Error> {
        match &self.config.codecs {
            Some(names) => {
                let selected = self.registry.select(names)?;
                compare(record, &selected, self.config.verify_round_trip)
            }
            None => compare(record, &self.registry, self.config.verify_round_trip),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use schemata_common::{
        adapter::{Adapter, EncodeSnafu as AdapterEncodeSnafu, ThriftAdapter},
        error::BoxedError,
        schema::thrift::ThriftProtocol,
    };
    use snafu::IntoError;

    use super::*;

    fn sample_run() -> Comparison {
        run_comparison(&Person::sample(), &Registry::standard()).unwrap()
    }

    fn json() -> CodecDescriptor {
        Registry::standard().get("json").unwrap().clone()
    }

    fn broken_encoder(_: &Person) -> Result<Bytes, adapter::Error> {
        let error = BoxedError::new(io::Error::new(io::ErrorKind::Other, "boom"));
        Err(AdapterEncodeSnafu { format: "broken" }.into_error(error))
    }

    #[test]
    fn one_result_per_codec_in_order() {
        let comparison = sample_run();
        let names: Vec<_> = comparison.reports().iter().map(CodecReport::name).collect();
        let expected: Vec<_> = Registry::standard().names().map(String::from).collect();
        assert_eq!(names, expected);
        assert!(comparison.failures().next().is_none());
        for report in comparison.reports() {
            assert!(!report.round_trip().is_failed(), "{}", report.name());
        }
    }

    #[test]
    fn order_follows_registration() {
        let registry = Registry::standard()
            .select(["thrift-compact", "protobuf", "json"])
            .unwrap();
        let comparison = run_comparison(&Person::sample(), &registry).unwrap();
        let names: Vec<_> = comparison.successes().map(EncodeResult::codec_name).collect();
        assert_eq!(names, ["thrift-compact", "protobuf", "json"]);
    }

    #[test]
    fn derived_metrics() {
        for result in sample_run().successes() {
            assert_eq!(result.byte_length(), result.bytes().len());
            assert_eq!(result.hex(), hex::encode(result.bytes()));
            assert_eq!(result.hex(), result.hex().to_lowercase());
        }
        let result = EncodeResult::new("raw", Bytes::from_static(&[0xAB, 0x01]));
        assert_eq!(result.hex(), "ab01");
        assert_eq!(result.byte_length(), 2);
    }

    #[test]
    fn protobuf_payload() {
        let comparison = sample_run();
        let protobuf = comparison.get("protobuf").unwrap().outcome().unwrap();
        assert_eq!(
            protobuf.hex(),
            "0a064d617274696e10b90a1a0b646179647265616d696e671a076861636b696e67"
        );
        assert_eq!(protobuf.byte_length(), 33);
    }

    #[test]
    fn json_round_trip_is_exact() {
        let comparison = sample_run();
        let report = comparison.get("json").unwrap();
        assert!(
            matches!(report.round_trip(), RoundTrip::Exact(person) if *person == Person::sample())
        );
        assert_eq!(
            report.outcome().unwrap().string_form(),
            r#"{"userName":"Martin","favouriteNumber":1337,"interests":["daydreaming","hacking"]}"#
        );
    }

    #[test]
    fn binary_formats_beat_json() {
        let comparison = sample_run();
        let len = |name: &str| comparison.get(name).unwrap().outcome().unwrap().byte_length();
        let json = len("json");
        for name in ["protobuf", "msgpack", "thrift-binary", "thrift-compact", "bincode"] {
            assert!(len(name) < json, "{name}: {} >= {json}", len(name));
        }
        assert!(len("protobuf") < len("thrift-binary"));
        assert!(len("thrift-compact") < len("thrift-binary"));
        assert_eq!(comparison.smallest().unwrap().codec_name(), "protobuf");
    }

    #[test]
    fn narrow_decode_keeps_text() {
        let comparison = sample_run();
        let report = comparison.get("flexbuffers-narrow").unwrap();
        let decoded = report.round_trip().decoded().unwrap();
        assert_eq!(decoded.username, "Martin");
        assert_eq!(decoded.interests, Person::sample().interests);
    }

    #[test]
    fn cross_format_decode_fails() {
        let registry = Registry::standard();
        let comparison = run_comparison(&Person::sample(), &registry).unwrap();
        let flexbuffers = |name: &str| name.starts_with("flexbuffers");
        for produced in comparison.successes() {
            for decoded_by in registry.names() {
                let producer = produced.codec_name();
                // both flexbuffers entries share one wire format
                if producer == decoded_by || (flexbuffers(producer) && flexbuffers(decoded_by)) {
                    continue;
                }
                let res = registry.decode_with(decoded_by, produced.bytes().clone());
                assert!(
                    matches!(res, Err(CodecFailure::Decode { .. })),
                    "{producer} decoded by {decoded_by}: {res:?}"
                );
            }
        }
    }

    #[test]
    fn narrow_codec_reports_wide_number() {
        let wide = Person::new("Martin", (1 << 40) + 1337, ["daydreaming", "hacking"]);
        let registry = Registry::standard()
            .select(["flexbuffers", "flexbuffers-narrow"])
            .unwrap();
        let comparison = run_comparison(&wide, &registry).unwrap();
        assert!(matches!(
            comparison.get("flexbuffers").unwrap().round_trip(),
            RoundTrip::Exact(_)
        ));
        assert!(matches!(
            comparison.get("flexbuffers-narrow").unwrap().round_trip(),
            RoundTrip::Narrowed(person) if person.favorite_number == 1337
        ));
    }

    #[test]
    fn failing_codec_is_isolated() {
        let mut registry = Registry::new();
        registry
            .register(CodecDescriptor::new("broken").with_encoder(broken_encoder))
            .unwrap();
        registry.register(CodecDescriptor::new("unconfigured")).unwrap();
        registry.register(json()).unwrap();

        let comparison = run_comparison(&Person::sample(), &registry).unwrap();
        assert_eq!(comparison.reports().len(), 3);
        assert!(matches!(
            comparison.get("broken").unwrap().outcome(),
            Err(CodecFailure::Encode { .. })
        ));
        assert!(matches!(
            comparison.get("unconfigured").unwrap().outcome(),
            Err(CodecFailure::MissingEncoder { .. })
        ));
        assert!(comparison.get("json").unwrap().is_success());
        assert_eq!(comparison.failures().count(), 2);
    }

    #[test]
    fn decode_failure_is_recorded() {
        let encoder = json().encoder().unwrap().clone();
        let thrift = ThriftAdapter(ThriftProtocol::Compact);
        let codec = CodecDescriptor::new("json-to-thrift")
            .with_encoder(move |person| encoder(person))
            .with_decoder(move |bytes| thrift.decode(bytes));
        let mut registry = Registry::new();
        registry.register(codec).unwrap();

        let comparison = run_comparison(&Person::sample(), &registry).unwrap();
        let report = comparison.get("json-to-thrift").unwrap();
        assert!(report.is_success());
        assert!(matches!(
            report.round_trip(),
            RoundTrip::Failed(CodecFailure::Decode { .. })
        ));
    }

    #[test]
    fn round_trip_classification() {
        let encoder = json().encoder().unwrap().clone();
        let renamed_encoder = encoder.clone();
        let renamed = CodecDescriptor::new("renamed")
            .with_encoder(move |person| renamed_encoder(person))
            .with_decoder(|_| Ok(Person::new("Kleppmann", 1337, ["daydreaming", "hacking"])));
        let strict_encoder = encoder.clone();
        let strict = CodecDescriptor::new("strict")
            .with_encoder(move |person| strict_encoder(person))
            .with_decoder(|_| Ok(Person::new("Martin", 0, ["daydreaming", "hacking"])));
        let truncated = CodecDescriptor::new("truncated")
            .with_encoder(move |person| encoder(person))
            .with_decoder(|_| Ok(Person::new("Martin", 1337 % 256, ["daydreaming", "hacking"])))
            .with_narrowing();
        let mut registry = Registry::new();
        registry.register(renamed).unwrap();
        registry.register(strict).unwrap();
        registry.register(truncated).unwrap();

        let comparison = run_comparison(&Person::sample(), &registry).unwrap();
        assert!(matches!(
            comparison.get("renamed").unwrap().round_trip(),
            RoundTrip::Failed(CodecFailure::RoundTripMismatch { .. })
        ));
        // a lost number is only tolerated where narrowing was declared
        assert!(matches!(
            comparison.get("strict").unwrap().round_trip(),
            RoundTrip::Failed(CodecFailure::RoundTripMismatch { .. })
        ));
        assert!(matches!(
            comparison.get("truncated").unwrap().round_trip(),
            RoundTrip::Narrowed(person) if person.favorite_number == 57
        ));
    }

    #[test]
    fn encoder_without_decoder() {
        let encoder = json().encoder().unwrap().clone();
        let mut registry = Registry::new();
        registry
            .register(CodecDescriptor::new("json").with_encoder(move |person| encoder(person)))
            .unwrap();
        let comparison = run_comparison(&Person::sample(), &registry).unwrap();
        assert!(matches!(
            comparison.get("json").unwrap().round_trip(),
            RoundTrip::NoDecoder
        ));
    }

    #[test]
    fn invalid_arguments_are_fatal() {
        let res = run_comparison(&Person::sample(), &Registry::new());
        assert!(matches!(res, Err(Error::NoCodecs { .. })));

        let partial = Person::new("", 1337, ["hacking"]);
        let res = run_comparison(&partial, &Registry::standard());
        assert!(matches!(res, Err(Error::IncompleteRecord { .. })));
    }

    #[test]
    fn harness_applies_config() {
        let config = Config {
            verify_round_trip: false,
            ..Config::default()
        }
        .with_codecs(["msgpack", "bincode"]);
        let harness = Harness::new(config, Registry::standard());
        let comparison = harness.run(&Person::sample()).unwrap();
        let names: Vec<_> = comparison.reports().iter().map(CodecReport::name).collect();
        assert_eq!(names, ["msgpack", "bincode"]);
        assert!(comparison
            .reports()
            .iter()
            .all(|report| matches!(report.round_trip(), RoundTrip::Skipped)));

        let harness = Harness::new(
            Config::default().with_codecs(["protobuf", "avro"]),
            Registry::standard(),
        );
        assert!(matches!(
            harness.run(&Person::sample()),
            Err(Error::UnknownCodec { .. })
        ));
    }
}
