use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use schemata_common::{
    adapter::{self, Adapter, NarrowAdapter, ProtobufAdapter, SerdeAdapter, ThriftAdapter},
    codec::{bincode::Bincode, flexbuffers::Flexbuffers, json::Json, msgpack::MsgPack},
    record::Person,
    schema::thrift::ThriftProtocol,
};
use snafu::{ensure, OptionExt, ResultExt};

use crate::{
    harness::{CodecFailure, DecodeSnafu, MissingDecoderSnafu, NotRegisteredSnafu},
    DuplicateCodecSnafu, Error, UnknownCodecSnafu,
};

pub type EncodeFn = Arc<dyn Fn(&Person) -> Result<Bytes, adapter::Error> + Send + Sync>;
pub type DecodeFn = Arc<dyn Fn(Bytes) -> Result<Person, adapter::Error> + Send + Sync>;

/// A named format with its encode function and, optionally, a decoder.
#[derive(Clone)]
pub struct CodecDescriptor {
    name: String,
    encoder: Option<EncodeFn>,
    decoder: Option<DecodeFn>,
    narrowing: bool,
}

impl CodecDescriptor {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            encoder: None,
            decoder: None,
            narrowing: false,
        }
    }

    pub fn from_adapter<S, A>(name: S, adapter: A) -> Self
    where
        S: Into<String>,
        A: Adapter,
    {
        let adapter = Arc::new(adapter);
        let decoding = adapter.clone();
        Self::encode_only(name, adapter).with_decoder(move |bytes| decoding.decode(bytes))
    }

    pub fn encode_only<S, A>(name: S, adapter: Arc<A>) -> Self
    where
        S: Into<String>,
        A: Adapter,
    {
        let narrowing = adapter.narrows();
        let mut descriptor = Self::new(name).with_encoder(move |person| {
            let mut buf = BytesMut::new();
            adapter.encode(person, &mut buf)?;
            Ok(buf.freeze())
        });
        descriptor.narrowing = narrowing;
        descriptor
    }

    pub fn with_encoder<F>(mut self, encoder: F) -> Self
    where
        F: Fn(&Person) -> Result<Bytes, adapter::Error> + Send + Sync + 'static,
    {
        self.encoder = Some(Arc::new(encoder));
        self
    }

    pub fn with_decoder<F>(mut self, decoder: F) -> Self
    where
        F: Fn(Bytes) -> Result<Person, adapter::Error> + Send + Sync + 'static,
    {
        self.decoder = Some(Arc::new(decoder));
        self
    }

    /// Let the decoded number differ from the encoded one without failing
    /// the round trip.
    pub fn with_narrowing(mut self) -> Self {
        self.narrowing = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn allows_narrowing(&self) -> bool {
        self.narrowing
    }

    pub fn encoder(&self) -> Option<&EncodeFn> {
        self.encoder.as_ref()
    }

    pub fn decoder(&self) -> Option<&DecodeFn> {
        self.decoder.as_ref()
    }
}

impl std::fmt::Debug for CodecDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecDescriptor")
            .field("name", &self.name)
            .field("encoder", &self.encoder.is_some())
            .field("decoder", &self.decoder.is_some())
            .field("narrowing", &self.narrowing)
            .finish()
    }
}

/// Codecs in the order they were registered.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    codecs: Vec<CodecDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in format, in the order they are usually reported.
    pub fn standard() -> Self {
        let codecs = vec![
            CodecDescriptor::from_adapter("bincode", SerdeAdapter::<Bincode>::new()),
            CodecDescriptor::from_adapter("flexbuffers", SerdeAdapter::<Flexbuffers>::new()),
            CodecDescriptor::from_adapter("flexbuffers-narrow", NarrowAdapter::<Flexbuffers>::new()),
            CodecDescriptor::from_adapter("protobuf", ProtobufAdapter),
            CodecDescriptor::from_adapter("json", SerdeAdapter::<Json>::new()),
            CodecDescriptor::from_adapter("msgpack", SerdeAdapter::<MsgPack>::new()),
            CodecDescriptor::from_adapter(
                ThriftProtocol::Binary.name(),
                ThriftAdapter(ThriftProtocol::Binary),
            ),
            CodecDescriptor::from_adapter(
                ThriftProtocol::Compact.name(),
                ThriftAdapter(ThriftProtocol::Compact),
            ),
        ];
        Self { codecs }
    }

    pub fn register(&mut self, descriptor: CodecDescriptor) -> Result<(), Error> {
        ensure!(
            self.get(descriptor.name()).is_none(),
            DuplicateCodecSnafu {
                name: descriptor.name()
            }
        );
        self.codecs.push(descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CodecDescriptor> {
        self.codecs.iter().find(|codec| codec.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.codecs.iter().map(CodecDescriptor::name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CodecDescriptor> {
        self.codecs.iter()
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// A new registry holding `names` in the given order.
    pub fn select<I, S>(&self, names: I) -> Result<Registry, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected = Registry::new();
        for name in names {
            let name = name.as_ref();
            let codec = self.get(name).context(UnknownCodecSnafu { name })?;
            selected.register(codec.clone())?;
        }
        Ok(selected)
    }

    /// Decode `bytes` with the named codec, whatever produced them.
    pub fn decode_with(&self, name: &str, bytes: Bytes) -> Result<Person, CodecFailure> {
        let codec = self.get(name).context(NotRegisteredSnafu { name })?;
        let decoder = codec.decoder().context(MissingDecoderSnafu { name })?;
        decoder(bytes).context(DecodeSnafu)
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a CodecDescriptor;
    type IntoIter = std::slice::Iter<'a, CodecDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
