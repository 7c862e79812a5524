//! Adapters translate a [`Person`] into whatever a format's library expects
//! and back. Each call works on its own buffer.

use std::marker::PhantomData;

use bytes::{Bytes, BytesMut};
use prost::Message;
use snafu::{Location, ResultExt, Snafu};

use crate::{
    codec::Codec,
    error::BoxedError,
    record::{LegacyPerson, Person},
    schema::{
        protobuf::ProtoPerson,
        thrift::{ThriftPerson, ThriftProtocol},
    },
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{format} encode error"))]
    Encode {
        format: &'static str,
        #[snafu(source)]
        error: BoxedError,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("{format} decode error"))]
    Decode {
        format: &'static str,
        #[snafu(source)]
        error: BoxedError,
        #[snafu(implicit)]
        location: Location,
    },
}

pub trait Adapter: Send + Sync + 'static {
    fn format(&self) -> &'static str;

    /// Must not depend on anything but `person`.
    fn encode(&self, person: &Person, buf: &mut BytesMut) -> Result<(), Error>;

    fn decode(&self, buf: Bytes) -> Result<Person, Error>;

    /// Whether a decoded number may legitimately differ from the encoded one.
    fn narrows(&self) -> bool {
        false
    }
}

/// Any serde [`Codec`] writing the record directly.
#[derive(Debug)]
pub struct SerdeAdapter<C>(PhantomData<C>);

impl<C> SerdeAdapter<C> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<C> Default for SerdeAdapter<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec + Sync> Adapter for SerdeAdapter<C> {
    fn format(&self) -> &'static str {
        C::NAME
    }

    fn encode(&self, person: &Person, buf: &mut BytesMut) -> Result<(), Error> {
        if C::CHEAP_SIZE {
            let size = C::size(person)
                .map_err(BoxedError::new)
                .context(EncodeSnafu { format: C::NAME })?;
            buf.reserve(size as usize);
        }
        C::encode(person, buf)
            .map_err(BoxedError::new)
            .context(EncodeSnafu { format: C::NAME })
    }

    fn decode(&self, buf: Bytes) -> Result<Person, Error> {
        C::decode(buf)
            .map_err(BoxedError::new)
            .context(DecodeSnafu { format: C::NAME })
    }
}

/// Encodes a [`Person`] but decodes into [`LegacyPerson`], whose number is
/// only 32 bits wide, then widens the result back.
#[derive(Debug)]
pub struct NarrowAdapter<C>(PhantomData<C>);

impl<C> NarrowAdapter<C> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<C> Default for NarrowAdapter<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec + Sync> Adapter for NarrowAdapter<C> {
    fn format(&self) -> &'static str {
        C::NAME
    }

    fn encode(&self, person: &Person, buf: &mut BytesMut) -> Result<(), Error> {
        C::encode(person, buf)
            .map_err(BoxedError::new)
            .context(EncodeSnafu { format: C::NAME })
    }

    fn decode(&self, buf: Bytes) -> Result<Person, Error> {
        let legacy: LegacyPerson = C::decode(buf)
            .map_err(BoxedError::new)
            .context(DecodeSnafu { format: C::NAME })?;
        Ok(legacy.into())
    }

    fn narrows(&self) -> bool {
        true
    }
}

#[derive(Debug, Default)]
pub struct ProtobufAdapter;

impl Adapter for ProtobufAdapter {
    fn format(&self) -> &'static str {
        "protobuf"
    }

    #[tracing::instrument(skip_all)]
    fn encode(&self, person: &Person, buf: &mut BytesMut) -> Result<(), Error> {
        ProtoPerson::from(person)
            .encode(buf)
            .map_err(BoxedError::new)
            .context(EncodeSnafu {
                format: self.format(),
            })
    }

    #[tracing::instrument(skip_all)]
    fn decode(&self, buf: Bytes) -> Result<Person, Error> {
        let proto = ProtoPerson::decode(buf)
            .map_err(BoxedError::new)
            .context(DecodeSnafu {
                format: self.format(),
            })?;
        Ok(proto.into())
    }
}

#[derive(Debug)]
pub struct ThriftAdapter(pub ThriftProtocol);

impl Adapter for ThriftAdapter {
    fn format(&self) -> &'static str {
        self.0.name()
    }

    #[tracing::instrument(skip_all, fields(protocol = self.0.name()))]
    fn encode(&self, person: &Person, buf: &mut BytesMut) -> Result<(), Error> {
        let bytes = self
            .0
            .write(&ThriftPerson::from(person))
            .map_err(BoxedError::new)
            .context(EncodeSnafu {
                format: self.format(),
            })?;
        buf.extend_from_slice(&bytes);
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(protocol = self.0.name()))]
    fn decode(&self, buf: Bytes) -> Result<Person, Error> {
        let thrift: ThriftPerson = self
            .0
            .read(&buf)
            .map_err(BoxedError::new)
            .context(DecodeSnafu {
                format: self.format(),
            })?;
        Ok(thrift.into())
    }
}
