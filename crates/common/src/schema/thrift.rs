use thrift::protocol::{
    field_id, verify_required_field_exists, TBinaryInputProtocol, TBinaryOutputProtocol,
    TCompactInputProtocol, TCompactOutputProtocol, TFieldIdentifier, TInputProtocol,
    TListIdentifier, TOutputProtocol, TSerializable, TStructIdentifier, TType,
};
use thrift::{ProtocolError, ProtocolErrorKind};

use crate::record::Person;

/// Which Thrift protocol frames the struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThriftProtocol {
    /// Strict binary protocol: fixed-width field headers and lengths.
    Binary,
    /// Compact protocol: delta field ids and varints.
    Compact,
}

impl ThriftProtocol {
    pub fn name(&self) -> &'static str {
        match self {
            ThriftProtocol::Binary => "thrift-binary",
            ThriftProtocol::Compact => "thrift-compact",
        }
    }

    /// Serialize into a freshly allocated buffer.
    pub fn write<T: TSerializable>(&self, item: &T) -> thrift::Result<Vec<u8>> {
        let mut buf = Vec::new();
        match self {
            ThriftProtocol::Binary => {
                let mut o_prot = TBinaryOutputProtocol::new(&mut buf, true);
                item.write_to_out_protocol(&mut o_prot)?;
            }
            ThriftProtocol::Compact => {
                let mut o_prot = TCompactOutputProtocol::new(&mut buf);
                item.write_to_out_protocol(&mut o_prot)?;
            }
        }
        Ok(buf)
    }

    pub fn read<T: TSerializable>(&self, bytes: &[u8]) -> thrift::Result<T> {
        match self {
            ThriftProtocol::Binary => {
                let mut i_prot = TBinaryInputProtocol::new(bytes, true);
                T::read_from_in_protocol(&mut i_prot)
            }
            ThriftProtocol::Compact => {
                let mut i_prot = TCompactInputProtocol::new(bytes);
                T::read_from_in_protocol(&mut i_prot)
            }
        }
    }
}

/// ```thrift
/// struct Person {
///   1: required string userName,
///   2: optional i64 favouriteNumber,
///   3: optional list<string> interests
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThriftPerson {
    pub user_name: String,
    pub favourite_number: Option<i64>,
    pub interests: Option<Vec<String>>,
}

impl TSerializable for ThriftPerson {
    fn read_from_in_protocol(i_prot: &mut dyn TInputProtocol) -> thrift::Result<ThriftPerson> {
        i_prot.read_struct_begin()?;
        let mut f_1: Option<String> = None;
        let mut f_2: Option<i64> = None;
        let mut f_3: Option<Vec<String>> = None;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match (field_id(&field_ident)?, field_ident.field_type) {
                (1, TType::String) => {
                    f_1 = Some(i_prot.read_string()?);
                }
                (2, TType::I64) => {
                    f_2 = Some(i_prot.read_i64()?);
                }
                (3, TType::List) => {
                    let list_ident = i_prot.read_list_begin()?;
                    if list_ident.size < 0 {
                        return Err(thrift::Error::Protocol(ProtocolError::new(
                            ProtocolErrorKind::NegativeSize,
                            format!("negative list size {}", list_ident.size),
                        )));
                    }
                    // the size comes from the payload, so grow as items arrive
                    let mut items = Vec::new();
                    for _ in 0..list_ident.size {
                        items.push(i_prot.read_string()?);
                    }
                    i_prot.read_list_end()?;
                    f_3 = Some(items);
                }
                (_, field_type) => {
                    i_prot.skip(field_type)?;
                }
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        verify_required_field_exists("Person.user_name", &f_1)?;
        Ok(ThriftPerson {
            user_name: f_1.unwrap_or_default(),
            favourite_number: f_2,
            interests: f_3,
        })
    }

    fn write_to_out_protocol(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("Person"))?;
        o_prot.write_field_begin(&TFieldIdentifier::new("userName", TType::String, 1))?;
        o_prot.write_string(&self.user_name)?;
        o_prot.write_field_end()?;
        if let Some(favourite_number) = self.favourite_number {
            o_prot.write_field_begin(&TFieldIdentifier::new(
                "favouriteNumber",
                TType::I64,
                2,
            ))?;
            o_prot.write_i64(favourite_number)?;
            o_prot.write_field_end()?;
        }
        if let Some(ref interests) = self.interests {
            o_prot.write_field_begin(&TFieldIdentifier::new("interests", TType::List, 3))?;
            o_prot.write_list_begin(&TListIdentifier::new(
                TType::String,
                list_size(interests.len())?,
            ))?;
            for interest in interests {
                o_prot.write_string(interest)?;
            }
            o_prot.write_list_end()?;
            o_prot.write_field_end()?;
        }
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

fn list_size(len: usize) -> thrift::Result<i32> {
    i32::try_from(len).map_err(|_| {
        thrift::Error::Protocol(ProtocolError::new(
            ProtocolErrorKind::SizeLimit,
            format!("list of {len} items exceeds i32"),
        ))
    })
}

impl From<&Person> for ThriftPerson {
    fn from(person: &Person) -> Self {
        Self {
            user_name: person.username.clone(),
            favourite_number: Some(person.favorite_number),
            interests: Some(person.interests.clone()),
        }
    }
}

impl From<ThriftPerson> for Person {
    fn from(thrift: ThriftPerson) -> Self {
        Self {
            username: thrift.user_name,
            favorite_number: thrift.favourite_number.unwrap_or_default(),
            interests: thrift.interests.unwrap_or_default(),
        }
    }
}
