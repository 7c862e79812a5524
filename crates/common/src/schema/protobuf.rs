use crate::record::Person;

/// `message Person { string user_name = 1; int64 favourite_number = 2; repeated string interests = 3; }`
#[derive(Clone, PartialEq, prost::Message)]
pub struct ProtoPerson {
    #[prost(string, tag = "1")]
    pub user_name: String,
    #[prost(int64, tag = "2")]
    pub favourite_number: i64,
    #[prost(string, repeated, tag = "3")]
    pub interests: Vec<String>,
}

impl From<&Person> for ProtoPerson {
    fn from(person: &Person) -> Self {
        Self {
            user_name: person.username.clone(),
            favourite_number: person.favorite_number,
            interests: person.interests.clone(),
        }
    }
}

impl From<ProtoPerson> for Person {
    fn from(proto: ProtoPerson) -> Self {
        Self {
            username: proto.user_name,
            favorite_number: proto.favourite_number,
            interests: proto.interests,
        }
    }
}
