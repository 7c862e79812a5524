/// The record every codec is compared on.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Person {
    #[serde(rename = "userName")]
    pub username: String,
    #[serde(rename = "favouriteNumber")]
    pub favorite_number: i64,
    pub interests: Vec<String>,
}

impl Person {
    pub fn new<S, I>(username: S, favorite_number: i64, interests: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            username: username.into(),
            favorite_number,
            interests: interests.into_iter().map(Into::into).collect(),
        }
    }

    pub fn sample() -> Self {
        Self::new("Martin", 1337, ["daydreaming", "hacking"])
    }

    /// A record missing its username or interests is partial.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.interests.is_empty()
    }
}

impl std::fmt::Display for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "username: {}, favorite number: {}, interests: {:?}",
            self.username, self.favorite_number, self.interests
        )
    }
}

/// Older shape of [`Person`] whose number field is only 32 bits wide.
///
/// Decoding a [`Person`] payload into it keeps only the low 32 bits of the
/// number.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LegacyPerson {
    #[serde(rename = "userName")]
    pub username: String,
    #[serde(rename = "favouriteNumber", deserialize_with = "truncate_i64")]
    pub favorite_number: i32,
    pub interests: Vec<String>,
}

fn truncate_i64<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let wide = <i64 as serde::Deserialize>::deserialize(deserializer)?;
    Ok(wide as i32)
}

impl From<LegacyPerson> for Person {
    fn from(legacy: LegacyPerson) -> Self {
        Self {
            username: legacy.username,
            favorite_number: i64::from(legacy.favorite_number),
            interests: legacy.interests,
        }
    }
}
