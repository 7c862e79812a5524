/// Knobs for a [`Harness`](crate::Harness) run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Codecs to run, in order. `None` runs every registered codec.
    pub codecs: Option<Vec<String>>,
    /// Decode each payload again when the codec has a decoder.
    pub verify_round_trip: bool,
    /// Print the payload as (lossy) UTF-8 next to the hex form.
    pub string_form: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            codecs: None,
            verify_round_trip: true,
            string_form: true,
        }
    }
}

impl Config {
    pub fn with_codecs<I, S>(mut self, codecs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.codecs = Some(codecs.into_iter().map(Into::into).collect());
        self
    }
}
