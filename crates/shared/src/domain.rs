use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(QuizId);
id_newtype!(QuestionId);

/// The four answer choices a quiz question offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorrectOption {
    A,
    B,
    C,
    D,
}

impl CorrectOption {
    pub const ALL: [CorrectOption; 4] = [Self::A, Self::B, Self::C, Self::D];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::A => "Option A",
            Self::B => "Option B",
            Self::C => "Option C",
            Self::D => "Option D",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|option| option.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_choice_case_insensitively() {
        assert_eq!(CorrectOption::parse(" c "), Some(CorrectOption::C));
        assert_eq!(CorrectOption::parse(""), None);
        assert_eq!(CorrectOption::parse("E"), None);
    }

    #[test]
    fn ids_serialize_as_plain_integers() {
        let raw = serde_json::to_string(&QuizId(42)).expect("serialize");
        assert_eq!(raw, "42");
    }
}
