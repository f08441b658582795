use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Class identifier as issued by the scheduling system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ClassId(i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[serde(transparent)]
pub struct WorkoutId(i64);

/// A member, coach or admin; the core never needs more than the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(i64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    NotPositive { kind: &'static str, value: i64 },
    NotANumber { kind: &'static str, value: String },
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPositive { kind, value } => {
                write!(f, "invalid {kind}: {value} is not positive")
            }
            Self::NotANumber { kind, value } => write!(f, "invalid {kind}: {value}"),
        }
    }
}

impl std::error::Error for IdError {}

macro_rules! id_type {
    ($name:ident, $kind:expr) => {
        impl $name {
            pub const KIND: &'static str = $kind;

            pub fn new(value: i64) -> Result<Self, IdError> {
                if value <= 0 {
                    return Err(IdError::NotPositive {
                        kind: Self::KIND,
                        value,
                    });
                }
                Ok(Self(value))
            }

            pub fn get(self) -> i64 {
                self.0
            }

            pub fn parse(value: &str) -> Result<Self, IdError> {
                let number = value
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| IdError::NotANumber {
                        kind: Self::KIND,
                        value: value.to_string(),
                    })?;
                Self::new(number)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value = i64::deserialize(deserializer)?;
                Self::new(value).map_err(serde::de::Error::custom)
            }
        }
    };
}

id_type!(ClassId, "class id");
id_type!(WorkoutId, "workout id");
id_type!(UserId, "user id");
