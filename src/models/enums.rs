use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Weekday {
    Monday => "lu",
    Tuesday => "ma",
    Wednesday => "mi",
    Thursday => "ju",
    Friday => "vi",
    Saturday => "sa",
    Sunday => "do",
});

str_enum!(Regimen {
    Daily => "daily",
    Weekly => "weekly",
    Monthly => "monthly",
});

impl Weekday {
    /// Monday-first order, matching the weekday codes.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Position in `ALL` (Monday = 0).
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Monday => "Lun",
            Self::Tuesday => "Mar",
            Self::Wednesday => "Mié",
            Self::Thursday => "Jue",
            Self::Friday => "Vie",
            Self::Saturday => "Sáb",
            Self::Sunday => "Dom",
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        Self::ALL[day.num_days_from_monday() as usize]
    }
}

impl Default for Weekday {
    fn default() -> Self {
        Self::Monday
    }
}

impl Default for Regimen {
    fn default() -> Self {
        Self::Daily
    }
}

impl Regimen {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Daily => "Diario",
            Self::Weekly => "Semanal",
            Self::Monthly => "Mensual",
        }
    }
}
