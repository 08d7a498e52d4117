//! Domain vocabulary shared across services.

use std::fmt;
use std::str::FromStr;

/// Role tag assigned to new accounts when none is given.
pub const DEFAULT_USER_KIND: &str = "recepcionista";

/// How an appointment takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentModality {
    Presencial,
    Telemedicina,
}

impl AppointmentModality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Presencial => "presencial",
            Self::Telemedicina => "telemedicina",
        }
    }
}

impl FromStr for AppointmentModality {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "presencial" => Ok(Self::Presencial),
            "telemedicina" => Ok(Self::Telemedicina),
            _ => Err(()),
        }
    }
}

impl fmt::Display for AppointmentModality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of an appointment. Any state is reachable from any
/// other; there is no transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentStatus {
    Agendada,
    Realizada,
    Cancelada,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agendada => "agendada",
            Self::Realizada => "realizada",
            Self::Cancelada => "cancelada",
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "agendada" => Ok(Self::Agendada),
            "realizada" => Ok(Self::Realizada),
            "cancelada" => Ok(Self::Cancelada),
            _ => Err(()),
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modality_parse() {
        assert_eq!(
            "presencial".parse::<AppointmentModality>(),
            Ok(AppointmentModality::Presencial)
        );
        assert_eq!(
            "telemedicina".parse::<AppointmentModality>(),
            Ok(AppointmentModality::Telemedicina)
        );
        assert!("remota".parse::<AppointmentModality>().is_err());
        // case-sensitive, like the wire format
        assert!("Presencial".parse::<AppointmentModality>().is_err());
    }

    #[test]
    fn test_status_parse_and_display() {
        for s in ["agendada", "realizada", "cancelada"] {
            assert_eq!(s.parse::<AppointmentStatus>().unwrap().to_string(), s);
        }
        assert!("pendente".parse::<AppointmentStatus>().is_err());
    }
}
