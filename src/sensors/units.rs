use std::fmt;

// !!!!!!!!!!!!!!!!! Unit !!!!!!!!!!!!!!!!!!!!!!!
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Ampere,
    MilliAmpere,
    Volt,
    MilliVolt,
    Watt,
    MilliWatt,
}

impl Unit {
    /// Converts `measure` from `source_unit` to `dest_unit`.
    /// Both units have to measure the same quantity.
    pub fn to(measure: f64, source_unit: &Unit, dest_unit: &Unit) -> Result<f64, String> {
        let orders = [
            [Unit::Ampere, Unit::MilliAmpere],
            [Unit::Volt, Unit::MilliVolt],
            [Unit::Watt, Unit::MilliWatt],
        ];
        for order in orders.iter() {
            let pos_source = order.iter().position(|x| x == source_unit);
            let pos_dest = order.iter().position(|x| x == dest_unit);
            if let (Some(pos_source), Some(pos_dest)) = (pos_source, pos_dest) {
                return Ok(measure * Unit::get_mult(pos_source, pos_dest));
            }
        }
        Err(format!(
            "Impossible conversion asked from {source_unit} to {dest_unit}."
        ))
    }

    /// The unprefixed unit measuring the same quantity.
    pub fn si(&self) -> Unit {
        match self {
            Unit::Ampere | Unit::MilliAmpere => Unit::Ampere,
            Unit::Volt | Unit::MilliVolt => Unit::Volt,
            Unit::Watt | Unit::MilliWatt => Unit::Watt,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Ampere => "A",
            Unit::MilliAmpere => "mA",
            Unit::Volt => "V",
            Unit::MilliVolt => "mV",
            Unit::Watt => "W",
            Unit::MilliWatt => "mW",
        }
    }

    fn get_mult(pos_source: usize, pos_dest: usize) -> f64 {
        let mut mult: f64 = 1.0;
        if pos_dest > pos_source {
            for _ in 0..(pos_dest - pos_source) {
                mult *= 1000.0;
            }
        } else if pos_dest < pos_source {
            for _ in 0..(pos_source - pos_dest) {
                mult /= 1000.0;
            }
        }
        mult
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Ampere => write!(f, "Amperes"),
            Unit::MilliAmpere => write!(f, "MilliAmperes"),
            Unit::Volt => write!(f, "Volts"),
            Unit::MilliVolt => write!(f, "MilliVolts"),
            Unit::Watt => write!(f, "Watts"),
            Unit::MilliWatt => write!(f, "MilliWatts"),
        }
    }
}
