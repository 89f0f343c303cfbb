// cf-core/src/units.rs

use uom::si::f64::{
    Length as UomLength, ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
};

// Public canonical unit types (SI, f64)
pub type Length = UomLength;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;

#[inline]
pub fn degc(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn mm(v: f64) -> Length {
    use uom::si::length::millimeter;
    Length::new::<millimeter>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn to_degc(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::degree_celsius;
    t.get::<degree_celsius>()
}

#[inline]
pub fn to_kelvin(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::kelvin;
    t.get::<kelvin>()
}

#[inline]
pub fn to_hours(t: Time) -> f64 {
    use uom::si::time::hour;
    t.get::<hour>()
}

#[inline]
pub fn to_mm(l: Length) -> f64 {
    use uom::si::length::millimeter;
    l.get::<millimeter>()
}

/// Format a duration as `XhYminZs`, truncating partial seconds.
pub fn format_hms(t: Time) -> String {
    use uom::si::time::second;
    let total = t.get::<second>().max(0.0) as u64;
    format!("{}h{}min{}s", total / 3600, (total % 3600) / 60, total % 60)
}
